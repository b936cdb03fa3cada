// Melee combo state machine
//
// idle -> attack1 -> attack2 -> attack3 -> idle. Presses while a swing is
// playing are buffered, and animation callbacks decide when the buffer is
// spent. A failsafe deadline ends the combo if those callbacks never come.

/// Last attack in the chain
pub const MAX_ATTACK_INDEX: u8 = 3;

/// Combo state. `attack_index` is 0 exactly when not attacking.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComboState {
    pub attacking: bool,
    pub window_open: bool,
    /// 1..=3 while attacking, 0 otherwise
    pub attack_index: u8,
    pub buffered_inputs: u8,
    /// Combo clock time of the last attack press
    pub last_input_at: Option<f32>,
    /// Failsafe deadline, always set while attacking
    pub expire_at: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboEvent {
    /// A swing started, play attack animation `index`
    AttackStarted { index: u8 },
    AttackEnded,
    /// The failsafe ended a swing that never received its end callback
    FailsafeTriggered,
}

#[derive(Debug, Clone)]
pub struct Combo {
    state: ComboState,
    max_buffered: u8,
    reset_time: f32,
    failsafe_time: f32,
    clock: f32,
    /// Incremented on every swing start, identifies the current swing
    swing: u32,
    events: Vec<ComboEvent>,
}

impl Combo {
    pub fn new(max_buffered: u8, reset_time: f32, failsafe_time: f32) -> Self {
        Self {
            state: ComboState::default(),
            max_buffered,
            reset_time,
            failsafe_time,
            clock: 0.0,
            swing: 0,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &ComboState {
        &self.state
    }

    pub fn is_attacking(&self) -> bool {
        self.state.attacking
    }

    pub fn attack_index(&self) -> u8 {
        self.state.attack_index
    }

    pub fn swing_id(&self) -> u32 {
        self.swing
    }

    pub fn drain_events(&mut self) -> Vec<ComboEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the combo clock, take this frame's press, then run the idle
    /// reset and the failsafe
    pub fn update(&mut self, dt: f32, attack_pressed: bool) {
        self.clock += dt;

        if attack_pressed {
            self.trigger();
        }

        if !self.state.attacking {
            let idle_for = self.state.last_input_at.map(|t| self.clock - t);
            if idle_for.map_or(true, |idle| idle > self.reset_time) {
                self.state.attack_index = 0;
                self.state.buffered_inputs = 0;
            }
        }

        if self.state.attacking && self.state.expire_at.is_some_and(|at| self.clock > at) {
            log::debug!("Combo failsafe at attack {}", self.state.attack_index);
            self.force_end();
            self.events.push(ComboEvent::FailsafeTriggered);
        }
    }

    /// An attack press: starts attack 1 when idle, otherwise buffers
    pub fn trigger(&mut self) {
        self.state.last_input_at = Some(self.clock);

        if self.state.attacking {
            self.state.buffered_inputs = self
                .state
                .buffered_inputs
                .saturating_add(1)
                .min(self.max_buffered);
            return;
        }

        self.start_attack(1);
    }

    pub fn on_combo_open(&mut self) {
        if self.state.attacking {
            self.state.window_open = true;
        }
    }

    /// Window close callback: advances when the window was open and input is buffered
    pub fn on_combo_window(&mut self) {
        if self.state.attacking && self.state.window_open {
            self.try_advance();
        }
    }

    /// End-of-swing callback. Buffered input still advances even when the
    /// window was missed, otherwise the combo ends.
    pub fn on_attack_end(&mut self) {
        if !self.state.attacking {
            return;
        }

        if self.state.attack_index < MAX_ATTACK_INDEX && self.state.buffered_inputs > 0 {
            self.try_advance();
            return;
        }

        self.force_end();
    }

    /// Drop straight back to idle
    pub fn force_end(&mut self) {
        let was_attacking = self.state.attacking;
        self.state = ComboState {
            last_input_at: self.state.last_input_at,
            ..ComboState::default()
        };
        if was_attacking {
            self.events.push(ComboEvent::AttackEnded);
        }
    }

    fn try_advance(&mut self) {
        if self.state.attack_index >= MAX_ATTACK_INDEX || self.state.buffered_inputs == 0 {
            return;
        }
        self.start_attack(self.state.attack_index + 1);
    }

    fn start_attack(&mut self, index: u8) {
        let index = index.clamp(1, MAX_ATTACK_INDEX);

        self.state.attacking = true;
        self.state.window_open = false;
        self.state.attack_index = index;
        self.state.buffered_inputs = self.state.buffered_inputs.saturating_sub(1);
        self.state.expire_at = Some(self.clock + self.failsafe_time);
        self.swing = self.swing.wrapping_add(1);

        self.events.push(ComboEvent::AttackStarted { index });
        log::debug!("Attack {}", index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const DT: f32 = 1.0 / 60.0;

    fn combo() -> Combo {
        Combo::new(3, 0.7, 1.3)
    }

    #[test]
    fn test_first_press_starts_attack_one() {
        let mut c = combo();
        c.update(DT, true);
        assert!(c.is_attacking());
        assert_eq!(c.attack_index(), 1);
        assert_eq!(c.drain_events(), vec![ComboEvent::AttackStarted { index: 1 }]);
    }

    #[test]
    fn test_window_advances_with_buffered_input() {
        let mut c = combo();
        c.update(DT, true);
        c.update(DT, true);
        assert_eq!(c.state().buffered_inputs, 1);
        assert_eq!(c.attack_index(), 1);

        // Closing a window that never opened does nothing
        c.on_combo_window();
        assert_eq!(c.attack_index(), 1);

        c.on_combo_open();
        c.on_combo_window();
        assert_eq!(c.attack_index(), 2);
        assert_eq!(c.state().buffered_inputs, 0);
        assert!(!c.state().window_open);
    }

    #[test]
    fn test_attack_end_recovers_missed_window() {
        let mut c = combo();
        c.update(DT, true);
        c.update(DT, true);
        c.on_attack_end();
        assert_eq!(c.attack_index(), 2);
        c.on_attack_end();
        assert!(!c.is_attacking());
        assert_eq!(c.attack_index(), 0);
    }

    #[test]
    fn test_third_attack_ends_chain() {
        let mut c = combo();
        c.update(DT, true);
        for _ in 0..5 {
            c.update(DT, true);
        }
        c.on_attack_end();
        c.on_attack_end();
        assert_eq!(c.attack_index(), 3);
        assert!(c.state().buffered_inputs > 0);
        c.on_attack_end();
        assert!(!c.is_attacking());
        assert_eq!(c.state().buffered_inputs, 0);
    }

    #[test]
    fn test_buffer_saturates_at_u8_max() {
        let mut c = Combo::new(u8::MAX, 0.7, 1.3);
        c.update(DT, true);
        for _ in 0..300 {
            c.trigger();
        }
        assert_eq!(c.state().buffered_inputs, u8::MAX);
    }

    #[test]
    fn test_failsafe_ends_stuck_attack() {
        let mut c = combo();
        c.update(DT, true);
        c.drain_events();
        c.update(1.0, false);
        assert!(c.is_attacking());
        c.update(0.5, false);
        assert!(!c.is_attacking());
        assert_eq!(
            c.drain_events(),
            vec![ComboEvent::AttackEnded, ComboEvent::FailsafeTriggered]
        );
    }

    #[test]
    fn test_swing_id_changes_per_attack() {
        let mut c = combo();
        c.update(DT, true);
        let first = c.swing_id();
        c.update(DT, true);
        c.on_attack_end();
        assert_ne!(c.swing_id(), first);
    }

    #[test]
    fn test_invariants_under_random_callbacks() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut c = combo();

        for _ in 0..5_000 {
            match rng.random_range(0..6) {
                0 => c.update(rng.random_range(0.0..0.2), true),
                1 => c.update(rng.random_range(0.0..0.2), false),
                2 => c.trigger(),
                3 => c.on_combo_open(),
                4 => c.on_combo_window(),
                _ => c.on_attack_end(),
            }

            let s = c.state();
            assert!(s.buffered_inputs <= 3);
            assert!(s.attack_index <= MAX_ATTACK_INDEX);
            assert_eq!(s.attack_index == 0, !s.attacking);
            assert_eq!(s.attacking, s.expire_at.is_some());
        }
    }
}
