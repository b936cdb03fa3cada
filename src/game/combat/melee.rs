// Player melee: combo, lunge and hit resolution

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combo::{Combo, ComboEvent, ComboState, MAX_ATTACK_INDEX};
use super::damage::{DamageInfo, DamageSource, TargetId};
use super::hit_stop::CombatFeedback;
use super::targets::TargetRegistry;
use crate::core::math::tick_down;
use crate::engine::physics::{CharacterPhysics, LayerMask, PhysicsBody};

/// Per-attack values are indexed by attack number minus one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub max_buffered_inputs: u8,
    /// Idle time after which the combo forgets where it was
    pub combo_reset_time: f32,
    /// Longest a single swing may last without an end callback
    pub attack_failsafe_time: f32,

    /// Horizontal impulse on the lunge callback, 0 for none
    pub lunge_impulses: [f32; 3],
    pub damages: [i32; 3],
    pub knockback_forces: [f32; 3],
    /// Minimum upward component of melee knockback before normalising
    pub knock_up_bias: f32,

    /// Full size of each attack's hitbox
    pub hitbox_sizes: [Vec2; 3],
    /// Hitbox centre relative to the body, x mirrored by facing
    pub hitbox_offsets: [Vec2; 3],
    /// How long a hitbox stays live after its hit callback
    pub hit_enable_time: f32,

    pub hit_stop_duration: f32,
    pub hit_stop_time_scale: f32,
    pub flash_time: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            max_buffered_inputs: 3,
            combo_reset_time: 0.7,
            attack_failsafe_time: 1.3,

            lunge_impulses: [2.0, 0.0, 3.5],
            damages: [1, 1, 2],
            knockback_forces: [9.0, 10.0, 12.0],
            knock_up_bias: 0.35,

            hitbox_sizes: [
                Vec2::new(1.0, 0.7),
                Vec2::new(1.1, 0.75),
                Vec2::new(1.2, 0.8),
            ],
            hitbox_offsets: [
                Vec2::new(0.55, 0.05),
                Vec2::new(0.6, 0.1),
                Vec2::new(0.7, 0.08),
            ],
            hit_enable_time: 0.03,

            hit_stop_duration: 0.035,
            hit_stop_time_scale: 0.08,
            flash_time: 0.08,
        }
    }
}

/// A hitbox that is currently live, for debug drawing and inspection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveHitbox {
    pub attack_index: u8,
    pub center: Vec2,
    pub half_extents: Vec2,
    pub remaining: f32,
}

/// Player combat: the combo machine plus everything that touches bodies
#[derive(Debug)]
pub struct PlayerCombat {
    tuning: CombatTuning,
    combo: Combo,
    hittable_mask: LayerMask,
    /// Targets already hit by the swing identified by `hits_swing`
    swing_hits: HashSet<TargetId>,
    hits_swing: u32,
    active_hitbox: Option<ActiveHitbox>,
}

impl PlayerCombat {
    pub fn new(tuning: CombatTuning) -> Self {
        let combo = Combo::new(
            tuning.max_buffered_inputs,
            tuning.combo_reset_time,
            tuning.attack_failsafe_time,
        );
        Self {
            tuning,
            combo,
            hittable_mask: LayerMask::HITTABLE,
            swing_hits: HashSet::new(),
            hits_swing: 0,
            active_hitbox: None,
        }
    }

    pub fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    pub fn combo_state(&self) -> &ComboState {
        self.combo.state()
    }

    pub fn is_attacking(&self) -> bool {
        self.combo.is_attacking()
    }

    pub fn attack_index(&self) -> u8 {
        self.combo.attack_index()
    }

    pub fn active_hitbox(&self) -> Option<&ActiveHitbox> {
        self.active_hitbox.as_ref()
    }

    pub fn drain_events(&mut self) -> Vec<ComboEvent> {
        self.combo.drain_events()
    }

    /// Per-frame update: attack press, combo reset, failsafe and hitbox window
    pub fn update(&mut self, dt: f32, attack_pressed: bool) {
        self.combo.update(dt, attack_pressed);

        if let Some(hitbox) = &mut self.active_hitbox {
            tick_down(&mut hitbox.remaining, dt);
            if hitbox.remaining <= 0.0 {
                self.active_hitbox = None;
            }
        }
    }

    /// Cancel any swing, e.g. on death
    pub fn reset(&mut self) {
        self.combo.force_end();
        self.active_hitbox = None;
        self.swing_hits.clear();
    }

    // -- Animation callbacks -----------------------------------------------

    pub fn on_combo_open(&mut self) {
        self.combo.on_combo_open();
    }

    pub fn on_combo_window(&mut self) {
        self.combo.on_combo_window();
    }

    pub fn on_attack_end(&mut self) {
        self.combo.on_attack_end();
    }

    /// Lunge forward: zero horizontal velocity, then a one-shot impulse
    /// sized by the current attack
    pub fn on_lunge<B>(&mut self, body: &mut B, facing: i8)
    where
        B: PhysicsBody + ?Sized,
    {
        let index = self.combo.attack_index();
        if index == 0 {
            return;
        }
        let impulse = self.tuning.lunge_impulses[usize::from(index - 1)];
        if impulse <= 0.0 {
            return;
        }

        let v = body.velocity();
        body.set_velocity(Vec2::new(0.0, v.y));
        body.apply_impulse(Vec2::new(facing as f32 * impulse, 0.0));
    }

    /// Hit callback for attack `attack_index` (clamped to 1..=3). Queries the
    /// hitbox once and damages each target at most once per swing. Returns
    /// the number of targets hit.
    pub fn on_polygon_hit<W>(
        &mut self,
        attack_index: u8,
        facing: i8,
        world: &W,
        targets: &mut TargetRegistry,
        feedback: &mut dyn CombatFeedback,
    ) -> usize
    where
        W: CharacterPhysics + ?Sized,
    {
        let index = attack_index.clamp(1, MAX_ATTACK_INDEX);
        let slot = usize::from(index - 1);
        let facing = if facing < 0 { -1.0 } else { 1.0 };

        if self.combo.swing_id() != self.hits_swing {
            self.hits_swing = self.combo.swing_id();
            self.swing_hits.clear();
        }

        let offset = self.tuning.hitbox_offsets[slot];
        let center = world.position() + Vec2::new(offset.x * facing, offset.y);
        let half_extents = self.tuning.hitbox_sizes[slot] * 0.5;
        self.active_hitbox = Some(ActiveHitbox {
            attack_index: index,
            center,
            half_extents,
            remaining: self.tuning.hit_enable_time,
        });

        let direction = Vec2::new(facing, self.tuning.knock_up_bias.max(0.0)).normalize();
        let damage = self.tuning.damages[slot];
        let knockback = self.tuning.knockback_forces[slot];

        let mut hits = 0;
        for collider in world.overlap_box(center, half_extents, self.hittable_mask) {
            let Some(target) = targets.resolve(collider) else {
                continue;
            };
            if !self.swing_hits.insert(target) {
                continue;
            }

            let info = DamageInfo::new(damage, direction, knockback, DamageSource::Player);
            targets.apply_damage(target, &info);
            feedback.request_hit_stop(self.tuning.hit_stop_duration, self.tuning.hit_stop_time_scale);
            feedback.flash(target);
            hits += 1;
        }

        if hits > 0 {
            log::debug!("Attack {} hit {} target(s)", index, hits);
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::testing::BoxWorld;
    use crate::engine::physics::Layer;
    use crate::game::combat::damage::Damageable;
    use crate::game::combat::hit_stop::FeedbackState;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    /// Records every hit it receives
    struct Dummy {
        log: Rc<RefCell<Vec<DamageInfo>>>,
    }

    impl Damageable for Dummy {
        fn take_damage(&mut self, info: &DamageInfo) -> bool {
            self.log.borrow_mut().push(*info);
            true
        }
    }

    struct Arena {
        world: BoxWorld,
        targets: TargetRegistry,
        feedback: FeedbackState,
        log: Rc<RefCell<Vec<DamageInfo>>>,
        target: TargetId,
    }

    /// Player at the origin with a dummy made of two colliders right in front
    fn arena() -> Arena {
        let mut world = BoxWorld::new(Vec2::ZERO);
        let head = world.add_solid(Vec2::new(0.4, 0.0), Vec2::new(0.9, 0.5), Layer::Hittable);
        let body = world.add_solid(Vec2::new(0.4, -0.5), Vec2::new(0.9, 0.0), Layer::Hittable);

        let log = Rc::new(RefCell::new(Vec::new()));
        let mut targets = TargetRegistry::new();
        let target = targets.register(Box::new(Dummy { log: log.clone() }));
        targets.attach_collider(target, head);
        targets.attach_collider(target, body);

        Arena {
            world,
            targets,
            feedback: FeedbackState::new(0.08),
            log,
            target,
        }
    }

    #[test]
    fn test_hit_deduplicated_within_swing() {
        let mut a = arena();
        let mut combat = PlayerCombat::new(CombatTuning::default());
        combat.update(DT, true);

        let hits = combat.on_polygon_hit(1, 1, &a.world, &mut a.targets, &mut a.feedback);
        assert_eq!(hits, 1);
        let again = combat.on_polygon_hit(1, 1, &a.world, &mut a.targets, &mut a.feedback);
        assert_eq!(again, 0);
        assert_eq!(a.log.borrow().len(), 1);

        assert!(a.feedback.hit_stop.is_active());
        assert!(a.feedback.is_flashing(a.target));
    }

    #[test]
    fn test_next_swing_hits_again() {
        let mut a = arena();
        let mut combat = PlayerCombat::new(CombatTuning::default());
        combat.update(DT, true);
        combat.on_polygon_hit(1, 1, &a.world, &mut a.targets, &mut a.feedback);

        combat.update(DT, true);
        combat.on_attack_end();
        assert_eq!(combat.attack_index(), 2);
        combat.on_polygon_hit(2, 1, &a.world, &mut a.targets, &mut a.feedback);
        assert_eq!(a.log.borrow().len(), 2);
    }

    #[test]
    fn test_knockback_direction_and_damage() {
        let mut a = arena();
        let mut combat = PlayerCombat::new(CombatTuning::default());
        combat.update(DT, true);
        combat.on_polygon_hit(3, 1, &a.world, &mut a.targets, &mut a.feedback);

        let info = a.log.borrow()[0];
        assert_eq!(info.amount, 2);
        assert_eq!(info.knockback_force, 12.0);
        assert_eq!(info.source, DamageSource::Player);
        let expected = Vec2::new(1.0, 0.35).normalize();
        assert_relative_eq!(info.direction.x, expected.x);
        assert_relative_eq!(info.direction.y, expected.y);
    }

    #[test]
    fn test_facing_away_misses() {
        let mut a = arena();
        let mut combat = PlayerCombat::new(CombatTuning::default());
        combat.update(DT, true);
        let hits = combat.on_polygon_hit(1, -1, &a.world, &mut a.targets, &mut a.feedback);
        assert_eq!(hits, 0);
        assert!(!a.feedback.hit_stop.is_active());
    }

    #[test]
    fn test_hitbox_window_expires() {
        let mut a = arena();
        let mut combat = PlayerCombat::new(CombatTuning::default());
        combat.update(DT, true);
        combat.on_polygon_hit(1, 1, &a.world, &mut a.targets, &mut a.feedback);
        assert!(combat.active_hitbox().is_some());
        combat.update(0.05, false);
        assert!(combat.active_hitbox().is_none());
    }

    #[test]
    fn test_lunge_impulse_by_attack() {
        let mut world = BoxWorld::new(Vec2::ZERO);
        world.velocity = Vec2::new(5.0, -1.0);
        let mut combat = PlayerCombat::new(CombatTuning::default());

        // Not attacking: nothing
        combat.on_lunge(&mut world, 1);
        assert_eq!(world.velocity, Vec2::new(5.0, -1.0));

        combat.update(DT, true);
        combat.on_lunge(&mut world, -1);
        assert_eq!(world.velocity, Vec2::new(-2.0, -1.0));

        // Attack 2 has no lunge
        combat.update(DT, true);
        combat.on_attack_end();
        world.velocity = Vec2::new(5.0, 0.0);
        combat.on_lunge(&mut world, 1);
        assert_eq!(world.velocity, Vec2::new(5.0, 0.0));
    }
}
