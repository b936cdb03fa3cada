// Per-player input state management

use super::action::Action;
use std::collections::HashSet;

/// Everything the gameplay state machines read from input in one frame.
///
/// Edge fields are true for exactly one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Horizontal axis in [-1, 1]
    pub horizontal: f32,
    pub jump_down: bool,
    pub jump_held: bool,
    pub jump_up: bool,
    pub dash_down: bool,
    pub attack_down: bool,
}

/// Input state for the local player
///
/// Two sources feed it: device buttons through `press`/`release`, and on-screen
/// virtual buttons through `jump_pressed`, `dash_pressed`, `set_move_axis`...
/// Virtual edges are one-shot like device edges and are cleared by `end_frame`.
#[derive(Debug, Default)]
pub struct PlayerInput {
    /// Actions that are currently pressed this frame
    pressed: HashSet<Action>,

    /// Actions that were just pressed this frame (press events)
    just_pressed: HashSet<Action>,

    /// Actions that were just released this frame (release events)
    just_released: HashSet<Action>,

    /// Virtual stick value; overrides the buttons when outside the deadzone
    virtual_axis: f32,
    virtual_jump_down: bool,
    virtual_jump_held: bool,
    virtual_jump_up: bool,
    virtual_dash_down: bool,
    virtual_attack_down: bool,
}

/// Virtual stick values smaller than this fall back to the buttons
const VIRTUAL_AXIS_DEADZONE: f32 = 0.01;

impl PlayerInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an action is currently pressed
    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Check if an action was just released this frame
    pub fn just_released(&self, action: Action) -> bool {
        self.just_released.contains(&action)
    }

    /// Register an action press
    pub fn press(&mut self, action: Action) {
        if self.pressed.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    /// Register an action release
    pub fn release(&mut self, action: Action) {
        if self.pressed.remove(&action) {
            self.just_released.insert(action);
        }
    }

    pub fn set_move_axis(&mut self, value: f32) {
        self.virtual_axis = value.clamp(-1.0, 1.0);
    }

    pub fn jump_pressed(&mut self) {
        self.virtual_jump_down = true;
        self.virtual_jump_held = true;
    }

    pub fn jump_released(&mut self) {
        self.virtual_jump_up = true;
        self.virtual_jump_held = false;
    }

    pub fn set_jump_held(&mut self, held: bool) {
        self.virtual_jump_held = held;
    }

    pub fn dash_pressed(&mut self) {
        self.virtual_dash_down = true;
    }

    pub fn attack_pressed(&mut self) {
        self.virtual_attack_down = true;
    }

    /// Horizontal axis from buttons, or the virtual stick when it is deflected
    pub fn horizontal(&self) -> f32 {
        if self.virtual_axis.abs() > VIRTUAL_AXIS_DEADZONE {
            return self.virtual_axis;
        }
        self.pressed
            .iter()
            .map(|a| a.axis_value())
            .sum::<f32>()
            .clamp(-1.0, 1.0)
    }

    /// Snapshot of this frame's input
    pub fn frame(&self) -> FrameInput {
        FrameInput {
            horizontal: self.horizontal(),
            jump_down: self.just_pressed(Action::Jump) || self.virtual_jump_down,
            jump_held: self.is_pressed(Action::Jump) || self.virtual_jump_held,
            jump_up: self.just_released(Action::Jump) || self.virtual_jump_up,
            dash_down: self.just_pressed(Action::Dash) || self.virtual_dash_down,
            attack_down: self.just_pressed(Action::Attack) || self.virtual_attack_down,
        }
    }

    /// Clear every one-shot edge. Call once at the end of each frame,
    /// whether or not the edges were acted upon.
    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.virtual_jump_down = false;
        self.virtual_jump_up = false;
        self.virtual_dash_down = false;
        self.virtual_attack_down = false;
    }

    /// Reset all input state (respawn, scene change)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_action() {
        let mut input = PlayerInput::new();
        input.press(Action::Jump);
        assert!(input.is_pressed(Action::Jump));
        assert!(input.just_pressed(Action::Jump));
        assert!(input.frame().jump_down);
        assert!(input.frame().jump_held);
    }

    #[test]
    fn test_release_action() {
        let mut input = PlayerInput::new();
        input.press(Action::Jump);
        input.end_frame();
        input.release(Action::Jump);
        assert!(!input.is_pressed(Action::Jump));
        assert!(input.frame().jump_up);
    }

    #[test]
    fn test_edges_do_not_leak_into_next_frame() {
        let mut input = PlayerInput::new();
        input.press(Action::Jump);
        input.dash_pressed();
        input.attack_pressed();
        input.end_frame();

        let frame = input.frame();
        assert!(!frame.jump_down);
        assert!(!frame.dash_down);
        assert!(!frame.attack_down);
        assert!(frame.jump_held);
    }

    #[test]
    fn test_virtual_jump_button() {
        let mut input = PlayerInput::new();
        input.jump_pressed();
        assert!(input.frame().jump_down);
        input.end_frame();
        assert!(input.frame().jump_held);
        input.jump_released();
        let frame = input.frame();
        assert!(frame.jump_up);
        assert!(!frame.jump_held);
    }

    #[test]
    fn test_release_unpressed_action() {
        let mut input = PlayerInput::new();
        input.release(Action::Jump);
        assert!(!input.just_released(Action::Jump));
    }

    #[test]
    fn test_horizontal_from_buttons_and_virtual_axis() {
        let mut input = PlayerInput::new();
        input.press(Action::MoveRight);
        assert_eq!(input.horizontal(), 1.0);
        input.press(Action::MoveLeft);
        assert_eq!(input.horizontal(), 0.0);

        input.set_move_axis(-0.5);
        assert_eq!(input.horizontal(), -0.5);
        input.set_move_axis(3.0);
        assert_eq!(input.horizontal(), 1.0);
    }

    #[test]
    fn test_reset() {
        let mut input = PlayerInput::new();
        input.press(Action::Jump);
        input.set_move_axis(1.0);
        input.reset();
        assert_eq!(input.frame(), FrameInput::default());
    }
}
