// Game action definitions

/// Represents all possible in-game actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Movement
    MoveLeft,
    MoveRight,
    Jump,
    Dash,

    // Combat
    Attack,
}

impl Action {
    /// Horizontal contribution of a movement action
    pub fn axis_value(self) -> f32 {
        match self {
            Action::MoveLeft => -1.0,
            Action::MoveRight => 1.0,
            _ => 0.0,
        }
    }
}
