// Movement state - what the controller remembers between frames

use glam::Vec2;

use crate::engine::physics::RayHit;

/// Exclusive locomotion mode
///
/// Dashing, hanging, climbing and dead can never overlap, and the wall
/// states exclude all of them. Holding them in one enum makes that
/// impossible to get wrong.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Locomotion {
    /// Normal run/jump/fall
    #[default]
    Free,
    Dashing {
        remaining: f32,
        direction: f32,
    },
    /// Falling against a wall with no horizontal input
    WallSliding {
        side: i8,
    },
    /// Frozen against a wall while pressing toward it
    WallHolding {
        side: i8,
    },
    LedgeHanging {
        /// Time spent hanging, drives auto-climb
        hang_time: f32,
    },
    /// Simulation suspended, position interpolated from `start` to `end`
    Climbing {
        elapsed: f32,
        start: Vec2,
        end: Vec2,
    },
    Dead {
        /// Local respawn countdown, `None` when a run decides what happens
        respawn_in: Option<f32>,
    },
}

impl Locomotion {
    pub fn is_dashing(&self) -> bool {
        matches!(self, Self::Dashing { .. })
    }

    pub fn is_hanging(&self) -> bool {
        matches!(self, Self::LedgeHanging { .. })
    }

    pub fn is_climbing(&self) -> bool {
        matches!(self, Self::Climbing { .. })
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Dead { .. })
    }

    /// Side of the wall being slid on or held, 0 when not on a wall
    pub fn wall_side(&self) -> i8 {
        match self {
            Self::WallSliding { side } | Self::WallHolding { side } => *side,
            _ => 0,
        }
    }

    /// Modes that switch gravity off or suspend the body
    pub fn holds_body(&self) -> bool {
        matches!(
            self,
            Self::Dashing { .. }
                | Self::WallHolding { .. }
                | Self::LedgeHanging { .. }
                | Self::Climbing { .. }
                | Self::Dead { .. }
        )
    }

    /// Name used by the animation layer
    pub fn animation_name(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Dashing { .. } => "dash",
            Self::WallSliding { .. } => "wall_slide",
            Self::WallHolding { .. } => "wall_hold",
            Self::LedgeHanging { .. } => "hang",
            Self::Climbing { .. } => "climb",
            Self::Dead { .. } => "dead",
        }
    }
}

/// Everything the movement state machine owns
///
/// `Default` is the rest state: a freshly spawned character and a
/// respawned one compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementState {
    pub mode: Locomotion,
    /// 1 = right, -1 = left
    pub facing: i8,
    /// Written once per fixed step by the ground probe, read everywhere else
    pub grounded: bool,

    pub coyote_timer: f32,
    pub jump_buffer_timer: f32,
    pub jumping: bool,
    pub jump_hold_counter: f32,
    pub double_jump_used: bool,

    /// Seconds until a dash is allowed again
    pub dash_cooldown: f32,
    pub post_dash_grace: f32,
    pub hurt_lock: f32,

    pub ledge_cooldown: f32,
    pub wall_jump_input_lock: f32,
    pub wall_regrab_lock: f32,

    /// Wall face found by the ledge probe. Valid from the grab until the
    /// climb that consumes it finishes.
    pub wall_hit: Option<RayHit>,
    /// Ledge top found by the ledge probe, same lifetime as `wall_hit`
    pub top_hit: Option<RayHit>,

    pub move_input: f32,
    pub jump_held: bool,
}

impl Default for MovementState {
    fn default() -> Self {
        Self {
            mode: Locomotion::Free,
            facing: 1,
            grounded: false,
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            jumping: false,
            jump_hold_counter: 0.0,
            double_jump_used: false,
            dash_cooldown: 0.0,
            post_dash_grace: 0.0,
            hurt_lock: 0.0,
            ledge_cooldown: 0.0,
            wall_jump_input_lock: 0.0,
            wall_regrab_lock: 0.0,
            wall_hit: None,
            top_hit: None,
            move_input: 0.0,
            jump_held: false,
        }
    }
}

impl MovementState {
    pub fn is_hurt_locked(&self) -> bool {
        self.hurt_lock > 0.0
    }

    pub fn facing_dir(&self) -> Vec2 {
        Vec2::new(self.facing as f32, 0.0)
    }

    pub fn clear_jump(&mut self) {
        self.jumping = false;
        self.jump_hold_counter = 0.0;
    }
}

/// Notable transitions, drained by the owner each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementEvent {
    Jumped,
    DoubleJumped,
    WallJumped { side: i8 },
    DashStarted,
    DashEnded,
    LedgeGrabbed,
    ClimbStarted,
    ClimbFinished,
    Died { position: Vec2 },
    Respawned { position: Vec2 },
    Revived { position: Vec2 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_state() {
        let state = MovementState::default();
        assert_eq!(state.mode, Locomotion::Free);
        assert_eq!(state.facing, 1);
        assert!(!state.is_hurt_locked());
        assert_eq!(state.facing_dir(), Vec2::X);
    }

    #[test]
    fn test_wall_side() {
        assert_eq!(Locomotion::WallSliding { side: -1 }.wall_side(), -1);
        assert_eq!(Locomotion::WallHolding { side: 1 }.wall_side(), 1);
        assert_eq!(Locomotion::Free.wall_side(), 0);
    }

    #[test]
    fn test_holds_body() {
        assert!(Locomotion::Climbing {
            elapsed: 0.0,
            start: Vec2::ZERO,
            end: Vec2::ONE
        }
        .holds_body());
        assert!(!Locomotion::WallSliding { side: 1 }.holds_body());
        assert!(!Locomotion::Free.holds_body());
    }

    #[test]
    fn test_clear_jump() {
        let mut state = MovementState {
            jumping: true,
            jump_hold_counter: 0.1,
            ..Default::default()
        };
        state.clear_jump();
        assert!(!state.jumping);
        assert_eq!(state.jump_hold_counter, 0.0);
    }
}
