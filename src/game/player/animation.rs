// Animation triggers for the player
//
// Movement and combat never drive an animator directly. They report what
// happened, and this module turns those reports into fire-and-forget cues
// plus a set of continuous parameters, for whatever animation layer the
// host has.

use glam::Vec2;

use super::state::MovementEvent;
use crate::core::math::{clamp01, lerp};
use crate::game::combat::ComboEvent;

/// Vertical speeds below this are reported as zero
const V_SPEED_DEADZONE: f32 = 0.05;

/// How quickly the reported run speed follows the real one
const SPEED_SMOOTHING: f32 = 15.0;

/// A one-shot trigger or a flag change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationCue {
    Attack { index: u8 },
    Jump,
    DoubleJump,
    WallJump,
    Dash,
    EdgeGrab,
    Hanging(bool),
    Climbing(bool),
    Hurt,
    Death,
    Respawn,
}

/// Continuous animator parameters, refreshed every frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationParams {
    /// Horizontal speed over move speed, smoothed, 0..=1
    pub speed: f32,
    pub v_speed: f32,
    pub grounded: bool,
    pub hanging: bool,
    pub climbing: bool,
    pub flip_horizontal: bool,
    pub visible: bool,
}

impl AnimationParams {
    /// Next parameters from the body's velocity, smoothing the run speed
    pub fn next(&self, dt: f32, velocity: Vec2, move_speed: f32) -> Self {
        let target = if move_speed > 0.01 {
            clamp01(velocity.x.abs() / move_speed)
        } else {
            0.0
        };
        let v_speed = if velocity.y.abs() < V_SPEED_DEADZONE {
            0.0
        } else {
            velocity.y
        };

        Self {
            speed: lerp(self.speed, target, clamp01(SPEED_SMOOTHING * dt)),
            v_speed,
            ..*self
        }
    }
}

/// Receiver for animation output
pub trait AnimationSink {
    fn cue(&mut self, cue: AnimationCue);
    fn set_params(&mut self, params: &AnimationParams);
}

/// Sink that drops everything, for headless runs
#[derive(Debug, Default)]
pub struct NullAnimator;

impl AnimationSink for NullAnimator {
    fn cue(&mut self, _cue: AnimationCue) {}
    fn set_params(&mut self, _params: &AnimationParams) {}
}

/// Sink that keeps every cue and the latest parameters
#[derive(Debug, Default)]
pub struct CueRecorder {
    pub cues: Vec<AnimationCue>,
    pub params: AnimationParams,
}

impl AnimationSink for CueRecorder {
    fn cue(&mut self, cue: AnimationCue) {
        self.cues.push(cue);
    }

    fn set_params(&mut self, params: &AnimationParams) {
        self.params = *params;
    }
}

/// Cues for a movement transition
pub fn movement_cues(event: &MovementEvent) -> &'static [AnimationCue] {
    match event {
        MovementEvent::Jumped => &[AnimationCue::Jump],
        MovementEvent::DoubleJumped => &[AnimationCue::DoubleJump],
        MovementEvent::WallJumped { .. } => &[AnimationCue::WallJump],
        MovementEvent::DashStarted => &[AnimationCue::Dash],
        MovementEvent::DashEnded => &[],
        MovementEvent::LedgeGrabbed => &[AnimationCue::EdgeGrab, AnimationCue::Hanging(true)],
        MovementEvent::ClimbStarted => &[AnimationCue::Hanging(false), AnimationCue::Climbing(true)],
        MovementEvent::ClimbFinished => &[AnimationCue::Hanging(false), AnimationCue::Climbing(false)],
        MovementEvent::Died { .. } => &[
            AnimationCue::Hanging(false),
            AnimationCue::Climbing(false),
            AnimationCue::Death,
        ],
        MovementEvent::Respawned { .. } | MovementEvent::Revived { .. } => &[AnimationCue::Respawn],
    }
}

/// Cue for a combo transition, if any
pub fn combo_cue(event: &ComboEvent) -> Option<AnimationCue> {
    match event {
        ComboEvent::AttackStarted { index } => Some(AnimationCue::Attack { index: *index }),
        ComboEvent::AttackEnded | ComboEvent::FailsafeTriggered => None,
    }
}
