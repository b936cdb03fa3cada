// Player character
//
// - `tuning`: movement knobs
// - `state`: locomotion modes and the state the controller carries
// - `controller`: the movement state machine
// - `health`: HP, i-frames and hit side effects
// - `animation`: cues and parameters for the animation layer
// - `entity`: the `Player` that wires all of the above together

pub mod animation;
pub mod controller;
pub mod entity;
pub mod health;
pub mod state;
pub mod tuning;

pub use animation::{AnimationCue, AnimationParams, AnimationSink, CueRecorder, NullAnimator};
pub use controller::{PlayerController, RunLifecycle};
pub use entity::Player;
pub use health::{HealthEvent, HealthTuning, PlayerHealth};
pub use state::{Locomotion, MovementEvent, MovementState};
pub use tuning::MovementTuning;
