// Input handling
//
// Platform polling lives outside this crate. The host translates device
// events into `PlayerInput::press`/`release` (or the virtual button calls for
// touch controls), reads one `FrameInput` per frame, and calls `end_frame`.
//
// - `action`: game actions
// - `player`: per-frame edge tracking and the `FrameInput` snapshot

pub mod action;
pub mod player;

pub use action::Action;
pub use player::{FrameInput, PlayerInput};
