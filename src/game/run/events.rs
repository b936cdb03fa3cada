// Run notifications, drained by the owner after each call into the run

use glam::Vec2;

use super::manager::RunResult;

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    RunStarted { seed: u64 },
    CoinsChanged { coins: i64 },
    StageChanged { stage: u32 },
    /// The run is paused on a checkpoint until it is continued or claimed
    CheckpointReached { stage: u32, pending_percent: f32 },
    CheckpointClaimed { coins: i64 },
    ReviveOffered { position: Vec2 },
    Revived { position: Vec2 },
    RunEnded { result: RunResult },
}
