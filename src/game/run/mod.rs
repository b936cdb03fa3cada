// Run: stage progression, checkpoint economy and payouts

pub mod events;
pub mod manager;
pub mod mode;
pub mod progression;
pub mod reward;

pub use events::RunEvent;
pub use manager::{ReviveTicket, RunManager, RunPhase, RunResult, SCENE_MENU, SCENE_RUN};
pub use mode::{GameMode, ModeKind, ModeTable};
pub use progression::{InMemoryProgression, Progression, SceneLoader};
pub use reward::RewardResult;
