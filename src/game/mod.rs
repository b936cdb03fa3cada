// Game logic: the player, combat and the run around them

pub mod combat;
pub mod level;
pub mod player;
pub mod run;
