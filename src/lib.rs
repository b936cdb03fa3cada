// Movement, combat and run economy for a 2D action platformer
//
// - `core`: math helpers
// - `engine`: fixed-step loop, input edges, physics seam and rapier2d adapter
// - `game`: the player, combat and the run around them
// - `config`: TOML configuration

pub mod config;
pub mod core;
pub mod engine;
pub mod game;
