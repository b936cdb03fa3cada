// Level pieces the player interacts with

pub mod checkpoint;

pub use checkpoint::SpawnCheckpoint;
