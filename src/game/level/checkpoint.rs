// Spawn checkpoints - touch one to move where the player respawns

use glam::Vec2;

use crate::engine::physics::PhysicsBody;
use crate::game::player::PlayerController;

/// A trigger area that moves the player's spawn point the first time it is
/// entered. Later touches do nothing.
#[derive(Debug, Clone)]
pub struct SpawnCheckpoint {
    center: Vec2,
    half_extents: Vec2,
    /// Where to respawn, when that differs from the trigger's center
    marker: Option<Vec2>,
    activated: bool,
}

impl SpawnCheckpoint {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
            marker: None,
            activated: false,
        }
    }

    pub fn with_marker(mut self, marker: Vec2) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn spawn_position(&self) -> Vec2 {
        self.marker.unwrap_or(self.center)
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Does a box at `center` with `half_extents` touch the trigger
    pub fn overlaps(&self, center: Vec2, half_extents: Vec2) -> bool {
        let gap = (center - self.center).abs();
        let reach = half_extents + self.half_extents;
        gap.x <= reach.x && gap.y <= reach.y
    }

    /// Check the player's body against the trigger. Returns true when this
    /// touch activated the checkpoint.
    pub fn touch<W>(&mut self, body: &W, controller: &mut PlayerController) -> bool
    where
        W: PhysicsBody + ?Sized,
    {
        if self.activated || !self.overlaps(body.position(), body.half_extents()) {
            return false;
        }
        self.activated = true;
        controller.set_spawn_position(self.spawn_position());
        log::info!("Checkpoint reached, spawn moved to {:?}", self.spawn_position());
        true
    }
}
