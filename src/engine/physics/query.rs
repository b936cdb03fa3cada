// Physics collaborator seam
//
// The movement and combat state machines never talk to a physics engine
// directly. They see a world they can query and a single body they own.
// `PhysicsWorld` (rapier2d) implements these for the real game, the box
// world in `testing` implements them for unit tests.

use glam::Vec2;

use super::collision::LayerMask;

/// Opaque identity of a collider returned by queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub u64);

/// Result of a successful raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space impact point
    pub point: Vec2,
    /// Distance travelled along the ray
    pub distance: f32,
    /// Collider that was hit
    pub collider: ColliderId,
}

/// Spatial queries against the static and dynamic world
pub trait PhysicsQuery {
    /// True if any collider on `mask` overlaps the circle
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> bool;

    /// First hit along `dir` (expected normalized) within `max_distance`
    fn raycast(&self, origin: Vec2, dir: Vec2, max_distance: f32, mask: LayerMask)
        -> Option<RayHit>;

    /// All colliders on `mask` overlapping an axis-aligned box
    fn overlap_box(&self, center: Vec2, half_extents: Vec2, mask: LayerMask) -> Vec<ColliderId>;
}

/// The one body a character controller drives
pub trait PhysicsBody {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);

    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);

    /// Instantaneous change of momentum
    fn apply_impulse(&mut self, impulse: Vec2);

    fn gravity_scale(&self) -> f32;
    fn set_gravity_scale(&mut self, scale: f32);

    fn is_simulated(&self) -> bool;
    fn set_simulated(&mut self, simulated: bool);

    /// Half width/height of the body's collider bounds
    fn half_extents(&self) -> Vec2;
}

/// A world view bound to one controlled body
pub trait CharacterPhysics: PhysicsQuery + PhysicsBody {}

impl<T: PhysicsQuery + PhysicsBody> CharacterPhysics for T {}
