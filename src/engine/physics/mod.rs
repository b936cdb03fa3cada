// Physics: collaborator traits plus the rapier2d-backed world

pub mod body;
pub mod collision;
pub mod query;
mod world;

#[cfg(test)]
pub mod testing;

pub use body::{ColliderHandle, RigidBodyHandle};
pub use collision::{Layer, LayerMask};
pub use query::{CharacterPhysics, ColliderId, PhysicsBody, PhysicsQuery, RayHit};
pub use world::{collider_id, CharacterBody, PhysicsWorld};
