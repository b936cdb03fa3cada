use glam::Vec2;
use rapier2d::prelude::*;

use super::collision::LayerMask;
use super::query::{ColliderId, PhysicsBody, PhysicsQuery, RayHit};

/// Physics world that manages all physics simulation
pub struct PhysicsWorld {
    /// Gravity vector (default: -9.81 m/s² in y-axis)
    gravity: Vector<Real>,

    /// Integration parameters for the physics simulation
    integration_parameters: IntegrationParameters,

    /// Physics pipeline handles collision detection and solving
    physics_pipeline: PhysicsPipeline,

    /// Island manager for sleeping bodies
    island_manager: IslandManager,

    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,

    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,

    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,

    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,

    /// CCD solver for fast-moving objects
    ccd_solver: CCDSolver,

    /// Query pipeline for raycasts and shape queries
    query_pipeline: QueryPipeline,

    /// Rigid body set
    rigid_body_set: RigidBodySet,

    /// Collider set
    collider_set: ColliderSet,
}

impl PhysicsWorld {
    /// Create a new physics world with default settings
    pub fn new() -> Self {
        Self::with_gravity(vector![0.0, -9.81])
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vector<Real>) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        // Fixed timestep of 1/60 seconds (60 FPS)
        integration_parameters.dt = 1.0 / 60.0;

        Self {
            gravity,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
        }
    }

    /// Step the physics simulation forward by one timestep
    ///
    /// Also refreshes the query pipeline, so queries issued after a step see
    /// the post-step positions.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Add a rigid body to the physics world
    pub fn add_rigid_body(&mut self, body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(body)
    }

    /// Add a collider attached to a rigid body
    pub fn add_collider(
        &mut self,
        collider: Collider,
        parent_handle: RigidBodyHandle,
    ) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent_handle, &mut self.rigid_body_set)
    }

    /// Remove a rigid body and all its attached colliders
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true, // remove attached colliders
        );
    }

    /// Get a reference to a rigid body
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Get a mutable reference to a rigid body
    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    /// Bind a character body to this world for one update
    pub fn character(
        &mut self,
        body: RigidBodyHandle,
        half_extents: Vec2,
    ) -> CharacterBody<'_> {
        CharacterBody {
            world: self,
            body,
            half_extents,
        }
    }

    /// Set the timestep for physics simulation
    pub fn set_timestep(&mut self, dt: Real) {
        self.integration_parameters.dt = dt;
    }

    /// Get the current timestep
    pub fn timestep(&self) -> Real {
        self.integration_parameters.dt
    }

    fn cast_ray(&self, origin: Vec2, dir: Vec2, max_toi: Real, filter: QueryFilter) -> Option<RayHit> {
        let ray = Ray::new(point![origin.x, origin.y], vector![dir.x, dir.y]);
        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_toi,
                true,
                filter,
            )
            .map(|(handle, toi)| RayHit {
                point: origin + dir * toi,
                distance: toi,
                collider: collider_id(handle),
            })
    }

    fn any_in_circle(&self, center: Vec2, radius: f32, filter: QueryFilter) -> bool {
        let shape = Ball::new(radius);
        self.query_pipeline
            .intersection_with_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &Isometry::translation(center.x, center.y),
                &shape,
                filter,
            )
            .is_some()
    }

    fn all_in_box(&self, center: Vec2, half_extents: Vec2, filter: QueryFilter) -> Vec<ColliderId> {
        let shape = Cuboid::new(vector![half_extents.x, half_extents.y]);
        let mut hits = Vec::new();
        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &Isometry::translation(center.x, center.y),
            &shape,
            filter,
            |handle| {
                hits.push(collider_id(handle));
                true
            },
        );
        hits
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable id for a rapier collider handle (index and generation packed together)
pub fn collider_id(handle: ColliderHandle) -> ColliderId {
    let (index, generation) = handle.into_raw_parts();
    ColliderId(((generation as u64) << 32) | index as u64)
}

fn mask_filter(mask: LayerMask) -> QueryFilter<'static> {
    QueryFilter::default().groups(mask.to_query_groups())
}

impl PhysicsQuery for PhysicsWorld {
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> bool {
        self.any_in_circle(center, radius, mask_filter(mask))
    }

    fn raycast(&self, origin: Vec2, dir: Vec2, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        self.cast_ray(origin, dir, max_distance, mask_filter(mask))
    }

    fn overlap_box(&self, center: Vec2, half_extents: Vec2, mask: LayerMask) -> Vec<ColliderId> {
        self.all_in_box(center, half_extents, mask_filter(mask))
    }
}

/// A physics world view bound to one character body.
///
/// Queries issued through it never report the character's own colliders.
pub struct CharacterBody<'w> {
    world: &'w mut PhysicsWorld,
    body: RigidBodyHandle,
    half_extents: Vec2,
}

impl CharacterBody<'_> {
    fn filter(&self, mask: LayerMask) -> QueryFilter<'static> {
        mask_filter(mask).exclude_rigid_body(self.body)
    }

    fn rb(&self) -> Option<&RigidBody> {
        self.world.rigid_body_set.get(self.body)
    }

    fn rb_mut(&mut self) -> Option<&mut RigidBody> {
        self.world.rigid_body_set.get_mut(self.body)
    }
}

impl PhysicsQuery for CharacterBody<'_> {
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> bool {
        self.world.any_in_circle(center, radius, self.filter(mask))
    }

    fn raycast(&self, origin: Vec2, dir: Vec2, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        self.world.cast_ray(origin, dir, max_distance, self.filter(mask))
    }

    fn overlap_box(&self, center: Vec2, half_extents: Vec2, mask: LayerMask) -> Vec<ColliderId> {
        self.world.all_in_box(center, half_extents, self.filter(mask))
    }
}

impl PhysicsBody for CharacterBody<'_> {
    fn position(&self) -> Vec2 {
        self.rb()
            .map(|rb| Vec2::new(rb.translation().x, rb.translation().y))
            .unwrap_or(Vec2::ZERO)
    }

    fn set_position(&mut self, position: Vec2) {
        if let Some(rb) = self.rb_mut() {
            rb.set_translation(vector![position.x, position.y], true);
        }
    }

    fn velocity(&self) -> Vec2 {
        self.rb()
            .map(|rb| Vec2::new(rb.linvel().x, rb.linvel().y))
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        if let Some(rb) = self.rb_mut() {
            rb.set_linvel(vector![velocity.x, velocity.y], true);
        }
    }

    fn apply_impulse(&mut self, impulse: Vec2) {
        if let Some(rb) = self.rb_mut() {
            rb.apply_impulse(vector![impulse.x, impulse.y], true);
        }
    }

    fn gravity_scale(&self) -> f32 {
        self.rb().map(|rb| rb.gravity_scale()).unwrap_or(1.0)
    }

    fn set_gravity_scale(&mut self, scale: f32) {
        if let Some(rb) = self.rb_mut() {
            rb.set_gravity_scale(scale, true);
        }
    }

    fn is_simulated(&self) -> bool {
        self.rb().map(|rb| rb.is_enabled()).unwrap_or(false)
    }

    fn set_simulated(&mut self, simulated: bool) {
        if let Some(rb) = self.rb_mut() {
            rb.set_enabled(simulated);
        }
    }

    fn half_extents(&self) -> Vec2 {
        self.half_extents
    }
}

#[cfg(test)]
mod tests {
    use super::super::body::presets;
    use super::*;

    fn world_with_floor() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        let floor = world.add_rigid_body(presets::block_body(0.0, -0.5));
        world.add_collider(presets::block_collider(20.0, 1.0), floor);
        // Stepping refreshes the query pipeline with the static geometry
        world.step();
        world
    }

    #[test]
    fn test_raycast_hits_floor() {
        let world = world_with_floor();
        let hit = world
            .raycast(Vec2::new(0.0, 2.0), Vec2::NEG_Y, 5.0, LayerMask::GROUND)
            .expect("ray should hit the floor");
        assert!((hit.point.y - 0.0).abs() < 1e-3);
        assert!((hit.distance - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_raycast_respects_mask() {
        let world = world_with_floor();
        assert!(world
            .raycast(Vec2::new(0.0, 2.0), Vec2::NEG_Y, 5.0, LayerMask::HITTABLE)
            .is_none());
    }

    #[test]
    fn test_overlap_circle() {
        let world = world_with_floor();
        assert!(world.overlap_circle(Vec2::new(0.0, 0.05), 0.15, LayerMask::GROUND));
        assert!(!world.overlap_circle(Vec2::new(0.0, 1.0), 0.15, LayerMask::GROUND));
    }

    #[test]
    fn test_character_body_round_trips_state() {
        let mut world = world_with_floor();
        let handle = world.add_rigid_body(presets::player_body(0.0, 3.0));
        world.add_collider(presets::player_collider(1.0, 2.0), handle);

        let mut character = world.character(handle, Vec2::new(0.5, 1.0));
        character.set_velocity(Vec2::new(3.0, 1.0));
        character.set_gravity_scale(0.0);
        assert_eq!(character.velocity(), Vec2::new(3.0, 1.0));
        assert_eq!(character.gravity_scale(), 0.0);
        assert!(character.is_simulated());
        character.set_simulated(false);
        assert!(!character.is_simulated());
    }
}
