// Axis-aligned box world for unit tests
//
// Implements both physics collaborator traits with plain rect math so the
// movement and combat state machines can be driven against hand-built rooms.
// Bodies do not collide: tests place the character where they need it.

use glam::Vec2;

use super::collision::{Layer, LayerMask};
use super::query::{ColliderId, PhysicsBody, PhysicsQuery, RayHit};

#[derive(Debug, Clone, Copy)]
pub struct Solid {
    pub id: ColliderId,
    pub min: Vec2,
    pub max: Vec2,
    pub layer: Layer,
}

#[derive(Debug, Clone)]
pub struct BoxWorld {
    pub solids: Vec<Solid>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub simulated: bool,
    pub half_extents: Vec2,
    pub mass: f32,
    next_id: u64,
}

impl BoxWorld {
    pub fn new(position: Vec2) -> Self {
        Self {
            solids: Vec::new(),
            position,
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            simulated: true,
            half_extents: Vec2::new(0.5, 1.0),
            mass: 1.0,
            next_id: 1,
        }
    }

    /// Add a ground block spanning `min..max`
    pub fn add_block(&mut self, min: Vec2, max: Vec2) -> ColliderId {
        self.add_solid(min, max, Layer::Ground)
    }

    pub fn add_solid(&mut self, min: Vec2, max: Vec2, layer: Layer) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        self.solids.push(Solid { id, min, max, layer });
        id
    }

    /// Explicit Euler step under `gravity`, skipped when not simulated
    pub fn integrate(&mut self, gravity: f32, dt: f32) {
        if !self.simulated {
            return;
        }
        self.velocity.y += gravity * self.gravity_scale * dt;
        self.position += self.velocity * dt;
    }

    fn visible(&self, mask: LayerMask) -> impl Iterator<Item = &Solid> {
        self.solids.iter().filter(move |s| mask.contains(s.layer))
    }
}

fn ray_vs_box(origin: Vec2, dir: Vec2, min: Vec2, max: Vec2) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..2 {
        let (o, d, lo, hi) = (origin[axis], dir[axis], min[axis], max[axis]);
        if d.abs() < f32::EPSILON {
            if o < lo || o > hi {
                return None;
            }
        } else {
            let t1 = (lo - o) / d;
            let t2 = (hi - o) / d;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
        }
    }

    if t_max < t_min || t_max < 0.0 {
        return None;
    }
    Some(t_min.max(0.0))
}

impl PhysicsQuery for BoxWorld {
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> bool {
        self.visible(mask).any(|s| {
            let closest = center.clamp(s.min, s.max);
            closest.distance_squared(center) <= radius * radius
        })
    }

    fn raycast(&self, origin: Vec2, dir: Vec2, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        self.visible(mask)
            .filter_map(|s| {
                ray_vs_box(origin, dir, s.min, s.max)
                    .filter(|t| *t <= max_distance)
                    .map(|t| RayHit {
                        point: origin + dir * t,
                        distance: t,
                        collider: s.id,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn overlap_box(&self, center: Vec2, half_extents: Vec2, mask: LayerMask) -> Vec<ColliderId> {
        let (lo, hi) = (center - half_extents, center + half_extents);
        self.visible(mask)
            .filter(|s| s.min.x <= hi.x && s.max.x >= lo.x && s.min.y <= hi.y && s.max.y >= lo.y)
            .map(|s| s.id)
            .collect()
    }
}

impl PhysicsBody for BoxWorld {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn apply_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse / self.mass;
    }

    fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }

    fn is_simulated(&self) -> bool {
        self.simulated
    }

    fn set_simulated(&mut self, simulated: bool) {
        self.simulated = simulated;
    }

    fn half_extents(&self) -> Vec2 {
        self.half_extents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raycast_nearest_hit() {
        let mut world = BoxWorld::new(Vec2::ZERO);
        let near = world.add_block(Vec2::new(1.0, -1.0), Vec2::new(2.0, 1.0));
        world.add_block(Vec2::new(3.0, -1.0), Vec2::new(4.0, 1.0));

        let hit = world
            .raycast(Vec2::ZERO, Vec2::X, 10.0, LayerMask::GROUND)
            .unwrap();
        assert_eq!(hit.collider, near);
        assert_eq!(hit.point, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_raycast_out_of_range() {
        let mut world = BoxWorld::new(Vec2::ZERO);
        world.add_block(Vec2::new(1.0, -1.0), Vec2::new(2.0, 1.0));
        assert!(world
            .raycast(Vec2::ZERO, Vec2::X, 0.5, LayerMask::GROUND)
            .is_none());
        assert!(world
            .raycast(Vec2::ZERO, Vec2::NEG_X, 10.0, LayerMask::GROUND)
            .is_none());
    }

    #[test]
    fn test_circle_overlap() {
        let mut world = BoxWorld::new(Vec2::ZERO);
        world.add_block(Vec2::new(-5.0, -1.0), Vec2::new(5.0, 0.0));
        assert!(world.overlap_circle(Vec2::new(0.0, 0.1), 0.15, LayerMask::GROUND));
        assert!(!world.overlap_circle(Vec2::new(0.0, 0.5), 0.15, LayerMask::GROUND));
        assert!(!world.overlap_circle(Vec2::new(0.0, 0.1), 0.15, LayerMask::HITTABLE));
    }
}
