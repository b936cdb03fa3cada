// Projectiles - straight shots that break on the first hittable thing they touch

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::damage::{DamageInfo, DamageSource, TargetId, VfxHandle};
use super::targets::TargetRegistry;
use crate::core::math::tick_down;
use crate::engine::physics::{LayerMask, PhysicsQuery};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub speed: f32,
    pub damage: i32,
    /// Seconds between shots
    pub cooldown: f32,
    /// Muzzle offset from the shooter, x mirrored by facing
    pub spawn_offset: Vec2,
    pub lifetime: f32,
    pub knockback_force: f32,
    /// Upward share of the knockback direction
    pub knock_up_bias: f32,
    pub half_extents: Vec2,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 12.0,
            damage: 1,
            cooldown: 0.6,
            spawn_offset: Vec2::new(0.6, 0.2),
            lifetime: 3.0,
            knockback_force: 8.0,
            knock_up_bias: 0.25,
            half_extents: Vec2::new(0.15, 0.15),
        }
    }
}

/// How a projectile's flight ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileEvent {
    /// Touched something hittable. `target` is None for colliders with no
    /// registered receiver.
    Hit { target: Option<TargetId>, applied: bool },
    Expired,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    position: Vec2,
    velocity: Vec2,
    facing: f32,
    damage: i32,
    knockback_force: f32,
    knock_up_bias: f32,
    half_extents: Vec2,
    lifetime: f32,
    mask: LayerMask,
    vfx: Option<VfxHandle>,
    spent: bool,
}

impl Projectile {
    /// Launch from `origin` along the facing side
    pub fn fire(origin: Vec2, facing: i8, tuning: &ProjectileTuning) -> Self {
        let facing = if facing < 0 { -1.0 } else { 1.0 };
        Self {
            position: origin,
            velocity: Vec2::new(facing * tuning.speed, 0.0),
            facing,
            damage: tuning.damage,
            knockback_force: tuning.knockback_force,
            knock_up_bias: tuning.knock_up_bias,
            half_extents: tuning.half_extents,
            lifetime: tuning.lifetime,
            mask: LayerMask::HITTABLE,
            vfx: None,
            spent: false,
        }
    }

    pub fn with_mask(mut self, mask: LayerMask) -> Self {
        self.mask = mask;
        self
    }

    pub fn with_vfx(mut self, vfx: Option<VfxHandle>) -> Self {
        self.vfx = vfx;
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Hit something or ran out of time. Spent projectiles no longer move.
    pub fn is_spent(&self) -> bool {
        self.spent
    }

    /// The hit this projectile delivers at its current position
    pub fn damage_info(&self) -> DamageInfo {
        let direction = Vec2::new(self.facing, self.knock_up_bias.max(0.0)).normalize();
        DamageInfo::new(
            self.damage,
            direction,
            self.knockback_force,
            DamageSource::Projectile,
        )
        .with_contact(self.position, direction)
        .with_vfx(self.vfx)
    }

    /// Fly for `dt`. Returns the event that ended the flight, if it ended.
    pub fn update<W>(
        &mut self,
        dt: f32,
        world: &W,
        targets: &mut TargetRegistry,
    ) -> Option<ProjectileEvent>
    where
        W: PhysicsQuery + ?Sized,
    {
        if self.spent {
            return None;
        }

        self.position += self.velocity * dt;

        let hits = world.overlap_box(self.position, self.half_extents, self.mask);
        if !hits.is_empty() {
            self.spent = true;
            let target = hits.iter().find_map(|c| targets.resolve(*c));
            let applied = match target {
                Some(id) => targets.apply_damage(id, &self.damage_info()),
                None => false,
            };
            log::debug!("Projectile hit {:?} at {:?}", target, self.position);
            return Some(ProjectileEvent::Hit { target, applied });
        }

        tick_down(&mut self.lifetime, dt);
        if self.lifetime <= 0.0 {
            self.spent = true;
            return Some(ProjectileEvent::Expired);
        }
        None
    }
}

/// Fires projectiles no faster than the cooldown allows
#[derive(Debug, Clone)]
pub struct ProjectileLauncher {
    tuning: ProjectileTuning,
    cooldown: f32,
}

impl ProjectileLauncher {
    pub fn new(tuning: ProjectileTuning) -> Self {
        Self {
            tuning,
            cooldown: 0.0,
        }
    }

    pub fn tuning(&self) -> &ProjectileTuning {
        &self.tuning
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    pub fn update(&mut self, dt: f32) {
        tick_down(&mut self.cooldown, dt);
    }

    /// Fire from a shooter standing at `shooter`, if off cooldown
    pub fn try_fire(&mut self, shooter: Vec2, facing: i8) -> Option<Projectile> {
        if !self.is_ready() {
            return None;
        }
        self.cooldown = self.tuning.cooldown;

        let side = if facing < 0 { -1.0 } else { 1.0 };
        let offset = self.tuning.spawn_offset;
        let origin = shooter + Vec2::new(offset.x * side, offset.y);
        Some(Projectile::fire(origin, facing, &self.tuning))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::engine::physics::testing::BoxWorld;
    use crate::engine::physics::Layer;
    use crate::game::combat::{Damageable, EnemyHealth};
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    /// Fly until the projectile reports something, at most five seconds
    fn fly(p: &mut Projectile, world: &BoxWorld, targets: &mut TargetRegistry) -> ProjectileEvent {
        for _ in 0..300 {
            if let Some(event) = p.update(DT, world, targets) {
                return event;
            }
        }
        panic!("projectile never landed");
    }

    #[derive(Default)]
    struct Recorder {
        hits: Vec<DamageInfo>,
    }

    impl Damageable for Recorder {
        fn take_damage(&mut self, info: &DamageInfo) -> bool {
            self.hits.push(*info);
            true
        }
    }

    #[test]
    fn test_shot_damages_registered_target() {
        let mut world = BoxWorld::new(Vec2::ZERO);
        let collider = world.add_solid(Vec2::new(2.0, -1.0), Vec2::new(3.0, 1.0), Layer::Hittable);
        let mut targets = TargetRegistry::new();
        let id = targets.register(Box::new(EnemyHealth::new(1)));
        targets.attach_collider(id, collider);

        let mut p = Projectile::fire(Vec2::ZERO, 1, &ProjectileTuning::default());
        let event = fly(&mut p, &world, &mut targets);

        assert_eq!(
            event,
            ProjectileEvent::Hit {
                target: Some(id),
                applied: true
            }
        );
        assert!(p.is_spent());
        assert!(targets.get(id).map_or(false, |t| t.is_dead()));
        assert_eq!(p.update(DT, &world, &mut targets), None);
    }

    #[test]
    fn test_knockback_leans_up_and_forward() {
        let mut world = BoxWorld::new(Vec2::ZERO);
        let collider =
            world.add_solid(Vec2::new(-3.0, -1.0), Vec2::new(-2.0, 1.0), Layer::Hittable);
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut targets = TargetRegistry::new();
        let id = targets.register(Box::new(recorder.clone()));
        targets.attach_collider(id, collider);

        let mut p = Projectile::fire(Vec2::ZERO, -1, &ProjectileTuning::default())
            .with_vfx(Some(VfxHandle(3)));
        fly(&mut p, &world, &mut targets);

        let recorded = recorder.borrow();
        let hits = &recorded.hits;
        assert_eq!(hits.len(), 1);
        let info = hits[0];
        let expected = Vec2::new(-1.0, 0.25).normalize();
        assert_relative_eq!(info.direction.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(info.direction.y, expected.y, epsilon = 1e-5);
        assert_eq!(info.source, DamageSource::Projectile);
        assert_eq!(info.hit_normal, Some(info.direction));
        assert_eq!(info.vfx, Some(VfxHandle(3)));
        assert_relative_eq!(info.knockback_force, 8.0);
    }

    #[test]
    fn test_unregistered_hittable_still_breaks_the_shot() {
        let mut world = BoxWorld::new(Vec2::ZERO);
        world.add_solid(Vec2::new(1.0, -1.0), Vec2::new(2.0, 1.0), Layer::Hittable);
        let mut targets = TargetRegistry::new();

        let mut p = Projectile::fire(Vec2::ZERO, 1, &ProjectileTuning::default());
        assert_eq!(
            fly(&mut p, &world, &mut targets),
            ProjectileEvent::Hit {
                target: None,
                applied: false
            }
        );
    }

    #[test]
    fn test_ground_is_ignored_and_shot_expires() {
        let mut world = BoxWorld::new(Vec2::ZERO);
        world.add_block(Vec2::new(1.0, -1.0), Vec2::new(2.0, 1.0));
        let mut targets = TargetRegistry::new();
        let tuning = ProjectileTuning {
            lifetime: 0.5,
            ..Default::default()
        };

        let mut p = Projectile::fire(Vec2::ZERO, 1, &tuning);
        assert_eq!(fly(&mut p, &world, &mut targets), ProjectileEvent::Expired);
        assert!(p.position().x > 5.0);
    }

    #[test]
    fn test_launcher_cooldown_and_mirrored_muzzle() {
        let mut launcher = ProjectileLauncher::new(ProjectileTuning::default());
        let shooter = Vec2::new(1.0, 1.0);

        let right = launcher.try_fire(shooter, 1).map(|p| p.position());
        assert_relative_eq!(right.map_or(0.0, |p| p.x), 1.6, epsilon = 1e-5);
        assert_relative_eq!(right.map_or(0.0, |p| p.y), 1.2, epsilon = 1e-5);
        assert!(launcher.try_fire(shooter, 1).is_none());

        launcher.update(0.3);
        assert!(!launcher.is_ready());
        launcher.update(0.3);

        let left = launcher.try_fire(shooter, -1);
        let position = left.as_ref().map_or(Vec2::ZERO, |p| p.position());
        assert_relative_eq!(position.x, 0.4, epsilon = 1e-5);
        assert_relative_eq!(position.y, 1.2, epsilon = 1e-5);
        assert_eq!(left.map(|p| p.velocity()), Some(Vec2::new(-12.0, 0.0)));
    }
}
