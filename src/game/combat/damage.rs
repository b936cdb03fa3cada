// Damage payloads and the capabilities that receive them

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::engine::physics::ColliderId;

/// Identity of something that can be hit, shared by all of its colliders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u32);

/// Opaque handle to a hit effect the receiver may spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VfxHandle(pub u32);

/// Who dealt the damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DamageSource {
    #[default]
    Unknown,
    Player,
    /// A shot fired by the player
    Projectile,
    Hazard(ColliderId),
}

/// Everything a receiver needs to resolve one hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageInfo {
    pub amount: i32,
    /// Knockback direction, normalised by the sender when possible
    pub direction: Vec2,
    pub knockback_force: f32,
    pub source: DamageSource,
    pub hit_point: Option<Vec2>,
    pub hit_normal: Option<Vec2>,
    pub vfx: Option<VfxHandle>,
}

impl DamageInfo {
    pub fn new(amount: i32, direction: Vec2, knockback_force: f32, source: DamageSource) -> Self {
        Self {
            amount,
            direction,
            knockback_force,
            source,
            hit_point: None,
            hit_normal: None,
            vfx: None,
        }
    }

    pub fn with_contact(mut self, point: Vec2, normal: Vec2) -> Self {
        self.hit_point = Some(point);
        self.hit_normal = Some(normal);
        self
    }

    pub fn with_vfx(mut self, vfx: Option<VfxHandle>) -> Self {
        self.vfx = vfx;
        self
    }

    /// Damage with negatives clamped away
    pub fn clamped_amount(&self) -> i32 {
        self.amount.max(0)
    }

    /// Knockback velocity: direction normalised (straight up when degenerate) times force
    pub fn knockback_velocity(&self) -> Vec2 {
        knockback_direction(self.direction) * self.knockback_force.max(0.0)
    }
}

/// Normalise a knockback direction, falling back to straight up
pub fn knockback_direction(direction: Vec2) -> Vec2 {
    if direction.length_squared() < 1e-4 {
        Vec2::Y
    } else {
        direction.normalize()
    }
}

/// Something that takes damage
pub trait Damageable {
    /// Apply a hit. Returns false with no effect when the hit was refused
    /// (zero damage, invulnerable, already dead).
    fn take_damage(&mut self, info: &DamageInfo) -> bool;

    fn is_dead(&self) -> bool {
        false
    }

    /// The stun capability, when this target has one
    fn stunnable(&mut self) -> Option<&mut dyn Stunnable> {
        None
    }
}

/// Something that can be stunned
pub trait Stunnable {
    fn stun(&mut self, duration: f32);
}

/// A target shared between the registry and whoever drives it each tick
impl<T: Damageable> Damageable for Rc<RefCell<T>> {
    fn take_damage(&mut self, info: &DamageInfo) -> bool {
        self.borrow_mut().take_damage(info)
    }

    fn is_dead(&self) -> bool {
        self.borrow().is_dead()
    }

    fn stunnable(&mut self) -> Option<&mut dyn Stunnable> {
        if self.borrow_mut().stunnable().is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl<T: Damageable> Stunnable for Rc<RefCell<T>> {
    fn stun(&mut self, duration: f32) {
        if let Some(target) = self.borrow_mut().stunnable() {
            target.stun(duration);
        }
    }
}
