// Contact damage for hazards (spikes, saws, enemy bodies)

use glam::Vec2;

use super::damage::{DamageInfo, DamageSource, Damageable, VfxHandle};
use crate::engine::physics::{ColliderId, Layer, LayerMask};

/// Which part of a contact is being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Enter,
    Stay,
}

#[derive(Debug, Clone)]
pub struct ContactDamage {
    pub damage: i32,
    pub knockback_force: f32,
    /// Knock away from the hazard instead of straight up
    pub relative_direction: bool,
    pub knock_up_bias: f32,
    /// Damage on first touch only. When false, staying in contact repeats
    /// the hit every `cooldown` seconds.
    pub only_on_enter: bool,
    cooldown: f32,
    pub target_mask: LayerMask,
    pub vfx: Option<VfxHandle>,
    collider: ColliderId,
    position: Vec2,
    clock: f32,
    next_damage_at: f32,
}

impl ContactDamage {
    pub fn new(collider: ColliderId, position: Vec2) -> Self {
        Self {
            damage: 1,
            knockback_force: 11.0,
            relative_direction: true,
            knock_up_bias: 0.35,
            only_on_enter: true,
            cooldown: 0.35,
            target_mask: LayerMask::from_layers(&[Layer::Player]),
            vfx: None,
            collider,
            position,
            clock: 0.0,
            next_damage_at: 0.0,
        }
    }

    pub fn with_repeat(mut self, cooldown: f32) -> Self {
        self.only_on_enter = false;
        self.set_cooldown(cooldown);
        self
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    pub fn set_cooldown(&mut self, cooldown: f32) {
        self.cooldown = cooldown.max(0.01);
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Moving hazards update their position before contacts are reported
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn update(&mut self, dt: f32) {
        self.clock += dt;
    }

    /// Report a contact with something on `layer` at `hit_point`.
    /// Returns whether damage was applied.
    pub fn touch(
        &mut self,
        phase: ContactPhase,
        layer: Layer,
        hit_point: Vec2,
        target: &mut dyn Damageable,
    ) -> bool {
        if !self.target_mask.contains(layer) {
            return false;
        }
        if phase == ContactPhase::Stay && self.only_on_enter {
            return false;
        }
        if !self.only_on_enter && self.clock < self.next_damage_at {
            return false;
        }

        let normal = (hit_point - self.position).try_normalize().unwrap_or(Vec2::Y);
        let direction = if self.relative_direction {
            Vec2::new(normal.x, normal.y.max(self.knock_up_bias))
        } else {
            Vec2::Y
        };

        let info = DamageInfo::new(
            self.damage,
            direction,
            self.knockback_force,
            DamageSource::Hazard(self.collider),
        )
        .with_contact(hit_point, normal)
        .with_vfx(self.vfx);

        let applied = target.take_damage(&info);
        // A refused hit (i-frames) does not start the cooldown
        if applied && !self.only_on_enter {
            self.next_damage_at = self.clock + self.cooldown;
        }
        applied
    }
}
