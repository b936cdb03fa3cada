// Enemy health - a plain damageable, stunnable target

use glam::Vec2;

use super::damage::{DamageInfo, Damageable, Stunnable};
use crate::core::math::tick_down;

/// Stun applied by every accepted hit
const DEFAULT_HIT_STUN: f32 = 0.18;

#[derive(Debug, Clone)]
pub struct EnemyHealth {
    hp: i32,
    max_hp: i32,
    hit_stun: f32,
    stun_remaining: f32,
    /// Velocity the enemy's body should take on its next physics step
    pending_knockback: Option<Vec2>,
}

impl EnemyHealth {
    pub fn new(max_hp: i32) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            hp: max_hp,
            max_hp,
            hit_stun: DEFAULT_HIT_STUN,
            stun_remaining: 0.0,
            pending_knockback: None,
        }
    }

    pub fn with_hit_stun(mut self, duration: f32) -> Self {
        self.hit_stun = duration.max(0.0);
        self
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_remaining > 0.0
    }

    pub fn update(&mut self, dt: f32) {
        tick_down(&mut self.stun_remaining, dt);
    }

    /// Take the knockback velocity requested by the last hit
    pub fn take_knockback(&mut self) -> Option<Vec2> {
        self.pending_knockback.take()
    }
}

impl Damageable for EnemyHealth {
    fn take_damage(&mut self, info: &DamageInfo) -> bool {
        let amount = info.clamped_amount();
        if amount == 0 || self.hp == 0 {
            return false;
        }

        self.hp = (self.hp - amount).max(0);
        if info.knockback_force > 0.0 {
            self.pending_knockback = Some(info.knockback_velocity());
        }
        self.stun(self.hit_stun);

        if self.hp == 0 {
            log::debug!("Enemy defeated");
        }
        true
    }

    fn is_dead(&self) -> bool {
        self.hp == 0
    }

    fn stunnable(&mut self) -> Option<&mut dyn Stunnable> {
        Some(self as &mut dyn Stunnable)
    }
}

impl Stunnable for EnemyHealth {
    /// Restart the stun, keeping whichever remaining time is longer
    fn stun(&mut self, duration: f32) {
        self.stun_remaining = self.stun_remaining.max(duration);
    }
}
