// Player health - HP, i-frames and the side effects of a hit

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::math::{clamp01, tick_down};
use crate::game::combat::damage::{knockback_direction, DamageInfo, Damageable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthTuning {
    pub max_hp: i32,
    /// Invulnerability after a hit, in seconds
    pub iframe_duration: f32,
    /// Sprite visibility toggles this often during i-frames
    pub flash_interval: f32,
    pub hurt_lock_duration: f32,
}

impl Default for HealthTuning {
    fn default() -> Self {
        Self {
            max_hp: 5,
            iframe_duration: 0.8,
            flash_interval: 0.07,
            hurt_lock_duration: 0.15,
        }
    }
}

/// Hit side effects that need the body, applied on the next fixed step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HealthEvent {
    /// Set the body's velocity to this
    Knockback { velocity: Vec2 },
    HurtLock(f32),
    Died,
}

#[derive(Debug, Clone)]
pub struct PlayerHealth {
    tuning: HealthTuning,
    hp: i32,
    invulnerable_for: f32,
    flash_timer: f32,
    visible: bool,
    events: Vec<HealthEvent>,
}

impl PlayerHealth {
    pub fn new(tuning: HealthTuning) -> Self {
        let hp = tuning.max_hp.max(1);
        Self {
            tuning,
            hp,
            invulnerable_for: 0.0,
            flash_timer: 0.0,
            visible: true,
            events: Vec::new(),
        }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.tuning.max_hp.max(1)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_for > 0.0
    }

    /// Sprite visibility, false on the "off" half of the i-frame flicker
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn drain_events(&mut self) -> Vec<HealthEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance i-frames and the flicker
    pub fn update(&mut self, dt: f32) {
        if !self.is_invulnerable() {
            return;
        }

        tick_down(&mut self.invulnerable_for, dt);
        if !self.is_invulnerable() {
            self.visible = true;
            return;
        }

        self.flash_timer -= dt;
        while self.flash_timer <= 0.0 && self.tuning.flash_interval > 0.0 {
            self.flash_timer += self.tuning.flash_interval;
            self.visible = !self.visible;
        }
    }

    /// Back to full HP with no i-frames, used on respawn
    pub fn reset_full(&mut self) {
        self.hp = self.max_hp();
        self.end_invulnerability();
        self.events.clear();
    }

    /// Mid-run revival: HP to a fraction of max (at least 1) plus i-frames
    pub fn revive(&mut self, health_fraction: f32, invulnerability: f32) {
        let max = self.max_hp();
        let hp = (max as f32 * clamp01(health_fraction)).ceil() as i32;
        self.hp = hp.clamp(1, max);
        self.events.clear();

        self.end_invulnerability();
        if invulnerability > 0.0 {
            self.start_invulnerability(invulnerability);
        }
        log::debug!("Revived with {}/{} HP", self.hp, max);
    }

    fn start_invulnerability(&mut self, duration: f32) {
        self.invulnerable_for = duration;
        self.flash_timer = 0.0;
        self.visible = true;
    }

    fn end_invulnerability(&mut self) {
        self.invulnerable_for = 0.0;
        self.flash_timer = 0.0;
        self.visible = true;
    }
}

impl Damageable for PlayerHealth {
    fn take_damage(&mut self, info: &DamageInfo) -> bool {
        if self.is_invulnerable() || self.hp == 0 {
            return false;
        }
        let amount = info.clamped_amount();
        if amount == 0 {
            return false;
        }

        self.hp = (self.hp - amount).max(0);

        if info.knockback_force > 0.0 {
            let velocity = knockback_direction(info.direction) * info.knockback_force;
            self.events.push(HealthEvent::Knockback { velocity });
        }
        self.events.push(HealthEvent::HurtLock(self.tuning.hurt_lock_duration));
        self.start_invulnerability(self.tuning.iframe_duration);

        if self.hp == 0 {
            log::info!("Player died");
            self.events.push(HealthEvent::Died);
        }
        true
    }

    fn is_dead(&self) -> bool {
        self.hp == 0
    }
}
