// Charger enemy
//
// Walks back and forth around its home point. When the player comes within
// range it stops, turns to face them, winds up, dashes, and recovers before
// it may attack again. Any stun cancels the attack outright.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::damage::{DamageInfo, Damageable, Stunnable};
use super::enemy::EnemyHealth;
use crate::engine::physics::{CharacterPhysics, Layer, LayerMask};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargerTuning {
    pub max_hp: i32,
    pub patrol_speed: f32,
    /// How far from home the patrol turns around
    pub patrol_distance: f32,
    pub detection_range: f32,
    pub wind_up_time: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub recovery_time: f32,
    /// Gap between the end of one attack and the next detection
    pub min_attack_interval: f32,
    pub hit_stun: f32,
    /// Detection stays off this long after a stun wears off
    pub post_stun_delay: f32,
}

impl Default for ChargerTuning {
    fn default() -> Self {
        Self {
            max_hp: 3,
            patrol_speed: 2.0,
            patrol_distance: 3.0,
            detection_range: 4.0,
            wind_up_time: 0.25,
            dash_speed: 10.0,
            dash_duration: 0.35,
            recovery_time: 0.4,
            min_attack_interval: 0.9,
            hit_stun: 0.18,
            post_stun_delay: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChargerPhase {
    Patrol,
    WindUp { remaining: f32 },
    Dash { remaining: f32 },
    Recovery { remaining: f32 },
    Stunned { remaining: f32 },
}

#[derive(Debug, Clone)]
pub struct EnemyCharger {
    tuning: ChargerTuning,
    health: EnemyHealth,
    phase: ChargerPhase,
    facing: i8,
    home_x: f32,
    clock: f32,
    next_attack_at: f32,
    /// Zero the body's velocity on the next update
    halt: bool,
}

/// Count `remaining` down by `dt`. None once it runs out.
fn countdown(remaining: f32, dt: f32) -> Option<f32> {
    let left = remaining - dt;
    (left > 0.0).then_some(left)
}

impl EnemyCharger {
    pub fn new(tuning: ChargerTuning, home: Vec2) -> Self {
        let health = EnemyHealth::new(tuning.max_hp).with_hit_stun(tuning.hit_stun);
        Self {
            tuning,
            health,
            phase: ChargerPhase::Patrol,
            facing: 1,
            home_x: home.x,
            clock: 0.0,
            next_attack_at: 0.0,
            halt: false,
        }
    }

    pub fn phase(&self) -> ChargerPhase {
        self.phase
    }

    pub fn facing(&self) -> i8 {
        self.facing
    }

    pub fn health(&self) -> &EnemyHealth {
        &self.health
    }

    pub fn is_attacking(&self) -> bool {
        matches!(
            self.phase,
            ChargerPhase::WindUp { .. } | ChargerPhase::Dash { .. } | ChargerPhase::Recovery { .. }
        )
    }

    /// Advance the AI by `dt` and drive the body. `player` is the player's
    /// position, used to face them when an attack starts.
    pub fn update<W>(&mut self, dt: f32, world: &mut W, player: Option<Vec2>)
    where
        W: CharacterPhysics + ?Sized,
    {
        self.clock += dt;
        self.health.update(dt);

        if std::mem::take(&mut self.halt) {
            world.set_velocity(Vec2::ZERO);
        }
        if let Some(knockback) = self.health.take_knockback() {
            world.set_velocity(knockback);
        }

        if self.health.is_dead() {
            let v = world.velocity();
            world.set_velocity(Vec2::new(0.0, v.y));
            return;
        }

        self.phase = match self.phase {
            ChargerPhase::Stunned { remaining } => match countdown(remaining, dt) {
                Some(left) => ChargerPhase::Stunned { remaining: left },
                None => {
                    self.next_attack_at = self.clock + self.tuning.post_stun_delay;
                    ChargerPhase::Patrol
                }
            },
            ChargerPhase::WindUp { remaining } => match countdown(remaining, dt) {
                Some(left) => ChargerPhase::WindUp { remaining: left },
                None => {
                    self.push_dash(world);
                    ChargerPhase::Dash {
                        remaining: self.tuning.dash_duration,
                    }
                }
            },
            ChargerPhase::Dash { remaining } => match countdown(remaining, dt) {
                Some(left) => {
                    self.push_dash(world);
                    ChargerPhase::Dash { remaining: left }
                }
                None => {
                    world.set_velocity(Vec2::ZERO);
                    ChargerPhase::Recovery {
                        remaining: self.tuning.recovery_time,
                    }
                }
            },
            ChargerPhase::Recovery { remaining } => match countdown(remaining, dt) {
                Some(left) => ChargerPhase::Recovery { remaining: left },
                None => {
                    self.next_attack_at = self.clock + self.tuning.min_attack_interval;
                    ChargerPhase::Patrol
                }
            },
            ChargerPhase::Patrol => {
                if self.player_in_range(world) {
                    self.start_attack(world, player)
                } else {
                    self.patrol(world);
                    ChargerPhase::Patrol
                }
            }
        };
    }

    fn player_in_range<W>(&self, world: &W) -> bool
    where
        W: CharacterPhysics + ?Sized,
    {
        if self.clock < self.next_attack_at {
            return false;
        }
        let players = LayerMask::from_layers(&[Layer::Player]);
        world.overlap_circle(world.position(), self.tuning.detection_range, players)
    }

    fn start_attack<W>(&mut self, world: &mut W, player: Option<Vec2>) -> ChargerPhase
    where
        W: CharacterPhysics + ?Sized,
    {
        world.set_velocity(Vec2::ZERO);
        if let Some(player) = player {
            self.facing = if player.x >= world.position().x { 1 } else { -1 };
        }
        log::debug!("Charger winding up, facing {}", self.facing);
        ChargerPhase::WindUp {
            remaining: self.tuning.wind_up_time,
        }
    }

    fn push_dash<W>(&self, world: &mut W)
    where
        W: CharacterPhysics + ?Sized,
    {
        let v = world.velocity();
        world.set_velocity(Vec2::new(self.facing as f32 * self.tuning.dash_speed, v.y));
    }

    fn patrol<W>(&mut self, world: &mut W)
    where
        W: CharacterPhysics + ?Sized,
    {
        let v = world.velocity();
        world.set_velocity(Vec2::new(self.facing as f32 * self.tuning.patrol_speed, v.y));

        // Only turn while heading away, so a charger pushed past the edge walks back
        let offset = world.position().x - self.home_x;
        if offset * self.facing as f32 >= self.tuning.patrol_distance {
            self.facing = -self.facing;
        }
    }
}

impl Stunnable for EnemyCharger {
    /// Cancels any attack. A later stun replaces the remaining time.
    fn stun(&mut self, duration: f32) {
        if duration <= 0.0 {
            return;
        }
        self.phase = ChargerPhase::Stunned {
            remaining: duration,
        };
        self.halt = true;
    }
}

impl Damageable for EnemyCharger {
    fn take_damage(&mut self, info: &DamageInfo) -> bool {
        let applied = self.health.take_damage(info);
        if applied {
            self.stun(self.tuning.hit_stun);
        }
        applied
    }

    fn is_dead(&self) -> bool {
        self.health.is_dead()
    }

    fn stunnable(&mut self) -> Option<&mut dyn Stunnable> {
        Some(self)
    }
}
