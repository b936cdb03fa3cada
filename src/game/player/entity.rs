// Player - movement, combat and health wired together
//
// The only place the three meet. Health queues hit side effects, the
// player applies them to the controller on the next fixed step, and
// transitions from all three are turned into animation cues.

use glam::Vec2;

use super::animation::{combo_cue, movement_cues, AnimationCue, AnimationParams, AnimationSink, NullAnimator};
use super::controller::{PlayerController, RunLifecycle};
use super::health::{HealthEvent, HealthTuning, PlayerHealth};
use super::state::MovementEvent;
use super::tuning::MovementTuning;
use crate::config::GameConfig;
use crate::engine::input::FrameInput;
use crate::engine::physics::{CharacterPhysics, PhysicsBody};
use crate::game::combat::{CombatFeedback, CombatTuning, DamageInfo, Damageable, PlayerCombat, TargetRegistry};
use crate::game::run::ReviveTicket;

pub struct Player {
    controller: PlayerController,
    combat: PlayerCombat,
    health: PlayerHealth,
    animator: Box<dyn AnimationSink>,
    params: AnimationParams,
}

impl Player {
    pub fn new(
        movement: MovementTuning,
        combat: CombatTuning,
        health: HealthTuning,
        spawn_position: Vec2,
    ) -> Self {
        Self {
            controller: PlayerController::new(movement, spawn_position),
            combat: PlayerCombat::new(combat),
            health: PlayerHealth::new(health),
            animator: Box::new(NullAnimator),
            params: AnimationParams {
                visible: true,
                ..AnimationParams::default()
            },
        }
    }

    pub fn from_config(config: &GameConfig, spawn_position: Vec2) -> Self {
        Self::new(
            config.movement.clone(),
            config.combat.clone(),
            config.health.clone(),
            spawn_position,
        )
    }

    pub fn with_animator(mut self, animator: Box<dyn AnimationSink>) -> Self {
        self.animator = animator;
        self
    }

    pub fn controller(&self) -> &PlayerController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlayerController {
        &mut self.controller
    }

    pub fn combat(&self) -> &PlayerCombat {
        &self.combat
    }

    pub fn health(&self) -> &PlayerHealth {
        &self.health
    }

    pub fn animation_params(&self) -> &AnimationParams {
        &self.params
    }

    /// Per-frame update: combo, movement, i-frames, then animation output
    pub fn frame<W>(&mut self, dt: f32, input: &FrameInput, world: &mut W)
    where
        W: CharacterPhysics + ?Sized,
    {
        let blocked = self.controller.is_dead()
            || self.controller.is_climbing_or_hanging()
            || self.controller.state().is_hurt_locked();

        self.combat.update(dt, input.attack_down && !blocked);
        self.controller
            .frame(dt, input, world, self.combat.is_attacking());
        self.health.update(dt);
        self.route_events();

        let c = &self.controller;
        self.params = AnimationParams {
            grounded: c.is_grounded(),
            hanging: c.is_ledge_hanging(),
            climbing: c.is_climbing(),
            flip_horizontal: c.facing() < 0,
            visible: self.health.visible(),
            ..self.params
        }
        .next(dt, world.velocity(), c.tuning().move_speed);
        self.animator.set_params(&self.params);
    }

    /// Physics-rate update. Hit side effects queued since the last step are
    /// applied first, so knockback and hurt lock land before movement.
    pub fn fixed_step<W>(&mut self, dt: f32, world: &mut W, mut run: Option<&mut dyn RunLifecycle>)
    where
        W: CharacterPhysics + ?Sized,
    {
        for event in self.health.drain_events() {
            match event {
                HealthEvent::Knockback { velocity } => {
                    if !self.controller.is_dead() {
                        world.set_velocity(velocity);
                    }
                }
                HealthEvent::HurtLock(duration) => self.controller.set_hurt_lock(duration),
                HealthEvent::Died => self.controller.die(world, run.take()),
            }
        }

        self.controller
            .fixed_update(dt, world, self.combat.is_attacking());
        self.route_events();
    }

    /// Instant death regardless of HP, e.g. falling out of the level
    pub fn kill<W>(&mut self, world: &mut W, run: Option<&mut dyn RunLifecycle>)
    where
        W: PhysicsBody + ?Sized,
    {
        self.controller.die(world, run);
        self.route_events();
    }

    /// Bring the player back where the run says, with the run's health terms
    pub fn apply_revive<W>(&mut self, world: &mut W, ticket: &ReviveTicket)
    where
        W: PhysicsBody + ?Sized,
    {
        self.controller.revive_at(world, ticket.position);
        self.health.revive(ticket.health_fraction, ticket.invulnerability);
        self.combat.reset();
        self.route_events();
    }

    // -- Combat animation callbacks -----------------------------------------

    pub fn on_combo_open(&mut self) {
        self.combat.on_combo_open();
    }

    pub fn on_combo_window(&mut self) {
        self.combat.on_combo_window();
        self.route_events();
    }

    pub fn on_attack_end(&mut self) {
        self.combat.on_attack_end();
        self.route_events();
    }

    pub fn on_lunge<W>(&mut self, world: &mut W)
    where
        W: PhysicsBody + ?Sized,
    {
        self.combat.on_lunge(world, self.controller.facing());
    }

    pub fn on_polygon_hit<W>(
        &mut self,
        attack_index: u8,
        world: &W,
        targets: &mut TargetRegistry,
        feedback: &mut dyn CombatFeedback,
    ) -> usize
    where
        W: CharacterPhysics + ?Sized,
    {
        self.combat
            .on_polygon_hit(attack_index, self.controller.facing(), world, targets, feedback)
    }

    /// Turn queued transitions into cues and cross-component resets
    fn route_events(&mut self) {
        for event in self.controller.drain_events() {
            match event {
                MovementEvent::Died { .. } => self.combat.reset(),
                MovementEvent::Respawned { .. } => self.health.reset_full(),
                _ => {}
            }
            for cue in movement_cues(&event) {
                self.animator.cue(*cue);
            }
        }

        for event in self.combat.drain_events() {
            if let Some(cue) = combo_cue(&event) {
                self.animator.cue(cue);
            }
        }
    }
}

impl Damageable for Player {
    fn take_damage(&mut self, info: &DamageInfo) -> bool {
        if self.controller.is_dead() {
            return false;
        }
        let applied = self.health.take_damage(info);
        if applied && !self.health.is_dead() {
            self.animator.cue(AnimationCue::Hurt);
        }
        applied
    }

    fn is_dead(&self) -> bool {
        self.health.is_dead() || self.controller.is_dead()
    }
}
