// Player movement controller
//
// Two entry points per tick, mirroring the host loop:
// - `frame`: once per rendered frame. Reads input, runs timers and
//   interpolations, starts jumps, dashes, ledge grabs and climbs.
// - `fixed_update`: once per physics step. Owns the ground probe and
//   writes horizontal movement, wall slide/hold and jump lift.
//
// Every mode that zeroes gravity or suspends the body goes through
// `set_mode`, which restores both on the way out.

use glam::Vec2;

use super::state::{Locomotion, MovementEvent, MovementState};
use super::tuning::MovementTuning;
use crate::core::math::{axis_sign, lerp_vec2, tick_down};
use crate::engine::input::FrameInput;
use crate::engine::physics::{CharacterPhysics, LayerMask, PhysicsBody, RayHit};

/// Vertical speeds closer to zero than this count as "not moving" vertically
const STILL_EPSILON: f32 = 0.001;

/// Minimum upward speed affected by a jump cut
const JUMP_CUT_MIN_UP: f32 = 0.01;

/// Whoever decides what a death means while a run is in progress
pub trait RunLifecycle {
    fn is_run_active(&self) -> bool;
    fn request_player_death(&mut self, position: Vec2);
}

/// Movement state machine for the player character
#[derive(Debug)]
pub struct PlayerController {
    tuning: MovementTuning,
    state: MovementState,
    spawn_position: Vec2,
    ground_mask: LayerMask,
    /// False when the tuning failed validation, every entry point is a no-op
    enabled: bool,
    ledge_enabled: bool,
    events: Vec<MovementEvent>,
}

impl PlayerController {
    pub fn new(tuning: MovementTuning, spawn_position: Vec2) -> Self {
        let enabled = match tuning.validate() {
            Ok(()) => true,
            Err(e) => {
                log::error!("Player controller disabled: {}", e);
                false
            }
        };

        let ledge_enabled = tuning.ledge_probes_valid();
        if enabled && tuning.enable_ledge_climb && !ledge_enabled {
            log::warn!(
                "Ledge grab disabled: head probe ({}) must be above chest probe ({})",
                tuning.head_height,
                tuning.chest_height
            );
        }

        Self {
            tuning,
            state: MovementState::default(),
            spawn_position,
            ground_mask: LayerMask::GROUND,
            enabled,
            ledge_enabled,
            events: Vec::new(),
        }
    }

    pub fn with_ground_mask(mut self, mask: LayerMask) -> Self {
        self.ground_mask = mask;
        self
    }

    // -- Accessors ---------------------------------------------------------

    pub fn state(&self) -> &MovementState {
        &self.state
    }

    pub fn tuning(&self) -> &MovementTuning {
        &self.tuning
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn facing(&self) -> i8 {
        self.state.facing
    }

    pub fn is_grounded(&self) -> bool {
        self.state.grounded
    }

    pub fn is_dead(&self) -> bool {
        self.state.mode.is_dead()
    }

    pub fn is_dashing(&self) -> bool {
        self.state.mode.is_dashing()
    }

    pub fn is_ledge_hanging(&self) -> bool {
        self.state.mode.is_hanging()
    }

    pub fn is_climbing(&self) -> bool {
        self.state.mode.is_climbing()
    }

    pub fn is_climbing_or_hanging(&self) -> bool {
        self.is_climbing() || self.is_ledge_hanging()
    }

    pub fn spawn_position(&self) -> Vec2 {
        self.spawn_position
    }

    pub fn set_spawn_position(&mut self, position: Vec2) {
        self.spawn_position = position;
    }

    /// Take all transitions recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<MovementEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Per-frame phase ---------------------------------------------------

    /// Variable-rate update. `attacking` blocks dashes.
    pub fn frame<W>(&mut self, dt: f32, input: &FrameInput, world: &mut W, attacking: bool)
    where
        W: CharacterPhysics + ?Sized,
    {
        if !self.enabled {
            return;
        }

        if let Locomotion::Dead { respawn_in } = self.state.mode {
            if let Some(remaining) = respawn_in {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.respawn(world);
                } else {
                    self.state.mode = Locomotion::Dead {
                        respawn_in: Some(remaining),
                    };
                }
            }
            return;
        }

        self.tick_timers(dt);
        self.advance_dash(dt, world);
        self.advance_climb(dt, world);

        if self.state.is_hurt_locked() {
            return;
        }

        self.handle_input(input, world, attacking);
        self.update_jump_timers(dt);

        if self.state.mode.is_climbing() {
            return;
        }

        if let Locomotion::LedgeHanging { hang_time } = &mut self.state.mode {
            *hang_time += dt;
            let auto_climb = self.tuning.auto_climb_delay > 0.0
                && *hang_time >= self.tuning.auto_climb_delay;
            if input.jump_down || auto_climb {
                self.start_climb(world);
            }
            return;
        }

        self.try_ledge_grab(world);
        self.try_start_jump(world);
        self.apply_jump_cut(input, world);
    }

    fn tick_timers(&mut self, dt: f32) {
        let s = &mut self.state;
        tick_down(&mut s.hurt_lock, dt);
        tick_down(&mut s.ledge_cooldown, dt);
        tick_down(&mut s.dash_cooldown, dt);
        tick_down(&mut s.post_dash_grace, dt);
        tick_down(&mut s.wall_jump_input_lock, dt);
        tick_down(&mut s.wall_regrab_lock, dt);
    }

    fn handle_input<W>(&mut self, input: &FrameInput, world: &mut W, attacking: bool)
    where
        W: CharacterPhysics + ?Sized,
    {
        self.state.move_input = input.horizontal;
        self.state.jump_held = input.jump_held;

        if !self.is_climbing_or_hanging() {
            match axis_sign(input.horizontal, self.tuning.input_deadzone) {
                1 => self.state.facing = 1,
                -1 => self.state.facing = -1,
                _ => {}
            }
        }

        if input.jump_down {
            self.state.jump_buffer_timer = self.tuning.jump_buffer_time;
        }

        if input.dash_down {
            self.try_dash(world, attacking);
        }
    }

    /// Coyote and buffer windows, driven by the last fixed-step ground result
    fn update_jump_timers(&mut self, dt: f32) {
        if self.state.grounded {
            self.state.coyote_timer = self.tuning.coyote_time;
        } else {
            tick_down(&mut self.state.coyote_timer, dt);
        }
        tick_down(&mut self.state.jump_buffer_timer, dt);
    }

    // -- Jump --------------------------------------------------------------

    /// Consume a buffered jump press: wall jump, then ground/coyote, then air jump
    fn try_start_jump<W>(&mut self, world: &mut W) -> bool
    where
        W: CharacterPhysics + ?Sized,
    {
        if self.state.jump_buffer_timer <= 0.0 {
            return false;
        }

        if self.try_wall_jump(world) {
            return true;
        }

        if self.state.coyote_timer > 0.0 {
            self.jump_with_force(world, self.tuning.jump_force);
            self.state.double_jump_used = false;
            self.state.jump_buffer_timer = 0.0;
            self.state.coyote_timer = 0.0;
            self.events.push(MovementEvent::Jumped);
            log::debug!("Jump");
            return true;
        }

        if self.tuning.enable_double_jump && !self.state.double_jump_used {
            self.jump_with_force(world, self.tuning.air_jump_force());
            self.state.double_jump_used = true;
            self.state.jump_buffer_timer = 0.0;
            self.state.coyote_timer = 0.0;
            self.events.push(MovementEvent::DoubleJumped);
            log::debug!("Double jump");
            return true;
        }

        false
    }

    /// Jump off the wall being slid on or held.
    ///
    /// Returns false without touching anything when not on a wall, or when
    /// the stick points away from it so the press falls through to the
    /// ground and air jumps.
    pub fn try_wall_jump<W>(&mut self, world: &mut W) -> bool
    where
        W: CharacterPhysics + ?Sized,
    {
        let side = self.state.mode.wall_side();
        if side == 0 {
            return false;
        }
        if axis_sign(self.state.move_input, self.tuning.input_deadzone) == -side {
            return false;
        }

        self.set_mode(world, Locomotion::Free);
        let away = -side as f32;
        world.set_velocity(Vec2::new(
            away * self.tuning.wall_jump_horizontal,
            self.tuning.wall_jump_vertical,
        ));

        let s = &mut self.state;
        s.jumping = true;
        s.jump_hold_counter = self.tuning.jump_hold_time;
        s.facing = -side;
        s.wall_jump_input_lock = self.tuning.wall_jump_input_lock;
        s.wall_regrab_lock = self.tuning.wall_regrab_lock;
        s.jump_buffer_timer = 0.0;
        s.coyote_timer = 0.0;

        self.events.push(MovementEvent::WallJumped { side });
        log::debug!("Wall jump off side {}", side);
        true
    }

    fn jump_with_force<W>(&mut self, world: &mut W, force: f32)
    where
        W: CharacterPhysics + ?Sized,
    {
        let v = world.velocity();
        world.set_velocity(Vec2::new(v.x, force));
        self.state.jumping = true;
        self.state.jump_hold_counter = self.tuning.jump_hold_time;
    }

    fn apply_jump_cut<W>(&mut self, input: &FrameInput, world: &mut W)
    where
        W: CharacterPhysics + ?Sized,
    {
        if !input.jump_up || !self.state.jumping {
            return;
        }

        let v = world.velocity();
        if v.y > JUMP_CUT_MIN_UP {
            world.set_velocity(Vec2::new(v.x, v.y * self.tuning.jump_cut_multiplier));
        }
        self.state.clear_jump();
    }

    fn apply_jump_hold<W>(&mut self, dt: f32, world: &mut W)
    where
        W: CharacterPhysics + ?Sized,
    {
        if !self.state.jumping {
            return;
        }

        if self.should_treat_as_grounded(world) {
            self.state.clear_jump();
            return;
        }

        if !self.state.jump_held {
            return;
        }

        let mut v = world.velocity();
        if v.y <= 0.0 || self.state.jump_hold_counter <= 0.0 {
            self.state.jumping = false;
            return;
        }

        v.y = (v.y + self.tuning.jump_hold_acceleration * dt).min(self.tuning.max_jump_up_velocity);
        world.set_velocity(v);
        self.state.jump_hold_counter -= dt;
    }

    fn should_treat_as_grounded<W>(&self, world: &W) -> bool
    where
        W: CharacterPhysics + ?Sized,
    {
        world.velocity().y <= self.tuning.ungrounded_up_velocity && self.state.grounded
    }

    // -- Dash --------------------------------------------------------------

    fn try_dash<W>(&mut self, world: &mut W, attacking: bool)
    where
        W: CharacterPhysics + ?Sized,
    {
        if !self.tuning.enable_dash
            || attacking
            || self.state.is_hurt_locked()
            || self.state.dash_cooldown > 0.0
        {
            return;
        }
        if matches!(
            self.state.mode,
            Locomotion::Dead { .. }
                | Locomotion::Dashing { .. }
                | Locomotion::LedgeHanging { .. }
                | Locomotion::Climbing { .. }
        ) {
            return;
        }

        let direction = self.state.facing as f32;
        self.set_mode(
            world,
            Locomotion::Dashing {
                remaining: self.tuning.dash_duration,
                direction,
            },
        );
        self.state.dash_cooldown = self.tuning.dash_cooldown;
        self.state.clear_jump();

        if self.tuning.dash_no_gravity {
            world.set_gravity_scale(0.0);
        }
        world.set_velocity(Vec2::new(direction * self.tuning.dash_speed, 0.0));

        self.events.push(MovementEvent::DashStarted);
        log::debug!("Dash ({})", direction);
    }

    fn advance_dash<W>(&mut self, dt: f32, world: &mut W)
    where
        W: CharacterPhysics + ?Sized,
    {
        let Locomotion::Dashing { remaining, direction } = &mut self.state.mode else {
            return;
        };

        *remaining -= dt;
        if *remaining > 0.0 {
            world.set_velocity(Vec2::new(*direction * self.tuning.dash_speed, 0.0));
            return;
        }

        self.set_mode(world, Locomotion::Free);
        if self.tuning.dash_lock_movement {
            let v = world.velocity();
            world.set_velocity(Vec2::new(0.0, v.y));
        }
        self.state.post_dash_grace = self.tuning.post_dash_ledge_grace;
        self.events.push(MovementEvent::DashEnded);
    }

    // -- Ledge grab / climb ------------------------------------------------

    /// Run the three ledge probes in order, each one only if the previous passed:
    /// chest ray hits a wall, head ray is clear, and a downward ray just past
    /// the wall face at head height finds the ledge top.
    pub fn probe_ledge<W>(&self, world: &W) -> Option<(RayHit, RayHit)>
    where
        W: CharacterPhysics + ?Sized,
    {
        let position = world.position();
        let half = world.half_extents();
        let dir = self.state.facing_dir();
        let facing = self.state.facing as f32;

        let chest = position + Vec2::new(0.0, self.tuning.chest_height);
        let wall = world.raycast(
            chest,
            dir,
            half.x + self.tuning.wall_check_distance,
            self.ground_mask,
        )?;

        let head = position + Vec2::new(0.0, self.tuning.head_height);
        let blocked = world.raycast(
            head,
            dir,
            half.x + self.tuning.ledge_check_distance,
            self.ground_mask,
        );
        if blocked.is_some() {
            return None;
        }

        let corner = Vec2::new(wall.point.x + self.tuning.ledge_corner_inset * facing, head.y);
        let top = world.raycast(
            corner,
            Vec2::NEG_Y,
            self.tuning.top_check_down_distance,
            self.ground_mask,
        )?;

        Some((wall, top))
    }

    fn try_ledge_grab<W>(&mut self, world: &mut W) -> bool
    where
        W: CharacterPhysics + ?Sized,
    {
        if !self.tuning.enable_ledge_climb || !self.ledge_enabled {
            return false;
        }
        if self.state.ledge_cooldown > 0.0 || self.state.grounded {
            return false;
        }
        if !matches!(
            self.state.mode,
            Locomotion::Free | Locomotion::WallSliding { .. } | Locomotion::WallHolding { .. }
        ) {
            return false;
        }

        let vy = world.velocity().y;
        let post_dash = self.state.post_dash_grace > 0.0 && vy.abs() <= STILL_EPSILON;
        if !(vy < 0.0 || post_dash) {
            return false;
        }

        let Some((wall, top)) = self.probe_ledge(world) else {
            return false;
        };

        self.enter_ledge_hang(world, wall, top);
        true
    }

    fn enter_ledge_hang<W>(&mut self, world: &mut W, wall: RayHit, top: RayHit)
    where
        W: CharacterPhysics + ?Sized,
    {
        self.set_mode(world, Locomotion::LedgeHanging { hang_time: 0.0 });
        world.set_velocity(Vec2::ZERO);
        world.set_gravity_scale(0.0);

        let facing = self.state.facing as f32;
        let mut position = world.position();
        position.x = wall.point.x - facing * (world.half_extents().x + self.tuning.ledge_hang_gap);
        world.set_position(position);

        let s = &mut self.state;
        s.clear_jump();
        s.double_jump_used = false;
        s.coyote_timer = 0.0;
        s.jump_buffer_timer = 0.0;
        s.ledge_cooldown = s.ledge_cooldown.max(self.tuning.ledge_hang_lock);
        s.wall_hit = Some(wall);
        s.top_hit = Some(top);

        self.events.push(MovementEvent::LedgeGrabbed);
        log::debug!("Ledge grab at {:?}", top.point);
    }

    fn start_climb<W>(&mut self, world: &mut W)
    where
        W: CharacterPhysics + ?Sized,
    {
        if !self.state.mode.is_hanging() {
            return;
        }

        self.state.ledge_cooldown = self.state.ledge_cooldown.max(self.tuning.ledge_start_climb_lock);
        self.state.jump_buffer_timer = 0.0;

        let Some(wall) = self.state.wall_hit else {
            // Nothing to climb onto, drop from the hang
            self.set_mode(world, Locomotion::Free);
            return;
        };

        let half = world.half_extents();
        let facing = self.state.facing as f32;
        let end_x = wall.point.x + self.tuning.climb_end_offset_x * facing;
        let end_y = match self.state.top_hit {
            Some(top) => top.point.y + half.y + self.tuning.climb_end_clearance,
            None => wall.point.y + half.y * 2.0 + self.tuning.climb_end_clearance,
        };

        let start = world.position();
        self.set_mode(
            world,
            Locomotion::Climbing {
                elapsed: 0.0,
                start,
                end: Vec2::new(end_x, end_y),
            },
        );
        world.set_simulated(false);
        world.set_velocity(Vec2::ZERO);
        world.set_gravity_scale(0.0);

        self.events.push(MovementEvent::ClimbStarted);
    }

    fn advance_climb<W>(&mut self, dt: f32, world: &mut W)
    where
        W: CharacterPhysics + ?Sized,
    {
        let Locomotion::Climbing { elapsed, start, end } = &mut self.state.mode else {
            return;
        };

        *elapsed += dt;
        let (start, end) = (*start, *end);
        if *elapsed < self.tuning.climb_duration {
            world.set_position(lerp_vec2(start, end, *elapsed / self.tuning.climb_duration));
            return;
        }

        world.set_position(end);
        self.set_mode(world, Locomotion::Free);

        let s = &mut self.state;
        s.clear_jump();
        s.ledge_cooldown = self.tuning.ledge_regrab_cooldown;
        s.wall_hit = None;
        s.top_hit = None;

        self.events.push(MovementEvent::ClimbFinished);
    }

    // -- Fixed-step phase --------------------------------------------------

    /// Physics-rate update. `attacking` freezes horizontal movement on the ground.
    pub fn fixed_update<W>(&mut self, dt: f32, world: &mut W, attacking: bool)
    where
        W: CharacterPhysics + ?Sized,
    {
        if !self.enabled {
            return;
        }

        let feet = world.position()
            - Vec2::new(0.0, world.half_extents().y + self.tuning.ground_check_offset);
        self.state.grounded =
            world.overlap_circle(feet, self.tuning.ground_check_radius, self.ground_mask);

        if self.should_treat_as_grounded(world) {
            self.state.clear_jump();
            self.state.double_jump_used = false;
        }

        match self.state.mode {
            Locomotion::Dead { .. } | Locomotion::Climbing { .. } | Locomotion::Dashing { .. } => {
                return
            }
            _ => {}
        }

        if self.state.is_hurt_locked() {
            let v = world.velocity();
            world.set_velocity(Vec2::new(0.0, v.y));
            return;
        }

        if self.state.mode.is_hanging() {
            world.set_velocity(Vec2::ZERO);
            return;
        }

        if self.update_wall(world) {
            return;
        }

        let grounded_attack = attacking && self.state.grounded;
        if !grounded_attack && self.state.wall_jump_input_lock <= 0.0 {
            let v = world.velocity();
            world.set_velocity(Vec2::new(self.state.move_input * self.tuning.move_speed, v.y));
        }

        self.apply_jump_hold(dt, world);
    }

    /// Side of the nearest wall at chest height: facing side first, 0 for none
    fn probe_wall<W>(&self, world: &W) -> i8
    where
        W: CharacterPhysics + ?Sized,
    {
        let chest = world.position() + Vec2::new(0.0, self.tuning.chest_height);
        let reach = world.half_extents().x + self.tuning.wall_slide_check_distance;
        let right = world.raycast(chest, Vec2::X, reach, self.ground_mask).is_some();
        let left = world.raycast(chest, Vec2::NEG_X, reach, self.ground_mask).is_some();

        match (right, left) {
            (true, true) => self.state.facing,
            (true, false) => 1,
            (false, true) => -1,
            (false, false) => 0,
        }
    }

    /// Evaluate wall slide and hold. Returns true while either is active.
    fn update_wall<W>(&mut self, world: &mut W) -> bool
    where
        W: CharacterPhysics + ?Sized,
    {
        if !self.tuning.enable_wall_slide {
            return false;
        }

        let current = self.state.mode.wall_side();
        let v = world.velocity();
        let eligible = !self.state.grounded
            && self.state.wall_regrab_lock <= 0.0
            && (v.y < 0.0 || current != 0);

        let side = if eligible { self.probe_wall(world) } else { 0 };
        let input = axis_sign(self.state.move_input, self.tuning.input_deadzone);

        if side == 0 || input == -side {
            if current != 0 {
                self.set_mode(world, Locomotion::Free);
            }
            return false;
        }

        if input == side {
            if !matches!(self.state.mode, Locomotion::WallHolding { .. }) {
                self.set_mode(world, Locomotion::WallHolding { side });
            }
            world.set_velocity(Vec2::ZERO);
            world.set_gravity_scale(0.0);
        } else {
            if !matches!(self.state.mode, Locomotion::WallSliding { .. }) {
                self.set_mode(world, Locomotion::WallSliding { side });
            }
            let v = world.velocity();
            world.set_velocity(Vec2::new(0.0, v.y.max(-self.tuning.wall_slide_max_speed)));
        }
        self.state.clear_jump();
        true
    }

    // -- Mode switching ----------------------------------------------------

    /// Switch modes, restoring gravity and simulation when leaving a mode that held them
    fn set_mode<W>(&mut self, world: &mut W, mode: Locomotion)
    where
        W: PhysicsBody + ?Sized,
    {
        if self.state.mode.holds_body() {
            world.set_gravity_scale(self.tuning.gravity_scale);
            world.set_simulated(true);
        }
        self.state.mode = mode;
    }

    // -- Hurt / death / respawn ---------------------------------------------

    /// Lock voluntary input for `duration` seconds. Replaces any running lock,
    /// a non-positive duration clears it. Ignored while dead.
    pub fn set_hurt_lock(&mut self, duration: f32) {
        if self.is_dead() {
            return;
        }
        self.state.hurt_lock = duration.max(0.0);
    }

    /// Kill the character. An active run takes over from here, otherwise
    /// the character respawns at the spawn point after a short delay.
    pub fn die<W>(&mut self, world: &mut W, run: Option<&mut dyn RunLifecycle>)
    where
        W: PhysicsBody + ?Sized,
    {
        if self.is_dead() {
            return;
        }

        let position = world.position();
        self.set_mode(world, Locomotion::Dead { respawn_in: None });
        world.set_velocity(Vec2::ZERO);
        world.set_simulated(false);

        let s = &mut self.state;
        s.clear_jump();
        s.hurt_lock = 0.0;
        s.coyote_timer = 0.0;
        s.jump_buffer_timer = 0.0;
        s.post_dash_grace = 0.0;
        s.wall_jump_input_lock = 0.0;
        s.wall_regrab_lock = 0.0;
        s.wall_hit = None;
        s.top_hit = None;

        self.events.push(MovementEvent::Died { position });

        if let Some(run) = run {
            if run.is_run_active() {
                log::info!("Player died at {:?}, run decides", position);
                run.request_player_death(position);
                return;
            }
        }

        log::info!("Player died at {:?}, respawning", position);
        self.state.mode = Locomotion::Dead {
            respawn_in: Some(self.tuning.respawn_delay),
        };
    }

    /// Put the character back at the spawn point in its rest state
    pub fn respawn<W>(&mut self, world: &mut W)
    where
        W: PhysicsBody + ?Sized,
    {
        self.set_mode(world, Locomotion::Free);
        world.set_gravity_scale(self.tuning.gravity_scale);
        world.set_simulated(true);
        world.set_position(self.spawn_position);
        world.set_velocity(Vec2::ZERO);

        self.state = MovementState::default();
        self.events.push(MovementEvent::Respawned {
            position: self.spawn_position,
        });
    }

    /// Bring the character back mid-run at `position`, spawn point untouched
    pub fn revive_at<W>(&mut self, world: &mut W, position: Vec2)
    where
        W: PhysicsBody + ?Sized,
    {
        let facing = self.state.facing;
        self.set_mode(world, Locomotion::Free);
        world.set_gravity_scale(self.tuning.gravity_scale);
        world.set_simulated(true);
        world.set_position(position);
        world.set_velocity(Vec2::ZERO);

        self.state = MovementState {
            facing,
            ..MovementState::default()
        };
        self.events.push(MovementEvent::Revived { position });
    }
}
