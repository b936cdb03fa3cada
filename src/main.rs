use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use glam::Vec2;
use log::{debug, info};
use rapier2d::prelude::RigidBodyHandle;

use edgerun::config::GameConfig;
use edgerun::engine::game_loop::GameLoop;
use edgerun::engine::input::{Action, PlayerInput};
use edgerun::engine::physics::body::presets;
use edgerun::engine::physics::{
    collider_id, ColliderId, Layer, LayerMask, PhysicsBody, PhysicsQuery, PhysicsWorld,
};
use edgerun::game::combat::{
    ContactDamage, ContactPhase, EnemyCharger, EnemyHealth, FeedbackState, Projectile,
    ProjectileEvent, ProjectileLauncher, TargetRegistry,
};
use edgerun::game::level::SpawnCheckpoint;
use edgerun::game::player::{AnimationCue, AnimationParams, AnimationSink, Player, RunLifecycle};
use edgerun::game::run::{
    InMemoryProgression, ModeKind, Progression, RunEvent, RunManager, SceneLoader,
};

/// Real seconds per rendered frame
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up after two simulated minutes
const MAX_FRAMES: u64 = 60 * 120;

const SPAWN: Vec2 = Vec2::new(0.0, 1.0);
const HALF_EXTENTS: Vec2 = Vec2::new(0.5, 1.0);
/// Crossing this x finishes the stage
const GATE_X: f32 = 24.0;
const FALL_LIMIT: f32 = -10.0;
const CHARGER_HOME: Vec2 = Vec2::new(21.0, 0.6);
const CHARGER_HALF: Vec2 = Vec2::new(0.5, 0.6);
/// Shoot at the charger once it is this close ahead
const SHOT_RANGE: f32 = 7.0;

/// Attack animation events, in seconds from the start of the swing
const SWING_MARKS: [(f32, SwingMark); 5] = [
    (0.03, SwingMark::Lunge),
    (0.06, SwingMark::Hit),
    (0.12, SwingMark::ComboOpen),
    (0.20, SwingMark::ComboWindow),
    (0.30, SwingMark::End),
];

#[derive(Debug, Clone, Copy)]
enum SwingMark {
    Lunge,
    Hit,
    ComboOpen,
    ComboWindow,
    End,
}

/// Stands in for the animator: remembers which attack to "play"
#[derive(Clone, Default)]
struct DemoAnimator {
    started: Rc<RefCell<Option<u8>>>,
}

impl AnimationSink for DemoAnimator {
    fn cue(&mut self, cue: AnimationCue) {
        match cue {
            AnimationCue::Attack { index } => *self.started.borrow_mut() = Some(index),
            other => debug!("Animation cue {:?}", other),
        }
    }

    fn set_params(&mut self, _params: &AnimationParams) {}
}

/// An attack clip being played back
struct Swing {
    index: u8,
    elapsed: f32,
    next_mark: usize,
}

struct LogScenes;

impl SceneLoader for LogScenes {
    fn load_scene(&mut self, name: &str) {
        info!("Scene -> {}", name);
    }
}

/// The test course: a floor, a training dummy, spikes, a checkpoint, a
/// ledge wall and a charger guarding the gate
struct Level {
    physics: PhysicsWorld,
    player: RigidBodyHandle,
    targets: TargetRegistry,
    spikes: ContactDamage,
    spikes_id: ColliderId,
    checkpoint: SpawnCheckpoint,
    charger: Rc<RefCell<EnemyCharger>>,
    charger_body: RigidBodyHandle,
}

fn build_level(config: &GameConfig) -> Level {
    let mut physics = PhysicsWorld::new();

    let floor = physics.add_rigid_body(presets::block_body(10.0, -0.5));
    physics.add_collider(presets::block_collider(60.0, 1.0), floor);

    let wall = physics.add_rigid_body(presets::block_body(18.5, 0.9));
    physics.add_collider(presets::block_collider(1.0, 1.8), wall);

    let mut targets = TargetRegistry::new();
    let dummy_body = physics.add_rigid_body(presets::block_body(6.0, 1.0));
    let dummy = physics.add_collider(presets::hurtbox_collider(0.8, 2.0), dummy_body);
    let dummy_id = targets.register(Box::new(EnemyHealth::new(3)));
    targets.attach_collider(dummy_id, collider_id(dummy));

    let spikes_body = physics.add_rigid_body(presets::block_body(12.5, 0.15));
    let spikes_collider = physics.add_collider(presets::hazard_collider(1.0, 0.3), spikes_body);
    let spikes_id = collider_id(spikes_collider);
    let spikes = ContactDamage::new(spikes_id, Vec2::new(12.5, 0.15));

    let checkpoint = SpawnCheckpoint::new(Vec2::new(15.0, 1.0), Vec2::new(0.5, 1.0));

    let charger = Rc::new(RefCell::new(EnemyCharger::new(
        config.charger.clone(),
        CHARGER_HOME,
    )));
    let charger_body = physics.add_rigid_body(presets::player_body(CHARGER_HOME.x, CHARGER_HOME.y));
    let charger_collider = physics.add_collider(
        presets::enemy_collider(CHARGER_HALF.x * 2.0, CHARGER_HALF.y * 2.0),
        charger_body,
    );
    let charger_id = targets.register(Box::new(charger.clone()));
    targets.attach_collider(charger_id, collider_id(charger_collider));

    let player = physics.add_rigid_body(presets::player_body(SPAWN.x, SPAWN.y));
    physics.add_collider(
        presets::player_collider(HALF_EXTENTS.x * 2.0, HALF_EXTENTS.y * 2.0),
        player,
    );

    // Prime the query pipeline with the static geometry
    physics.step();

    Level {
        physics,
        player,
        targets,
        spikes,
        spikes_id,
        checkpoint,
        charger,
        charger_body,
    }
}

/// Scripted "player": run right, swing at the dummy, hop the spikes,
/// dash, and climb the wall
fn drive(input: &mut PlayerInput, frame: u64, player: &Player, x: f32) {
    let c = player.controller();
    if frame == 1 {
        input.press(Action::MoveRight);
    }

    if (4.0..8.0).contains(&x) && frame % 12 == 0 {
        input.attack_pressed();
    }

    let near_spikes = (10.2..10.6).contains(&x);
    let near_wall = (16.6..17.2).contains(&x);
    if c.is_grounded() && (near_spikes || near_wall) {
        input.jump_pressed();
        input.set_jump_held(true);
    }
    if !c.is_grounded() && c.state().jump_hold_counter <= 0.0 {
        input.set_jump_held(false);
    }

    if (14.0..14.3).contains(&x) {
        input.dash_pressed();
    }

    if c.is_ledge_hanging() {
        input.jump_pressed();
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let kind = match args.next().as_deref() {
        Some("full") => ModeKind::Full,
        Some("infinity") => ModeKind::Infinity,
        _ => ModeKind::Casual,
    };
    let config_path = args.next().unwrap_or_else(|| "edgerun.toml".to_string());
    let config = GameConfig::load_or_default(&config_path);

    info!("Starting Edgerun ({})...", kind.name());

    let mut level = build_level(&config);
    let animator = DemoAnimator::default();
    let mut player =
        Player::from_config(&config, SPAWN).with_animator(Box::new(animator.clone()));
    let mut feedback = FeedbackState::new(config.combat.flash_time);
    let mut run = RunManager::new(Box::new(InMemoryProgression::new()), Box::new(LogScenes));
    let mut game_loop = GameLoop::new();
    let mut input = PlayerInput::new();
    let mut launcher = ProjectileLauncher::new(config.projectile.clone());
    let mut shots: Vec<Projectile> = Vec::new();

    run.start_run(config.modes.get(kind).clone(), None);

    let mut swing: Option<Swing> = None;
    let mut on_spikes = false;

    for frame in 0..MAX_FRAMES {
        let x = level.physics.character(level.player, HALF_EXTENTS).position().x;
        drive(&mut input, frame, &player, x);
        let frame_input = input.frame();

        game_loop.set_time_scale(feedback.time_scale());
        let steps = game_loop.advance(FRAME_DT);
        let dt = game_loop.delta_time();

        {
            let mut body = level.physics.character(level.player, HALF_EXTENTS);
            player.frame(dt, &frame_input, &mut body);

            // Play back the current attack clip
            let finished = if let Some(s) = &mut swing {
                s.elapsed += dt;
                while let Some((at, mark)) = SWING_MARKS.get(s.next_mark).copied() {
                    if s.elapsed < at {
                        break;
                    }
                    s.next_mark += 1;
                    match mark {
                        SwingMark::Lunge => player.on_lunge(&mut body),
                        SwingMark::Hit => {
                            let hits = player.on_polygon_hit(
                                s.index,
                                &body,
                                &mut level.targets,
                                &mut feedback,
                            );
                            if hits > 0 {
                                info!("Attack {} landed on {} target(s)", s.index, hits);
                            }
                        }
                        SwingMark::ComboOpen => player.on_combo_open(),
                        SwingMark::ComboWindow => player.on_combo_window(),
                        SwingMark::End => player.on_attack_end(),
                    }
                }
                s.next_mark >= SWING_MARKS.len()
            } else {
                false
            };
            if finished {
                swing = None;
            }
            if let Some(index) = animator.started.borrow_mut().take() {
                swing = Some(Swing {
                    index,
                    elapsed: 0.0,
                    next_mark: 0,
                });
            }

            // Hazard contact
            let hazards = LayerMask::from_layers(&[Layer::Hazard]);
            let position = body.position();
            let touching = body
                .overlap_box(position, HALF_EXTENTS, hazards)
                .contains(&level.spikes_id);
            if touching {
                let phase = if on_spikes {
                    ContactPhase::Stay
                } else {
                    ContactPhase::Enter
                };
                if level.spikes.touch(phase, Layer::Player, position, &mut player) {
                    info!("Spikes! HP {}", player.health().hp());
                }
            }
            on_spikes = touching;

            level.checkpoint.touch(&body, player.controller_mut());

            // Throw at the charger while it is still standing
            let facing = player.controller().state().facing;
            let charger_alive = level.charger.borrow().health().hp() > 0;
            let ahead = (CHARGER_HOME.x - position.x) * facing as f32;
            if charger_alive && (0.0..SHOT_RANGE).contains(&ahead) {
                if let Some(shot) = launcher.try_fire(position, facing) {
                    shots.push(shot);
                }
            }

            if position.y < FALL_LIMIT && !player.controller().is_dead() {
                player.kill(&mut body, Some(&mut run));
            }

            if position.x > GATE_X && run.is_active() && !run.is_checkpoint_pending() {
                run.on_stage_gate_passed();
                body.set_position(SPAWN);
                body.set_velocity(Vec2::ZERO);
            }
        }

        for _ in 0..steps {
            let fixed_dt = game_loop.fixed_timestep();
            let player_position = {
                let mut body = level.physics.character(level.player, HALF_EXTENTS);
                player.fixed_step(fixed_dt, &mut body, Some(&mut run));
                body.position()
            };
            {
                let mut body = level.physics.character(level.charger_body, CHARGER_HALF);
                level
                    .charger
                    .borrow_mut()
                    .update(fixed_dt, &mut body, Some(player_position));
            }
            level.physics.step();
        }

        launcher.update(dt);
        for shot in &mut shots {
            match shot.update(dt, &level.physics, &mut level.targets) {
                Some(ProjectileEvent::Hit {
                    target,
                    applied: true,
                }) => info!("Shot landed on {:?}", target),
                Some(event) => debug!("Shot ended: {:?}", event),
                None => {}
            }
        }
        shots.retain(|s| !s.is_spent());

        level.spikes.update(dt);
        feedback.update(FRAME_DT);
        input.end_frame();

        for event in run.drain_events() {
            match event {
                RunEvent::ReviveOffered { position } => {
                    info!("Revive offered at {:?}, accepting", position);
                    if let Some(ticket) = run.accept_revive() {
                        let mut body = level.physics.character(level.player, HALF_EXTENTS);
                        player.apply_revive(&mut body, &ticket);
                    }
                }
                RunEvent::CheckpointReached {
                    stage,
                    pending_percent,
                } => {
                    if stage >= 10 {
                        info!("Cashing out at stage {} ({:.2})", stage, pending_percent);
                        run.cashout_and_end_run();
                    } else {
                        run.continue_checkpoint();
                    }
                }
                RunEvent::RunEnded { result } => {
                    info!(
                        "Run over: victory={} stage={} coins={} payout={}",
                        result.victory,
                        result.stage_reached,
                        result.coins,
                        result.payout()
                    );
                }
                other => debug!("Run event {:?}", other),
            }
        }

        // Stand-in for coin pickups along the course
        if frame % 60 == 0 && run.is_active() {
            run.add_coins(5);
        }

        if run.last_result().is_some() {
            break;
        }
    }

    if run.last_result().is_none() && run.is_active() {
        info!("Out of time, ending run");
        run.request_player_death(Vec2::ZERO);
        run.decline_revive();
    }

    let extra = run.grant_doubled_reward();
    info!(
        "Meta coins: {} (doubling bonus {}), frames={}, steps={}",
        run.progression().meta_coins(),
        extra,
        game_loop.frame_count(),
        game_loop.update_count()
    );

    Ok(())
}
