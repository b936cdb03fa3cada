// Run manager - stage progression, coin ledger, checkpoints and payouts
//
// Phases: NotStarted -> Active -> DeathPending -> Active (revived) or Ended,
// and Active -> Ended on victory. One instance lives for the whole process;
// the composition root hands it to whoever needs it.

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::events::RunEvent;
use super::mode::{GameMode, ModeKind};
use super::progression::{Progression, SceneLoader};
use super::reward::RewardResult;
use crate::core::math::floor_coins;
use crate::game::player::RunLifecycle;

pub const SCENE_RUN: &str = "RunGameplay";
pub const SCENE_MENU: &str = "MainMenu";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RunPhase {
    #[default]
    NotStarted,
    Active,
    /// Dead with a revive on offer, waiting for accept or decline
    DeathPending { position: Vec2 },
    Ended,
}

/// What the player gets back on an accepted revive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviveTicket {
    pub position: Vec2,
    pub health_fraction: f32,
    pub invulnerability: f32,
}

/// Snapshot of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub victory: bool,
    pub mode: ModeKind,
    pub stage_reached: u32,
    pub seed: u64,
    pub coins: i64,
    pub reward: RewardResult,
    pub revive_used: bool,
    pub doubled_reward_granted: bool,
}

impl RunResult {
    /// Coins actually banked for this run
    pub fn payout(&self) -> i64 {
        if self.doubled_reward_granted {
            self.reward.total_if_doubled
        } else {
            self.reward.total_before_bonus_doubling
        }
    }
}

pub struct RunManager {
    phase: RunPhase,
    mode: GameMode,
    seed: u64,
    rng: ChaCha8Rng,

    stage: u32,
    coins: i64,

    checkpoint_pending: bool,
    pending_percent: f32,
    checkpoint_bonus_coins: i64,
    /// Checkpoint stage already claimed, so the next gate moves on
    claimed_stage: Option<u32>,

    revive_used: bool,
    last_result: Option<RunResult>,

    progression: Box<dyn Progression>,
    scenes: Box<dyn SceneLoader>,
    events: Vec<RunEvent>,
}

impl RunManager {
    pub fn new(progression: Box<dyn Progression>, scenes: Box<dyn SceneLoader>) -> Self {
        let mode = GameMode::casual();
        Self {
            phase: RunPhase::NotStarted,
            pending_percent: mode.checkpoint_bonus_percent,
            mode,
            seed: 0,
            rng: ChaCha8Rng::seed_from_u64(0),
            stage: 1,
            coins: 0,
            checkpoint_pending: false,
            checkpoint_bonus_coins: 0,
            claimed_stage: None,
            revive_used: false,
            last_result: None,
            progression,
            scenes,
            events: Vec::new(),
        }
    }

    // -- Accessors ---------------------------------------------------------

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == RunPhase::Active
    }

    pub fn is_death_pending(&self) -> bool {
        matches!(self.phase, RunPhase::DeathPending { .. })
    }

    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run RNG for level streaming, reseeded by every `start_run`
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn coins(&self) -> i64 {
        self.coins
    }

    pub fn is_checkpoint_pending(&self) -> bool {
        self.checkpoint_pending
    }

    pub fn pending_percent(&self) -> f32 {
        self.pending_percent
    }

    pub fn checkpoint_bonus_coins(&self) -> i64 {
        self.checkpoint_bonus_coins
    }

    pub fn revive_used(&self) -> bool {
        self.revive_used
    }

    pub fn last_result(&self) -> Option<&RunResult> {
        self.last_result.as_ref()
    }

    pub fn clear_last_result(&mut self) {
        self.last_result = None;
    }

    pub fn progression(&self) -> &dyn Progression {
        self.progression.as_ref()
    }

    pub fn drain_events(&mut self) -> Vec<RunEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Run lifecycle -----------------------------------------------------

    /// Start a fresh run. Without an explicit seed one is drawn at random.
    pub fn start_run(&mut self, mode: GameMode, seed: Option<u64>) {
        if let Err(e) = mode.validate() {
            log::warn!("Starting run with questionable mode: {}", e);
        }

        self.seed = seed.unwrap_or_else(rand::random);
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.stage = 1;
        self.coins = 0;
        self.checkpoint_pending = false;
        self.pending_percent = mode.checkpoint_bonus_percent;
        self.checkpoint_bonus_coins = 0;
        self.claimed_stage = None;
        self.revive_used = false;
        self.mode = mode;
        self.phase = RunPhase::Active;

        log::info!("Run started: mode={} seed={}", self.mode.kind.name(), self.seed);
        self.events.push(RunEvent::RunStarted { seed: self.seed });
        self.events.push(RunEvent::CoinsChanged { coins: 0 });
        self.events.push(RunEvent::StageChanged { stage: 1 });
        self.scenes.load_scene(SCENE_RUN);
    }

    /// Collect coins. Returns how many actually landed in the ledger.
    pub fn add_coins(&mut self, raw_amount: i64) -> i64 {
        if !self.is_active() {
            return 0;
        }

        let amount = floor_coins(raw_amount, self.mode.per_collect_multiplier);
        self.coins += amount;
        self.events.push(RunEvent::CoinsChanged { coins: self.coins });
        amount
    }

    /// The player crossed the gate at the end of the current stage
    pub fn on_stage_gate_passed(&mut self) {
        if self.checkpoint_pending || !self.is_active() {
            return;
        }

        let completed = self.stage;
        if self.mode.max_stages.is_some_and(|max| completed >= max) {
            self.finalize_victory();
            return;
        }

        if self.mode.is_checkpoint_stage(completed) && self.claimed_stage != Some(completed) {
            self.checkpoint_pending = true;
            log::info!(
                "Checkpoint at stage {} ({:.0}% pending)",
                completed,
                self.pending_percent * 100.0
            );
            self.events.push(RunEvent::CheckpointReached {
                stage: completed,
                pending_percent: self.pending_percent,
            });
            return;
        }

        self.advance_stage();
    }

    /// Skip the pending checkpoint: the bonus grows and the run moves on
    pub fn continue_checkpoint(&mut self) -> bool {
        if !self.checkpoint_pending || !self.is_active() {
            return false;
        }

        self.pending_percent *= self.mode.checkpoint_skip_multiplier;
        self.checkpoint_pending = false;
        log::info!("Checkpoint skipped, pending bonus now {:.2}", self.pending_percent);
        self.advance_stage();
        true
    }

    /// Cash in the pending checkpoint. The pending bonus goes back to the
    /// mode's base and the stage stays where it is. Returns the coins banked.
    pub fn claim_checkpoint(&mut self) -> i64 {
        if !self.checkpoint_pending || !self.is_active() {
            return 0;
        }

        let claimed = floor_coins(self.coins, self.pending_percent);
        self.checkpoint_bonus_coins += claimed;
        self.pending_percent = self.mode.checkpoint_bonus_percent;
        self.checkpoint_pending = false;
        self.claimed_stage = Some(self.stage);

        log::info!("Checkpoint claimed: +{} (total {})", claimed, self.checkpoint_bonus_coins);
        self.events.push(RunEvent::CheckpointClaimed { coins: claimed });
        claimed
    }

    /// Claim the pending checkpoint and end the run as a victory
    pub fn cashout_and_end_run(&mut self) -> bool {
        if !self.checkpoint_pending || !self.is_active() {
            return false;
        }
        self.claim_checkpoint();
        self.finalize_victory();
        true
    }

    /// Voluntarily end an endless run, keeping what was already claimed
    pub fn end_run_now(&mut self) -> bool {
        if !self.is_active() || !self.mode.is_infinite() {
            return false;
        }
        self.checkpoint_pending = false;
        self.finalize_victory();
        true
    }

    // -- Death and revive --------------------------------------------------

    /// Take the offered revive. The caller applies the ticket to the player.
    pub fn accept_revive(&mut self) -> Option<ReviveTicket> {
        let RunPhase::DeathPending { position } = self.phase else {
            return None;
        };

        self.revive_used = true;
        self.phase = RunPhase::Active;
        log::info!("Revive accepted at {:?}", position);
        self.events.push(RunEvent::Revived { position });

        Some(ReviveTicket {
            position,
            health_fraction: self.mode.revive_health_percent,
            invulnerability: self.mode.revive_invulnerability,
        })
    }

    pub fn decline_revive(&mut self) {
        if self.is_death_pending() {
            log::info!("Revive declined");
            self.finalize_defeat();
        }
    }

    /// The revive could not be delivered, treated like a decline
    pub fn fail_revive(&mut self) {
        if self.is_death_pending() {
            log::warn!("Revive failed, ending run");
            self.finalize_defeat();
        }
    }

    // -- Payouts -----------------------------------------------------------

    /// Bank the doubling bonus of the last result, at most once.
    /// Returns the extra coins granted.
    pub fn grant_doubled_reward(&mut self) -> i64 {
        let Some(result) = self.last_result.as_mut() else {
            return 0;
        };
        if !result.reward.doubling_eligible || result.doubled_reward_granted {
            return 0;
        }

        let extra = result.reward.doubling_extra();
        result.doubled_reward_granted = true;
        self.progression.add_meta_coins(extra);
        log::info!("Doubled reward granted: +{}", extra);
        extra
    }

    fn advance_stage(&mut self) {
        self.stage += 1;
        log::info!("Stage {}", self.stage);
        self.events.push(RunEvent::StageChanged { stage: self.stage });
    }

    fn finalize_victory(&mut self) {
        let reward = RewardResult::victory(&self.mode, self.coins, self.checkpoint_bonus_coins);
        self.finalize(true, reward);
    }

    fn finalize_defeat(&mut self) {
        let reward = RewardResult::death(&self.mode, self.coins);
        self.finalize(false, reward);
    }

    fn finalize(&mut self, victory: bool, reward: RewardResult) {
        self.progression.add_meta_coins(reward.total_before_bonus_doubling);

        let result = RunResult {
            victory,
            mode: self.mode.kind,
            stage_reached: self.stage,
            seed: self.seed,
            coins: self.coins,
            reward,
            revive_used: self.revive_used,
            doubled_reward_granted: false,
        };
        log::info!(
            "Run ended ({}): stage {}, coins {}, payout {}",
            if victory { "victory" } else { "defeat" },
            result.stage_reached,
            result.coins,
            result.payout()
        );

        self.last_result = Some(result.clone());
        self.phase = RunPhase::Ended;
        self.checkpoint_pending = false;
        self.events.push(RunEvent::RunEnded { result });
        self.scenes.load_scene(SCENE_MENU);
    }
}

impl RunLifecycle for RunManager {
    fn is_run_active(&self) -> bool {
        matches!(self.phase, RunPhase::Active | RunPhase::DeathPending { .. })
    }

    /// Offer a revive if one is left, otherwise end the run. Repeated
    /// calls while a death is pending are ignored.
    fn request_player_death(&mut self, position: Vec2) {
        if !self.is_active() {
            return;
        }

        if self.mode.allow_revive && !self.revive_used {
            self.phase = RunPhase::DeathPending { position };
            log::info!("Player died at {:?}, revive offered", position);
            self.events.push(RunEvent::ReviveOffered { position });
            return;
        }

        self.finalize_defeat();
    }
}
