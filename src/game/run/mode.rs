// Game mode descriptors

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeKind {
    Casual,
    Full,
    Infinity,
}

impl ModeKind {
    pub fn name(self) -> &'static str {
        match self {
            ModeKind::Casual => "Casual",
            ModeKind::Full => "Full",
            ModeKind::Infinity => "Infinity",
        }
    }
}

/// Everything a run needs to know about its mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMode {
    pub kind: ModeKind,
    /// `None` for an endless run
    pub max_stages: Option<u32>,

    /// Applied to every coin pickup
    pub per_collect_multiplier: f32,
    pub keep_on_death_percent: f32,
    pub completion_bonus_percent: f32,
    pub allow_reward_doubling: bool,

    /// Endless runs offer a checkpoint every this many stages
    pub checkpoint_every_stages: u32,
    /// Pending bonus at the first checkpoint, and after every claim
    pub checkpoint_bonus_percent: f32,
    /// Pending bonus multiplier for each checkpoint skipped
    pub checkpoint_skip_multiplier: f32,

    pub allow_revive: bool,
    /// Fraction of max HP restored on revive
    pub revive_health_percent: f32,
    /// Seconds of invulnerability after a revive
    pub revive_invulnerability: f32,
}

impl GameMode {
    pub fn casual() -> Self {
        Self {
            kind: ModeKind::Casual,
            max_stages: Some(5),
            per_collect_multiplier: 1.0,
            keep_on_death_percent: 0.4,
            completion_bonus_percent: 0.5,
            allow_reward_doubling: true,
            checkpoint_every_stages: 5,
            checkpoint_bonus_percent: 0.5,
            checkpoint_skip_multiplier: 1.25,
            allow_revive: true,
            revive_health_percent: 1.0,
            revive_invulnerability: 1.5,
        }
    }

    pub fn full() -> Self {
        Self {
            kind: ModeKind::Full,
            max_stages: Some(10),
            completion_bonus_percent: 1.0,
            ..Self::casual()
        }
    }

    pub fn infinity() -> Self {
        Self {
            kind: ModeKind::Infinity,
            max_stages: None,
            per_collect_multiplier: 1.2,
            keep_on_death_percent: 0.2,
            completion_bonus_percent: 0.0,
            ..Self::casual()
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.max_stages.is_none()
    }

    /// Whether finishing `stage` lands on a checkpoint
    pub fn is_checkpoint_stage(&self, stage: u32) -> bool {
        self.is_infinite() && self.checkpoint_every_stages > 0 && stage % self.checkpoint_every_stages == 0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.kind.name();
        if self.max_stages == Some(0) {
            return Err(ConfigError::Invalid(format!("{}: max_stages must be at least 1", name)));
        }
        if self.per_collect_multiplier < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "{}: per_collect_multiplier must not be negative",
                name
            )));
        }
        if !(0.0..=1.0).contains(&self.keep_on_death_percent) {
            return Err(ConfigError::Invalid(format!(
                "{}: keep_on_death_percent must be within 0..=1",
                name
            )));
        }
        if self.checkpoint_skip_multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "{}: checkpoint_skip_multiplier must be at least 1",
                name
            )));
        }
        Ok(())
    }
}

/// One `[modes.<kind>]` table. Every key is optional and lands on that
/// kind's preset.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ModeOverride {
    kind: Option<ModeKind>,
    max_stages: Option<u32>,
    per_collect_multiplier: Option<f32>,
    keep_on_death_percent: Option<f32>,
    completion_bonus_percent: Option<f32>,
    allow_reward_doubling: Option<bool>,
    checkpoint_every_stages: Option<u32>,
    checkpoint_bonus_percent: Option<f32>,
    checkpoint_skip_multiplier: Option<f32>,
    allow_revive: Option<bool>,
    revive_health_percent: Option<f32>,
    revive_invulnerability: Option<f32>,
}

impl ModeOverride {
    fn apply(self, preset: GameMode) -> Result<GameMode, String> {
        let name = preset.kind.name();
        if let Some(kind) = self.kind {
            if kind != preset.kind {
                return Err(format!("{} mode table declares kind {}", name, kind.name()));
            }
        }
        // Endlessness belongs to the kind, a stage cap cannot change it
        if self.max_stages.is_some() && preset.is_infinite() {
            return Err(format!("{} mode is endless and takes no max_stages", name));
        }

        Ok(GameMode {
            kind: preset.kind,
            max_stages: self.max_stages.or(preset.max_stages),
            per_collect_multiplier: self
                .per_collect_multiplier
                .unwrap_or(preset.per_collect_multiplier),
            keep_on_death_percent: self
                .keep_on_death_percent
                .unwrap_or(preset.keep_on_death_percent),
            completion_bonus_percent: self
                .completion_bonus_percent
                .unwrap_or(preset.completion_bonus_percent),
            allow_reward_doubling: self
                .allow_reward_doubling
                .unwrap_or(preset.allow_reward_doubling),
            checkpoint_every_stages: self
                .checkpoint_every_stages
                .unwrap_or(preset.checkpoint_every_stages),
            checkpoint_bonus_percent: self
                .checkpoint_bonus_percent
                .unwrap_or(preset.checkpoint_bonus_percent),
            checkpoint_skip_multiplier: self
                .checkpoint_skip_multiplier
                .unwrap_or(preset.checkpoint_skip_multiplier),
            allow_revive: self.allow_revive.unwrap_or(preset.allow_revive),
            revive_health_percent: self
                .revive_health_percent
                .unwrap_or(preset.revive_health_percent),
            revive_invulnerability: self
                .revive_invulnerability
                .unwrap_or(preset.revive_invulnerability),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ModeTableOverride {
    casual: ModeOverride,
    full: ModeOverride,
    infinity: ModeOverride,
}

/// The three mode presets, overridable from config.
///
/// Each `[modes.<kind>]` table is merged key by key onto its own preset, so
/// `[modes.infinity]` with only `checkpoint_every_stages = 3` keeps every
/// other Infinity value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeTable {
    pub casual: GameMode,
    pub full: GameMode,
    pub infinity: GameMode,
}

impl Default for ModeTable {
    fn default() -> Self {
        Self {
            casual: GameMode::casual(),
            full: GameMode::full(),
            infinity: GameMode::infinity(),
        }
    }
}

impl<'de> Deserialize<'de> for ModeTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let table = ModeTableOverride::deserialize(deserializer)?;
        Ok(Self {
            casual: table.casual.apply(GameMode::casual()).map_err(D::Error::custom)?,
            full: table.full.apply(GameMode::full()).map_err(D::Error::custom)?,
            infinity: table
                .infinity
                .apply(GameMode::infinity())
                .map_err(D::Error::custom)?,
        })
    }
}

impl ModeTable {
    pub fn get(&self, kind: ModeKind) -> &GameMode {
        match kind {
            ModeKind::Casual => &self.casual,
            ModeKind::Full => &self.full,
            ModeKind::Infinity => &self.infinity,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.casual.validate()?;
        self.full.validate()?;
        self.infinity.validate()
    }
}
