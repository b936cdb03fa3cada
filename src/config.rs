// Game configuration
//
// Every tunable lives in one TOML file. Missing sections and keys fall back
// to the built-in defaults, so a partial file only overrides what it names:
//
//   [movement]
//   move_speed = 7.5
//
//   [modes.infinity]
//   checkpoint_every_stages = 3

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::game::combat::{ChargerTuning, CombatTuning, ProjectileTuning};
use crate::game::player::{HealthTuning, MovementTuning};
use crate::game::run::ModeTable;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub movement: MovementTuning,
    pub combat: CombatTuning,
    pub projectile: ProjectileTuning,
    pub charger: ChargerTuning,
    pub health: HealthTuning,
    pub modes: ModeTable,
}

impl GameConfig {
    /// Read and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Like `load`, but any failure yields the defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.movement.validate()?;
        self.modes.validate()?;
        if self.health.max_hp < 1 {
            return Err(ConfigError::Invalid(format!(
                "health.max_hp must be at least 1, got {}",
                self.health.max_hp
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = GameConfig::from_toml_str("").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let text = r#"
            [movement]
            move_speed = 7.5

            [modes.infinity]
            checkpoint_every_stages = 3
        "#;
        let config = GameConfig::from_toml_str(text).unwrap();
        assert_eq!(config.movement.move_speed, 7.5);
        assert_eq!(config.movement.jump_force, MovementTuning::default().jump_force);
        assert!(config.modes.infinity.is_infinite());
        assert_eq!(config.modes.infinity.checkpoint_every_stages, 3);
        assert_eq!(
            config.modes.infinity.keep_on_death_percent,
            ModeTable::default().infinity.keep_on_death_percent
        );
        assert_eq!(config.modes.casual, ModeTable::default().casual);
    }

    #[test]
    fn test_enemy_and_projectile_sections() {
        let text = r#"
            [projectile]
            speed = 20.0

            [charger]
            dash_speed = 14.0
        "#;
        let config = GameConfig::from_toml_str(text).unwrap();
        assert_eq!(config.projectile.speed, 20.0);
        assert_eq!(config.projectile.cooldown, ProjectileTuning::default().cooldown);
        assert_eq!(config.charger.dash_speed, 14.0);
        assert_eq!(config.charger.max_hp, ChargerTuning::default().max_hp);
    }

    #[test]
    fn test_parse_error() {
        let result = GameConfig::from_toml_str("[movement\nmove_speed = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_mistyped_mode_key_is_an_error() {
        let result = GameConfig::from_toml_str("[modes.infinity]\ncheckpoint_every = 3");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = GameConfig::from_toml_str("[health]\nmax_hp = 0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = GameConfig::load_or_default("definitely/not/here/edgerun.toml");
        assert_eq!(config, GameConfig::default());
        assert!(matches!(
            GameConfig::load("definitely/not/here/edgerun.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::Invalid("bad".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: bad");
    }
}
