// Run payout math. Pure functions, same inputs always give the same result.

use serde::{Deserialize, Serialize};

use super::mode::GameMode;
use crate::core::math::{clamp01, floor_coins};

/// Breakdown of a run's payout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RewardResult {
    pub base_coins: i64,
    pub completion_bonus_coins: i64,
    pub checkpoint_bonus_coins: i64,
    pub total_before_bonus_doubling: i64,
    pub doubling_eligible: bool,
    pub total_if_doubled: i64,
}

impl RewardResult {
    /// Payout for a finished run: coins plus completion and checkpoint bonuses
    pub fn victory(mode: &GameMode, base_coins: i64, checkpoint_bonus_coins: i64) -> Self {
        let completion = floor_coins(base_coins, mode.completion_bonus_percent.max(0.0));
        let total = base_coins + completion + checkpoint_bonus_coins.max(0);
        Self::with_doubling(
            mode,
            Self {
                base_coins,
                completion_bonus_coins: completion,
                checkpoint_bonus_coins,
                total_before_bonus_doubling: total,
                ..Self::default()
            },
        )
    }

    /// Payout for a run lost to death: only the kept share of the coins
    pub fn death(mode: &GameMode, base_coins: i64) -> Self {
        let kept = floor_coins(base_coins, clamp01(mode.keep_on_death_percent));
        Self::with_doubling(
            mode,
            Self {
                base_coins,
                total_before_bonus_doubling: kept,
                ..Self::default()
            },
        )
    }

    /// Extra coins the doubling bonus would add
    pub fn doubling_extra(&self) -> i64 {
        self.total_if_doubled - self.total_before_bonus_doubling
    }

    fn with_doubling(mode: &GameMode, mut result: Self) -> Self {
        result.doubling_eligible = mode.allow_reward_doubling;
        result.total_if_doubled = if result.doubling_eligible {
            result.total_before_bonus_doubling * 2
        } else {
            result.total_before_bonus_doubling
        };
        result
    }
}
