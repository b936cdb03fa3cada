// Movement tuning - every knob the controller reads

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Tunable movement parameters for the player controller
///
/// Anchor heights are measured from the body centre. Horizontal probe
/// distances are measured from the collider's side, not from the centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    // Run
    /// Horizontal speed at full input (units/second)
    pub move_speed: f32,
    /// Gravity scale restored on every exit from a zero-gravity mode
    pub gravity_scale: f32,
    /// Stick values inside this band count as no input
    pub input_deadzone: f32,

    // Dash
    pub enable_dash: bool,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    /// Zero gravity for the duration of the dash
    pub dash_no_gravity: bool,
    /// Zero horizontal velocity when the dash ends
    pub dash_lock_movement: bool,
    /// Window after a dash during which a ledge can be grabbed at zero vertical speed
    pub post_dash_ledge_grace: f32,

    // Jump
    /// Upward velocity assigned when a ground/coyote jump starts
    pub jump_force: f32,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,
    pub enable_double_jump: bool,
    /// Upward velocity for the air jump, 0 falls back to `jump_force`
    pub double_jump_force: f32,
    /// How long holding the button keeps adding lift
    pub jump_hold_time: f32,
    pub jump_hold_acceleration: f32,
    /// Multiplier applied once to upward velocity on early release
    pub jump_cut_multiplier: f32,
    pub max_jump_up_velocity: f32,
    /// Upward speeds above this never count as grounded
    pub ungrounded_up_velocity: f32,

    // Ground check
    pub ground_check_radius: f32,
    /// Extra downward offset of the ground probe below the feet
    pub ground_check_offset: f32,

    // Wall slide / hold / jump
    pub enable_wall_slide: bool,
    pub wall_slide_check_distance: f32,
    pub wall_slide_max_speed: f32,
    pub wall_jump_horizontal: f32,
    pub wall_jump_vertical: f32,
    /// Horizontal input ignored for this long after a wall jump
    pub wall_jump_input_lock: f32,
    /// Wall states cannot be re-entered for this long after a wall jump
    pub wall_regrab_lock: f32,

    // Ledge grab / climb
    pub enable_ledge_climb: bool,
    /// Height of the wall probe (chest)
    pub chest_height: f32,
    /// Height of the clearance probe (above the head)
    pub head_height: f32,
    pub wall_check_distance: f32,
    pub ledge_check_distance: f32,
    pub top_check_down_distance: f32,
    /// How far past the wall face the top probe starts
    pub ledge_corner_inset: f32,
    /// Gap kept between the collider and the wall while hanging
    pub ledge_hang_gap: f32,
    /// Hang promotes itself to a climb after this long, 0 disables
    pub auto_climb_delay: f32,
    pub climb_duration: f32,
    /// Horizontal offset of the climb end point past the wall face
    pub climb_end_offset_x: f32,
    /// Clearance added above the ledge top so the feet do not snag
    pub climb_end_clearance: f32,
    pub ledge_regrab_cooldown: f32,
    pub ledge_hang_lock: f32,
    pub ledge_start_climb_lock: f32,

    // Death
    pub respawn_delay: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            move_speed: 6.0,
            gravity_scale: 1.0,
            input_deadzone: 0.01,

            enable_dash: true,
            dash_speed: 16.0,
            dash_duration: 0.12,
            dash_cooldown: 0.35,
            dash_no_gravity: true,
            dash_lock_movement: true,
            post_dash_ledge_grace: 0.1,

            jump_force: 12.0,
            coyote_time: 0.12,
            jump_buffer_time: 0.12,
            enable_double_jump: true,
            double_jump_force: 12.0,
            jump_hold_time: 0.16,
            jump_hold_acceleration: 35.0,
            jump_cut_multiplier: 0.45,
            max_jump_up_velocity: 16.0,
            ungrounded_up_velocity: 0.1,

            ground_check_radius: 0.15,
            ground_check_offset: 0.0,

            enable_wall_slide: true,
            wall_slide_check_distance: 0.2,
            wall_slide_max_speed: 2.5,
            wall_jump_horizontal: 8.0,
            wall_jump_vertical: 12.0,
            wall_jump_input_lock: 0.15,
            wall_regrab_lock: 0.2,

            enable_ledge_climb: true,
            chest_height: 0.3,
            head_height: 1.1,
            wall_check_distance: 0.2,
            ledge_check_distance: 0.2,
            top_check_down_distance: 1.5,
            ledge_corner_inset: 0.05,
            ledge_hang_gap: 0.05,
            auto_climb_delay: 0.0,
            climb_duration: 0.12,
            climb_end_offset_x: 0.35,
            climb_end_clearance: 0.02,
            ledge_regrab_cooldown: 0.15,
            ledge_hang_lock: 0.12,
            ledge_start_climb_lock: 0.35,

            respawn_delay: 0.1,
        }
    }
}

impl MovementTuning {
    /// Check the values the controller cannot run without
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("ground_check_radius", self.ground_check_radius),
            ("climb_duration", self.climb_duration),
            ("dash_duration", self.dash_duration),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("move_speed", self.move_speed),
            ("coyote_time", self.coyote_time),
            ("jump_buffer_time", self.jump_buffer_time),
            ("jump_hold_time", self.jump_hold_time),
            ("dash_cooldown", self.dash_cooldown),
            ("respawn_delay", self.respawn_delay),
            ("input_deadzone", self.input_deadzone),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.jump_cut_multiplier) {
            return Err(ConfigError::Invalid(format!(
                "jump_cut_multiplier must be in [0, 1], got {}",
                self.jump_cut_multiplier
            )));
        }

        Ok(())
    }

    /// The ledge probes only make sense with the head probe above the chest probe
    pub fn ledge_probes_valid(&self) -> bool {
        self.head_height > self.chest_height
    }

    /// Effective air jump velocity
    pub fn air_jump_force(&self) -> f32 {
        if self.double_jump_force > 0.0 {
            self.double_jump_force
        } else {
            self.jump_force
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = MovementTuning::default();
        assert!(tuning.validate().is_ok());
        assert!(tuning.ledge_probes_valid());
    }

    #[test]
    fn test_zero_ground_radius_rejected() {
        let tuning = MovementTuning {
            ground_check_radius: 0.0,
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_nan_rejected() {
        let tuning = MovementTuning {
            move_speed: f32::NAN,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_air_jump_force_fallback() {
        let tuning = MovementTuning {
            double_jump_force: 0.0,
            jump_force: 9.0,
            ..Default::default()
        };
        assert_eq!(tuning.air_jump_force(), 9.0);
    }

    #[test]
    fn test_partial_toml() {
        let tuning: MovementTuning = toml::from_str("move_speed = 8.5").unwrap();
        assert_eq!(tuning.move_speed, 8.5);
        assert_eq!(tuning.jump_force, 12.0);
    }
}
