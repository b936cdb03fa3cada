// Hit-stop and impact feedback

use std::collections::HashMap;

use super::damage::TargetId;
use crate::core::math::tick_down;

/// Presentation hooks a landed hit asks for
pub trait CombatFeedback {
    /// Dip global time to `time_scale` for `duration` real seconds
    fn request_hit_stop(&mut self, duration: f32, time_scale: f32);

    /// White-flash the target
    fn flash(&mut self, target: TargetId);
}

/// Brief global time-scale dip, counted down in unscaled time
#[derive(Debug, Clone, Default)]
pub struct HitStop {
    remaining: f32,
    scale: f32,
}

impl HitStop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or extend a hit-stop. Overlapping requests keep the longer
    /// remaining time and the lower scale.
    pub fn request(&mut self, duration: f32, time_scale: f32) {
        if duration <= 0.0 {
            return;
        }
        let time_scale = time_scale.clamp(0.0, 1.0);
        if self.is_active() {
            self.remaining = self.remaining.max(duration);
            self.scale = self.scale.min(time_scale);
        } else {
            self.remaining = duration;
            self.scale = time_scale;
        }
    }

    /// Advance by real (unscaled) seconds
    pub fn update(&mut self, real_dt: f32) {
        tick_down(&mut self.remaining, real_dt);
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Time scale to feed the game loop
    pub fn time_scale(&self) -> f32 {
        if self.is_active() {
            self.scale
        } else {
            1.0
        }
    }
}

/// Default feedback state: a hit-stop plus per-target flash timers
#[derive(Debug, Clone)]
pub struct FeedbackState {
    pub hit_stop: HitStop,
    flashes: HashMap<TargetId, f32>,
    flash_time: f32,
}

impl FeedbackState {
    pub fn new(flash_time: f32) -> Self {
        Self {
            hit_stop: HitStop::new(),
            flashes: HashMap::new(),
            flash_time,
        }
    }

    pub fn update(&mut self, real_dt: f32) {
        self.hit_stop.update(real_dt);
        for remaining in self.flashes.values_mut() {
            tick_down(remaining, real_dt);
        }
        self.flashes.retain(|_, remaining| *remaining > 0.0);
    }

    pub fn is_flashing(&self, target: TargetId) -> bool {
        self.flashes.contains_key(&target)
    }

    pub fn time_scale(&self) -> f32 {
        self.hit_stop.time_scale()
    }
}

impl CombatFeedback for FeedbackState {
    fn request_hit_stop(&mut self, duration: f32, time_scale: f32) {
        self.hit_stop.request(duration, time_scale);
    }

    /// Restarts the flash if it is already running
    fn flash(&mut self, target: TargetId) {
        if self.flash_time > 0.0 {
            self.flashes.insert(target, self.flash_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_stop_expires() {
        let mut stop = HitStop::new();
        assert_eq!(stop.time_scale(), 1.0);
        stop.request(0.035, 0.08);
        assert_eq!(stop.time_scale(), 0.08);
        stop.update(0.02);
        assert!(stop.is_active());
        stop.update(0.02);
        assert_eq!(stop.time_scale(), 1.0);
    }

    #[test]
    fn test_overlapping_requests_merge() {
        let mut stop = HitStop::new();
        stop.request(0.05, 0.2);
        stop.request(0.02, 0.05);
        assert_eq!(stop.time_scale(), 0.05);
        stop.update(0.03);
        // The longer duration survives
        assert!(stop.is_active());
    }

    #[test]
    fn test_flash_timers() {
        let mut feedback = FeedbackState::new(0.08);
        feedback.flash(TargetId(1));
        assert!(feedback.is_flashing(TargetId(1)));
        feedback.update(0.1);
        assert!(!feedback.is_flashing(TargetId(1)));
    }
}
