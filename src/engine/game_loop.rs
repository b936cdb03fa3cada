/// Game loop timing and control system
///
/// Implements a fixed timestep game loop with variable-rate frames.
/// The host feeds real frame durations in; the loop answers how many fixed
/// physics steps to run. No wall clock is read here, so a scripted sequence
/// of frame times always produces the same sequence of steps.

/// Target physics/update rate (60 updates per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Maximum number of physics steps per frame to prevent spiral of death
const MAX_PHYSICS_STEPS: u32 = 5;

/// Game loop timing state
#[derive(Debug)]
pub struct GameLoop {
    /// Accumulated scaled time for fixed timestep updates
    accumulator: f32,

    /// Whether the game is paused
    paused: bool,

    /// Multiplier on frame time (hit-stop, slow motion, 0 = frozen)
    time_scale: f32,

    /// Current frame number
    frame_count: u64,

    /// Total updates executed
    update_count: u64,

    /// Total scaled time simulated
    elapsed: f32,

    /// Scaled delta time of the last frame
    delta_time: f32,
}

impl GameLoop {
    /// Create a new game loop
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            paused: false,
            time_scale: 1.0,
            frame_count: 0,
            update_count: 0,
            elapsed: 0.0,
            delta_time: 0.0,
        }
    }

    /// Begin a new frame of `frame_dt` real seconds, returns the number of fixed updates to run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.frame_count += 1;

        // If paused, don't accumulate time for updates
        if self.paused {
            self.delta_time = 0.0;
            return 0;
        }

        let scaled = frame_dt.max(0.0) * self.time_scale;
        self.delta_time = scaled;
        self.elapsed += scaled;
        self.accumulator += scaled;

        // Calculate number of fixed updates to run
        let mut updates = 0;
        while self.accumulator >= FIXED_TIMESTEP && updates < MAX_PHYSICS_STEPS {
            self.accumulator -= FIXED_TIMESTEP;
            updates += 1;
        }

        // Drop the backlog we refused to simulate
        if updates == MAX_PHYSICS_STEPS && self.accumulator >= FIXED_TIMESTEP {
            self.accumulator %= FIXED_TIMESTEP;
        }

        self.update_count += updates as u64;
        updates
    }

    /// Get the fixed timestep for physics updates (in seconds)
    pub fn fixed_timestep(&self) -> f32 {
        FIXED_TIMESTEP
    }

    /// Scaled delta time of the last frame (in seconds)
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the interpolation alpha for smooth rendering between physics steps
    pub fn alpha(&self) -> f32 {
        self.accumulator / FIXED_TIMESTEP
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set the time scale, clamped to be non-negative
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Get total scaled time simulated (in seconds)
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed
    }

    /// Get total number of frames
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of updates executed
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Check if game is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause the game
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Game paused");
        }
    }

    /// Resume the game
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent update burst
            self.accumulator = 0.0;
            log::info!("Game resumed");
        }
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_loop_creation() {
        let game_loop = GameLoop::new();
        assert_eq!(game_loop.frame_count(), 0);
        assert_eq!(game_loop.update_count(), 0);
        assert!(!game_loop.is_paused());
        assert_eq!(game_loop.time_scale(), 1.0);
    }

    #[test]
    fn test_fixed_timestep() {
        let game_loop = GameLoop::new();
        assert!((game_loop.fixed_timestep() - 1.0 / 60.0).abs() < 0.0001);
    }

    #[test]
    fn test_pause_resume() {
        let mut game_loop = GameLoop::new();
        game_loop.pause();
        assert!(game_loop.is_paused());
        game_loop.resume();
        assert!(!game_loop.is_paused());
    }

    #[test]
    fn test_toggle_pause() {
        let mut game_loop = GameLoop::new();
        game_loop.toggle_pause();
        assert!(game_loop.is_paused());
        game_loop.toggle_pause();
        assert!(!game_loop.is_paused());
    }

    #[test]
    fn test_paused_no_updates() {
        let mut game_loop = GameLoop::new();
        game_loop.pause();
        assert_eq!(game_loop.advance(0.05), 0);
        assert_eq!(game_loop.frame_count(), 1);
    }

    #[test]
    fn test_update_accumulation() {
        let mut game_loop = GameLoop::new();
        // Half a step: nothing yet, then the second half completes one step
        assert_eq!(game_loop.advance(FIXED_TIMESTEP * 0.5), 0);
        assert_eq!(game_loop.advance(FIXED_TIMESTEP * 0.6), 1);
        assert_eq!(game_loop.update_count(), 1);
    }

    #[test]
    fn test_max_physics_steps_limit() {
        let mut game_loop = GameLoop::new();
        // 300ms would allow 18 updates
        assert_eq!(game_loop.advance(0.3), MAX_PHYSICS_STEPS);
        // The backlog is dropped, not replayed next frame
        assert!(game_loop.advance(0.0) <= 1);
    }

    #[test]
    fn test_time_scale_slows_simulation() {
        let mut game_loop = GameLoop::new();
        game_loop.set_time_scale(0.0);
        assert_eq!(game_loop.advance(0.1), 0);
        game_loop.set_time_scale(-3.0);
        assert_eq!(game_loop.time_scale(), 0.0);
    }

    #[test]
    fn test_alpha_range() {
        let mut game_loop = GameLoop::new();
        game_loop.advance(FIXED_TIMESTEP * 1.5);
        let alpha = game_loop.alpha();
        assert!((0.0..=1.0).contains(&alpha));
    }
}
