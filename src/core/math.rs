// Math utilities and helper functions

use glam::Vec2;

/// Clamp a value between 0 and 1
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Component-wise interpolation between two points, `t` clamped to [0, 1]
pub fn lerp_vec2(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    let t = clamp01(t);
    Vec2::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

/// Percentages are authored to at most six decimals
const PERCENT_PRECISION: f64 = 1e6;

/// Floor a non-negative product of coins and a percentage.
///
/// The percent is snapped to `PERCENT_PRECISION` first, so the f32 error in
/// values like 0.7 never costs a coin. Negative or non-finite inputs collapse
/// to zero: coin math never goes below zero.
pub fn floor_coins(coins: i64, percent: f32) -> i64 {
    let percent = (percent as f64 * PERCENT_PRECISION).round() / PERCENT_PRECISION;
    let product = coins as f64 * percent;
    if !product.is_finite() || product <= 0.0 {
        return 0;
    }
    (product + 1e-9).floor() as i64
}

/// Count down a timer towards zero, never going negative
pub fn tick_down(timer: &mut f32, dt: f32) {
    if *timer > 0.0 {
        *timer = (*timer - dt).max(0.0);
    }
}

/// Sign of an axis value with a deadzone: -1, 0 or +1
pub fn axis_sign(value: f32, deadzone: f32) -> i8 {
    if value > deadzone {
        1
    } else if value < -deadzone {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(0.5), 0.5);
        assert_eq!(clamp01(-5.0), 0.0);
        assert_eq!(clamp01(15.0), 1.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
    }

    #[test]
    fn test_lerp_vec2_clamps_t() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(2.0, 4.0);
        assert_eq!(lerp_vec2(a, b, 0.5), Vec2::new(1.0, 2.0));
        assert_eq!(lerp_vec2(a, b, 3.0), b);
    }

    #[test]
    fn test_floor_coins() {
        assert_eq!(floor_coins(100, 0.5), 50);
        assert_eq!(floor_coins(99, 0.4), 39);
        assert_eq!(floor_coins(100, -1.0), 0);
        assert_eq!(floor_coins(-10, 0.5), 0);
        assert_eq!(floor_coins(10, f32::NAN), 0);
    }

    #[test]
    fn test_floor_coins_ignores_f32_error() {
        assert_eq!(floor_coins(10, 0.7), 7);
        assert_eq!(floor_coins(10, 0.9), 9);
        assert_eq!(floor_coins(100, 0.35), 35);
        assert_eq!(floor_coins(120, 0.78125), 93);
        assert_eq!(floor_coins(19, 0.55), 10);
    }

    #[test]
    fn test_tick_down_stops_at_zero() {
        let mut t = 0.1;
        tick_down(&mut t, 0.25);
        assert_eq!(t, 0.0);
        tick_down(&mut t, 0.25);
        assert_eq!(t, 0.0);
    }

    #[test]
    fn test_axis_sign() {
        assert_eq!(axis_sign(0.5, 0.1), 1);
        assert_eq!(axis_sign(-0.5, 0.1), -1);
        assert_eq!(axis_sign(0.05, 0.1), 0);
    }
}
