//! Shared test infrastructure for pixel-patterns integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use palette::Srgb;
use pixel_patterns::{Color, Palette, PatternState, Sample};
use rand::SeedableRng;
use rand::rngs::SmallRng;

// ============================================================================
// Fixtures
// ============================================================================

/// Deterministic generator so random patterns are reproducible
pub fn test_rng() -> SmallRng {
    SmallRng::seed_from_u64(0x5eed)
}

/// Sample at time `t` and position `x`, with a 60fps frame step
pub fn sample(t: f32, x: f32) -> Sample {
    Sample::new(t, 1.0 / 60.0, x, 0.0)
}

pub fn empty_state() -> PatternState {
    PatternState::new()
}

/// Two-color palette: a blue and a red
pub fn test_palette() -> Palette {
    Palette::from_colors(&[Color::new(0.6, 0.8, 0.9), Color::new(0.0, 1.0, 1.0)]).unwrap()
}

/// Inputs spread over several periods, including negative ones
pub const TIMES: [f32; 9] = [-3.7, -1.0, -0.25, 0.0, 0.1, 0.5, 0.999, 12.34, 1000.5];
pub const POSITIONS: [f32; 7] = [-0.5, 0.0, 0.1, 0.333, 0.5, 0.9, 2.25];

// ============================================================================
// Test Helper Functions
// ============================================================================

pub fn approx_eq(a: f32, b: f32) -> bool {
    const EPSILON: f32 = 1e-4;
    (a - b).abs() < EPSILON
}

/// Distance between two values on the unit circle
pub fn circular_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(1.0);
    d.min(1.0 - d)
}

/// Compare two colors with floating-point tolerance
pub fn colors_equal(a: Color, b: Color) -> bool {
    a.channels()
        .iter()
        .zip(b.channels().iter())
        .all(|(x, y)| approx_eq(*x, *y))
}

pub fn srgb_equal(a: Srgb, b: Srgb) -> bool {
    approx_eq(a.red, b.red) && approx_eq(a.green, b.green) && approx_eq(a.blue, b.blue)
}
