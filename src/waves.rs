//! Periodic wave functions used as building blocks by every pattern.
//!
//! All waves have a period of 1.0 and map any finite input to `[0.0, 1.0]`.
//! Inputs are treated as living on a unit-periodic domain, so `wave(t)` and
//! `wave(t + n)` agree for every integer `n`.

use core::f32::consts::TAU;

/// Fractional part of `t`, always in `[0.0, 1.0)`, including for negative `t`.
#[inline]
pub fn fract(t: f32) -> f32 {
    let r = t - libm::floorf(t);
    // -1e-9 - floor(-1e-9) rounds up to exactly 1.0 in f32
    if r >= 1.0 { 0.0 } else { r }
}

/// Raised cosine: 1.0 at integer `t`, 0.0 halfway between.
#[inline]
pub fn wave_sine(t: f32) -> f32 {
    libm::cosf(TAU * t) * 0.5 + 0.5
}

/// Triangle wave: 1.0 at integer `t`, falling linearly to 0.0 at `t = 0.5`.
#[inline]
pub fn wave_triangle(t: f32) -> f32 {
    libm::fabsf(2.0 * fract(t) - 1.0)
}

/// Triangle wave shaped by a cubic ease-in/ease-out.
///
/// Shares its extremes and its 0.5 crossings with [`wave_triangle`] but
/// lingers near 0.0 and 1.0.
#[inline]
pub fn wave_cubic(t: f32) -> f32 {
    let tri = wave_triangle(t);
    if tri > 0.5 {
        let inv = 1.0 - tri;
        1.0 - 4.0 * inv * inv * inv
    } else {
        4.0 * tri * tri * tri
    }
}

/// Square wave: 1.0 for the first `duty_cycle` of each period, 0.0 after.
#[inline]
pub fn wave_pulse(t: f32, duty_cycle: f32) -> f32 {
    if fract(t) < duty_cycle { 1.0 } else { 0.0 }
}
