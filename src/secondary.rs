//! Secondary patterns: brightness modulation applied on top of a primary.
//!
//! A secondary pattern never inspects the color it is given. It only computes
//! a brightness multiplier, which keeps it independent of the color space the
//! primary pattern emitted.

use crate::types::{Color, Modulation, PatternState, Sample};
use crate::waves::{fract, wave_cubic, wave_sine, wave_triangle};
use rand::{Rng, RngCore};

/// A pattern that modulates the brightness of an already computed color.
pub trait SecondaryPattern: Sync {
    /// Evaluates the modulation at `sample`.
    ///
    /// `in_color` is passed through unchanged. Randomized patterns draw from
    /// `rng`, which the caller owns (typically one generator per worker).
    fn evaluate(
        &self,
        sample: &Sample,
        prev_state: &PatternState,
        in_color: Color,
        rng: &mut dyn RngCore,
    ) -> Modulation;
}

/// Identity modulation: brightness is always 1.0.
///
/// Always registered as secondary id 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoModulation;

impl SecondaryPattern for NoModulation {
    fn evaluate(
        &self,
        _sample: &Sample,
        _prev_state: &PatternState,
        in_color: Color,
        _rng: &mut dyn RngCore,
    ) -> Modulation {
        Modulation::new(in_color, 1.0)
    }
}

/// The stock secondary patterns, in registry id order starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuiltinSecondary {
    Sine1d = 1,
    Cubic1d,
    /// Linear 0 to 1 sawtooth.
    Ramp1d,
    /// Sine brightness whose phase bounces with a triangle wave.
    BounceTriangle1d,
    BounceSine1d,
    BounceCubic1d,
    /// Pixels flash to a random brightness at random intervals.
    TwinklePulse1d,
}

impl BuiltinSecondary {
    /// All built-in secondaries, in id order.
    pub const ALL: [BuiltinSecondary; 7] = [
        BuiltinSecondary::Sine1d,
        BuiltinSecondary::Cubic1d,
        BuiltinSecondary::Ramp1d,
        BuiltinSecondary::BounceTriangle1d,
        BuiltinSecondary::BounceSine1d,
        BuiltinSecondary::BounceCubic1d,
        BuiltinSecondary::TwinklePulse1d,
    ];

    /// Registry id.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Canonical snake_case identifier; the display name is derived from it.
    pub fn identifier(self) -> &'static str {
        match self {
            BuiltinSecondary::Sine1d => "sine_1d",
            BuiltinSecondary::Cubic1d => "cubic_1d",
            BuiltinSecondary::Ramp1d => "ramp_1d",
            BuiltinSecondary::BounceTriangle1d => "bounce_triangle_1d",
            BuiltinSecondary::BounceSine1d => "bounce_sine_1d",
            BuiltinSecondary::BounceCubic1d => "bounce_cubic_1d",
            BuiltinSecondary::TwinklePulse1d => "twinkle_pulse_1d",
        }
    }
}

impl SecondaryPattern for BuiltinSecondary {
    fn evaluate(
        &self,
        sample: &Sample,
        prev_state: &PatternState,
        in_color: Color,
        rng: &mut dyn RngCore,
    ) -> Modulation {
        let Sample { t, dt, x, .. } = *sample;

        let brightness = match self {
            BuiltinSecondary::Sine1d => wave_sine(t + x),
            BuiltinSecondary::Cubic1d => wave_cubic(t + x),
            BuiltinSecondary::Ramp1d => fract(t + x),
            BuiltinSecondary::BounceTriangle1d => wave_sine(x + wave_triangle(t)),
            BuiltinSecondary::BounceSine1d => wave_sine(x + wave_sine(t)),
            BuiltinSecondary::BounceCubic1d => wave_cubic(x + wave_sine(t)),
            BuiltinSecondary::TwinklePulse1d => return twinkle(dt, prev_state, in_color, rng),
        };

        Modulation::new(in_color, brightness)
    }
}

/// State layout: `[timer, brightness]`. Missing slots read as 0.0, so a fresh
/// pixel fires on its first frame.
///
/// The freshly drawn value is used both as the next timer and as the
/// brightness, so brightness jumps exactly when the timer expires.
fn twinkle(dt: f32, prev_state: &PatternState, in_color: Color, rng: &mut dyn RngCore) -> Modulation {
    let timer = prev_state.get(0).unwrap_or(0.0) - dt;

    let (timer, brightness) = if timer <= 0.0 {
        let draw = rng.gen_range(0.0f32..1.0);
        (draw, draw)
    } else {
        (timer, prev_state.get(1).unwrap_or(0.0))
    };

    Modulation {
        color: in_color,
        brightness,
        state: Some(PatternState::from_array([timer, brightness])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn ids_start_after_reserved_none() {
        for (index, pattern) in BuiltinSecondary::ALL.iter().enumerate() {
            assert_eq!(pattern.id() as usize, index + 1);
        }
    }

    #[test]
    fn twinkle_fires_on_empty_state() {
        let mut rng = SmallRng::seed_from_u64(7);
        let modulation = twinkle(0.016, &PatternState::new(), Color::default(), &mut rng);
        let state = modulation.state.unwrap();
        assert_eq!(state.get(0), Some(modulation.brightness));
        assert_eq!(state.get(1), Some(modulation.brightness));
    }
}
