//! Primary patterns: synthesize a color per pixel from time and position.

use crate::colors::{Palette, blackbody};
use crate::types::{Color, PatternError, PatternOutput, PatternState, Sample};
use crate::waves::{fract, wave_cubic, wave_sine, wave_triangle};

/// Smallest divisor [`BuiltinPrimary::RgbRipples1d`] divides by.
///
/// The ripple divides by a triangle wave that touches zero; clamping the
/// divisor caps every channel at `0.03 / RIPPLE_MIN_DIVISOR`.
pub const RIPPLE_MIN_DIVISOR: f32 = 0.01;

const RIPPLE_STRENGTH: f32 = 0.03;

/// A pattern that computes the color of one pixel for one frame.
///
/// Implementations must be pure functions of their inputs. A pattern that
/// needs memory returns its new state in [`PatternOutput::state`] and receives
/// it back as `prev_state` on the next frame.
pub trait PrimaryPattern: Sync {
    /// Evaluates the pattern at `sample`.
    ///
    /// # Errors
    /// * `PaletteIndex` - the pattern reads a color the palette doesn't have
    fn evaluate(
        &self,
        sample: &Sample,
        prev_state: &PatternState,
        palette: &Palette,
    ) -> Result<PatternOutput, PatternError>;
}

/// The stock primary patterns, in registry id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuiltinPrimary {
    /// First palette color, in HSV.
    SolidColor,
    /// Hue sweeps with time and position.
    CycleHue1d,
    /// [`BuiltinPrimary::CycleHue1d`] quantized to six hue bands.
    CycleHueBands1d,
    /// Three sine waves at different rates, one per RGB channel.
    RgbSines1d,
    /// Three cubic waves at different rates, one per RGB channel.
    RgbCubics1d,
    /// Glowing black body ramping from 1000K to 6500K.
    CycleBlackbody1d,
    /// Hue bounces back and forth over time.
    BounceHue1d,
    /// Interference ripples, slightly delayed per RGB channel.
    RgbRipples1d,
}

impl BuiltinPrimary {
    /// All built-in primaries, indexed by id.
    pub const ALL: [BuiltinPrimary; 8] = [
        BuiltinPrimary::SolidColor,
        BuiltinPrimary::CycleHue1d,
        BuiltinPrimary::CycleHueBands1d,
        BuiltinPrimary::RgbSines1d,
        BuiltinPrimary::RgbCubics1d,
        BuiltinPrimary::CycleBlackbody1d,
        BuiltinPrimary::BounceHue1d,
        BuiltinPrimary::RgbRipples1d,
    ];

    /// Registry id.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Canonical snake_case identifier.
    pub fn identifier(self) -> &'static str {
        match self {
            BuiltinPrimary::SolidColor => "solid_color",
            BuiltinPrimary::CycleHue1d => "cycle_hue_1d",
            BuiltinPrimary::CycleHueBands1d => "cycle_hue_bands_1d",
            BuiltinPrimary::RgbSines1d => "rgb_sines_1d",
            BuiltinPrimary::RgbCubics1d => "rgb_cubics_1d",
            BuiltinPrimary::CycleBlackbody1d => "cycle_blackbody_1d",
            BuiltinPrimary::BounceHue1d => "bounce_hue_1d",
            BuiltinPrimary::RgbRipples1d => "rgb_ripples_1d",
        }
    }

    /// Name shown in the UI. Keeps the `RGB` acronym intact.
    pub fn display_name(self) -> &'static str {
        match self {
            BuiltinPrimary::SolidColor => "Solid Color",
            BuiltinPrimary::CycleHue1d => "Cycle Hue 1D",
            BuiltinPrimary::CycleHueBands1d => "Cycle Hue Bands 1D",
            BuiltinPrimary::RgbSines1d => "RGB Sines 1D",
            BuiltinPrimary::RgbCubics1d => "RGB Cubics 1D",
            BuiltinPrimary::CycleBlackbody1d => "Cycle Blackbody 1D",
            BuiltinPrimary::BounceHue1d => "Bounce Hue 1D",
            BuiltinPrimary::RgbRipples1d => "RGB Ripples 1D",
        }
    }
}

impl PrimaryPattern for BuiltinPrimary {
    fn evaluate(
        &self,
        sample: &Sample,
        _prev_state: &PatternState,
        palette: &Palette,
    ) -> Result<PatternOutput, PatternError> {
        let Sample { t, x, .. } = *sample;
        let phase = t + x;

        let output = match self {
            BuiltinPrimary::SolidColor => PatternOutput::hsv(palette.get(0)?),
            BuiltinPrimary::CycleHue1d => PatternOutput::hsv(Color::new(phase, 1.0, 1.0)),
            BuiltinPrimary::CycleHueBands1d => {
                let band = libm::floorf(fract(phase) * 6.0) / 6.0;
                PatternOutput::hsv(Color::new(band, 1.0, 1.0))
            }
            BuiltinPrimary::RgbSines1d => PatternOutput::rgb(Color::new(
                wave_sine(phase),
                wave_sine(phase * 1.2),
                wave_sine(phase * 1.4),
            )),
            BuiltinPrimary::RgbCubics1d => PatternOutput::rgb(Color::new(
                wave_cubic(phase),
                wave_cubic(phase * 1.2),
                wave_cubic(phase * 1.4),
            )),
            BuiltinPrimary::CycleBlackbody1d => {
                let v = fract(phase);
                let [r, g, b] = blackbody(v * v * 5500.0 + 1000.0);
                PatternOutput::rgb(Color::new(r, g, b).scale(v))
            }
            BuiltinPrimary::BounceHue1d => {
                let bounce = libm::fabsf(2.0 * fract(t) - 1.0);
                PatternOutput::hsv(Color::new(bounce + x, 1.0, 1.0))
            }
            BuiltinPrimary::RgbRipples1d => {
                let mut channels = [0.0; 3];
                for (i, channel) in channels.iter_mut().enumerate() {
                    let delayed = t + 0.05 * i as f32;
                    let v = x + wave_sine(delayed) + wave_sine(x + 0.666 * delayed);
                    *channel = RIPPLE_STRENGTH / wave_triangle(v).max(RIPPLE_MIN_DIVISOR);
                }
                PatternOutput::rgb(Color(channels))
            }
        };

        Ok(output)
    }
}

/// Always black. Used for groups that are switched off; not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Blank;

impl PrimaryPattern for Blank {
    fn evaluate(
        &self,
        _sample: &Sample,
        _prev_state: &PatternState,
        _palette: &Palette,
    ) -> Result<PatternOutput, PatternError> {
        Ok(PatternOutput::hsv(Color::new(0.0, 0.0, 0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_table_order() {
        for (index, pattern) in BuiltinPrimary::ALL.iter().enumerate() {
            assert_eq!(pattern.id() as usize, index);
        }
    }

    #[test]
    fn solid_color_without_palette_is_an_error() {
        let result = BuiltinPrimary::SolidColor.evaluate(
            &Sample::default(),
            &PatternState::new(),
            &Palette::new(),
        );
        assert_eq!(result, Err(PatternError::PaletteIndex { index: 0, len: 0 }));
    }

    #[test]
    fn blank_is_black() {
        let output = Blank
            .evaluate(&Sample::new(3.0, 0.1, 0.4, 0.0), &PatternState::new(), &Palette::new())
            .unwrap();
        assert_eq!(output.color, Color::new(0.0, 0.0, 0.0));
    }
}
