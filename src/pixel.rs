//! Shading a single pixel: primary color, secondary brightness, final RGB.
//!
//! This is the per-pixel step a renderer runs once per frame. Scheduling,
//! worker partitioning and pushing bytes to the strip are up to the caller.

use crate::colors::{Palette, to_srgb};
use crate::primary::PrimaryPattern;
use crate::secondary::SecondaryPattern;
use crate::types::{ColorSpace, PatternError, PatternState, Sample};
use palette::Srgb;
use rand::RngCore;

/// User settings for a group of pixels sharing the same patterns.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GroupSettings {
    /// Overall brightness multiplier, `[0.0, 1.0]`.
    pub brightness: f32,

    /// Saturation multiplier applied to HSV patterns.
    pub saturation: f32,

    /// Time multiplier: 2.0 animates twice as fast.
    pub speed: f32,

    /// Spatial multiplier: 2.0 fits twice as many repetitions on the strip.
    pub scale: f32,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            saturation: 1.0,
            speed: 1.0,
            scale: 1.0,
        }
    }
}

impl GroupSettings {
    /// Applies speed and scale to a raw sample.
    pub fn apply(&self, sample: &Sample) -> Sample {
        Sample {
            t: sample.t * self.speed,
            dt: sample.dt * self.speed,
            x: sample.x * self.scale,
            y: sample.y * self.scale,
        }
    }
}

/// The pattern state one pixel owns across frames.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PixelState {
    pub primary: PatternState,
    pub secondary: PatternState,
}

impl PixelState {
    pub const fn new() -> Self {
        Self {
            primary: PatternState::new(),
            secondary: PatternState::new(),
        }
    }
}

/// Computes the final color of one pixel for one frame.
///
/// Runs `primary`, applies the group's saturation to HSV output, runs
/// `secondary` on the result and scales the RGB color by the modulation's
/// brightness times the group brightness (clamped to `[0.0, 1.0]`). Any
/// state either pattern returns replaces the matching slot in `state`.
///
/// # Errors
/// Propagates palette errors from the primary pattern. `state` is left
/// untouched when an error is returned.
pub fn shade_pixel(
    primary: &dyn PrimaryPattern,
    secondary: &dyn SecondaryPattern,
    settings: &GroupSettings,
    sample: &Sample,
    palette: &Palette,
    state: &mut PixelState,
    rng: &mut dyn RngCore,
) -> Result<Srgb, PatternError> {
    let sample = settings.apply(sample);

    let output = primary.evaluate(&sample, &state.primary, palette)?;
    let mut color = output.color;
    if output.space == ColorSpace::Hsv {
        color.0[1] *= settings.saturation;
    }

    let modulation = secondary.evaluate(&sample, &state.secondary, color, rng);

    if let Some(next) = output.state {
        state.primary = next;
    }
    if let Some(next) = modulation.state {
        state.secondary = next;
    }

    let rgb = to_srgb(modulation.color, output.space);
    let factor = (modulation.brightness * settings.brightness).clamp(0.0, 1.0);
    Ok(Srgb::new(rgb.red * factor, rgb.green * factor, rgb.blue * factor))
}
