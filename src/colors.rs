//! Color space conversion helpers and the user palette.
//!
//! Patterns emit raw channels tagged with a [`ColorSpace`]; the functions here
//! turn them into `palette::Srgb` for output. Hue is always measured in turns
//! (1.0 = full circle) so it can be fed straight from the periodic waves.

use crate::types::{Color, ColorSpace, MAX_PALETTE_COLORS, PatternError};
use crate::waves::fract;
use heapless::Vec;
use palette::convert::FromColorUnclamped;
use palette::white_point::D65;
use palette::{FromColor, Hsv, LinSrgb, Srgb, Xyz, Yxy};

/// Lowest color temperature [`blackbody`] distinguishes.
pub const MIN_KELVIN: f32 = 1000.0;

/// Highest color temperature [`blackbody`] distinguishes.
pub const MAX_KELVIN: f32 = 15000.0;

/// Creates an RGB color from hue (in turns), saturation and value.
///
/// Saturation and value are clamped to `[0.0, 1.0]`; hue wraps.
#[inline]
pub fn hsv(hue: f32, saturation: f32, value: f32) -> Srgb {
    let hsv = Hsv::new(hue * 360.0, saturation, value);
    Srgb::from_color(hsv)
}

/// Creates an RGB color from hue only (full saturation and value).
#[inline]
pub fn hue(hue: f32) -> Srgb {
    hsv(hue, 1.0, 1.0)
}

/// Converts pattern output to RGB, clamping every channel to `[0.0, 1.0]`.
pub fn to_srgb(color: Color, space: ColorSpace) -> Srgb {
    let [c0, c1, c2] = color.channels();
    match space {
        ColorSpace::Hsv => hsv(c0, c1, c2),
        ColorSpace::Rgb => Srgb::new(
            c0.clamp(0.0, 1.0),
            c1.clamp(0.0, 1.0),
            c2.clamp(0.0, 1.0),
        ),
    }
}

/// Color of a black body radiator at `kelvin`, as sRGB channels in `[0.0, 1.0]`.
///
/// The temperature is clamped to [`MIN_KELVIN`]..=[`MAX_KELVIN`]. The result is
/// normalized so its brightest channel is 1.0; dimming is left to the caller.
pub fn blackbody(kelvin: f32) -> [f32; 3] {
    let kelvin = kelvin.clamp(MIN_KELVIN, MAX_KELVIN);
    let (x, y) = cct_to_xy(kelvin);

    let xyz = Xyz::<D65, f32>::from_color_unclamped(Yxy::<D65, f32>::new(x, y, 1.0));
    let linear = LinSrgb::from_color_unclamped(xyz);

    let peak = linear.red.max(linear.green).max(linear.blue);
    if peak <= 0.0 {
        return [0.0; 3];
    }

    let normalized = LinSrgb::new(
        (linear.red / peak).clamp(0.0, 1.0),
        (linear.green / peak).clamp(0.0, 1.0),
        (linear.blue / peak).clamp(0.0, 1.0),
    );
    let encoded = Srgb::from_linear(normalized);
    [encoded.red, encoded.green, encoded.blue]
}

// Krystek (1985), "An algorithm to calculate correlated colour temperature",
// rational fit of the Planckian locus in CIE 1960 (u, v), valid 1000-15000 K.
fn cct_to_xy(kelvin: f32) -> (f32, f32) {
    let t = kelvin;
    let t2 = t * t;

    let u = (0.860117757 + 1.54118254e-4 * t + 1.28641212e-7 * t2)
        / (1.0 + 8.42420235e-4 * t + 7.08145163e-7 * t2);
    let v = (0.317398726 + 4.22806245e-5 * t + 4.20481691e-8 * t2)
        / (1.0 - 2.89741816e-5 * t + 1.61456053e-7 * t2);

    let d = 2.0 * u - 8.0 * v + 4.0;
    (3.0 * u / d, 2.0 * v / d)
}

/// Ordered list of user-selected HSV colors.
///
/// Patterns index into it for fixed reference colors, or sample it as a
/// continuous gradient with [`Palette::sample`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Palette {
    colors: Vec<Color, MAX_PALETTE_COLORS>,
}

impl Palette {
    /// Creates an empty palette.
    pub const fn new() -> Self {
        Self { colors: Vec::new() }
    }

    /// Creates a palette from a list of HSV colors.
    ///
    /// # Errors
    /// * `PaletteFull` - more than [`MAX_PALETTE_COLORS`] colors
    pub fn from_colors(colors: &[Color]) -> Result<Self, PatternError> {
        let mut palette = Self::new();
        for &color in colors {
            palette.push(color)?;
        }
        Ok(palette)
    }

    /// Appends a color.
    pub fn push(&mut self, color: Color) -> Result<(), PatternError> {
        self.colors.push(color).map_err(|_| PatternError::PaletteFull)
    }

    /// Returns the color at `index`.
    ///
    /// # Errors
    /// * `PaletteIndex` - `index` is past the end of the palette
    pub fn get(&self, index: usize) -> Result<Color, PatternError> {
        self.colors
            .get(index)
            .copied()
            .ok_or(PatternError::PaletteIndex {
                index,
                len: self.colors.len(),
            })
    }

    /// All colors, in order.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Number of colors.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns true if the palette has no colors.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Samples the palette as an HSV gradient at `position` in `[0.0, 1.0]`.
    ///
    /// The range is split into `len - 1` equal sectors between consecutive
    /// colors. Hue takes the shortest way around the circle, except when two
    /// neighbours are exactly one turn apart, which sweeps the full spectrum.
    /// The returned hue is wrapped into `[0.0, 1.0)`.
    ///
    /// # Errors
    /// * `PaletteIndex` - the palette is empty
    pub fn sample(&self, position: f32) -> Result<Color, PatternError> {
        let len = self.colors.len();
        if len < 2 {
            return self.get(0);
        }

        let sectors = (len - 1) as f32;
        let scaled = position.clamp(0.0, 1.0) * sectors;
        let sector = (libm::floorf(scaled) as usize).min(len - 2);
        let f = scaled - sector as f32;

        let [h1, s1, v1] = self.colors[sector].channels();
        let [h2, s2, v2] = self.colors[sector + 1].channels();

        let mut dh = h2 - h1;
        if libm::fabsf(dh) != 1.0 {
            if dh < -0.5 {
                dh += 1.0;
            }
            if dh > 0.5 {
                dh -= 1.0;
            }
        }

        Ok(Color::new(
            fract(h1 + f * dh),
            s1 + f * (s2 - s1),
            v1 + f * (v2 - v1),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blackbody_is_normalized_and_warm_at_low_temperatures() {
        let [r, g, b] = blackbody(1500.0);
        assert!((r - 1.0).abs() < 1e-4);
        assert!(g < r);
        assert!(b <= g);
    }

    #[test]
    fn blackbody_clamps_temperature() {
        assert_eq!(blackbody(10.0), blackbody(MIN_KELVIN));
        assert_eq!(blackbody(1.0e6), blackbody(MAX_KELVIN));
    }

    #[test]
    fn palette_get_reports_out_of_range_index() {
        let palette = Palette::from_colors(&[Color::new(0.5, 1.0, 1.0)]).unwrap();
        assert_eq!(
            palette.get(3),
            Err(PatternError::PaletteIndex { index: 3, len: 1 })
        );
    }
}
