//! Core types shared by primary and secondary patterns.

use heapless::Vec;

/// Maximum number of values a pattern can persist per pixel.
pub const MAX_STATE_LEN: usize = 8;

/// Maximum number of colors in a palette.
pub const MAX_PALETTE_COLORS: usize = 16;

/// Color space a primary pattern emits its channels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorSpace {
    /// Hue (in turns), saturation, value.
    Hsv,

    /// Red, green, blue.
    Rgb,
}

/// Three color channels, interpreted according to a [`ColorSpace`].
///
/// No conversion happens implicitly. A pattern's output is only meaningful
/// together with the color space it was emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color(pub [f32; 3]);

impl Color {
    /// Creates a color from three channel values.
    #[inline]
    pub const fn new(c0: f32, c1: f32, c2: f32) -> Self {
        Self([c0, c1, c2])
    }

    /// Returns the channel values.
    #[inline]
    pub fn channels(&self) -> [f32; 3] {
        self.0
    }

    /// Multiplies every channel by `factor`.
    #[inline]
    pub fn scale(self, factor: f32) -> Self {
        let [a, b, c] = self.0;
        Self([a * factor, b * factor, c * factor])
    }
}

/// Temporal and spatial inputs for evaluating a pattern at one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Global elapsed time in seconds.
    pub t: f32,

    /// Seconds since the previous frame, never negative.
    pub dt: f32,

    /// Normalized pixel position along the strip.
    pub x: f32,

    /// Normalized pixel position on the second axis.
    pub y: f32,
}

impl Sample {
    /// Creates a sample.
    #[inline]
    pub const fn new(t: f32, dt: f32, x: f32, y: f32) -> Self {
        Self { t, dt, x, y }
    }
}

/// Per-pixel values a pattern carries from one frame to the next.
///
/// The rendering pipeline owns one of these per pixel and per pattern slot and
/// hands the previous frame's value to every evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatternState {
    values: Vec<f32, MAX_STATE_LEN>,
}

impl PatternState {
    /// Creates an empty state.
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Creates a state holding `values`.
    ///
    /// # Errors
    /// * `StateFull` - more than [`MAX_STATE_LEN`] values
    pub fn from_values(values: &[f32]) -> Result<Self, PatternError> {
        let mut state = Self::new();
        for &value in values {
            state.push(value)?;
        }
        Ok(state)
    }

    /// Creates a state holding a fixed set of values. Exceeding
    /// [`MAX_STATE_LEN`] fails to compile.
    pub fn from_array<const M: usize>(values: [f32; M]) -> Self {
        Self {
            values: Vec::from_array(values),
        }
    }

    /// Appends a value.
    pub fn push(&mut self, value: f32) -> Result<(), PatternError> {
        self.values.push(value).map_err(|_| PatternError::StateFull)
    }

    /// Returns the value in `slot`, if present.
    #[inline]
    pub fn get(&self, slot: usize) -> Option<f32> {
        self.values.get(slot).copied()
    }

    /// Stored values, in slot order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the state holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of evaluating a primary pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternOutput {
    /// Computed color.
    pub color: Color,

    /// Color space `color` is expressed in.
    pub space: ColorSpace,

    /// Replacement state for the next frame, if the pattern keeps any.
    pub state: Option<PatternState>,
}

impl PatternOutput {
    /// Output without state in HSV.
    #[inline]
    pub fn hsv(color: Color) -> Self {
        Self {
            color,
            space: ColorSpace::Hsv,
            state: None,
        }
    }

    /// Output without state in RGB.
    #[inline]
    pub fn rgb(color: Color) -> Self {
        Self {
            color,
            space: ColorSpace::Rgb,
            state: None,
        }
    }
}

/// Result of evaluating a secondary pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Modulation {
    /// The incoming color, unchanged.
    pub color: Color,

    /// Multiplier the renderer applies to `color`.
    pub brightness: f32,

    /// Replacement state for the next frame, if the pattern keeps any.
    pub state: Option<PatternState>,
}

impl Modulation {
    /// Stateless modulation of `color` by `brightness`.
    #[inline]
    pub fn new(color: Color, brightness: f32) -> Self {
        Self {
            color,
            brightness,
            state: None,
        }
    }
}

/// Pattern evaluation and configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PatternError {
    /// A pattern read a palette entry that does not exist.
    PaletteIndex { index: usize, len: usize },

    /// Palette capacity exceeded.
    PaletteFull,

    /// Pattern state capacity exceeded.
    StateFull,
}

impl core::fmt::Display for PatternError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PatternError::PaletteIndex { index, len } => {
                write!(
                    f,
                    "palette index {} out of range for palette of {} colors",
                    index, len
                )
            }
            PatternError::PaletteFull => {
                write!(f, "palette capacity of {} colors exceeded", MAX_PALETTE_COLORS)
            }
            PatternError::StateFull => {
                write!(f, "pattern state capacity of {} values exceeded", MAX_STATE_LEN)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PatternError {}
