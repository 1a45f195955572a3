#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`PrimaryPattern`**: Computes a pixel's color from time, position, its previous state and the palette
//! - **`SecondaryPattern`**: Computes a brightness multiplier for an already computed color
//! - **`Color` / `ColorSpace`**: Three raw channels and the space (HSV or RGB) they are expressed in
//! - **`PatternState`**: Per-pixel values a pattern carries from frame to frame
//! - **`Palette`**: User-selected HSV colors patterns can index or sample
//! - **`PrimaryRegistry` / `SecondaryRegistry`**: Id-keyed tables of named patterns
//! - **`Program`**: A compiled, sandboxed user expression
//! - **`shade_pixel`**: Runs both patterns for one pixel and produces final RGB
//!
//! Hue is measured in turns (1.0 = full circle) throughout. Patterns never
//! convert between color spaces themselves; [`colors::to_srgb`] does that at
//! the very end, using the `ColorSpace` each primary reports.

// Re-export Srgb from palette for user convenience
pub use palette::Srgb;

pub mod colors;
pub mod expr;
pub mod naming;
pub mod pixel;
pub mod primary;
pub mod registry;
pub mod secondary;
pub mod types;
pub mod waves;

pub use colors::Palette;
pub use expr::{ExprError, ExprModulation, ExprPattern, Program};
pub use naming::{DisplayName, title_case};
pub use pixel::{GroupSettings, PixelState, shade_pixel};
pub use primary::{Blank, BuiltinPrimary, PrimaryPattern, RIPPLE_MIN_DIVISOR};
pub use registry::{
    NO_MODULATION_ID, PatternDescriptor, PrimaryRegistry, PrimaryRegistry16, Registry,
    RegistryError, SecondaryRegistry, SecondaryRegistry16,
};
pub use secondary::{BuiltinSecondary, NoModulation, SecondaryPattern};
pub use types::{Color, ColorSpace, Modulation, PatternError, PatternOutput, PatternState, Sample};

/// HSV black.
pub const COLOR_OFF: Color = Color::new(0.0, 0.0, 0.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_compile() {
        let _ = ColorSpace::Hsv;
        let _ = ColorSpace::Rgb;
        let _ = BuiltinPrimary::SolidColor;
        let _ = BuiltinSecondary::TwinklePulse1d;
        let _ = GroupSettings::default();
    }
}
