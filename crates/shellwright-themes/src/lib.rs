//! Shellwright color palettes
//!
//! Segment colors in the configuration are stored as tokens (`"blue"`,
//! `"bright-red"`, `"#ff8800"`, `"208"`). A [`Palette`] decides which tokens
//! are valid and how they are written to the terminal. Palettes are
//! pluggable so the accepted set is not tied to one terminal.

pub mod error;
pub mod palette;

pub use error::{Result, ThemeError};
pub use palette::{AnsiPalette, Color, NamedColor, Palette, RESET};
