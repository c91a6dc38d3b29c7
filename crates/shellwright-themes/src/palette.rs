//! Palettes and color tokens

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThemeError};

/// SGR reset sequence
pub const RESET: &str = "\x1b[0m";

/// The sixteen standard terminal colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl NamedColor {
    pub const ALL: [NamedColor; 16] = [
        NamedColor::Black,
        NamedColor::Red,
        NamedColor::Green,
        NamedColor::Yellow,
        NamedColor::Blue,
        NamedColor::Magenta,
        NamedColor::Cyan,
        NamedColor::White,
        NamedColor::BrightBlack,
        NamedColor::BrightRed,
        NamedColor::BrightGreen,
        NamedColor::BrightYellow,
        NamedColor::BrightBlue,
        NamedColor::BrightMagenta,
        NamedColor::BrightCyan,
        NamedColor::BrightWhite,
    ];

    /// Canonical token for this color
    pub fn token(&self) -> &'static str {
        match self {
            NamedColor::Black => "black",
            NamedColor::Red => "red",
            NamedColor::Green => "green",
            NamedColor::Yellow => "yellow",
            NamedColor::Blue => "blue",
            NamedColor::Magenta => "magenta",
            NamedColor::Cyan => "cyan",
            NamedColor::White => "white",
            NamedColor::BrightBlack => "bright-black",
            NamedColor::BrightRed => "bright-red",
            NamedColor::BrightGreen => "bright-green",
            NamedColor::BrightYellow => "bright-yellow",
            NamedColor::BrightBlue => "bright-blue",
            NamedColor::BrightMagenta => "bright-magenta",
            NamedColor::BrightCyan => "bright-cyan",
            NamedColor::BrightWhite => "bright-white",
        }
    }

    /// SGR foreground code (30-37, 90-97)
    pub fn sgr_code(&self) -> u8 {
        let index = NamedColor::ALL
            .iter()
            .position(|c| c == self)
            .unwrap_or(0) as u8;
        if index < 8 {
            30 + index
        } else {
            90 + (index - 8)
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        let found = NamedColor::ALL.iter().copied().find(|c| c.token() == token);
        if found.is_some() {
            return found;
        }
        match token {
            "gray" | "grey" => Some(NamedColor::White),
            "dark-gray" | "dark-grey" => Some(NamedColor::BrightBlack),
            _ => None,
        }
    }
}

/// A resolved color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Terminal default, no escape emitted
    Default,
    Named(NamedColor),
    /// 256-color palette index
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    /// Foreground escape sequence, empty for [`Color::Default`]
    pub fn foreground(&self) -> String {
        match self {
            Color::Default => String::new(),
            Color::Named(named) => format!("\x1b[{}m", named.sgr_code()),
            Color::Indexed(index) => format!("\x1b[38;5;{}m", index),
            Color::Rgb(r, g, b) => format!("\x1b[38;2;{};{};{}m", r, g, b),
        }
    }

    /// Wrap `text` in this color followed by a reset
    pub fn paint(&self, text: &str) -> String {
        match self {
            Color::Default => text.to_string(),
            _ => format!("{}{}{}", self.foreground(), text, RESET),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Default => write!(f, "default"),
            Color::Named(named) => write!(f, "{}", named.token()),
            Color::Indexed(index) => write!(f, "{}", index),
            Color::Rgb(r, g, b) => write!(f, "#{:02x}{:02x}{:02x}", r, g, b),
        }
    }
}

/// A set of accepted color tokens.
///
/// Implementations must be deterministic: a token that resolves once must
/// always resolve to the same color.
pub trait Palette: Send + Sync {
    /// Palette name, used in error messages
    fn name(&self) -> &str;

    /// Resolve a token to a color
    fn resolve(&self, token: &str) -> Result<Color>;

    /// Named tokens offered to the user in menus
    fn suggestions(&self) -> Vec<String>;

    /// Check a token without keeping the color
    fn validate(&self, token: &str) -> Result<()> {
        self.resolve(token).map(|_| ())
    }
}

/// ANSI terminal palette.
///
/// The basic variant accepts only the sixteen named colors plus `default`;
/// the extended variant also accepts 256-color indices and `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnsiPalette {
    extended: bool,
}

impl AnsiPalette {
    /// Sixteen named colors only
    pub fn basic() -> Self {
        Self { extended: false }
    }

    /// Named colors, 256-color indices and truecolor hex
    pub fn extended() -> Self {
        Self { extended: true }
    }

    fn normalize(token: &str) -> String {
        token.trim().to_ascii_lowercase().replace(['_', ' '], "-")
    }

    fn parse_hex(token: &str) -> Result<Color> {
        let hex = &token[1..];
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ThemeError::InvalidFormat(format!(
                "expected #rrggbb, got '{}'",
                token
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| ThemeError::InvalidFormat(e.to_string()))
        };
        Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Default for AnsiPalette {
    fn default() -> Self {
        Self::extended()
    }
}

impl Palette for AnsiPalette {
    fn name(&self) -> &str {
        if self.extended {
            "ansi-extended"
        } else {
            "ansi-basic"
        }
    }

    fn resolve(&self, token: &str) -> Result<Color> {
        let normalized = Self::normalize(token);

        if normalized == "default" || normalized == "none" {
            return Ok(Color::Default);
        }
        if let Some(named) = NamedColor::from_token(&normalized) {
            return Ok(Color::Named(named));
        }

        if self.extended {
            if normalized.starts_with('#') {
                return Self::parse_hex(&normalized);
            }
            if !normalized.is_empty() && normalized.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(index) = normalized.parse::<u8>() {
                    return Ok(Color::Indexed(index));
                }
            }
        }

        Err(ThemeError::UnknownColor {
            token: token.to_string(),
            palette: self.name().to_string(),
        })
    }

    fn suggestions(&self) -> Vec<String> {
        std::iter::once("default".to_string())
            .chain(NamedColor::ALL.iter().map(|c| c.token().to_string()))
            .collect()
    }
}
