// Terminal output for commands and the menu

use std::io::IsTerminal;

use colored::{ColoredString, Colorize};

/// Kind of status line a command prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Warning,
    Info,
}

impl Tone {
    fn marker(self) -> &'static str {
        match self {
            Tone::Success => "✓",
            Tone::Error => "✗",
            Tone::Warning => "⚠",
            Tone::Info => "ℹ",
        }
    }

    fn paint(self, text: &str) -> ColoredString {
        match self {
            Tone::Success => text.green().bold(),
            Tone::Error => text.red().bold(),
            Tone::Warning => text.yellow(),
            Tone::Info => text.blue(),
        }
    }
}

/// Whether command output is styled. Colors are on only when stdout is a
/// terminal; `colored` additionally honors `NO_COLOR`.
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: std::io::stdout().is_terminal(),
        }
    }
}

impl OutputStyle {
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    /// Prefix `msg` with the marker for `tone`
    pub fn line(&self, tone: Tone, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", tone.paint(tone.marker()), msg)
        } else {
            format!("{} {}", tone.marker(), msg)
        }
    }

    pub fn success(&self, msg: &str) -> String {
        self.line(Tone::Success, msg)
    }

    pub fn error(&self, msg: &str) -> String {
        self.line(Tone::Error, msg)
    }

    pub fn warning(&self, msg: &str) -> String {
        self.line(Tone::Warning, msg)
    }

    pub fn info(&self, msg: &str) -> String {
        self.line(Tone::Info, msg)
    }

    pub fn header(&self, title: &str) -> String {
        if self.use_colors {
            title.bold().underline().to_string()
        } else {
            title.to_string()
        }
    }

    /// A key or value the user can type back
    pub fn code(&self, code: &str) -> String {
        if self.use_colors {
            code.cyan().to_string()
        } else {
            code.to_string()
        }
    }

    /// Fixed-width on/off marker for feature and segment listings
    pub fn toggle(&self, on: bool) -> String {
        let text = if on { "on " } else { "off" };
        match (self.use_colors, on) {
            (false, _) => text.to_string(),
            (true, true) => text.green().to_string(),
            (true, false) => text.dimmed().to_string(),
        }
    }
}

pub fn print_error(msg: &str) {
    eprintln!("{}", OutputStyle::default().error(msg));
}

pub fn print_warning(msg: &str) {
    eprintln!("{}", OutputStyle::default().warning(msg));
}
