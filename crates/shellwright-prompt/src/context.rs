//! Render context handed to every backend

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use shellwright_config::paths::abbreviate_home;

/// Shell the prompt is rendered for.
///
/// Determines how zero-width escape sequences are marked so the shell
/// measures the prompt correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
    #[default]
    Plain,
}

impl ShellKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShellKind::Bash => "bash",
            ShellKind::Zsh => "zsh",
            ShellKind::Fish => "fish",
            ShellKind::Plain => "plain",
        }
    }

    /// Mark an escape sequence as zero-width for this shell
    pub fn zero_width(&self, escape: &str) -> String {
        if escape.is_empty() {
            return String::new();
        }
        match self {
            ShellKind::Bash => format!("\\[{}\\]", escape),
            ShellKind::Zsh => format!("%{{{}%}}", escape),
            ShellKind::Fish | ShellKind::Plain => escape.to_string(),
        }
    }

    /// Make `text` print literally once the shell expands the prompt.
    ///
    /// Bash decodes backslash escapes and then runs parameter expansion and
    /// command substitution over `PS1`; zsh treats `%` as a prompt escape.
    /// Fish prints the hook's output as-is.
    pub fn escape_text(&self, text: &str) -> String {
        match self {
            ShellKind::Bash => {
                let mut escaped = String::with_capacity(text.len());
                for c in text.chars() {
                    if matches!(c, '\\' | '$' | '`') {
                        escaped.push('\\');
                    }
                    escaped.push(c);
                }
                escaped
            }
            ShellKind::Zsh => text.replace('%', "%%"),
            ShellKind::Fish | ShellKind::Plain => text.to_string(),
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShellKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bash" => Ok(ShellKind::Bash),
            "zsh" => Ok(ShellKind::Zsh),
            "fish" => Ok(ShellKind::Fish),
            "plain" | "" => Ok(ShellKind::Plain),
            other => Err(format!("unsupported shell '{}'", other)),
        }
    }
}

/// Read-only session state for one render
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub cwd: PathBuf,
    /// Exit code of the previous command
    pub exit_code: i32,
    pub shell: ShellKind,
    pub home: Option<PathBuf>,
    /// Active Python virtual environment or conda env name
    pub virtual_env: Option<String>,
    pub now: DateTime<Local>,
}

impl PromptContext {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            exit_code: 0,
            shell: ShellKind::Plain,
            home: None,
            virtual_env: None,
            now: Local::now(),
        }
    }

    /// Context for the current process: working directory, home and the
    /// `VIRTUAL_ENV` / `CONDA_DEFAULT_ENV` variables.
    pub fn from_env() -> Self {
        let cwd = std::env::current_dir()
            .ok()
            .or_else(|| std::env::var_os("PWD").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let virtual_env = std::env::var("VIRTUAL_ENV")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| std::env::var("CONDA_DEFAULT_ENV").ok().filter(|v| !v.is_empty()));

        Self {
            home: dirs::home_dir(),
            virtual_env,
            ..Self::new(cwd)
        }
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    pub fn with_shell(mut self, shell: ShellKind) -> Self {
        self.shell = shell;
        self
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn with_virtual_env(mut self, env: impl Into<String>) -> Self {
        self.virtual_env = Some(env.into());
        self
    }

    pub fn with_now(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }

    /// Working directory with the home prefix shortened to `~`
    pub fn display_path(&self) -> String {
        abbreviate_home(&self.cwd, self.home.as_deref())
    }

    /// Line shown when no backend could render: the bare path, escaped
    /// for the target shell.
    pub fn fallback_line(&self) -> String {
        let path = self.display_path();
        if path.trim().is_empty() {
            ">".to_string()
        } else {
            self.shell.escape_text(&path)
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }
}
