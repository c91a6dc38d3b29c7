// Shell hook generation

use std::path::{Path, PathBuf};

use anyhow::bail;
use shellwright_prompt::{Session, ShellKind};

use super::Command;

const BASH_HOOK: &str = r#"_shellwright_prompt() {
    local exit_code=$?
    PS1="$(__SHELLWRIGHT__ prompt --shell bash --exit-code "$exit_code") "
    return $exit_code
}
if [[ ";${PROMPT_COMMAND:-};" != *";_shellwright_prompt;"* ]]; then
    PROMPT_COMMAND="_shellwright_prompt${PROMPT_COMMAND:+;$PROMPT_COMMAND}"
fi
"#;

// PROMPT only references the variable. With prompt_subst, zsh expands it
// once and never rescans the rendered text for `$(...)`; `%` is escaped by
// the renderer.
const ZSH_HOOK: &str = r#"_shellwright_precmd() {
    local exit_code=$?
    _shellwright_line="$(__SHELLWRIGHT__ prompt --shell zsh --exit-code "$exit_code")"
}
autoload -Uz add-zsh-hook
add-zsh-hook precmd _shellwright_precmd
setopt prompt_subst
PROMPT='${_shellwright_line} '
"#;

const FISH_HOOK: &str = r#"function fish_prompt
    set -l exit_code $status
    __SHELLWRIGHT__ prompt --shell fish --exit-code $exit_code
    echo -n ' '
end
"#;

/// Prints the hook that renders the prompt before each command
pub struct InitCommand {
    shell: ShellKind,
    config: Option<PathBuf>,
}

impl InitCommand {
    pub fn new(shell: ShellKind, config: Option<PathBuf>) -> Self {
        Self { shell, config }
    }

    /// Hook script calling `executable`
    pub fn script(&self, executable: &Path) -> anyhow::Result<String> {
        let template = match self.shell {
            ShellKind::Bash => BASH_HOOK,
            ShellKind::Zsh => ZSH_HOOK,
            ShellKind::Fish => FISH_HOOK,
            ShellKind::Plain => bail!("no hook for the plain shell; use bash, zsh or fish"),
        };

        let mut invocation = quote(&executable.display().to_string());
        if let Some(config) = &self.config {
            invocation.push_str(" --config ");
            invocation.push_str(&quote(&config.display().to_string()));
        }
        Ok(template.replace("__SHELLWRIGHT__", &invocation))
    }
}

#[async_trait::async_trait]
impl Command for InitCommand {
    async fn execute(&self, _session: &mut Session) -> anyhow::Result<()> {
        let executable =
            std::env::current_exe().unwrap_or_else(|_| PathBuf::from("shellwright"));
        print!("{}", self.script(&executable)?);
        Ok(())
    }
}

/// Single-quote `value` for POSIX shells and fish
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
