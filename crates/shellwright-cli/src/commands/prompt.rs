// Render one prompt line

use shellwright_prompt::{PromptContext, Session, ShellKind};

use super::Command;

/// Prints the prompt for the current directory.
///
/// Never fails: a broken backend or config still yields a line.
pub struct PromptCommand {
    exit_code: i32,
    shell: ShellKind,
}

impl PromptCommand {
    pub fn new(exit_code: i32, shell: ShellKind) -> Self {
        Self { exit_code, shell }
    }

    pub fn context(&self) -> PromptContext {
        PromptContext::from_env()
            .with_exit_code(self.exit_code)
            .with_shell(self.shell)
    }
}

#[async_trait::async_trait]
impl Command for PromptCommand {
    async fn execute(&self, session: &mut Session) -> anyhow::Result<()> {
        session.start();
        let line = session.prompt().render(&self.context()).await;
        println!("{}", line);
        Ok(())
    }
}
