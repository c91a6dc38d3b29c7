// Prompt backend switching

use shellwright_config::BackendKind;
use shellwright_prompt::Session;

use super::Command;
use crate::output::{print_warning, OutputStyle};

/// Switch between the delegate renderer and the composer
pub struct BackendCommand {
    kind: BackendKind,
}

impl BackendCommand {
    pub fn new(kind: BackendKind) -> Self {
        Self { kind }
    }
}

#[async_trait::async_trait]
impl Command for BackendCommand {
    async fn execute(&self, session: &mut Session) -> anyhow::Result<()> {
        let style = OutputStyle::default();
        session.start();

        match session.prompt().switch_backend(self.kind) {
            Ok(active) if active == self.kind => {
                println!("{}", style.success(&format!("Prompt backend set to {}", active)));
            }
            Ok(active) => {
                print_warning(&format!(
                    "{} is saved as the preferred backend but is unavailable; using {} for now",
                    self.kind, active
                ));
                if let Some(reason) = session.prompt().session_snapshot().fallback_reason {
                    println!("{}", style.info(&reason));
                }
            }
            Err(e) if e.is_applied_in_memory() => print_warning(&e.to_string()),
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}
