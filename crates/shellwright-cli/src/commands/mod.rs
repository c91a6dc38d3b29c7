// Command handlers for the shellwright CLI

pub mod backend;
pub mod config;
pub mod features;
pub mod init;
pub mod menu;
pub mod prompt;

pub use backend::BackendCommand;
pub use config::{ConfigAction, ConfigCommand};
pub use features::FeaturesCommand;
pub use init::InitCommand;
pub use menu::MenuCommand;
pub use prompt::PromptCommand;

use shellwright_prompt::Session;

/// Trait for command handlers
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Execute the command against the process session
    async fn execute(&self, session: &mut Session) -> anyhow::Result<()>;
}
