// Interactive menu command

use std::sync::Arc;

use shellwright_config::ConfigWatcher;
use shellwright_prompt::Session;
use tracing::warn;

use super::Command;
use crate::menu::ConfigMenu;

/// Opens the configuration menu.
///
/// Edits made to the file by another process while the menu is open are
/// picked up through a file watcher.
pub struct MenuCommand;

#[async_trait::async_trait]
impl Command for MenuCommand {
    async fn execute(&self, session: &mut Session) -> anyhow::Result<()> {
        session.start();

        let _watcher = match ConfigWatcher::new(Arc::clone(session.store())) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                warn!(error = %e, "external config edits will not be noticed");
                None
            }
        };

        tokio::task::block_in_place(|| ConfigMenu::new(session).run())
    }
}
