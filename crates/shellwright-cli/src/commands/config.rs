// Configuration management

use anyhow::{anyhow, Context};
use serde_json::Value;
use shellwright_config::ConfigError;
use shellwright_prompt::Session;

use super::Command;
use crate::output::{print_warning, OutputStyle};

/// Manage the configuration document
pub struct ConfigCommand {
    pub action: ConfigAction,
}

#[derive(Debug, Clone)]
pub enum ConfigAction {
    Get(Option<String>),
    Set(String, String),
    Reset,
    Path,
}

impl ConfigCommand {
    pub fn new(action: ConfigAction) -> Self {
        Self { action }
    }

    fn get(&self, session: &Session, path: Option<&str>) -> anyhow::Result<()> {
        let value = match path {
            None => session.store().document(),
            Some(path) => session
                .store()
                .get_path(path)
                .ok_or_else(|| anyhow!("no value at '{}'", path))?,
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        Ok(())
    }

    fn set(&self, session: &mut Session, path: &str, raw: &str) -> anyhow::Result<()> {
        let style = OutputStyle::default();
        let value = parse_value(raw);

        match session.store().set(path, value) {
            Ok(_) => {
                session.refresh();
                println!("{}", style.success(&format!("Set {}", style.code(path))));
                Ok(())
            }
            Err(e) if e.is_applied_in_memory() => {
                print_warning(&e.to_string());
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("cannot set '{}'", path)),
        }
    }

    fn reset(&self, session: &mut Session) -> anyhow::Result<()> {
        let style = OutputStyle::default();
        match session.store().reset() {
            Ok(_) => {
                session.refresh();
                println!("{}", style.success("Configuration reset to defaults"));
                Ok(())
            }
            Err(e @ ConfigError::Persistence { .. }) => {
                print_warning(&e.to_string());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait::async_trait]
impl Command for ConfigCommand {
    async fn execute(&self, session: &mut Session) -> anyhow::Result<()> {
        match &self.action {
            ConfigAction::Get(path) => self.get(session, path.as_deref()),
            ConfigAction::Set(path, raw) => self.set(session, path, raw),
            ConfigAction::Reset => self.reset(session),
            ConfigAction::Path => {
                println!("{}", session.store().path().display());
                Ok(())
            }
        }
    }
}

/// JSON if `raw` parses as JSON, otherwise the raw text as a string
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shellwright_common::RecordingDiagnostics;
    use shellwright_config::{ConfigStore, Mode};
    use std::sync::Arc;

    fn session(dir: &tempfile::TempDir) -> Session {
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        let store = Arc::new(
            ConfigStore::new(dir.path().join("config.json")).with_diagnostics(diagnostics.clone()),
        );
        Session::new(store, diagnostics)
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("false"), json!(false));
        assert_eq!(parse_value("{\"a\":1}"), json!({ "a": 1 }));
        assert_eq!(parse_value("full"), json!("full"));
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(&dir);

        ConfigCommand::new(ConfigAction::Set("mode".into(), "full".into()))
            .execute(&mut session)
            .await
            .unwrap();
        assert_eq!(session.store().get().mode, Mode::Full);
        assert!(session.enabled_features().contains("wsl"));
    }

    #[tokio::test]
    async fn test_invalid_set_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(&dir);

        let result = ConfigCommand::new(ConfigAction::Set(
            "prompt.composed.colors".into(),
            "{\"path\":\"not-a-color\"}".into(),
        ))
        .execute(&mut session)
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(&dir);

        let result = ConfigCommand::new(ConfigAction::Get(Some("nope.nothing".into())))
            .execute(&mut session)
            .await;
        assert!(result.is_err());
    }
}
