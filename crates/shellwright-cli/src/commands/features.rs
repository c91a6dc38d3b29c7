// Feature listing

use shellwright_prompt::Session;

use super::Command;
use crate::output::{print_warning, OutputStyle};

/// Lists optional features, their state and whether their command exists
pub struct FeaturesCommand;

#[async_trait::async_trait]
impl Command for FeaturesCommand {
    async fn execute(&self, session: &mut Session) -> anyhow::Result<()> {
        let style = OutputStyle::default();
        let registry = session.features();

        println!(
            "{}",
            style.header(&format!("Features (mode: {})", registry.mode().as_str()))
        );
        for status in registry.describe() {
            let source = if status.explicit { "set" } else { "mode" };
            let availability = if status.available {
                String::new()
            } else {
                format!("  ({} not found)", status.command)
            };
            println!(
                "  {} {:<12} [{}] {}{}",
                style.toggle(status.enabled),
                style.code(status.feature.name()),
                source,
                status.feature.description(),
                availability
            );
        }

        for key in registry.unknown_keys() {
            print_warning(&format!("unknown feature '{}' in configuration", key));
        }
        Ok(())
    }
}
