// Interactive configuration menu

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::{json, Value};
use shellwright_config::{BackendKind, ComposedConfig, ConfigError, Mode, SegmentKind};
use shellwright_features::Feature;
use shellwright_prompt::Session;
use tracing::debug;

use crate::output::OutputStyle;

/// One edit the menu can make
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    ToggleFeature(Feature),
    SetMode(Mode),
    SwitchBackend(BackendKind),
    ToggleSegment(SegmentKind),
    SetSegmentColor(SegmentKind, String),
    Reset,
    Reload,
    Quit,
}

/// A selectable line. Color entries need a token before they become an
/// action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Action(MenuEntryAction),
    Color(SegmentKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntryAction {
    ToggleFeature(Feature),
    SetMode(Mode),
    SwitchBackend(BackendKind),
    ToggleSegment(SegmentKind),
    Reset,
    Reload,
    Quit,
}

impl From<MenuEntryAction> for MenuAction {
    fn from(entry: MenuEntryAction) -> Self {
        match entry {
            MenuEntryAction::ToggleFeature(f) => MenuAction::ToggleFeature(f),
            MenuEntryAction::SetMode(m) => MenuAction::SetMode(m),
            MenuEntryAction::SwitchBackend(b) => MenuAction::SwitchBackend(b),
            MenuEntryAction::ToggleSegment(s) => MenuAction::ToggleSegment(s),
            MenuEntryAction::Reset => MenuAction::Reset,
            MenuEntryAction::Reload => MenuAction::Reload,
            MenuEntryAction::Quit => MenuAction::Quit,
        }
    }
}

/// Result of applying one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    Applied(String),
    Warning(String),
    Quit,
}

/// List-and-select editor over the session's configuration.
///
/// Only goes through the store and the prompt manager; nothing here
/// touches configuration fields directly.
pub struct ConfigMenu<'a> {
    session: &'a mut Session,
    style: OutputStyle,
}

impl<'a> ConfigMenu<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self {
            session,
            style: OutputStyle::default(),
        }
    }

    /// Entries in display order
    pub fn entries() -> Vec<MenuEntry> {
        let mut entries = Vec::new();
        entries.extend(
            Feature::ALL
                .iter()
                .map(|f| MenuEntry::Action(MenuEntryAction::ToggleFeature(*f))),
        );
        entries.extend(
            Mode::ALL
                .iter()
                .map(|m| MenuEntry::Action(MenuEntryAction::SetMode(*m))),
        );
        entries.extend(
            [BackendKind::Delegate, BackendKind::Composed]
                .iter()
                .map(|b| MenuEntry::Action(MenuEntryAction::SwitchBackend(*b))),
        );
        entries.extend(
            SegmentKind::ALL
                .iter()
                .map(|s| MenuEntry::Action(MenuEntryAction::ToggleSegment(*s))),
        );
        entries.extend(SegmentKind::ALL.iter().map(|s| MenuEntry::Color(*s)));
        entries.extend([
            MenuEntry::Action(MenuEntryAction::Reset),
            MenuEntry::Action(MenuEntryAction::Reload),
            MenuEntry::Action(MenuEntryAction::Quit),
        ]);
        entries
    }

    /// Label for `entry` showing the current state
    pub fn label(&self, entry: MenuEntry) -> String {
        let config = self.session.store().get();
        let composed = &config.prompt.composed;
        match entry {
            MenuEntry::Action(MenuEntryAction::ToggleFeature(f)) => format!(
                "Toggle feature {:<10} [{}]",
                f.name(),
                on_off(self.session.features().is_enabled(f))
            ),
            MenuEntry::Action(MenuEntryAction::SetMode(m)) => {
                format!("Set mode {}{}", m.as_str(), current_marker(config.mode == m))
            }
            MenuEntry::Action(MenuEntryAction::SwitchBackend(b)) => format!(
                "Use {} backend{}",
                b,
                current_marker(self.session.prompt().active_backend() == Some(b))
            ),
            MenuEntry::Action(MenuEntryAction::ToggleSegment(s)) => format!(
                "Toggle {:<10} segment [{}]",
                s.as_str(),
                on_off(composed.is_shown(s))
            ),
            MenuEntry::Color(s) => format!(
                "Set {} color [{}]",
                s.as_str(),
                composed.colors.get(s.as_str()).map(String::as_str).unwrap_or("default")
            ),
            MenuEntry::Action(MenuEntryAction::Reset) => "Reset to defaults".to_string(),
            MenuEntry::Action(MenuEntryAction::Reload) => "Reload configuration".to_string(),
            MenuEntry::Action(MenuEntryAction::Quit) => "Quit".to_string(),
        }
    }

    /// Apply one action. Failures come back as warnings.
    pub fn apply(&mut self, action: MenuAction) -> MenuOutcome {
        debug!(?action, "menu action");
        match action {
            MenuAction::ToggleFeature(feature) => {
                let enabled = !self.session.features().is_enabled(feature);
                self.commit(
                    "features",
                    json!({ feature.name(): enabled }),
                    format!("{} {}", feature.name(), on_off(enabled)),
                )
            }
            MenuAction::SetMode(mode) => self.commit(
                "mode",
                json!(mode.as_str()),
                format!("mode set to {}", mode.as_str()),
            ),
            MenuAction::SwitchBackend(kind) => {
                match self.session.prompt().switch_backend(kind) {
                    Ok(active) if active == kind => {
                        MenuOutcome::Applied(format!("using the {} backend", active))
                    }
                    Ok(active) => MenuOutcome::Warning(format!(
                        "{} saved as preferred but unavailable, using {}",
                        kind, active
                    )),
                    Err(e) => MenuOutcome::Warning(e.to_string()),
                }
            }
            MenuAction::ToggleSegment(segment) => {
                let shown = !self.session.store().get().prompt.composed.is_shown(segment);
                self.commit(
                    "prompt.composed",
                    json!({ ComposedConfig::show_flag_key(segment): shown }),
                    format!("{} segment {}", segment.as_str(), on_off(shown)),
                )
            }
            MenuAction::SetSegmentColor(segment, token) => {
                let token = token.trim().to_string();
                self.commit(
                    "prompt.composed.colors",
                    json!({ segment.as_str(): token }),
                    format!("{} color set to {}", segment.as_str(), token),
                )
            }
            MenuAction::Reset => {
                let result = self.session.store().reset();
                self.finish(result.map(|_| ()), "configuration reset to defaults".to_string())
            }
            MenuAction::Reload => {
                let kind = self.session.refresh();
                MenuOutcome::Applied(format!("reloaded, using the {} backend", kind))
            }
            MenuAction::Quit => MenuOutcome::Quit,
        }
    }

    /// Run the interactive loop until the user quits
    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut editor = DefaultEditor::new()?;
        let entries = Self::entries();

        loop {
            println!();
            println!("{}", self.style.header("Shellwright configuration"));
            for (index, entry) in entries.iter().enumerate() {
                println!("  {:>2}) {}", index + 1, self.label(*entry));
            }

            let line = match editor.readline("select> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };
            let _ = editor.add_history_entry(line.as_str());

            let Some(entry) = parse_selection(&line, &entries) else {
                if !line.trim().is_empty() {
                    println!("{}", self.style.warning(&format!("no entry '{}'", line.trim())));
                }
                continue;
            };

            let action = match entry {
                MenuEntry::Action(action) => action.into(),
                MenuEntry::Color(segment) => {
                    let palette = self.session.store().palette();
                    println!(
                        "{}",
                        self.style.info(&format!(
                            "{} colors: {}",
                            palette.name(),
                            palette.suggestions().join(", ")
                        ))
                    );
                    match editor.readline("color> ") {
                        Ok(token) if !token.trim().is_empty() => {
                            MenuAction::SetSegmentColor(segment, token)
                        }
                        Ok(_) => continue,
                        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => continue,
                        Err(e) => return Err(e.into()),
                    }
                }
            };

            match self.apply(action) {
                MenuOutcome::Applied(message) => println!("{}", self.style.success(&message)),
                MenuOutcome::Warning(message) => println!("{}", self.style.warning(&message)),
                MenuOutcome::Quit => break,
            }
        }
        Ok(())
    }

    fn commit(&mut self, path: &str, partial: Value, message: String) -> MenuOutcome {
        let result = self.session.store().set(path, partial).map(|_| ());
        self.finish(result, message)
    }

    fn finish(&mut self, result: Result<(), ConfigError>, message: String) -> MenuOutcome {
        match result {
            Ok(()) => {
                self.session.refresh();
                MenuOutcome::Applied(message)
            }
            Err(e) if e.is_applied_in_memory() => {
                self.session.refresh();
                MenuOutcome::Warning(e.to_string())
            }
            Err(e) => MenuOutcome::Warning(e.to_string()),
        }
    }
}

/// Entry for a 1-based index typed by the user
pub fn parse_selection(input: &str, entries: &[MenuEntry]) -> Option<MenuEntry> {
    let index: usize = input.trim().parse().ok()?;
    index.checked_sub(1).and_then(|i| entries.get(i)).copied()
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn current_marker(current: bool) -> &'static str {
    if current {
        " (current)"
    } else {
        ""
    }
}
