//! Feature registry

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use shellwright_config::{Configuration, Mode};
use tracing::debug;

/// A known feature module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Git,
    Ssh,
    VirtualEnv,
    Wsl,
}

impl Feature {
    pub const ALL: [Feature; 4] = [Feature::Git, Feature::Ssh, Feature::VirtualEnv, Feature::Wsl];

    /// Key used under `features` in the configuration
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Git => "git",
            Feature::Ssh => "ssh",
            Feature::VirtualEnv => "virtualenv",
            Feature::Wsl => "wsl",
        }
    }

    /// Command line tool the feature wraps
    pub fn command(&self) -> &'static str {
        match self {
            Feature::Git => "git",
            Feature::Ssh => "ssh",
            Feature::VirtualEnv => "python3",
            Feature::Wsl => "wsl.exe",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Feature::Git => "git aliases and repository helpers",
            Feature::Ssh => "ssh-agent management and host shortcuts",
            Feature::VirtualEnv => "automatic Python virtual environment activation",
            Feature::Wsl => "Windows interop helpers for WSL",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Feature::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Whether `mode` turns this feature on when there is no explicit flag
    pub fn default_for(&self, mode: Mode) -> bool {
        match mode {
            Mode::Minimal => matches!(self, Feature::Git),
            Mode::Standard => matches!(self, Feature::Git | Feature::Ssh | Feature::VirtualEnv),
            Mode::Full => true,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display row for one feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureStatus {
    pub feature: Feature,
    pub enabled: bool,
    /// Set by an explicit `features.<name>` entry rather than the mode
    pub explicit: bool,
    pub command: &'static str,
    /// Whether the backing command is on `PATH`
    pub available: bool,
}

/// Resolves enabled features from the mode and explicit flags.
#[derive(Debug, Clone, Default)]
pub struct FeatureRegistry {
    mode: Mode,
    overrides: BTreeMap<String, bool>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Configuration) -> Self {
        let mut registry = Self::new();
        registry.update(config);
        registry
    }

    /// Pick up the mode and flags of a newer configuration
    pub fn update(&mut self, config: &Configuration) {
        self.mode = config.mode;
        self.overrides = config.features.clone();
        debug!(mode = config.mode.as_str(), "feature registry updated");
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.overrides
            .get(feature.name())
            .copied()
            .unwrap_or_else(|| feature.default_for(self.mode))
    }

    /// Names of the enabled features, sorted
    pub fn enabled_features(&self) -> BTreeSet<String> {
        Feature::ALL
            .iter()
            .filter(|f| self.is_enabled(**f))
            .map(|f| f.name().to_string())
            .collect()
    }

    /// Flags in the configuration that name no known feature
    pub fn unknown_keys(&self) -> Vec<String> {
        self.overrides
            .keys()
            .filter(|k| Feature::from_name(k).is_none())
            .cloned()
            .collect()
    }

    /// One row per known feature, probing `PATH` for its command
    pub fn describe(&self) -> Vec<FeatureStatus> {
        Feature::ALL
            .iter()
            .map(|feature| FeatureStatus {
                feature: *feature,
                enabled: self.is_enabled(*feature),
                explicit: self.overrides.contains_key(feature.name()),
                command: feature.command(),
                available: which::which(feature.command()).is_ok(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: serde_json::Value) -> Configuration {
        serde_json::from_value(value).unwrap()
    }

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mode_defaults() {
        let minimal = FeatureRegistry::from_config(&config(json!({ "mode": "minimal" })));
        assert_eq!(minimal.enabled_features(), names(&["git"]));

        let standard = FeatureRegistry::from_config(&Configuration::default());
        assert_eq!(standard.enabled_features(), names(&["git", "ssh", "virtualenv"]));

        let full = FeatureRegistry::from_config(&config(json!({ "mode": "full" })));
        assert_eq!(full.enabled_features(), names(&["git", "ssh", "virtualenv", "wsl"]));
    }

    #[test]
    fn test_explicit_flags_override_mode() {
        let registry = FeatureRegistry::from_config(&config(json!({
            "mode": "minimal",
            "features": { "git": false, "wsl": true }
        })));
        assert_eq!(registry.enabled_features(), names(&["wsl"]));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let registry = FeatureRegistry::from_config(&config(json!({
            "features": { "teleport": true }
        })));
        assert_eq!(registry.enabled_features(), names(&["git", "ssh", "virtualenv"]));
        assert_eq!(registry.unknown_keys(), vec!["teleport".to_string()]);
    }

    #[test]
    fn test_describe_lists_every_feature() {
        let registry = FeatureRegistry::from_config(&config(json!({
            "features": { "ssh": false }
        })));
        let rows = registry.describe();
        assert_eq!(rows.len(), Feature::ALL.len());

        let ssh = rows.iter().find(|r| r.feature == Feature::Ssh).unwrap();
        assert!(!ssh.enabled);
        assert!(ssh.explicit);

        let git = rows.iter().find(|r| r.feature == Feature::Git).unwrap();
        assert!(git.enabled);
        assert!(!git.explicit);
    }

    #[test]
    fn test_update_follows_new_configuration() {
        let mut registry = FeatureRegistry::new();
        registry.update(&config(json!({ "mode": "full" })));
        assert_eq!(registry.mode(), Mode::Full);
        assert!(registry.is_enabled(Feature::Wsl));
    }
}
