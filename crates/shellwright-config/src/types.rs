//! Configuration data model
//!
//! All keys are camelCase on disk. Every struct is `#[serde(default)]` so a
//! partial document fills in missing fields from the defaults. Unknown
//! top-level keys are carried in [`Configuration::extra`]; unknown nested
//! keys survive because the store persists the raw JSON document rather
//! than re-serializing these types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shellwright_themes::Palette;

use crate::{
    error::{ConfigError, Result},
    paths,
};

/// Bounds applied to every timeout setting, in milliseconds
pub const TIMEOUT_RANGE_MS: (u64, u64) = (10, 10_000);

/// Feature preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Minimal,
    #[default]
    Standard,
    Full,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Minimal, Mode::Standard, Mode::Full];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Minimal => "minimal",
            Mode::Standard => "standard",
            Mode::Full => "full",
        }
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(Mode::Minimal),
            "standard" => Ok(Mode::Standard),
            "full" => Ok(Mode::Full),
            other => Err(ConfigError::Validation(format!("unknown mode '{}'", other))),
        }
    }
}

/// Prompt backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// External renderer process
    Delegate,
    /// Built-in segment composer
    Composed,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Delegate => "delegate",
            BackendKind::Composed => "composed",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delegate" => Ok(BackendKind::Delegate),
            "composed" => Ok(BackendKind::Composed),
            other => Err(ConfigError::Validation(format!(
                "unknown prompt backend '{}'",
                other
            ))),
        }
    }
}

/// A status line segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Path,
    Vcs,
    VirtualEnv,
    Timestamp,
    Status,
}

impl SegmentKind {
    pub const ALL: [SegmentKind; 5] = [
        SegmentKind::Path,
        SegmentKind::Vcs,
        SegmentKind::VirtualEnv,
        SegmentKind::Timestamp,
        SegmentKind::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Path => "path",
            SegmentKind::Vcs => "vcs",
            SegmentKind::VirtualEnv => "virtualenv",
            SegmentKind::Timestamp => "timestamp",
            SegmentKind::Status => "status",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        SegmentKind::ALL.iter().copied().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    pub mode: Mode,
    /// Feature name to enabled flag. Names outside the known set are kept
    /// but ignored.
    pub features: BTreeMap<String, bool>,
    pub prompt: PromptConfig,
    pub logging: LoggingConfig,
    /// Top-level keys this version does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            features: BTreeMap::new(),
            prompt: PromptConfig::default(),
            logging: LoggingConfig::default(),
            extra: Map::new(),
        }
    }
}

/// Prompt settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptConfig {
    /// Preferred backend. `None` until the user has chosen one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendKind>,
    pub delegate: DelegateConfig,
    pub composed: ComposedConfig,
}

/// External renderer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DelegateConfig {
    /// Executable name (looked up on PATH) or path
    pub executable: String,
    /// Renderer's own config file
    pub config_path: String,
    /// Renderer's cache directory
    pub cache_path: String,
    /// Environment variable naming the config file
    pub config_env: String,
    /// Environment variable naming the cache directory
    pub cache_env: String,
    pub timeout_ms: u64,
}

impl Default for DelegateConfig {
    fn default() -> Self {
        Self {
            executable: "oh-my-posh".to_string(),
            config_path: paths::default_delegate_config_path().display().to_string(),
            cache_path: paths::default_delegate_cache_path().display().to_string(),
            config_env: "SHELLWRIGHT_DELEGATE_CONFIG".to_string(),
            cache_env: "SHELLWRIGHT_DELEGATE_CACHE".to_string(),
            timeout_ms: 500,
        }
    }
}

/// Built-in composer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComposedConfig {
    pub show_path: bool,
    pub show_vcs_status: bool,
    pub show_timestamp: bool,
    pub show_virtual_env: bool,
    pub show_exit_status: bool,
    /// Render order
    pub segments: Vec<SegmentKind>,
    /// Segment name to color token
    pub colors: BTreeMap<String, String>,
    /// chrono format string for the timestamp segment
    pub timestamp_format: String,
    pub vcs_timeout_ms: u64,
}

impl Default for ComposedConfig {
    fn default() -> Self {
        let colors = [
            (SegmentKind::Path, "blue"),
            (SegmentKind::Vcs, "yellow"),
            (SegmentKind::VirtualEnv, "green"),
            (SegmentKind::Timestamp, "bright-black"),
            (SegmentKind::Status, "red"),
        ]
        .into_iter()
        .map(|(segment, color)| (segment.as_str().to_string(), color.to_string()))
        .collect();

        Self {
            show_path: true,
            show_vcs_status: true,
            show_timestamp: false,
            show_virtual_env: true,
            show_exit_status: true,
            segments: vec![
                SegmentKind::Timestamp,
                SegmentKind::VirtualEnv,
                SegmentKind::Path,
                SegmentKind::Vcs,
                SegmentKind::Status,
            ],
            colors,
            timestamp_format: "%H:%M:%S".to_string(),
            vcs_timeout_ms: 200,
        }
    }
}

impl ComposedConfig {
    /// Whether the show flag for `segment` is on
    pub fn is_shown(&self, segment: SegmentKind) -> bool {
        match segment {
            SegmentKind::Path => self.show_path,
            SegmentKind::Vcs => self.show_vcs_status,
            SegmentKind::VirtualEnv => self.show_virtual_env,
            SegmentKind::Timestamp => self.show_timestamp,
            SegmentKind::Status => self.show_exit_status,
        }
    }

    /// Segments to render, in configured order, without duplicates
    pub fn enabled_segments(&self) -> Vec<SegmentKind> {
        let mut seen = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            if self.is_shown(*segment) && !seen.contains(segment) {
                seen.push(*segment);
            }
        }
        seen
    }

    /// Key in the JSON document for a segment's show flag
    pub fn show_flag_key(segment: SegmentKind) -> &'static str {
        match segment {
            SegmentKind::Path => "showPath",
            SegmentKind::Vcs => "showVcsStatus",
            SegmentKind::VirtualEnv => "showVirtualEnv",
            SegmentKind::Timestamp => "showTimestamp",
            SegmentKind::Status => "showExitStatus",
        }
    }
}

/// On-disk log settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub path: String,
    pub retention_days: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: paths::default_log_dir().display().to_string(),
            retention_days: 7,
        }
    }
}

impl Configuration {
    /// The default document as JSON
    pub fn default_document() -> Value {
        serde_json::to_value(Configuration::default()).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Strict validation of every field.
    pub fn validate(&self, palette: &dyn Palette) -> Result<()> {
        self.validate_changes(None, palette)
    }

    /// Strict validation of the fields that differ from `previous`.
    ///
    /// Values carried over unchanged from `previous` are not checked again,
    /// so a color this version no longer accepts (a segment it does not
    /// know, a token from another palette) does not block unrelated edits.
    pub fn validate_changes(
        &self,
        previous: Option<&Configuration>,
        palette: &dyn Palette,
    ) -> Result<()> {
        let composed = &self.prompt.composed;
        let previous_colors = previous.map(|p| &p.prompt.composed.colors);

        for (segment, token) in &composed.colors {
            if previous_colors.and_then(|colors| colors.get(segment)) == Some(token) {
                continue;
            }
            if SegmentKind::from_name(segment).is_none() {
                return Err(ConfigError::Validation(format!(
                    "color set for unknown segment '{}'",
                    segment
                )));
            }
            palette
                .validate(token)
                .map_err(|source| ConfigError::InvalidColorToken {
                    segment: segment.clone(),
                    token: token.clone(),
                    source,
                })?;
        }

        if changed(previous, self, |c| &c.prompt.delegate.timeout_ms) {
            check_timeout("prompt.delegate.timeoutMs", self.prompt.delegate.timeout_ms)?;
        }
        if changed(previous, self, |c| &c.prompt.composed.vcs_timeout_ms) {
            check_timeout("prompt.composed.vcsTimeoutMs", composed.vcs_timeout_ms)?;
        }
        if changed(previous, self, |c| &c.prompt.delegate.executable)
            && self.prompt.delegate.executable.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "prompt.delegate.executable must not be empty".to_string(),
            ));
        }
        if changed(previous, self, |c| &c.prompt.composed.timestamp_format)
            && composed.timestamp_format.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "prompt.composed.timestampFormat must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn changed<T: PartialEq>(
    previous: Option<&Configuration>,
    current: &Configuration,
    field: impl Fn(&Configuration) -> &T,
) -> bool {
    previous.map_or(true, |p| field(p) != field(current))
}

fn check_timeout(key: &str, value: u64) -> Result<()> {
    let (min, max) = TIMEOUT_RANGE_MS;
    if value < min || value > max {
        return Err(ConfigError::Validation(format!(
            "{} must be between {} and {} (got {})",
            key, min, max, value
        )));
    }
    Ok(())
}

/// Parse a raw document leniently.
///
/// Repairs apply to a copy; the raw document itself is left as written so
/// values this version cannot use still survive the next save. Each repair
/// comes back as a warning.
pub(crate) fn parse_lenient(document: &Value) -> (serde_json::Result<Configuration>, Vec<String>) {
    let mut repaired = document.clone();
    let warnings = normalize_document(&mut repaired);
    (serde_json::from_value(repaired), warnings)
}

/// Repair a document read from disk so it can be parsed.
///
/// Coercions are lenient here (a hand-edited file should still load) and
/// every one is reported back as a warning. Edits made through the store
/// are validated strictly instead.
pub(crate) fn normalize_document(document: &mut Value) -> Vec<String> {
    let mut warnings = Vec::new();
    let Some(root) = document.as_object_mut() else {
        return warnings;
    };

    if let Some(mode) = root.get_mut("mode") {
        let valid = mode.as_str().and_then(|m| m.parse::<Mode>().ok());
        match valid {
            Some(parsed) => *mode = Value::String(parsed.as_str().to_string()),
            None => {
                warnings.push(format!("unknown mode {}, using 'standard'", mode));
                *mode = Value::String(Mode::Standard.as_str().to_string());
            }
        }
    }

    if let Some(features) = root.get_mut("features").and_then(Value::as_object_mut) {
        let invalid: Vec<String> = features
            .iter()
            .filter(|(_, v)| !v.is_boolean())
            .map(|(k, _)| k.clone())
            .collect();
        for key in invalid {
            warnings.push(format!("feature '{}' is not a boolean, ignoring it", key));
            features.remove(&key);
        }
    }

    let Some(prompt) = root.get_mut("prompt").and_then(Value::as_object_mut) else {
        return warnings;
    };

    match prompt.get("backend") {
        None => {}
        Some(Value::Null) => {
            prompt.remove("backend");
        }
        Some(raw) => {
            let parsed = raw.as_str().and_then(|b| b.parse::<BackendKind>().ok());
            let coerced = match parsed {
                Some(kind) => kind,
                None => {
                    warnings.push(format!(
                        "unknown prompt backend {}, using 'composed'",
                        raw
                    ));
                    BackendKind::Composed
                }
            };
            prompt.insert(
                "backend".to_string(),
                Value::String(coerced.as_str().to_string()),
            );
        }
    }

    if let Some(delegate) = prompt.get_mut("delegate").and_then(Value::as_object_mut) {
        clamp_timeout(delegate, "timeoutMs", "prompt.delegate.timeoutMs", &mut warnings);
    }

    if let Some(composed) = prompt.get_mut("composed").and_then(Value::as_object_mut) {
        clamp_timeout(composed, "vcsTimeoutMs", "prompt.composed.vcsTimeoutMs", &mut warnings);

        if let Some(segments) = composed.get_mut("segments").and_then(Value::as_array_mut) {
            segments.retain(|s| {
                let known = s.as_str().and_then(SegmentKind::from_name).is_some();
                if !known {
                    warnings.push(format!("unknown segment {} ignored", s));
                }
                known
            });
        }

        if let Some(colors) = composed.get_mut("colors").and_then(Value::as_object_mut) {
            let invalid: Vec<String> = colors
                .iter()
                .filter(|(_, v)| !v.is_string())
                .map(|(k, _)| k.clone())
                .collect();
            for key in invalid {
                warnings.push(format!("color for '{}' is not a string, ignoring it", key));
                colors.remove(&key);
            }
        }
    }

    warnings
}

fn clamp_timeout(
    object: &mut Map<String, Value>,
    key: &str,
    label: &str,
    warnings: &mut Vec<String>,
) {
    let Some(raw) = object.get(key) else { return };
    let (min, max) = TIMEOUT_RANGE_MS;
    let clamped = match raw.as_u64() {
        Some(value) if (min..=max).contains(&value) => return,
        Some(value) => value.clamp(min, max),
        None => match raw.as_i64() {
            Some(_) => min,
            None => {
                warnings.push(format!("{} is not a number, using the default", label));
                object.remove(key);
                return;
            }
        },
    };
    warnings.push(format!("{} out of range ({}), clamped to {}", label, raw, clamped));
    object.insert(key.to_string(), Value::from(clamped));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shellwright_themes::AnsiPalette;

    #[test]
    fn test_default_configuration() {
        let config = Configuration::default();
        assert_eq!(config.mode, Mode::Standard);
        assert!(config.features.is_empty());
        assert_eq!(config.prompt.backend, None);
        assert!(config.prompt.composed.show_path);
        assert!(config.prompt.composed.show_vcs_status);
        assert!(!config.prompt.composed.show_timestamp);
        assert_eq!(config.prompt.delegate.timeout_ms, 500);
        assert_eq!(config.prompt.composed.vcs_timeout_ms, 200);
        assert!(!config.logging.enabled);
        assert_eq!(config.logging.retention_days, 7);
    }

    #[test]
    fn test_default_document_uses_camel_case_and_omits_backend() {
        let doc = Configuration::default_document();
        assert!(doc["prompt"]["composed"].get("showVcsStatus").is_some());
        assert!(doc["prompt"]["delegate"].get("configPath").is_some());
        assert!(doc["logging"].get("retentionDays").is_some());
        assert!(doc["prompt"].get("backend").is_none());
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: Configuration =
            serde_json::from_value(json!({ "prompt": { "composed": { "showTimestamp": true } } }))
                .unwrap();
        assert!(config.prompt.composed.show_timestamp);
        assert!(config.prompt.composed.show_path);
        assert_eq!(config.mode, Mode::Standard);
    }

    #[test]
    fn test_unknown_top_level_keys_kept_in_extra() {
        let config: Configuration =
            serde_json::from_value(json!({ "futureSection": { "x": 1 } })).unwrap();
        assert_eq!(config.extra["futureSection"], json!({ "x": 1 }));

        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["futureSection"], json!({ "x": 1 }));
    }

    #[test]
    fn test_enabled_segments_respects_order_and_flags() {
        let mut composed = ComposedConfig::default();
        composed.segments = vec![
            SegmentKind::Vcs,
            SegmentKind::Path,
            SegmentKind::Vcs,
            SegmentKind::Timestamp,
        ];
        composed.show_timestamp = false;
        assert_eq!(
            composed.enabled_segments(),
            vec![SegmentKind::Vcs, SegmentKind::Path]
        );
    }

    #[test]
    fn test_validate_rejects_bad_color() {
        let mut config = Configuration::default();
        config
            .prompt
            .composed
            .colors
            .insert("path".to_string(), "not-a-color".to_string());
        let err = config.validate(&AnsiPalette::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColorToken { ref segment, .. } if segment == "path"));
    }

    #[test]
    fn test_validate_rejects_color_for_unknown_segment() {
        let mut config = Configuration::default();
        config
            .prompt
            .composed
            .colors
            .insert("battery".to_string(), "red".to_string());
        assert!(matches!(
            config.validate(&AnsiPalette::default()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_changes_skips_unchanged_colors() {
        let mut previous = Configuration::default();
        previous
            .prompt
            .composed
            .colors
            .insert("battery".to_string(), "mauve".to_string());
        let mut edited = previous.clone();
        edited.mode = Mode::Full;

        let palette = AnsiPalette::default();
        assert!(edited.validate_changes(Some(&previous), &palette).is_ok());
        assert!(edited.validate(&palette).is_err());

        edited
            .prompt
            .composed
            .colors
            .insert("battery".to_string(), "red".to_string());
        assert!(matches!(
            edited.validate_changes(Some(&previous), &palette),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_lenient_leaves_raw_document_alone() {
        let raw = json!({
            "features": { "git": "yes" },
            "prompt": { "composed": { "segments": ["path", "battery"], "colors": { "vcs": 5 } } }
        });
        let (parsed, warnings) = parse_lenient(&raw);
        let config = parsed.unwrap();

        assert_eq!(config.prompt.composed.segments, vec![SegmentKind::Path]);
        assert!(config.features.is_empty());
        assert!(!config.prompt.composed.colors.contains_key("vcs"));
        assert_eq!(warnings.len(), 3);
        assert_eq!(raw["prompt"]["composed"]["segments"], json!(["path", "battery"]));
    }

    #[test]
    fn test_validate_rejects_out_of_range_timeout() {
        let mut config = Configuration::default();
        config.prompt.delegate.timeout_ms = 0;
        assert!(config.validate(&AnsiPalette::default()).is_err());
    }

    #[test]
    fn test_default_configuration_validates() {
        assert!(Configuration::default()
            .validate(&AnsiPalette::basic())
            .is_ok());
    }

    #[test]
    fn test_normalize_coerces_unknown_backend() {
        let mut doc = json!({ "prompt": { "backend": "starship-ng" } });
        let warnings = normalize_document(&mut doc);
        assert_eq!(doc["prompt"]["backend"], "composed");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_normalize_canonicalizes_backend_case() {
        let mut doc = json!({ "prompt": { "backend": "Delegate" } });
        let warnings = normalize_document(&mut doc);
        assert_eq!(doc["prompt"]["backend"], "delegate");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_normalize_drops_null_backend() {
        let mut doc = json!({ "prompt": { "backend": null } });
        normalize_document(&mut doc);
        assert!(doc["prompt"].get("backend").is_none());
    }

    #[test]
    fn test_normalize_repairs_segments_timeouts_and_features() {
        let mut doc = json!({
            "mode": "turbo",
            "features": { "git": true, "ssh": "yes" },
            "prompt": {
                "delegate": { "timeoutMs": 999999 },
                "composed": { "segments": ["path", "battery"], "vcsTimeoutMs": 1 }
            }
        });
        let warnings = normalize_document(&mut doc);
        assert_eq!(doc["mode"], "standard");
        assert!(doc["features"].get("ssh").is_none());
        assert_eq!(doc["features"]["git"], true);
        assert_eq!(doc["prompt"]["delegate"]["timeoutMs"], 10_000);
        assert_eq!(doc["prompt"]["composed"]["vcsTimeoutMs"], 10);
        assert_eq!(doc["prompt"]["composed"]["segments"], json!(["path"]));
        assert_eq!(warnings.len(), 5);

        let config: Configuration = serde_json::from_value(doc).unwrap();
        assert_eq!(config.prompt.composed.segments, vec![SegmentKind::Path]);
    }

    #[test]
    fn test_parse_backend_and_mode() {
        assert_eq!("Composed".parse::<BackendKind>().unwrap(), BackendKind::Composed);
        assert!("other".parse::<BackendKind>().is_err());
        assert_eq!("FULL".parse::<Mode>().unwrap(), Mode::Full);
    }
}
