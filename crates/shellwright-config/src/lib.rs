//! Shellwright configuration
//!
//! The configuration is a single JSON document describing the active
//! mode, feature flags, prompt backend settings and logging. This crate
//! owns its data model ([`types`]), the deep-merge rules used for partial
//! edits ([`merge`]), the cached, atomically persisted [`ConfigStore`], and
//! an optional file watcher that invalidates the cache on external edits.
//!
//! # Examples
//!
//! ```no_run
//! use shellwright_config::{BackendKind, ConfigStore};
//! use serde_json::json;
//!
//! let store = ConfigStore::new(ConfigStore::default_path());
//! let config = store.get();
//! println!("mode: {:?}", config.mode);
//!
//! store.set("prompt.composed", json!({ "showTimestamp": true }))?;
//! store.set("prompt", json!({ "backend": BackendKind::Composed }))?;
//! # Ok::<(), shellwright_config::ConfigError>(())
//! ```

pub mod error;
pub mod merge;
pub mod paths;
pub mod store;
pub mod types;
pub mod watcher;

pub use error::{ConfigError, Result};
pub use merge::{deep_merge, merge_at_path, value_at_path};
pub use store::{ConfigStore, DEFAULT_CACHE_TTL, TTL_ENV_VAR};
pub use types::{
    BackendKind, ComposedConfig, Configuration, DelegateConfig, LoggingConfig, Mode,
    PromptConfig, SegmentKind,
};
pub use watcher::ConfigWatcher;
