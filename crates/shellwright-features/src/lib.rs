//! Feature modules
//!
//! Decides which optional shell features (git helpers, SSH management,
//! virtual-env activation, WSL helpers) are switched on for a given
//! configuration. The registry only reports; loading the feature scripts
//! into the shell is the job of the generated init hook.

pub mod registry;

pub use registry::{Feature, FeatureRegistry, FeatureStatus};
