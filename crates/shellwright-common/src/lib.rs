//! # shellwright-common
//!
//! Utilities shared by every shellwright crate:
//!
//! - [`json_store`]: JSON load/save helpers, including atomic writes
//!   (temp file + rename) used for the configuration document.
//! - [`diagnostics`]: the `log_warning` / `log_error` sink that the prompt
//!   core reports recoverable failures through.
//! - [`logging`]: log file naming and retention cleanup for the optional
//!   on-disk log.

pub mod diagnostics;
pub mod json_store;
pub mod logging;

pub use diagnostics::{Diagnostics, DiagnosticRecord, RecordingDiagnostics, Severity, TracingDiagnostics};
pub use json_store::{load_json, save_json_atomic, JsonStoreError, JsonStoreResult};
