//! Diagnostics sink
//!
//! The prompt core never writes log files itself. It reports recoverable
//! failures through [`Diagnostics`], which by default forwards to `tracing`.

use parking_lot::Mutex;
use tracing::{error, warn};

/// Severity of a reported diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Sink for warnings and errors raised by the prompt core
pub trait Diagnostics: Send + Sync {
    /// Report a recoverable problem in `area`
    fn log_warning(&self, area: &str, message: &str);

    /// Report an error in `area`
    fn log_error(&self, area: &str, error: &dyn std::error::Error);
}

/// Default sink: emits `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn log_warning(&self, area: &str, message: &str) {
        warn!(area = %area, "{}", message);
    }

    fn log_error(&self, area: &str, error: &dyn std::error::Error) {
        error!(area = %area, error = %format_error(error), "operation failed");
    }
}

/// A diagnostic captured by [`RecordingDiagnostics`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub severity: Severity,
    pub area: String,
    pub message: String,
}

/// Sink that keeps every diagnostic in memory.
///
/// Used by tests to assert how many warnings a failure produced, and by
/// the menu to show the most recent problem to the user.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in arrival order
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().clone()
    }

    /// Number of warnings recorded so far
    pub fn warning_count(&self) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.severity == Severity::Warning)
            .count()
    }

    /// Number of errors recorded so far
    pub fn error_count(&self) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.severity == Severity::Error)
            .count()
    }

    /// Drain the recorded diagnostics
    pub fn take(&self) -> Vec<DiagnosticRecord> {
        std::mem::take(&mut *self.records.lock())
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn log_warning(&self, area: &str, message: &str) {
        self.records.lock().push(DiagnosticRecord {
            severity: Severity::Warning,
            area: area.to_string(),
            message: message.to_string(),
        });
    }

    fn log_error(&self, area: &str, error: &dyn std::error::Error) {
        self.records.lock().push(DiagnosticRecord {
            severity: Severity::Error,
            area: area.to_string(),
            message: format_error(error),
        });
    }
}

/// Format an error with its cause chain
pub fn format_error(error: &dyn std::error::Error) -> String {
    const MAX_DEPTH: usize = 10;

    let mut out = error.to_string();
    let mut source = error.source();
    let mut depth = 0;
    while let Some(cause) = source {
        if depth >= MAX_DEPTH {
            break;
        }
        out.push_str(" Caused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
        depth += 1;
    }
    out
}
