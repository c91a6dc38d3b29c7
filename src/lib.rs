//! Workspace-level integration and property tests for shellwright.
//!
//! The tests live in `tests/` and drive the public APIs of the member
//! crates together; this crate exports nothing.
