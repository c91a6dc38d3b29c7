//! Repository status for the prompt
//!
//! Wraps `git2` to answer one question quickly: which branch is checked
//! out and how many files are staged, modified, untracked or conflicted.
//! [`status_with_timeout`] runs the query off the async runtime and gives
//! up after a deadline so a slow filesystem cannot stall the prompt.

pub mod error;
pub mod git;
pub mod status;

pub use error::{Result, VcsError};
pub use git::{status_with_timeout, GitRepository};
pub use status::{HeadState, VcsStatus};
