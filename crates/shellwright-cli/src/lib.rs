// Shellwright CLI library

pub mod commands;
pub mod logging;
pub mod menu;
pub mod output;
pub mod router;
pub mod runtime;

pub use logging::init_logging;
pub use menu::{ConfigMenu, MenuAction, MenuOutcome};
pub use router::{Cli, CommandRouter, Commands};
