//! # shellwright-process
//!
//! Runs short-lived helper processes (the delegate prompt renderer) with
//! a hard deadline. A child that outlives its timeout is killed together
//! with everything it spawned, so a hung renderer cannot block the shell.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use shellwright_process::{ProcessConfig, ProcessManager};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ProcessManager::new();
//! let config = ProcessConfig::new("oh-my-posh")
//!     .env("POSH_THEME", "/tmp/theme.json")
//!     .timeout(Duration::from_millis(500));
//!
//! let output = manager.run(config).await?;
//! println!("{}", output.stdout);
//! # Ok(())
//! # }
//! ```

pub mod child;
pub mod config;
pub mod error;
pub mod manager;

pub use child::{ManagedChild, ProcessOutput};
pub use config::ProcessConfig;
pub use error::{ProcessError, Result};
pub use manager::ProcessManager;
