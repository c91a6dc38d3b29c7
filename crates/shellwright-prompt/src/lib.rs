//! # shellwright-prompt
//!
//! Renders the status line shown before every command.
//!
//! - [`PromptComposer`] builds the line from [`segments`] (path, VCS
//!   status, virtualenv, clock, exit status).
//! - [`DelegateRenderer`] runs an external renderer process instead.
//! - [`PromptManager`] picks one of the two per session, falls back to the
//!   bare path when a render fails, and swaps backends on reload without
//!   letting a stale render overwrite a newer one.
//! - [`Session`] ties the store, the manager and the feature registry
//!   together for one process.
//!
//! ```rust,no_run
//! use shellwright_prompt::{PromptContext, Session};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut session = Session::open(shellwright_config::ConfigStore::default_path());
//! session.start();
//!
//! let line = session.prompt().render(&PromptContext::from_env()).await;
//! println!("{}", line);
//! # }
//! ```

pub mod backend;
pub mod composer;
pub mod context;
pub mod delegate;
pub mod error;
pub mod manager;
pub mod prompt_session;
pub mod segments;
pub mod session;

pub use backend::ActiveBackend;
pub use composer::PromptComposer;
pub use context::{PromptContext, ShellKind};
pub use delegate::DelegateRenderer;
pub use error::{RenderBackendError, Result, SegmentError};
pub use manager::PromptManager;
pub use prompt_session::{BackendState, PromptSession, RenderedPrompt};
pub use segments::SegmentProvider;
pub use session::Session;
