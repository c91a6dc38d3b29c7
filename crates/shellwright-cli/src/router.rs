// Command routing and dispatch

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use shellwright_common::{Diagnostics, TracingDiagnostics};
use shellwright_config::{BackendKind, ConfigStore};
use shellwright_prompt::{Session, ShellKind};
use tracing::warn;

use crate::commands::*;

/// Shellwright - live-configurable shell prompt
#[derive(Parser, Debug)]
#[command(name = "shellwright")]
#[command(bin_name = "shellwright")]
#[command(about = "Live-configurable shell prompt")]
#[command(
    long_about = "Shellwright renders the line your shell shows before each command.\n\nIt uses an external renderer when one is installed and configured, and its own segment composer otherwise.\n\nQuick start:\n  • eval \"$(shellwright init bash)\"   Install the prompt hook\n  • shellwright menu                  Edit the configuration interactively\n  • shellwright config get            Show the configuration document"
)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file
    #[arg(long, global = true, env = "SHELLWRIGHT_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print one rendered prompt line
    #[command(about = "Render the prompt for the current directory")]
    Prompt {
        /// Exit code of the previous command
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        exit_code: i32,

        /// Shell the line is rendered for (bash, zsh, fish, plain)
        #[arg(long, default_value = "plain")]
        shell: ShellKind,
    },

    /// Print the shell hook
    #[command(about = "Print the hook that installs the prompt in a shell")]
    Init {
        /// Shell to generate the hook for (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: ShellKind,
    },

    /// Read and edit the configuration document
    #[command(about = "View and edit the configuration document")]
    Config {
        #[command(subcommand)]
        action: ConfigSubcommand,
    },

    /// Switch the prompt backend
    #[command(about = "Switch between the external renderer and the built-in composer")]
    Backend {
        /// Backend to use (delegate, composed)
        #[arg(value_name = "BACKEND")]
        kind: BackendKind,
    },

    /// List optional features
    #[command(about = "List optional features and whether they are enabled")]
    Features,

    /// Interactive configuration editor
    #[command(about = "Open the interactive configuration menu")]
    Menu,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Print the document, or the value at a dotted key path
    Get {
        #[arg(value_name = "PATH")]
        path: Option<String>,
    },

    /// Merge a JSON value into the document at a dotted key path
    #[command(
        long_about = "Merge a JSON value into the document at a dotted key path.\n\nObjects are merged key by key, null removes a key, anything else replaces the value. A VALUE that is not valid JSON is stored as a string."
    )]
    Set {
        #[arg(value_name = "PATH")]
        path: String,

        #[arg(value_name = "VALUE")]
        value: String,
    },

    /// Overwrite the document with defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Routes parsed arguments to command handlers
pub struct CommandRouter;

impl CommandRouter {
    /// Parse CLI arguments and route to the appropriate handler
    pub async fn route() -> Result<()> {
        let cli = Cli::parse();
        let store = Self::open_store(&cli);

        crate::logging::init_logging(cli.verbose, &store.get().logging);
        if let Some(warning) = store.last_load_warning() {
            warn!("{}", warning);
        }

        Self::execute(&cli, store).await
    }

    /// Config store for the file named on the command line, or the default
    pub fn open_store(cli: &Cli) -> Arc<ConfigStore> {
        let path = cli.config.clone().unwrap_or_else(ConfigStore::default_path);
        let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics);
        Arc::new(ConfigStore::new(path).with_diagnostics(diagnostics))
    }

    /// Execute a command against `store`
    pub async fn execute(cli: &Cli, store: Arc<ConfigStore>) -> Result<()> {
        let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics);
        let mut session = Session::new(store, diagnostics);

        match &cli.command {
            Commands::Prompt { exit_code, shell } => {
                PromptCommand::new(*exit_code, *shell)
                    .execute(&mut session)
                    .await
            }
            Commands::Init { shell } => {
                InitCommand::new(*shell, cli.config.clone())
                    .execute(&mut session)
                    .await
            }
            Commands::Config { action } => {
                let action = match action {
                    ConfigSubcommand::Get { path } => ConfigAction::Get(path.clone()),
                    ConfigSubcommand::Set { path, value } => {
                        ConfigAction::Set(path.clone(), value.clone())
                    }
                    ConfigSubcommand::Reset => ConfigAction::Reset,
                    ConfigSubcommand::Path => ConfigAction::Path,
                };
                ConfigCommand::new(action).execute(&mut session).await
            }
            Commands::Backend { kind } => BackendCommand::new(*kind).execute(&mut session).await,
            Commands::Features => FeaturesCommand.execute(&mut session).await,
            Commands::Menu => MenuCommand.execute(&mut session).await,
        }
    }
}
