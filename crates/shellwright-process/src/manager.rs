//! Process manager - spawning and one-shot runs

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::{
    child::{ManagedChild, ProcessOutput},
    config::ProcessConfig,
    error::{ProcessError, Result},
};

/// Spawns managed processes
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessManager;

impl ProcessManager {
    pub fn new() -> Self {
        Self
    }

    /// Spawn a managed process.
    ///
    /// stdin is closed and both output streams are piped. On unix the child
    /// leads its own process group so a timeout can kill its descendants.
    pub async fn spawn(&self, config: ProcessConfig) -> Result<ManagedChild> {
        config.validate()?;
        debug!(
            command = %config.command,
            args = ?config.args,
            "spawning process"
        );

        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args);

        if let Some(ref dir) = config.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|source| ProcessError::SpawnFailed {
            command: config.command.clone(),
            source,
        })?;

        Ok(ManagedChild::new(child, config))
    }

    /// Spawn, capture output and require a zero exit status
    pub async fn run(&self, config: ProcessConfig) -> Result<ProcessOutput> {
        let command = config.command.clone();
        let mut child = self.spawn(config).await?;
        let output = child.output().await?;

        if !output.status.success() {
            return Err(ProcessError::NonZeroExit {
                command,
                code: output.status.code(),
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}
