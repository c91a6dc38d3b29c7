//! Managed child process wrapper

use std::process::ExitStatus;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tracing::{debug, warn};

use crate::{
    config::ProcessConfig,
    error::{ProcessError, Result},
};

/// How long to wait for a killed process to be reaped
const REAP_TIMEOUT_MS: u64 = 100;

/// Captured result of a finished process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Wrapper around tokio::process::Child with deadline handling
pub struct ManagedChild {
    child: Child,
    config: ProcessConfig,
    pid: u32,
    started: Instant,
}

impl ManagedChild {
    pub(crate) fn new(child: Child, config: ProcessConfig) -> Self {
        let pid = child.id().unwrap_or(0);
        Self {
            child,
            config,
            pid,
            started: Instant::now(),
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Collect stdout and stderr and wait for exit.
    ///
    /// When the configured timeout passes first, the process tree is killed
    /// and [`ProcessError::Timeout`] is returned.
    pub async fn output(&mut self) -> Result<ProcessOutput> {
        let stdout = self.child.stdout.take();
        let stderr = self.child.stderr.take();
        let child = &mut self.child;

        let collect = async move {
            let (stdout, stderr, status) =
                tokio::join!(read_all(stdout), read_all(stderr), child.wait());
            Ok::<_, std::io::Error>((status?, stdout?, stderr?))
        };

        let finished = match self.config.timeout {
            Some(timeout) => tokio::time::timeout(timeout, collect)
                .await
                .map_err(|_| timeout),
            None => Ok(collect.await),
        };

        let collected = match finished {
            Ok(collected) => collected,
            Err(timeout) => {
                warn!(pid = %self.pid, command = %self.config.command, "process timed out");
                if let Err(e) = self.kill_tree().await {
                    warn!(pid = %self.pid, error = %e, "failed to kill timed out process");
                }
                return Err(ProcessError::Timeout {
                    command: self.config.command.clone(),
                    millis: timeout.as_millis() as u64,
                });
            }
        };

        let (status, stdout, stderr) = collected?;
        let output = ProcessOutput {
            status,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            elapsed: self.started.elapsed(),
        };
        debug!(pid = %self.pid, status = %output.status, elapsed_ms = output.elapsed.as_millis() as u64, "process finished");
        Ok(output)
    }

    /// Kill the process and everything in its process group.
    ///
    /// With a non-zero kill grace, SIGTERM is sent first and SIGKILL after
    /// the grace period.
    pub async fn kill_tree(&mut self) -> Result<()> {
        debug!(pid = %self.pid, "killing process tree");

        #[cfg(unix)]
        {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            let pgid = Pid::from_raw(self.pid as i32);
            let grace = self.config.kill_grace;

            if !grace.is_zero() {
                if let Err(e) = killpg(pgid, Signal::SIGTERM) {
                    debug!(pid = %self.pid, error = %e, "SIGTERM to process group failed");
                }
                tokio::time::sleep(grace).await;
            }

            if let Err(e) = killpg(pgid, Signal::SIGKILL) {
                debug!(pid = %self.pid, error = %e, "SIGKILL to process group failed, killing process only");
                self.child
                    .start_kill()
                    .map_err(|e| ProcessError::KillFailed(e.to_string()))?;
            }
        }

        #[cfg(not(unix))]
        {
            self.child
                .start_kill()
                .map_err(|e| ProcessError::KillFailed(e.to_string()))?;
        }

        let reap = Duration::from_millis(REAP_TIMEOUT_MS);
        if tokio::time::timeout(reap, self.child.wait()).await.is_err() {
            warn!(pid = %self.pid, "killed process was not reaped in time");
        }
        Ok(())
    }
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::ProcessManager;

    #[tokio::test]
    async fn test_is_running_until_exit() {
        let manager = ProcessManager::new();
        let config = ProcessConfig::new("sleep").args(["0.2"]);

        let mut child = manager.spawn(config).await.unwrap();
        assert!(child.is_running());

        child.output().await.unwrap();
        assert!(!child.is_running());
    }

    #[tokio::test]
    async fn test_kill_tree_stops_process() {
        let manager = ProcessManager::new();
        let config = ProcessConfig::new("sleep")
            .args(["10"])
            .kill_grace(Duration::ZERO);

        let mut child = manager.spawn(config).await.unwrap();
        child.kill_tree().await.unwrap();
        assert!(!child.is_running());
    }
}
