//! External renderer backend
//!
//! Runs a prompt renderer executable (oh-my-posh by default) with no
//! arguments. The renderer learns where its own config and cache live
//! through two configurable environment variables, and reads the render
//! context from `SHELLWRIGHT_*` variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::json;
use shellwright_common::json_store::save_json_atomic;
use shellwright_config::{paths::expand_home, DelegateConfig};
use shellwright_process::{ProcessConfig, ProcessManager};
use tracing::{debug, info};

use crate::{
    context::PromptContext,
    error::{RenderBackendError, Result},
};

/// Working directory of the render
pub const PWD_ENV: &str = "SHELLWRIGHT_PWD";
/// Exit code of the previous command
pub const EXIT_CODE_ENV: &str = "SHELLWRIGHT_EXIT_CODE";
/// Shell the line is rendered for
pub const SHELL_ENV: &str = "SHELLWRIGHT_SHELL";

/// Wraps the external renderer process
#[derive(Debug, Clone)]
pub struct DelegateRenderer {
    config: DelegateConfig,
    process: ProcessManager,
}

impl DelegateRenderer {
    pub fn new(config: DelegateConfig) -> Self {
        Self {
            config,
            process: ProcessManager::new(),
        }
    }

    pub fn config(&self) -> &DelegateConfig {
        &self.config
    }

    pub fn config_path(&self) -> PathBuf {
        expand_home(&self.config.config_path)
    }

    pub fn cache_path(&self) -> PathBuf {
        expand_home(&self.config.cache_path)
    }

    /// Locate the executable.
    ///
    /// Names containing a path separator are checked directly; bare names
    /// are looked up on `PATH`.
    pub fn resolve_executable(&self) -> Result<PathBuf> {
        let executable = self.config.executable.trim();
        if executable.is_empty() {
            return Err(RenderBackendError::Unavailable(
                "no renderer executable configured".to_string(),
            ));
        }

        let expanded = expand_home(executable);
        if expanded.components().count() > 1 || expanded.is_absolute() {
            if expanded.is_file() {
                return Ok(expanded);
            }
            return Err(RenderBackendError::Unavailable(format!(
                "renderer '{}' does not exist",
                expanded.display()
            )));
        }

        which::which(executable).map_err(|e| {
            RenderBackendError::Unavailable(format!("renderer '{}' not found: {}", executable, e))
        })
    }

    /// Whether the renderer can be used, without running it.
    ///
    /// Requires the executable to exist and the config path to name a file
    /// location (it may not exist yet; [`ensure_config`](Self::ensure_config)
    /// creates it).
    pub fn probe(&self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "delegate renderer probe failed");
                false
            }
        }
    }

    /// Like [`probe`](Self::probe), with the reason on failure
    pub fn check(&self) -> Result<()> {
        self.resolve_executable()?;
        config_path_resolvable(&self.config_path())
    }

    /// Write a minimal renderer config if none exists.
    ///
    /// Returns whether a file was written. Also creates the cache directory.
    pub fn ensure_config(&self) -> Result<bool> {
        std::fs::create_dir_all(self.cache_path())?;

        let path = self.config_path();
        if path.exists() {
            return Ok(false);
        }

        save_json_atomic(&path, &default_renderer_config()).map_err(|e| {
            RenderBackendError::Unavailable(format!(
                "cannot write renderer config {}: {}",
                path.display(),
                e
            ))
        })?;
        info!(path = %path.display(), "wrote default renderer config");
        Ok(true)
    }

    /// Run the renderer once and return its first line of output
    pub async fn render(&self, ctx: &PromptContext) -> Result<String> {
        let executable = self.resolve_executable()?;

        let mut process = ProcessConfig::new(executable.display().to_string())
            .env(&self.config.config_env, self.config_path().display().to_string())
            .env(&self.config.cache_env, self.cache_path().display().to_string())
            .env(PWD_ENV, ctx.cwd.display().to_string())
            .env(EXIT_CODE_ENV, ctx.exit_code.to_string())
            .env(SHELL_ENV, ctx.shell.as_str())
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .kill_grace(Duration::ZERO);
        if ctx.cwd.is_dir() {
            process = process.working_dir(&ctx.cwd);
        }

        let output = self
            .process
            .run(process)
            .await
            .map_err(RenderBackendError::from_process)?;

        let line = output.stdout.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            return Err(RenderBackendError::EmptyOutput);
        }
        debug!(elapsed_ms = output.elapsed.as_millis() as u64, "delegate rendered");
        Ok(line.to_string())
    }
}

fn config_path_resolvable(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(RenderBackendError::Unavailable(
            "no renderer config path configured".to_string(),
        ));
    }
    if path.is_dir() {
        return Err(RenderBackendError::Unavailable(format!(
            "renderer config path {} is a directory",
            path.display()
        )));
    }
    Ok(())
}

/// Smallest config the default renderer accepts: the working directory.
fn default_renderer_config() -> serde_json::Value {
    json!({
        "version": 2,
        "final_space": true,
        "blocks": [{
            "type": "prompt",
            "alignment": "left",
            "segments": [{
                "type": "path",
                "style": "plain",
                "foreground": "blue",
                "template": "{{ .Path }}"
            }]
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn delegate_in(dir: &TempDir, executable: &str) -> DelegateRenderer {
        DelegateRenderer::new(DelegateConfig {
            executable: executable.to_string(),
            config_path: dir.path().join("theme.json").display().to_string(),
            cache_path: dir.path().join("cache").display().to_string(),
            timeout_ms: 2_000,
            ..DelegateConfig::default()
        })
    }

    #[cfg(unix)]
    fn script(dir: &TempDir, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_probe_missing_executable() {
        let dir = TempDir::new().unwrap();
        let delegate = delegate_in(&dir, "shellwright-no-such-renderer");
        assert!(!delegate.probe());
        assert!(matches!(
            delegate.check(),
            Err(RenderBackendError::Unavailable(_))
        ));
    }

    #[test]
    fn test_probe_missing_absolute_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("renderer").display().to_string();
        assert!(!delegate_in(&dir, &missing).probe());
    }

    #[test]
    fn test_ensure_config_writes_once() {
        let dir = TempDir::new().unwrap();
        let delegate = delegate_in(&dir, "renderer");

        assert!(delegate.ensure_config().unwrap());
        assert!(delegate.config_path().exists());
        assert!(delegate.cache_path().is_dir());
        assert!(!delegate.ensure_config().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_existing_script() {
        let dir = TempDir::new().unwrap();
        let exe = script(&dir, "render.sh", "echo ok");
        assert!(delegate_in(&dir, &exe).probe());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_render_passes_environment() {
        let dir = TempDir::new().unwrap();
        let exe = script(
            &dir,
            "render.sh",
            "echo \"$SHELLWRIGHT_DELEGATE_CONFIG|$SHELLWRIGHT_EXIT_CODE|$SHELLWRIGHT_SHELL\"",
        );
        let delegate = delegate_in(&dir, &exe);
        let ctx = PromptContext::new(dir.path())
            .with_exit_code(1)
            .with_shell(crate::context::ShellKind::Zsh);

        let line = delegate.render(&ctx).await.unwrap();
        assert_eq!(
            line,
            format!("{}|1|zsh", dir.path().join("theme.json").display())
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_render_nonzero_exit() {
        let dir = TempDir::new().unwrap();
        let exe = script(&dir, "render.sh", "echo partial; exit 2");
        let err = delegate_in(&dir, &exe)
            .render(&PromptContext::new(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderBackendError::NonZeroExit { code: Some(2), .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_render_timeout() {
        let dir = TempDir::new().unwrap();
        let exe = script(&dir, "render.sh", "sleep 5; echo late");
        let mut config = delegate_in(&dir, &exe).config().clone();
        config.timeout_ms = 100;

        let started = std::time::Instant::now();
        let err = DelegateRenderer::new(config)
            .render(&PromptContext::new(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderBackendError::Timeout { millis: 100 }));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_render_empty_output() {
        let dir = TempDir::new().unwrap();
        let exe = script(&dir, "render.sh", "true");
        let err = delegate_in(&dir, &exe)
            .render(&PromptContext::new(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderBackendError::EmptyOutput));
    }
}
