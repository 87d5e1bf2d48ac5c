// ABOUTME: Hands a stored connection over to the system SSH client
// ABOUTME: Replaces the current process on Unix, falls back to spawn-and-wait elsewhere

use crate::config::SshConfig;
use crate::storage::ConnectionRecord;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;

pub struct SshLauncher {
    config: SshConfig,
}

impl SshLauncher {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }

    /// Arguments after the program name: the target, then each extra flag.
    pub fn build_args(record: &ConnectionRecord) -> Vec<String> {
        let mut args = vec![record.target.clone()];
        if let Some(extra_args) = record.extra_args.as_deref() {
            args.extend(extra_args.split_whitespace().map(str::to_string));
        }
        args
    }

    /// Resolve the configured binary through PATH unless it is already a path.
    pub fn resolve_binary(&self) -> Result<PathBuf> {
        let binary = &self.config.binary;
        if binary.contains(std::path::MAIN_SEPARATOR) {
            return Ok(PathBuf::from(binary));
        }
        which::which(binary)
            .with_context(|| format!("Failed to find SSH client '{}' in PATH", binary))
    }

    fn command(&self, record: &ConnectionRecord) -> Result<Command> {
        let program = self.resolve_binary()?;
        let args = Self::build_args(record);
        tracing::debug!("Launching {} with args: {:?}", program.display(), args);

        let mut cmd = Command::new(&program);
        cmd.args(&args);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.arg0(&self.config.binary);
        }
        Ok(cmd)
    }

    /// Only returns if the client could not be started.
    #[cfg(unix)]
    pub fn execute(&self, record: &ConnectionRecord) -> Result<()> {
        use std::os::unix::process::CommandExt;

        let mut cmd = self.command(record)?;
        tracing::info!("Replacing process with SSH client for {}", record.name);
        let err = cmd.exec();
        Err(err).with_context(|| format!("Failed to execute SSH client for '{}'", record.name))
    }

    #[cfg(not(unix))]
    pub fn execute(&self, record: &ConnectionRecord) -> Result<()> {
        let status = self
            .command(record)?
            .status()
            .with_context(|| format!("Failed to launch SSH client for '{}'", record.name))?;
        tracing::info!("SSH client for {} exited with {}", record.name, status);
        std::process::exit(status.code().unwrap_or(1));
    }
}
