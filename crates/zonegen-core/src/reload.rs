//! Name server reload via its control command
//!
//! Runs `<command> <subcommand>` (by default `/usr/sbin/rndc reload`) and
//! treats anything but a zero exit status as a failed reload.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

use crate::config::ReloadConfig;
use crate::error::{Error, Result};
use crate::traits::Reloader;

/// Reloads the name server by running its control command
#[derive(Debug, Clone)]
pub struct CommandReloader {
    command: PathBuf,
    subcommand: String,
    timeout: Duration,
}

impl CommandReloader {
    /// Create a reloader for `command subcommand`
    pub fn new(command: impl Into<PathBuf>, subcommand: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            subcommand: subcommand.into(),
            timeout,
        }
    }

    /// Create a reloader from configuration
    pub fn from_config(config: &ReloadConfig) -> Self {
        Self::new(
            config.command.clone(),
            config.subcommand.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl Reloader for CommandReloader {
    async fn reload(&self) -> Result<()> {
        tracing::info!(
            "Reloading name server: {} {}",
            self.command.display(),
            self.subcommand
        );

        let output = Command::new(&self.command)
            .arg(&self.subcommand)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| {
                Error::reload(format!(
                    "{} {} timed out after {:?}",
                    self.command.display(),
                    self.subcommand,
                    self.timeout
                ))
            })?
            .map_err(|e| {
                Error::reload(format!(
                    "Failed to run {}: {}",
                    self.command.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::reload(format!(
                "{} {} exited with {}: {}",
                self.command.display(),
                self.subcommand,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!("Reload output: {}", stdout.trim());
        }

        Ok(())
    }
}
