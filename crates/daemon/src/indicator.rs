// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The indicator: an auxiliary process the instance starts on demand.
//!
//! The instance supervises at most one indicator child. Starting is
//! idempotent, and the child is stopped when the instance shuts down.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use crate::env;

/// Binary name looked up when no indicator command is configured.
pub const INDICATOR_BINARY: &str = "nimf-indicator";

/// Something the instance can be asked to start.
pub trait Indicator {
    /// Start the indicator if it is not running. Returns whether it is running afterwards.
    fn start(&mut self) -> bool;

    /// Whether the indicator is currently running.
    fn is_running(&mut self) -> bool;

    /// Stop the indicator if it is running.
    fn stop(&mut self);
}

/// Indicator backed by a child process.
#[derive(Debug)]
pub struct ProcessIndicator {
    program: PathBuf,
    args: Vec<String>,
    child: Option<Child>,
}

impl ProcessIndicator {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: None,
        }
    }

    /// Indicator configured through the environment, or the default binary.
    pub fn from_env() -> Self {
        match env::indicator_command() {
            Some(mut parts) => {
                let program = parts.remove(0);
                Self::new(program, parts)
            }
            None => Self::new(find_indicator_binary(), Vec::new()),
        }
    }

    /// PID of the running child, if any.
    #[cfg(test)]
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }
}

impl Indicator for ProcessIndicator {
    fn start(&mut self) -> bool {
        if self.is_running() {
            tracing::debug!("indicator already running");
            return true;
        }

        let spawned = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => {
                tracing::info!(pid = child.id(), program = %self.program.display(), "indicator started");
                self.child = Some(child);
                true
            }
            Err(e) => {
                tracing::warn!(program = %self.program.display(), "failed to start indicator: {}", e);
                false
            }
        }
    }

    fn is_running(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };

        match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                tracing::info!("indicator exited with {}", status);
                self.child = None;
                false
            }
            Err(e) => {
                tracing::warn!("failed to poll indicator: {}", e);
                self.child = None;
                false
            }
        }
    }

    fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        if let Err(e) = child.kill() {
            tracing::debug!("indicator kill: {}", e);
        }
        match child.wait() {
            Ok(status) => tracing::info!("indicator stopped ({})", status),
            Err(e) => tracing::warn!("failed to reap indicator: {}", e),
        }
    }
}

impl Drop for ProcessIndicator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Find the indicator binary.
fn find_indicator_binary() -> PathBuf {
    // Look next to the current executable
    if let Ok(exe) = std::env::current_exe() {
        let candidate = exe.with_file_name(INDICATOR_BINARY);
        if candidate.exists() {
            return candidate;
        }
    }

    // Fall back to PATH
    PathBuf::from(INDICATOR_BINARY)
}

#[cfg(test)]
#[path = "indicator_tests.rs"]
mod tests;
