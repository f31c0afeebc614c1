// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: detachment, signal-driven shutdown, and teardown.
//!
//! ```text
//! Starting -> [Detached] -> Listening -> Running -> ShuttingDown -> Terminated
//!     \            \
//!      +------------+-> Terminated (detach or bind failure, or delegated)
//! ```

use std::fmt;

use daemonize::Daemonize;
use nimf_core::{Error, Result};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

use crate::logging::LogSink;

/// Where the process is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Detached,
    Listening,
    Running,
    ShuttingDown,
    Terminated,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Starting => "starting",
            LifecycleState::Detached => "detached",
            LifecycleState::Listening => "listening",
            LifecycleState::Running => "running",
            LifecycleState::ShuttingDown => "shutting_down",
            LifecycleState::Terminated => "terminated",
        }
    }

    /// Check if a transition from this state to `next` is valid.
    pub fn can_advance_to(&self, next: LifecycleState) -> bool {
        use LifecycleState::*;

        matches!(
            (*self, next),
            (Starting, Detached)
                | (Starting, Listening)
                | (Detached, Listening)
                | (Listening, Running)
                | (Running, ShuttingDown)
                | (ShuttingDown, Terminated)
                | (Starting, Terminated)
                | (Detached, Terminated)
                | (Listening, Terminated)
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle of one process, owning the log sink until termination.
#[derive(Debug)]
pub struct Lifecycle {
    state: LifecycleState,
    log_sink: LogSink,
}

impl Lifecycle {
    pub fn new(log_sink: LogSink) -> Self {
        Self {
            state: LifecycleState::Starting,
            log_sink,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn log_sink(&self) -> LogSink {
        self.log_sink
    }

    /// Move to `next`, logging transitions the state machine does not allow.
    pub fn advance(&mut self, next: LifecycleState) {
        if !self.state.can_advance_to(next) {
            tracing::warn!("unexpected lifecycle transition {} -> {}", self.state, next);
        }
        tracing::debug!("lifecycle {} -> {}", self.state, next);
        self.state = next;
    }

    /// Detach from the controlling terminal and session.
    ///
    /// The parent process exits inside this call; only the daemon returns.
    /// Must run before any threads (including the tokio runtime) exist.
    pub fn detach(&mut self) -> Result<()> {
        Daemonize::new()
            .working_directory("/")
            .start()
            .map_err(|e| Error::Detach(e.to_string()))?;

        self.advance(LifecycleState::Detached);
        tracing::info!(pid = std::process::id(), "detached");
        Ok(())
    }

    /// Unwind to `Terminated` and release the log sink.
    pub fn finish(mut self, outcome: &Result<()>) {
        if self.state == LifecycleState::Running {
            self.advance(LifecycleState::ShuttingDown);
        }
        self.advance(LifecycleState::Terminated);

        match outcome {
            Ok(()) => tracing::info!("nimf-daemon stopped"),
            Err(e) => tracing::error!("{}", e),
        }
        // Neither sink holds anything to flush: stderr is unbuffered and
        // journald records are sent as individual datagrams.
        tracing::debug!(sink = ?self.log_sink, "closing log sink");
    }
}

/// Token cancelled by the first SIGINT or SIGTERM.
///
/// Must be called from within a tokio runtime. Handlers stay installed for
/// the rest of the process, so later signals are absorbed too.
pub fn shutdown_token() -> Result<CancellationToken> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => tracing::info!("received SIGINT, shutting down"),
            _ = terminate.recv() => tracing::info!("received SIGTERM, shutting down"),
        }
        trigger.cancel();
    });

    Ok(token)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
