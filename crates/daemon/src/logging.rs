// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide log sink setup.
//!
//! A foreground daemon logs to stderr. A detached daemon has no terminal, so
//! it logs to the system journal instead, tagged with the program name.

use nimf_core::{Error, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::env::names;

/// Identifier the journal files our records under.
pub const SYSLOG_IDENTIFIER: &str = "nimf-daemon";

/// Filter used when `--debug` is given, regardless of `RUST_LOG`.
const DEBUG_DIRECTIVES: &str = "info,nimf_daemon=debug,nimf_core=debug,nimf_ipc=debug";

/// Where diagnostic output goes for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    Journald,
}

impl LogSink {
    /// Sink for a daemon that stays in the foreground or detaches.
    pub fn for_mode(foreground: bool) -> Self {
        if foreground {
            LogSink::Stderr
        } else {
            LogSink::Journald
        }
    }
}

/// Install the global subscriber for `sink`.
pub fn init(sink: LogSink, debug: bool) -> Result<LogSink> {
    let filter = env_filter(debug);

    match sink {
        LogSink::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| Error::LogSink(e.to_string()))?,
        LogSink::Journald => {
            let journald = tracing_journald::layer()
                .map_err(|e| Error::LogSink(format!("journald unavailable: {}", e)))?
                .with_syslog_identifier(SYSLOG_IDENTIFIER.to_string());
            tracing_subscriber::registry()
                .with(filter)
                .with(journald)
                .try_init()
                .map_err(|e| Error::LogSink(e.to_string()))?
        }
    }

    Ok(sink)
}

fn env_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new(DEBUG_DIRECTIVES)
    } else {
        EnvFilter::try_from_env(names::RUST_LOG).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
