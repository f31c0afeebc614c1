// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for nimf operations.

use std::time::Duration;

use thiserror::Error;

/// All possible errors that can occur while bootstrapping or talking to the daemon.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("message too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    #[error("unknown message verb: {0}")]
    UnknownVerb(u16),

    #[error("malformed {verb} payload: {reason}")]
    MalformedPayload { verb: &'static str, reason: String },

    #[error("unexpected {actual} message, expected {expected}")]
    UnexpectedVerb {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("control handshake timed out after {}ms\n  hint: the running instance accepted the connection but never replied", .0.as_millis())]
    Timeout(Duration),

    #[error("failed to bind control address {address}: {source}\n  hint: another nimf-daemon instance is probably running")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't daemonize: {0}")]
    Detach(String),

    #[error("failed to open log sink: {0}")]
    LogSink(String),
}

impl Error {
    /// Returns true for malformed or inconsistent frames.
    ///
    /// Protocol errors are fatal to the one exchange they occurred in, not to
    /// the process that observed them.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Error::FrameTooLarge { .. }
                | Error::UnknownVerb(_)
                | Error::MalformedPayload { .. }
                | Error::UnexpectedVerb { .. }
        )
    }
}

/// A specialized Result type for nimf operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
