// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Control client for asking a running instance to act.
//!
//! Each request opens its own connection, sends one message, reads one
//! reply and drops the connection. A missing peer is not an error: it is how
//! a fresh invocation learns that it has to become the instance.

use std::io;
use std::os::unix::net::UnixStream;
use std::time::Duration;

use nimf_core::{ControlAddress, Error, Result};
use nimf_ipc::{framing, ControlReply, ControlRequest, Message, NO_SESSION};

/// Default deadline for each read and write of the handshake.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A one-shot client for the instance listening on `address`.
#[derive(Debug, Clone)]
pub struct ControlClient {
    address: ControlAddress,
    timeout: Duration,
}

impl ControlClient {
    pub fn new(address: ControlAddress) -> Self {
        Self {
            address,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound how long a peer may take to read the request or send the reply.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        // Socket timeouts reject zero.
        self.timeout = timeout.max(Duration::from_millis(1));
        self
    }

    pub fn address(&self) -> &ControlAddress {
        &self.address
    }

    #[cfg(test)]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the running instance to start the indicator.
    ///
    /// Returns `Ok(false)` when nobody is listening, and the peer's answer
    /// otherwise. A peer that accepts but breaks the exchange is an error.
    pub fn request_start_indicator(&self) -> Result<bool> {
        let Some(mut stream) = self.connect()? else {
            return Ok(false);
        };

        match self.request(&mut stream, ControlRequest::StartIndicator)? {
            ControlReply::StartIndicator { ok } => {
                tracing::debug!(address = %self.address, ok, "indicator request answered");
                Ok(ok)
            }
        }
    }

    fn connect(&self) -> Result<Option<UnixStream>> {
        let addr = self.address.socket_addr()?;

        let stream = match UnixStream::connect_addr(&addr) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::debug!(address = %self.address, "no running instance: {}", e);
                return Ok(None);
            }
        };

        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        Ok(Some(stream))
    }

    fn request(&self, stream: &mut UnixStream, request: ControlRequest) -> Result<ControlReply> {
        let message = Message::from_request(NO_SESSION, &request);
        framing::write_message(stream, &message).map_err(|e| self.classify(e))?;

        let reply = framing::read_message(stream).map_err(|e| self.classify(e))?;
        ControlReply::try_from(&reply)
    }

    /// Socket timeouts surface as `WouldBlock` or `TimedOut` depending on the platform.
    fn classify(&self, err: Error) -> Error {
        match err {
            Error::Io(e)
                if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
            {
                Error::Timeout(self.timeout)
            }
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
