// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Control server owned by the running instance.
//!
//! The server binds the control address for the lifetime of the instance and
//! answers control requests one connection at a time. A broken client only
//! costs its own connection; the accept loop keeps going until shutdown.

use std::io;
use std::time::Duration;

use nimf_core::{ControlAddress, Error, Result};
use nimf_ipc::{framing_async, ControlReply, ControlRequest, Message};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::indicator::Indicator;

/// Deadline for reading a request and writing its reply on one connection.
///
/// Kept well under the client's own deadline, so a request queued behind a
/// silent connection is still answered in time.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(1);

/// How often the accept loop polls the indicator, reaping it once it exits.
pub const INDICATOR_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Pause after a failed `accept` before trying again.
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// The listening side of the control channel.
pub struct Server<I: Indicator> {
    address: ControlAddress,
    listener: UnixListener,
    indicator: I,
}

impl<I: Indicator> Server<I> {
    /// Bind `address`. Fails if another instance already holds it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(address: &ControlAddress, indicator: I) -> Result<Self> {
        let listener = bind_listener(address).map_err(|source| Error::Bind {
            address: address.to_string(),
            source,
        })?;

        tracing::info!(address = %address, "listening");

        Ok(Self {
            address: address.clone(),
            listener,
            indicator,
        })
    }

    pub fn address(&self) -> &ControlAddress {
        &self.address
    }

    /// Finish startup, starting the indicator locally when asked to.
    pub fn start(&mut self, autostart_indicator: bool) {
        if autostart_indicator && !self.indicator.start() {
            tracing::warn!("indicator requested at startup but could not be started");
        }
    }

    /// Accept and answer control connections until `shutdown` is cancelled.
    ///
    /// Cancellation also interrupts a connection that is still being handled.
    pub async fn serve(&mut self, shutdown: CancellationToken) {
        let mut indicator_poll = tokio::time::interval(INDICATOR_POLL_INTERVAL);
        indicator_poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let accepted = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = indicator_poll.tick() => {
                    self.indicator.is_running();
                    continue;
                }
                result = self.listener.accept() => result,
            };

            let stream = match accepted {
                Ok((stream, _)) => stream,
                Err(e) => {
                    back_off_after_accept_error(e).await;
                    continue;
                }
            };

            let handled = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::debug!("dropping control connection for shutdown");
                    break;
                }
                result = self.handle_connection(stream) => result,
            };
            if let Err(e) = handled {
                tracing::warn!("control connection failed: {}", e);
            }
        }

        tracing::debug!(address = %self.address, "accept loop stopped");
    }

    async fn handle_connection(&mut self, mut stream: UnixStream) -> Result<()> {
        let request = tokio::time::timeout(
            CONNECTION_TIMEOUT,
            framing_async::read_message(&mut stream),
        )
        .await
        .map_err(|_| Error::Timeout(CONNECTION_TIMEOUT))??;

        let reply = self.dispatch(&request)?;
        let message = Message::from_reply(request.session_tag, &reply);

        tokio::time::timeout(
            CONNECTION_TIMEOUT,
            framing_async::write_message(&mut stream, &message),
        )
        .await
        .map_err(|_| Error::Timeout(CONNECTION_TIMEOUT))??;

        Ok(())
    }

    fn dispatch(&mut self, message: &Message) -> Result<ControlReply> {
        match ControlRequest::try_from(message)? {
            ControlRequest::StartIndicator => {
                let ok = self.indicator.start();
                tracing::info!(ok, "start-indicator requested by peer");
                Ok(ControlReply::StartIndicator { ok })
            }
        }
    }

    #[cfg(test)]
    pub fn indicator_mut(&mut self) -> &mut I {
        &mut self.indicator
    }
}

impl<I: Indicator> Drop for Server<I> {
    fn drop(&mut self) {
        self.indicator.stop();
        tracing::info!(address = %self.address, "released control address");
    }
}

async fn back_off_after_accept_error(err: io::Error) {
    tracing::warn!("failed to accept connection: {}", err);
    tokio::time::sleep(ACCEPT_BACKOFF).await;
}

fn bind_listener(address: &ControlAddress) -> io::Result<UnixListener> {
    let addr = address.socket_addr()?;
    let listener = std::os::unix::net::UnixListener::bind_addr(&addr)?;
    listener.set_nonblocking(true)?;
    UnixListener::from_std(listener)
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
