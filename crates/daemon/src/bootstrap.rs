// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connect-or-bootstrap: decide whether this invocation delegates to a
//! running instance or becomes the instance itself.
//!
//! A running peer is always asked before binding, so two invocations rarely
//! race for the address. When they do, the OS rejects the second bind and
//! that invocation fails; there is no retry.

use nimf_core::{ControlAddress, Result};

use crate::cli::Options;
use crate::client::{ControlClient, DEFAULT_TIMEOUT};
use crate::env;
use crate::indicator::ProcessIndicator;
use crate::lifecycle::{self, Lifecycle, LifecycleState};
use crate::logging::{self, LogSink};
use crate::server::Server;

/// Outcome of the bootstrap decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// A running instance accepted the request; nothing else to do.
    Delegated,
    /// No usable peer: bind the address and serve.
    BecomeInstance {
        /// Start the indicator locally since no peer did.
        autostart_indicator: bool,
    },
}

/// Ask a peer to start the indicator when requested, and decide what to do next.
pub fn decide(client: &ControlClient, start_indicator: bool) -> Result<Decision> {
    if start_indicator && client.request_start_indicator()? {
        return Ok(Decision::Delegated);
    }

    Ok(Decision::BecomeInstance {
        autostart_indicator: start_indicator,
    })
}

/// The control address for this invocation.
pub fn control_address() -> ControlAddress {
    match env::control_address() {
        Some(name) => ControlAddress::from_name(name),
        None => ControlAddress::compute(),
    }
}

/// Run one invocation of the daemon to completion.
pub fn run(options: Options) -> Result<()> {
    let log_sink = logging::init(LogSink::for_mode(options.foreground), options.debug)?;
    let mut lifecycle = Lifecycle::new(log_sink);
    tracing::debug!(sink = ?lifecycle.log_sink(), "log sink open");

    let outcome = run_with(&mut lifecycle, options);
    lifecycle.finish(&outcome);
    outcome
}

fn run_with(lifecycle: &mut Lifecycle, options: Options) -> Result<()> {
    if !options.foreground {
        lifecycle.detach()?;
    }

    let address = control_address();
    let client = ControlClient::new(address.clone())
        .with_timeout(env::control_timeout().unwrap_or(DEFAULT_TIMEOUT));

    let autostart_indicator = match decide(&client, options.start_indicator)? {
        Decision::Delegated => {
            tracing::info!(address = %client.address(), "running instance started the indicator");
            return Ok(());
        }
        Decision::BecomeInstance {
            autostart_indicator,
        } => autostart_indicator,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(serve(lifecycle, &address, autostart_indicator))
}

async fn serve(
    lifecycle: &mut Lifecycle,
    address: &ControlAddress,
    autostart_indicator: bool,
) -> Result<()> {
    // Install handlers before binding so a signal sent as soon as the address
    // is visible is not lost.
    let shutdown = lifecycle::shutdown_token()?;

    let mut server = Server::bind(address, ProcessIndicator::from_env())?;
    lifecycle.advance(LifecycleState::Listening);

    server.start(autostart_indicator);
    lifecycle.advance(LifecycleState::Running);
    tracing::info!(address = %server.address(), pid = std::process::id(), "nimf-daemon running");

    server.serve(shutdown).await;

    lifecycle.advance(LifecycleState::ShuttingDown);
    drop(server);
    Ok(())
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
