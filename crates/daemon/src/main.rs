// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! nimf-daemon - The nimf input method daemon.
//!
//! Runs at most once per login identity. The instance listens on an abstract
//! Unix socket named after the user's login UID; later invocations connect
//! to it to ask for the indicator instead of starting a second instance.
//!
//! Usage:
//!   nimf-daemon [--no-daemon] [--debug] [--start-indicator]

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;

mod bootstrap;
mod cli;
mod client;
mod env;
mod indicator;
mod lifecycle;
mod logging;
mod server;

#[cfg(test)]
mod test_helpers;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    env::apply_toolkit_overrides();

    if let Err(e) = bootstrap::run(cli.options()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
