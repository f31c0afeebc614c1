// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line surface of `nimf-daemon`.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "nimf-daemon")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(disable_version_flag = true)]
#[command(about = "Nimf input method daemon")]
// Allow the unit type field pattern which is required for clap's ArgAction::Version
#[allow(clippy::manual_non_exhaustive)]
pub struct Cli {
    /// Do not daemonize
    #[arg(long)]
    pub no_daemon: bool,

    /// Log debugging messages
    #[arg(long)]
    pub debug: bool,

    /// Start the indicator, asking a running instance first
    #[arg(long)]
    pub start_indicator: bool,

    /// Print version
    #[arg(long = "version", action = clap::ArgAction::Version)]
    version: (),
}

/// Options that drive one bootstrap run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Stay attached to the terminal and log to stderr.
    pub foreground: bool,
    pub debug: bool,
    pub start_indicator: bool,
}

impl Cli {
    pub fn options(&self) -> Options {
        Options {
            foreground: self.no_daemon,
            debug: self.debug,
            start_indicator: self.start_indicator,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
