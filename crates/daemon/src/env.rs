// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable access for the daemon.

use std::time::Duration;

pub mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

/// Value the daemon forces for `GTK_IM_MODULE`, so toolkit code loaded by the
/// daemon never tries to use nimf as its own input method.
pub const GTK_IM_MODULE_VALUE: &str = "gtk-im-context-simple";

/// Value the daemon forces for `GDK_BACKEND`.
pub const GDK_BACKEND_VALUE: &str = "x11";

/// Explicit control address name, if set and non-empty.
pub fn control_address() -> Option<String> {
    non_empty(names::NIMF_CONTROL_ADDRESS)
}

/// Control handshake timeout, if set to a positive number of milliseconds.
pub fn control_timeout() -> Option<Duration> {
    let raw = non_empty(names::NIMF_CONTROL_TIMEOUT_MS)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Some(Duration::from_millis(ms)),
        _ => {
            tracing::warn!(
                "ignoring {}={:?}: expected a positive number of milliseconds",
                names::NIMF_CONTROL_TIMEOUT_MS,
                raw
            );
            None
        }
    }
}

/// Indicator program followed by its arguments, if configured.
pub fn indicator_command() -> Option<Vec<String>> {
    let raw = non_empty(names::NIMF_INDICATOR_COMMAND)?;
    let parts: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}

/// Force the toolkit selection variables for this process and its children.
pub fn apply_toolkit_overrides() {
    std::env::set_var(names::GTK_IM_MODULE, GTK_IM_MODULE_VALUE);
    std::env::set_var(names::GDK_BACKEND, GDK_BACKEND_VALUE);
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
