// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Login identity resolution.
//!
//! The control channel is scoped to the user who logged in, not to whoever
//! the process happens to run as. The audit subsystem records that identity
//! in `/proc/self/loginuid`; when it is unavailable the real UID is used.

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;

use std::fs;
use std::path::Path;

/// Where the kernel audit subsystem exposes the login UID of this process.
pub const LOGIN_UID_PATH: &str = "/proc/self/loginuid";

/// `(uid_t) -1`, written by the kernel when no login UID was ever set.
const UNSET_LOGIN_UID: u32 = u32::MAX;

/// Source of the identities used to derive the control address.
pub trait IdentitySource {
    /// Login UID reported by the audit subsystem, if any.
    fn login_uid(&self) -> Option<u32>;

    /// Real UID of the calling process.
    fn real_uid(&self) -> u32;
}

/// Identity of the running process, as reported by the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

impl IdentitySource for SystemIdentity {
    fn login_uid(&self) -> Option<u32> {
        read_login_uid(Path::new(LOGIN_UID_PATH))
    }

    fn real_uid(&self) -> u32 {
        nix::unistd::getuid().as_raw()
    }
}

/// Returns the login UID, falling back to the real UID when it is unset.
pub fn resolve_uid<S: IdentitySource + ?Sized>(source: &S) -> u32 {
    source.login_uid().unwrap_or_else(|| source.real_uid())
}

fn read_login_uid(path: &Path) -> Option<u32> {
    let contents = fs::read_to_string(path).ok()?;
    parse_login_uid(&contents)
}

fn parse_login_uid(contents: &str) -> Option<u32> {
    contents
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|uid| *uid != UNSET_LOGIN_UID)
}
