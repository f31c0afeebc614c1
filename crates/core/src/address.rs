// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-user control channel address.
//!
//! The address lives in the Linux abstract socket namespace, so it never
//! touches the filesystem and disappears with the last socket bound to it.

#[cfg(test)]
#[path = "address_tests.rs"]
mod tests;

use std::fmt;
use std::io;
use std::os::unix::net::SocketAddr;

use crate::identity::{resolve_uid, IdentitySource, SystemIdentity};

/// Prefix of every control address. Bump the version when the wire format changes.
pub const BASE_ADDRESS: &str = "nimf/control/v1/";

/// Name of the abstract socket the instance for one login identity listens on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlAddress {
    name: String,
}

impl ControlAddress {
    /// Address for the login identity of the current process.
    pub fn compute() -> Self {
        Self::compute_with(&SystemIdentity)
    }

    /// Address for the identity reported by `source`.
    pub fn compute_with<S: IdentitySource + ?Sized>(source: &S) -> Self {
        Self::for_uid(resolve_uid(source))
    }

    pub fn for_uid(uid: u32) -> Self {
        Self {
            name: format!("{BASE_ADDRESS}{uid}"),
        }
    }

    /// Use an explicit abstract name instead of the computed one.
    pub fn from_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve to a socket address in the abstract namespace.
    pub fn socket_addr(&self) -> io::Result<SocketAddr> {
        use std::os::linux::net::SocketAddrExt;

        SocketAddr::from_abstract_name(self.name.as_bytes())
    }
}

impl fmt::Display for ControlAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `@` is how ss(8) and friends print abstract names.
        write!(f, "@{}", self.name)
    }
}
