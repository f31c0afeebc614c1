// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! nimf-core: Shared primitives for the nimf daemon.
//!
//! This crate provides the error type, login identity resolution, and the
//! per-user control channel address used by both the control client and the
//! running instance.

pub mod address;
pub mod error;
pub mod identity;

pub use address::{ControlAddress, BASE_ADDRESS};
pub use error::{Error, Result};
pub use identity::{resolve_uid, IdentitySource, SystemIdentity};
