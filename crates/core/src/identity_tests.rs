// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

struct FixedIdentity {
    login: Option<u32>,
    real: u32,
}

impl IdentitySource for FixedIdentity {
    fn login_uid(&self) -> Option<u32> {
        self.login
    }

    fn real_uid(&self) -> u32 {
        self.real
    }
}

#[parameterized(
    plain = { "1000", Some(1000) },
    trailing_newline = { "1000\n", Some(1000) },
    root = { "0", Some(0) },
    unset = { "4294967295", None },
    empty = { "", None },
    garbage = { "not-a-uid", None },
    negative = { "-1", None },
)]
fn parse_login_uid_values(contents: &str, expected: Option<u32>) {
    assert_eq!(parse_login_uid(contents), expected);
}

#[test]
fn resolve_prefers_login_uid() {
    let source = FixedIdentity {
        login: Some(1000),
        real: 0,
    };
    assert_eq!(resolve_uid(&source), 1000);
}

#[test]
fn resolve_falls_back_to_real_uid() {
    let source = FixedIdentity {
        login: None,
        real: 1001,
    };
    assert_eq!(resolve_uid(&source), 1001);
}

#[test]
fn read_login_uid_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loginuid");
    std::fs::write(&path, "1234").unwrap();
    assert_eq!(read_login_uid(&path), Some(1234));
}

#[test]
fn read_login_uid_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(read_login_uid(&dir.path().join("missing")), None);
}

#[test]
fn system_identity_matches_process() {
    let uid = resolve_uid(&SystemIdentity);
    match SystemIdentity.login_uid() {
        Some(login) => assert_eq!(uid, login),
        None => assert_eq!(uid, nix::unistd::getuid().as_raw()),
    }
}
