// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::os::unix::net::{UnixListener, UnixStream};
use std::process::{Child, ExitStatus, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use assert_cmd::Command;
use nimf_core::ControlAddress;
use nix::sys::signal::{kill, Signal};
use nix::sys::socket::{getsockopt, sockopt::PeerCredentials};
use nix::unistd::Pid;

pub use predicates::prelude::*;

/// Path to the binary under test.
pub fn bin_path() -> &'static str {
    env!("CARGO_BIN_EXE_nimf-daemon")
}

pub fn nimfd() -> Command {
    Command::new(bin_path())
}

static NEXT_ADDRESS: AtomicUsize = AtomicUsize::new(0);

/// An abstract address name no other test uses.
pub fn unique_address(tag: &str) -> String {
    let n = NEXT_ADDRESS.fetch_add(1, Ordering::Relaxed);
    format!("nimf-it/{}/{}/{}", std::process::id(), tag, n)
}

/// Whether something is currently accepting connections on `address`.
pub fn is_listening(address: &str) -> bool {
    let addr = ControlAddress::from_name(address).socket_addr().unwrap();
    UnixStream::connect_addr(&addr).is_ok()
}

/// Whether `address` can be bound right now.
pub fn is_free(address: &str) -> bool {
    let addr = ControlAddress::from_name(address).socket_addr().unwrap();
    UnixListener::bind_addr(&addr).is_ok()
}

/// Poll until `address` accepts connections.
pub fn wait_for_listener(address: &str, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if is_listening(address) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

/// Poll until nothing holds `address` any more.
pub fn wait_until_free(address: &str, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if is_free(address) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

/// PID of the process listening on `address`, from the peer credentials.
pub fn listener_pid(address: &str) -> Pid {
    let addr = ControlAddress::from_name(address).socket_addr().unwrap();
    let stream = UnixStream::connect_addr(&addr).unwrap();
    let creds = getsockopt(&stream, PeerCredentials).unwrap();
    Pid::from_raw(creds.pid())
}

/// Wait for a child to exit, killing it if it outlives `timeout`.
pub fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Option<ExitStatus> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) => {
                if start.elapsed() > timeout {
                    // Kill and return None to indicate timeout
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(_) => return None,
        }
    }
}

/// A foreground instance running on a private address.
pub struct Instance {
    pub address: String,
    pub child: Child,
}

impl Instance {
    /// Start `nimf-daemon --no-daemon` with `args` and wait until it listens.
    pub fn start(tag: &str, args: &[&str]) -> Self {
        Self::start_with_indicator(tag, "sleep 30", args)
    }

    /// Like [`Instance::start`], with a custom indicator command.
    pub fn start_with_indicator(tag: &str, indicator: &str, args: &[&str]) -> Self {
        let address = unique_address(tag);
        let child = std::process::Command::new(bin_path())
            .arg("--no-daemon")
            .args(args)
            .env("NIMF_CONTROL_ADDRESS", &address)
            .env("NIMF_INDICATOR_COMMAND", indicator)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to spawn nimf-daemon");

        let instance = Self { address, child };
        assert!(
            wait_for_listener(&instance.address, Duration::from_secs(10)),
            "instance never started listening"
        );
        instance
    }

    pub fn signal(&self, signal: Signal) {
        let pid = Pid::from_raw(i32::try_from(self.child.id()).unwrap());
        kill(pid, signal).unwrap();
    }

    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Invocation of the binary pointed at this instance's address.
    pub fn invoke(&self) -> Command {
        let mut cmd = nimfd();
        cmd.env("NIMF_CONTROL_ADDRESS", &self.address)
            .env("NIMF_INDICATOR_COMMAND", "sleep 30")
            .timeout(Duration::from_secs(10));
        cmd
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
