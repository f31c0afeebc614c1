// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for daemon unit tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::os::unix::net::UnixListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

use nimf_core::ControlAddress;
use nimf_ipc::{framing, Message, Verb};

static NEXT_ADDRESS: AtomicUsize = AtomicUsize::new(0);

/// Serializes tests that touch the process environment.
pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// An abstract address no other test (or test process) uses.
pub fn unique_address(tag: &str) -> ControlAddress {
    let n = NEXT_ADDRESS.fetch_add(1, Ordering::Relaxed);
    ControlAddress::from_name(format!(
        "nimf-test/{}/{}/{}",
        std::process::id(),
        tag,
        n
    ))
}

/// How a scripted peer reacts to the one connection it accepts.
#[derive(Debug, Clone)]
pub enum Peer {
    /// Read the request, then reply with this payload on the reply verb.
    Reply(Vec<u8>),
    /// Read the request, then send this message verbatim.
    Send(Message),
    /// Read the request and keep the connection open without replying.
    Hang(Duration),
    /// Accept and close immediately.
    Close,
}

/// Bind `address` and serve one connection on a background thread.
///
/// The join handle yields the request the peer received, if it read one.
pub fn spawn_peer(address: &ControlAddress, peer: Peer) -> JoinHandle<Option<Message>> {
    let listener = UnixListener::bind_addr(&address.socket_addr().unwrap()).unwrap();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        if matches!(peer, Peer::Close) {
            return None;
        }

        let request = framing::read_message(&mut stream).ok();
        match peer {
            Peer::Reply(payload) => {
                let tag = request.as_ref().map_or(0, |m| m.session_tag);
                let reply = Message::new(tag, Verb::StartIndicatorReply, payload);
                framing::write_message(&mut stream, &reply).unwrap();
            }
            Peer::Send(message) => framing::write_message(&mut stream, &message).unwrap(),
            Peer::Hang(duration) => std::thread::sleep(duration),
            Peer::Close => {}
        }
        request
    })
}
