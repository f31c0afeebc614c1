// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Control channel protocol for nimf-daemon.
//!
//! This crate defines the message model and framing used between a
//! short-lived `nimf-daemon` invocation and the running instance. A frame is a
//! fixed 8-byte header followed by an opaque payload:
//!
//! - 2 bytes: session tag (big-endian u16, 0 = no session)
//! - 2 bytes: verb (big-endian u16)
//! - 4 bytes: payload length (big-endian u32)
//! - N bytes: payload
//!
//! There is no version negotiation: both ends are always the same build.

use std::fmt;

use nimf_core::{Error, Result};

/// Maximum payload size (64 KiB) to bound memory on malformed headers.
pub const MAX_PAYLOAD_SIZE: usize = 64 * 1024;

/// Size of the fixed frame header.
pub const HEADER_LEN: usize = 8;

/// Session tag used by requests that do not belong to an input session.
pub const NO_SESSION: u16 = 0;

/// Operation carried by a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Verb {
    /// Ask the instance to start the indicator. Empty payload.
    StartIndicator = 1,
    /// Answer to [`Verb::StartIndicator`]. One boolean byte.
    StartIndicatorReply = 2,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::StartIndicator => "start-indicator",
            Verb::StartIndicatorReply => "start-indicator-reply",
        }
    }

    pub fn code(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for Verb {
    type Error = Error;

    fn try_from(code: u16) -> Result<Self> {
        match code {
            1 => Ok(Verb::StartIndicator),
            2 => Ok(Verb::StartIndicatorReply),
            other => Err(Error::UnknownVerb(other)),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One unit of exchange on the control channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub session_tag: u16,
    pub verb: Verb,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn new(session_tag: u16, verb: Verb, payload: Vec<u8>) -> Self {
        Self {
            session_tag,
            verb,
            payload,
        }
    }

    pub fn from_request(session_tag: u16, request: &ControlRequest) -> Self {
        match request {
            ControlRequest::StartIndicator => {
                Self::new(session_tag, Verb::StartIndicator, Vec::new())
            }
        }
    }

    pub fn from_reply(session_tag: u16, reply: &ControlReply) -> Self {
        match reply {
            ControlReply::StartIndicator { ok } => {
                Self::new(session_tag, Verb::StartIndicatorReply, vec![u8::from(*ok)])
            }
        }
    }

    /// Encode the fixed header for this message.
    pub fn header(&self) -> Result<[u8; HEADER_LEN]> {
        if self.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::FrameTooLarge {
                len: self.payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        // Bounded by MAX_PAYLOAD_SIZE above, so this cannot truncate.
        let len = self.payload.len() as u32;

        let mut header = [0u8; HEADER_LEN];
        header[0..2].copy_from_slice(&self.session_tag.to_be_bytes());
        header[2..4].copy_from_slice(&self.verb.code().to_be_bytes());
        header[4..8].copy_from_slice(&len.to_be_bytes());
        Ok(header)
    }
}

/// Decoded frame header, validated before the payload is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub session_tag: u16,
    pub verb: Verb,
    pub payload_len: usize,
}

impl Header {
    pub fn decode(bytes: &[u8; HEADER_LEN]) -> Result<Self> {
        let session_tag = u16::from_be_bytes([bytes[0], bytes[1]]);
        let verb = Verb::try_from(u16::from_be_bytes([bytes[2], bytes[3]]))?;
        let payload_len = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;

        if payload_len > MAX_PAYLOAD_SIZE {
            return Err(Error::FrameTooLarge {
                len: payload_len,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        Ok(Self {
            session_tag,
            verb,
            payload_len,
        })
    }
}

/// Requests a client may send to the running instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    /// Start the indicator.
    StartIndicator,
}

impl TryFrom<&Message> for ControlRequest {
    type Error = Error;

    fn try_from(message: &Message) -> Result<Self> {
        match message.verb {
            Verb::StartIndicator => {
                if !message.payload.is_empty() {
                    return Err(Error::MalformedPayload {
                        verb: Verb::StartIndicator.as_str(),
                        reason: format!("expected empty payload, got {} bytes", message.payload.len()),
                    });
                }
                Ok(ControlRequest::StartIndicator)
            }
            other => Err(Error::UnexpectedVerb {
                expected: "a request",
                actual: other.as_str(),
            }),
        }
    }
}

/// Replies the instance sends back, one shape per verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlReply {
    /// Whether the indicator is now running.
    StartIndicator { ok: bool },
}

impl TryFrom<&Message> for ControlReply {
    type Error = Error;

    fn try_from(message: &Message) -> Result<Self> {
        match message.verb {
            Verb::StartIndicatorReply => match message.payload.as_slice() {
                [0] => Ok(ControlReply::StartIndicator { ok: false }),
                [1] => Ok(ControlReply::StartIndicator { ok: true }),
                [other] => Err(Error::MalformedPayload {
                    verb: Verb::StartIndicatorReply.as_str(),
                    reason: format!("invalid boolean byte {other:#04x}"),
                }),
                bytes => Err(Error::MalformedPayload {
                    verb: Verb::StartIndicatorReply.as_str(),
                    reason: format!("expected 1 byte, got {}", bytes.len()),
                }),
            },
            other => Err(Error::UnexpectedVerb {
                expected: Verb::StartIndicatorReply.as_str(),
                actual: other.as_str(),
            }),
        }
    }
}

/// Blocking framing over `std::io`.
pub mod framing {
    use std::io::{Read, Write};

    use super::*;

    /// Write a message to the given writer.
    pub fn write_message<W: Write>(writer: &mut W, message: &Message) -> Result<()> {
        let header = message.header()?;
        writer.write_all(&header)?;
        writer.write_all(&message.payload)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a full message from the given reader.
    pub fn read_message<R: Read>(reader: &mut R) -> Result<Message> {
        let mut header_buf = [0u8; HEADER_LEN];
        reader.read_exact(&mut header_buf)?;
        let header = Header::decode(&header_buf)?;

        let mut payload = vec![0u8; header.payload_len];
        reader.read_exact(&mut payload)?;

        Ok(Message::new(header.session_tag, header.verb, payload))
    }
}

/// Non-blocking framing over tokio streams, used by the running instance.
pub mod framing_async {
    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

    use super::*;

    /// Write a message to the given writer.
    pub async fn write_message<W: AsyncWrite + Unpin>(
        writer: &mut W,
        message: &Message,
    ) -> Result<()> {
        let header = message.header()?;
        writer.write_all(&header).await?;
        writer.write_all(&message.payload).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Read a full message from the given reader.
    pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Message> {
        let mut header_buf = [0u8; HEADER_LEN];
        reader.read_exact(&mut header_buf).await?;
        let header = Header::decode(&header_buf)?;

        let mut payload = vec![0u8; header.payload_len];
        reader.read_exact(&mut payload).await?;

        Ok(Message::new(header.session_tag, header.verb, payload))
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
