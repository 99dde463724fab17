//! REPL wire format
//!
//! Requests are an 8-byte little-endian header `(length, type)` followed by
//! the form's UTF-8 text. Responses carry no framing at all; whatever
//! arrives before the timeout is the response.

use std::io;

use byteorder::{ByteOrder, WriteBytesExt, LE};

use crate::session::GameConnectionStatus;

pub const HEADER_LEN: usize = 8;

/// Message type the compiler treats as "evaluate this form".
pub const MESSAGE_TYPE_EVAL: u32 = 10;

/// Responses are read in a single call into a buffer of this size.
pub const RESPONSE_BUFFER_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub length: u32,
    pub message_type: u32,
}

impl RequestHeader {
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_LEN {
            return None;
        }
        Some(Self {
            length: LE::read_u32(&bytes[0..4]),
            message_type: LE::read_u32(&bytes[4..8]),
        })
    }
}

/// Header plus payload for one form.
pub fn encode_request(form: &str) -> io::Result<Vec<u8>> {
    let length = u32::try_from(form.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "form too long for REPL header"))?;

    let mut message = Vec::with_capacity(HEADER_LEN + form.len());
    message.write_u32::<LE>(length)?;
    message.write_u32::<LE>(MESSAGE_TYPE_EVAL)?;
    message.extend_from_slice(form.as_bytes());
    Ok(message)
}

/// `(ap-item-received! '<symbol>)`
pub fn item_received_form(symbol: &str) -> String {
    format!("(ap-item-received! '{})", symbol)
}

/// `(ap-set-connection-status! (ap-connection-status <status>))`
pub fn connection_status_form(status: GameConnectionStatus) -> String {
    format!(
        "(ap-set-connection-status! (ap-connection-status {}))",
        status.symbol()
    )
}
