//! Wire formats for the speech services.
//!
//! Two incompatible binary layouts live here side by side:
//!
//! - [`frame`]: the versioned v3 frame used by streaming synthesis. Header fields are
//!   bit-packed nibbles followed by optional sequence, event, session id and error code
//!   fields, then a length-prefixed payload.
//! - [`legacy`]: the fixed 4-byte-header chunk used by one-shot recognition, with a
//!   gzip-compressed payload and no optional fields.
//!
//! Both share the gzip adapter in [`compression`]. All multi-byte integers are
//! big-endian.

pub mod compression;
pub mod frame;
pub mod legacy;

pub use compression::{gzip_compress, gzip_decompress};
pub use frame::{EventType, Frame, MessageFlags, MessageType};
pub use legacy::{AsrResponse, AsrResultItem, LegacyChunkKind, split_audio};

use super::error::SpeechError;

/// Errors raised while encoding or decoding wire frames
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    #[error("frame too short: need {needed} bytes at offset {offset}, have {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("unknown message flags: {0:#06b}")]
    UnknownFlags(u8),

    #[error("invalid length field: {0}")]
    InvalidLength(i64),

    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("compression error: {0}")]
    Compression(String),

    #[error("payload is not valid JSON: {0}")]
    Json(String),
}

impl From<ProtocolError> for SpeechError {
    fn from(err: ProtocolError) -> Self {
        SpeechError::ProtocolDecode(err.to_string())
    }
}
