//! Fixed-header chunk format used by one-shot recognition.
//!
//! Every client chunk is `{0x11, type, 0x11, 0x00}` followed by a big-endian
//! length and a gzip-compressed payload. Server frames reuse the same header
//! shape; only "full server response" frames carry a JSON result.

use bytes::{BufMut, Bytes, BytesMut};
use serde::Deserialize;

use super::ProtocolError;
use super::compression::{gzip_compress, gzip_decompress};

/// Status code reported by the server for a successful response.
pub const ASR_SUCCESS_CODE: i32 = 1000;

const HEADER_VERSION: u8 = 0x11;
const HEADER_SERIALIZATION: u8 = 0x11;
const FULL_SERVER_RESPONSE: u8 = 0b1001;
const GZIP_COMPRESSION: u8 = 0b0001;

/// Client chunk kinds and their header type byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyChunkKind {
    Parameters,
    Audio,
    LastAudio,
}

impl LegacyChunkKind {
    #[inline]
    pub fn type_byte(self) -> u8 {
        match self {
            Self::Parameters => 0x10,
            Self::Audio => 0x20,
            Self::LastAudio => 0x22,
        }
    }
}

/// One entry of the recognition result list
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AsrResultItem {
    #[serde(default)]
    pub text: String,
}

/// Recognition server response
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AsrResponse {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    /// Negative on the final response
    #[serde(default)]
    pub sequence: i32,
    #[serde(default)]
    pub result: Option<Vec<AsrResultItem>>,
}

impl AsrResponse {
    #[inline]
    pub fn is_error(&self) -> bool {
        self.code != ASR_SUCCESS_CODE
    }

    #[inline]
    pub fn is_final(&self) -> bool {
        self.sequence < 0
    }

    /// Text of the first result, or an empty string when nothing was recognized.
    pub fn first_text(&self) -> &str {
        self.result
            .as_deref()
            .and_then(|items| items.first())
            .map_or("", |item| item.text.as_str())
    }
}

fn encode_chunk(kind: LegacyChunkKind, payload: &[u8]) -> Result<Bytes, ProtocolError> {
    let compressed = gzip_compress(payload)?;
    let mut buf = BytesMut::with_capacity(8 + compressed.len());
    buf.put_slice(&[HEADER_VERSION, kind.type_byte(), HEADER_SERIALIZATION, 0x00]);
    buf.put_i32(compressed.len() as i32);
    buf.put_slice(&compressed);
    Ok(buf.freeze())
}

/// Encode the JSON parameter chunk that opens a recognition session.
pub fn encode_param(json: &[u8]) -> Result<Bytes, ProtocolError> {
    encode_chunk(LegacyChunkKind::Parameters, json)
}

/// Encode one audio chunk; `is_last` marks the end of the audio stream.
pub fn encode_audio_chunk(audio: &[u8], is_last: bool) -> Result<Bytes, ProtocolError> {
    let kind = if is_last {
        LegacyChunkKind::LastAudio
    } else {
        LegacyChunkKind::Audio
    };
    encode_chunk(kind, audio)
}

/// Decode a server frame.
///
/// Returns `Ok(None)` for frames that are not full server responses.
pub fn decode_server_frame(data: &[u8]) -> Result<Option<AsrResponse>, ProtocolError> {
    if data.len() < 4 {
        return Ok(None);
    }

    let header_len = ((data[0] & 0x0F) as usize) << 2;
    let message_type = data[1] >> 4;
    let compression = data[2] & 0x0F;

    if message_type != FULL_SERVER_RESPONSE {
        return Ok(None);
    }

    let size_end = header_len + 4;
    if data.len() < size_end {
        return Err(ProtocolError::Truncated {
            offset: header_len,
            needed: 4,
            available: data.len().saturating_sub(header_len),
        });
    }

    let raw_len = i32::from_be_bytes([
        data[header_len],
        data[header_len + 1],
        data[header_len + 2],
        data[header_len + 3],
    ]);
    let payload_len =
        usize::try_from(raw_len).map_err(|_| ProtocolError::InvalidLength(raw_len as i64))?;
    let payload = data
        .get(size_end..size_end + payload_len)
        .ok_or(ProtocolError::Truncated {
            offset: size_end,
            needed: payload_len,
            available: data.len() - size_end,
        })?;

    let json = if compression == GZIP_COMPRESSION {
        gzip_decompress(payload)?
    } else {
        payload.to_vec()
    };
    let response: AsrResponse =
        serde_json::from_slice(&json).map_err(|e| ProtocolError::Json(e.to_string()))?;

    Ok(Some(response))
}

/// Split audio into fixed-size chunks, flagging the final one.
///
/// Empty input yields no chunks.
pub fn split_audio(audio: &[u8], chunk_size: usize) -> impl Iterator<Item = (&[u8], bool)> {
    let chunk_size = chunk_size.max(1);
    let count = audio.len().div_ceil(chunk_size);
    audio
        .chunks(chunk_size)
        .enumerate()
        .map(move |(index, chunk)| (chunk, index + 1 == count))
}
