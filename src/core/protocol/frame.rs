//! Versioned v3 binary frame used by the streaming synthesis service.
//!
//! ```text
//! byte 0   version (4 bits) | header size in 32-bit words (4 bits)
//! byte 1   message type (4 bits) | flags (4 bits)
//! byte 2   serialization (4 bits) | compression (4 bits)
//! byte 3.. zero padding up to 4 * header size
//! [i32]    sequence            flags = POSITIVE_SEQ | NEGATIVE_SEQ
//! [i32]    event               flags = WITH_EVENT
//! [i32 +n] session id          WITH_EVENT, not ERROR, not a connection event
//! [i32]    error code          type = ERROR
//! i32 + n  payload
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::ProtocolError;

pub const PROTOCOL_VERSION: u8 = 0b0001;
pub const DEFAULT_HEADER_WORDS: u8 = 0b0001;
pub const SERIALIZATION_JSON: u8 = 0b0001;
pub const COMPRESSION_NONE: u8 = 0b0000;

/// Message type nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    FullClientRequest,
    AudioOnlyClient,
    FullServerResponse,
    AudioOnlyServer,
    Error,
    /// Any nibble this client does not interpret; kept so decoding never loses it.
    /// A known nibble wrapped here decodes as its named variant.
    Other(u8),
}

impl MessageType {
    #[inline]
    pub fn as_nibble(self) -> u8 {
        match self {
            Self::FullClientRequest => 0b0001,
            Self::AudioOnlyClient => 0b0010,
            Self::FullServerResponse => 0b1001,
            Self::AudioOnlyServer => 0b1011,
            Self::Error => 0b1111,
            Self::Other(nibble) => nibble & 0x0F,
        }
    }

    #[inline]
    pub fn from_nibble(nibble: u8) -> Self {
        match nibble & 0x0F {
            0b0001 => Self::FullClientRequest,
            0b0010 => Self::AudioOnlyClient,
            0b1001 => Self::FullServerResponse,
            0b1011 => Self::AudioOnlyServer,
            0b1111 => Self::Error,
            other => Self::Other(other),
        }
    }
}

/// Message type specific flags nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFlags {
    NoSeq,
    PositiveSeq,
    LastNoSeq,
    NegativeSeq,
    WithEvent,
}

impl MessageFlags {
    #[inline]
    pub fn as_nibble(self) -> u8 {
        match self {
            Self::NoSeq => 0b0000,
            Self::PositiveSeq => 0b0001,
            Self::LastNoSeq => 0b0010,
            Self::NegativeSeq => 0b0011,
            Self::WithEvent => 0b0100,
        }
    }

    pub fn from_nibble(nibble: u8) -> Result<Self, ProtocolError> {
        match nibble & 0x0F {
            0b0000 => Ok(Self::NoSeq),
            0b0001 => Ok(Self::PositiveSeq),
            0b0010 => Ok(Self::LastNoSeq),
            0b0011 => Ok(Self::NegativeSeq),
            0b0100 => Ok(Self::WithEvent),
            other => Err(ProtocolError::UnknownFlags(other)),
        }
    }

    /// Whether a sequence number follows the header.
    #[inline]
    pub fn has_sequence(self) -> bool {
        matches!(self, Self::PositiveSeq | Self::NegativeSeq)
    }
}

/// Event codes carried by `WITH_EVENT` frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    StartConnection,
    FinishConnection,
    ConnectionStarted,
    ConnectionFailed,
    ConnectionFinished,
    StartSession,
    FinishSession,
    SessionStarted,
    SessionCanceled,
    SessionFinished,
    SessionFailed,
    TtsSentenceStart,
    TtsSentenceEnd,
    TtsResponse,
    Other(i32),
}

impl EventType {
    pub fn code(self) -> i32 {
        match self {
            Self::StartConnection => 1,
            Self::FinishConnection => 2,
            Self::ConnectionStarted => 50,
            Self::ConnectionFailed => 51,
            Self::ConnectionFinished => 52,
            Self::StartSession => 100,
            Self::FinishSession => 102,
            Self::SessionStarted => 150,
            Self::SessionCanceled => 151,
            Self::SessionFinished => 152,
            Self::SessionFailed => 153,
            Self::TtsSentenceStart => 350,
            Self::TtsSentenceEnd => 351,
            Self::TtsResponse => 352,
            Self::Other(code) => code,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::StartConnection,
            2 => Self::FinishConnection,
            50 => Self::ConnectionStarted,
            51 => Self::ConnectionFailed,
            52 => Self::ConnectionFinished,
            100 => Self::StartSession,
            102 => Self::FinishSession,
            150 => Self::SessionStarted,
            151 => Self::SessionCanceled,
            152 => Self::SessionFinished,
            153 => Self::SessionFailed,
            350 => Self::TtsSentenceStart,
            351 => Self::TtsSentenceEnd,
            352 => Self::TtsResponse,
            other => Self::Other(other),
        }
    }

    /// Connection lifecycle events never carry a session id.
    #[inline]
    pub fn is_connection_event(self) -> bool {
        matches!(
            self,
            Self::StartConnection
                | Self::FinishConnection
                | Self::ConnectionStarted
                | Self::ConnectionFailed
                | Self::ConnectionFinished
        )
    }
}

/// One v3 protocol message
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub version: u8,
    /// Header length in 32-bit words; bytes beyond the first three are zero padding
    pub header_words: u8,
    pub message_type: MessageType,
    pub flags: MessageFlags,
    pub serialization: u8,
    pub compression: u8,
    pub sequence: Option<i32>,
    pub event: Option<EventType>,
    pub session_id: Option<String>,
    pub error_code: Option<i32>,
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame with the default header and an empty payload.
    pub fn new(message_type: MessageType, flags: MessageFlags) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            header_words: DEFAULT_HEADER_WORDS,
            message_type,
            flags,
            serialization: SERIALIZATION_JSON,
            compression: COMPRESSION_NONE,
            sequence: None,
            event: None,
            session_id: None,
            error_code: None,
            payload: Bytes::new(),
        }
    }

    /// `FULL_CLIENT_REQUEST` without sequence or event, as sent to start synthesis.
    pub fn full_client_request(payload: impl Into<Bytes>) -> Self {
        Self::new(MessageType::FullClientRequest, MessageFlags::NoSeq).with_payload(payload)
    }

    /// A `WITH_EVENT` frame. The session id is ignored for connection events.
    pub fn event(
        message_type: MessageType,
        event: EventType,
        session_id: Option<String>,
        payload: impl Into<Bytes>,
    ) -> Self {
        let mut frame = Self::new(message_type, MessageFlags::WithEvent).with_payload(payload);
        frame.event = Some(event);
        if frame.carries_session_id() {
            frame.session_id = session_id;
        }
        frame
    }

    pub fn error(code: i32, payload: impl Into<Bytes>) -> Self {
        let mut frame = Self::new(MessageType::Error, MessageFlags::NoSeq).with_payload(payload);
        frame.error_code = Some(code);
        frame
    }

    pub fn audio_only_server(sequence: i32, payload: impl Into<Bytes>) -> Self {
        let flags = if sequence < 0 {
            MessageFlags::NegativeSeq
        } else {
            MessageFlags::PositiveSeq
        };
        let mut frame = Self::new(MessageType::AudioOnlyServer, flags).with_payload(payload);
        frame.sequence = Some(sequence);
        frame
    }

    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Whether the session id field is part of this frame's layout.
    pub fn carries_session_id(&self) -> bool {
        self.flags == MessageFlags::WithEvent
            && self.message_type != MessageType::Error
            && !self.event.is_some_and(EventType::is_connection_event)
    }

    /// Serialize to wire bytes.
    ///
    /// Fields the flags or type call for but that are unset are written as zero:
    /// a missing sequence, event or error code decodes back as `Some(0)` (or
    /// `EventType::Other(0)`), and a session id slot with no id decodes as `None`.
    pub fn encode(&self) -> Bytes {
        let header_words = (self.header_words & 0x0F).max(1);
        let header_len = 4 * header_words as usize;
        let session_len = self.session_id.as_ref().map_or(0, String::len);

        let mut buf = BytesMut::with_capacity(header_len + 20 + session_len + self.payload.len());
        buf.put_u8((self.version & 0x0F) << 4 | header_words);
        buf.put_u8(self.message_type.as_nibble() << 4 | self.flags.as_nibble());
        buf.put_u8((self.serialization & 0x0F) << 4 | (self.compression & 0x0F));
        buf.put_bytes(0, header_len - 3);

        if self.flags.has_sequence() {
            buf.put_i32(self.sequence.unwrap_or(0));
        }

        if self.flags == MessageFlags::WithEvent {
            buf.put_i32(self.event.map_or(0, EventType::code));
            if self.carries_session_id() {
                let session_id = self.session_id.as_deref().unwrap_or("");
                buf.put_i32(session_id.len() as i32);
                buf.put_slice(session_id.as_bytes());
            }
        }

        if self.message_type == MessageType::Error {
            buf.put_i32(self.error_code.unwrap_or(0));
        }

        buf.put_i32(self.payload.len() as i32);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Parse wire bytes into a frame.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let mut reader = FrameReader::new(data);
        let fixed = reader.read_bytes(3)?;
        let (byte0, byte1, byte2) = (fixed[0], fixed[1], fixed[2]);

        let header_words = byte0 & 0x0F;
        if header_words == 0 {
            return Err(ProtocolError::InvalidHeader(
                "header size of zero words".to_string(),
            ));
        }
        reader.skip_to(4 * header_words as usize)?;

        let mut frame = Self::new(
            MessageType::from_nibble(byte1 >> 4),
            MessageFlags::from_nibble(byte1 & 0x0F)?,
        );
        frame.version = byte0 >> 4;
        frame.header_words = header_words;
        frame.serialization = byte2 >> 4;
        frame.compression = byte2 & 0x0F;

        if frame.flags.has_sequence() {
            frame.sequence = Some(reader.read_i32()?);
        }

        if frame.flags == MessageFlags::WithEvent {
            frame.event = Some(EventType::from_code(reader.read_i32()?));
            if frame.carries_session_id() {
                let len = reader.read_len()?;
                let raw = reader.read_bytes(len)?;
                if len > 0 {
                    let session_id = std::str::from_utf8(raw)
                        .map_err(|e| ProtocolError::InvalidSessionId(e.to_string()))?;
                    frame.session_id = Some(session_id.to_string());
                }
            }
        }

        if frame.message_type == MessageType::Error {
            frame.error_code = Some(reader.read_i32()?);
        }

        // Bare event frames may stop right after their optional fields.
        if reader.remaining() > 0 {
            let len = reader.read_len()?;
            frame.payload = Bytes::copy_from_slice(reader.read_bytes(len)?);
        }

        Ok(frame)
    }

    /// Payload decoded as UTF-8, replacing invalid sequences.
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Bounds-checked big-endian cursor over a received frame.
struct FrameReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn ensure(&self, needed: usize) -> Result<(), ProtocolError> {
        if self.remaining() < needed {
            return Err(ProtocolError::Truncated {
                offset: self.pos,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ProtocolError> {
        self.ensure(len)?;
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn skip_to(&mut self, offset: usize) -> Result<(), ProtocolError> {
        if offset > self.pos {
            self.read_bytes(offset - self.pos)?;
        }
        Ok(())
    }

    fn read_i32(&mut self) -> Result<i32, ProtocolError> {
        let raw = self.read_bytes(4)?;
        Ok(i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn read_len(&mut self) -> Result<usize, ProtocolError> {
        let len = self.read_i32()?;
        usize::try_from(len).map_err(|_| ProtocolError::InvalidLength(len as i64))
    }
}
