//! Streaming synthesis over the v3 event frame protocol.

use bytes::{Bytes, BytesMut};
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::TtsConfig;
use super::messages::{FailurePayload, TtsRequest};
use crate::core::error::{SpeechError, SpeechResult};
use crate::core::protocol::{EventType, Frame, MessageType};
use crate::core::session::{Completion, SegmentedProtocol, build_request, run_session};

/// Frame sent once the server reports the session finished.
pub fn finish_connection_frame() -> Bytes {
    Frame::event(
        MessageType::FullClientRequest,
        EventType::FinishConnection,
        None,
        Bytes::new(),
    )
    .encode()
}

/// One synthesis exchange: a single request frame, then streamed audio until
/// the session finishes.
#[derive(Debug)]
pub struct SynthesisSession {
    config: TtsConfig,
    request_id: String,
    text: String,
    instruction: String,
    audio: BytesMut,
    audio_frames: usize,
}

impl SynthesisSession {
    /// Prepare a session. Blank text is rejected before any connection is made.
    pub fn new(
        config: TtsConfig,
        text: impl Into<String>,
        instruction: impl Into<String>,
    ) -> SpeechResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SpeechError::InvalidInput(
                "text for synthesis is empty".to_string(),
            ));
        }

        Ok(Self {
            config,
            request_id: Uuid::new_v4().to_string(),
            text,
            instruction: instruction.into(),
            audio: BytesMut::new(),
            audio_frames: 0,
        })
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Run the exchange.
    ///
    /// Returns `None` when the server finished without sending any audio.
    pub async fn run(self) -> SpeechResult<Option<Vec<u8>>> {
        let timeout = self.config.timeout;
        info!(
            "Starting TTS session {} ({} chars, voice {})",
            self.request_id,
            self.text.chars().count(),
            self.config.speaker
        );
        run_session(self, timeout).await
    }

    fn finished(&mut self) -> Completion<Option<Vec<u8>>> {
        let audio = std::mem::take(&mut self.audio);
        info!(
            "TTS session {} finished: {} bytes in {} frames",
            self.request_id,
            audio.len(),
            self.audio_frames
        );
        let output = (!audio.is_empty()).then(|| audio.to_vec());
        Completion::success(output).with_farewell(finish_connection_frame())
    }
}

fn failure_from_event(event: EventType, frame: &Frame) -> SpeechError {
    let text = frame.payload_text();
    let parsed = serde_json::from_slice::<FailurePayload>(&frame.payload).ok();

    match parsed {
        Some(FailurePayload {
            status_code: Some(code),
            message,
        }) => SpeechError::api(code, message.unwrap_or(text)),
        _ => {
            debug!("Unstructured {:?} payload: {}", event, text);
            SpeechError::api(-1, text)
        }
    }
}

impl SegmentedProtocol for SynthesisSession {
    type Output = Option<Vec<u8>>;

    fn name(&self) -> &'static str {
        "TTS"
    }

    fn handshake(&self) -> SpeechResult<Request> {
        build_request(
            &self.config.url,
            &[
                ("X-Api-App-Id", self.config.app_id.clone()),
                ("X-Api-Access-Key", self.config.access_token.clone()),
                ("X-Api-Resource-Id", self.config.resource_id.clone()),
                ("X-Api-Request-Id", self.request_id.clone()),
            ],
        )
    }

    fn opening_frames(&mut self) -> SpeechResult<Vec<Bytes>> {
        let request = TtsRequest::new(&self.config, &self.text, &self.instruction)
            .and_then(|request| serde_json::to_vec(&request))
            .map_err(|e| SpeechError::Internal(format!("Failed to serialize TTS request: {e}")))?;

        Ok(vec![Frame::full_client_request(request).encode()])
    }

    fn on_frame(&mut self, data: &[u8]) -> Option<Completion<Self::Output>> {
        let frame = match Frame::decode(data) {
            Ok(frame) => frame,
            Err(e) => return Some(Completion::failed(e.into())),
        };

        match frame.message_type {
            MessageType::AudioOnlyServer => {
                self.audio.extend_from_slice(&frame.payload);
                self.audio_frames += 1;
                return None;
            }
            MessageType::Error => {
                let code = frame.error_code.unwrap_or_default();
                let message = if frame.payload.is_empty() {
                    "Unknown".to_string()
                } else {
                    frame.payload_text()
                };
                return Some(Completion::failed(SpeechError::api(code, message)));
            }
            _ => {}
        }

        match frame.event {
            Some(EventType::SessionFinished) => Some(self.finished()),
            Some(event @ (EventType::SessionFailed | EventType::ConnectionFailed)) => {
                Some(Completion::failed(failure_from_event(event, &frame)))
            }
            Some(event) => {
                debug!("TTS event {:?} ({} byte payload)", event, frame.payload.len());
                None
            }
            None => {
                warn!("Unexpected TTS frame type {:?}", frame.message_type);
                None
            }
        }
    }
}

/// Synthesize `text` in one call.
pub async fn synthesize(
    config: &TtsConfig,
    text: &str,
    instruction: &str,
) -> SpeechResult<Option<Vec<u8>>> {
    SynthesisSession::new(config.clone(), text, instruction)?
        .run()
        .await
}
