//! One-shot recognition over the legacy chunk protocol.

use bytes::Bytes;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::AsrConfig;
use super::messages::AsrRequest;
use crate::core::error::{SpeechError, SpeechResult};
use crate::core::protocol::legacy::{
    decode_server_frame, encode_audio_chunk, encode_param, split_audio,
};
use crate::core::session::{Completion, SegmentedProtocol, build_request, run_session};

/// One recognition exchange: parameters, audio chunks, then a final transcript.
///
/// The session is consumed by [`RecognitionSession::run`]; each call opens its
/// own connection.
#[derive(Debug)]
pub struct RecognitionSession {
    config: AsrConfig,
    request_id: String,
    format: String,
    audio: Vec<u8>,
}

impl RecognitionSession {
    /// Prepare a session for `audio` labelled with the container `format`.
    ///
    /// Empty audio is rejected here, before any connection is made.
    pub fn new(config: AsrConfig, audio: Vec<u8>, format: impl Into<String>) -> SpeechResult<Self> {
        if audio.is_empty() {
            return Err(SpeechError::InvalidInput(
                "audio for recognition is empty".to_string(),
            ));
        }

        Ok(Self {
            config,
            request_id: Uuid::new_v4().to_string(),
            format: format.into(),
            audio,
        })
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Run the exchange and return the recognized text.
    ///
    /// An empty string means the server finished without recognizing anything.
    pub async fn run(self) -> SpeechResult<String> {
        let timeout = self.config.timeout;
        info!(
            "Starting ASR session {} ({} bytes, format {})",
            self.request_id,
            self.audio.len(),
            self.format
        );
        run_session(self, timeout).await
    }
}

impl SegmentedProtocol for RecognitionSession {
    type Output = String;

    fn name(&self) -> &'static str {
        "ASR"
    }

    fn handshake(&self) -> SpeechResult<Request> {
        build_request(
            &self.config.url,
            &[("Authorization", self.config.authorization())],
        )
    }

    fn opening_frames(&mut self) -> SpeechResult<Vec<Bytes>> {
        let request = AsrRequest::one_shot(&self.config, &self.request_id, &self.format);
        let params = serde_json::to_vec(&request)
            .map_err(|e| SpeechError::Internal(format!("Failed to serialize ASR params: {e}")))?;

        let audio = std::mem::take(&mut self.audio);
        let mut frames =
            Vec::with_capacity(1 + audio.len().div_ceil(self.config.chunk_size.max(1)));
        frames.push(encode_param(&params)?);
        for (chunk, is_last) in split_audio(&audio, self.config.chunk_size) {
            frames.push(encode_audio_chunk(chunk, is_last)?);
        }

        debug!(
            "ASR session {} queued {} audio chunks",
            self.request_id,
            frames.len() - 1
        );
        Ok(frames)
    }

    fn on_frame(&mut self, data: &[u8]) -> Option<Completion<String>> {
        let response = match decode_server_frame(data) {
            Ok(Some(response)) => response,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to parse ASR response: {}", e);
                return None;
            }
        };

        if response.is_error() {
            return Some(Completion::failed(SpeechError::api(
                response.code,
                response.message,
            )));
        }

        if response.is_final() {
            let text = response.first_text().to_string();
            info!("ASR final result: {}", text);
            return Some(Completion::success(text));
        }

        debug!("ASR interim response, sequence {}", response.sequence);
        None
    }
}

/// Recognize `audio` in one call.
pub async fn recognize(
    config: &AsrConfig,
    audio: Vec<u8>,
    format: &str,
) -> SpeechResult<String> {
    RecognitionSession::new(config.clone(), audio, format)?
        .run()
        .await
}
