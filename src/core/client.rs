//! High-level entry point bundling both speech services.

use std::future::Future;
use std::sync::Once;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::asr::{AsrConfig, recognize};
use super::error::{SpeechError, SpeechResult};
use super::storage::AudioUploader;
use super::tts::{TTS_AUDIO_FORMAT, TtsConfig, synthesize};
use crate::config::SpeechConfig;

static CRYPTO_PROVIDER: Once = Once::new();

/// Install the ring TLS provider for `wss://` connections.
///
/// Safe to call repeatedly; a provider installed elsewhere is left in place.
pub fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("TLS crypto provider already installed");
        }
    });
}

/// Recognition and synthesis client.
///
/// Every call opens its own connection; the client holds configuration only and
/// can be shared freely between tasks.
#[derive(Debug, Clone)]
pub struct SpeechClient {
    asr: AsrConfig,
    tts: TtsConfig,
}

impl SpeechClient {
    pub fn new(config: SpeechConfig) -> Self {
        Self::from_parts(config.asr_config(), config.tts_config())
    }

    pub fn from_parts(asr: AsrConfig, tts: TtsConfig) -> Self {
        install_crypto_provider();
        Self { asr, tts }
    }

    pub fn asr_config(&self) -> &AsrConfig {
        &self.asr
    }

    pub fn tts_config(&self) -> &TtsConfig {
        &self.tts
    }

    /// Transcribe `audio` whose container is described by `format` (e.g. "wav").
    pub async fn recognize(&self, audio: Vec<u8>, format: &str) -> SpeechResult<String> {
        recognize(&self.asr, audio, format).await
    }

    /// Synthesize `text` as mp3, styled by an optional emotion `instruction`.
    pub async fn synthesize(&self, text: &str, instruction: &str) -> SpeechResult<Option<Vec<u8>>> {
        synthesize(&self.tts, text, instruction).await
    }

    /// Synthesize and upload the result, returning its public URL.
    ///
    /// Nothing is uploaded when the service produced no audio.
    pub async fn synthesize_to_storage(
        &self,
        text: &str,
        instruction: &str,
        uploader: &dyn AudioUploader,
    ) -> SpeechResult<Option<String>> {
        let Some(audio) = self.synthesize(text, instruction).await? else {
            warn!("Synthesis returned no audio, skipping upload");
            return Ok(None);
        };

        let filename = format!("tts_{}.{}", Uuid::new_v4(), TTS_AUDIO_FORMAT);
        let size = audio.len();
        let url = uploader.upload(audio, &filename).await?;
        info!("Uploaded {} bytes of synthesized audio to {}", size, url);
        Ok(Some(url))
    }

    /// Blocking variant of [`SpeechClient::recognize`].
    ///
    /// Runs on a private current-thread runtime, so it must not be called from
    /// inside an async context.
    pub fn recognize_blocking(&self, audio: Vec<u8>, format: &str) -> SpeechResult<String> {
        block_on(self.recognize(audio, format))?
    }

    /// Blocking variant of [`SpeechClient::synthesize`].
    pub fn synthesize_blocking(
        &self,
        text: &str,
        instruction: &str,
    ) -> SpeechResult<Option<Vec<u8>>> {
        block_on(self.synthesize(text, instruction))?
    }
}

fn block_on<F: Future>(future: F) -> SpeechResult<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SpeechError::Internal(format!("Failed to create tokio runtime: {e}")))?;
    Ok(runtime.block_on(future))
}
