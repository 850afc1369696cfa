//! Configuration for one-shot recognition sessions.

use std::time::Duration;

/// Default recognition endpoint
pub const ASR_URL: &str = "wss://openspeech.bytedance.com/api/v2/asr";

/// Server-side processing pipeline requested for every recognition
pub const ASR_WORKFLOW: &str = "audio_in,resample,partition,vad,fe,decode,itn,nlu_punct";

/// Audio is streamed in chunks of this many bytes
pub const ASR_CHUNK_SIZE: usize = 16 * 1024;

/// Sample configuration declared for every request, regardless of the format tag
pub const ASR_SAMPLE_RATE: u32 = 24000;
pub const ASR_BITS_PER_SAMPLE: u16 = 16;
pub const ASR_CHANNELS: u16 = 1;

pub const DEFAULT_ASR_CLUSTER: &str = "volc_sms_status";
pub const DEFAULT_ASR_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_USER_ID: &str = "user_001";

/// Settings for a recognition session
#[derive(Debug, Clone, PartialEq)]
pub struct AsrConfig {
    /// WebSocket endpoint
    pub url: String,
    pub app_id: String,
    /// Sent both as the bearer header and inside the parameter chunk
    pub access_token: String,
    pub cluster: String,
    pub user_id: String,
    /// Upper bound for the whole exchange
    pub timeout: Duration,
    pub chunk_size: usize,
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            url: ASR_URL.to_string(),
            app_id: String::new(),
            access_token: String::new(),
            cluster: DEFAULT_ASR_CLUSTER.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            timeout: DEFAULT_ASR_TIMEOUT,
            chunk_size: ASR_CHUNK_SIZE,
        }
    }
}

impl AsrConfig {
    /// Value of the `Authorization` handshake header.
    pub fn authorization(&self) -> String {
        format!("Bearer; {}", self.access_token)
    }
}
