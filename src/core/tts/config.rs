use std::time::Duration;

/// Default unidirectional streaming synthesis endpoint
pub const TTS_URL: &str = "wss://openspeech.bytedance.com/api/v3/tts/unidirectional/stream";

pub const DEFAULT_TTS_RESOURCE_ID: &str = "seed-tts-2.0";
pub const DEFAULT_TTS_VOICE: &str = "saturn_zh_female_cancan_tob";
pub const DEFAULT_TTS_TIMEOUT: Duration = Duration::from_secs(15);

/// Output container requested from the service
pub const TTS_AUDIO_FORMAT: &str = "mp3";
pub const TTS_SAMPLE_RATE: u32 = 24000;

/// Settings for a synthesis session
#[derive(Debug, Clone, PartialEq)]
pub struct TtsConfig {
    pub url: String,
    pub app_id: String,
    pub access_token: String,
    /// Billing resource sent as `X-Api-Resource-Id`
    pub resource_id: String,
    /// Voice id
    pub speaker: String,
    pub user_id: String,
    pub timeout: Duration,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            url: TTS_URL.to_string(),
            app_id: String::new(),
            access_token: String::new(),
            resource_id: DEFAULT_TTS_RESOURCE_ID.to_string(),
            speaker: DEFAULT_TTS_VOICE.to_string(),
            user_id: crate::core::asr::DEFAULT_USER_ID.to_string(),
            timeout: DEFAULT_TTS_TIMEOUT,
        }
    }
}
