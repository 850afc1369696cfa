mod client;
mod config;
mod messages;


pub use client::{SynthesisSession, finish_connection_frame, synthesize};
pub use config::{
    DEFAULT_TTS_RESOURCE_ID, DEFAULT_TTS_TIMEOUT, DEFAULT_TTS_VOICE, TTS_AUDIO_FORMAT,
    TTS_SAMPLE_RATE, TTS_URL, TtsConfig,
};
pub use messages::{
    FailurePayload, TtsAudioParams, TtsReqParams, TtsRequest, TtsUser, instruction_context,
};
