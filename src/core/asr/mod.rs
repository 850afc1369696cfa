mod client;
mod config;
mod messages;

#[cfg(test)]
mod tests;

pub use client::{RecognitionSession, recognize};
pub use config::{
    ASR_BITS_PER_SAMPLE, ASR_CHANNELS, ASR_CHUNK_SIZE, ASR_SAMPLE_RATE, ASR_URL, ASR_WORKFLOW,
    AsrConfig, DEFAULT_ASR_CLUSTER, DEFAULT_ASR_TIMEOUT, DEFAULT_USER_ID,
};
pub use messages::{AppParams, AsrRequest, AudioParams, RequestParams, UserParams};
