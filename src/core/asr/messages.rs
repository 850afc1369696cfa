//! JSON parameter payload for the recognition service.
//!
//! The response side lives with the chunk codec in
//! [`crate::core::protocol::legacy`], since decoding it is part of the frame format.

use serde::Serialize;

use super::config::{
    ASR_BITS_PER_SAMPLE, ASR_CHANNELS, ASR_SAMPLE_RATE, ASR_WORKFLOW, AsrConfig,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AppParams {
    pub appid: String,
    pub cluster: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserParams {
    pub uid: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequestParams {
    pub reqid: String,
    pub workflow: String,
    pub nbest: u32,
    pub show_utterances: bool,
    pub result_type: String,
    pub sequence: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AudioParams {
    /// Container tag supplied by the caller (wav, mp3, ...)
    pub format: String,
    pub codec: String,
    pub rate: u32,
    pub bits: u16,
    pub channels: u16,
}

/// Payload of the parameter chunk that opens a recognition session
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AsrRequest {
    pub app: AppParams,
    pub user: UserParams,
    pub request: RequestParams,
    pub audio: AudioParams,
}

impl AsrRequest {
    /// Build the one-shot request. The sample configuration is fixed at
    /// 24 kHz / 16-bit / mono whatever `format` says.
    pub fn one_shot(config: &AsrConfig, request_id: &str, format: &str) -> Self {
        Self {
            app: AppParams {
                appid: config.app_id.clone(),
                cluster: config.cluster.clone(),
                token: config.access_token.clone(),
            },
            user: UserParams {
                uid: config.user_id.clone(),
            },
            request: RequestParams {
                reqid: request_id.to_string(),
                workflow: ASR_WORKFLOW.to_string(),
                nbest: 1,
                show_utterances: true,
                result_type: "full".to_string(),
                sequence: 1,
            },
            audio: AudioParams {
                format: format.to_string(),
                codec: "raw".to_string(),
                rate: ASR_SAMPLE_RATE,
                bits: ASR_BITS_PER_SAMPLE,
                channels: ASR_CHANNELS,
            },
        }
    }
}
