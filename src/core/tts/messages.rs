//! Request and event payloads for the synthesis service.

use serde::{Deserialize, Serialize};

use super::config::{TTS_AUDIO_FORMAT, TTS_SAMPLE_RATE, TtsConfig};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TtsUser {
    pub uid: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TtsAudioParams {
    pub format: String,
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TtsReqParams {
    pub text: String,
    pub speaker: String,
    pub audio_params: TtsAudioParams,
    /// JSON document encoded as a string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additions: Option<String>,
}

/// Payload of the single request frame of a synthesis session
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TtsRequest {
    pub user: TtsUser,
    pub req_params: TtsReqParams,
}

#[derive(Serialize)]
struct Additions<'a> {
    context_texts: [&'a str; 1],
}

impl TtsRequest {
    pub fn new(
        config: &TtsConfig,
        text: &str,
        instruction: &str,
    ) -> Result<Self, serde_json::Error> {
        let additions = match instruction_context(instruction) {
            Some(phrase) => Some(serde_json::to_string(&Additions {
                context_texts: [phrase.as_str()],
            })?),
            None => None,
        };

        Ok(Self {
            user: TtsUser {
                uid: config.user_id.clone(),
            },
            req_params: TtsReqParams {
                text: text.to_string(),
                speaker: config.speaker.clone(),
                audio_params: TtsAudioParams {
                    format: TTS_AUDIO_FORMAT.to_string(),
                    sample_rate: TTS_SAMPLE_RATE,
                },
                additions,
            },
        })
    }
}

/// Map an emotion label to the spoken-style hint sent as context text.
///
/// Returns `None` for an empty or "neutral" label.
pub fn instruction_context(instruction: &str) -> Option<String> {
    if instruction.is_empty() || instruction.eq_ignore_ascii_case("neutral") {
        return None;
    }

    let phrase = match instruction.to_ascii_lowercase().as_str() {
        "happy" => "请用开心的语气".to_string(),
        "sad" => "请用悲伤的语气".to_string(),
        "angry" => "请用生气的语气".to_string(),
        "excited" => "请用激动的语气".to_string(),
        _ => format!("请用{instruction}的语气"),
    };
    Some(phrase)
}

/// Body of SESSION_FAILED / CONNECTION_FAILED events
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FailurePayload {
    #[serde(default, alias = "code")]
    pub status_code: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
}
