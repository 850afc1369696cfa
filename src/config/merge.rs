use std::env;

use super::utils::parse_seconds;
use super::yaml::YamlConfig;
use super::{DEFAULT_ASR_TIMEOUT_SECONDS, DEFAULT_TTS_TIMEOUT_SECONDS, SpeechConfig};
use crate::core::asr::{ASR_URL, DEFAULT_ASR_CLUSTER, DEFAULT_USER_ID};
use crate::core::tts::{DEFAULT_TTS_RESOURCE_ID, DEFAULT_TTS_VOICE, TTS_URL};

/// Merge YAML configuration with environment variables
///
/// Priority order (highest to lowest):
/// 1. YAML configuration values
/// 2. Environment variables
/// 3. Default values
///
/// Passing `None` yields a purely environment-driven configuration.
pub fn merge_config(
    yaml_config: Option<YamlConfig>,
) -> Result<SpeechConfig, Box<dyn std::error::Error>> {
    let yaml = yaml_config.unwrap_or_default();

    // Helper macro to get value with priority: YAML > ENV > Default
    macro_rules! get_value {
        ($env_var:expr, $yaml_value:expr, $default:expr) => {
            $yaml_value
                .or_else(|| env::var($env_var).ok())
                .unwrap_or_else(|| $default.to_string())
        };
    }

    // Same priority for numeric seconds; a malformed env value is an error
    macro_rules! get_seconds {
        ($env_var:expr, $yaml_value:expr, $default:expr) => {
            match $yaml_value {
                Some(seconds) => seconds,
                None => match env::var($env_var) {
                    Ok(raw) => parse_seconds($env_var, &raw)?,
                    Err(_) => $default,
                },
            }
        };
    }

    let credentials = yaml.credentials.as_ref();
    let asr = yaml.asr.as_ref();
    let tts = yaml.tts.as_ref();

    // Credentials
    let app_id = get_value!("VOLC_APP_ID", credentials.and_then(|c| c.app_id.clone()), "");
    let access_token = get_value!(
        "VOLC_ACCESS_TOKEN",
        credentials.and_then(|c| c.access_token.clone()),
        ""
    );
    let user_id = get_value!(
        "VOLC_USER_ID",
        credentials.and_then(|c| c.user_id.clone()),
        DEFAULT_USER_ID
    );

    // Recognition
    let asr_url = get_value!("VOLC_ASR_URL", asr.and_then(|a| a.url.clone()), ASR_URL);
    let asr_cluster = get_value!(
        "VOLC_ASR_CLUSTER",
        asr.and_then(|a| a.cluster.clone()),
        DEFAULT_ASR_CLUSTER
    );
    let asr_timeout_seconds = get_seconds!(
        "VOLC_ASR_TIMEOUT_SECONDS",
        asr.and_then(|a| a.timeout_seconds),
        DEFAULT_ASR_TIMEOUT_SECONDS
    );

    // Synthesis
    let tts_url = get_value!("VOLC_TTS_URL", tts.and_then(|t| t.url.clone()), TTS_URL);
    let tts_resource_id = get_value!(
        "VOLC_TTS_RESOURCE_ID",
        tts.and_then(|t| t.resource_id.clone()),
        DEFAULT_TTS_RESOURCE_ID
    );
    let tts_voice = get_value!(
        "VOLC_TTS_VOICE",
        tts.and_then(|t| t.voice.clone()),
        DEFAULT_TTS_VOICE
    );
    let tts_timeout_seconds = get_seconds!(
        "VOLC_TTS_TIMEOUT_SECONDS",
        tts.and_then(|t| t.timeout_seconds),
        DEFAULT_TTS_TIMEOUT_SECONDS
    );

    Ok(SpeechConfig {
        app_id,
        access_token,
        user_id,
        asr_url,
        asr_cluster,
        asr_timeout_seconds,
        tts_url,
        tts_resource_id,
        tts_voice,
        tts_timeout_seconds,
    })
}
