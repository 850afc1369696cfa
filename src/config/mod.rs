//! Configuration for the speech client
//!
//! Settings come from environment variables or from a YAML file merged with the
//! environment. The configuration is split into logical submodules:
//!
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use volc_speech::config::SpeechConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = SpeechConfig::from_env()?;
//!
//! // Load from YAML file, falling back to environment variables
//! let config = SpeechConfig::from_file(&PathBuf::from("speech.yaml"))?;
//! println!("Recognizing against {}", config.asr_url);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::core::asr::{ASR_CHUNK_SIZE, ASR_URL, AsrConfig, DEFAULT_ASR_CLUSTER, DEFAULT_USER_ID};
use crate::core::tts::{DEFAULT_TTS_RESOURCE_ID, DEFAULT_TTS_VOICE, TTS_URL, TtsConfig};

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

pub const DEFAULT_ASR_TIMEOUT_SECONDS: u64 = 20;
pub const DEFAULT_TTS_TIMEOUT_SECONDS: u64 = 15;

/// Speech client configuration
///
/// One set of credentials serves both services; endpoints, voice and deadlines
/// are set per service.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechConfig {
    // Credentials
    pub app_id: String,
    pub access_token: String,
    pub user_id: String,

    // Recognition
    pub asr_url: String,
    pub asr_cluster: String,
    pub asr_timeout_seconds: u64,

    // Synthesis
    pub tts_url: String,
    pub tts_resource_id: String,
    pub tts_voice: String,
    pub tts_timeout_seconds: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            access_token: String::new(),
            user_id: DEFAULT_USER_ID.to_string(),
            asr_url: ASR_URL.to_string(),
            asr_cluster: DEFAULT_ASR_CLUSTER.to_string(),
            asr_timeout_seconds: DEFAULT_ASR_TIMEOUT_SECONDS,
            tts_url: TTS_URL.to_string(),
            tts_resource_id: DEFAULT_TTS_RESOURCE_ID.to_string(),
            tts_voice: DEFAULT_TTS_VOICE.to_string(),
            tts_timeout_seconds: DEFAULT_TTS_TIMEOUT_SECONDS,
        }
    }
}

impl SpeechConfig {
    /// Load configuration from a YAML file with environment variable fallbacks
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables
    /// 3. Default values
    ///
    /// The merged configuration is validated before it is returned.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - A timeout environment variable is not a number
    /// - Validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // .env is not loaded here; the YAML file is the source of truth and only
        // real environment variables fill its gaps.
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Settings for recognition sessions.
    pub fn asr_config(&self) -> AsrConfig {
        AsrConfig {
            url: self.asr_url.clone(),
            app_id: self.app_id.clone(),
            access_token: self.access_token.clone(),
            cluster: self.asr_cluster.clone(),
            user_id: self.user_id.clone(),
            timeout: Duration::from_secs(self.asr_timeout_seconds),
            chunk_size: ASR_CHUNK_SIZE,
        }
    }

    /// Settings for synthesis sessions.
    pub fn tts_config(&self) -> TtsConfig {
        TtsConfig {
            url: self.tts_url.clone(),
            app_id: self.app_id.clone(),
            access_token: self.access_token.clone(),
            resource_id: self.tts_resource_id.clone(),
            speaker: self.tts_voice.clone(),
            user_id: self.user_id.clone(),
            timeout: Duration::from_secs(self.tts_timeout_seconds),
        }
    }
}
