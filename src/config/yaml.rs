use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Missing values are
/// taken from environment variables, then from defaults.
///
/// # Example YAML structure
/// ```yaml
/// credentials:
///   app_id: "1234567890"
///   access_token: "your-access-token"
///   user_id: "user_001"
///
/// asr:
///   url: "wss://openspeech.bytedance.com/api/v2/asr"
///   cluster: "volc_sms_status"
///   timeout_seconds: 20
///
/// tts:
///   url: "wss://openspeech.bytedance.com/api/v3/tts/unidirectional/stream"
///   resource_id: "seed-tts-2.0"
///   voice: "saturn_zh_female_cancan_tob"
///   timeout_seconds: 15
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub credentials: Option<CredentialsYaml>,
    pub asr: Option<AsrYaml>,
    pub tts: Option<TtsYaml>,
}

/// Credentials shared by both services
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CredentialsYaml {
    pub app_id: Option<String>,
    pub access_token: Option<String>,
    pub user_id: Option<String>,
}

/// Recognition settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AsrYaml {
    pub url: Option<String>,
    pub cluster: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Synthesis settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TtsYaml {
    pub url: Option<String>,
    pub resource_id: Option<String>,
    pub voice: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl YamlConfig {
    /// Load YAML configuration from a file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
