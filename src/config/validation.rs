use super::SpeechConfig;

/// Validate that both credentials are present
pub fn validate_credentials(
    app_id: &str,
    access_token: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if app_id.trim().is_empty() {
        return Err("VOLC_APP_ID (credentials.app_id) is required".into());
    }
    if access_token.trim().is_empty() {
        return Err("VOLC_ACCESS_TOKEN (credentials.access_token) is required".into());
    }
    Ok(())
}

/// Validate that an endpoint is a WebSocket URL
pub fn validate_ws_url(name: &str, url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !(url.starts_with("ws://") || url.starts_with("wss://")) {
        return Err(format!("{name} must be a ws:// or wss:// URL, got '{url}'").into());
    }
    Ok(())
}

/// Validate that a deadline is non-zero
pub fn validate_timeout(name: &str, seconds: u64) -> Result<(), Box<dyn std::error::Error>> {
    if seconds == 0 {
        return Err(format!("{name} must be greater than zero").into());
    }
    Ok(())
}

/// Run every check against a loaded configuration
pub fn validate(config: &SpeechConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_credentials(&config.app_id, &config.access_token)?;
    validate_ws_url("VOLC_ASR_URL", &config.asr_url)?;
    validate_ws_url("VOLC_TTS_URL", &config.tts_url)?;
    validate_timeout("VOLC_ASR_TIMEOUT_SECONDS", config.asr_timeout_seconds)?;
    validate_timeout("VOLC_TTS_TIMEOUT_SECONDS", config.tts_timeout_seconds)?;
    Ok(())
}
