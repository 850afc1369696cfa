use super::SpeechConfig;
use super::merge::merge_config;
use super::validation::validate;

impl SpeechConfig {
    /// Load configuration from environment variables
    ///
    /// Also loads from a `.env` file if present using dotenvy. Unset variables
    /// fall back to defaults; the credentials have none and must be provided.
    ///
    /// # Errors
    /// Returns an error if:
    /// - A timeout variable is not a whole number of seconds
    /// - Validation fails
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let config = merge_config(None)?;
        validate(&config)?;
        Ok(config)
    }
}
