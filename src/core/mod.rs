pub mod asr;
pub mod bridge;
pub mod client;
pub mod error;
pub mod protocol;
pub mod session;
pub mod storage;
pub mod tts;

// Re-export commonly used types for convenience
pub use asr::{AsrConfig, RecognitionSession};
pub use client::{SpeechClient, install_crypto_provider};
pub use error::{SpeechError, SpeechResult};
pub use session::{Completion, SegmentedProtocol, SessionState, run_session};
pub use storage::{AudioUploader, DirectoryUploader};
pub use tts::{SynthesisSession, TtsConfig};
