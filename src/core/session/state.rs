use crate::core::error::SpeechError;

/// Lifecycle of one session connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connection being opened
    Open,
    /// Opening frames being written
    SendingRequest,
    /// Waiting for a terminal server frame
    AwaitingResponse,
    FinalReceived,
    ApiError,
    ProtocolError,
    TransportFailed,
    TimedOut,
    /// Socket released
    Closed,
}

impl SessionState {
    /// Terminal states fire the completion gate.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::FinalReceived
                | Self::ApiError
                | Self::ProtocolError
                | Self::TransportFailed
                | Self::TimedOut
        )
    }

    /// Terminal state matching a session result.
    pub fn terminal_for<T>(result: &Result<T, SpeechError>) -> Self {
        match result {
            Ok(_) => Self::FinalReceived,
            Err(SpeechError::Api { .. }) => Self::ApiError,
            Err(SpeechError::ProtocolDecode(_)) => Self::ProtocolError,
            Err(SpeechError::Timeout(_)) => Self::TimedOut,
            Err(_) => Self::TransportFailed,
        }
    }

    /// Whether moving from `self` to `next` follows the session lifecycle.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (Open, SendingRequest) | (SendingRequest, AwaitingResponse) => true,
            (Open | SendingRequest | AwaitingResponse, terminal) if terminal.is_terminal() => true,
            (terminal, Closed) if terminal.is_terminal() => true,
            _ => false,
        }
    }
}
