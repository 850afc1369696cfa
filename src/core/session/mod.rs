//! Segmented protocol sessions over a dedicated WebSocket connection.
//!
//! A session is one request/response exchange from connection open to close.
//! The wire format specifics live behind [`SegmentedProtocol`]; this module owns
//! everything they have in common:
//!
//! ```text
//! caller ── run_session ──▶ spawn(drive_session) ──▶ connect_async
//!    │                            │
//!    │                            ├─ opening_frames() ──▶ feed + flush
//!    │                            ├─ on_frame() per inbound binary message
//!    │                            └─ farewell, close, gate.signal(result)
//!    └── waiter.wait(deadline) ◀──┘
//! ```
//!
//! Inbound frames are handled sequentially on the connection task, so protocol
//! implementations need no locking. On deadline expiry the caller aborts the
//! connection task, which drops the socket.

mod state;

pub use state::SessionState;

use std::time::Duration;

use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

use crate::core::bridge::{CompletionGate, WaitOutcome, completion_gate};
use crate::core::error::{SpeechError, SpeechResult};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Terminal outcome produced by a protocol
#[derive(Debug)]
pub struct Completion<T> {
    pub result: SpeechResult<T>,
    /// Frame written just before the connection is closed
    pub farewell: Option<Bytes>,
}

impl<T> Completion<T> {
    pub fn success(value: T) -> Self {
        Self {
            result: Ok(value),
            farewell: None,
        }
    }

    pub fn failed(error: SpeechError) -> Self {
        Self {
            result: Err(error),
            farewell: None,
        }
    }

    pub fn with_farewell(mut self, frame: Bytes) -> Self {
        self.farewell = Some(frame);
        self
    }
}

/// A wire protocol that can be driven as one session
pub trait SegmentedProtocol: Send + 'static {
    /// Value produced on success
    type Output: Send + 'static;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// WebSocket handshake request, including authentication headers.
    fn handshake(&self) -> SpeechResult<Request>;

    /// Frames written back-to-back once the connection is open.
    fn opening_frames(&mut self) -> SpeechResult<Vec<Bytes>>;

    /// Handle one inbound binary message.
    ///
    /// Returns `Some` exactly when the message ends the session.
    fn on_frame(&mut self, data: &[u8]) -> Option<Completion<Self::Output>>;
}

/// Build a handshake request for `url` carrying `headers`.
pub fn build_request(url: &str, headers: &[(&'static str, String)]) -> SpeechResult<Request> {
    let mut request = url
        .into_client_request()
        .map_err(|e| SpeechError::Configuration(format!("Invalid WebSocket URL {url}: {e}")))?;

    let header_map = request.headers_mut();
    for (name, value) in headers {
        let value = HeaderValue::from_str(value).map_err(|e| {
            SpeechError::Configuration(format!("Invalid value for header {name}: {e}"))
        })?;
        header_map.insert(*name, value);
    }

    Ok(request)
}

/// Run `protocol` over a fresh connection, waiting at most `deadline` for its outcome.
pub async fn run_session<P: SegmentedProtocol>(
    protocol: P,
    deadline: Duration,
) -> SpeechResult<P::Output> {
    let name = protocol.name();
    let request = protocol.handshake()?;
    let (gate, waiter) = completion_gate();

    let connection = tokio::spawn(drive_session(request, protocol, gate));

    match waiter.wait(deadline).await {
        WaitOutcome::Signaled(result) => result,
        WaitOutcome::TimedOut => {
            warn!(
                "{} session produced no terminal event within {:?}, cancelling connection",
                name, deadline
            );
            connection.abort();
            // The aborted task never reaches its own Closed transition.
            debug!(
                "{} session: {:?} -> {:?}",
                name,
                SessionState::TimedOut,
                SessionState::Closed
            );
            Err(SpeechError::Timeout(deadline))
        }
        WaitOutcome::Abandoned => Err(SpeechError::Transport(format!(
            "{name} session ended without an outcome"
        ))),
    }
}

/// Lifecycle bookkeeping for one connection.
struct StateTracker {
    protocol: &'static str,
    state: SessionState,
}

impl StateTracker {
    fn new(protocol: &'static str) -> Self {
        Self {
            protocol,
            state: SessionState::Open,
        }
    }

    fn advance(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid session transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!("{} session: {:?} -> {:?}", self.protocol, self.state, next);
        self.state = next;
    }
}

async fn drive_session<P: SegmentedProtocol>(
    request: Request,
    mut protocol: P,
    mut gate: CompletionGate<SpeechResult<P::Output>>,
) {
    let name = protocol.name();
    let mut tracker = StateTracker::new(name);

    let (ws_stream, _response) = match connect_async(request).await {
        Ok(connected) => connected,
        Err(e) => {
            let err = SpeechError::Transport(format!("Failed to connect {name} session: {e}"));
            error!("{}", err);
            tracker.advance(SessionState::TransportFailed);
            gate.signal(Err(err));
            tracker.advance(SessionState::Closed);
            return;
        }
    };

    info!("Connected {} session", name);
    let (mut sink, mut source) = ws_stream.split();

    let completion = exchange(&mut protocol, &mut sink, &mut source, &mut tracker).await;
    tracker.advance(SessionState::terminal_for(&completion.result));

    if let Err(e) = &completion.result {
        error!("{} session failed: {}", name, e);
    }

    if gate.is_abandoned() {
        debug!("{} caller stopped waiting, dropping connection without farewell", name);
        tracker.advance(SessionState::Closed);
        return;
    }
    close_connection(&mut sink, name, completion.farewell, completion.result.is_ok()).await;

    if !gate.signal(completion.result) {
        debug!("{} session outcome arrived after the caller stopped waiting", name);
    }
    tracker.advance(SessionState::Closed);
}

async fn exchange<P: SegmentedProtocol>(
    protocol: &mut P,
    sink: &mut WsSink,
    source: &mut WsSource,
    tracker: &mut StateTracker,
) -> Completion<P::Output> {
    tracker.advance(SessionState::SendingRequest);

    let frames = match protocol.opening_frames() {
        Ok(frames) => frames,
        Err(e) => return Completion::failed(e),
    };

    // Queue everything, then flush once; ordering is the transport's job.
    let frame_count = frames.len();
    for frame in frames {
        if let Err(e) = sink.feed(Message::Binary(frame)).await {
            return Completion::failed(SpeechError::Transport(format!(
                "Failed to send {} frame: {e}",
                protocol.name()
            )));
        }
    }
    if let Err(e) = sink.flush().await {
        return Completion::failed(SpeechError::Transport(format!(
            "Failed to flush {} frames: {e}",
            protocol.name()
        )));
    }
    debug!("Sent {} opening frames for {} session", frame_count, protocol.name());

    tracker.advance(SessionState::AwaitingResponse);

    while let Some(message) = source.next().await {
        match message {
            Ok(Message::Binary(data)) => {
                if let Some(completion) = protocol.on_frame(&data) {
                    return completion;
                }
            }
            Ok(Message::Text(text)) => {
                debug!("Ignoring text message on {} session: {}", protocol.name(), text);
            }
            Ok(Message::Close(frame)) => {
                return Completion::failed(SpeechError::Transport(format!(
                    "Server closed {} session before completion: {:?}",
                    protocol.name(),
                    frame
                )));
            }
            Ok(_) => {}
            Err(e) => {
                return Completion::failed(SpeechError::Transport(format!(
                    "WebSocket error on {} session: {e}",
                    protocol.name()
                )));
            }
        }
    }

    Completion::failed(SpeechError::Transport(format!(
        "{} connection ended before completion",
        protocol.name()
    )))
}

async fn close_connection(
    sink: &mut WsSink,
    name: &'static str,
    farewell: Option<Bytes>,
    succeeded: bool,
) {
    if let Some(frame) = farewell
        && let Err(e) = sink.send(Message::Binary(frame)).await
    {
        warn!("Failed to send closing frame for {} session: {}", name, e);
    }

    let reason = if succeeded { "Finished" } else { "Error" };
    let close = Message::Close(Some(CloseFrame {
        code: CloseCode::Normal,
        reason: Utf8Bytes::from_static(reason),
    }));
    if let Err(e) = sink.send(close).await {
        debug!("Close handshake for {} session not completed: {}", name, e);
    }
}
