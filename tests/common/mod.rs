//! In-process WebSocket server that plays a fixed script against one client.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use volc_speech::core::protocol::{EventType, Frame, MessageType, gzip_compress};

/// One scripted server action
#[derive(Debug, Clone)]
pub enum Step {
    /// Wait for this many binary messages from the client
    Expect(usize),
    /// Send a binary message
    Send(Vec<u8>),
    /// Close the connection from the server side
    Close,
}

/// What the server observed during the session
#[derive(Debug, Default)]
pub struct Recorded {
    /// Handshake headers, names lowercased
    pub headers: HashMap<String, String>,
    /// Binary messages from the client in arrival order
    pub frames: Vec<Vec<u8>>,
    /// Whether the client sent a close frame
    pub saw_close: bool,
}

/// Start a server for one connection and return its URL plus the recording.
///
/// After the script runs, the server keeps reading until the client closes,
/// drops the socket, or `drain` elapses without traffic.
pub async fn spawn_server(script: Vec<Step>, drain: Duration) -> (String, JoinHandle<Recorded>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let headers = Arc::new(Mutex::new(HashMap::new()));
        let captured = headers.clone();

        let capture = move |request: &Request,
                            response: Response|
              -> Result<Response, ErrorResponse> {
            let mut map = captured.lock().unwrap();
            for (name, value) in request.headers() {
                map.insert(
                    name.as_str().to_ascii_lowercase(),
                    value.to_str().unwrap_or_default().to_string(),
                );
            }
            Ok(response)
        };
        let ws = accept_hdr_async(stream, capture).await.unwrap();

        let (mut write, mut read) = ws.split();
        let mut recorded = Recorded {
            headers: headers.lock().unwrap().clone(),
            ..Default::default()
        };

        for step in script {
            match step {
                Step::Expect(count) => {
                    let mut seen = 0;
                    while seen < count {
                        match read.next().await {
                            Some(Ok(Message::Binary(data))) => {
                                recorded.frames.push(data.to_vec());
                                seen += 1;
                            }
                            Some(Ok(Message::Close(_))) => {
                                recorded.saw_close = true;
                                return recorded;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(_)) | None => return recorded,
                        }
                    }
                }
                Step::Send(bytes) => {
                    if write.send(Message::Binary(bytes.into())).await.is_err() {
                        return recorded;
                    }
                }
                Step::Close => {
                    let _ = write
                        .send(Message::Close(Some(CloseFrame {
                            code: CloseCode::Away,
                            reason: Utf8Bytes::from_static("going away"),
                        })))
                        .await;
                    return recorded;
                }
            }
        }

        loop {
            match tokio::time::timeout(drain, read.next()).await {
                Ok(Some(Ok(Message::Binary(data)))) => recorded.frames.push(data.to_vec()),
                Ok(Some(Ok(Message::Close(_)))) => {
                    recorded.saw_close = true;
                    break;
                }
                Ok(Some(Ok(_))) => {}
                Ok(Some(Err(_))) | Ok(None) | Err(_) => break,
            }
        }

        recorded
    });

    (format!("ws://{addr}/"), handle)
}

/// Full server response in the recognition chunk format, gzip-compressed.
pub fn asr_response(json: &str) -> Vec<u8> {
    let compressed = gzip_compress(json.as_bytes()).unwrap();
    let mut frame = vec![0x11, 0x90, 0x11, 0x00];
    frame.extend_from_slice(&(compressed.len() as i32).to_be_bytes());
    frame.extend_from_slice(&compressed);
    frame
}

/// Streamed synthesis audio frame.
pub fn tts_audio(sequence: i32, audio: &[u8]) -> Vec<u8> {
    Frame::audio_only_server(sequence, audio.to_vec()).encode().to_vec()
}

/// Session event frame from the synthesis server.
pub fn tts_event(event: EventType, payload: &[u8]) -> Vec<u8> {
    Frame::event(
        MessageType::FullServerResponse,
        event,
        Some("session-1".to_string()),
        payload.to_vec(),
    )
    .encode()
    .to_vec()
}

/// Error frame from the synthesis server.
pub fn tts_error(code: i32, message: &str) -> Vec<u8> {
    Frame::error(code, message.as_bytes().to_vec())
        .encode()
        .to_vec()
}
