mod common;

use std::time::Duration;

use common::{Step, asr_response, spawn_server};
use volc_speech::core::protocol::gzip_decompress;
use volc_speech::{AsrConfig, RecognitionSession, SpeechError};

fn asr_config(url: String) -> AsrConfig {
    AsrConfig {
        url,
        app_id: "app-1".to_string(),
        access_token: "secret-token".to_string(),
        timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

fn chunk_payload(chunk: &[u8]) -> Vec<u8> {
    let len = i32::from_be_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]) as usize;
    gzip_decompress(&chunk[8..8 + len]).unwrap()
}

#[tokio::test]
async fn test_recognize_returns_final_text() {
    let (url, server) = spawn_server(
        vec![
            Step::Expect(2),
            Step::Send(asr_response(r#"{"code":1000,"sequence":1}"#)),
            Step::Send(asr_response(
                r#"{"code":1000,"sequence":-1,"result":[{"text":"hello"}]}"#,
            )),
        ],
        Duration::from_secs(2),
    )
    .await;

    let text = volc_speech::core::asr::recognize(&asr_config(url), vec![1u8; 1000], "wav")
        .await
        .unwrap();
    assert_eq!(text, "hello");

    let recorded = server.await.unwrap();
    assert_eq!(recorded.headers["authorization"], "Bearer; secret-token");
    assert_eq!(recorded.frames.len(), 2);
    assert!(recorded.saw_close);

    let params: serde_json::Value =
        serde_json::from_slice(&chunk_payload(&recorded.frames[0])).unwrap();
    assert_eq!(params["app"]["appid"], "app-1");
    assert_eq!(params["app"]["token"], "secret-token");
    assert_eq!(params["audio"]["format"], "wav");
}

#[tokio::test]
async fn test_recognize_streams_40k_as_three_chunks() {
    let audio: Vec<u8> = (0..40 * 1024).map(|i| (i % 199) as u8).collect();
    let (url, server) = spawn_server(
        vec![
            Step::Expect(4),
            Step::Send(asr_response(
                r#"{"code":1000,"sequence":-1,"result":[{"text":"ok"}]}"#,
            )),
        ],
        Duration::from_secs(2),
    )
    .await;

    let session = RecognitionSession::new(asr_config(url), audio.clone(), "wav").unwrap();
    let request_id = session.request_id().to_string();
    assert_eq!(session.run().await.unwrap(), "ok");

    let recorded = server.await.unwrap();
    assert_eq!(recorded.frames.len(), 4);

    let params: serde_json::Value =
        serde_json::from_slice(&chunk_payload(&recorded.frames[0])).unwrap();
    assert_eq!(params["request"]["reqid"], request_id.as_str());

    let kinds: Vec<u8> = recorded.frames[1..].iter().map(|f| f[1]).collect();
    assert_eq!(kinds, vec![0x20, 0x20, 0x22]);

    let received: Vec<u8> = recorded.frames[1..]
        .iter()
        .flat_map(|f| chunk_payload(f))
        .collect();
    assert_eq!(received, audio);
}

#[tokio::test]
async fn test_recognize_server_error_closes_connection() {
    let (url, server) = spawn_server(
        vec![
            Step::Expect(2),
            Step::Send(asr_response(r#"{"code":1001,"message":"busy","sequence":1}"#)),
        ],
        Duration::from_secs(2),
    )
    .await;

    let err = volc_speech::core::asr::recognize(&asr_config(url), vec![0u8; 64], "wav")
        .await
        .unwrap_err();
    assert_eq!(err, SpeechError::api(1001, "busy"));

    let recorded = server.await.unwrap();
    assert!(recorded.saw_close);
}

#[tokio::test]
async fn test_recognize_ignores_malformed_frames() {
    let (url, server) = spawn_server(
        vec![
            Step::Expect(2),
            Step::Send(vec![0x11, 0x90, 0x11, 0x00, 0, 0, 0, 3, 1, 2, 3]),
            Step::Send(asr_response(
                r#"{"code":1000,"sequence":-1,"result":[{"text":"still here"}]}"#,
            )),
        ],
        Duration::from_secs(2),
    )
    .await;

    let text = volc_speech::core::asr::recognize(&asr_config(url), vec![0u8; 64], "wav")
        .await
        .unwrap();
    assert_eq!(text, "still here");
    server.await.unwrap();
}

#[tokio::test]
async fn test_recognize_times_out_without_final_frame() {
    let (url, server) = spawn_server(vec![Step::Expect(2)], Duration::from_secs(3)).await;

    let config = AsrConfig {
        timeout: Duration::from_millis(300),
        ..asr_config(url)
    };
    let started = std::time::Instant::now();
    let err = volc_speech::core::asr::recognize(&config, vec![0u8; 64], "wav")
        .await
        .unwrap_err();

    assert_eq!(err, SpeechError::Timeout(Duration::from_millis(300)));
    assert!(err.is_timeout());
    assert!(started.elapsed() < Duration::from_secs(2));

    // The aborted connection drops its socket, ending the server's drain early.
    let recorded = server.await.unwrap();
    assert_eq!(recorded.frames.len(), 2);
}

#[tokio::test]
async fn test_recognize_server_close_is_transport_error() {
    let (url, server) =
        spawn_server(vec![Step::Expect(2), Step::Close], Duration::from_secs(2)).await;

    let err = volc_speech::core::asr::recognize(&asr_config(url), vec![0u8; 64], "wav")
        .await
        .unwrap_err();
    assert!(matches!(err, SpeechError::Transport(_)), "got {err:?}");
    server.await.unwrap();
}
