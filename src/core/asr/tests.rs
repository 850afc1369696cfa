use super::*;
use crate::core::error::SpeechError;
use crate::core::protocol::legacy::test_support::server_response;
use crate::core::protocol::{gzip_compress, gzip_decompress};
use crate::core::session::SegmentedProtocol;

fn test_config() -> AsrConfig {
    AsrConfig {
        app_id: "app-1".to_string(),
        access_token: "tok".to_string(),
        ..Default::default()
    }
}

fn chunk_payload(chunk: &[u8]) -> Vec<u8> {
    let len = i32::from_be_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]) as usize;
    gzip_decompress(&chunk[8..8 + len]).unwrap()
}

#[test]
fn test_default_config() {
    let config = AsrConfig::default();
    assert_eq!(config.url, ASR_URL);
    assert_eq!(config.cluster, "volc_sms_status");
    assert_eq!(config.user_id, "user_001");
    assert_eq!(config.timeout.as_secs(), 20);
    assert_eq!(config.chunk_size, 16384);
}

#[test]
fn test_authorization_header_format() {
    assert_eq!(test_config().authorization(), "Bearer; tok");
}

#[test]
fn test_request_json_shape() {
    let request = AsrRequest::one_shot(&test_config(), "req-1", "wav");
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["app"]["appid"], "app-1");
    assert_eq!(json["app"]["cluster"], "volc_sms_status");
    assert_eq!(json["app"]["token"], "tok");
    assert_eq!(json["user"]["uid"], "user_001");
    assert_eq!(json["request"]["reqid"], "req-1");
    assert_eq!(json["request"]["workflow"], ASR_WORKFLOW);
    assert_eq!(json["request"]["nbest"], 1);
    assert_eq!(json["request"]["show_utterances"], true);
    assert_eq!(json["request"]["result_type"], "full");
    assert_eq!(json["request"]["sequence"], 1);
    assert_eq!(json["audio"]["format"], "wav");
    assert_eq!(json["audio"]["codec"], "raw");
    assert_eq!(json["audio"]["rate"], 24000);
    assert_eq!(json["audio"]["bits"], 16);
    assert_eq!(json["audio"]["channels"], 1);
}

#[test]
fn test_empty_audio_rejected() {
    let err = RecognitionSession::new(test_config(), Vec::new(), "wav").unwrap_err();
    assert!(matches!(err, SpeechError::InvalidInput(_)));
}

#[test]
fn test_request_ids_are_unique() {
    let a = RecognitionSession::new(test_config(), vec![1], "wav").unwrap();
    let b = RecognitionSession::new(test_config(), vec![1], "wav").unwrap();
    assert_ne!(a.request_id(), b.request_id());
}

#[test]
fn test_handshake_carries_bearer_token() {
    let session = RecognitionSession::new(test_config(), vec![1], "wav").unwrap();
    let request = session.handshake().unwrap();
    assert_eq!(request.headers()["Authorization"], "Bearer; tok");
}

#[test]
fn test_opening_frames_for_40k_audio() {
    let audio: Vec<u8> = (0..40 * 1024).map(|i| (i % 251) as u8).collect();
    let mut session = RecognitionSession::new(test_config(), audio.clone(), "wav").unwrap();
    let request_id = session.request_id().to_string();

    let frames = session.opening_frames().unwrap();
    assert_eq!(frames.len(), 4);

    assert_eq!(&frames[0][..4], &[0x11, 0x10, 0x11, 0x00]);
    let params: serde_json::Value = serde_json::from_slice(&chunk_payload(&frames[0])).unwrap();
    assert_eq!(params["request"]["reqid"], request_id.as_str());

    assert_eq!(frames[1][1], 0x20);
    assert_eq!(frames[2][1], 0x20);
    assert_eq!(frames[3][1], 0x22);

    let sizes: Vec<usize> = frames[1..]
        .iter()
        .map(|f| chunk_payload(f).len())
        .collect();
    assert_eq!(sizes, vec![16384, 16384, 8192]);

    let rebuilt: Vec<u8> = frames[1..].iter().flat_map(|f| chunk_payload(f)).collect();
    assert_eq!(rebuilt, audio);
}

#[test]
fn test_small_audio_is_single_last_chunk() {
    let mut session = RecognitionSession::new(test_config(), vec![7; 100], "mp3").unwrap();
    let frames = session.opening_frames().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1][1], 0x22);
}

#[test]
fn test_final_response_completes_with_text() {
    let mut session = RecognitionSession::new(test_config(), vec![1], "wav").unwrap();
    let frame = server_response(r#"{"code":1000,"sequence":-1,"result":[{"text":"hello"}]}"#);

    let completion = session.on_frame(&frame).unwrap();
    assert_eq!(completion.result, Ok("hello".to_string()));
    assert!(completion.farewell.is_none());
}

#[test]
fn test_final_response_without_result_is_empty_text() {
    let mut session = RecognitionSession::new(test_config(), vec![1], "wav").unwrap();
    let frame = server_response(r#"{"code":1000,"sequence":-2}"#);
    let completion = session.on_frame(&frame).unwrap();
    assert_eq!(completion.result, Ok(String::new()));
}

#[test]
fn test_interim_response_keeps_waiting() {
    let mut session = RecognitionSession::new(test_config(), vec![1], "wav").unwrap();
    let frame = server_response(r#"{"code":1000,"sequence":2,"result":[{"text":"hel"}]}"#);
    assert!(session.on_frame(&frame).is_none());
}

#[test]
fn test_error_response_fails_session() {
    let mut session = RecognitionSession::new(test_config(), vec![1], "wav").unwrap();
    let frame = server_response(r#"{"code":1001,"message":"busy","sequence":1}"#);

    let completion = session.on_frame(&frame).unwrap();
    assert_eq!(completion.result, Err(SpeechError::api(1001, "busy")));
}

#[test]
fn test_malformed_frames_are_ignored() {
    let mut session = RecognitionSession::new(test_config(), vec![1], "wav").unwrap();
    assert!(session.on_frame(&[0x11]).is_none());

    let mut bad_json = vec![0x11, 0x90, 0x11, 0x00];
    let payload = gzip_compress(b"not json").unwrap();
    bad_json.extend_from_slice(&(payload.len() as i32).to_be_bytes());
    bad_json.extend_from_slice(&payload);
    assert!(session.on_frame(&bad_json).is_none());

    // Acknowledgement-type frames are not full responses.
    assert!(session.on_frame(&[0x11, 0xB0, 0x00, 0x00, 0, 0, 0, 0]).is_none());
}

#[tokio::test]
async fn test_recognize_rejects_empty_audio_without_connecting() {
    let config = AsrConfig {
        url: "ws://127.0.0.1:1/".to_string(),
        ..test_config()
    };
    let err = recognize(&config, Vec::new(), "wav").await.unwrap_err();
    assert!(matches!(err, SpeechError::InvalidInput(_)));
}
