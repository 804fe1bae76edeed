use bytes::Bytes;
use voice_session::{AudioClip, ElevenLabsClient, ElevenLabsError, DEFAULT_VOICE_ID};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn clip() -> AudioClip {
    AudioClip {
        data: Bytes::from_static(b"webm-audio"),
        duration_ms: 1200,
        mime_type: "audio/webm".to_string(),
    }
}

#[tokio::test]
async fn test_text_to_speech_returns_audio_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/text-to-speech/{}", DEFAULT_VOICE_ID)))
        .and(header("xi-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "text": "Welcome to the boutique",
            "model_id": "eleven_multilingual_v2",
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.75,
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp3-bytes".to_vec()))
        .mount(&server)
        .await;

    let client = ElevenLabsClient::new("test-key").with_base_url(server.uri());
    let audio = client
        .text_to_speech("Welcome to the boutique", DEFAULT_VOICE_ID)
        .await
        .unwrap();

    assert_eq!(audio.as_ref(), b"mp3-bytes");
}

#[tokio::test]
async fn test_text_to_speech_surfaces_api_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let client = ElevenLabsClient::new("bad-key").with_base_url(server.uri());
    let err = client
        .text_to_speech("hello", DEFAULT_VOICE_ID)
        .await
        .unwrap_err();

    match err {
        ElevenLabsError::Api { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_speech_to_text_parses_transcript() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/speech-to-text"))
        .and(header("xi-api-key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "text": "show me citrus perfumes" })),
        )
        .mount(&server)
        .await;

    let client = ElevenLabsClient::new("test-key").with_base_url(server.uri());
    let text = client.speech_to_text(&clip()).await.unwrap();

    assert_eq!(text, "show me citrus perfumes");
}

#[tokio::test]
async fn test_speech_to_text_tolerates_missing_text_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/speech-to-text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = ElevenLabsClient::new("test-key").with_base_url(server.uri());
    let text = client.speech_to_text(&clip()).await.unwrap();

    assert_eq!(text, "");
}

#[tokio::test]
async fn test_voices_lists_available_voices() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/voices"))
        .and(header("xi-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "voices": [
                { "voice_id": "21m00Tcm4TlvDq8ikWAM", "name": "Rachel" },
                { "voice_id": "abc123", "name": "Antoni" }
            ]
        })))
        .mount(&server)
        .await;

    let client = ElevenLabsClient::new("test-key").with_base_url(server.uri());
    let voices = client.voices().await.unwrap();

    assert_eq!(voices.len(), 2);
    assert_eq!(voices[0].voice_id, DEFAULT_VOICE_ID);
    assert_eq!(voices[0].name, "Rachel");
}
