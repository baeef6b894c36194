//! Integration tests for ai_speech crate
//!
//! Drives the vendor adapters against mocked HTTP APIs.

use ai_speech::{
    AudioData, AudioEnhancer, AudioFormat, DeepgramConfig, DeepgramSttProvider, ElevenLabsConfig,
    ElevenLabsVoiceIsolation, OpenAISpeechProvider, SpeechConfig, SpeechError, SpeechToText,
    SynthesisRequest, TextToSpeech,
};
use resilience::ProviderFailure;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openai_config(base_url: &str) -> SpeechConfig {
    SpeechConfig {
        openai_api_key: Some("test-api-key".to_string()),
        openai_base_url: base_url.to_string(),
        output_format: AudioFormat::Opus,
        timeout_ms: 5000,
        ..Default::default()
    }
}

/// Minimal WebM/EBML header
fn mock_webm_audio() -> Vec<u8> {
    vec![0x1A, 0x45, 0xDF, 0xA3, 0x9F, 0x42, 0x86, 0x81, 0x01]
}

#[tokio::test]
async fn utterance_round_trip_through_openai() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "text": "Bonjour le monde",
            "language": "french",
            "duration": 1.5
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/audio/speech"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x4F, 0x67, 0x67, 0x53])
                .insert_header("content-type", "audio/ogg"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenAISpeechProvider::new(openai_config(&mock_server.uri())).unwrap();

    let transcription = provider
        .transcribe(
            AudioData::new(mock_webm_audio(), AudioFormat::Webm),
            Some("fr"),
        )
        .await
        .unwrap();
    assert_eq!(transcription.text, "Bonjour le monde");

    let speech = provider
        .synthesize(&SynthesisRequest::new("Hello world"))
        .await
        .unwrap();
    assert_eq!(speech.format(), AudioFormat::Opus);
    assert!(!speech.is_empty());
}

#[tokio::test]
async fn quota_errors_keep_status_for_classification() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {
                "message": "You exceeded your current quota",
                "type": "insufficient_quota",
                "code": "insufficient_quota"
            }
        })))
        .mount(&mock_server)
        .await;

    let provider = OpenAISpeechProvider::new(openai_config(&mock_server.uri())).unwrap();
    let err = provider
        .transcribe(AudioData::new(mock_webm_audio(), AudioFormat::Webm), None)
        .await
        .unwrap_err();

    let failure = ProviderFailure::from(err);
    assert_eq!(failure.status, Some(429));
    assert!(failure.message.contains("quota"));
}

#[tokio::test]
async fn isolated_audio_feeds_deepgram() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio-isolation"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xFB, 0x90, 0x00]))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/listen"))
        .and(header("content-type", "audio/mpeg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": {"channels": [{"alternatives": [{"transcript": "clean speech"}]}]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let isolation = ElevenLabsVoiceIsolation::new(
        ElevenLabsConfig {
            api_key: Some("xi".to_string()),
            base_url: mock_server.uri(),
            ..Default::default()
        },
        5000,
    )
    .unwrap();
    let deepgram = DeepgramSttProvider::new(
        DeepgramConfig {
            api_key: Some("dg".to_string()),
            base_url: mock_server.uri(),
            ..Default::default()
        },
        5000,
    )
    .unwrap();

    let noisy = AudioData::new(mock_webm_audio(), AudioFormat::Webm);
    let clean = isolation.enhance(&noisy).await.unwrap();
    let transcription = deepgram.transcribe(clean, Some("en")).await.unwrap();

    assert_eq!(transcription.text, "clean speech");
}

#[tokio::test]
async fn unreachable_host_is_a_connection_failure() {
    let config = DeepgramConfig {
        api_key: Some("dg".to_string()),
        base_url: "http://127.0.0.1:1".to_string(),
        ..Default::default()
    };
    let provider = DeepgramSttProvider::new(config, 2000).unwrap();

    let err = provider
        .transcribe(AudioData::new(vec![1], AudioFormat::Wav), None)
        .await
        .unwrap_err();

    assert!(matches!(err, SpeechError::ConnectionFailed(_)));
    let failure = ProviderFailure::from(err);
    assert!(failure.status.is_none());
}
