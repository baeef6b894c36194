//! Integration tests for infrastructure crate
//!
//! Tests cover:
//! - Pipeline bootstrap against mocked vendor APIs
//! - File-backed audio cache shared with cloud synthesis
//! - Provider fallback through the assembled chains

use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use domain::{PipelineRequest, Stage, TtsOptions, TtsServiceType};
use infrastructure::{AppConfig, CacheBackend, build_pipeline};
use resilience::{AttemptOutcome, RetryConfig, SkipReason};

fn config_for(mock_server: &MockServer, cache_dir: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.speech.openai_api_key = Some("sk-test".to_string());
    config.speech.openai_base_url = mock_server.uri();
    config.speech.timeout_ms = 5000;
    config.speech.elevenlabs.enhance_before_fallback = false;
    config.speech.whisper_cpp.executable_path = "/nonexistent/whisper-cli".into();
    config.translation.openai_api_key = Some("sk-test".to_string());
    config.translation.openai_base_url = mock_server.uri();
    config.translation.mymemory.base_url = mock_server.uri();
    config.translation.mymemory.retry = RetryConfig::disabled();
    config.tts_cache.backend = CacheBackend::File;
    config.tts_cache.dir = Some(cache_dir.to_path_buf());
    config
}

async fn mount_translation(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello world"}}]
        })))
        .mount(mock_server)
        .await;
}

// ============================================================================
// Bootstrap Tests
// ============================================================================

mod bootstrap_tests {
    use super::*;

    #[tokio::test]
    async fn cloud_audio_is_cached_on_disk() {
        let mock_server = MockServer::start().await;
        let cache_dir = tempfile::tempdir().unwrap();
        mount_translation(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xFB, 0x10]))
            .expect(1)
            .mount(&mock_server)
            .await;

        let pipeline = build_pipeline(&config_for(&mock_server, cache_dir.path()))
            .await
            .unwrap();
        let request = PipelineRequest::from_text("Bonjour le monde", "fr", "en")
            .with_tts(TtsOptions::new(TtsServiceType::Cloud));

        let first = pipeline.orchestrator.process(request.clone()).await.unwrap();
        let second = pipeline.orchestrator.process(request).await.unwrap();

        assert_eq!(first.translated_text, "Hello world");
        assert_eq!(first.audio, vec![0xFF, 0xFB, 0x10]);
        assert_eq!(second.audio, first.audio);

        let entries: Vec<_> = std::fs::read_dir(cache_dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "audio"))
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn sweep_through_pipeline_cache() {
        let mock_server = MockServer::start().await;
        let cache_dir = tempfile::tempdir().unwrap();
        let mut config = config_for(&mock_server, cache_dir.path());
        config.tts_cache.ttl_secs = 60;

        let pipeline = build_pipeline(&config).await.unwrap();
        let cache = pipeline.cache.unwrap();
        cache.put("abcd", &[1, 2]).await.unwrap();

        let entry = cache_dir.path().join("abcd.audio");
        let file = std::fs::File::options().write(true).open(&entry).unwrap();
        file.set_modified(std::time::SystemTime::now() - Duration::from_secs(120))
            .unwrap();

        assert_eq!(cache.sweep_expired().await.unwrap(), 1);
        assert!(!entry.exists());
    }
}

// ============================================================================
// Fallback Tests
// ============================================================================

mod fallback_tests {
    use super::*;

    #[tokio::test]
    async fn whisper_outage_falls_through_to_local_and_reports_every_provider() {
        let mock_server = MockServer::start().await;
        let cache_dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let pipeline = build_pipeline(&config_for(&mock_server, cache_dir.path()))
            .await
            .unwrap();

        let err = pipeline
            .orchestrator
            .process(PipelineRequest::from_audio(vec![0x1A, 0x45, 0xDF, 0xA3], "fr", "en"))
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Stt);
        let application::PipelineError::Exhausted { attempts, .. } = err else {
            panic!("expected exhausted STT chain");
        };
        assert_eq!(attempts.len(), 3);
        assert!(matches!(attempts[0].outcome, AttemptOutcome::Failed(_)));
        assert!(matches!(
            attempts[1].outcome,
            AttemptOutcome::Skipped(SkipReason::NotConfigured)
        ));
        assert_eq!(attempts[2].provider, "whisper-cpp");

        let whisper = pipeline
            .orchestrator
            .stt()
            .chain()
            .breaker("openai-whisper")
            .unwrap()
            .snapshot();
        assert!(whisper.is_down);
    }

    #[tokio::test]
    async fn paid_translator_quota_uses_free_translator() {
        let mock_server = MockServer::start().await;
        let cache_dir = tempfile::tempdir().unwrap();

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "You exceeded your current quota", "code": "insufficient_quota"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "responseData": {"translatedText": "Good morning class"},
                "responseStatus": 200
            })))
            .mount(&mock_server)
            .await;

        let pipeline = build_pipeline(&config_for(&mock_server, cache_dir.path()))
            .await
            .unwrap();

        for _ in 0..2 {
            let result = pipeline
                .orchestrator
                .process(
                    PipelineRequest::from_text("Bonjour la classe", "fr", "en")
                        .with_tts(TtsOptions::new(TtsServiceType::Silent)),
                )
                .await
                .unwrap();
            assert_eq!(result.translated_text, "Good morning class");
        }
    }
}
