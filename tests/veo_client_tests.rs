//! Mock HTTP tests for VeoClient.
//!
//! These tests cover:
//! - Client creation and configuration
//! - Request formatting (headers, body, paths)
//! - Operation parsing
//! - Error classification
//! - Streaming download
//! - A full submit / poll / download run through the manager

use std::time::Duration;

use base64::Engine;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use veo_studio::generation::{
    ArtifactStore, ErrorKind, GenerationManager, GenerationOperation, GenerationRequest,
    GenerationState, LifecycleOptions, ProgressStage, ProviderError, ReferenceImage,
    VideoProvider, DOWNLOAD_MESSAGE, LOADING_MESSAGES,
};
use veo_studio::veo::{VeoClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

const API_KEY: &str = "test-api-key";
const MODEL: &str = "veo-test";
const OPERATION: &str = "models/veo-test/operations/op-123";

fn client_for(server: &MockServer) -> VeoClient {
    VeoClient::new(API_KEY.to_string(), server.uri(), MODEL.to_string()).unwrap()
}

fn request(prompt: &str) -> GenerationRequest {
    GenerationRequest::builder(prompt).build().unwrap()
}

fn pending_body() -> serde_json::Value {
    serde_json::json!({ "name": OPERATION })
}

fn done_body(uri: &str) -> serde_json::Value {
    serde_json::json!({
        "name": OPERATION,
        "done": true,
        "response": {
            "generateVideoResponse": {
                "generatedSamples": [{ "video": { "uri": uri } }]
            }
        }
    })
}

// === Client Creation Tests ===

#[test]
fn test_with_api_key_uses_defaults() {
    let client = VeoClient::with_api_key("key".to_string()).unwrap();
    assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    assert_eq!(client.model(), DEFAULT_MODEL);
}

#[test]
fn test_empty_api_key_returns_error() {
    let result = VeoClient::with_api_key("   ".to_string());
    assert!(matches!(result, Err(ProviderError::MissingApiKey)));
}

#[test]
fn test_with_base_url_trims_trailing_slash() {
    let client =
        VeoClient::with_base_url("key".to_string(), "https://custom.api/v1/".to_string())
            .unwrap();
    assert_eq!(client.base_url(), "https://custom.api/v1");
}

#[test]
fn test_debug_hides_api_key() {
    let client = VeoClient::with_api_key("super-secret".to_string()).unwrap();
    assert!(!format!("{:?}", client).contains("super-secret"));
}

// === Submit Tests ===

#[tokio::test]
async fn test_submit_sends_prompt_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/models/{}:predictLongRunning", MODEL)))
        .and(header("x-goog-api-key", API_KEY))
        .and(body_json(serde_json::json!({
            "instances": [{ "prompt": "a red ball bouncing" }],
            "parameters": { "sampleCount": 1, "generateAudio": true }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending_body()))
        .expect(1)
        .mount(&server)
        .await;

    let operation = client_for(&server)
        .submit(&request("a red ball bouncing"))
        .await
        .unwrap();

    assert_eq!(operation.name, OPERATION);
    assert!(!operation.done);
    assert!(operation.error.is_none());
}

#[tokio::test]
async fn test_submit_sends_inline_image_without_sound() {
    let server = MockServer::start().await;
    let bytes = vec![0x89, b'P', b'N', b'G'];
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);

    Mock::given(method("POST"))
        .and(path(format!("/models/{}:predictLongRunning", MODEL)))
        .and(body_json(serde_json::json!({
            "instances": [{
                "prompt": "the cat starts dancing",
                "image": { "bytesBase64Encoded": encoded, "mimeType": "image/png" }
            }],
            "parameters": { "sampleCount": 1, "generateAudio": false }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending_body()))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerationRequest::builder("the cat starts dancing")
        .image(ReferenceImage::new(bytes, "image/png").unwrap())
        .sound(false)
        .build()
        .unwrap();

    client_for(&server).submit(&request).await.unwrap();
}

#[tokio::test]
async fn test_submit_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "30")
                .set_body_string("Resource exhausted"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit(&request("a cat"))
        .await
        .unwrap_err();

    match err {
        ProviderError::RateLimited {
            message,
            retry_after_secs,
        } => {
            assert_eq!(message, "Resource exhausted");
            assert_eq!(retry_after_secs, Some(30));
        }
        other => panic!("Expected RateLimited, got {:?}", other),
    }
}

#[tokio::test]
async fn test_submit_content_policy_violation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string("The prompt was blocked by safety filters"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit(&request("a cat"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::ContentPolicyViolation { .. }));
}

#[tokio::test]
async fn test_submit_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit(&request("a cat"))
        .await
        .unwrap_err();

    match err {
        ProviderError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "internal");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_submit_malformed_body_is_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .submit(&request("a cat"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Http(_)));
}

// === Poll Tests ===

#[tokio::test]
async fn test_poll_uses_operation_path() {
    let server = MockServer::start().await;
    let uri = "https://files.example.com/v1beta/files/abc:download?alt=media";

    Mock::given(method("GET"))
        .and(path(format!("/{}", OPERATION)))
        .and(header("x-goog-api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(done_body(uri)))
        .expect(1)
        .mount(&server)
        .await;

    let operation = client_for(&server)
        .poll(&GenerationOperation::pending(OPERATION))
        .await
        .unwrap();

    assert!(operation.done);
    assert_eq!(operation.result_uri.as_deref(), Some(uri));
}

#[tokio::test]
async fn test_poll_reports_operation_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/{}", OPERATION)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": OPERATION,
            "done": true,
            "error": { "code": 3, "message": "Audio generation failed" }
        })))
        .mount(&server)
        .await;

    let operation = client_for(&server)
        .poll(&GenerationOperation::pending(OPERATION))
        .await
        .unwrap();

    let error = operation.error.unwrap();
    assert_eq!(error.code, Some(3));
    assert_eq!(error.message, "Audio generation failed");
}

// === Download Tests ===

#[tokio::test]
async fn test_download_appends_key_and_streams_to_file() {
    let server = MockServer::start().await;
    let video = vec![7u8; 64 * 1024];

    Mock::given(method("GET"))
        .and(path("/files/abc"))
        .and(query_param("alt", "media"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(video.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("nested").join("video.mp4");
    let locator = format!("{}/files/abc?alt=media", server.uri());

    let written = client_for(&server).download(&locator, &dest).await.unwrap();

    assert_eq!(written, video.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), video);
}

#[tokio::test]
async fn test_download_non_success_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/files/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let locator = format!("{}/files/gone", server.uri());
    let err = client_for(&server)
        .download(&locator, &dir.path().join("video.mp4"))
        .await
        .unwrap_err();

    match err {
        ProviderError::Api { status, .. } => assert_eq!(status, 404),
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_request_timeout_applies_to_status_checks_not_downloads() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/{}", OPERATION)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(pending_body())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"slow-video".to_vec())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).with_request_timeout(Duration::from_millis(100));

    let err = client
        .poll(&GenerationOperation::pending(OPERATION))
        .await
        .unwrap_err();
    match err {
        ProviderError::Http(e) => assert!(e.is_timeout()),
        other => panic!("Expected Http timeout, got {:?}", other),
    }

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("video.mp4");
    let written = client
        .download(&format!("{}/files/slow", server.uri()), &dest)
        .await
        .unwrap();
    assert_eq!(written, 10);
}

#[tokio::test]
async fn test_download_invalid_locator() {
    let dir = TempDir::new().unwrap();
    let client = VeoClient::with_api_key("key".to_string()).unwrap();
    let err = client
        .download("not a url", &dir.path().join("video.mp4"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidResponse(_)));
}

// === Lifecycle Tests ===

fn fast_options() -> LifecycleOptions {
    LifecycleOptions {
        poll_interval: Duration::from_millis(20),
        ..LifecycleOptions::default()
    }
}

#[tokio::test]
async fn test_full_generation_against_mock_server() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/models/{}:predictLongRunning", MODEL)))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending_body()))
        .expect(1)
        .mount(&server)
        .await;

    // First status check: still running
    Mock::given(method("GET"))
        .and(path(format!("/{}", OPERATION)))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let locator = format!("{}/files/video?alt=media", server.uri());
    Mock::given(method("GET"))
        .and(path(format!("/{}", OPERATION)))
        .respond_with(ResponseTemplate::new(200).set_body_json(done_body(&locator)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/video"))
        .and(query_param("key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path().to_path_buf());
    let mut manager = GenerationManager::with_options(client_for(&server), store, fast_options());

    let mut events = Vec::new();
    let artifact = manager
        .generate(request("a red ball"), &CancellationToken::new(), |e| {
            events.push(e)
        })
        .await
        .unwrap();

    assert_eq!(manager.state(), GenerationState::Succeeded);
    assert_eq!(artifact.id(), ArtifactStore::artifact_id(OPERATION));
    assert_eq!(artifact.size_bytes(), 9);
    assert_eq!(std::fs::read(artifact.path()).unwrap(), b"mp4-bytes");

    let stages: Vec<ProgressStage> = events.iter().map(|e| e.stage).collect();
    assert_eq!(
        stages,
        vec![
            ProgressStage::Starting,
            ProgressStage::Polling { poll: 1 },
            ProgressStage::Polling { poll: 2 },
            ProgressStage::Downloading,
        ]
    );
    assert_eq!(events[0].message, LOADING_MESSAGES[0]);
    assert_eq!(events[1].message, LOADING_MESSAGES[1]);
    assert_eq!(events[3].message, DOWNLOAD_MESSAGE);
}

#[tokio::test]
async fn test_submit_failure_is_classified_and_never_polls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending_body()))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut manager = GenerationManager::with_options(
        client_for(&server),
        ArtifactStore::new(dir.path().to_path_buf()),
        fast_options(),
    );

    let err = manager
        .generate(request("a cat"), &CancellationToken::new(), |_| {})
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SubmissionFailed);
    assert_eq!(
        err.to_string(),
        "Failed to start video generation. Check your prompt or image and try again."
    );
    assert!(matches!(
        err.provider_error(),
        Some(ProviderError::Api { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_failed_download_leaves_no_artifact() {
    let server = MockServer::start().await;
    let locator = format!("{}/files/broken", server.uri());

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(done_body(&locator)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path().to_path_buf());
    let mut manager = GenerationManager::with_options(client_for(&server), store, fast_options());

    let err = manager
        .generate(request("a cat"), &CancellationToken::new(), |_| {})
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DownloadFailed);
    assert_eq!(err.to_string(), "Failed to download the generated video file.");
    assert!(manager.store().list_entries().unwrap().is_empty());
}
