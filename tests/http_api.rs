//! HTTP 接口测试（tower oneshot，不监听端口）

mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

use clonevox::application::AudioCodecPort;
use clonevox::domain::speaker::DurationBounds;
use clonevox::domain::synthesis::RequestLimits;
use clonevox::infrastructure::adapters::{FakeSynthesisBackend, FileReferenceAudioStorage, WavCodec};
use clonevox::infrastructure::http::{build_router, AppState, SynthesisDefaults};
use clonevox::infrastructure::memory::InMemorySpeakerRepository;
use common::{wav_bytes, Backends};

const BOUNDARY: &str = "clonevox-test-boundary";

struct TestApp {
    router: Router,
    backends: Backends,
    _dir: TempDir,
}

impl TestApp {
    async fn new(backends: Backends) -> Self {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(
            backends.registry().await,
            Arc::new(InMemorySpeakerRepository::new()),
            Arc::new(FileReferenceAudioStorage::new(dir.path())),
            Arc::new(WavCodec::new()),
            DurationBounds::default(),
            RequestLimits::default(),
            SynthesisDefaults::default(),
        );

        Self {
            router: build_router(Arc::new(state), 50 * 1024 * 1024),
            backends,
            _dir: dir,
        }
    }

    async fn ready() -> Self {
        Self::new(Backends::new(FakeSynthesisBackend::named("xtts"))).await
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn delete(&self, uri: &str) -> Response {
        self.send(Request::delete(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_json(&self, uri: &str, body: Value) -> Response {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn clone_speaker(&self, speaker_id: &str, audio: Vec<u8>) -> Response {
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"speaker_id\"\r\n\r\n{id}\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"ref.wav\"\r\n\
             Content-Type: audio/wav\r\n\r\n",
            b = BOUNDARY,
            id = speaker_id
        )
        .into_bytes();
        body.extend_from_slice(&audio);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::post("/clone")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn ping_and_health() {
    let app = TestApp::ready().await;

    let response = app.get("/api/ping").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");

    let body = json_body(app.get("/health").await).await;
    assert_eq!(body["errno"], 0);
    assert_eq!(body["data"]["ready"], true);
    assert_eq!(body["data"]["active_backend"], "xtts");
    assert_eq!(body["data"]["available_backends"], json!(["xtts", "chatterbox"]));
    assert_eq!(body["data"]["speaker_count"], 0);
}

#[tokio::test]
async fn list_and_switch_models() {
    let app = TestApp::ready().await;

    let body = json_body(app.get("/models").await).await;
    let backends = body["data"]["backends"].as_array().unwrap();
    assert_eq!(backends.len(), 3);
    assert_eq!(backends[1]["name"], "openvoice");
    assert_eq!(backends[1]["available"], false);

    let response = app.post_json("/models/switch", json!({"model": "chatterbox"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["active_model"], "chatterbox");

    let response = app.post_json("/models/switch", json!({"model": "openvoice"})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["errno"], 409);
    assert_eq!(body["kind"], "backend_not_available");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn speaker_lifecycle() {
    let app = TestApp::ready().await;

    let response = app.clone_speaker("alice", wav_bytes(5000)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["speaker_id"], "alice");
    assert_eq!(body["data"]["replaced"], false);

    let body = json_body(app.get("/speakers").await).await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["speakers"][0]["id"], "alice");

    let body = json_body(app.get("/speakers/alice").await).await;
    assert!((body["data"]["duration_secs"].as_f64().unwrap() - 5.0).abs() < 0.01);

    assert_eq!(app.delete("/speakers/alice").await.status(), StatusCode::OK);

    let response = app.delete("/speakers/alice").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["kind"], "speaker_not_found");
}

#[tokio::test]
async fn clone_rejects_bad_reference_audio() {
    let app = TestApp::ready().await;

    let response = app.clone_speaker("short", wav_bytes(2900)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["kind"], "audio_too_short");

    let response = app.clone_speaker("long", wav_bytes(60_100)).await;
    assert_eq!(json_body(response).await["kind"], "audio_too_long");

    let response = app.clone_speaker(&"x".repeat(101), wav_bytes(5000)).await;
    assert_eq!(json_body(response).await["kind"], "invalid_id");

    let body = json_body(app.get("/speakers").await).await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn not_ready_without_backends() {
    let backends = Backends {
        xtts: Arc::new(FakeSynthesisBackend::named("xtts").unhealthy()),
        openvoice: Arc::new(FakeSynthesisBackend::named("openvoice").unhealthy()),
        chatterbox: Arc::new(FakeSynthesisBackend::named("chatterbox").unhealthy()),
    };
    let app = TestApp::new(backends).await;

    let body = json_body(app.get("/health").await).await;
    assert_eq!(body["data"]["ready"], false);
    assert!(body["data"]["active_backend"].is_null());

    let response = app.clone_speaker("alice", wav_bytes(5000)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["kind"], "no_backend_available");
}

#[tokio::test]
async fn synthesize_returns_wav_with_diagnostics() {
    let app = TestApp::ready().await;
    app.clone_speaker("alice", wav_bytes(5000)).await;

    let response = app
        .post_json(
            "/synthesize",
            json!({
                "text": "Hello there. This is a cloned voice speaking.",
                "speaker_id": "alice",
                "chunk_size": 20,
                "chunk_min_seconds": 0
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "audio/wav");
    assert_eq!(headers["x-backend"], "xtts");
    let chunk_count: usize = headers["x-chunk-count"].to_str().unwrap().parse().unwrap();
    assert!(chunk_count >= 2);
    assert_eq!(app.backends.xtts.call_count(), chunk_count);
    assert_eq!(headers["x-chunks-below-threshold"], "0");

    let expected_ms = chunk_count as u64 * 3000;
    assert_eq!(headers["x-audio-duration-ms"], expected_ms.to_string().as_str());

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let decoded = WavCodec::new().decode(&bytes).unwrap();
    assert_eq!(decoded.duration_ms(), expected_ms);
}

#[tokio::test]
async fn synthesize_errors_use_envelope() {
    let app = TestApp::ready().await;

    let response = app
        .post_json("/synthesize", json!({"text": "Hello", "speaker_id": "ghost"}))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["kind"], "speaker_not_found");

    app.clone_speaker("alice", wav_bytes(5000)).await;
    let response = app
        .post_json("/synthesize", json!({"text": "Hello", "speaker_id": "alice", "speed": 4.0}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["errno"], 400);
    assert_eq!(body["kind"], "validation_error");
    assert_eq!(app.backends.xtts.call_count(), 0);
}
