use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use media_api::{app, AppState};
use media_metrics::MetricsService;
use media_models::Config;
use media_testsupport::{sample_info, StubExtractor};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

const URL: &str = "https://www.youtube.com/watch?v=abc";

struct TestApp {
    router: Router,
    _frontend: TempDir,
}

fn setup_with(mut config: Config, stub: StubExtractor) -> TestApp {
    let frontend = tempfile::tempdir().unwrap();
    std::fs::write(
        frontend.path().join("index.html"),
        "<html><body>sessions</body></html>",
    )
    .unwrap();
    std::fs::write(frontend.path().join("app.js"), "console.log('hi');").unwrap();
    config.server.frontend_dir = frontend.path().to_string_lossy().into_owned();

    let metrics = Arc::new(MetricsService::new().unwrap());
    let state = AppState::with_extractor(config, Arc::new(stub), metrics);
    TestApp {
        router: app(state),
        _frontend: frontend,
    }
}

fn setup(stub: StubExtractor) -> TestApp {
    setup_with(Config::default(), stub)
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn call(
    app: &TestApp,
    method: Method,
    uri: &str,
    session: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(session) = session {
        builder = builder.header("X-Session-ID", session);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let (status, bytes) = send(app, request).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn start(app: &TestApp, session: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/start",
        Some(session),
        Some(json!({ "url": URL })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["job_id"].as_str().unwrap().to_string()
}

async fn wait_ready(app: &TestApp, session: &str, job_id: &str) -> Value {
    for _ in 0..300 {
        let (_, job) = call(app, Method::GET, &format!("/status/{job_id}"), Some(session), None).await;
        if job["status"] != "processing" {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} never finished");
}

#[tokio::test]
async fn api_info_describes_service() {
    let app = setup(StubExtractor::returning(sample_info()));
    let (status, body) = call(&app, Method::GET, "/api/info", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "3.0");
    assert_eq!(body["endpoints"].as_array().unwrap().len(), 6);
    assert!(!body["features"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_and_metrics() {
    let app = setup(StubExtractor::returning(sample_info()));

    let request = Request::get("/healthz").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    start(&app, "m").await;
    let request = Request::get("/metrics").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    let metrics = media_testsupport::prom_parse(&text).unwrap();
    assert_eq!(metrics.counters.get("media_jobs_started_total"), Some(&1.0));
}

#[tokio::test]
async fn serves_frontend() {
    let app = setup(StubExtractor::returning(sample_info()));

    let (status, body) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("sessions"));

    let (status, _) = send(&app, Request::get("/app.js").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Request::get("/missing.css").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn start_validates_url() {
    let app = setup(StubExtractor::returning(sample_info()));

    let (status, body) = call(&app, Method::POST, "/start", Some("s"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "URL required");

    let request = Request::post("/start").body(Body::from("not json")).unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        Method::POST,
        "/start",
        Some("s"),
        Some(json!({ "url": "https://example.com/v" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("URL not allowed"));
}

#[tokio::test]
async fn start_then_download() {
    let app = setup(StubExtractor::returning(sample_info()));

    let (status, body) = call(
        &app,
        Method::POST,
        "/start",
        Some("alice"),
        Some(json!({ "url": URL, "quality": "best" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["session_id"], "alice");
    let job_id = body["job_id"].as_str().unwrap().to_string();
    assert_eq!(body["status_url"], format!("/status/{job_id}"));

    let job = wait_ready(&app, "alice", &job_id).await;
    assert_eq!(job["status"], "ready");
    assert_eq!(job["progress"], 100);
    assert_eq!(job["title"], "Sample clip");

    let (status, body) = call(&app, Method::GET, &format!("/download/{job_id}"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["download_url"], "https://cdn.example/direct.mp4");
    assert_eq!(body["filename"], "Sample clip.mp4");
    assert_eq!(body["file_size"], 5_000_000);
}

#[tokio::test]
async fn other_sessions_get_not_found() {
    let app = setup(StubExtractor::returning(sample_info()));
    let job_id = start(&app, "alice").await;
    wait_ready(&app, "alice", &job_id).await;

    for (method, path) in [
        (Method::GET, format!("/status/{job_id}")),
        (Method::GET, format!("/download/{job_id}")),
        (Method::DELETE, format!("/cancel/{job_id}")),
    ] {
        let (status, body) = call(&app, method, &path, Some("bob"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert!(body["error"].is_string());
    }

    let (_, body) = call(&app, Method::GET, "/jobs", Some("bob"), None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn missing_header_uses_default_session() {
    let app = setup(StubExtractor::returning(sample_info()));
    let job_id = start(&app, "default").await;

    let (status, body) = call(&app, Method::GET, &format!("/status/{job_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "default");
}

#[tokio::test]
async fn overlong_session_is_rejected() {
    let app = setup(StubExtractor::returning(sample_info()));
    let long = "s".repeat(129);
    let (status, body) = call(&app, Method::GET, "/jobs", Some(&long), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid session id"));
}

#[tokio::test]
async fn cancel_and_list() {
    let stub = StubExtractor::returning(sample_info()).with_delay(Duration::from_secs(30));
    let app = setup(stub);

    let first = start(&app, "s").await;
    let second = start(&app, "s").await;

    let (status, body) = call(&app, Method::GET, &format!("/download/{first}"), Some("s"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Download is not ready");

    let (status, body) = call(&app, Method::DELETE, &format!("/cancel/{first}"), Some("s"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = call(&app, Method::DELETE, "/cancel/nope", Some("s"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Job not found in this session");

    let (status, body) = call(&app, Method::GET, "/jobs", Some("s"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "s");
    assert_eq!(body["total"], 2);
    assert_eq!(body["active"], 1);
    assert_eq!(body["jobs"][0]["status"], "cancelled");

    call(&app, Method::DELETE, &format!("/cancel/{second}"), Some("s"), None).await;
}

#[tokio::test]
async fn formats_returns_catalog() {
    let app = setup(StubExtractor::returning(sample_info()));
    let (status, body) = call(&app, Method::POST, "/formats", None, Some(json!({ "url": URL }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total_formats"], 8);
    assert_eq!(body["common_qualities"][0]["value"], "best");
    assert_eq!(body["common_qualities"][0]["type"], "auto");
    assert_eq!(body["detailed_formats"]["audio_only"][0]["type"], "audio");
    assert_eq!(body["video_info"]["title"], "Sample clip");
}

#[tokio::test]
async fn formats_errors_report_success_false() {
    let app = setup(StubExtractor::failing("ERROR: login required"));

    let (status, body) = call(&app, Method::POST, "/formats", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "URL required");
    assert!(body.get("platform_detected").is_none());

    let (status, body) = call(
        &app,
        Method::POST,
        "/formats",
        None,
        Some(json!({ "url": "https://www.instagram.com/p/xyz/" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["platform_detected"], "instagram");
    assert_eq!(
        body["error"],
        "This Instagram content is private or requires login"
    );
}

#[tokio::test]
async fn cors_preflight_for_allowed_origin() {
    let app = setup(StubExtractor::returning(sample_info()));

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/start")
        .header(header::ORIGIN, "http://localhost:1005")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type,x-session-id")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:1005"
    );

    let request = Request::builder()
        .uri("/api/info")
        .header(header::ORIGIN, "https://elsewhere.example")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn slow_requests_time_out() {
    let mut config = Config::default();
    config.server.request_timeout_secs = 1;
    let stub = StubExtractor::returning(sample_info()).with_delay(Duration::from_secs(10));
    let app = setup_with(config, stub);

    let (status, _) = call(&app, Method::POST, "/formats", None, Some(json!({ "url": URL }))).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);

    let (status, _) = call(&app, Method::GET, "/api/info", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
