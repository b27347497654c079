//! Model dispatch against a mock OpenAI-compatible completion endpoint.

use serde_json::{json, Value};
use smarta_notes_lib::config::AiConfig;
use smarta_notes_lib::dispatcher::{fallback_response, BackoffPolicy, Dispatcher, EXHAUSTED_ERROR};
use smarta_notes_lib::llm::{ChatTurn, Role};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, models: &[&str]) -> AiConfig {
    AiConfig {
        api_key: Some("test-key".to_string()),
        base_url: server.uri(),
        models: models.iter().map(|m| m.to_string()).collect(),
        backoff: BackoffPolicy::none(),
        ..AiConfig::default()
    }
}

fn completion(content: &str) -> Value {
    json!({
        "id": "gen-1",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

async fn mount_answer(server: &MockServer, model: &str, content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": model })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(content)))
        .mount(server)
        .await;
}

async fn requested_models(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            body["model"].as_str().unwrap().to_string()
        })
        .collect()
}

#[tokio::test]
async fn test_all_models_failing_tries_each_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "message": "upstream exploded" }
        })))
        .expect(3)
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::new(&config(&server, &["m1", "m2", "m3"])).unwrap();
    let reply = dispatcher
        .respond("summarize this", "one two three", false, &[])
        .await;

    assert_eq!(reply.error.as_deref(), Some(EXHAUSTED_ERROR));
    assert_eq!(reply.model, None);
    assert_eq!(
        reply.content,
        fallback_response("summarize this", "one two three", false)
    );
    assert_eq!(requested_models(&server).await, ["m1", "m2", "m3"]);
    assert_eq!(dispatcher.preferred_index(), 0);
}

#[tokio::test]
async fn test_successful_model_becomes_sticky() {
    let server = MockServer::start().await;
    mount_answer(&server, "m2", "from m2").await;

    let dispatcher = Dispatcher::new(&config(&server, &["m1", "m2", "m3"])).unwrap();
    let first = dispatcher.respond("hello", "", false, &[]).await;
    assert_eq!(first.content, "from m2");
    assert_eq!(first.model.as_deref(), Some("m2"));
    assert!(first.error.is_none());
    assert_eq!(dispatcher.preferred_index(), 1);

    let second = dispatcher.respond("again", "", false, &[]).await;
    assert_eq!(second.content, "from m2");
    assert_eq!(requested_models(&server).await, ["m1", "m2", "m2"]);
}

#[tokio::test]
async fn test_iteration_wraps_from_preferred_index() {
    let server = MockServer::start().await;
    mount_answer(&server, "m3", "third").await;

    let dispatcher = Dispatcher::new(&config(&server, &["m1", "m2", "m3"])).unwrap();
    dispatcher.respond("q", "", false, &[]).await;
    server.reset().await;

    // m3 is preferred now; once it fails the cursor wraps to m1 and m2.
    let reply = dispatcher.respond("q", "", false, &[]).await;
    assert_eq!(reply.error.as_deref(), Some(EXHAUSTED_ERROR));
    assert_eq!(requested_models(&server).await, ["m3", "m1", "m2"]);
}

#[tokio::test]
async fn test_rate_limited_model_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "model": "m1" })))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Rate limit exceeded: free-models-per-min", "code": 429 }
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_answer(&server, "m2", "second wins").await;

    let dispatcher = Dispatcher::new(&config(&server, &["m1", "m2"])).unwrap();
    let reply = dispatcher.respond("hi", "", false, &[]).await;
    assert_eq!(reply.content, "second wins");
    assert_eq!(dispatcher.preferred_index(), 1);
}

#[tokio::test]
async fn test_rate_limit_code_on_other_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "model": "m1" })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "slow down", "code": "rate_limit_exceeded" }
        })))
        .mount(&server)
        .await;
    mount_answer(&server, "m2", "ok").await;

    let dispatcher = Dispatcher::new(&config(&server, &["m1", "m2"])).unwrap();
    assert_eq!(dispatcher.respond("hi", "", false, &[]).await.content, "ok");
}

#[tokio::test]
async fn test_malformed_body_counts_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "model": "m1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "model": "m2" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;
    mount_answer(&server, "m3", "finally").await;

    let dispatcher = Dispatcher::new(&config(&server, &["m1", "m2", "m3"])).unwrap();
    let reply = dispatcher.respond("hi", "", false, &[]).await;
    assert_eq!(reply.content, "finally");
    assert_eq!(dispatcher.preferred_index(), 2);
}

#[tokio::test]
async fn test_no_key_sends_nothing() {
    let server = MockServer::start().await;
    let mut cfg = config(&server, &["m1"]);
    cfg.api_key = None;

    let dispatcher = Dispatcher::new(&cfg).unwrap();
    assert!(!dispatcher.is_remote());
    let reply = dispatcher.respond("explain this", "ctx", false, &[]).await;
    assert!(reply.error.is_none());
    assert_eq!(reply.content, fallback_response("explain this", "ctx", false));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_test_mode_sends_nothing() {
    let server = MockServer::start().await;
    let mut cfg = config(&server, &["m1"]);
    cfg.test_mode = true;

    let dispatcher = Dispatcher::new(&cfg).unwrap();
    dispatcher.respond("hi", "", true, &[]).await;
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_request_shape_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(header("HTTP-Referer", "https://notes.example"))
        .and(header("X-Title", "Notes Test"))
        .and(body_partial_json(json!({
            "model": "m1",
            "max_tokens": 300,
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("shaped")))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = config(&server, &["m1"]);
    cfg.site_url = Some("https://notes.example".to_string());
    cfg.site_name = Some("Notes Test".to_string());
    let dispatcher = Dispatcher::new(&cfg).unwrap();

    let history = vec![
        ChatTurn::new(Role::User, "earlier question"),
        ChatTurn::new(Role::Assistant, "earlier answer"),
    ];
    let context = "c".repeat(800);
    let reply = dispatcher.respond("now", &context, true, &history).await;
    assert_eq!(reply.content, "shaped");

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let messages = body["messages"].as_array().unwrap();
    let roles: Vec<_> = messages.iter().map(|m| m["role"].as_str().unwrap()).collect();
    assert_eq!(roles, ["system", "user", "assistant", "user"]);
    let system = messages[0]["content"].as_str().unwrap();
    assert!(system.contains("currently editing"));
    assert!(system.contains(&"c".repeat(500)));
    assert!(!system.contains(&"c".repeat(501)));
    assert_eq!(messages[3]["content"], "now");
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
}

/// Virtual time can round each timer up to the next millisecond.
fn assert_waited(elapsed: Duration, expected: Duration) {
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(20),
        "waited {elapsed:?}, expected {expected:?}"
    );
}

/// Remote configuration whose requests fail before any I/O happens, so the
/// only time spent is backoff.
fn unroutable(models: usize) -> AiConfig {
    AiConfig {
        api_key: Some("test-key".to_string()),
        base_url: "not a url".to_string(),
        models: (1..=models).map(|i| format!("m{i}")).collect(),
        ..AiConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_default_backoff_before_each_retry() {
    let dispatcher = Dispatcher::new(&unroutable(3)).unwrap();
    assert!(dispatcher.is_remote());

    let started = tokio::time::Instant::now();
    let reply = dispatcher.respond("q", "", false, &[]).await;
    assert_eq!(reply.error.as_deref(), Some(EXHAUSTED_ERROR));
    // No wait before the first model, then 1s and 2s.
    assert_waited(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_default_backoff_is_capped() {
    let dispatcher = Dispatcher::new(&unroutable(5)).unwrap();
    let started = tokio::time::Instant::now();
    dispatcher.respond("q", "", false, &[]).await;
    // 1s + 2s + 4s, then the 5s ceiling.
    assert_waited(started.elapsed(), Duration::from_secs(12));
}

#[tokio::test(start_paused = true)]
async fn test_fallback_paths_never_wait() {
    let mut cfg = unroutable(3);
    cfg.api_key = None;
    let started = tokio::time::Instant::now();
    Dispatcher::new(&cfg).unwrap().respond("q", "", false, &[]).await;
    assert_eq!(started.elapsed(), Duration::ZERO);

    let mut cfg = unroutable(3);
    cfg.test_mode = true;
    Dispatcher::new(&cfg).unwrap().respond("q", "", true, &[]).await;
    assert_eq!(started.elapsed(), Duration::ZERO);
}

fn short_backoff() -> BackoffPolicy {
    BackoffPolicy {
        base: Duration::from_millis(40),
        ceiling: Duration::from_millis(60),
        rate_limit_base: Duration::from_millis(100),
        rate_limit_step: Duration::from_millis(50),
    }
}

async fn timed_failures(status: u16) -> Duration {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "error": { "message": "try again later" }
        })))
        .expect(3)
        .mount(&server)
        .await;

    let mut cfg = config(&server, &["m1", "m2", "m3"]);
    cfg.backoff = short_backoff();
    let dispatcher = Dispatcher::new(&cfg).unwrap();

    let started = std::time::Instant::now();
    let reply = dispatcher.respond("q", "", false, &[]).await;
    assert_eq!(reply.error.as_deref(), Some(EXHAUSTED_ERROR));
    started.elapsed()
}

#[tokio::test]
async fn test_rate_limited_attempts_wait_longer() {
    // Retry waits 0 + 40 + 60 ms; rate limit waits 100 + 150 + 200 ms.
    let limited = timed_failures(429).await;
    assert!(limited >= Duration::from_millis(550), "{limited:?}");

    let failed = timed_failures(500).await;
    assert!(failed >= Duration::from_millis(100), "{failed:?}");
    assert!(failed < Duration::from_millis(550), "{failed:?}");
}
