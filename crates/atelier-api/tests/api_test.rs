use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use mockito::{Matcher, ServerGuard};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use atelier_api::{build_router, AppState, Config};
use atelier_persist::MemoryThreadStore;

async fn app(server: &ServerGuard) -> Router {
    let mut config = Config::default();
    config.llm.base_url = server.url();
    config.image.pollinations_base_url = server.url();
    config.image.bfl_base_url = server.url();
    config.image.poll_interval_ms = 5;
    config.image.max_attempts = 2;
    config.bfl_api_key = Some("bfl-key".to_string());

    let state = AppState::with_store(config, Arc::new(MemoryThreadStore::new()))
        .await
        .unwrap();
    build_router(Arc::new(state))
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn raw_json_request(method: Method, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health_reports_store_and_credentials() {
    let server = mockito::Server::new_async().await;
    let app = app(&server).await;

    let (status, body) = call(&app, empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["store"], "memory (reachable)");
    assert_eq!(body["services"]["bfl"], "configured");
    assert_eq!(body["services"]["pollinations"], "missing");
}

#[tokio::test]
async fn test_chat_requires_messages() {
    let server = mockito::Server::new_async().await;
    let app = app(&server).await;

    let (status, body) = call(&app, json_request(Method::POST, "/api/chat", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "messages are required");
}

#[tokio::test]
async fn test_chat_returns_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/openai")
        .match_body(Matcher::PartialJson(json!({
            "model": "openai",
            "max_tokens": 500,
            "temperature": 1.0
        })))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"Hi there"}}]}"#)
        .create_async()
        .await;
    let app = app(&server).await;

    let request = json_request(
        Method::POST,
        "/api/chat",
        json!({ "messages": [{ "role": "user", "content": "Hello" }], "model": "unknown" }),
    );
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "reply": "Hi there" }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_upstream_failure_is_500() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/openai")
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;
    let app = app(&server).await;

    let request = json_request(
        Method::POST,
        "/api/chat",
        json!({ "messages": [{ "role": "user", "content": "Hello" }] }),
    );
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Chat request failed: "));
    assert!(error.contains("503"));
}

#[tokio::test]
async fn test_title_route() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/openai")
        .match_body(Matcher::PartialJson(json!({ "model": "openai-reasoning" })))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"Greeting Exchange\nextra"}}]}"#)
        .create_async()
        .await;
    let app = app(&server).await;

    let request = json_request(
        Method::POST,
        "/api/chat/title",
        json!({ "messages": [{ "role": "user", "content": "Hello" }] }),
    );
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "title": "Greeting Exchange" }));
}

#[tokio::test]
async fn test_title_renders_any_role() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/openai")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("User: Look this up".into()),
            Matcher::Regex("tool: 3 results".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":""},"text":"Search Results"}]}"#)
        .create_async()
        .await;
    let app = app(&server).await;

    let request = json_request(
        Method::POST,
        "/api/chat/title",
        json!({ "messages": [
            { "role": "user", "content": "Look this up" },
            { "role": "tool", "content": "3 results" }
        ] }),
    );
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "title": "Search Results" }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_json_uses_error_body() {
    let server = mockito::Server::new_async().await;
    let app = app(&server).await;

    let (status, body) = call(&app, raw_json_request(Method::POST, "/api/chat", "{oops")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let request = json_request(Method::POST, "/api/chat", json!({ "messages": "nope" }));
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_thread_rejects_malformed_body() {
    let server = mockito::Server::new_async().await;
    let app = app(&server).await;

    let (status, body) = call(&app, raw_json_request(Method::POST, "/threads", "{oops")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid thread request"));

    let (_, listed) = call(&app, empty_request(Method::GET, "/threads")).await;
    assert_eq!(listed["threads"], json!([]));
}

#[tokio::test]
async fn test_title_failure_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/openai")
        .with_status(500)
        .create_async()
        .await;
    let app = app(&server).await;

    let request = json_request(
        Method::POST,
        "/api/chat/title",
        json!({ "messages": [{ "role": "user", "content": "Hello" }] }),
    );
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Title generation failed");
}

#[tokio::test]
async fn test_chat_catalog_lists_models_and_styles() {
    let server = mockito::Server::new_async().await;
    let app = app(&server).await;

    let (status, body) = call(&app, empty_request(Method::GET, "/api/chat/models")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"].as_array().unwrap().len(), 8);
    assert_eq!(body["models"][0]["id"], "openai");
    assert_eq!(body["styles"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_generate_streams_image_bytes() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/prompt/sunset")
        .match_query(Matcher::UrlEncoded("width".into(), "1024".into()))
        .with_status(200)
        .with_header("content-type", "image/webp")
        .with_body("webp-bytes")
        .create_async()
        .await;
    let app = app(&server).await;

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/generate", json!({ "prompt": " sunset " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "image/webp");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"webp-bytes");
}

#[tokio::test]
async fn test_generate_rejects_blank_prompt() {
    let server = mockito::Server::new_async().await;
    let app = app(&server).await;

    let (status, body) =
        call(&app, json_request(Method::POST, "/api/generate", json!({ "prompt": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "prompt is required");
}

#[tokio::test]
async fn test_generate_upstream_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/prompt/sunset")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    let app = app(&server).await;

    let (status, body) =
        call(&app, json_request(Method::POST, "/api/generate", json!({ "prompt": "sunset" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Image generation failed");
}

#[tokio::test]
async fn test_image_models() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/models")
        .with_status(200)
        .with_body(r#"["flux","turbo","gptimage"]"#)
        .create_async()
        .await;
    let app = app(&server).await;

    let (status, body) = call(&app, empty_request(Method::GET, "/api/image/models")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "models": ["flux", "turbo", "gptimage"] }));
}

#[tokio::test]
async fn test_kontext_job_returns_data_url() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();
    server
        .mock("POST", "/flux-dev")
        .match_header("x-key", "bfl-key")
        .with_status(200)
        .with_body(r#"{"id":"abc"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/get_result")
        .match_query(Matcher::UrlEncoded("id".into(), "abc".into()))
        .with_status(200)
        .with_body(json!({ "status": "Ready", "result": { "sample": format!("{}/img", base) } }).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/img")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body([0u8, 1, 2])
        .create_async()
        .await;
    let app = app(&server).await;

    let request = json_request(
        Method::POST,
        "/api/generate-bfl",
        json!({ "prompt": "a lighthouse", "model": "flux-dev" }),
    );
    let (status, body) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "imageUrl": "data:image/png;base64,AAEC" }));
}

#[tokio::test]
async fn test_kontext_timeout_is_504() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/flux-kontext-pro")
        .with_status(200)
        .with_body(r#"{"id":"slow"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/get_result")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"Pending"}"#)
        .create_async()
        .await;
    let app = app(&server).await;

    let request = json_request(
        Method::POST,
        "/api/generate-bfl",
        json!({ "prompt": "a lighthouse", "model": "flux-kontext-pro" }),
    );
    let (status, _) = call(&app, request).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_kontext_requires_prompt_or_image() {
    let server = mockito::Server::new_async().await;
    let app = app(&server).await;

    let (status, _) = call(
        &app,
        json_request(Method::POST, "/api/generate-bfl", json!({ "model": "flux-dev" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_thread_lifecycle() {
    let server = mockito::Server::new_async().await;
    let app = app(&server).await;

    let (status, created) = call(&app, empty_request(Method::POST, "/threads")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Thread 1");
    assert_eq!(created["model"], "openai");
    let id = created["id"].as_str().unwrap().to_string();

    let (_, listed) = call(&app, empty_request(Method::GET, "/threads")).await;
    assert_eq!(listed["threads"].as_array().unwrap().len(), 1);
    assert_eq!(listed["active_thread_id"], id.as_str());

    let (status, patched) = call(
        &app,
        json_request(
            Method::PATCH,
            &format!("/threads/{}", id),
            json!({ "model": "llama", "style": "casual" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["model"], "llama");
    assert_eq!(patched["style"], "casual");

    let (status, active) = call(&app, empty_request(Method::GET, "/threads/active")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active["model"], "llama");

    let (status, _) = call(
        &app,
        json_request(Method::PUT, "/threads/active", json!({ "thread_id": "missing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/threads/{}", id);
    let (status, _) = call(&app, empty_request(Method::DELETE, &uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(&app, empty_request(Method::GET, &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&id));

    let (status, _) = call(&app, empty_request(Method::GET, "/threads/active")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_send_message_to_thread() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/openai")
        .match_body(Matcher::PartialJson(json!({ "max_tokens": 500 })))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"Four."}}]}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/openai")
        .match_body(Matcher::PartialJson(json!({ "model": "openai-reasoning" })))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"Simple Math"}}]}"#)
        .create_async()
        .await;
    let app = app(&server).await;

    let (_, created) = call(&app, empty_request(Method::POST, "/threads")).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = call(
        &app,
        json_request(
            Method::POST,
            &format!("/threads/{}/messages", id),
            json!({ "text": "What is 2 + 2?" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Four.");
    assert_eq!(body["thread"]["title"], "Simple Math");
    assert_eq!(
        body["thread"]["messages"],
        json!([
            { "role": "user", "content": "What is 2 + 2?" },
            { "role": "assistant", "content": "Four." }
        ])
    );

    let (status, _) = call(
        &app,
        json_request(Method::POST, &format!("/threads/{}/messages", id), json!({ "text": " " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
