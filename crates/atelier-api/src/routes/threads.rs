use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use atelier_persist::{ChatThread, ThreadPatch};

use crate::{
    error::{ApiError, ApiResult},
    extract::JsonBody,
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct CreateThreadRequest {
    #[serde(default)]
    pub first_message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListThreadsResponse {
    pub threads: Vec<ChatThread>,
    pub active_thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub thread_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub text: String,
    /// Image attachment as a `data:` URL
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub reply: String,
    pub thread: Option<ChatThread>,
}

pub async fn list_threads(State(state): State<Arc<AppState>>) -> Json<ListThreadsResponse> {
    let snapshot = state.threads.snapshot().await;
    Json(ListThreadsResponse {
        threads: snapshot.threads,
        active_thread_id: snapshot.active_thread_id,
    })
}

/// Create a thread; a first message, when given, seeds the title
///
/// An empty body means no first message. Anything else must be valid JSON.
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ChatThread>)> {
    let req = parse_create_request(&body)?;
    let id = state.threads.create_thread(req.first_message.as_deref()).await?;
    let thread = find_thread(&state, &id).await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ChatThread>> {
    Ok(Json(find_thread(&state, &thread_id).await?))
}

pub async fn get_active_thread(State(state): State<Arc<AppState>>) -> ApiResult<Json<ChatThread>> {
    state
        .threads
        .active_thread()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::ThreadNotFound("no active thread".to_string()))
}

pub async fn set_active_thread(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<SetActiveRequest>,
) -> ApiResult<Json<ChatThread>> {
    state.threads.set_active_thread(&req.thread_id).await?;
    Ok(Json(find_thread(&state, &req.thread_id).await?))
}

pub async fn update_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    JsonBody(patch): JsonBody<ThreadPatch>,
) -> ApiResult<Json<ChatThread>> {
    if !state.threads.update_thread(&thread_id, patch).await? {
        return Err(ApiError::ThreadNotFound(thread_id));
    }
    Ok(Json(find_thread(&state, &thread_id).await?))
}

pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.store.get(&thread_id).await?.is_none() {
        return Err(ApiError::ThreadNotFound(thread_id));
    }
    state.threads.delete_thread(&thread_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Send a user message to the thread and store the reply
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    JsonBody(req): JsonBody<SendMessageRequest>,
) -> ApiResult<Json<SendMessageResponse>> {
    let outcome = state
        .session
        .send_to(&thread_id, &req.text, req.image.as_deref())
        .await?;
    Ok(Json(SendMessageResponse {
        reply: outcome.reply,
        thread: outcome.thread,
    }))
}

fn parse_create_request(body: &[u8]) -> ApiResult<CreateThreadRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateThreadRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid thread request: {}", e)))
}

async fn find_thread(state: &AppState, thread_id: &str) -> ApiResult<ChatThread> {
    state
        .store
        .get(thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_create_body_has_no_first_message() {
        assert_eq!(parse_create_request(b"").unwrap().first_message, None);
        assert_eq!(parse_create_request(b"  \n").unwrap().first_message, None);
    }

    #[test]
    fn test_create_body_must_be_valid_json() {
        let req = parse_create_request(br#"{"first_message":"hello"}"#).unwrap();
        assert_eq!(req.first_message.as_deref(), Some("hello"));

        let err = parse_create_request(b"{not json").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
