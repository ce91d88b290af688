use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use atelier_chat::{ChatInput, ChatModel, ResponseStyle, TitleMessage, SUPPORTED_MODELS};

use crate::{error::ApiResult, extract::JsonBody, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    #[serde(default)]
    pub messages: Vec<TitleMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TitleResponse {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct ChatCatalog {
    pub models: &'static [ChatModel],
    pub styles: Vec<&'static str>,
}

/// One styled completion over the posted history
pub async fn chat(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<ChatInput>,
) -> ApiResult<Json<ChatReply>> {
    let reply = state.chat.reply(input).await?;
    Ok(Json(ChatReply { reply }))
}

pub async fn title(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<TitleRequest>,
) -> ApiResult<Json<TitleResponse>> {
    let title = state.titles.title_for(&req.messages).await?;
    Ok(Json(TitleResponse { title }))
}

/// Models and styles accepted by `/api/chat`
pub async fn catalog() -> Json<ChatCatalog> {
    Json(ChatCatalog {
        models: SUPPORTED_MODELS,
        styles: ResponseStyle::ALL.iter().map(ResponseStyle::id).collect(),
    })
}
