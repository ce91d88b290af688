use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use atelier_image::{ImageRequest, KontextRequest};

use crate::{
    error::{ApiError, ApiResult},
    extract::JsonBody,
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KontextResponse {
    pub image_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

/// Text-to-image; responds with the raw image bytes
pub async fn generate(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<ImageRequest>,
) -> ApiResult<Response> {
    let image = state
        .images
        .generate(&req)
        .await
        .map_err(|e| ApiError::from_image(e, ApiError::ImageGeneration))?;

    Ok(([(CONTENT_TYPE, image.content_type)], image.data).into_response())
}

/// Submits an async job and waits for it; responds with a data URL
pub async fn generate_kontext(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<KontextRequest>,
) -> ApiResult<Json<KontextResponse>> {
    let image_url = state
        .bfl
        .generate(&req)
        .await
        .map_err(|e| ApiError::from_image(e, ApiError::ImageGeneration))?;

    Ok(Json(KontextResponse { image_url }))
}

pub async fn list_models(State(state): State<Arc<AppState>>) -> ApiResult<Json<ModelsResponse>> {
    let models = state
        .images
        .list_models()
        .await
        .map_err(|e| ApiError::from_image(e, ApiError::Models))?;

    Ok(Json(ModelsResponse { models }))
}
