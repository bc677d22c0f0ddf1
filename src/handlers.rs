use crate::{
    errors::{AppError, ExportError},
    export::{build_bundle, bundle_file_name, caption_file_name, download_image},
    models::{GenerateRequest, Post},
    pipeline,
    AppState,
};
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::Deserialize;
use std::sync::Arc;
use tracing;
use uuid::Uuid;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const MAX_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

/// Handler for POST /posts/generate
pub async fn generate_post(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = pipeline::generate_post(
        state.caption_generator.as_ref(),
        &state.image_finder,
        state.post_repo.as_ref(),
        &request,
    )
    .await?;

    tracing::info!(post_id = ?response.post_id, has_image = response.image.is_some(), "Post generated via handler");
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET /posts
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    tracing::debug!(limit, "Listing recent posts via handler");
    let posts = state.post_repo.list_recent(limit).await?;
    Ok(Json(posts))
}

async fn load_post(state: &AppState, id_str: &str) -> Result<Post, AppError> {
    let post_id = Uuid::parse_str(id_str)?;
    tracing::debug!(%post_id, "Fetching post via handler");
    state
        .post_repo
        .get_by_id(post_id)
        .await?
        .ok_or(AppError::PostNotFound(post_id))
}

/// Handler for GET /posts/{id}
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(load_post(&state, &id_str).await?))
}

fn attachment(content_type: &str, file_name: &str, body: Body) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .body(body)
        .map_err(|e| AppError::InternalServerError(format!("Failed to build download response: {}", e)))
}

/// Handler for GET /posts/{id}/caption.txt
pub async fn download_caption(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Response, AppError> {
    let post = load_post(&state, &id_str).await?;
    attachment(
        "text/plain; charset=utf-8",
        &caption_file_name(&Local::now()),
        Body::from(post.caption),
    )
}

/// Handler for GET /posts/{id}/export.zip
pub async fn export_post(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<Response, AppError> {
    let post = load_post(&state, &id_str).await?;
    if post.image_url.is_empty() {
        return Err(ExportError::NoImage(post.post_id).into());
    }

    let image = download_image(&state.http_client, &post.image_url).await?;
    let bundle = build_bundle(&post.caption, &image)?;
    tracing::info!(post_id = %post.post_id, size = bundle.len(), "Post bundle exported");

    attachment("application/zip", &bundle_file_name(&Local::now()), Body::from(bundle))
}
