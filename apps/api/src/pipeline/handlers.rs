//! Axum route handlers for posts and project creation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::content::models::{ContentItem, Project, ResolvedItem};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatePostResponse {
    pub slug: String,
    pub post: ContentItem,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResponse {
    pub audio_data_uri: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/posts
pub async fn handle_list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContentItem>>, AppError> {
    Ok(Json(state.resolver.resolve_all().await?))
}

/// GET /api/v1/posts/:slug
pub async fn handle_get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ResolvedItem>, AppError> {
    Ok(Json(state.resolver.resolve_one(&slug).await?))
}

/// POST /api/v1/posts
///
/// Runs the full creation pipeline; expect this to take several seconds.
pub async fn handle_create_post(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<CreatePostResponse>), AppError> {
    let post = state.creator.create_post(&req.title, &req.tags).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            slug: post.slug.clone(),
            post,
        }),
    ))
}

/// GET /api/v1/posts/:slug/related
pub async fn handle_related_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ContentItem>>, AppError> {
    Ok(Json(state.resolver.related_posts(&slug).await?))
}

/// POST /api/v1/posts/:slug/speech
pub async fn handle_post_speech(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<SpeechResponse>, AppError> {
    let audio_data_uri = state.resolver.speak(&slug).await?;
    Ok(Json(SpeechResponse { audio_data_uri }))
}

/// POST /api/v1/projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let project = state.creator.create_project(&req.title, &req.tags).await?;
    Ok((StatusCode::CREATED, Json(project)))
}
