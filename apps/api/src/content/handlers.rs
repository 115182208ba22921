use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::content::models::Project;
use crate::content::resume::{load_resume, Resume};
use crate::content::skills::Skill;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    /// `longDescription` rendered to HTML, when present.
    pub long_description_html: Option<String>,
}

/// GET /api/v1/projects
pub async fn handle_list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.projects.list().await)
}

/// GET /api/v1/projects/:slug
pub async fn handle_get_project(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProjectDetail>, AppError> {
    let project = state
        .projects
        .get(&slug)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Project '{slug}' not found")))?;

    let long_description_html = match &project.long_description {
        Some(markdown) => Some(state.renderer.render(markdown)?.to_html()),
        None => None,
    };

    Ok(Json(ProjectDetail {
        project,
        long_description_html,
    }))
}

/// GET /api/v1/skills
pub async fn handle_list_skills(State(state): State<AppState>) -> Json<Vec<Skill>> {
    Json(state.skills.skills().to_vec())
}

/// GET /api/v1/resume
pub async fn handle_get_resume(State(state): State<AppState>) -> Result<Json<Resume>, AppError> {
    let resume = load_resume(&state.config.resume_path, &state.renderer).await?;
    Ok(Json(resume))
}
