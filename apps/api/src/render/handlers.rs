//! Axum route handlers for compiled artifacts and the default template.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::errors::AppError;
use crate::render::storage::{list_artifacts, read_template, resolve_artifact, StoredArtifact};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ArtifactListResponse {
    pub files: Vec<StoredArtifact>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub template: String,
}

/// GET /api/resume/list
pub async fn handle_list(
    State(state): State<AppState>,
) -> Result<Json<ArtifactListResponse>, AppError> {
    let files = list_artifacts(&state.config.pdf_output_dir).await?;
    Ok(Json(ArtifactListResponse {
        count: files.len(),
        files,
    }))
}

/// GET /api/resume/download/:filename
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let path = resolve_artifact(&state.config.pdf_output_dir, &filename)
        .await
        .ok_or_else(|| AppError::NotFound(format!("file {filename} not found")))?;
    let contents = Bytes::from(tokio::fs::read(&path).await?);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        Body::from(contents),
    )
        .into_response())
}

/// GET /api/template
pub async fn handle_template(
    State(state): State<AppState>,
) -> Result<Json<TemplateResponse>, AppError> {
    let template = read_template(&state.config.latex_template_dir)
        .await
        .map_err(|_| AppError::NotFound("default template not found".to_string()))?;
    Ok(Json(TemplateResponse { template }))
}
