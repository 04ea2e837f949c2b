//! Axum route handlers for the Ingest API: résumé uploads and job posting URLs.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::extraction::handlers::ResumeTextRequest;
use crate::extraction::jd_parser::{parse_job, JobRecord};
use crate::ingest::text_extractor::{DocumentKind, RawDocument};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub extracted_text: String,
    pub text_length: usize,
}

impl UploadResponse {
    fn new(filename: String, extracted_text: String) -> Self {
        Self {
            text_length: extracted_text.chars().count(),
            filename,
            extracted_text,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JobUrlsRequest {
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JobUrlResult {
    pub url: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<JobRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobUrlsResponse {
    pub results: Vec<JobUrlResult>,
    pub total_processed: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/upload/resume
///
/// Multipart upload with a single `file` field (PDF or plain text).
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("resume").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::Validation("uploaded file is empty".to_string()));
        }

        let kind = DocumentKind::detect(content_type.as_deref(), Some(&filename), &bytes);
        info!("Received upload {filename} ({} bytes, {kind:?})", bytes.len());

        let text = state
            .text_extractor
            .extract(RawDocument {
                bytes: bytes.to_vec(),
                kind,
            })
            .await;
        return Ok(Json(UploadResponse::new(filename, text)));
    }

    Err(AppError::Validation("no file provided".to_string()))
}

/// POST /api/upload/text-resume
pub async fn handle_upload_text_resume(
    Json(request): Json<ResumeTextRequest>,
) -> Result<Json<UploadResponse>, AppError> {
    let text = request.require()?.to_string();
    Ok(Json(UploadResponse::new("text_input".to_string(), text)))
}

/// POST /api/upload/job-urls
///
/// Fetches each posting in order and parses the ones that loaded. A URL that
/// fails is reported in its own entry and does not affect the others.
pub async fn handle_job_urls(
    State(state): State<AppState>,
    Json(request): Json<JobUrlsRequest>,
) -> Result<Json<JobUrlsResponse>, AppError> {
    let urls: Vec<&str> = request
        .urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .collect();
    if urls.is_empty() {
        return Err(AppError::Validation("urls cannot be empty".to_string()));
    }

    let mut results = Vec::with_capacity(urls.len());
    for url in urls {
        let outcome = state.fetcher.fetch_outcome(url).await;
        if !outcome.success {
            results.push(JobUrlResult {
                url: outcome.url,
                success: false,
                job_description: None,
                analysis: None,
                error: outcome.error,
            });
            continue;
        }

        let analysis = parse_job(&outcome.text, None, state.generator()).await;
        results.push(JobUrlResult {
            url: outcome.url,
            success: true,
            job_description: Some(outcome.text),
            analysis: Some(analysis),
            error: None,
        });
    }

    Ok(Json(JobUrlsResponse {
        total_processed: results.len(),
        results,
    }))
}
