//! Axum route handlers for the Extraction API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extraction::jd_parser::{parse_job, JobRecord};
use crate::extraction::personal::{extract_personal, verify_verbatim, PersonalRecord, VerbatimReport};
use crate::extraction::projects::{extract_projects, ProjectsRecord};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ResumeTextRequest {
    #[serde(alias = "resumeText", default)]
    pub resume_text: String,
}

impl ResumeTextRequest {
    /// The trimmed résumé text, or a validation error when blank.
    pub fn require(&self) -> Result<&str, AppError> {
        let text = self.resume_text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("resume_text is required".to_string()));
        }
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
pub struct PersonalResponse {
    pub personal: PersonalRecord,
    pub verbatim: VerbatimReport,
}

#[derive(Debug, Serialize)]
pub struct ProjectsResponse {
    pub projects: ProjectsRecord,
    pub entries: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractJobRequest {
    #[serde(alias = "jd_text")]
    pub text: String,
    #[serde(default)]
    pub company: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/extract/personal
///
/// Extracts the verbatim personal/education block and reports any labelled
/// field that could not be found in the résumé as written.
pub async fn handle_extract_personal(
    State(state): State<AppState>,
    Json(request): Json<ResumeTextRequest>,
) -> Result<Json<PersonalResponse>, AppError> {
    let resume_text = request.require()?;
    let personal = extract_personal(resume_text, state.generator()).await;
    // Misses are already logged by the extractor.
    let verbatim = verify_verbatim(&personal);
    Ok(Json(PersonalResponse { personal, verbatim }))
}

/// POST /api/extract/projects
pub async fn handle_extract_projects(
    State(state): State<AppState>,
    Json(request): Json<ResumeTextRequest>,
) -> Result<Json<ProjectsResponse>, AppError> {
    let resume_text = request.require()?;
    let projects = extract_projects(resume_text, state.generator()).await;
    Ok(Json(ProjectsResponse {
        entries: projects.entry_headers(),
        projects,
    }))
}

/// POST /api/extract/job
///
/// Parses one job description. Degrades to an "Unknown Role" record rather than failing.
pub async fn handle_extract_job(
    State(state): State<AppState>,
    Json(request): Json<ExtractJobRequest>,
) -> Result<Json<JobRecord>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    let record = parse_job(&request.text, request.company.as_deref(), state.generator()).await;
    Ok(Json(record))
}
