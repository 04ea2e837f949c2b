//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::extraction::personal::PersonalRecord;
use crate::extraction::projects::ProjectsRecord;
use crate::generation::generator::{BatchInput, BatchResult, JobDescription};
use crate::models::sections::SectionPreferences;
use crate::render::storage::read_template;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(alias = "resumeText", default)]
    pub resume_text: String,
    #[serde(alias = "jobDescriptions", default)]
    pub job_descriptions: Vec<JobDescription>,
    #[serde(alias = "sectionPreferences", default)]
    pub section_preferences: SectionPreferences,
    #[serde(alias = "templateContent", default)]
    pub template_content: Option<String>,
    #[serde(alias = "personalData", default)]
    pub personal_data: Option<PersonalRecord>,
    #[serde(alias = "projectsData", default)]
    pub projects_data: Option<ProjectsRecord>,
}

impl GenerateRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.resume_text.trim().is_empty() {
            return Err(AppError::Validation("resume_text is required".to_string()));
        }
        if self.job_descriptions.is_empty() {
            return Err(AppError::Validation(
                "job_descriptions cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/resume/generate
///
/// Runs the whole pipeline for every job description in the request and
/// returns per-job outcomes. Individual job failures are reported in the body;
/// the request itself only fails on invalid input.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<BatchResult>, AppError> {
    request.validate()?;

    let template = match request.template_content.filter(|t| !t.trim().is_empty()) {
        Some(template) => template,
        None => read_template(&state.config.latex_template_dir)
            .await
            .map_err(|e| {
                error!("Default template unavailable: {e}");
                AppError::Validation("no template supplied and no default template found".to_string())
            })?,
    };

    info!(
        "Generating {} tailored resume(s)",
        request.job_descriptions.len()
    );

    let result = state
        .pipeline
        .run_batch(BatchInput {
            resume_text: request.resume_text,
            jobs: request.job_descriptions,
            preferences: request.section_preferences,
            template,
            personal: request.personal_data.filter(|p| !p.narrative_text.trim().is_empty()),
            projects: request.projects_data.filter(|p| !p.narrative_text.trim().is_empty()),
        })
        .await;

    Ok(Json(result))
}
