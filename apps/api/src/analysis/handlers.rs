//! Axum route handlers for the Analysis API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::compatibility::{analyze_compatibility, CompatibilityVerdict};
use crate::analysis::sections::{analyze_sections, SectionAnalysis};
use crate::errors::AppError;
use crate::extraction::handlers::ResumeTextRequest;
use crate::extraction::jd_parser::parse_job;
use crate::generation::generator::JobDescription;
use crate::models::sections::SectionTag;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SectionsResponse {
    pub missing_sections: Vec<SectionTag>,
    pub analysis: SectionAnalysis,
}

#[derive(Debug, Deserialize)]
pub struct DomainRequest {
    #[serde(alias = "resumeText", default)]
    pub resume_text: String,
    #[serde(alias = "jobDescriptions", default)]
    pub job_descriptions: Vec<JobDescription>,
}

#[derive(Debug, Serialize)]
pub struct DomainAnalysis {
    pub job_title: String,
    pub company: String,
    #[serde(flatten)]
    pub verdict: CompatibilityVerdict,
}

#[derive(Debug, Serialize)]
pub struct DomainResponse {
    pub domain_analyses: Vec<DomainAnalysis>,
    pub overall_compatible: bool,
    pub any_mismatch_detected: bool,
    pub needs_confirmation: bool,
}

/// POST /api/analyze/sections
///
/// Deterministic section presence check; no model call.
pub async fn handle_analyze_sections(
    Json(request): Json<ResumeTextRequest>,
) -> Result<Json<SectionsResponse>, AppError> {
    let analysis = analyze_sections(request.require()?);
    Ok(Json(SectionsResponse {
        missing_sections: analysis.missing_sections(),
        analysis,
    }))
}

/// POST /api/analyze/domain
///
/// Advisory compatibility check per job description. Entries with neither a
/// parsed record nor text are skipped.
pub async fn handle_analyze_domain(
    State(state): State<AppState>,
    Json(request): Json<DomainRequest>,
) -> Result<Json<DomainResponse>, AppError> {
    if request.resume_text.trim().is_empty() || request.job_descriptions.is_empty() {
        return Err(AppError::Validation(
            "resume_text and job_descriptions are required".to_string(),
        ));
    }

    let mut domain_analyses = Vec::new();
    for job in &request.job_descriptions {
        let record = match (&job.analysis, job.text.trim().is_empty()) {
            (Some(record), _) => record.clone(),
            (None, false) => parse_job(&job.text, job.company.as_deref(), state.generator()).await,
            (None, true) => continue,
        };
        let verdict = analyze_compatibility(&request.resume_text, &record, state.generator()).await;
        domain_analyses.push(DomainAnalysis {
            job_title: record.title,
            company: record.company,
            verdict,
        });
    }

    let overall_compatible = domain_analyses.iter().all(|a| a.verdict.compatible);
    let any_mismatch_detected = domain_analyses.iter().any(|a| a.verdict.mismatch_detected);

    Ok(Json(DomainResponse {
        domain_analyses,
        overall_compatible,
        any_mismatch_detected,
        needs_confirmation: any_mismatch_detected,
    }))
}
