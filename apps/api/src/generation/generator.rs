//! Resume Pipeline: orchestrates one tailored document per job description.
//!
//! Flow per job: extract job record (+ advisory compatibility) → reconstruct →
//! sanitize → lint → compile. Jobs run sequentially in input order and fail
//! independently: a reconstruction or compile error ends that job only, and
//! linting problems fall back to the sanitized markup.
//!
//! Only one batch runs at a time per process (`run_lock`), since both the
//! generative backend and the LaTeX compiler are expensive.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, field, info, info_span, warn, Instrument, Span};

use crate::analysis::compatibility::{analyze_compatibility, CompatibilityVerdict};
use crate::extraction::jd_parser::{parse_job, JobRecord};
use crate::extraction::personal::{extract_personal, PersonalRecord};
use crate::extraction::projects::{extract_projects, ProjectsRecord};
use crate::generation::reconstructor::{reconstruct, ReconstructError, ReconstructionRequest};
use crate::llm_client::TextGenerator;
use crate::markup::linter::lint;
use crate::markup::sanitizer::sanitize;
use crate::models::resume::CompiledArtifact;
use crate::models::sections::SectionPreferences;
use crate::render::compiler::{CompileError, DocumentCompiler};

/// Characters kept from each of company and role in an output file name.
const FILENAME_PART_CHARS: usize = 30;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// One job description in a batch: either an already-parsed record, or raw text
/// (plus an optional known company) to parse now.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobDescription {
    #[serde(default)]
    pub analysis: Option<JobRecord>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub company: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BatchInput {
    pub resume_text: String,
    pub jobs: Vec<JobDescription>,
    pub preferences: SectionPreferences,
    pub template: String,
    pub personal: Option<PersonalRecord>,
    pub projects: Option<ProjectsRecord>,
}

/// Per-job stages, in order. `failed_stage` on the outcome records where a
/// failed job stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Extracting,
    Reconstructing,
    Sanitizing,
    Linting,
    Compiling,
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Reconstruct(#[from] ReconstructError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl JobError {
    pub fn stage(&self) -> Stage {
        match self {
            JobError::Reconstruct(_) => Stage::Reconstructing,
            JobError::Compile(_) => Stage::Compiling,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub index: usize,
    pub company: String,
    pub role: String,
    #[serde(flatten)]
    pub artifact: CompiledArtifact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<Stage>,
    pub compatibility: CompatibilityVerdict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessfulResume {
    pub index: usize,
    pub company: String,
    pub role: String,
    pub filename: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedResume {
    pub index: usize,
    pub company: String,
    pub role: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub results: Vec<JobOutcome>,
    pub summary: BatchSummary,
    pub successful: Vec<SuccessfulResume>,
    pub failed: Vec<FailedResume>,
}

impl BatchResult {
    fn from_outcomes(results: Vec<JobOutcome>) -> Self {
        let mut successful = Vec::new();
        let mut failed = Vec::new();

        for outcome in &results {
            match (&outcome.download_url, &outcome.artifact.error_detail) {
                (Some(url), _) => successful.push(SuccessfulResume {
                    index: outcome.index,
                    company: outcome.company.clone(),
                    role: outcome.role.clone(),
                    filename: outcome.artifact.filename.clone(),
                    download_url: url.clone(),
                }),
                (None, detail) => failed.push(FailedResume {
                    index: outcome.index,
                    company: outcome.company.clone(),
                    role: outcome.role.clone(),
                    error: detail.clone().unwrap_or_default(),
                }),
            }
        }

        Self {
            summary: BatchSummary {
                total: results.len(),
                successful: successful.len(),
                failed: failed.len(),
            },
            results,
            successful,
            failed,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

pub struct ResumePipeline {
    generator: Option<Arc<dyn TextGenerator>>,
    compiler: Arc<dyn DocumentCompiler>,
    run_lock: Mutex<()>,
}

/// Inputs shared by every job of one batch.
struct BatchContext<'a> {
    resume_text: &'a str,
    template: &'a str,
    preferences: &'a SectionPreferences,
    personal: &'a PersonalRecord,
    projects: &'a ProjectsRecord,
}

impl ResumePipeline {
    pub fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        compiler: Arc<dyn DocumentCompiler>,
    ) -> Self {
        Self {
            generator,
            compiler,
            run_lock: Mutex::new(()),
        }
    }

    fn generator(&self) -> Option<&dyn TextGenerator> {
        self.generator.as_deref()
    }

    /// Runs every job in `input`, in order. Never fails as a whole: per-job
    /// errors are reported in the result.
    pub async fn run_batch(&self, input: BatchInput) -> BatchResult {
        let _guard = self.run_lock.lock().await;
        info!("Starting batch of {} job descriptions", input.jobs.len());

        // Candidate records are shared across jobs; extract them once.
        let personal = match input.personal {
            Some(record) => record,
            None => extract_personal(&input.resume_text, self.generator()).await,
        };
        let projects = match input.projects {
            Some(record) => record,
            None => extract_projects(&input.resume_text, self.generator()).await,
        };

        let ctx = BatchContext {
            resume_text: &input.resume_text,
            template: &input.template,
            preferences: &input.preferences,
            personal: &personal,
            projects: &projects,
        };

        let mut results = Vec::with_capacity(input.jobs.len());
        for (i, job) in input.jobs.iter().enumerate() {
            let index = i + 1;
            let span = info_span!("job", index, company = field::Empty, role = field::Empty);
            results.push(self.run_job(index, job, &ctx).instrument(span).await);
        }

        let result = BatchResult::from_outcomes(results);
        info!(
            "Batch finished: {} total, {} successful, {} failed",
            result.summary.total, result.summary.successful, result.summary.failed
        );
        result
    }

    async fn run_job(&self, index: usize, job: &JobDescription, ctx: &BatchContext<'_>) -> JobOutcome {
        info!("Stage {:?}", Stage::Extracting);
        let record = match &job.analysis {
            Some(record) => record.clone(),
            None => parse_job(&job.text, job.company.as_deref(), self.generator()).await,
        };
        Span::current()
            .record("company", record.company.as_str())
            .record("role", record.title.as_str());

        let compatibility = analyze_compatibility(ctx.resume_text, &record, self.generator()).await;
        if compatibility.mismatch_detected {
            warn!("Domain mismatch detected, continuing with reconstruction");
        }

        let filename = output_filename(index, &record.company, &record.title);
        let (artifact, failed_stage) = match self.tailor(&record, &filename, ctx).await {
            Ok(artifact) => (artifact, None),
            Err(e) => {
                error!("Failed to generate resume for job {index}: {e}");
                (CompiledArtifact::failed(&filename, e.to_string()), Some(e.stage()))
            }
        };

        JobOutcome {
            index,
            company: record.company,
            role: record.title,
            download_url: artifact.download_url(),
            artifact,
            failed_stage,
            compatibility,
        }
    }

    async fn tailor(
        &self,
        record: &JobRecord,
        filename: &str,
        ctx: &BatchContext<'_>,
    ) -> Result<CompiledArtifact, JobError> {
        info!("Stage {:?}", Stage::Reconstructing);
        let request = ReconstructionRequest {
            template: ctx.template,
            personal: ctx.personal,
            projects: ctx.projects,
            job: record,
            preferences: ctx.preferences,
        };
        let candidate = reconstruct(request, self.generator()).await?;

        info!("Stage {:?}", Stage::Sanitizing);
        let sanitized = sanitize(&candidate);

        info!("Stage {:?}", Stage::Linting);
        let linted = match lint(&sanitized, self.generator()).await {
            Ok(markup) => markup,
            Err(e) => {
                warn!("{e}, using sanitized markup");
                sanitized
            }
        };

        info!("Stage {:?}", Stage::Compiling);
        Ok(self.compiler.compile(&linted, filename).await?)
    }
}

/// `resume_{index}_{company}_{role}.pdf`. Each part keeps only word characters,
/// whitespace and `-`, is cut to 30 characters, and has whitespace turned into
/// `_`. Re-running the same job overwrites the previous artifact.
pub fn output_filename(index: usize, company: &str, role: &str) -> String {
    format!(
        "resume_{index}_{}_{}.pdf",
        filename_part(company),
        filename_part(role)
    )
}

fn filename_part(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_' || *c == '-')
        .take(FILENAME_PART_CHARS)
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
