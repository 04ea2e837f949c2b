//! Reconstructor: one generation call that recomposes the template around the
//! candidate's facts and the job's keywords.
//!
//! There is no deterministic fallback for a whole document, so a missing backend
//! or an empty reply fails the job.

use thiserror::Error;
use tracing::{error, info};

use crate::extraction::jd_parser::JobRecord;
use crate::extraction::personal::PersonalRecord;
use crate::extraction::projects::ProjectsRecord;
use crate::generation::prompts::{
    RECONSTRUCTION_PROMPT, SECTIONS_TO_ADD_HEADING, SECTIONS_TO_SKIP_HEADING,
};
use crate::llm_client::prompts::{fill, LATEX_ONLY_INSTRUCTION, VERBATIM_INSTRUCTION};
use crate::llm_client::{GenerationOptions, LlmError, TextGenerator};
use crate::models::sections::{SectionPreferences, SectionTag};

/// Highest-priority keywords embedded in the prompt.
pub const MAX_PROMPT_SKILLS: usize = 20;

const RECONSTRUCTION_OPTIONS: GenerationOptions = GenerationOptions {
    temperature: Some(0.7),
    top_p: None,
    top_k: Some(40),
    max_output_tokens: Some(8192),
};

#[derive(Debug, Error)]
pub enum ReconstructError {
    #[error("Generative backend not configured")]
    GenerationUnavailable,

    #[error("AI response was empty or blocked (finish reason: {})", .finish_reason.as_deref().unwrap_or("unknown"))]
    GenerationEmpty { finish_reason: Option<String> },

    #[error("Resume reconstruction failed: {0}")]
    Generation(#[from] LlmError),
}

/// Everything one reconstruction call is built from.
#[derive(Debug, Clone, Copy)]
pub struct ReconstructionRequest<'a> {
    pub template: &'a str,
    pub personal: &'a PersonalRecord,
    pub projects: &'a ProjectsRecord,
    pub job: &'a JobRecord,
    pub preferences: &'a SectionPreferences,
}

impl ReconstructionRequest<'_> {
    pub fn prompt(&self) -> String {
        let skills = self
            .job
            .skill_keywords
            .iter()
            .take(MAX_PROMPT_SKILLS)
            .map(|skill| format!("- {skill}"))
            .collect::<Vec<_>>()
            .join("\n");

        let sections = section_instructions(self.preferences);
        let personal = non_empty_or(&self.personal.narrative_text, &self.personal.raw_resume_text);
        let projects = non_empty_or(&self.projects.narrative_text, &self.projects.raw_resume_text);

        fill(
            RECONSTRUCTION_PROMPT,
            &[
                ("job_title", self.job.title.as_str()),
                ("company", self.job.company.as_str()),
                ("template", self.template),
                ("personal", personal),
                ("projects", projects),
                ("skills", skills.as_str()),
                ("section_instructions", sections.as_str()),
                ("verbatim_instruction", VERBATIM_INSTRUCTION),
                ("latex_only", LATEX_ONLY_INSTRUCTION),
            ],
        )
    }
}

/// A degraded record has no narrative; the raw résumé still carries the facts.
fn non_empty_or<'a>(narrative: &'a str, raw: &'a str) -> &'a str {
    if narrative.trim().is_empty() {
        raw
    } else {
        narrative
    }
}

fn directive(tag: SectionTag) -> &'static str {
    match tag {
        SectionTag::Contact => {
            "- **Contact Information**: Extract from PERSONAL INFORMATION. Use EXACT details."
        }
        SectionTag::Skills => "- **Skills**: Include EVERY skill from JD analysis.",
        SectionTag::Experience => "- **Experience**: 3-4 bullets per role (2-3 lines each)",
        SectionTag::Education => {
            "- **Education**: Use EXACT education details from PERSONAL INFORMATION."
        }
        SectionTag::Projects => "- **Projects**: 3-4 bullets per project (2-3 lines each)",
        SectionTag::Certifications => {
            "- **Certifications**: 3 descriptive points per certification"
        }
        SectionTag::Awards => "- **Awards/Honors**: Add awards section",
        SectionTag::Publications => "- **Publications**: Add publications section",
        SectionTag::Languages => "- **Languages**: Add languages section",
    }
}

fn section_instructions(preferences: &SectionPreferences) -> String {
    let mut out = String::new();

    let add: Vec<&str> = preferences.add().map(directive).collect();
    if !add.is_empty() {
        out.push_str(&format!("\n{SECTIONS_TO_ADD_HEADING}\n{}\n", add.join("\n")));
    }

    let skip: Vec<&str> = preferences.skip().map(|tag| tag.as_str()).collect();
    if !skip.is_empty() {
        out.push_str(&format!(
            "\n{SECTIONS_TO_SKIP_HEADING}\nDo NOT include: {}\n",
            skip.join(", ")
        ));
    }

    out
}

/// Generates candidate markup for one job. The reply is returned trimmed and
/// otherwise untouched; sanitizing is the caller's next stage.
pub async fn reconstruct(
    request: ReconstructionRequest<'_>,
    generator: Option<&dyn TextGenerator>,
) -> Result<String, ReconstructError> {
    let generator = generator.ok_or(ReconstructError::GenerationUnavailable)?;

    let reply = generator
        .generate(&request.prompt(), &RECONSTRUCTION_OPTIONS)
        .await
        .inspect_err(|e| error!("Resume reconstruction failed: {e}"))?;

    let markup = reply.text.trim();
    if markup.is_empty() {
        error!(
            "Generative backend returned empty markup, finish reason: {:?}",
            reply.finish_reason
        );
        return Err(ReconstructError::GenerationEmpty {
            finish_reason: reply.finish_reason,
        });
    }

    info!(
        "Reconstructed markup for {:?} at {:?} ({} chars)",
        request.job.title,
        request.job.company,
        markup.len()
    );
    Ok(markup.to_string())
}
