//! Projects and work experience extraction.
//!
//! Unlike the personal block, this narrative is editable: the reconstructor may
//! rewrite bullets, but company, title and duration labels stay as extracted.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::extraction::headings::HeadingSections;
use crate::extraction::prompts::PROJECTS_PROMPT;
use crate::llm_client::{GenerationOptions, TextGenerator};

const WORK_EXPERIENCES: &str = "WORK EXPERIENCES";
const PROJECTS: &str = "PROJECTS";
const HEADINGS: &[&str] = &[WORK_EXPERIENCES, PROJECTS, "CORE TECHNICAL SKILLS"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectsRecord {
    #[serde(alias = "projects_and_experience", default)]
    pub narrative_text: String,
    #[serde(alias = "raw_resume", default)]
    pub raw_resume_text: String,
}

impl ProjectsRecord {
    pub fn degraded(resume_text: &str) -> Self {
        Self {
            narrative_text: String::new(),
            raw_resume_text: resume_text.to_string(),
        }
    }

    /// `### Company | Title | Duration` and `### Project` entry headers, in order.
    pub fn entry_headers(&self) -> Vec<String> {
        self.narrative_text
            .lines()
            .filter_map(|l| l.trim().strip_prefix("###"))
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect()
    }

    /// Whether the narrative carries either of the two entry sections.
    pub fn has_entries(&self) -> bool {
        let sections = HeadingSections::parse(&self.narrative_text, HEADINGS);
        sections.contains(WORK_EXPERIENCES) || sections.contains(PROJECTS)
    }
}

/// Extracts the work/project block from résumé text.
pub async fn extract_projects(
    resume_text: &str,
    generator: Option<&dyn TextGenerator>,
) -> ProjectsRecord {
    let Some(generator) = generator else {
        warn!("No generative backend configured; returning empty projects record");
        return ProjectsRecord::degraded(resume_text);
    };

    let prompt = PROJECTS_PROMPT.replace("{resume_text}", resume_text);

    match generator
        .generate(&prompt, &GenerationOptions::default())
        .await
    {
        Ok(reply) => {
            let record = ProjectsRecord {
                narrative_text: reply.text,
                raw_resume_text: resume_text.to_string(),
            };
            if !record.has_entries() {
                warn!("Projects extraction reply has no WORK EXPERIENCES or PROJECTS section");
            }
            record
        }
        Err(e) => {
            error!("Resume extraction failed: {e}");
            ProjectsRecord::degraded(resume_text)
        }
    }
}
