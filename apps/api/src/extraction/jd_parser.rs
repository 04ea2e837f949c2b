//! JD Parser: extracts the role title, company and skill keywords from a raw job description.
//!
//! Never fails: with no backend, or when the call errors, a degraded `JobRecord`
//! is returned so the batch can still run.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::extraction::headings::{bullet_items, HeadingSections};
use crate::extraction::prompts::JOB_REQUIREMENTS_PROMPT;
use crate::llm_client::prompts::HEADING_FORMAT_INSTRUCTION;
use crate::llm_client::{GenerationOptions, TextGenerator};

pub const UNKNOWN_ROLE: &str = "Unknown Role";
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

const JOB_TITLE: &str = "JOB TITLE";
const COMPANY_NAME: &str = "COMPANY NAME";
const HEADINGS: &[&str] = &[
    JOB_TITLE,
    COMPANY_NAME,
    "REQUIRED TECHNICAL SKILLS",
    "REQUIRED SOFT SKILLS",
    "REQUIRED CERTIFICATIONS",
    "EXPERIENCE REQUIREMENTS",
    "PRIORITY KEYWORDS FOR ATS",
];

/// One employer's posting reduced to what the reconstructor needs.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(alias = "job_title", default = "unknown_role")]
    pub title: String,
    #[serde(default = "unknown_company")]
    pub company: String,
    /// Insertion order is priority order; duplicates are kept.
    #[serde(alias = "all_skills", default)]
    pub skill_keywords: Vec<String>,
    #[serde(alias = "raw_jd", default)]
    pub raw_text: String,
    #[serde(alias = "full_analysis", default)]
    pub full_analysis_text: String,
}

fn unknown_role() -> String {
    UNKNOWN_ROLE.to_string()
}

fn unknown_company() -> String {
    UNKNOWN_COMPANY.to_string()
}

impl JobRecord {
    /// The record used when the backend is missing or failed.
    pub fn degraded(jd_text: &str, company_hint: Option<&str>) -> Self {
        Self {
            title: unknown_role(),
            company: company_or_default(company_hint.unwrap_or_default()),
            skill_keywords: Vec::new(),
            raw_text: jd_text.to_string(),
            full_analysis_text: String::new(),
        }
    }
}

fn company_or_default(company: &str) -> String {
    let company = company.trim();
    if company.is_empty() {
        unknown_company()
    } else {
        company.to_string()
    }
}

fn is_unknown_company(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower.is_empty() || lower == "unknown" || lower == "unknown company"
}

/// Builds a `JobRecord` from a job description using the generative backend.
pub async fn parse_job(
    jd_text: &str,
    company_hint: Option<&str>,
    generator: Option<&dyn TextGenerator>,
) -> JobRecord {
    let Some(generator) = generator else {
        warn!("No generative backend configured; returning degraded job record");
        return JobRecord::degraded(jd_text, company_hint);
    };

    let prompt = JOB_REQUIREMENTS_PROMPT
        .replace("{heading_format}", HEADING_FORMAT_INSTRUCTION)
        .replace("{jd_text}", jd_text);

    match generator
        .generate(&prompt, &GenerationOptions::default())
        .await
    {
        Ok(reply) => {
            let record = job_record_from_reply(&reply.text, jd_text, company_hint);
            info!(
                "Job parsed: title={:?} company={:?} keywords={}",
                record.title,
                record.company,
                record.skill_keywords.len()
            );
            record
        }
        Err(e) => {
            error!("JD skill extraction failed: {e}");
            JobRecord::degraded(jd_text, company_hint)
        }
    }
}

/// Parses the heading-delimited reply. Skill keywords are taken from every bullet
/// line in the whole reply, not only the priority keyword section.
pub fn job_record_from_reply(reply: &str, jd_text: &str, company_hint: Option<&str>) -> JobRecord {
    let sections = HeadingSections::parse(reply, HEADINGS);

    let title = sections
        .first_value(JOB_TITLE)
        .unwrap_or_else(unknown_role);

    let company = match sections.first_value(COMPANY_NAME) {
        Some(extracted) if !is_unknown_company(&extracted) => extracted,
        _ => company_or_default(company_hint.unwrap_or_default()),
    };

    JobRecord {
        title,
        company,
        skill_keywords: bullet_items(reply),
        raw_text: jd_text.to_string(),
        full_analysis_text: reply.to_string(),
    }
}
