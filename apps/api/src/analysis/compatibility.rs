//! Domain compatibility: advisory check of résumé domain against job domain.
//!
//! Never blocks the pipeline: no backend, a failed call, or an unparseable reply
//! all yield the optimistic verdict.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::analysis::prompts::DOMAIN_COMPATIBILITY_PROMPT;
use crate::extraction::headings::HeadingSections;
use crate::extraction::jd_parser::JobRecord;
use crate::llm_client::prompts::HEADING_FORMAT_INSTRUCTION;
use crate::llm_client::{GenerationOptions, TextGenerator};

/// Characters of résumé and job text sent to the model.
const PROMPT_PREFIX_CHARS: usize = 2000;

const DOMAIN_COMPATIBILITY: &str = "DOMAIN COMPATIBILITY";
const RESUME_DOMAIN: &str = "RESUME DOMAIN";
const JD_DOMAIN: &str = "JD DOMAIN";
const HEADINGS: &[&str] = &[
    DOMAIN_COMPATIBILITY,
    RESUME_DOMAIN,
    JD_DOMAIN,
    "COMPATIBILITY ANALYSIS",
    "RECOMMENDATION",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityVerdict {
    pub compatible: bool,
    pub mismatch_detected: bool,
    pub explanation_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_domain: Option<String>,
}

impl CompatibilityVerdict {
    pub fn optimistic() -> Self {
        Self {
            compatible: true,
            mismatch_detected: false,
            explanation_text: String::new(),
            resume_domain: None,
            job_domain: None,
        }
    }
}

/// Classifies the résumé/job pair. See module docs for the degrade policy.
pub async fn analyze_compatibility(
    resume_text: &str,
    job: &JobRecord,
    generator: Option<&dyn TextGenerator>,
) -> CompatibilityVerdict {
    let Some(generator) = generator else {
        warn!("No generative backend configured; assuming compatible domains");
        return CompatibilityVerdict::optimistic();
    };

    let prompt = DOMAIN_COMPATIBILITY_PROMPT
        .replace("{heading_format}", HEADING_FORMAT_INSTRUCTION)
        .replace("{job_title}", &job.title)
        .replace("{resume_text}", char_prefix(resume_text, PROMPT_PREFIX_CHARS))
        .replace("{jd_text}", char_prefix(&job.raw_text, PROMPT_PREFIX_CHARS));

    match generator
        .generate(&prompt, &GenerationOptions::default())
        .await
    {
        Ok(reply) => {
            let verdict = verdict_from_reply(&reply.text);
            info!(
                "Domain compatibility for {:?}: compatible={} mismatch={}",
                job.title, verdict.compatible, verdict.mismatch_detected
            );
            verdict
        }
        Err(e) => {
            error!("Domain analysis failed: {e}");
            CompatibilityVerdict::optimistic()
        }
    }
}

/// Case-insensitive substring match on the verdict section:
/// "incompatible" wins over "partially compatible"; anything else is compatible.
pub fn verdict_from_reply(reply: &str) -> CompatibilityVerdict {
    let sections = HeadingSections::parse(reply, HEADINGS);
    let verdict = sections
        .text(DOMAIN_COMPATIBILITY)
        .unwrap_or_default()
        .to_lowercase();

    let (compatible, mismatch_detected) = if verdict.contains("incompatible") {
        (false, true)
    } else if verdict.contains("partially compatible") {
        (true, true)
    } else {
        (true, false)
    };

    CompatibilityVerdict {
        compatible,
        mismatch_detected,
        explanation_text: reply.to_string(),
        resume_domain: sections.first_value(RESUME_DOMAIN),
        job_domain: sections.first_value(JD_DOMAIN),
    }
}

/// The first `max_chars` characters of `text`, cut on a char boundary.
fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
