//! Personal and education extraction.
//!
//! The narrative block produced here is treated downstream as verbatim, non-editable
//! source of truth. The model is instructed to copy identity fields exactly; the
//! service does not enforce that, it only runs a containment check against the
//! original résumé and logs what it could not find (`verify_verbatim`).

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::extraction::prompts::PERSONAL_PROMPT;
use crate::llm_client::prompts::VERBATIM_INSTRUCTION;
use crate::llm_client::{GenerationOptions, TextGenerator};

/// Field labels whose values must appear in the source résumé unchanged.
const VERBATIM_LABELS: &[&str] = &[
    "full name",
    "phone",
    "email",
    "linkedin",
    "github",
    "location",
    "institution",
    "duration",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    #[serde(alias = "personal_and_education", default)]
    pub narrative_text: String,
    #[serde(alias = "raw_resume", default)]
    pub raw_resume_text: String,
}

impl PersonalRecord {
    pub fn degraded(resume_text: &str) -> Self {
        Self {
            narrative_text: String::new(),
            raw_resume_text: resume_text.to_string(),
        }
    }
}

/// A labelled value from the narrative that was not found in the résumé.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerbatimMiss {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerbatimReport {
    pub checked: usize,
    pub missing: Vec<VerbatimMiss>,
}

impl VerbatimReport {
    #[cfg(test)]
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Extracts the personal/education block from résumé text.
pub async fn extract_personal(
    resume_text: &str,
    generator: Option<&dyn TextGenerator>,
) -> PersonalRecord {
    let Some(generator) = generator else {
        warn!("No generative backend configured; returning empty personal record");
        return PersonalRecord::degraded(resume_text);
    };

    let prompt = PERSONAL_PROMPT
        .replace("{verbatim_instruction}", VERBATIM_INSTRUCTION)
        .replace("{resume_text}", resume_text);

    match generator
        .generate(&prompt, &GenerationOptions::default())
        .await
    {
        Ok(reply) => {
            let record = PersonalRecord {
                narrative_text: reply.text,
                raw_resume_text: resume_text.to_string(),
            };
            let report = verify_verbatim(&record);
            for miss in &report.missing {
                warn!(
                    "Personal field '{}' not found verbatim in resume: {:?}",
                    miss.label, miss.value
                );
            }
            record
        }
        Err(e) => {
            error!("Personal info extraction failed: {e}");
            PersonalRecord::degraded(resume_text)
        }
    }
}

/// Checks that every labelled identity/education value in the narrative occurs in
/// the raw résumé, comparing with whitespace collapsed. Values marked
/// "Not provided" are skipped. Never changes the record.
pub fn verify_verbatim(record: &PersonalRecord) -> VerbatimReport {
    let source = collapse_whitespace(&record.raw_resume_text);
    let mut report = VerbatimReport::default();

    for (label, value) in labelled_values(&record.narrative_text) {
        if !VERBATIM_LABELS.contains(&label.as_str()) {
            continue;
        }
        report.checked += 1;
        if !source.contains(&collapse_whitespace(&value)) {
            report.missing.push(VerbatimMiss { label, value });
        }
    }

    report
}

/// `- Label: value` lines, label lower-cased, bullet and bold markers removed.
fn labelled_values(narrative: &str) -> Vec<(String, String)> {
    narrative
        .lines()
        .filter_map(|line| {
            let line = line
                .trim()
                .trim_start_matches(['-', '•', '*'])
                .trim()
                .replace("**", "");
            let (label, value) = line.split_once(':')?;
            let value = crate::extraction::headings::clean_value(value);
            if value.is_empty() || value.eq_ignore_ascii_case("not provided") {
                return None;
            }
            Some((label.trim().to_lowercase(), value))
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::testing::{Reply, ScriptedGenerator};

    const RESUME: &str = "Jane Roe\njane@roe.dev | +1 555 0100\nState  University, 2016 - 2020";

    #[tokio::test]
    async fn test_unconfigured_backend_returns_degraded_record() {
        let record = extract_personal(RESUME, None).await;
        assert!(record.narrative_text.is_empty());
        assert_eq!(record.raw_resume_text, RESUME);
    }

    #[tokio::test]
    async fn test_backend_failure_returns_degraded_record() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Reply::Fail]));
        let record = extract_personal(RESUME, Some(generator.as_ref())).await;
        assert_eq!(record, PersonalRecord::degraded(RESUME));
    }

    #[tokio::test]
    async fn test_prompt_demands_verbatim_copy() {
        let generator = Arc::new(ScriptedGenerator::always("## PERSONAL INFORMATION\n- Full Name: Jane Roe"));
        let record = extract_personal(RESUME, Some(generator.as_ref())).await;
        assert!(record.narrative_text.contains("Jane Roe"));
        assert!(generator.prompts()[0].contains("EXACTLY"));
        assert!(generator.prompts()[0].contains(RESUME));
    }

    #[test]
    fn test_verbatim_check_accepts_copied_fields() {
        let record = PersonalRecord {
            narrative_text: "## PERSONAL INFORMATION\n- Full Name: Jane Roe\n- Email: jane@roe.dev\n- GitHub: Not provided\n## EDUCATION\n- Institution: State University\n- Duration: 2016 - 2020".to_string(),
            raw_resume_text: RESUME.to_string(),
        };
        let report = verify_verbatim(&record);
        assert_eq!(report.checked, 4);
        assert!(report.is_clean());
    }

    #[test]
    fn test_verbatim_check_reports_altered_fields() {
        let record = PersonalRecord {
            narrative_text: "- **Full Name:** Janet Roe\n- Phone: +1 555 0100\n- GPA: 3.9".to_string(),
            raw_resume_text: RESUME.to_string(),
        };
        let report = verify_verbatim(&record);
        assert_eq!(report.checked, 2);
        assert_eq!(
            report.missing,
            vec![VerbatimMiss {
                label: "full name".to_string(),
                value: "Janet Roe".to_string(),
            }]
        );
    }
}
