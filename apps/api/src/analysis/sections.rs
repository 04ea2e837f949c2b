//! Section presence check: deterministic keyword scan, no model call.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::sections::SectionTag;

#[derive(Debug, Clone, Serialize)]
pub struct SectionAnalysis {
    pub present: BTreeMap<SectionTag, bool>,
    pub missing_required: Vec<SectionTag>,
    pub missing_optional: Vec<SectionTag>,
    pub existing_sections: Vec<SectionTag>,
    pub enhancement_suggestions: Vec<String>,
}

impl SectionAnalysis {
    pub fn missing_sections(&self) -> Vec<SectionTag> {
        self.missing_required
            .iter()
            .chain(&self.missing_optional)
            .copied()
            .collect()
    }
}

fn cues(tag: SectionTag) -> &'static [&'static str] {
    match tag {
        SectionTag::Contact => &["contact", "phone", "email", "@", "linkedin", "github"],
        SectionTag::Skills => &["skills", "technical skills", "competencies", "proficiencies"],
        SectionTag::Experience => &[
            "experience",
            "work history",
            "employment",
            "professional experience",
        ],
        SectionTag::Education => &["education", "academic", "degree", "university", "college"],
        SectionTag::Projects => &["projects", "portfolio", "work samples"],
        SectionTag::Certifications => &["certification", "certified", "license"],
        SectionTag::Awards => &["awards", "honors", "achievements", "recognition"],
        SectionTag::Publications => &["publications", "papers", "research", "presented"],
        SectionTag::Languages => &["languages", "fluent", "proficient"],
    }
}

/// Marks each section present when any of its cues appears in the lower-cased text.
pub fn analyze_sections(resume_text: &str) -> SectionAnalysis {
    let lower = resume_text.to_lowercase();
    let found = |tag: SectionTag| cues(tag).iter().any(|cue| lower.contains(cue));

    let mut present = BTreeMap::new();
    let mut missing_required = Vec::new();
    let mut missing_optional = Vec::new();
    let mut existing_sections = Vec::new();

    for (tags, missing) in [
        (&SectionTag::REQUIRED[..], &mut missing_required),
        (&SectionTag::OPTIONAL[..], &mut missing_optional),
    ] {
        for &tag in tags {
            let is_present = found(tag);
            present.insert(tag, is_present);
            if is_present {
                existing_sections.push(tag);
            } else {
                missing.push(tag);
            }
        }
    }

    let enhancement_suggestions = existing_sections
        .iter()
        .filter_map(|tag| match tag {
            SectionTag::Skills => Some("Enhance skills section to better match job requirements"),
            SectionTag::Projects => {
                Some("Improve project descriptions with metrics and JD keywords")
            }
            SectionTag::Experience => {
                Some("Enhance work experience bullet points for better JD alignment")
            }
            _ => None,
        })
        .map(String::from)
        .collect();

    SectionAnalysis {
        present,
        missing_required,
        missing_optional,
        existing_sections,
        enhancement_suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Roe — jane@roe.dev\nEXPERIENCE\nAnalyst at Acme\nEDUCATION\nState University\nSkills: SQL";

    #[test]
    fn test_detects_present_and_missing_sections() {
        let analysis = analyze_sections(RESUME);
        assert_eq!(
            analysis.existing_sections,
            vec![
                SectionTag::Contact,
                SectionTag::Skills,
                SectionTag::Experience,
                SectionTag::Education,
            ]
        );
        assert_eq!(analysis.missing_required, vec![SectionTag::Projects]);
        assert_eq!(analysis.missing_optional, SectionTag::OPTIONAL.to_vec());
        assert_eq!(analysis.present[&SectionTag::Projects], false);
    }

    #[test]
    fn test_suggestions_follow_existing_sections() {
        let analysis = analyze_sections(RESUME);
        assert_eq!(analysis.enhancement_suggestions.len(), 2);
        assert!(analysis.enhancement_suggestions[0].starts_with("Enhance skills"));
    }

    #[test]
    fn test_empty_resume_misses_everything() {
        let analysis = analyze_sections("");
        assert!(analysis.existing_sections.is_empty());
        assert_eq!(analysis.missing_sections().len(), 9);
    }
}
