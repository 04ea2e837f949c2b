use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A named résumé section a caller can add or omit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionTag {
    Contact,
    Skills,
    Experience,
    Education,
    Projects,
    Certifications,
    Awards,
    Publications,
    Languages,
}

impl SectionTag {
    pub const REQUIRED: [SectionTag; 5] = [
        SectionTag::Contact,
        SectionTag::Skills,
        SectionTag::Experience,
        SectionTag::Education,
        SectionTag::Projects,
    ];

    pub const OPTIONAL: [SectionTag; 4] = [
        SectionTag::Certifications,
        SectionTag::Awards,
        SectionTag::Publications,
        SectionTag::Languages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionTag::Contact => "contact",
            SectionTag::Skills => "skills",
            SectionTag::Experience => "experience",
            SectionTag::Education => "education",
            SectionTag::Projects => "projects",
            SectionTag::Certifications => "certifications",
            SectionTag::Awards => "awards",
            SectionTag::Publications => "publications",
            SectionTag::Languages => "languages",
        }
    }
}

/// Section inclusion preferences. A tag in both sets is skipped.
///
/// Normalised on construction and on deserialization, so `add` never overlaps `skip`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSectionPreferences")]
pub struct SectionPreferences {
    add: BTreeSet<SectionTag>,
    skip: BTreeSet<SectionTag>,
}

#[derive(Deserialize)]
struct RawSectionPreferences {
    #[serde(alias = "add_sections", default)]
    add: BTreeSet<SectionTag>,
    #[serde(alias = "skip_sections", default)]
    skip: BTreeSet<SectionTag>,
}

impl From<RawSectionPreferences> for SectionPreferences {
    fn from(raw: RawSectionPreferences) -> Self {
        SectionPreferences::new(raw.add, raw.skip)
    }
}

impl SectionPreferences {
    pub fn new(
        add: impl IntoIterator<Item = SectionTag>,
        skip: impl IntoIterator<Item = SectionTag>,
    ) -> Self {
        let skip: BTreeSet<SectionTag> = skip.into_iter().collect();
        let add = add.into_iter().filter(|t| !skip.contains(t)).collect();
        Self { add, skip }
    }

    /// Tags to add, in declaration order.
    pub fn add(&self) -> impl Iterator<Item = SectionTag> + '_ {
        self.add.iter().copied()
    }

    /// Tags to omit, in declaration order.
    pub fn skip(&self) -> impl Iterator<Item = SectionTag> + '_ {
        self.skip.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_wins_over_add() {
        let prefs = SectionPreferences::new(
            [SectionTag::Awards, SectionTag::Skills],
            [SectionTag::Awards],
        );
        assert_eq!(prefs.add().collect::<Vec<_>>(), vec![SectionTag::Skills]);
        assert_eq!(prefs.skip().collect::<Vec<_>>(), vec![SectionTag::Awards]);
    }

    #[test]
    fn test_deserialization_normalises_overlap() {
        let json = r#"{"add_sections": ["languages", "contact"], "skip_sections": ["languages"]}"#;
        let prefs: SectionPreferences = serde_json::from_str(json).unwrap();
        assert_eq!(prefs.add().collect::<Vec<_>>(), vec![SectionTag::Contact]);
        assert_eq!(prefs.skip().collect::<Vec<_>>(), vec![SectionTag::Languages]);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let prefs: SectionPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, SectionPreferences::default());
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let result: Result<SectionPreferences, _> = serde_json::from_str(r#"{"add": ["hobbies"]}"#);
        assert!(result.is_err());
    }
}
