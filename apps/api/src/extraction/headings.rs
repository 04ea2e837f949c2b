//! Heading-delimited reply parser.
//!
//! Extraction prompts ask the model to answer under fixed `## HEADING` lines.
//! The parser walks the reply once as a small state machine over a known set of
//! heading tokens. Missing, reordered or unknown sections are tolerated; every
//! lookup returns `None` instead of failing so callers can fall back to a sentinel.
//!
//! Any line starting with `##` (including `###` sub-headings) closes the current
//! section. Only the first occurrence of a heading is kept.

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Outside,
    Inside(usize),
}

#[derive(Debug, Clone)]
pub struct HeadingSections {
    known: Vec<&'static str>,
    bodies: Vec<Option<Vec<String>>>,
}

impl HeadingSections {
    pub fn parse(reply: &str, known: &[&'static str]) -> Self {
        let mut bodies: Vec<Option<Vec<String>>> = vec![None; known.len()];
        let mut state = State::Outside;

        for line in reply.lines() {
            let trimmed = line.trim();

            if let Some(rest) = trimmed.strip_prefix("##") {
                state = State::Outside;
                if rest.starts_with('#') {
                    continue;
                }
                if let Some((idx, inline)) = match_heading(rest, known) {
                    if bodies[idx].is_none() {
                        let mut body = Vec::new();
                        if !inline.is_empty() {
                            body.push(inline.to_string());
                        }
                        bodies[idx] = Some(body);
                        state = State::Inside(idx);
                    }
                }
                continue;
            }

            if let State::Inside(idx) = state {
                if let Some(body) = bodies[idx].as_mut() {
                    body.push(trimmed.to_string());
                }
            }
        }

        Self {
            known: known.to_vec(),
            bodies,
        }
    }

    /// Whether the heading appeared at all, even with an empty body.
    pub fn contains(&self, heading: &str) -> bool {
        self.index_of(heading)
            .map(|idx| self.bodies[idx].is_some())
            .unwrap_or(false)
    }

    /// Non-empty lines below the heading.
    pub fn lines(&self, heading: &str) -> Option<Vec<&str>> {
        let idx = self.index_of(heading)?;
        let body = self.bodies[idx].as_ref()?;
        Some(
            body.iter()
                .map(String::as_str)
                .filter(|l| !l.is_empty())
                .collect(),
        )
    }

    /// Section body joined back into text.
    pub fn text(&self, heading: &str) -> Option<String> {
        self.lines(heading).map(|lines| lines.join("\n"))
    }

    /// First non-empty line below the heading, stripped of template brackets and quotes.
    pub fn first_value(&self, heading: &str) -> Option<String> {
        self.lines(heading)?
            .into_iter()
            .map(clean_value)
            .find(|v| !v.is_empty())
    }

    fn index_of(&self, heading: &str) -> Option<usize> {
        self.known
            .iter()
            .position(|k| k.eq_ignore_ascii_case(heading))
    }
}

/// Matches the text after `##` against the known tokens, preferring the longest.
/// Returns the token index and whatever followed the token on the same line.
fn match_heading<'a>(rest: &'a str, known: &[&'static str]) -> Option<(usize, &'a str)> {
    let rest = rest.trim();

    known
        .iter()
        .enumerate()
        .filter(|(_, token)| {
            rest.get(..token.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(token))
                && rest[token.len()..]
                    .chars()
                    .next()
                    .map_or(true, |c| !c.is_alphanumeric())
        })
        .max_by_key(|(_, token)| token.len())
        .map(|(idx, token)| {
            let inline = &rest[token.len()..];
            (idx, inline.trim_start_matches([':', '-', ' ']).trim())
        })
}

/// Strips whitespace, template brackets and quotes from a single value.
pub fn clean_value(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| matches!(c, '[' | ']' | '"' | '\''))
        .trim()
        .to_string()
}

/// Every `-` or `•` bullet line anywhere in the reply, bullet marker removed.
pub fn bullet_items(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with('-') || l.starts_with('•'))
        .map(|l| l.trim_start_matches(['-', '•']).trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: &[&str] = &["JOB TITLE", "COMPANY NAME", "REQUIRED SOFT SKILLS"];

    #[test]
    fn test_first_value_strips_brackets_and_quotes() {
        let reply = "## JOB TITLE\n\n[\"Data Scientist\"]\n## COMPANY NAME\nAcme";
        let sections = HeadingSections::parse(reply, KNOWN);
        assert_eq!(sections.first_value("JOB TITLE").as_deref(), Some("Data Scientist"));
        assert_eq!(sections.first_value("COMPANY NAME").as_deref(), Some("Acme"));
    }

    #[test]
    fn test_missing_heading_is_none() {
        let sections = HeadingSections::parse("## COMPANY NAME\nAcme", KNOWN);
        assert!(!sections.contains("JOB TITLE"));
        assert!(sections.first_value("JOB TITLE").is_none());
    }

    #[test]
    fn test_reordered_sections_parse_independently() {
        let reply = "## COMPANY NAME\nGlobex\n## JOB TITLE\nML Engineer\n";
        let sections = HeadingSections::parse(reply, KNOWN);
        assert_eq!(sections.first_value("JOB TITLE").as_deref(), Some("ML Engineer"));
        assert_eq!(sections.first_value("COMPANY NAME").as_deref(), Some("Globex"));
    }

    #[test]
    fn test_subheading_closes_section() {
        let reply = "## JOB TITLE\n### Notes\nnot a title";
        let sections = HeadingSections::parse(reply, KNOWN);
        assert!(sections.contains("JOB TITLE"));
        assert!(sections.first_value("JOB TITLE").is_none());
    }

    #[test]
    fn test_unknown_heading_closes_section() {
        let reply = "## JOB TITLE\nAnalyst\n## SOMETHING ELSE\nnoise";
        let sections = HeadingSections::parse(reply, KNOWN);
        assert_eq!(sections.text("JOB TITLE").as_deref(), Some("Analyst"));
    }

    #[test]
    fn test_inline_heading_value() {
        let sections = HeadingSections::parse("## Job Title: Staff Engineer", KNOWN);
        assert_eq!(sections.first_value("JOB TITLE").as_deref(), Some("Staff Engineer"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let reply = "## JOB TITLE\nFirst\n## JOB TITLE\nSecond";
        let sections = HeadingSections::parse(reply, KNOWN);
        assert_eq!(sections.first_value("JOB TITLE").as_deref(), Some("First"));
    }

    #[test]
    fn test_bullet_items_collects_every_bullet_line() {
        let reply = "## A\n- Python\n  • SQL\nplain\n-- Rust";
        assert_eq!(bullet_items(reply), vec!["Python", "SQL", "Rust"]);
    }
}
