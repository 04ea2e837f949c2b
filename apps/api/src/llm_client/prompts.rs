// Shared prompt fragments.
// Each module that calls the model defines its own prompts.rs alongside it.
// This file contains the cross-cutting pieces.

/// Appended to every prompt whose reply is parsed by heading.
pub const HEADING_FORMAT_INSTRUCTION: &str = "\
Use the `## HEADING` lines exactly as written above, one per section, in the same order. \
Put each value on its own line directly below its heading. \
Use `- ` for list items. Do not add commentary outside the sections.";

/// Instruction that forbids rewriting identity and education facts.
pub const VERBATIM_INSTRUCTION: &str = "\
CRITICAL: Copy names, emails, phone numbers, institutions, dates, and all details EXACTLY \
as they appear in the original resume. Do not invent, modify, or change ANY information. \
Preserve the original formatting and wording completely.";

/// Instruction for prompts whose entire reply is compiled as LaTeX.
pub const LATEX_ONLY_INSTRUCTION: &str = "\
Return only LaTeX source. No explanations, no markdown, no code fences.";

/// Substitutes `{key}` placeholders in one pass, so braces inside substituted
/// values are never expanded again. Unknown `{...}` groups are kept as written.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_substitutes_known_keys_once() {
        let out = fill(
            "Hi {name}, see {other} and \\textbf{}",
            &[("name", "{other}"), ("other", "X")],
        );
        assert_eq!(out, "Hi {other}, see X and \\textbf{}");
    }

    #[test]
    fn test_fill_keeps_unterminated_brace() {
        assert_eq!(fill("a { b {name", &[("name", "n")]), "a { b {name");
    }
}
