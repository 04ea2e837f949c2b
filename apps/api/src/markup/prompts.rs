// Prompt templates for the markup module.

/// Compilation-error repair prompt.
/// Replace: {latex_source}, {latex_only}
pub const LINT_PROMPT: &str = r#"Fix ALL LaTeX compilation errors.

# LATEX SOURCE
{latex_source}

Return ONLY corrected LaTeX code. No explanations.
{latex_only}"#;
