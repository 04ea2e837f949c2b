//! Model-assisted LaTeX repair.
//!
//! The reply is only trusted when it looks like a whole document. Anything else
//! (an empty reply, a fragment, a fenced reply, or a failed call) falls back to
//! the input, which the caller has already sanitized.

use thiserror::Error;
use tracing::{error, info, warn};

use crate::llm_client::prompts::LATEX_ONLY_INSTRUCTION;
use crate::llm_client::{GenerationOptions, TextGenerator};
use crate::markup::prompts::LINT_PROMPT;
use crate::markup::sanitizer::sanitize;

const MIN_REPLY_LINES: usize = 5;

const LINT_OPTIONS: GenerationOptions = GenerationOptions {
    temperature: Some(0.3),
    top_p: None,
    top_k: None,
    max_output_tokens: Some(8192),
};

#[derive(Debug, Error, PartialEq)]
pub enum LintError {
    #[error("no generative backend configured for linting")]
    Unavailable,

    #[error("lint reply rejected: {0}")]
    Suspect(&'static str),
}

/// Asks the model to fix compilation errors in already-sanitized markup.
///
/// Returns `LintError::Unavailable` without a backend; the caller keeps its
/// sanitized markup. Suspect replies and call failures return `markup` unchanged.
pub async fn lint(markup: &str, generator: Option<&dyn TextGenerator>) -> Result<String, LintError> {
    let generator = generator.ok_or(LintError::Unavailable)?;

    let prompt = LINT_PROMPT
        .replace("{latex_only}", LATEX_ONLY_INSTRUCTION)
        .replace("{latex_source}", markup);

    let reply = match generator.generate(&prompt, &LINT_OPTIONS).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Linting call failed, keeping sanitized markup: {e}");
            return Ok(markup.to_string());
        }
    };

    match check_reply(&reply.text) {
        Ok(()) => {
            info!("Lint reply accepted ({} lines)", reply.text.lines().count());
            Ok(sanitize(&reply.text))
        }
        Err(e) => {
            warn!("{e}, keeping sanitized markup");
            Ok(markup.to_string())
        }
    }
}

fn check_reply(reply: &str) -> Result<(), LintError> {
    if reply.trim().is_empty() {
        return Err(LintError::Suspect("empty reply"));
    }
    if reply.lines().count() < MIN_REPLY_LINES {
        return Err(LintError::Suspect("reply too short"));
    }
    if reply.contains("```") {
        return Err(LintError::Suspect("reply still fenced"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::testing::{Reply, ScriptedGenerator};

    const SANITIZED: &str = "\\documentclass{article}\n\\begin{document}\nHi\n\\end{document}\n";

    const FIXED: &str = "\\documentclass{article}\n\\usepackage{hyperref}\n\\begin{document}\nHi my_name\n\\end{document}\n";

    async fn lint_with(reply: Reply) -> Result<String, LintError> {
        let generator = Arc::new(ScriptedGenerator::new(vec![reply]));
        lint(SANITIZED, Some(generator.as_ref())).await
    }

    #[test]
    fn test_options_use_temperature_without_top_p() {
        assert_eq!(LINT_OPTIONS.temperature, Some(0.3));
        assert_eq!(LINT_OPTIONS.top_p, None);
    }

    #[tokio::test]
    async fn test_unconfigured_backend_is_unavailable() {
        assert_eq!(lint(SANITIZED, None).await, Err(LintError::Unavailable));
    }

    #[tokio::test]
    async fn test_empty_reply_returns_input_unchanged() {
        assert_eq!(lint_with(Reply::Text("")).await.unwrap(), SANITIZED);
        assert_eq!(lint_with(Reply::Text("  \n \n")).await.unwrap(), SANITIZED);
    }

    #[tokio::test]
    async fn test_short_reply_returns_input_unchanged() {
        let out = lint_with(Reply::Text("\\begin{document}\nx\n\\end{document}")).await;
        assert_eq!(out.unwrap(), SANITIZED);
    }

    #[tokio::test]
    async fn test_fenced_reply_returns_input_unchanged() {
        let fenced = format!("```latex\n{FIXED}```");
        assert_eq!(lint_with(Reply::Owned(fenced)).await.unwrap(), SANITIZED);
    }

    #[tokio::test]
    async fn test_call_failure_returns_input_unchanged() {
        assert_eq!(lint_with(Reply::Fail).await.unwrap(), SANITIZED);
    }

    #[tokio::test]
    async fn test_accepted_reply_is_sanitized() {
        let out = lint_with(Reply::Text(FIXED)).await.unwrap();
        assert!(out.contains("\\usepackage{hyperref}"));
        assert!(out.contains("my\\_name"));
        assert!(out.ends_with("\\end{document}\n"));
    }

    #[tokio::test]
    async fn test_prompt_carries_source() {
        let generator = Arc::new(ScriptedGenerator::always(FIXED));
        lint(SANITIZED, Some(generator.as_ref())).await.unwrap();
        let prompts = generator.prompts();
        assert!(prompts[0].starts_with("Fix ALL LaTeX compilation errors."));
        assert!(prompts[0].contains("\\begin{document}\nHi"));
    }

    #[test]
    fn test_check_reply_counts_lines() {
        assert_eq!(check_reply("a\nb\nc\nd"), Err(LintError::Suspect("reply too short")));
        assert_eq!(check_reply("a\nb\nc\nd\ne"), Ok(()));
    }
}
