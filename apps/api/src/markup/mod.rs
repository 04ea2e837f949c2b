// Markup repair: deterministic sanitizer first, model-assisted linter second.
// The linter never returns something the sanitizer would reject.

pub mod linter;
pub mod prompts;
pub mod sanitizer;
