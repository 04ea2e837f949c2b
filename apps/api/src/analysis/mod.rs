// Analysis: advisory checks run before reconstruction.
// Neither check can block the pipeline.

pub mod compatibility;
pub mod handlers;
pub mod prompts;
pub mod sections;
