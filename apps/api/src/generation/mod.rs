// Resume generation: reconstruction prompt and the per-job pipeline.
// All model calls go through llm_client; the compiler is behind render::compiler.

pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod reconstructor;
