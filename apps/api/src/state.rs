use std::sync::Arc;

use crate::config::Config;
use crate::generation::generator::ResumePipeline;
use crate::ingest::scraper::JobPageFetcher;
use crate::ingest::text_extractor::TextExtractor;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when no credential is configured; every generative step then
    /// takes its degraded path.
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub pipeline: Arc<ResumePipeline>,
    pub text_extractor: Arc<TextExtractor>,
    pub fetcher: JobPageFetcher,
}

impl AppState {
    pub fn generator(&self) -> Option<&dyn TextGenerator> {
        self.generator.as_deref()
    }
}
