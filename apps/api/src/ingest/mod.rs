// Ingest: turning uploads and job-posting URLs into plain text.
// Nothing here fails a request on bad content; it degrades to less text.

pub mod handlers;
pub mod prompts;
pub mod rasterizer;
pub mod scraper;
pub mod text_extractor;
