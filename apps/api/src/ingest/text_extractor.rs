//! Text Extractor: résumé uploads to plain text.
//!
//! Direct PDF text extraction first. When that yields fewer than 200 characters
//! and a generative backend is configured, page one is rasterized and sent for
//! OCR. Every failure degrades to whatever text is already in hand.
//!
//! The rasterized image lives in a per-call `TempDir` under the temp directory,
//! removed when the call returns on every path.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::ingest::prompts::OCR_PROMPT;
use crate::ingest::rasterizer::{PageRasterizer, RasterizeError};
use crate::llm_client::{GenerationOptions, ImageInput, LlmError, TextGenerator};

/// Below this many characters, direct extraction is treated as a scan.
pub const MIN_DIRECT_TEXT_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// PDF when the declared type or file name says so, or the bytes carry the
    /// PDF magic. Anything else is read as text.
    pub fn detect(content_type: Option<&str>, filename: Option<&str>, bytes: &[u8]) -> Self {
        let declared_pdf = content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"));
        let named_pdf = filename.is_some_and(|name| name.to_ascii_lowercase().ends_with(".pdf"));
        if declared_pdf || named_pdf || bytes.starts_with(b"%PDF") {
            DocumentKind::Pdf
        } else {
            DocumentKind::PlainText
        }
    }
}

#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub kind: DocumentKind,
}

#[derive(Debug, Error)]
enum OcrError {
    #[error("temporary file error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Rasterize(#[from] RasterizeError),

    #[error("OCR call failed: {0}")]
    Llm(#[from] LlmError),
}

pub struct TextExtractor {
    generator: Option<Arc<dyn TextGenerator>>,
    rasterizer: Arc<dyn PageRasterizer>,
    temp_dir: PathBuf,
}

impl TextExtractor {
    pub fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        rasterizer: Arc<dyn PageRasterizer>,
        temp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            generator,
            rasterizer,
            temp_dir: temp_dir.into(),
        }
    }

    /// Never fails; see module docs.
    pub async fn extract(&self, document: RawDocument) -> String {
        match document.kind {
            DocumentKind::PlainText => String::from_utf8_lossy(&document.bytes).into_owned(),
            DocumentKind::Pdf => self.extract_pdf(document.bytes).await,
        }
    }

    async fn extract_pdf(&self, bytes: Vec<u8>) -> String {
        let bytes = Arc::new(bytes);
        let text = direct_text(bytes.clone()).await;

        if text.chars().count() >= MIN_DIRECT_TEXT_CHARS {
            return text;
        }
        let Some(generator) = self.generator.as_deref() else {
            warn!(
                "Direct extraction yielded {} chars and no generative backend is configured",
                text.chars().count()
            );
            return text;
        };

        info!("Direct extraction under-filled, trying OCR on the first page");
        match self.ocr_first_page(generator, &bytes).await {
            Ok(Some(ocr_text)) => ocr_text,
            Ok(None) => text,
            Err(e) => {
                error!("OCR fallback error: {e}");
                text
            }
        }
    }

    async fn ocr_first_page(
        &self,
        generator: &dyn TextGenerator,
        pdf_bytes: &[u8],
    ) -> Result<Option<String>, OcrError> {
        let work_dir = tempfile::Builder::new()
            .prefix("ocr-")
            .tempdir_in(&self.temp_dir)?;

        let pdf_path = work_dir.path().join("source.pdf");
        tokio::fs::write(&pdf_path, pdf_bytes).await?;

        let image_path = self
            .rasterizer
            .rasterize_first_page(&pdf_path, work_dir.path())
            .await?;
        let image = ImageInput {
            media_type: "image/png".to_string(),
            bytes: tokio::fs::read(&image_path).await?,
        };

        let reply = generator
            .generate_from_image(OCR_PROMPT, &image, &GenerationOptions::default())
            .await?;

        Ok(Some(reply.text).filter(|t| !t.trim().is_empty()))
    }
}

/// Text layer of every page, concatenated. pdf-extract is CPU bound and can
/// panic on malformed files, so it runs on the blocking pool.
async fn direct_text(bytes: Arc<Vec<u8>>) -> String {
    let result = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;
    match result {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            error!("PDF text extraction error: {e}");
            String::new()
        }
        Err(e) => {
            error!("PDF text extraction aborted: {e}");
            String::new()
        }
    }
}
