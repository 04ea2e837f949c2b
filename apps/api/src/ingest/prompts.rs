// Prompt templates for the ingest module.

/// Sent alongside the rasterized first page of a PDF with no text layer.
pub const OCR_PROMPT: &str = "Extract text from this image. \
Return the text exactly as it appears, preserving line breaks. \
Do not summarize or add commentary.";
