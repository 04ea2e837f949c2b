use std::path::PathBuf;

use serde::Serialize;

/// Outcome of compiling one generated document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledArtifact {
    /// Server-side location; never sent to clients.
    #[serde(skip)]
    pub path: Option<PathBuf>,
    pub filename: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl CompiledArtifact {
    pub fn succeeded(path: PathBuf, filename: impl Into<String>) -> Self {
        Self {
            path: Some(path),
            filename: filename.into(),
            success: true,
            error_detail: None,
        }
    }

    /// A job that ended before (or while) compiling. `filename` is the name the
    /// artifact would have had.
    pub fn failed(filename: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            path: None,
            filename: filename.into(),
            success: false,
            error_detail: Some(detail.into()),
        }
    }

    pub fn download_url(&self) -> Option<String> {
        self.success
            .then(|| format!("/api/resume/download/{}", self.filename))
    }
}
