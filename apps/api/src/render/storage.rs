//! Filesystem lookups for compiled artifacts and the markup template.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_TEMPLATE_FILE: &str = "default_template.tex";

#[derive(Debug, Clone, Serialize)]
pub struct StoredArtifact {
    pub filename: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub download_url: String,
}

/// Lists every `.pdf` in `output_dir`, newest first. A missing directory lists as empty.
pub async fn list_artifacts(output_dir: &Path) -> std::io::Result<Vec<StoredArtifact>> {
    let mut entries = match tokio::fs::read_dir(output_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut artifacts = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let filename = entry.file_name().to_string_lossy().into_owned();
        if !filename.ends_with(".pdf") {
            continue;
        }
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        artifacts.push(StoredArtifact {
            download_url: format!("/api/resume/download/{filename}"),
            filename,
            size: metadata.len(),
            modified: metadata.modified()?.into(),
        });
    }

    artifacts.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.filename.cmp(&b.filename)));
    Ok(artifacts)
}

/// Resolves a download name to a path inside `output_dir`.
///
/// `None` for names carrying path separators or parent references, and for
/// files that do not exist.
pub async fn resolve_artifact(output_dir: &Path, filename: &str) -> Option<PathBuf> {
    if !is_plain_file_name(filename) {
        return None;
    }
    let path = output_dir.join(filename);
    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => Some(path),
        _ => None,
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

pub async fn read_template(template_dir: &Path) -> std::io::Result<String> {
    tokio::fs::read_to_string(template_dir.join(DEFAULT_TEMPLATE_FILE)).await
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_lists_only_pdfs() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("resume_1_Acme_Dev.pdf"), b"%PDF").unwrap();
        std::fs::write(dir.path().join("resume_1_Acme_Dev.tex"), b"x").unwrap();
        std::fs::write(dir.path().join("resume_1_Acme_Dev.log"), b"x").unwrap();

        let artifacts = list_artifacts(dir.path()).await.unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].size, 4);
        assert_eq!(
            artifacts[0].download_url,
            "/api/resume/download/resume_1_Acme_Dev.pdf"
        );
    }

    #[tokio::test]
    async fn test_missing_output_dir_lists_empty() {
        let dir = TempDir::new().unwrap();
        let artifacts = list_artifacts(&dir.path().join("absent")).await.unwrap();
        assert!(artifacts.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"%PDF").unwrap();

        assert!(resolve_artifact(dir.path(), "a.pdf").await.is_some());
        assert!(resolve_artifact(dir.path(), "../a.pdf").await.is_none());
        assert!(resolve_artifact(dir.path(), "sub/a.pdf").await.is_none());
        assert!(resolve_artifact(dir.path(), "..").await.is_none());
        assert!(resolve_artifact(dir.path(), "missing.pdf").await.is_none());
    }

    #[tokio::test]
    async fn test_read_template() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DEFAULT_TEMPLATE_FILE), "\\begin{document}").unwrap();
        assert_eq!(read_template(dir.path()).await.unwrap(), "\\begin{document}");
        assert!(read_template(&dir.path().join("nope")).await.is_err());
    }
}
