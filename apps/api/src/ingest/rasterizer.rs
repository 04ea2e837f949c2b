use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

const RASTER_DPI: &str = "150";
const OUTPUT_STEM: &str = "first_page";

#[derive(Debug, Error)]
pub enum RasterizeError {
    #[error("rasterizer I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rasterizer exited with {status}: {detail}")]
    Failed { status: String, detail: String },

    #[error("rasterizer timed out after {0:?}")]
    TimedOut(Duration),

    #[error("rasterizer produced no image")]
    NoImage,
}

#[async_trait]
pub trait PageRasterizer: Send + Sync {
    /// Renders page one of `pdf` as a PNG inside `work_dir` and returns its path.
    async fn rasterize_first_page(&self, pdf: &Path, work_dir: &Path)
        -> Result<PathBuf, RasterizeError>;
}

/// `pdftoppm -png -r 150 -f 1 -l 1 -singlefile <pdf> <work_dir>/first_page`
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: String,
    timeout: Duration,
}

impl PdftoppmRasterizer {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl PageRasterizer for PdftoppmRasterizer {
    async fn rasterize_first_page(
        &self,
        pdf: &Path,
        work_dir: &Path,
    ) -> Result<PathBuf, RasterizeError> {
        let prefix = work_dir.join(OUTPUT_STEM);
        let mut command = Command::new(&self.program);
        command
            .args(["-png", "-r", RASTER_DPI, "-f", "1", "-l", "1", "-singlefile"])
            .arg(pdf)
            .arg(&prefix)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| RasterizeError::TimedOut(self.timeout))??;

        if !output.status.success() {
            return Err(RasterizeError::Failed {
                status: output.status.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let image = prefix.with_extension("png");
        if tokio::fs::try_exists(&image).await? {
            Ok(image)
        } else {
            Err(RasterizeError::NoImage)
        }
    }
}
