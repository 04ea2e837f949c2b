use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
///
/// Nothing is required. Without `ANTHROPIC_API_KEY` the service runs with every
/// generative step on its degraded path.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub temp_dir: PathBuf,
    pub pdf_output_dir: PathBuf,
    pub latex_template_dir: PathBuf,
    pub latex_program: String,
    pub rasterizer_program: String,
    pub compile_timeout: Duration,
    pub max_file_size: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            temp_dir: env_or("TEMP_DIR", "temp").into(),
            pdf_output_dir: env_or("PDF_OUTPUT_DIR", "generated_pdfs").into(),
            latex_template_dir: env_or("LATEX_TEMPLATE_DIR", "templates").into(),
            latex_program: env_or("LATEX_PROGRAM", "pdflatex"),
            rasterizer_program: env_or("RASTERIZER_PROGRAM", "pdftoppm"),
            compile_timeout: Duration::from_secs(parse_env("COMPILE_TIMEOUT_SECS", 120)?),
            max_file_size: parse_env("MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE)?,
            port: parse_env("PORT", 5000)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Directories the service writes to or reads from; created at startup.
    pub fn directories(&self) -> [&PathBuf; 3] {
        [&self.temp_dir, &self.pdf_output_dir, &self.latex_template_dir]
    }
}

/// Unset and blank values both count as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
