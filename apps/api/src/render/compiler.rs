//! Two-pass LaTeX compilation.
//!
//! The second pass resolves forward references the first one leaves behind, so
//! both must exit cleanly. A failed run never leaves a PDF behind.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{error, info};

use crate::models::resume::CompiledArtifact;

/// Lines of compiler stdout kept when stderr is empty. pdflatex reports most
/// errors on stdout.
const STDOUT_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("LaTeX compilation failed on pass {pass}: {detail}")]
    CompileFailed { pass: u8, detail: String },

    #[error("compiler reported success but produced no {0}")]
    MissingArtifact(String),

    #[error("compiler I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait DocumentCompiler: Send + Sync {
    /// Compiles `markup` into `output_name` (a `.pdf` file name) in the output directory.
    async fn compile(&self, markup: &str, output_name: &str)
        -> Result<CompiledArtifact, CompileError>;
}

/// Runs an external LaTeX program (pdflatex by default) from the output directory.
#[derive(Debug, Clone)]
pub struct LatexCompiler {
    output_dir: PathBuf,
    program: String,
    timeout: Duration,
}

impl LatexCompiler {
    pub fn new(output_dir: impl Into<PathBuf>, program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            output_dir: output_dir.into(),
            program: program.into(),
            timeout,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    async fn run_pass(&self, pass: u8, tex_name: &str) -> Result<(), CompileError> {
        let mut command = Command::new(&self.program);
        command
            .arg("-interaction=nonstopmode")
            .arg(tex_name)
            .current_dir(&self.output_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Err(CompileError::CompileFailed {
                    pass,
                    detail: format!("timed out after {}s", self.timeout.as_secs_f32()),
                })
            }
        };

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            stdout_tail(&String::from_utf8_lossy(&output.stdout))
        } else {
            stderr
        };
        Err(CompileError::CompileFailed { pass, detail })
    }
}

#[async_trait]
impl DocumentCompiler for LatexCompiler {
    async fn compile(
        &self,
        markup: &str,
        output_name: &str,
    ) -> Result<CompiledArtifact, CompileError> {
        let stem = output_name.strip_suffix(".pdf").unwrap_or(output_name);
        let tex_name = format!("{stem}.tex");
        let pdf_name = format!("{stem}.pdf");
        let pdf_path = self.output_dir.join(&pdf_name);

        let source = markup.replace("```latex", "").replace("```", "");
        tokio::fs::write(self.output_dir.join(&tex_name), source).await?;

        for pass in 1..=2 {
            if let Err(e) = self.run_pass(pass, &tex_name).await {
                error!("Compilation of {tex_name} failed: {e}");
                remove_stale(&pdf_path).await;
                return Err(e);
            }
        }

        if !tokio::fs::try_exists(&pdf_path).await? {
            return Err(CompileError::MissingArtifact(pdf_name));
        }

        info!("PDF generated: {pdf_name}");
        Ok(CompiledArtifact::succeeded(pdf_path, pdf_name))
    }
}

async fn remove_stale(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!("Removed partial artifact {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => error!("Could not remove partial artifact {}: {e}", path.display()),
    }
}

fn stdout_tail(stdout: &str) -> String {
    let lines: Vec<&str> = stdout.lines().collect();
    let start = lines.len().saturating_sub(STDOUT_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use tempfile::TempDir;

    use super::*;

    /// Writes an executable stand-in for pdflatex. `$2` is the .tex file name.
    fn fake_program(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    const PRODUCES_PDF: &str = r#"printf '%%PDF-1.4' > "${2%.tex}.pdf""#;

    #[tokio::test]
    async fn test_two_passes_produce_artifact() {
        let out = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        let program = fake_program(
            bin.path(),
            "latex",
            &format!("echo run >> passes.log\n{PRODUCES_PDF}"),
        );
        let compiler = LatexCompiler::new(out.path(), program, Duration::from_secs(10));

        let artifact = compiler
            .compile("```latex\n\\begin{document}\\end{document}\n```", "resume_1_Acme_Dev.pdf")
            .await
            .unwrap();

        assert!(artifact.success);
        assert_eq!(artifact.filename, "resume_1_Acme_Dev.pdf");
        assert!(artifact.path.as_deref().is_some_and(Path::exists));
        let passes = std::fs::read_to_string(out.path().join("passes.log")).unwrap();
        assert_eq!(passes.lines().count(), 2);
        let source = std::fs::read_to_string(out.path().join("resume_1_Acme_Dev.tex")).unwrap();
        assert!(!source.contains("```"));
    }

    #[tokio::test]
    async fn test_first_pass_failure_leaves_no_artifact() {
        let out = TempDir::new().unwrap();
        let compiler = LatexCompiler::new(out.path(), "false", Duration::from_secs(10));

        let err = compiler
            .compile("\\begin{document}", "broken.pdf")
            .await
            .unwrap_err();

        assert!(matches!(err, CompileError::CompileFailed { pass: 1, .. }));
        assert!(!out.path().join("broken.pdf").exists());
    }

    #[tokio::test]
    async fn test_second_pass_failure_removes_first_pass_output() {
        let out = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        let program = fake_program(
            bin.path(),
            "latex",
            &format!(
                "if [ -f seen ]; then echo 'undefined reference' >&2; exit 1; fi\ntouch seen\n{PRODUCES_PDF}"
            ),
        );
        let compiler = LatexCompiler::new(out.path(), program, Duration::from_secs(10));

        let err = compiler.compile("x", "doc.pdf").await.unwrap_err();

        match err {
            CompileError::CompileFailed { pass, detail } => {
                assert_eq!(pass, 2);
                assert_eq!(detail, "undefined reference");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!out.path().join("doc.pdf").exists());
    }

    #[tokio::test]
    async fn test_stdout_used_when_stderr_is_empty() {
        let out = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        let program = fake_program(bin.path(), "latex", "echo '! Missing $ inserted.'\nexit 1");
        let compiler = LatexCompiler::new(out.path(), program, Duration::from_secs(10));

        let err = compiler.compile("x", "doc.pdf").await.unwrap_err();
        assert!(err.to_string().contains("Missing $ inserted"));
    }

    #[tokio::test]
    async fn test_timeout_is_a_pass_failure() {
        let out = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        let program = fake_program(bin.path(), "latex", "sleep 5");
        let compiler = LatexCompiler::new(out.path(), program, Duration::from_millis(100));

        let err = compiler.compile("x", "slow.pdf").await.unwrap_err();
        match err {
            CompileError::CompileFailed { pass, detail } => {
                assert_eq!(pass, 1);
                assert!(detail.starts_with("timed out"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_success_without_pdf_is_an_error() {
        let out = TempDir::new().unwrap();
        let compiler = LatexCompiler::new(out.path(), "true", Duration::from_secs(10));

        let err = compiler.compile("x", "ghost.pdf").await.unwrap_err();
        assert!(matches!(err, CompileError::MissingArtifact(name) if name == "ghost.pdf"));
    }

    #[tokio::test]
    async fn test_missing_program_is_io_error() {
        let out = TempDir::new().unwrap();
        let compiler = LatexCompiler::new(out.path(), "no-such-latex-binary", Duration::from_secs(1));

        let err = compiler.compile("x", "doc.pdf").await.unwrap_err();
        assert!(matches!(err, CompileError::Io(_)));
    }

    #[test]
    fn test_stdout_tail_keeps_last_lines() {
        let text: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let tail = stdout_tail(&text);
        assert!(tail.starts_with("line 10"));
        assert!(tail.ends_with("line 29"));
    }
}
