pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::chat::handlers as chat;
use crate::extraction::handlers as extraction;
use crate::generation::handlers as generation;
use crate::ingest::handlers as ingest;
use crate::render::handlers as render;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        // Ingest
        .route("/api/upload/resume", post(ingest::handle_upload_resume))
        .route(
            "/api/upload/text-resume",
            post(ingest::handle_upload_text_resume),
        )
        .route("/api/upload/job-urls", post(ingest::handle_job_urls))
        // Extraction
        .route(
            "/api/extract/personal",
            post(extraction::handle_extract_personal),
        )
        .route(
            "/api/extract/projects",
            post(extraction::handle_extract_projects),
        )
        .route("/api/extract/job", post(extraction::handle_extract_job))
        // Analysis
        .route(
            "/api/analyze/sections",
            post(analysis::handle_analyze_sections),
        )
        .route("/api/analyze/domain", post(analysis::handle_analyze_domain))
        // Generation and artifacts
        .route("/api/resume/generate", post(generation::handle_generate))
        .route("/api/resume/list", get(render::handle_list))
        .route(
            "/api/resume/download/:filename",
            get(render::handle_download),
        )
        .route("/api/template", get(render::handle_template))
        .route("/api/chat/message", post(chat::handle_chat_message))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::generation::generator::ResumePipeline;
    use crate::ingest::rasterizer::PdftoppmRasterizer;
    use crate::ingest::scraper::JobPageFetcher;
    use crate::ingest::text_extractor::TextExtractor;
    use crate::render::compiler::LatexCompiler;
    use crate::render::storage::DEFAULT_TEMPLATE_FILE;

    fn test_config(root: &Path) -> Config {
        Config {
            anthropic_api_key: None,
            temp_dir: root.join("temp"),
            pdf_output_dir: root.join("generated_pdfs"),
            latex_template_dir: root.join("templates"),
            latex_program: "pdflatex-not-installed".to_string(),
            rasterizer_program: "pdftoppm-not-installed".to_string(),
            compile_timeout: Duration::from_secs(5),
            max_file_size: 1024 * 1024,
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    /// No generative backend: every model-assisted step takes its degraded path.
    fn test_app(root: &TempDir) -> Router {
        let config = test_config(root.path());
        for dir in config.directories() {
            std::fs::create_dir_all(dir).unwrap();
        }
        let compiler = Arc::new(LatexCompiler::new(
            config.pdf_output_dir.clone(),
            config.latex_program.clone(),
            config.compile_timeout,
        ));
        let rasterizer = Arc::new(PdftoppmRasterizer::new(
            config.rasterizer_program.clone(),
            config.compile_timeout,
        ));
        let state = AppState {
            generator: None,
            pipeline: Arc::new(ResumePipeline::new(None, compiler)),
            text_extractor: Arc::new(TextExtractor::new(None, rasterizer, config.temp_dir.clone())),
            fetcher: JobPageFetcher::new().unwrap(),
            config,
        };
        build_router(state)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_backend_absent() {
        let root = TempDir::new().unwrap();
        let response = test_app(&root)
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "tailor-api");
        assert_eq!(body["generative_backend_configured"], false);
    }

    #[tokio::test]
    async fn test_text_resume_upload_echoes_text() {
        let root = TempDir::new().unwrap();
        let response = test_app(&root)
            .oneshot(post_json(
                "/api/upload/text-resume",
                json!({ "resumeText": "Jane Roe\nData Analyst" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["extracted_text"], "Jane Roe\nData Analyst");
        assert_eq!(body["text_length"], 21);
    }

    #[tokio::test]
    async fn test_extract_personal_returns_verbatim_report() {
        let root = TempDir::new().unwrap();
        let response = test_app(&root)
            .oneshot(post_json(
                "/api/extract/personal",
                json!({ "resume_text": "Jane Roe\njane@roe.dev" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["personal"]["raw_resume_text"], "Jane Roe\njane@roe.dev");
        assert_eq!(body["verbatim"]["checked"], 0);
        assert_eq!(body["verbatim"]["missing"], json!([]));
    }

    #[tokio::test]
    async fn test_chat_message_advances_step() {
        let root = TempDir::new().unwrap();
        let response = test_app(&root)
            .oneshot(post_json(
                "/api/chat/message",
                json!({ "message": "Yes please", "step": "initial" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["next_step"], "awaiting_resume");
    }

    #[tokio::test]
    async fn test_blank_resume_text_is_validation_error() {
        let root = TempDir::new().unwrap();
        let response = test_app(&root)
            .oneshot(post_json("/api/analyze/sections", json!({ "resume_text": "  " })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generate_requires_job_descriptions() {
        let root = TempDir::new().unwrap();
        let response = test_app(&root)
            .oneshot(post_json(
                "/api/resume/generate",
                json!({ "resume_text": "Jane Roe", "job_descriptions": [] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_without_template_is_validation_error() {
        let root = TempDir::new().unwrap();
        let response = test_app(&root)
            .oneshot(post_json(
                "/api/resume/generate",
                json!({
                    "resume_text": "Jane Roe",
                    "job_descriptions": [{ "text": "Data Scientist at Acme" }]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("template"));
    }

    #[tokio::test]
    async fn test_generate_without_backend_reports_failed_jobs() {
        let root = TempDir::new().unwrap();
        let response = test_app(&root)
            .oneshot(post_json(
                "/api/resume/generate",
                json!({
                    "resumeText": "Jane Roe\nData Analyst",
                    "jobDescriptions": [
                        { "text": "Data Scientist at Acme" },
                        { "text": "ML Engineer", "company": "Globex" }
                    ],
                    "templateContent": "\\documentclass{article}"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["summary"]["total"], 2);
        assert_eq!(body["summary"]["failed"], 2);
        assert_eq!(body["results"][0]["failed_stage"], "reconstructing");
        assert_eq!(body["results"][1]["company"], "Globex");
    }

    #[tokio::test]
    async fn test_template_served_from_template_dir() {
        let root = TempDir::new().unwrap();
        let app = test_app(&root);
        std::fs::write(
            root.path().join("templates").join(DEFAULT_TEMPLATE_FILE),
            "\\documentclass{article}",
        )
        .unwrap();

        let response = app
            .oneshot(Request::get("/api/template").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["template"], "\\documentclass{article}");
    }

    #[tokio::test]
    async fn test_list_and_download_artifact() {
        let root = TempDir::new().unwrap();
        let app = test_app(&root);
        let pdf_dir = root.path().join("generated_pdfs");
        std::fs::write(pdf_dir.join("resume_1_Acme_Analyst.pdf"), b"%PDF-1.4").unwrap();
        std::fs::write(pdf_dir.join("resume_1_Acme_Analyst.tex"), b"\\end").unwrap();

        let response = app
            .clone()
            .oneshot(Request::get("/api/resume/list").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["count"], 1);
        assert_eq!(
            body["files"][0]["download_url"],
            "/api/resume/download/resume_1_Acme_Analyst.pdf"
        );

        let response = app
            .oneshot(
                Request::get("/api/resume/download/resume_1_Acme_Analyst.pdf")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_download_missing_or_traversal_is_not_found() {
        let root = TempDir::new().unwrap();
        let app = test_app(&root);

        for uri in ["/api/resume/download/missing.pdf", "/api/resume/download/..%2Fsecret.pdf"] {
            let response = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }
}
