//! Axum route handler for the analyze endpoint.

use std::time::Instant;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::{error, info};

use crate::analysis::analyzer::ResumeAnalysis;
use crate::analysis::similarity::SimilarityResult;
use crate::analysis::upload::{collect_uploads, validate_uploads};
use crate::errors::AppError;
use crate::state::{AppState, Readiness};

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub resume_analysis: ResumeAnalysis,
    pub similarity_results: SimilarityResult,
    pub processing_time_seconds: f64,
}

/// POST /analyze/
///
/// Expects `resume_file` and `jd_file` as multipart/form-data PDF uploads.
/// Collaborators run strictly in sequence: parse resume, parse JD, analyze, compare.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    info!("Received request for /analyze/");
    let start = Instant::now();

    let services = match state.readiness.as_ref() {
        Readiness::Ready(services) => services,
        Readiness::Unavailable { reason } => {
            error!("Initialization failed: {reason}");
            return Err(AppError::ServiceUnavailable(format!(
                "API service unavailable due to initialization failure: {reason}"
            )));
        }
    };

    let mut multipart = multipart.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    })?;

    let (resume, jd) = collect_uploads(&mut multipart).await?;
    let (resume, jd) = validate_uploads(resume, jd)?;
    info!(
        "Resume size: {} bytes, JD size: {} bytes",
        resume.bytes.len(),
        jd.bytes.len()
    );

    info!("Processing resume PDF...");
    let resume_docs = services.pdf.parse(resume.bytes, &resume.filename).await?;
    info!("Processing job description PDF...");
    let jd_docs = services.pdf.parse(jd.bytes, &jd.filename).await?;

    info!("Performing resume analysis...");
    let resume_analysis = services.analyzer.analyze(&resume_docs).await?;

    info!("Calculating similarity...");
    let similarity_results = services.similarity.compare(&resume_docs, &jd_docs).await?;

    let processing_time_seconds = start.elapsed().as_secs_f64();
    info!("Request processing finished successfully in {processing_time_seconds:.2} seconds");

    Ok(Json(AnalyzeResponse {
        resume_analysis,
        similarity_results,
        processing_time_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use bytes::Bytes;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::analysis::analyzer::{ResumeAnalysis, ResumeAnalyzer};
    use crate::analysis::error::ServiceError;
    use crate::analysis::pdf::{ParsedDocs, PdfProcessor};
    use crate::analysis::similarity::{KeywordSimilarityScorer, SimilarityResult, SimilarityScorer};
    use crate::analysis::Services;
    use crate::config::Config;
    use crate::routes::build_router;
    use crate::state::{AppState, Readiness};

    const BOUNDARY: &str = "X-ANALYZER-BOUNDARY";

    #[derive(Clone, Default)]
    struct Calls(Arc<AtomicUsize>);

    impl Calls {
        fn hit(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    /// Treats uploaded bytes as already-extracted text.
    struct MockPdf {
        calls: Calls,
        fail_on: Option<(String, ServiceError)>,
    }

    #[async_trait]
    impl PdfProcessor for MockPdf {
        async fn parse(&self, bytes: Bytes, filename: &str) -> Result<ParsedDocs, ServiceError> {
            self.calls.hit();
            if let Some((name, err)) = &self.fail_on {
                if name == filename {
                    return Err(err.clone());
                }
            }
            Ok(ParsedDocs::from_text(filename, &String::from_utf8_lossy(&bytes)))
        }
    }

    /// Echoes the resume text back as the summary.
    struct MockAnalyzer {
        calls: Calls,
        fail: Option<ServiceError>,
    }

    #[async_trait]
    impl ResumeAnalyzer for MockAnalyzer {
        async fn analyze(&self, docs: &ParsedDocs) -> Result<ResumeAnalysis, ServiceError> {
            self.calls.hit();
            if let Some(err) = &self.fail {
                return Err(err.clone());
            }
            Ok(ResumeAnalysis {
                summary: docs.full_text(),
                ..ResumeAnalysis::default()
            })
        }
    }

    struct MockSimilarity {
        calls: Calls,
        fail: Option<ServiceError>,
    }

    #[async_trait]
    impl SimilarityScorer for MockSimilarity {
        async fn compare(
            &self,
            resume: &ParsedDocs,
            jd: &ParsedDocs,
        ) -> Result<SimilarityResult, ServiceError> {
            self.calls.hit();
            if let Some(err) = &self.fail {
                return Err(err.clone());
            }
            KeywordSimilarityScorer.compare(resume, jd).await
        }
    }

    #[derive(Default)]
    struct Failures {
        pdf: Option<(String, ServiceError)>,
        analyzer: Option<ServiceError>,
        similarity: Option<ServiceError>,
    }

    struct Harness {
        app: Router,
        pdf_calls: Calls,
        analyzer_calls: Calls,
        similarity_calls: Calls,
    }

    impl Harness {
        fn total_calls(&self) -> usize {
            self.pdf_calls.count() + self.analyzer_calls.count() + self.similarity_calls.count()
        }
    }

    fn harness(failures: Failures) -> Harness {
        harness_with_config(failures, &Config::default())
    }

    fn harness_with_config(failures: Failures, config: &Config) -> Harness {
        let pdf_calls = Calls::default();
        let analyzer_calls = Calls::default();
        let similarity_calls = Calls::default();

        let services = Services {
            pdf: Arc::new(MockPdf {
                calls: pdf_calls.clone(),
                fail_on: failures.pdf,
            }),
            analyzer: Arc::new(MockAnalyzer {
                calls: analyzer_calls.clone(),
                fail: failures.analyzer,
            }),
            similarity: Arc::new(MockSimilarity {
                calls: similarity_calls.clone(),
                fail: failures.similarity,
            }),
        };

        Harness {
            app: build_router(AppState::new(Readiness::Ready(services)), config),
            pdf_calls,
            analyzer_calls,
            similarity_calls,
        }
    }

    fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match filename {
                Some(f) => format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n"
                ),
                None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n"),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
            body.extend_from_slice(content.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/analyze/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn valid_request() -> Request<Body> {
        multipart_request(&[
            ("resume_file", Some("resume.pdf"), "Rust engineer with Tokio and Kafka"),
            ("jd_file", Some("jd.pdf"), "Hiring Rust engineer, Kafka and Kubernetes"),
        ])
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_success_returns_envelope() {
        let h = harness(Failures::default());
        let (status, body) = send(&h.app, valid_request()).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body["resume_analysis"].is_null());
        assert!(!body["similarity_results"].is_null());
        assert!(body["processing_time_seconds"].as_f64().unwrap() >= 0.0);
        assert_eq!(h.pdf_calls.count(), 2);
        assert_eq!(h.analyzer_calls.count(), 1);
        assert_eq!(h.similarity_calls.count(), 1);
    }

    #[tokio::test]
    async fn test_missing_jd_file_is_400_without_collaborator_calls() {
        let h = harness(Failures::default());
        let request = multipart_request(&[("resume_file", Some("resume.pdf"), "text")]);
        let (status, body) = send(&h.app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Missing 'jd_file' in the request."
        );
        assert_eq!(h.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_over_body_limit_is_400_without_collaborator_calls() {
        let config = Config {
            max_upload_bytes: 256,
            ..Config::default()
        };
        let h = harness_with_config(Failures::default(), &config);

        let oversized = "Rust ".repeat(200);
        let request = multipart_request(&[
            ("resume_file", Some("resume.pdf"), oversized.as_str()),
            ("jd_file", Some("jd.pdf"), "Rust engineer"),
        ]);
        let (status, body) = send(&h.app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(h.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_under_body_limit_is_accepted() {
        let config = Config {
            max_upload_bytes: 4096,
            ..Config::default()
        };
        let h = harness_with_config(Failures::default(), &config);
        let (status, _) = send(&h.app, valid_request()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(h.pdf_calls.count(), 2);
    }

    #[tokio::test]
    async fn test_missing_both_files_is_400() {
        let h = harness(Failures::default());
        let request = multipart_request(&[("notes", None, "hello")]);
        let (status, _) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(h.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_filename_is_400() {
        let h = harness(Failures::default());
        let request = multipart_request(&[
            ("resume_file", Some(""), "text"),
            ("jd_file", Some("jd.pdf"), "text"),
        ]);
        let (status, _) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(h.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_uppercase_extension_accepted_docx_rejected() {
        let h = harness(Failures::default());
        let accepted = multipart_request(&[
            ("resume_file", Some("RESUME.PDF"), "Rust engineer"),
            ("jd_file", Some("jd.pdf"), "Rust engineer wanted"),
        ]);
        let (status, _) = send(&h.app, accepted).await;
        assert_eq!(status, StatusCode::OK);

        let rejected = multipart_request(&[
            ("resume_file", Some("resume.docx"), "Rust engineer"),
            ("jd_file", Some("jd.pdf"), "Rust engineer wanted"),
        ]);
        let (status, body) = send(&h.app, rejected).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("resume.docx"));
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_400() {
        let h = harness(Failures::default());
        let request = Request::builder()
            .method("POST")
            .uri("/analyze/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, _) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(h.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_service_returns_503_for_valid_input() {
        let readiness = Readiness::from_init(Err(ServiceError::Internal(
            "ANTHROPIC_API_KEY is not set".to_string(),
        )));
        let app = build_router(AppState::new(readiness), &Config::default());

        let (status, body) = send(&app, valid_request()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body["error"]["message"],
            "API service unavailable due to initialization failure: ANTHROPIC_API_KEY is not set"
        );
    }

    #[tokio::test]
    async fn test_unavailable_service_returns_503_before_body_checks() {
        let readiness = Readiness::from_init(Err(ServiceError::Internal("down".to_string())));
        let app = build_router(AppState::new(readiness), &Config::default());
        let request = Request::builder()
            .method("POST")
            .uri("/analyze/")
            .body(Body::empty())
            .unwrap();

        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_pdf_processing_error_is_422() {
        let h = harness(Failures {
            pdf: Some((
                "jd.pdf".to_string(),
                ServiceError::Processing("'jd.pdf' is not a valid PDF document.".to_string()),
            )),
            ..Failures::default()
        });
        let (status, body) = send(&h.app, valid_request()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Processing Error");
        assert_eq!(body["detail"], "'jd.pdf' is not a valid PDF document.");
        assert_eq!(h.pdf_calls.count(), 2);
        assert_eq!(h.analyzer_calls.count(), 0);
        assert_eq!(h.similarity_calls.count(), 0);
    }

    #[tokio::test]
    async fn test_analyzer_processing_error_is_422() {
        let h = harness(Failures {
            analyzer: Some(ServiceError::Processing("unanalyzable".to_string())),
            ..Failures::default()
        });
        let (status, body) = send(&h.app, valid_request()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"], "unanalyzable");
        assert_eq!(h.similarity_calls.count(), 0);
    }

    #[tokio::test]
    async fn test_similarity_processing_error_is_422() {
        let h = harness(Failures {
            similarity: Some(ServiceError::Processing("no overlap computable".to_string())),
            ..Failures::default()
        });
        let (status, body) = send(&h.app, valid_request()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Processing Error");
        assert_eq!(body["detail"], "no overlap computable");
    }

    #[tokio::test]
    async fn test_internal_error_is_500() {
        let h = harness(Failures {
            analyzer: Some(ServiceError::Internal("upstream 401".to_string())),
            ..Failures::default()
        });
        let (status, body) = send(&h.app, valid_request()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal Server Error");
        assert_eq!(body["detail"], "upstream 401");
    }

    #[tokio::test]
    async fn test_sequential_requests_do_not_share_state() {
        let h = harness(Failures::default());

        let first = multipart_request(&[
            ("resume_file", Some("a.pdf"), "Haskell compiler engineer"),
            ("jd_file", Some("jd.pdf"), "Haskell compiler engineer"),
        ]);
        let second = multipart_request(&[
            ("resume_file", Some("b.pdf"), "Accountant payroll audits"),
            ("jd_file", Some("jd.pdf"), "Rust backend engineer"),
        ]);

        let (_, first_body) = send(&h.app, first).await;
        let (status, second_body) = send(&h.app, second).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(first_body["similarity_results"]["match_percentage"], 100);
        assert_eq!(
            second_body["resume_analysis"]["summary"],
            "Accountant payroll audits"
        );
        assert_eq!(second_body["similarity_results"]["match_percentage"], 0);
    }
}
