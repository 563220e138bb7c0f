pub mod health;
pub mod jobs;
pub mod matching;
pub mod resumes;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::state::AppState;

/// Characters kept in list endpoints before the text is cut.
const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RouteInfo {
    pub method: &'static str,
    pub path: &'static str,
}

/// Every route `build_router` registers; served by GET /routes.
pub const ROUTES: &[RouteInfo] = &[
    RouteInfo { method: "GET", path: "/" },
    RouteInfo { method: "GET", path: "/ping" },
    RouteInfo { method: "POST", path: "/upload_resume" },
    RouteInfo { method: "POST", path: "/add_job" },
    RouteInfo { method: "POST", path: "/match" },
    RouteInfo { method: "POST", path: "/match_multiple" },
    RouteInfo { method: "POST", path: "/resume_summary" },
    RouteInfo { method: "GET", path: "/resumes" },
    RouteInfo { method: "GET", path: "/jobs" },
    RouteInfo { method: "GET", path: "/comparisons" },
    RouteInfo { method: "GET", path: "/routes" },
];

/// GET /routes
async fn list_routes() -> Json<&'static [RouteInfo]> {
    Json(ROUTES)
}

/// Any route added or removed here must also be added to or removed from `ROUTES`.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(health::home_handler))
        .route("/ping", get(health::ping_handler))
        .route(
            "/upload_resume",
            post(resumes::handle_upload_resume).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/add_job", post(jobs::handle_add_job))
        .route("/match", post(matching::handle_match))
        .route("/match_multiple", post(matching::handle_match_multiple))
        .route("/resume_summary", post(resumes::handle_resume_summary))
        .route("/resumes", get(resumes::handle_list_resumes))
        .route("/jobs", get(jobs::handle_list_jobs))
        .route("/comparisons", get(matching::handle_list_comparisons))
        .route("/routes", get(list_routes))
        .with_state(state)
}

/// Unwraps a JSON string field, rejecting missing and blank values.
pub(crate) fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}

pub(crate) fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::db::memory_pool;
    use crate::extraction::docx::tests::build_docx;
    use crate::extraction::ocr::NoOcr;
    use crate::extraction::TextExtractor;
    use crate::matching::TfIdfScorer;
    use crate::repository::SqlRepository;

    const BOUNDARY: &str = "screener-test-boundary";

    async fn app() -> Router {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            port: 0,
            rust_log: "info".to_string(),
            cors_allowed_origin: None,
            max_upload_bytes: 1024 * 1024,
            ocr_enabled: false,
            ocr_dpi: 300,
            ocr_lang: "eng".to_string(),
        };
        build_router(AppState {
            repo: Arc::new(SqlRepository::new(memory_pool().await)),
            extractor: TextExtractor::new(Arc::new(NoOcr), config.ocr_dpi),
            scorer: Arc::new(TfIdfScorer),
            config,
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn get_json(app: &Router, path: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    async fn upload(app: &Router, field: &str, filename: &str, content: &[u8]) -> (StatusCode, Value) {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::post("/upload_resume")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    #[tokio::test]
    async fn test_ping_and_home() {
        let app = app().await;
        let (status, body) = get_json(&app, "/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));

        let (status, body) = get_json(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().contains("running"));
    }

    #[tokio::test]
    async fn test_upload_text_resume_is_stored() {
        let app = app().await;
        let (status, body) = upload(&app, "resume", "CV.TXT", b"Python developer with SQL").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume_text"], "Python developer with SQL");
        let resume_id = body["resume_id"].as_i64().unwrap();

        let (_, resumes) = get_json(&app, "/resumes").await;
        assert_eq!(resumes[0]["id"], resume_id);
        assert_eq!(resumes[0]["filename"], "cv.txt");
    }

    #[tokio::test]
    async fn test_upload_docx_resume() {
        let app = app().await;
        let docx = build_docx(
            r#"<w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>Rust</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );
        let (status, body) = upload(&app, "resume", "jane.docx", &docx).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume_text"], "Jane Doe\nRust\n");
    }

    #[tokio::test]
    async fn test_upload_without_resume_field_is_400() {
        let app = app().await;
        let (status, body) = upload(&app, "attachment", "cv.txt", b"hello").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No resume file uploaded");
    }

    #[tokio::test]
    async fn test_upload_non_multipart_is_400() {
        let app = app().await;
        let (status, body) = post_json(&app, "/upload_resume", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_zero_byte_upload_is_no_text_500() {
        let app = app().await;
        for name in ["empty.pdf", "empty.docx", "empty.txt"] {
            let (status, body) = upload(&app, "resume", name, b"").await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{name}");
            assert_eq!(body["error"], "No text extracted from resume", "{name}");
        }
        let (_, resumes) = get_json(&app, "/resumes").await;
        assert_eq!(resumes, json!([]));
    }

    #[tokio::test]
    async fn test_malformed_pdf_is_extraction_500() {
        let app = app().await;
        let (status, body) = upload(&app, "resume", "cv.pdf", b"not really a pdf").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to extract text:"));
    }

    #[tokio::test]
    async fn test_add_job_and_list() {
        let app = app().await;
        let (status, body) = post_json(
            &app,
            "/add_job",
            json!({ "title": "Data Engineer", "description": "Spark and SQL" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Data Engineer");
        assert!(body["job_id"].as_i64().is_some());

        let (_, jobs) = get_json(&app, "/jobs").await;
        assert_eq!(jobs[0]["description"], "Spark and SQL");
    }

    #[tokio::test]
    async fn test_add_job_missing_description_is_400() {
        let app = app().await;
        let (status, body) = post_json(&app, "/add_job", json!({ "title": "Data Engineer" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_match_returns_score_and_keywords() {
        let app = app().await;
        let (status, body) = post_json(
            &app,
            "/match",
            json!({
                "resume": "Python developer with SQL and AWS experience",
                "job": "Looking for Python and AWS engineer"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let score = body["score"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&score));
        assert_eq!(body["keywords"], json!(["and", "aws", "python"]));

        // no ids, nothing stored
        let (_, comparisons) = get_json(&app, "/comparisons").await;
        assert_eq!(comparisons, json!([]));
    }

    #[tokio::test]
    async fn test_match_with_ids_stores_comparison() {
        let app = app().await;
        let (_, resume) = upload(&app, "resume", "cv.txt", b"Rust engineer").await;
        let (_, job) = post_json(
            &app,
            "/add_job",
            json!({ "title": "Rust dev", "description": "Rust engineer" }),
        )
        .await;

        let (status, body) = post_json(
            &app,
            "/match",
            json!({
                "resume": "Rust engineer",
                "job": "Rust engineer",
                "resume_id": resume["resume_id"],
                "job_id": job["job_id"]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 100.0);

        let (_, comparisons) = get_json(&app, "/comparisons").await;
        assert_eq!(comparisons[0]["resume_id"], resume["resume_id"]);
        assert_eq!(comparisons[0]["job_id"], job["job_id"]);
        assert_eq!(comparisons[0]["score"], 100.0);
        assert_eq!(comparisons[0]["keywords"], "engineer,rust");
    }

    #[tokio::test]
    async fn test_match_missing_job_is_400() {
        let app = app().await;
        let (status, _) = post_json(&app, "/match", json!({ "resume": "Rust" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let app = app().await;
        let request = Request::post("/match")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_match_multiple_isolates_bad_jobs() {
        let app = app().await;
        let (_, resume) = upload(&app, "resume", "cv.txt", b"Python SQL AWS").await;

        let (status, body) = post_json(
            &app,
            "/match_multiple",
            json!({
                "resume": "Python SQL AWS",
                "resume_id": resume["resume_id"],
                "jobs": [
                    { "title": "Backend", "description": "Python and AWS" },
                    { "title": "Broken" },
                    { "title": "Analyst", "description": "SQL reporting" }
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["title"], "Backend");
        assert!(results[0]["score"].as_f64().unwrap() > 0.0);
        assert!(results[0].get("error").is_none());
        assert_eq!(results[1]["title"], "Broken");
        assert!(results[1]["error"].is_string());
        assert!(results[1].get("score").is_none());
        assert_eq!(results[2]["title"], "Analyst");

        let (_, jobs) = get_json(&app, "/jobs").await;
        assert_eq!(jobs.as_array().unwrap().len(), 2);
        let (_, comparisons) = get_json(&app, "/comparisons").await;
        assert_eq!(comparisons.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_match_multiple_unknown_resume_keeps_stored_job_ids() {
        let app = app().await;

        let (status, body) = post_json(
            &app,
            "/match_multiple",
            json!({
                "resume": "Python SQL AWS",
                "resume_id": 999,
                "jobs": [
                    { "title": "Backend", "description": "Python and AWS" },
                    { "title": "Analyst", "description": "SQL reporting" }
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        let mut job_ids = Vec::new();
        for item in results {
            assert!(item["score"].is_number(), "{item}");
            job_ids.push(item["job_id"].as_i64().unwrap());
            let error = item["error"].as_str().unwrap();
            assert_eq!(error, "Failed to store comparison");
        }

        let (_, jobs) = get_json(&app, "/jobs").await;
        let stored: Vec<i64> = jobs
            .as_array()
            .unwrap()
            .iter()
            .map(|job| job["id"].as_i64().unwrap())
            .collect();
        assert_eq!(stored, job_ids);
        let (_, comparisons) = get_json(&app, "/comparisons").await;
        assert!(comparisons.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_match_multiple_requires_jobs() {
        let app = app().await;
        let (status, _) =
            post_json(&app, "/match_multiple", json!({ "resume": "x", "jobs": [] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_resume_summary() {
        let app = app().await;
        let (status, body) = post_json(
            &app,
            "/resume_summary",
            json!({ "resume": "Kubernetes and Docker experience" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let summary = body["summary"].as_str().unwrap();
        assert!(summary.contains("kubernetes"));
        assert!(summary.contains("docker"));
    }

    #[tokio::test]
    async fn test_list_truncates_long_content() {
        let app = app().await;
        let long = "a".repeat(PREVIEW_CHARS + 50);
        upload(&app, "resume", "long.txt", long.as_bytes()).await;

        let (_, resumes) = get_json(&app, "/resumes").await;
        let content = resumes[0]["content"].as_str().unwrap();
        assert_eq!(content.len(), PREVIEW_CHARS + 3);
        assert!(content.ends_with("..."));
    }

    #[tokio::test]
    async fn test_every_listed_route_is_registered() {
        let app = app().await;
        let (status, listed) = get_json(&app, "/routes").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), ROUTES.len());

        for route in ROUTES {
            let request = Request::builder()
                .method(route.method)
                .uri(route.path)
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_ne!(response.status(), StatusCode::NOT_FOUND, "{}", route.path);
            assert_ne!(
                response.status(),
                StatusCode::METHOD_NOT_ALLOWED,
                "{} {}",
                route.method,
                route.path
            );
        }
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let text = "é".repeat(PREVIEW_CHARS + 1);
        let cut = preview(&text);
        assert_eq!(cut.chars().count(), PREVIEW_CHARS + 3);
        assert_eq!(preview("short"), "short");
    }
}
