pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::enhancement::handlers as enhancement;
use crate::generation::handlers as generation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Extraction API
        .route("/api/v1/resumes/sections", post(generation::handle_sections))
        .route("/api/v1/resumes/extract", post(generation::handle_extract))
        // Document API
        .route("/api/v1/documents/docx", post(generation::handle_docx))
        // Upstream AI
        .route("/api/v1/enhance", post(enhancement::handle_enhance))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use zip::ZipArchive;

    use super::*;
    use crate::config::Config;
    use crate::enhancement::testing::ScriptedBackend;
    use crate::generation::handlers::PLACEHOLDER_HEADER;
    use crate::render::DOCX_MIME;

    const RESUME_HTML: &str = "<h1>Jane Doe</h1><p>jane@example.com</p>\
        <h2>EXPERIENCE</h2><div><h3>Senior Engineer</h3><span>Acme Corp</span><span>2020-2023</span><li>Shipped X</li></div>\
        <h2>EDUCATION</h2><div><h3>B.S. Computer Science</h3><span>State University</span><span>2019</span></div>\
        <h2>SKILLS</h2><ul><li>Rust</li><li>Go</li></ul>";

    fn app() -> Router {
        build_router(AppState::new(
            Config::default(),
            Arc::new(ScriptedBackend::default()),
        ))
    }

    async fn post_json(path: &str, body: Value) -> Response {
        app()
            .oneshot(
                Request::post(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resumeforge");
    }

    #[tokio::test]
    async fn test_sections_in_source_order() {
        let response = post_json("/api/v1/resumes/sections", json!({ "html": RESUME_HTML })).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let kinds: Vec<&str> = body["sections"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["kind"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, vec!["experience", "education", "skills"]);
        assert_eq!(body["sections"][0]["confidence"], "structured_markup");
    }

    #[tokio::test]
    async fn test_extract_returns_model() {
        let response = post_json(
            "/api/v1/resumes/extract",
            json!({ "htmlContent": RESUME_HTML, "profile": { "phone": "555-000-1111" } }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["contact"]["full_name"], "Jane Doe");
        assert_eq!(body["contact"]["phone"], "555-000-1111");
        assert_eq!(body["experience"][0]["company"], "Acme Corp");
    }

    #[tokio::test]
    async fn test_extract_without_input_shape_is_bad_request() {
        let response = post_json("/api/v1/resumes/extract", json!({ "jobKeywords": ["Rust"] })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid request");
        assert!(body["details"].as_str().unwrap().contains("htmlContent"));
    }

    #[tokio::test]
    async fn test_docx_download() {
        let response = post_json(
            "/api/v1/documents/docx",
            json!({
                "htmlContent": RESUME_HTML,
                "jobKeywords": ["Rust"],
                "options": { "twoColumnSkills": true, "emphasizeMetrics": true }
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], DOCX_MIME);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"jane_doe_resume.docx\""
        );
        assert!(response.headers().get(PLACEHOLDER_HEADER).is_none());

        let bytes = body_bytes(response).await;
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        for literal in ["Senior Engineer", "Acme Corp", "2020-2023", "Shipped X", "State University"] {
            assert!(xml.contains(literal), "missing {literal}");
        }
    }

    #[tokio::test]
    async fn test_docx_reports_placeholder_sections() {
        let response = post_json(
            "/api/v1/documents/docx",
            json!({
                "html": "Jane Doe\nCertifications\n\nExperience\nEngineer at Acme\n2020 - 2022",
                "options": { "fillPlaceholders": true },
                "fileName": "Jane's CV"
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[PLACEHOLDER_HEADER], "certifications");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"jane_s_cv.docx\""
        );
    }

    #[tokio::test]
    async fn test_null_profile_lists_still_render() {
        let response = post_json(
            "/api/v1/documents/docx",
            json!({ "htmlContent": "<h1>Jane Doe</h1>", "profile": { "experience": null } }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], DOCX_MIME);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_body() {
        let response = post_json("/api/v1/documents/docx", json!({ "htmlContent": 5 })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid request");
        assert!(body["details"].as_str().unwrap().contains("htmlContent"));

        let response = app()
            .oneshot(
                Request::post("/api/v1/enhance")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid request");
    }

    #[tokio::test]
    async fn test_enhance_without_api_key_fails_cleanly() {
        let state = AppState::new(
            Config::default(),
            Arc::new(
                crate::llm_client::LlmClient::new(
                    None,
                    crate::llm_client::DEFAULT_API_URL.to_string(),
                    std::time::Duration::from_secs(1),
                )
                .unwrap(),
            ),
        );
        let response = build_router(state)
            .oneshot(
                Request::post("/api/v1/enhance")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "resumeText": "Jane Doe", "jobDescription": "SRE" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(!body["error"].as_str().unwrap().contains("ANTHROPIC_API_KEY"));
    }
}
