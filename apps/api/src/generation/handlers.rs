//! Axum route handlers for the extraction and document APIs.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};
use uuid::Uuid;

use crate::errors::{AppError, AppJson};
use crate::extraction::sections::{locate, Detection, SectionKind};
use crate::generation::assembler::assemble;
use crate::generation::filename::suggested_filename;
use crate::generation::request::GenerateDocumentRequest;
use crate::models::CanonicalResumeModel;
use crate::render::{render_docx, Emphasis, RenderOptions, DOCX_MIME};
use crate::state::AppState;

pub const PLACEHOLDER_HEADER: &str = "x-placeholder-sections";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionsRequest {
    #[serde(alias = "htmlContent")]
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct LocatedSection {
    pub kind: SectionKind,
    pub heading: String,
    pub confidence: Detection,
}

#[derive(Debug, Serialize)]
pub struct SectionsResponse {
    pub sections: Vec<LocatedSection>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/sections
///
/// Returns the sections present in the source, in source order.
pub async fn handle_sections(
    AppJson(request): AppJson<SectionsRequest>,
) -> Json<SectionsResponse> {
    let sections = locate(&request.html)
        .sections
        .into_iter()
        .map(|section| LocatedSection {
            kind: section.kind,
            heading: section.heading,
            confidence: section.confidence,
        })
        .collect();
    Json(SectionsResponse { sections })
}

/// POST /api/v1/resumes/extract
///
/// Assembles the canonical model from any supported input shape.
pub async fn handle_extract(
    State(state): State<AppState>,
    AppJson(request): AppJson<GenerateDocumentRequest>,
) -> Result<Json<CanonicalResumeModel>, AppError> {
    let input = request.resolve()?;
    let options = request.extract_options(state.config.fill_placeholder_sections);
    let request_id = Uuid::new_v4();

    let model = info_span!("extract", %request_id)
        .in_scope(|| assemble(&input.raw, input.profile.as_ref(), options));

    info!(
        %request_id,
        sections = model.render_order().len(),
        placeholders = model.placeholder_sections.len(),
        "Resume model assembled"
    );
    Ok(Json(model))
}

/// POST /api/v1/documents/docx
///
/// Assembles the model and renders it as a DOCX attachment. Either the whole
/// document is returned or an error body; never a partial file.
pub async fn handle_docx(
    State(state): State<AppState>,
    AppJson(request): AppJson<GenerateDocumentRequest>,
) -> Result<(HeaderMap, Bytes), AppError> {
    let input = request.resolve()?;
    let options = request.extract_options(state.config.fill_placeholder_sections);
    let render_options = RenderOptions {
        two_column_skills: request.options.two_column_skills,
        emphasis: Emphasis::new(&request.job_keywords, request.options.emphasize_metrics),
    };
    let request_id = Uuid::new_v4();

    // Extraction and rendering are CPU-bound.
    let (model, document) = tokio::task::spawn_blocking(move || {
        let _span = info_span!("docx", %request_id).entered();
        let model = assemble(&input.raw, input.profile.as_ref(), options);
        let document = render_docx(&model, &render_options);
        (model, document)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))?;
    let document = document?;

    let filename = suggested_filename(&model.contact.full_name, request.file_name.as_deref());
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(DOCX_MIME));
    // Sanitized filenames are plain ASCII.
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid filename header: {e}")))?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    if !model.placeholder_sections.is_empty() {
        let kinds: Vec<String> = model
            .placeholder_sections
            .iter()
            .filter_map(|kind| serde_json::to_value(kind).ok())
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect();
        if let Ok(value) = HeaderValue::from_str(&kinds.join(",")) {
            headers.insert(HeaderName::from_static(PLACEHOLDER_HEADER), value);
        }
    }

    info!(
        %request_id,
        bytes = document.len(),
        filename = %filename,
        "DOCX generated"
    );
    Ok((headers, Bytes::from(document)))
}
