//! Generation request shapes.
//!
//! Callers send one of three bodies, tried in priority order:
//! `{ htmlContent, profile, jobKeywords, options }`, `{ profileData }`, `{ html }`.

use serde::Deserialize;

use crate::errors::AppError;
use crate::extraction::cascade::ExtractOptions;
use crate::models::StructuredProfile;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentOptions {
    pub two_column_skills: bool,
    pub emphasize_metrics: bool,
    /// Per-request override of `FILL_PLACEHOLDER_SECTIONS`.
    pub fill_placeholders: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateDocumentRequest {
    pub html_content: Option<String>,
    pub profile: Option<StructuredProfile>,
    pub profile_data: Option<StructuredProfile>,
    pub html: Option<String>,
    pub job_keywords: Vec<String>,
    pub options: DocumentOptions,
    pub file_name: Option<String>,
}

/// The pipeline input after shape resolution.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub raw: String,
    pub profile: Option<StructuredProfile>,
}

impl GenerateDocumentRequest {
    /// Picks the first supported shape present in the body.
    pub fn resolve(&self) -> Result<ResolvedInput, AppError> {
        if let Some(html_content) = &self.html_content {
            return Ok(ResolvedInput {
                raw: html_content.clone(),
                profile: self.profile.clone(),
            });
        }
        if let Some(profile) = &self.profile_data {
            return Ok(ResolvedInput {
                raw: String::new(),
                profile: Some(profile.clone()),
            });
        }
        if let Some(html) = &self.html {
            return Ok(ResolvedInput {
                raw: html.clone(),
                profile: None,
            });
        }
        Err(AppError::Validation(
            "Request must include htmlContent, profileData or html".to_string(),
        ))
    }

    pub fn extract_options(&self, fill_placeholders_default: bool) -> ExtractOptions {
        ExtractOptions {
            fill_placeholders: self
                .options
                .fill_placeholders
                .unwrap_or(fill_placeholders_default),
        }
    }
}
