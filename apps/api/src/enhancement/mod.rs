//! Enhancement — the upstream AI call that rewrites a resume for a job.
//!
//! The prompt carries a section directive built from the Section Locator so
//! the model keeps exactly the sections the source has, in source order. The
//! call runs under the retry orchestrator.

pub mod handlers;
pub mod prompts;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extraction::sections::{section_order, SectionKind};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::retry::{RetryError, RetryPolicy};
use crate::llm_client::{complete_json, CompletionBackend, CompletionRequest, LlmError, MODEL};
use prompts::{ENHANCE_PROMPT_TEMPLATE, ENHANCE_SYSTEM};

/// Caller-facing inputs of one enhancement call.
#[derive(Debug, Clone, Default)]
pub struct EnhanceInput {
    pub resume_text: String,
    pub job_description: String,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
}

/// The model's JSON reply. Both halves are passed through as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementResult {
    pub analysis: Map<String, Value>,
    pub enhancements: Map<String, Value>,
}

/// Instruction pinning the regenerated resume to the source's sections.
/// Empty when no section was detected.
pub fn section_directive(order: &[SectionKind]) -> String {
    if order.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = order.iter().map(|kind| kind.display_name()).collect();
    format!(
        "SECTION STRUCTURE: The original resume contains exactly these sections, in this order: {}. \
         Keep this order. Do NOT add any section that is not listed.",
        names.join(", ")
    )
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Builds the upstream request. Placeholders in a custom user prompt are
/// filled the same way as in the default template.
pub fn build_request(input: &EnhanceInput) -> CompletionRequest {
    let template = non_blank(&input.user_prompt).unwrap_or(ENHANCE_PROMPT_TEMPLATE);
    let mut prompt = template
        .replace("{resume_text}", &input.resume_text)
        .replace("{job_description}", &input.job_description);

    let directive = section_directive(&section_order(&input.resume_text));
    for fragment in [directive.as_str(), NO_FABRICATION_INSTRUCTION] {
        if !fragment.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(fragment);
        }
    }

    let system = non_blank(&input.system_prompt).unwrap_or(ENHANCE_SYSTEM);
    CompletionRequest {
        model: non_blank(&input.model).unwrap_or(MODEL).to_string(),
        system: format!("{system}\n\n{JSON_ONLY_SYSTEM}"),
        prompt,
    }
}

/// Runs the enhancement call under the retry policy.
pub async fn enhance(
    backend: &dyn CompletionBackend,
    policy: &RetryPolicy,
    input: &EnhanceInput,
) -> Result<EnhancementResult, RetryError<LlmError>> {
    let request = build_request(input);
    complete_json(backend, policy, &request).await
}
