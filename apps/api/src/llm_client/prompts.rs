// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to prompts that rewrite candidate content.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Only rephrase, reorder or emphasise what the resume already states. \
    Do NOT invent employers, titles, dates, degrees, certifications or metrics. \
    If the resume does not support a claim, omit it.";
