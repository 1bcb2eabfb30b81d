// All LLM prompt constants for the Enhancement module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Default system prompt when the caller does not supply one.
pub const ENHANCE_SYSTEM: &str = "You are an expert resume writer and ATS optimisation specialist. \
    You improve the wording and keyword coverage of an existing resume for a specific job \
    while keeping every fact the candidate stated.";

/// Default user prompt. Replace `{resume_text}` and `{job_description}` before sending.
pub const ENHANCE_PROMPT_TEMPLATE: &str = r#"Analyse the resume against the job description, then return an enhanced version.

Return a JSON object with this EXACT schema:
{
  "analysis": {
    "match_score": 0,
    "matched_keywords": ["..."],
    "missing_keywords": ["..."],
    "strengths": ["..."],
    "gaps": ["..."]
  },
  "enhancements": {
    "full_name": "...",
    "email": "...",
    "phone": "...",
    "location": "...",
    "linkedin": "...",
    "summary": "...",
    "technical_skills": ["..."],
    "soft_skills": ["..."],
    "core_competencies": ["..."],
    "experience": [
      {"title": "...", "company": "...", "dates": "...", "location": "...", "responsibilities": ["..."]}
    ],
    "education": [
      {"degree": "...", "institution": "...", "graduation_date": "...", "details": "..."}
    ],
    "projects": [
      {"name": "...", "description": "...", "achievements": ["..."], "technologies": ["..."], "duration": "..."}
    ],
    "certifications": [
      {"name": "...", "issuer": "...", "issue_date": "...", "expiry_date": "..."}
    ],
    "awards": [
      {"title": "...", "issuer": "...", "date": "...", "description": "..."}
    ],
    "languages": [
      {"name": "...", "proficiency": "..."}
    ]
  }
}

Leave out any enhancements key whose section the resume does not have.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}"#;
