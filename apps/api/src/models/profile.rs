//! Structured profile — the AI enhancement step's JSON view of a resume.
//!
//! The upstream model does not hold to one shape: keys arrive in snake_case or
//! camelCase, bullet lists under several names, technology lists as either a
//! string or an array. Every field is optional and deserialization is lenient;
//! conversion into canonical entries happens in `generation::assembler`.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accepts `"a, b; c"`, `["a", "b"]`, or `null`.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| flatten_strings(&v)).unwrap_or_default())
}

/// Accepts a string, a number, or `null` and yields a trimmed, non-empty string.
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// Accepts an array, a single object, or `null`. Items that do not fit `T`
/// are skipped rather than failing the whole profile.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        Some(item @ Value::Object(_)) => vec![item],
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn flatten_strings(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split([',', ';', '\n'])
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        Value::Array(items) => items.iter().flat_map(flatten_strings).collect(),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("skill"))
            .map(flatten_strings)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileExperience {
    #[serde(alias = "role", alias = "position", deserialize_with = "loose_string")]
    pub title: Option<String>,
    #[serde(alias = "employer", alias = "organization", deserialize_with = "loose_string")]
    pub company: Option<String>,
    #[serde(alias = "duration", alias = "date_range", alias = "dateRange", deserialize_with = "loose_string")]
    pub dates: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub location: Option<String>,
    #[serde(
        alias = "achievements",
        alias = "bullets",
        alias = "highlights",
        deserialize_with = "string_or_list"
    )]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileEducation {
    #[serde(deserialize_with = "loose_string")]
    pub degree: Option<String>,
    #[serde(alias = "school", alias = "university", deserialize_with = "loose_string")]
    pub institution: Option<String>,
    #[serde(
        alias = "graduationDate",
        alias = "date",
        alias = "year",
        deserialize_with = "loose_string"
    )]
    pub graduation_date: Option<String>,
    #[serde(alias = "description", deserialize_with = "loose_string")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileProject {
    #[serde(alias = "title", deserialize_with = "loose_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub description: Option<String>,
    #[serde(alias = "bullets", alias = "highlights", deserialize_with = "string_or_list")]
    pub achievements: Vec<String>,
    #[serde(alias = "tech_stack", alias = "techStack", alias = "technology", deserialize_with = "string_or_list")]
    pub technologies: Vec<String>,
    #[serde(alias = "dates", deserialize_with = "loose_string")]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileCertification {
    #[serde(alias = "title", deserialize_with = "loose_string")]
    pub name: Option<String>,
    #[serde(alias = "organization", alias = "issuing_organization", deserialize_with = "loose_string")]
    pub issuer: Option<String>,
    #[serde(alias = "issueDate", alias = "date", deserialize_with = "loose_string")]
    pub issue_date: Option<String>,
    #[serde(alias = "expiryDate", alias = "expires", deserialize_with = "loose_string")]
    pub expiry_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileAward {
    #[serde(alias = "name", deserialize_with = "loose_string")]
    pub title: Option<String>,
    #[serde(alias = "organization", deserialize_with = "loose_string")]
    pub issuer: Option<String>,
    #[serde(alias = "year", deserialize_with = "loose_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileLanguage {
    #[serde(alias = "language", deserialize_with = "loose_string")]
    pub name: Option<String>,
    #[serde(alias = "level", alias = "fluency", deserialize_with = "loose_string")]
    pub proficiency: Option<String>,
}

/// Languages arrive as objects or as bare strings like "French (Fluent)".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileLanguageItem {
    Detailed(ProfileLanguage),
    Plain(String),
}

/// The AI-produced structured view of a resume. Populated fields win over
/// re-derived extraction; empty or missing fields fall back to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredProfile {
    #[serde(alias = "name", alias = "fullName", deserialize_with = "loose_string")]
    pub full_name: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub location: Option<String>,
    #[serde(alias = "linkedIn", alias = "linkedin_url", deserialize_with = "loose_string")]
    pub linkedin: Option<String>,
    #[serde(alias = "website", alias = "github", deserialize_with = "loose_string")]
    pub portfolio: Option<String>,
    #[serde(
        alias = "professional_summary",
        alias = "professionalSummary",
        deserialize_with = "loose_string"
    )]
    pub summary: Option<String>,
    #[serde(alias = "technicalSkills", deserialize_with = "string_or_list")]
    pub technical_skills: Vec<String>,
    #[serde(alias = "softSkills", deserialize_with = "string_or_list")]
    pub soft_skills: Vec<String>,
    #[serde(alias = "coreCompetencies", deserialize_with = "string_or_list")]
    pub core_competencies: Vec<String>,
    /// Either a flat list or `{ "technical": [...], "soft": [...] }`.
    pub skills: Option<Value>,
    #[serde(alias = "work_experience", alias = "workExperience", deserialize_with = "lenient_list")]
    pub experience: Vec<ProfileExperience>,
    #[serde(deserialize_with = "lenient_list")]
    pub education: Vec<ProfileEducation>,
    #[serde(deserialize_with = "lenient_list")]
    pub projects: Vec<ProfileProject>,
    #[serde(deserialize_with = "lenient_list")]
    pub certifications: Vec<ProfileCertification>,
    #[serde(alias = "honors", deserialize_with = "lenient_list")]
    pub awards: Vec<ProfileAward>,
    #[serde(deserialize_with = "lenient_list")]
    pub languages: Vec<ProfileLanguageItem>,
}

impl StructuredProfile {
    /// Technical skills from `technical_skills`, or from a nested/flat `skills` value.
    pub fn technical_skill_list(&self) -> Vec<String> {
        if !self.technical_skills.is_empty() {
            return self.technical_skills.clone();
        }
        match &self.skills {
            Some(Value::Object(map)) => map
                .get("technical")
                .or_else(|| map.get("technical_skills"))
                .map(flatten_strings)
                .unwrap_or_default(),
            Some(other) => flatten_strings(other),
            None => Vec::new(),
        }
    }

    pub fn soft_skill_list(&self) -> Vec<String> {
        if !self.soft_skills.is_empty() {
            return self.soft_skills.clone();
        }
        match &self.skills {
            Some(Value::Object(map)) => map
                .get("soft")
                .or_else(|| map.get("soft_skills"))
                .map(flatten_strings)
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_accepts_camel_case_and_aliases() {
        let profile: StructuredProfile = serde_json::from_value(json!({
            "fullName": "Jane Doe",
            "professionalSummary": "Platform engineer.",
            "technicalSkills": "Rust, Go; Kubernetes",
            "workExperience": [{
                "role": "Staff Engineer",
                "employer": "Acme Corp",
                "duration": "2020 - Present",
                "achievements": ["Cut p99 latency by 40%"]
            }]
        }))
        .unwrap();

        assert_eq!(profile.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(profile.technical_skills, vec!["Rust", "Go", "Kubernetes"]);
        let role = &profile.experience[0];
        assert_eq!(role.title.as_deref(), Some("Staff Engineer"));
        assert_eq!(role.company.as_deref(), Some("Acme Corp"));
        assert_eq!(role.dates.as_deref(), Some("2020 - Present"));
        assert_eq!(role.responsibilities.len(), 1);
    }

    #[test]
    fn test_empty_object_is_empty_profile() {
        let profile: StructuredProfile = serde_json::from_value(json!({})).unwrap();
        assert!(profile.full_name.is_none());
        assert!(profile.experience.is_empty());
        assert!(profile.technical_skill_list().is_empty());
    }

    #[test]
    fn test_nested_skills_object() {
        let profile: StructuredProfile = serde_json::from_value(json!({
            "skills": { "technical": ["Rust", "SQL"], "soft": "Mentoring, Communication" }
        }))
        .unwrap();
        assert_eq!(profile.technical_skill_list(), vec!["Rust", "SQL"]);
        assert_eq!(profile.soft_skill_list(), vec!["Mentoring", "Communication"]);
    }

    #[test]
    fn test_languages_as_strings_or_objects() {
        let profile: StructuredProfile = serde_json::from_value(json!({
            "languages": ["French (Fluent)", { "language": "German", "level": "B2" }]
        }))
        .unwrap();
        assert!(matches!(profile.languages[0], ProfileLanguageItem::Plain(_)));
        match &profile.languages[1] {
            ProfileLanguageItem::Detailed(lang) => {
                assert_eq!(lang.name.as_deref(), Some("German"));
                assert_eq!(lang.proficiency.as_deref(), Some("B2"));
            }
            other => panic!("expected detailed language, got {other:?}"),
        }
    }

    #[test]
    fn test_null_and_numeric_fields_are_tolerated() {
        let profile: StructuredProfile = serde_json::from_value(json!({
            "email": null,
            "education": [{ "degree": "MBA", "year": 2019 }]
        }))
        .unwrap();
        assert!(profile.email.is_none());
        assert_eq!(profile.education[0].graduation_date.as_deref(), Some("2019"));
    }

    #[test]
    fn test_null_lists_and_odd_items_are_skipped() {
        let profile: StructuredProfile = serde_json::from_value(json!({
            "experience": null,
            "education": { "degree": "BSc Physics" },
            "projects": "not a list",
            "languages": ["Spanish", 42, { "language": "Italian" }],
            "awards": [7, "Dean's list", { "title": "Hackathon winner" }]
        }))
        .unwrap();
        assert!(profile.experience.is_empty());
        assert_eq!(profile.education.len(), 1);
        assert_eq!(profile.education[0].degree.as_deref(), Some("BSc Physics"));
        assert!(profile.projects.is_empty());
        assert_eq!(profile.languages.len(), 2);
        assert_eq!(profile.awards.len(), 1);
        assert_eq!(profile.awards[0].title.as_deref(), Some("Hackathon winner"));
    }
}
