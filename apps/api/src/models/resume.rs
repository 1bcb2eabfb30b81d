//! Canonical resume model — the single structured representation every input
//! shape is reduced to before rendering.
//!
//! Dates are kept as free text throughout. Source resumes mix "Jan 2022 – Present",
//! "2022-2024" and "Spring '19"; nothing here parses them.

use serde::{Deserialize, Serialize};

use crate::extraction::sections::SectionKind;

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_empty()
            && self.email.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.linkedin.is_none()
            && self.portfolio.is_none()
    }
}

/// A single role. An entry with a title but no company is kept with `company: None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: Option<String>,
    pub dates: Option<String>,
    pub location: Option<String>,
    pub responsibilities: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_fallback: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: Option<String>,
    pub graduation_date: Option<String>,
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_fallback: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub description: Option<String>,
    pub achievements: Vec<String>,
    pub technologies: Vec<String>,
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_fallback: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    pub issuer: Option<String>,
    pub issue_date: Option<String>,
    pub expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_fallback: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub title: String,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_fallback: bool,
}

/// A spoken language. Never a programming language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageProficiency {
    pub name: String,
    pub proficiency: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_fallback: bool,
}

/// Root aggregate handed to the renderer. Built fresh per request and never
/// patched afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalResumeModel {
    pub contact: ContactInfo,
    pub summary: String,
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub core_competencies: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub projects: Vec<ProjectEntry>,
    pub certifications: Vec<Certification>,
    pub awards: Vec<Award>,
    pub languages: Vec<LanguageProficiency>,
    /// Sections in the order they first appear in the source.
    pub section_order: Vec<SectionKind>,
    /// Sections whose content is illustrative placeholder data, not the candidate's.
    pub placeholder_sections: Vec<SectionKind>,
}

impl CanonicalResumeModel {
    /// Whether the section has anything worth rendering.
    pub fn has_section(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Summary => !self.summary.trim().is_empty(),
            SectionKind::Experience => !self.experience.is_empty(),
            SectionKind::Education => !self.education.is_empty(),
            SectionKind::Skills => !self.technical_skills.is_empty() || !self.soft_skills.is_empty(),
            SectionKind::Projects => !self.projects.is_empty(),
            SectionKind::Certifications => !self.certifications.is_empty(),
            SectionKind::Awards => !self.awards.is_empty(),
            SectionKind::Languages => !self.languages.is_empty(),
            SectionKind::CoreCompetencies => !self.core_competencies.is_empty(),
        }
    }

    /// Render order: source order first, then any remaining kinds in canonical order.
    pub fn render_order(&self) -> Vec<SectionKind> {
        let mut order: Vec<SectionKind> = Vec::with_capacity(SectionKind::ALL.len());
        for kind in self.section_order.iter().chain(SectionKind::ALL.iter()) {
            if !order.contains(kind) {
                order.push(*kind);
            }
        }
        order.retain(|kind| self.has_section(*kind));
        order
    }
}
