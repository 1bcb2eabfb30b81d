//! Canonical Model Assembler.
//!
//! Field-by-field merge of the AI structured profile over re-derived
//! extraction. A populated profile field wins outright; an empty or missing
//! one falls back to what extraction found in the raw content.

use tracing::debug;

use crate::extraction::awards::MAX_AWARDS;
use crate::extraction::cascade::ExtractOptions;
use crate::extraction::certifications::MAX_CERTIFICATIONS;
use crate::extraction::extract_resume;
use crate::extraction::languages::{mentions_technical_keyword, parse_item};
use crate::extraction::sections::SectionKind;
use crate::extraction::skills::clean_tokens;
use crate::models::profile::{
    ProfileAward, ProfileCertification, ProfileEducation, ProfileExperience, ProfileLanguageItem,
    ProfileProject,
};
use crate::models::{
    Award, CanonicalResumeModel, Certification, ContactInfo, EducationEntry, ExperienceEntry,
    LanguageProficiency, ProjectEntry, StructuredProfile,
};

/// Builds the canonical model from raw content plus an optional profile.
pub fn assemble(
    raw: &str,
    profile: Option<&StructuredProfile>,
    options: ExtractOptions,
) -> CanonicalResumeModel {
    let extracted = extract_resume(raw, options);
    let Some(profile) = profile else {
        return extracted;
    };

    let mut overridden: Vec<SectionKind> = Vec::new();
    let mut prefer = |kind: SectionKind, from_profile: bool| {
        if from_profile {
            overridden.push(kind);
        }
        from_profile
    };

    let summary = if prefer(SectionKind::Summary, profile.summary.is_some()) {
        profile.summary.clone().unwrap_or_default()
    } else {
        extracted.summary
    };

    let technical = clean_tokens(profile.technical_skill_list());
    let soft = clean_tokens(profile.soft_skill_list());
    let (technical_skills, soft_skills) =
        if prefer(SectionKind::Skills, !technical.is_empty() || !soft.is_empty()) {
            (technical, soft)
        } else {
            (extracted.technical_skills, extracted.soft_skills)
        };

    let competencies = clean_tokens(profile.core_competencies.clone());
    let core_competencies = if prefer(SectionKind::CoreCompetencies, !competencies.is_empty()) {
        competencies
    } else {
        extracted.core_competencies
    };

    let experience = pick(
        &mut prefer,
        SectionKind::Experience,
        profile.experience.iter().filter_map(experience_entry).collect(),
        extracted.experience,
    );
    let education = pick(
        &mut prefer,
        SectionKind::Education,
        profile.education.iter().filter_map(education_entry).collect(),
        extracted.education,
    );
    let projects = pick(
        &mut prefer,
        SectionKind::Projects,
        profile.projects.iter().filter_map(project_entry).collect(),
        extracted.projects,
    );
    let certifications = pick(
        &mut prefer,
        SectionKind::Certifications,
        profile
            .certifications
            .iter()
            .filter_map(certification)
            .take(MAX_CERTIFICATIONS)
            .collect(),
        extracted.certifications,
    );
    let awards = pick(
        &mut prefer,
        SectionKind::Awards,
        profile.awards.iter().filter_map(award).take(MAX_AWARDS).collect(),
        extracted.awards,
    );
    let languages = pick(
        &mut prefer,
        SectionKind::Languages,
        profile.languages.iter().filter_map(language).collect(),
        extracted.languages,
    );

    let contact = merge_contact(profile, extracted.contact);

    let placeholder_sections = extracted
        .placeholder_sections
        .into_iter()
        .filter(|kind| !overridden.contains(kind))
        .collect();

    debug!(overridden = ?overridden, "Structured profile merged over extraction");

    CanonicalResumeModel {
        contact,
        summary,
        technical_skills,
        soft_skills,
        core_competencies,
        experience,
        education,
        projects,
        certifications,
        awards,
        languages,
        section_order: extracted.section_order,
        placeholder_sections,
    }
}

fn pick<T>(
    prefer: &mut impl FnMut(SectionKind, bool) -> bool,
    kind: SectionKind,
    from_profile: Vec<T>,
    extracted: Vec<T>,
) -> Vec<T> {
    if prefer(kind, !from_profile.is_empty()) {
        from_profile
    } else {
        extracted
    }
}

/// Contact merges per subfield: a profile value replaces only its own field.
fn merge_contact(profile: &StructuredProfile, extracted: ContactInfo) -> ContactInfo {
    ContactInfo {
        full_name: profile.full_name.clone().unwrap_or(extracted.full_name),
        email: profile.email.clone().or(extracted.email),
        phone: profile.phone.clone().or(extracted.phone),
        location: profile.location.clone().or(extracted.location),
        linkedin: profile.linkedin.clone().or(extracted.linkedin),
        portfolio: profile.portfolio.clone().or(extracted.portfolio),
    }
}

fn non_empty(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Profile entry conversion
// ────────────────────────────────────────────────────────────────────────────

fn experience_entry(item: &ProfileExperience) -> Option<ExperienceEntry> {
    let title = item.title.clone().or_else(|| item.company.clone())?;
    let company = item.company.clone().filter(|company| *company != title);
    Some(ExperienceEntry {
        title,
        company,
        dates: item.dates.clone(),
        location: item.location.clone(),
        responsibilities: non_empty(&item.responsibilities),
        is_fallback: false,
    })
}

fn education_entry(item: &ProfileEducation) -> Option<EducationEntry> {
    let degree = item.degree.clone().or_else(|| item.institution.clone())?;
    let institution = item.institution.clone().filter(|inst| *inst != degree);
    Some(EducationEntry {
        degree,
        institution,
        graduation_date: item.graduation_date.clone(),
        details: item.details.clone(),
        is_fallback: false,
    })
}

fn project_entry(item: &ProfileProject) -> Option<ProjectEntry> {
    Some(ProjectEntry {
        name: item.name.clone()?,
        description: item.description.clone(),
        achievements: non_empty(&item.achievements),
        technologies: clean_tokens(item.technologies.clone()),
        duration: item.duration.clone(),
        is_fallback: false,
    })
}

fn certification(item: &ProfileCertification) -> Option<Certification> {
    Some(Certification {
        name: item.name.clone()?,
        issuer: item.issuer.clone(),
        issue_date: item.issue_date.clone(),
        expiry_date: item.expiry_date.clone(),
        is_fallback: false,
    })
}

fn award(item: &ProfileAward) -> Option<Award> {
    Some(Award {
        title: item.title.clone()?,
        issuer: item.issuer.clone(),
        date: item.date.clone(),
        description: item.description.clone(),
        is_fallback: false,
    })
}

/// Profile languages go through the same technical-keyword screen as extraction.
fn language(item: &ProfileLanguageItem) -> Option<LanguageProficiency> {
    let parsed = match item {
        ProfileLanguageItem::Detailed(detail) => LanguageProficiency {
            name: detail.name.clone()?,
            proficiency: detail.proficiency.clone(),
            is_fallback: false,
        },
        ProfileLanguageItem::Plain(text) => parse_item(text)?,
    };
    if mentions_technical_keyword(&parsed.name) {
        return None;
    }
    Some(parsed)
}
