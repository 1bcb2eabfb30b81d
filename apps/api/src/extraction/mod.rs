//! Resume extraction pipeline.
//!
//! raw HTML/text → [`normalize`] → [`sections::locate`] → one
//! [`cascade::SectionExtractor`] per kind → [`CanonicalResumeModel`].
//!
//! Everything here is synchronous and pure: the same input always yields the
//! same model, and malformed input degrades to empty sections rather than
//! failing.

pub mod awards;
pub mod cascade;
pub mod certifications;
pub mod contact;
pub mod education;
pub mod experience;
pub mod languages;
pub mod markup;
pub mod normalize;
pub mod patterns;
pub mod projects;
pub mod sections;
pub mod skills;
pub mod summary;

use tracing::debug;

use crate::models::CanonicalResumeModel;
use cascade::{extract, ExtractOptions, SectionExtractor};
use sections::{LocatedDocument, SectionKind};

/// Runs one extractor against its located section, recording placeholder use.
fn run<E: SectionExtractor>(
    extractor: &E,
    doc: &LocatedDocument,
    options: ExtractOptions,
    placeholders: &mut Vec<SectionKind>,
) -> E::Output {
    let extraction = extract(extractor, doc.section(extractor.kind()), options);
    if extraction.is_fallback() {
        placeholders.push(extractor.kind());
    }
    extraction.value
}

/// Extracts the canonical model from raw resume content.
pub fn extract_resume(raw: &str, options: ExtractOptions) -> CanonicalResumeModel {
    let doc = sections::locate(raw);
    let mut placeholders = Vec::new();

    let summary = run(&summary::SummaryExtractor, &doc, options, &mut placeholders);
    let skills = run(&skills::SkillsExtractor, &doc, options, &mut placeholders);
    let core_competencies = run(&skills::CompetenciesExtractor, &doc, options, &mut placeholders);
    let experience = run(&experience::ExperienceExtractor, &doc, options, &mut placeholders);
    let education = run(&education::EducationExtractor, &doc, options, &mut placeholders);
    let projects = run(&projects::ProjectsExtractor, &doc, options, &mut placeholders);
    let certifications = run(
        &certifications::CertificationsExtractor,
        &doc,
        options,
        &mut placeholders,
    );
    let awards = run(&awards::AwardsExtractor, &doc, options, &mut placeholders);
    let languages = run(&languages::LanguagesExtractor, &doc, options, &mut placeholders);

    let model = CanonicalResumeModel {
        contact: contact::extract_contact(&doc),
        summary,
        technical_skills: skills.technical,
        soft_skills: skills.soft,
        core_competencies,
        experience,
        education,
        projects,
        certifications,
        awards,
        languages,
        section_order: doc.order(),
        placeholder_sections: placeholders,
    };

    debug!(
        sections = ?model.section_order,
        experience = model.experience.len(),
        education = model.education.len(),
        placeholders = ?model.placeholder_sections,
        "Resume content extracted"
    );
    model
}
