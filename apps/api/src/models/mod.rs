pub mod profile;
pub mod resume;

pub use profile::StructuredProfile;
pub use resume::{
    Award, CanonicalResumeModel, Certification, ContactInfo, EducationEntry, ExperienceEntry,
    LanguageProficiency, ProjectEntry,
};
