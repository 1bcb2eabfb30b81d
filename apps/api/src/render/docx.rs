//! WordprocessingML writer for the canonical model.

use std::borrow::Cow;
use std::io::{Cursor, Write};

use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::extraction::sections::SectionKind;
use crate::models::CanonicalResumeModel;
use crate::render::emphasis::{Emphasis, Run};
use crate::render::styles::{
    BULLET_NUM_ID, CONTENT_TYPES, DOCUMENT_RELS, NUMBERING, PACKAGE_RELS, STYLES, STYLE_BODY,
    STYLE_BULLET, STYLE_CONTACT, STYLE_ENTRY_META, STYLE_ENTRY_TITLE, STYLE_NAME, STYLE_SECTION,
};
use crate::render::{RenderError, RenderOptions};

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const META_SEPARATOR: &str = " | ";

/// Drops characters XML 1.0 cannot carry (C0 controls other than tab/newline/CR).
fn xml_safe(text: &str) -> Cow<'_, str> {
    let invalid = |c: char| {
        matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
    };
    if text.chars().any(invalid) {
        Cow::Owned(text.chars().filter(|c| !invalid(*c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

fn join_present<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(META_SEPARATOR)
}

// ────────────────────────────────────────────────────────────────────────────
// Body writer
// ────────────────────────────────────────────────────────────────────────────

struct BodyWriter<'o> {
    xml: Writer<Vec<u8>>,
    options: &'o RenderOptions,
    paragraphs: usize,
}

impl<'o> BodyWriter<'o> {
    fn new(options: &'o RenderOptions) -> Result<Self, RenderError> {
        let mut xml = Writer::new(Vec::new());
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        xml.write_event(Event::Start(
            BytesStart::new("w:document").with_attributes([("xmlns:w", WORDML_NS)]),
        ))?;
        xml.write_event(Event::Start(BytesStart::new("w:body")))?;
        Ok(Self {
            xml,
            options,
            paragraphs: 0,
        })
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), RenderError> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.xml.write_event(Event::Start(element))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<(), RenderError> {
        self.xml.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), RenderError> {
        let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.xml.write_event(Event::Empty(element))?;
        Ok(())
    }

    fn run(&mut self, run: &Run) -> Result<(), RenderError> {
        self.start("w:r", &[])?;
        if run.bold {
            self.start("w:rPr", &[])?;
            self.empty("w:b", &[])?;
            self.end("w:rPr")?;
        }
        self.start("w:t", &[("xml:space", "preserve")])?;
        self.xml
            .write_event(Event::Text(BytesText::new(&xml_safe(&run.text))))?;
        self.end("w:t")?;
        self.end("w:r")
    }

    fn paragraph(&mut self, style: &str, runs: &[Run]) -> Result<(), RenderError> {
        self.start("w:p", &[])?;
        self.start("w:pPr", &[])?;
        self.empty("w:pStyle", &[("w:val", style)])?;
        if style == STYLE_BULLET {
            self.start("w:numPr", &[])?;
            self.empty("w:ilvl", &[("w:val", "0")])?;
            self.empty("w:numId", &[("w:val", BULLET_NUM_ID)])?;
            self.end("w:numPr")?;
        }
        self.end("w:pPr")?;
        for run in runs {
            self.run(run)?;
        }
        self.end("w:p")?;
        self.paragraphs += 1;
        Ok(())
    }

    fn text(&mut self, style: &str, text: &str) -> Result<(), RenderError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        self.paragraph(style, &[Run::plain(text)])
    }

    /// Body text with job-keyword and metric emphasis applied.
    fn emphasized(&mut self, style: &str, text: &str) -> Result<(), RenderError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let runs = self.emphasis().runs(text);
        self.paragraph(style, &runs)
    }

    fn labelled(&mut self, label: &str, items: &[String]) -> Result<(), RenderError> {
        if items.is_empty() {
            return Ok(());
        }
        self.paragraph(
            STYLE_BODY,
            &[
                Run {
                    text: format!("{label}: "),
                    bold: true,
                },
                Run::plain(items.join(", ")),
            ],
        )
    }

    fn bullets(&mut self, items: &[String]) -> Result<(), RenderError> {
        for item in items {
            self.emphasized(STYLE_BULLET, item)?;
        }
        Ok(())
    }

    fn emphasis(&self) -> &Emphasis {
        &self.options.emphasis
    }

    fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        if self.paragraphs == 0 {
            self.empty("w:p", &[])?;
        }
        self.start("w:sectPr", &[])?;
        self.empty("w:pgSz", &[("w:w", "12240"), ("w:h", "15840")])?;
        self.empty(
            "w:pgMar",
            &[
                ("w:top", "1008"),
                ("w:right", "1080"),
                ("w:bottom", "1008"),
                ("w:left", "1080"),
                ("w:header", "720"),
                ("w:footer", "720"),
                ("w:gutter", "0"),
            ],
        )?;
        self.end("w:sectPr")?;
        self.end("w:body")?;
        self.end("w:document")?;
        Ok(self.xml.into_inner())
    }

    // ── Sections ───────────────────────────────────────────────────────────

    fn contact(&mut self, model: &CanonicalResumeModel) -> Result<(), RenderError> {
        let contact = &model.contact;
        self.text(STYLE_NAME, &contact.full_name)?;
        let line = join_present([
            contact.email.as_deref(),
            contact.phone.as_deref(),
            contact.location.as_deref(),
            contact.linkedin.as_deref(),
            contact.portfolio.as_deref(),
        ]);
        self.text(STYLE_CONTACT, &line)
    }

    fn section(&mut self, kind: SectionKind, model: &CanonicalResumeModel) -> Result<(), RenderError> {
        self.text(STYLE_SECTION, kind.display_name())?;
        match kind {
            SectionKind::Summary => self.emphasized(STYLE_BODY, &model.summary),
            SectionKind::Experience => self.experience(model),
            SectionKind::Education => self.education(model),
            SectionKind::Skills => self.skills(model),
            SectionKind::Projects => self.projects(model),
            SectionKind::Certifications => self.certifications(model),
            SectionKind::Awards => self.awards(model),
            SectionKind::Languages => self.languages(model),
            SectionKind::CoreCompetencies => {
                self.text(STYLE_BODY, &model.core_competencies.join(META_SEPARATOR))
            }
        }
    }

    fn experience(&mut self, model: &CanonicalResumeModel) -> Result<(), RenderError> {
        for role in &model.experience {
            self.text(STYLE_ENTRY_TITLE, &role.title)?;
            let meta = join_present([
                role.company.as_deref(),
                role.location.as_deref(),
                role.dates.as_deref(),
            ]);
            self.text(STYLE_ENTRY_META, &meta)?;
            self.bullets(&role.responsibilities)?;
        }
        Ok(())
    }

    fn education(&mut self, model: &CanonicalResumeModel) -> Result<(), RenderError> {
        for entry in &model.education {
            self.text(STYLE_ENTRY_TITLE, &entry.degree)?;
            let meta = join_present([
                entry.institution.as_deref(),
                entry.graduation_date.as_deref(),
            ]);
            self.text(STYLE_ENTRY_META, &meta)?;
            if let Some(details) = &entry.details {
                self.text(STYLE_BODY, details)?;
            }
        }
        Ok(())
    }

    fn skills(&mut self, model: &CanonicalResumeModel) -> Result<(), RenderError> {
        if self.options.two_column_skills && model.technical_skills.len() > 1 {
            self.skills_table(&model.technical_skills)?;
        } else {
            self.labelled("Technical", &model.technical_skills)?;
        }
        self.labelled("Soft Skills", &model.soft_skills)
    }

    /// Borderless two-column table, filled row by row.
    fn skills_table(&mut self, skills: &[String]) -> Result<(), RenderError> {
        self.start("w:tbl", &[])?;
        self.start("w:tblPr", &[])?;
        self.empty("w:tblStyle", &[("w:val", "PlainTable")])?;
        self.empty("w:tblW", &[("w:w", "5000"), ("w:type", "pct")])?;
        self.end("w:tblPr")?;
        self.start("w:tblGrid", &[])?;
        self.empty("w:gridCol", &[("w:w", "5040")])?;
        self.empty("w:gridCol", &[("w:w", "5040")])?;
        self.end("w:tblGrid")?;
        for pair in skills.chunks(2) {
            self.start("w:tr", &[])?;
            for column in 0..2 {
                self.start("w:tc", &[])?;
                self.start("w:tcPr", &[])?;
                self.empty("w:tcW", &[("w:w", "2500"), ("w:type", "pct")])?;
                self.end("w:tcPr")?;
                match pair.get(column) {
                    Some(skill) => self.emphasized(STYLE_BULLET, skill)?,
                    // Every cell needs a paragraph.
                    None => self.empty("w:p", &[])?,
                }
                self.end("w:tc")?;
            }
            self.end("w:tr")?;
        }
        self.end("w:tbl")
    }

    fn projects(&mut self, model: &CanonicalResumeModel) -> Result<(), RenderError> {
        for project in &model.projects {
            self.text(STYLE_ENTRY_TITLE, &project.name)?;
            if let Some(duration) = &project.duration {
                self.text(STYLE_ENTRY_META, duration)?;
            }
            if let Some(description) = &project.description {
                self.emphasized(STYLE_BODY, description)?;
            }
            self.bullets(&project.achievements)?;
            self.labelled("Technologies", &project.technologies)?;
        }
        Ok(())
    }

    fn certifications(&mut self, model: &CanonicalResumeModel) -> Result<(), RenderError> {
        for cert in &model.certifications {
            let dates = match (&cert.issue_date, &cert.expiry_date) {
                (Some(issued), Some(expires)) => Some(format!("{issued} – {expires}")),
                (Some(issued), None) => Some(issued.clone()),
                (None, Some(expires)) => Some(format!("Expires {expires}")),
                (None, None) => None,
            };
            let line = join_present([
                Some(cert.name.as_str()),
                cert.issuer.as_deref(),
                dates.as_deref(),
            ]);
            self.text(STYLE_BULLET, &line)?;
        }
        Ok(())
    }

    fn awards(&mut self, model: &CanonicalResumeModel) -> Result<(), RenderError> {
        for award in &model.awards {
            let mut line = join_present([
                Some(award.title.as_str()),
                award.issuer.as_deref(),
                award.date.as_deref(),
            ]);
            if let Some(description) = &award.description {
                line = format!("{line}: {description}");
            }
            self.emphasized(STYLE_BULLET, &line)?;
        }
        Ok(())
    }

    fn languages(&mut self, model: &CanonicalResumeModel) -> Result<(), RenderError> {
        let items: Vec<String> = model
            .languages
            .iter()
            .map(|lang| match &lang.proficiency {
                Some(level) => format!("{} ({level})", lang.name),
                None => lang.name.clone(),
            })
            .collect();
        self.text(STYLE_BODY, &items.join(", "))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Package
// ────────────────────────────────────────────────────────────────────────────

fn core_properties(model: &CanonicalResumeModel) -> Result<Vec<u8>, RenderError> {
    let title = if model.contact.full_name.trim().is_empty() {
        "Resume".to_string()
    } else {
        format!("{} Resume", model.contact.full_name.trim())
    };
    let created = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    let mut xml = Writer::new(Vec::new());
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    xml.write_event(Event::Start(BytesStart::new("cp:coreProperties").with_attributes([
        (
            "xmlns:cp",
            "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
        ),
        ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
        ("xmlns:dcterms", "http://purl.org/dc/terms/"),
        ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ])))?;
    for (name, value) in [("dc:title", title.as_str()), ("dc:creator", env!("CARGO_PKG_NAME"))] {
        xml.write_event(Event::Start(BytesStart::new(name)))?;
        xml.write_event(Event::Text(BytesText::new(&xml_safe(value))))?;
        xml.write_event(Event::End(BytesEnd::new(name)))?;
    }
    xml.write_event(Event::Start(
        BytesStart::new("dcterms:created").with_attributes([("xsi:type", "dcterms:W3CDTF")]),
    ))?;
    xml.write_event(Event::Text(BytesText::new(&created)))?;
    xml.write_event(Event::End(BytesEnd::new("dcterms:created")))?;
    xml.write_event(Event::End(BytesEnd::new("cp:coreProperties")))?;
    Ok(xml.into_inner())
}

fn document_body(model: &CanonicalResumeModel, options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
    let mut body = BodyWriter::new(options)?;
    body.contact(model)?;
    for kind in model.render_order() {
        body.section(kind, model)?;
    }
    body.finish()
}

/// Renders the model as a complete DOCX package. Sections with no content are
/// omitted; section order follows [`CanonicalResumeModel::render_order`].
pub fn render_docx(
    model: &CanonicalResumeModel,
    options: &RenderOptions,
) -> Result<Vec<u8>, RenderError> {
    let document = document_body(model, options)?;
    let core = core_properties(model)?;

    let parts: [(&str, &[u8]); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes()),
        ("word/document.xml", document.as_slice()),
        ("word/styles.xml", STYLES.as_bytes()),
        ("word/numbering.xml", NUMBERING.as_bytes()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes()),
        ("docProps/core.xml", core.as_slice()),
    ];

    let file_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in parts {
        zip.start_file(name, file_options)?;
        zip.write_all(bytes)?;
    }
    let buffer = zip.finish()?.into_inner();

    debug!(
        bytes = buffer.len(),
        sections = model.render_order().len(),
        "DOCX rendered"
    );
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use zip::ZipArchive;

    use crate::extraction::cascade::ExtractOptions;
    use crate::extraction::extract_resume;
    use crate::models::{ContactInfo, ExperienceEntry};

    fn part(buffer: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(buffer)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut xml = String::new();
        file.read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_end_to_end_strings_reach_document() {
        let html = "<h1>Jane Doe</h1><p>jane@example.com</p>\
            <h2>EXPERIENCE</h2><div><h3>Senior Engineer</h3><span>Acme Corp</span><span>2020-2023</span><li>Shipped X</li></div>\
            <h2>EDUCATION</h2><div><h3>B.S. Computer Science</h3><span>State University</span><span>2019</span></div>";
        let model = extract_resume(html, ExtractOptions::default());
        let buffer = render_docx(&model, &RenderOptions::default()).unwrap();
        let xml = part(&buffer, "word/document.xml");
        for literal in [
            "Jane Doe",
            "Senior Engineer",
            "Acme Corp",
            "2020-2023",
            "Shipped X",
            "B.S. Computer Science",
            "State University",
        ] {
            assert!(xml.contains(literal), "missing {literal}");
        }
        assert!(xml.find("Senior Engineer") < xml.find("B.S. Computer Science"));
    }

    #[test]
    fn test_minimal_model_is_a_valid_package() {
        let model = CanonicalResumeModel {
            contact: ContactInfo {
                full_name: "Jane Doe".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let buffer = render_docx(&model, &RenderOptions::default()).unwrap();
        let archive = ZipArchive::new(Cursor::new(buffer.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for required in ["[Content_Types].xml", "_rels/.rels", "word/document.xml", "word/styles.xml"] {
            assert!(names.contains(&required), "missing part {required}");
        }
        let xml = part(&buffer, "word/document.xml");
        assert!(xml.contains("Jane Doe"));
        assert!(!xml.contains("Experience"));
        assert!(part(&buffer, "docProps/core.xml").contains("Jane Doe Resume"));
    }

    #[test]
    fn test_empty_model_still_renders() {
        let buffer = render_docx(&CanonicalResumeModel::default(), &RenderOptions::default()).unwrap();
        assert!(part(&buffer, "word/document.xml").contains("<w:body><w:p/>"));
    }

    #[test]
    fn test_text_is_escaped_and_control_chars_stripped() {
        let model = CanonicalResumeModel {
            experience: vec![ExperienceEntry {
                title: "R&D Lead <Platform>\u{1}".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let buffer = render_docx(&model, &RenderOptions::default()).unwrap();
        let xml = part(&buffer, "word/document.xml");
        assert!(xml.contains("R&amp;D Lead &lt;Platform&gt;</w:t>"));
    }

    #[test]
    fn test_two_column_skills_and_emphasis() {
        let model = CanonicalResumeModel {
            technical_skills: vec!["Rust".to_string(), "Go".to_string(), "SQL".to_string()],
            experience: vec![ExperienceEntry {
                title: "Engineer".to_string(),
                responsibilities: vec!["Cut build times by 40% with Rust".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        };
        let options = RenderOptions {
            two_column_skills: true,
            emphasis: Emphasis::new(&["rust".to_string()], true),
        };
        let xml = part(&render_docx(&model, &options).unwrap(), "word/document.xml");
        assert!(xml.contains("<w:tbl>"));
        assert_eq!(xml.matches("<w:tr>").count(), 2);
        assert!(xml.contains("<w:b/></w:rPr><w:t xml:space=\"preserve\">40%</w:t>"));
    }
}
