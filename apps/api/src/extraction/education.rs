//! Education extractor.
//!
//! A degree match always starts a new entry and flushes the one under
//! construction; an institution match fills the open entry's institution;
//! anything else lands in its details.

use crate::extraction::cascade::{Attempt, SectionExtractor, Strategy};
use crate::extraction::markup::{self, FieldRole, MarkupNode};
use crate::extraction::normalize::content_lines;
use crate::extraction::patterns::{
    find_any_date, has_degree, has_institution, is_bullet, split_meta_segments, strip_bullet,
    strip_date,
};
use crate::extraction::sections::{SectionContent, SectionKind};
use crate::models::EducationEntry;

pub struct EducationExtractor;

impl SectionExtractor for EducationExtractor {
    type Output = Vec<EducationEntry>;

    fn kind(&self) -> SectionKind {
        SectionKind::Education
    }

    fn strategies(&self) -> Vec<Strategy<Self::Output>> {
        vec![
            Strategy::new("structured_blocks", structured_blocks),
            Strategy::new("list_items", list_items),
            Strategy::new("line_scan", line_scan),
        ]
    }

    fn placeholders(&self) -> Self::Output {
        vec![EducationEntry {
            degree: "Bachelor of Science in Computer Science".to_string(),
            institution: Some("Example University".to_string()),
            graduation_date: Some("2018".to_string()),
            details: None,
            is_fallback: true,
        }]
    }
}

#[derive(Default)]
struct Builder {
    current: Option<EducationEntry>,
    done: Vec<EducationEntry>,
}

impl Builder {
    fn flush(&mut self) {
        if let Some(entry) = self.current.take() {
            if !entry.degree.is_empty() || entry.institution.is_some() {
                self.done.push(entry);
            }
        }
    }

    /// Starts a new entry from a degree line such as
    /// "B.S. Computer Science, Stanford University, 2019".
    fn start_degree(&mut self, line: &str) {
        self.flush();
        let mut entry = EducationEntry {
            graduation_date: find_any_date(line).map(str::to_string),
            ..Default::default()
        };
        let segments = degree_segments(&strip_date(line));
        for segment in segments {
            if entry.degree.is_empty() && has_degree(&segment) {
                entry.degree = segment;
            } else if entry.institution.is_none() && has_institution(&segment) {
                entry.institution = Some(segment);
            } else if entry.degree.is_empty() {
                entry.degree = segment;
            } else {
                append_detail(&mut entry, &segment);
            }
        }
        self.current = Some(entry);
    }

    fn institution(&mut self, line: &str) {
        let open_has_institution = self
            .current
            .as_ref()
            .is_some_and(|entry| entry.institution.is_some());
        if self.current.is_none() || open_has_institution {
            // Institution-first layouts: the school opens the entry.
            self.flush();
            self.current = Some(EducationEntry::default());
        }
        if let Some(entry) = self.current.as_mut() {
            entry.institution = Some(strip_date(line)).filter(|s| !s.is_empty());
            if entry.graduation_date.is_none() {
                entry.graduation_date = find_any_date(line).map(str::to_string);
            }
        }
    }

    fn other(&mut self, line: &str) {
        let Some(entry) = self.current.as_mut() else {
            return;
        };
        let date = find_any_date(line);
        if entry.graduation_date.is_none() && date.is_some() && strip_date(line).is_empty() {
            entry.graduation_date = date.map(str::to_string);
            return;
        }
        if entry.degree.is_empty() && entry.institution.is_some() {
            entry.degree = strip_date(line);
            if entry.graduation_date.is_none() {
                entry.graduation_date = date.map(str::to_string);
            }
            return;
        }
        append_detail(entry, line);
    }

    fn line(&mut self, line: &str) {
        let line = strip_bullet(line);
        if line.is_empty() {
            return;
        }
        if has_degree(line) {
            self.start_degree(line);
        } else if has_institution(line) {
            self.institution(line);
        } else {
            self.other(line);
        }
    }

    fn finish(mut self) -> Vec<EducationEntry> {
        self.flush();
        self.done
    }
}

/// Splits a degree line on meta separators and top-level commas, keeping
/// "Bachelor of Science in X" intact.
fn degree_segments(line: &str) -> Vec<String> {
    split_meta_segments(line)
        .into_iter()
        .flat_map(|segment| {
            let parts: Vec<String> = segment
                .split(", ")
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect();
            // Only split on commas when a part names the school.
            if parts.len() > 1 && parts.iter().skip(1).any(|part| has_institution(part)) {
                parts
            } else {
                vec![segment]
            }
        })
        .collect()
}

fn append_detail(entry: &mut EducationEntry, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    match entry.details.as_mut() {
        Some(details) => {
            details.push_str("; ");
            details.push_str(text);
        }
        None => entry.details = Some(text.to_string()),
    }
}

fn structured_blocks(content: &SectionContent) -> Attempt<Vec<EducationEntry>> {
    let Some(html) = content.html.as_deref() else {
        return Attempt::NotFound;
    };
    let nodes = markup::walk(html);
    if !markup::has_structure(&nodes) {
        return Attempt::NotFound;
    }

    let mut builder = Builder::default();
    for node in nodes {
        match node {
            MarkupNode::Boundary => builder.flush(),
            MarkupNode::Title(text) => {
                if has_degree(&text) || builder.current.is_none() {
                    builder.start_degree(&text);
                } else {
                    builder.line(&text);
                }
            }
            MarkupNode::Field { role, text } => {
                let slot = match (role, builder.current.as_mut()) {
                    (FieldRole::Date, Some(entry)) => Some(&mut entry.graduation_date),
                    (FieldRole::Company | FieldRole::Issuer, Some(entry)) => {
                        Some(&mut entry.institution)
                    }
                    _ => None,
                };
                match slot {
                    Some(field) => {
                        field.get_or_insert(text);
                    }
                    None => builder.line(&text),
                }
            }
            MarkupNode::Bullet(text) | MarkupNode::Text(text) => builder.line(&text),
        }
    }

    Attempt::from_value(builder.finish())
}

fn list_items(content: &SectionContent) -> Attempt<Vec<EducationEntry>> {
    let lines = content_lines(&content.text);
    if !lines.iter().any(|line| is_bullet(line)) {
        return Attempt::NotFound;
    }
    // Each marker line is one field; degree lines open entries.
    if !lines
        .iter()
        .any(|line| is_bullet(line) && (has_degree(line) || has_institution(line)))
    {
        return Attempt::NotFound;
    }
    line_scan(content)
}

fn line_scan(content: &SectionContent) -> Attempt<Vec<EducationEntry>> {
    let mut builder = Builder::default();
    for line in content_lines(&content.text) {
        builder.line(line);
    }
    Attempt::from_value(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::cascade::{extract, ExtractOptions};

    fn run(content: SectionContent) -> Vec<EducationEntry> {
        extract(&EducationExtractor, Some(&content), ExtractOptions::default()).value
    }

    #[test]
    fn test_degree_line_with_institution_and_year() {
        let entries = run(SectionContent::from_text(
            SectionKind::Education,
            "B.S. Computer Science, Stanford University, 2019",
        ));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].degree, "B.S. Computer Science");
        assert_eq!(entries[0].institution.as_deref(), Some("Stanford University"));
        assert_eq!(entries[0].graduation_date.as_deref(), Some("2019"));
    }

    #[test]
    fn test_new_degree_flushes_previous_entry() {
        let text = "Master of Science in Data Science\nMIT\n2021\nThesis on streaming joins\nBachelor of Arts in Mathematics\nBoston College\n2018";
        let entries = run(SectionContent::from_text(SectionKind::Education, text));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].degree, "Master of Science in Data Science");
        assert_eq!(entries[0].institution.as_deref(), Some("MIT"));
        assert_eq!(entries[0].graduation_date.as_deref(), Some("2021"));
        assert_eq!(entries[0].details.as_deref(), Some("Thesis on streaming joins"));
        assert_eq!(entries[1].degree, "Bachelor of Arts in Mathematics");
        assert_eq!(entries[1].institution.as_deref(), Some("Boston College"));
    }

    #[test]
    fn test_institution_first_layout() {
        let text = "University of Toronto, 2016\nBachelor of Commerce";
        let entries = run(SectionContent::from_text(SectionKind::Education, text));
        // The degree line opens a fresh entry; the school-only entry is kept.
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].institution.as_deref(), Some("University of Toronto"));
        assert_eq!(entries[1].degree, "Bachelor of Commerce");
    }

    #[test]
    fn test_structured_markup_entry() {
        let html = "<div><h3>BSc Computer Science</h3><span>University of Leeds</span><span>2015 - 2019</span></div>";
        let entries = run(SectionContent::from_html(SectionKind::Education, html));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].degree, "BSc Computer Science");
        assert_eq!(entries[0].institution.as_deref(), Some("University of Leeds"));
        assert_eq!(entries[0].graduation_date.as_deref(), Some("2015 - 2019"));
    }

    #[test]
    fn test_unrecognised_lines_produce_nothing() {
        assert!(run(SectionContent::from_text(SectionKind::Education, "lots of reading")).is_empty());
    }
}
