//! Experience extractor.
//!
//! Cascade: structured markup blocks → bulleted list → plain line scan.
//! Entries keep source order; a title without a company is kept.

use crate::extraction::cascade::{Attempt, SectionExtractor, Strategy};
use crate::extraction::markup::{self, FieldRole, MarkupNode};
use crate::extraction::normalize::content_lines;
use crate::extraction::patterns::{
    find_any_date, find_date_range, find_single_date, is_bullet, looks_like_location, looks_like_sentence,
    looks_like_title, split_meta_segments, strip_bullet, strip_date,
};
use crate::extraction::sections::{SectionContent, SectionKind};
use crate::models::ExperienceEntry;

pub struct ExperienceExtractor;

impl SectionExtractor for ExperienceExtractor {
    type Output = Vec<ExperienceEntry>;

    fn kind(&self) -> SectionKind {
        SectionKind::Experience
    }

    fn strategies(&self) -> Vec<Strategy<Self::Output>> {
        vec![
            Strategy::new("structured_blocks", structured_blocks),
            Strategy::new("list_items", list_items),
            Strategy::new("line_scan", line_scan),
        ]
    }

    fn placeholders(&self) -> Self::Output {
        vec![ExperienceEntry {
            title: "Software Engineer".to_string(),
            company: Some("Example Company".to_string()),
            dates: Some("2020 - Present".to_string()),
            location: None,
            responsibilities: vec![
                "Designed and delivered features across the product stack".to_string(),
                "Collaborated with cross-functional teams to ship releases".to_string(),
            ],
            is_fallback: true,
        }]
    }
}

/// Entry under construction. At most one exists at a time.
#[derive(Default)]
struct Draft {
    entry: Option<ExperienceEntry>,
    done: Vec<ExperienceEntry>,
}

impl Draft {
    fn start(&mut self, title: &str) {
        self.flush();
        let (title, company) = split_title_company(title);
        self.entry = Some(ExperienceEntry {
            title,
            company,
            ..Default::default()
        });
    }

    fn flush(&mut self) {
        if let Some(entry) = self.entry.take() {
            if !entry.title.is_empty() {
                self.done.push(entry);
            }
        }
    }

    fn current(&mut self) -> Option<&mut ExperienceEntry> {
        self.entry.as_mut()
    }

    /// True while the open entry has a title and nothing else.
    fn is_bare(&self) -> bool {
        self.entry.as_ref().is_some_and(|e| {
            e.company.is_none() && e.dates.is_none() && e.responsibilities.is_empty()
        })
    }

    fn finish(mut self) -> Vec<ExperienceEntry> {
        self.flush();
        self.done
    }
}

/// "Engineer at Acme", "Engineer | Acme", "Engineer, Acme" → (title, company).
fn split_title_company(text: &str) -> (String, Option<String>) {
    let text = text.trim();
    for separator in [" at ", " @ ", " | ", " — ", " – ", " - ", ", "] {
        if let Some((title, company)) = text.split_once(separator) {
            let company = strip_date(company);
            if !title.trim().is_empty() && !company.is_empty() {
                return (title.trim().to_string(), Some(company));
            }
        }
    }
    (strip_date(text), None)
}

/// Company / location / dates from a meta line such as
/// "Acme Corp | San Francisco, CA | Jan 2020 – Present".
fn apply_meta_line(entry: &mut ExperienceEntry, line: &str) {
    if entry.dates.is_none() {
        entry.dates = find_any_date(line).map(str::to_string);
    }
    for segment in split_meta_segments(&strip_date(line)) {
        if entry.location.is_none() && (looks_like_location(&segment) || is_remote(&segment)) {
            entry.location = Some(segment);
        } else if entry.company.is_none() {
            entry.company = Some(segment);
        } else if entry.location.is_none() {
            entry.location = Some(segment);
        }
    }
}

fn is_remote(text: &str) -> bool {
    matches!(text.trim().to_lowercase().as_str(), "remote" | "hybrid" | "on-site" | "onsite")
}

fn is_meta_line(line: &str) -> bool {
    find_date_range(line).is_some() || (find_single_date(line).is_some() && line.len() <= 60)
}

fn structured_blocks(content: &SectionContent) -> Attempt<Vec<ExperienceEntry>> {
    let Some(html) = content.html.as_deref() else {
        return Attempt::NotFound;
    };
    let nodes = markup::walk(html);
    if !markup::has_structure(&nodes) {
        return Attempt::NotFound;
    }

    let mut draft = Draft::default();
    for node in nodes {
        match node {
            MarkupNode::Boundary => draft.flush(),
            MarkupNode::Title(text) => {
                if draft.is_bare() {
                    if let Some(entry) = draft.current() {
                        entry.company = Some(strip_date(&text)).filter(|c| !c.is_empty());
                        if let Some(dates) = find_date_range(&text) {
                            entry.dates = Some(dates.to_string());
                        }
                        continue;
                    }
                }
                draft.start(&text);
            }
            MarkupNode::Field { role, text } => {
                let Some(entry) = draft.current() else {
                    continue;
                };
                match role {
                    FieldRole::Date => {
                        entry.dates.get_or_insert(text);
                    }
                    FieldRole::Company | FieldRole::Issuer => {
                        entry.company.get_or_insert(text);
                    }
                    FieldRole::Location => {
                        entry.location.get_or_insert(text);
                    }
                    FieldRole::Description | FieldRole::Tech => entry.responsibilities.push(text),
                    FieldRole::Title | FieldRole::Unknown => apply_meta_line(entry, &text),
                }
            }
            MarkupNode::Bullet(text) => {
                if let Some(entry) = draft.current() {
                    entry.responsibilities.push(text);
                }
            }
            MarkupNode::Text(text) => {
                let Some(entry) = draft.current() else {
                    continue;
                };
                if entry.responsibilities.is_empty()
                    && (is_meta_line(&text) || (entry.company.is_none() && !looks_like_sentence(&text)))
                {
                    apply_meta_line(entry, &text);
                } else {
                    entry.responsibilities.push(text);
                }
            }
        }
    }

    Attempt::from_value(draft.finish())
}

fn list_items(content: &SectionContent) -> Attempt<Vec<ExperienceEntry>> {
    let lines = content_lines(&content.text);
    if !lines.iter().any(|line| is_bullet(line)) {
        return Attempt::NotFound;
    }
    Attempt::from_value(scan_lines(&lines, true))
}

fn line_scan(content: &SectionContent) -> Attempt<Vec<ExperienceEntry>> {
    let lines = content_lines(&content.text);
    Attempt::from_value(scan_lines(&lines, false))
}

/// Line classifier shared by the list and plain strategies. With `bulleted`
/// set, only marker lines are responsibilities; otherwise sentence-shaped lines are.
fn scan_lines(lines: &[&str], bulleted: bool) -> Vec<ExperienceEntry> {
    let mut draft = Draft::default();

    for (i, line) in lines.iter().enumerate() {
        if is_bullet(line) {
            if let Some(entry) = draft.current() {
                entry.responsibilities.push(strip_bullet(line).to_string());
            }
            continue;
        }

        let open_has_body = draft
            .entry
            .as_ref()
            .is_some_and(|e| e.dates.is_some() || !e.responsibilities.is_empty());

        if is_meta_line(line) && !looks_like_sentence(line) {
            let open_undated = draft.entry.as_ref().is_some_and(|e| e.dates.is_none());
            if open_undated {
                if let Some(entry) = draft.current() {
                    apply_meta_line(entry, line);
                }
            } else {
                // A dated line with no open entry: "Engineer, Acme — 2020-2022".
                let header = strip_date(line);
                if !header.is_empty() {
                    draft.start(&header);
                    if let Some(entry) = draft.current() {
                        entry.dates = find_any_date(line).map(str::to_string);
                    }
                }
            }
            continue;
        }

        if looks_like_title(line) && !(bulleted && draft.entry.is_some() && !open_has_body) {
            let next_is_meta = lines.get(i + 1).is_some_and(|next| is_meta_line(next));
            if draft.is_bare() && !next_is_meta {
                // Second header line of the same entry: the company.
                if let Some(entry) = draft.current() {
                    apply_meta_line(entry, line);
                }
            } else {
                draft.start(line);
            }
            continue;
        }

        match draft.current() {
            Some(entry) if !bulleted || looks_like_sentence(line) => {
                entry.responsibilities.push(line.to_string());
            }
            Some(entry) if entry.company.is_none() => apply_meta_line(entry, line),
            Some(entry) => entry.responsibilities.push(line.to_string()),
            None => {}
        }
    }

    draft.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::cascade::{extract, ExtractOptions, Provenance};

    fn run(content: SectionContent) -> Vec<ExperienceEntry> {
        extract(&ExperienceExtractor, Some(&content), ExtractOptions::default()).value
    }

    #[test]
    fn test_structured_block_entry() {
        let html = "<div><h3>Senior Engineer</h3><span>Acme Corp</span><span>2020-2023</span><li>Shipped X</li></div>";
        let entries = run(SectionContent::from_html(SectionKind::Experience, html));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Senior Engineer");
        assert_eq!(entries[0].company.as_deref(), Some("Acme Corp"));
        assert_eq!(entries[0].dates.as_deref(), Some("2020-2023"));
        assert_eq!(entries[0].responsibilities, vec!["Shipped X"]);
    }

    #[test]
    fn test_structured_blocks_preserve_order() {
        let html = "<div><h3>Staff Engineer</h3><p>Globex | 2021 - Present</p><ul><li>Led platform</li></ul></div>\
                    <div><h3>Engineer</h3><p>Initech | 2018 - 2021</p><ul><li>Built APIs</li></ul></div>";
        let entries = run(SectionContent::from_html(SectionKind::Experience, html));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Staff Engineer");
        assert_eq!(entries[0].company.as_deref(), Some("Globex"));
        assert_eq!(entries[0].dates.as_deref(), Some("2021 - Present"));
        assert_eq!(entries[1].title, "Engineer");
        assert_eq!(entries[1].company.as_deref(), Some("Initech"));
        assert_eq!(entries[1].responsibilities, vec!["Built APIs"]);
    }

    #[test]
    fn test_title_without_company_is_kept() {
        let html = "<div><h3>Freelance Consultant</h3><ul><li>Advised startups</li></ul></div>";
        let entries = run(SectionContent::from_html(SectionKind::Experience, html));
        assert_eq!(entries.len(), 1);
        assert!(entries[0].company.is_none());
    }

    #[test]
    fn test_bulleted_text() {
        let text = "Senior Engineer\nAcme Corp | San Francisco, CA | Jan 2020 – Present\n• Cut p99 latency by 40%\n• Mentored 4 engineers\nEngineer\nInitech | 2017 - 2019\n• Built billing";
        let content = SectionContent::from_text(SectionKind::Experience, text);
        let out = extract(&ExperienceExtractor, Some(&content), ExtractOptions::default());
        assert_eq!(out.provenance, Provenance::Strategy("list_items"));
        let entries = out.value;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Senior Engineer");
        assert_eq!(entries[0].company.as_deref(), Some("Acme Corp"));
        assert_eq!(entries[0].location.as_deref(), Some("San Francisco, CA"));
        assert_eq!(entries[0].dates.as_deref(), Some("Jan 2020 – Present"));
        assert_eq!(entries[0].responsibilities.len(), 2);
        assert_eq!(entries[1].company.as_deref(), Some("Initech"));
        assert_eq!(entries[1].responsibilities, vec!["Built billing"]);
    }

    #[test]
    fn test_plain_line_scan() {
        let text = "Data Analyst at Contoso\n2019 - 2021\nBuilt weekly dashboards used by the finance and operations leadership teams.";
        let content = SectionContent::from_text(SectionKind::Experience, text);
        let out = extract(&ExperienceExtractor, Some(&content), ExtractOptions::default());
        assert_eq!(out.provenance, Provenance::Strategy("line_scan"));
        assert_eq!(out.value.len(), 1);
        assert_eq!(out.value[0].title, "Data Analyst");
        assert_eq!(out.value[0].company.as_deref(), Some("Contoso"));
        assert_eq!(out.value[0].dates.as_deref(), Some("2019 - 2021"));
        assert_eq!(out.value[0].responsibilities.len(), 1);
    }

    #[test]
    fn test_empty_section_yields_nothing() {
        assert!(run(SectionContent::from_text(SectionKind::Experience, "")).is_empty());
    }

    #[test]
    fn test_split_title_company() {
        assert_eq!(
            split_title_company("Engineer at Acme"),
            ("Engineer".to_string(), Some("Acme".to_string()))
        );
        assert_eq!(split_title_company("Engineer"), ("Engineer".to_string(), None));
    }
}
