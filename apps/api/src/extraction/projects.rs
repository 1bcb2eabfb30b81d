//! Projects extractor.

use crate::extraction::cascade::{Attempt, SectionExtractor, Strategy};
use crate::extraction::markup::{self, FieldRole, MarkupNode};
use crate::extraction::normalize::content_lines;
use crate::extraction::patterns::{
    find_any_date, is_bullet, is_tech_label, looks_like_sentence, looks_like_title, split_label,
    split_list_items, split_meta_segments, strip_bullet, strip_date,
};
use crate::extraction::sections::{SectionContent, SectionKind};
use crate::models::ProjectEntry;

pub struct ProjectsExtractor;

impl SectionExtractor for ProjectsExtractor {
    type Output = Vec<ProjectEntry>;

    fn kind(&self) -> SectionKind {
        SectionKind::Projects
    }

    fn strategies(&self) -> Vec<Strategy<Self::Output>> {
        vec![
            Strategy::new("structured_blocks", structured_blocks),
            Strategy::new("list_items", list_items),
            Strategy::new("line_scan", line_scan),
        ]
    }

    fn placeholders(&self) -> Self::Output {
        vec![ProjectEntry {
            name: "Sample Project".to_string(),
            description: Some("Short description of a representative project".to_string()),
            achievements: vec!["Delivered the project end to end".to_string()],
            technologies: Vec::new(),
            duration: None,
            is_fallback: true,
        }]
    }
}

/// Technology tokens, split on commas and semicolons.
pub fn split_technologies(text: &str) -> Vec<String> {
    split_list_items(text)
}

fn tech_line(line: &str) -> Option<&str> {
    match split_label(line) {
        (Some(label), rest) if is_tech_label(label) => Some(rest),
        _ => None,
    }
}

#[derive(Default)]
struct Builder {
    current: Option<ProjectEntry>,
    done: Vec<ProjectEntry>,
}

impl Builder {
    fn flush(&mut self) {
        if let Some(project) = self.current.take() {
            if !project.name.is_empty() {
                self.done.push(project);
            }
        }
    }

    /// "Atlas | Rust, Tantivy | 2022" → name, technologies, duration.
    fn start(&mut self, header: &str) {
        self.flush();
        let mut project = ProjectEntry {
            duration: find_any_date(header).map(str::to_string),
            ..Default::default()
        };
        let mut segments = split_meta_segments(&strip_date(header)).into_iter();
        project.name = segments.next().unwrap_or_default();
        for segment in segments {
            if let Some(rest) = tech_line(&segment) {
                project.technologies.extend(split_technologies(rest));
            } else if segment.contains(',') {
                project.technologies.extend(split_technologies(&segment));
            } else if project.description.is_none() {
                project.description = Some(segment);
            }
        }
        self.current = Some(project);
    }

    fn has_body(&self) -> bool {
        self.current.as_ref().is_some_and(|p| {
            p.description.is_some() || !p.achievements.is_empty() || !p.technologies.is_empty()
        })
    }

    /// A body line of the open project.
    fn body(&mut self, line: &str, bulleted: bool) {
        let Some(project) = self.current.as_mut() else {
            return;
        };
        if let Some(rest) = tech_line(line) {
            project.technologies.extend(split_technologies(rest));
            return;
        }
        if project.duration.is_none() {
            if let Some(date) = find_any_date(line) {
                if strip_date(line).is_empty() {
                    project.duration = Some(date.to_string());
                    return;
                }
            }
        }
        if !bulleted && project.description.is_none() {
            project.description = Some(line.to_string());
        } else {
            project.achievements.push(line.to_string());
        }
    }

    fn finish(mut self) -> Vec<ProjectEntry> {
        self.flush();
        self.done
    }
}

fn structured_blocks(content: &SectionContent) -> Attempt<Vec<ProjectEntry>> {
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
            MarkupNode::Title(text) => builder.start(&text),
            MarkupNode::Field { role, text } => {
                let Some(project) = builder.current.as_mut() else {
                    continue;
                };
                match role {
                    FieldRole::Date => {
                        project.duration.get_or_insert(text);
                    }
                    FieldRole::Tech => {
                        let tokens = tech_line(&text).unwrap_or(text.as_str());
                        project.technologies.extend(split_technologies(tokens));
                    }
                    FieldRole::Description => {
                        project.description.get_or_insert(text);
                    }
                    _ => builder.body(&text, false),
                }
            }
            MarkupNode::Bullet(text) => builder.body(&text, true),
            MarkupNode::Text(text) => builder.body(&text, false),
        }
    }

    Attempt::from_value(builder.finish())
}

fn list_items(content: &SectionContent) -> Attempt<Vec<ProjectEntry>> {
    let lines = content_lines(&content.text);
    if !lines.iter().any(|line| is_bullet(line)) {
        return Attempt::NotFound;
    }

    let mut builder = Builder::default();
    for line in lines {
        if is_bullet(line) {
            builder.body(strip_bullet(line), true);
        } else if builder.current.is_none() || (builder.has_body() && looks_like_title(line)) {
            builder.start(line);
        } else {
            builder.body(line, false);
        }
    }
    Attempt::from_value(builder.finish())
}

fn line_scan(content: &SectionContent) -> Attempt<Vec<ProjectEntry>> {
    let mut builder = Builder::default();
    for line in content_lines(&content.text) {
        let opens = tech_line(line).is_none()
            && !looks_like_sentence(line)
            && (looks_like_title(line) || (find_any_date(line).is_some() && line.len() <= 80));
        if builder.current.is_none() || (opens && builder.has_body()) {
            builder.start(line);
        } else {
            builder.body(line, false);
        }
    }
    Attempt::from_value(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::cascade::{extract, ExtractOptions};

    fn run(content: SectionContent) -> Vec<ProjectEntry> {
        extract(&ProjectsExtractor, Some(&content), ExtractOptions::default()).value
    }

    #[test]
    fn test_technologies_split_on_comma_and_semicolon() {
        assert_eq!(
            split_technologies("Rust, Axum; PostgreSQL"),
            vec!["Rust", "Axum", "PostgreSQL"]
        );
    }

    #[test]
    fn test_bulleted_projects() {
        let text = "Atlas Search | 2022\nFull-text search service for internal docs\n• Indexed 2M documents\n• Tech Stack: Rust, Tantivy\nLedger\nDouble-entry bookkeeping library\n• Reached 1k GitHub stars";
        let projects = run(SectionContent::from_text(SectionKind::Projects, text));
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "Atlas Search");
        assert_eq!(projects[0].duration.as_deref(), Some("2022"));
        assert_eq!(
            projects[0].description.as_deref(),
            Some("Full-text search service for internal docs")
        );
        assert_eq!(projects[0].achievements, vec!["Indexed 2M documents"]);
        assert_eq!(projects[0].technologies, vec!["Rust", "Tantivy"]);
        assert_eq!(projects[1].name, "Ledger");
        assert_eq!(projects[1].achievements.len(), 1);
    }

    #[test]
    fn test_structured_project_block() {
        let html = r#"<div><h3>Ledgerline</h3><p class="description">Resume tailoring engine</p><p class="tech">Rust, Axum</p><ul><li>Cut generation time by 60%</li></ul></div>"#;
        let projects = run(SectionContent::from_html(SectionKind::Projects, html));
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Ledgerline");
        assert_eq!(projects[0].description.as_deref(), Some("Resume tailoring engine"));
        assert_eq!(projects[0].technologies, vec!["Rust", "Axum"]);
        assert_eq!(projects[0].achievements, vec!["Cut generation time by 60%"]);
    }

    #[test]
    fn test_plain_lines() {
        let text = "Weather Bot\nA chat bot that posts daily forecasts.\nTechnologies: Python; Slack API";
        let projects = run(SectionContent::from_text(SectionKind::Projects, text));
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Weather Bot");
        assert_eq!(projects[0].technologies, vec!["Python", "Slack API"]);
    }
}
