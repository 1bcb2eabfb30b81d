//! Awards extractor. Output is capped at [`MAX_AWARDS`].

use crate::extraction::cascade::{Attempt, SectionExtractor, Strategy};
use crate::extraction::markup::{self, FieldRole, MarkupNode};
use crate::extraction::normalize::content_lines;
use crate::extraction::patterns::{
    find_any_date, is_bullet, looks_like_sentence, split_name_issuer, strip_all_dates,
    strip_bullet,
};
use crate::extraction::sections::{SectionContent, SectionKind};
use crate::models::Award;

pub const MAX_AWARDS: usize = 5;

pub struct AwardsExtractor;

impl SectionExtractor for AwardsExtractor {
    type Output = Vec<Award>;

    fn kind(&self) -> SectionKind {
        SectionKind::Awards
    }

    fn strategies(&self) -> Vec<Strategy<Self::Output>> {
        vec![
            Strategy::new("structured_blocks", structured_blocks),
            Strategy::new("list_items", list_items),
            Strategy::new("line_scan", line_scan),
        ]
    }

    fn finish(&self, mut value: Self::Output) -> Self::Output {
        value.truncate(MAX_AWARDS);
        value
    }

    fn placeholders(&self) -> Self::Output {
        vec![Award {
            title: "Recognition Award".to_string(),
            issuer: Some("Awarding Organization".to_string()),
            date: None,
            description: None,
            is_fallback: true,
        }]
    }
}

/// "Hackathon Winner – Google (2019): Built a fraud detector" →
/// title, issuer, date, description.
pub fn parse_line(line: &str) -> Option<Award> {
    let line = strip_bullet(line);
    let (head, description) = match line.split_once(": ") {
        Some((head, rest)) if !rest.trim().is_empty() => (head, Some(rest.trim().to_string())),
        _ => (line, None),
    };
    let (title, issuer) = split_name_issuer(&strip_all_dates(head));
    if title.is_empty() {
        return None;
    }
    Some(Award {
        title,
        issuer,
        date: find_any_date(head).map(str::to_string),
        description,
        is_fallback: false,
    })
}

/// Appends free text to the award's description.
fn describe(award: &mut Award, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    match award.description.as_mut() {
        Some(description) => {
            description.push(' ');
            description.push_str(text);
        }
        None => award.description = Some(text.to_string()),
    }
}

fn structured_blocks(content: &SectionContent) -> Attempt<Vec<Award>> {
    let Some(html) = content.html.as_deref() else {
        return Attempt::NotFound;
    };
    let nodes = markup::walk(html);
    if !markup::has_structure(&nodes) {
        return Attempt::NotFound;
    }

    let mut awards: Vec<Award> = Vec::new();
    for node in nodes {
        match node {
            MarkupNode::Boundary => {}
            MarkupNode::Title(text) | MarkupNode::Bullet(text) => awards.extend(parse_line(&text)),
            MarkupNode::Field { role, text } => {
                if awards.is_empty() {
                    awards.extend(parse_line(&text));
                    continue;
                }
                let Some(award) = awards.last_mut() else {
                    continue;
                };
                match role {
                    FieldRole::Issuer | FieldRole::Company => {
                        award.issuer.get_or_insert(text);
                    }
                    FieldRole::Date => {
                        award.date.get_or_insert(text);
                    }
                    _ => describe(award, &text),
                }
            }
            MarkupNode::Text(text) => {
                if let Some(award) = awards.last_mut() {
                    describe(award, &text);
                }
            }
        }
    }
    Attempt::from_value(awards)
}

fn list_items(content: &SectionContent) -> Attempt<Vec<Award>> {
    let lines = content_lines(&content.text);
    if !lines.iter().any(|line| is_bullet(line)) {
        return Attempt::NotFound;
    }
    let mut awards: Vec<Award> = Vec::new();
    for line in lines {
        if is_bullet(line) {
            awards.extend(parse_line(line));
        } else if let Some(award) = awards.last_mut() {
            describe(award, line);
        }
    }
    Attempt::from_value(awards)
}

fn line_scan(content: &SectionContent) -> Attempt<Vec<Award>> {
    let mut awards: Vec<Award> = Vec::new();
    for line in content_lines(&content.text) {
        if looks_like_sentence(line) {
            if let Some(award) = awards.last_mut() {
                describe(award, line);
                continue;
            }
        }
        awards.extend(parse_line(line));
    }
    Attempt::from_value(awards)
}
