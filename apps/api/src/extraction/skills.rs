//! Skills and core-competencies extractors.
//!
//! Both sections are flat token lists. Category labels ("Cloud: AWS, GCP")
//! are dropped and the tokens kept; skills are then split into technical and
//! soft by dictionary.

use crate::extraction::cascade::{Attempt, SectionExtractor, Strategy, Substantive};
use crate::extraction::markup;
use crate::extraction::normalize::content_lines;
use crate::extraction::patterns::{
    is_bullet, is_soft_skill, looks_like_sentence, split_label, split_list_items, strip_bullet,
};
use crate::extraction::sections::{SectionContent, SectionKind};

/// Longest token still treated as a skill rather than prose.
const MAX_SKILL_LEN: usize = 60;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSet {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
}

/// Category labels whose tokens are soft skills regardless of the dictionary.
const SOFT_LABELS: &[&str] = &[
    "soft skills",
    "soft",
    "interpersonal",
    "interpersonal skills",
    "personal skills",
    "people skills",
];

fn is_soft_label(label: &str) -> bool {
    SOFT_LABELS.contains(&label.to_lowercase().as_str())
}

impl SkillSet {
    /// Classifies tokens line by line. A soft-skills category label marks
    /// every token on its line as soft.
    pub fn from_lines<'a, I: IntoIterator<Item = &'a str>>(lines: I) -> Self {
        let mut technical = Vec::new();
        let mut soft = Vec::new();
        for line in lines {
            let soft_line = split_label(strip_bullet(line)).0.is_some_and(is_soft_label);
            for token in line_tokens(line) {
                if soft_line || is_soft_skill(&token) {
                    soft.push(token);
                } else {
                    technical.push(token);
                }
            }
        }
        Self {
            technical: clean_tokens(technical),
            soft: clean_tokens(soft),
        }
    }
}

impl Substantive for SkillSet {
    fn is_substantive(&self) -> bool {
        !self.technical.is_empty() || !self.soft.is_empty()
    }
}

/// Tokens from one line, with any leading category label removed.
fn line_tokens(line: &str) -> Vec<String> {
    let line = strip_bullet(line);
    let (label, rest) = split_label(line);
    if label.is_some() && rest.is_empty() {
        return Vec::new();
    }
    split_list_items(rest)
}

/// Order-preserving, case-insensitive de-duplication plus prose filtering.
pub fn clean_tokens<I: IntoIterator<Item = String>>(tokens: I) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for token in tokens {
        let token = token.trim().to_string();
        if token.is_empty() || token.chars().count() > MAX_SKILL_LEN || looks_like_sentence(&token) {
            continue;
        }
        let key = token.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(token);
        }
    }
    out
}

fn bulleted_tokens(content: &SectionContent) -> Option<Vec<String>> {
    let lines = content_lines(&content.text);
    if !lines.iter().any(|line| is_bullet(line)) {
        return None;
    }
    Some(clean_tokens(
        lines
            .into_iter()
            .filter(|line| is_bullet(line))
            .flat_map(line_tokens),
    ))
}

fn inline_tokens(content: &SectionContent) -> Vec<String> {
    clean_tokens(content_lines(&content.text).into_iter().flat_map(line_tokens))
}

fn markup_tokens(content: &SectionContent) -> Option<Vec<String>> {
    let html = content.html.as_deref()?;
    let nodes = markup::walk(html);
    if !markup::has_structure(&nodes) {
        return None;
    }
    Some(clean_tokens(
        markup::item_texts(&nodes)
            .iter()
            .flat_map(|text| line_tokens(text)),
    ))
}

fn skills_list_items(content: &SectionContent) -> Attempt<SkillSet> {
    let lines = content_lines(&content.text);
    if !lines.iter().any(|line| is_bullet(line)) {
        return Attempt::NotFound;
    }
    Attempt::from_value(SkillSet::from_lines(
        lines.into_iter().filter(|line| is_bullet(line)),
    ))
}

fn skills_inline_list(content: &SectionContent) -> Attempt<SkillSet> {
    Attempt::from_value(SkillSet::from_lines(content_lines(&content.text)))
}

fn competencies_structured_blocks(content: &SectionContent) -> Attempt<Vec<String>> {
    markup_tokens(content).map_or(Attempt::NotFound, Attempt::from_value)
}

fn competencies_list_items(content: &SectionContent) -> Attempt<Vec<String>> {
    bulleted_tokens(content).map_or(Attempt::NotFound, Attempt::from_value)
}

fn competencies_inline_list(content: &SectionContent) -> Attempt<Vec<String>> {
    Attempt::from_value(inline_tokens(content))
}

pub struct SkillsExtractor;

impl SectionExtractor for SkillsExtractor {
    type Output = SkillSet;

    fn kind(&self) -> SectionKind {
        SectionKind::Skills
    }

    fn strategies(&self) -> Vec<Strategy<Self::Output>> {
        vec![
            Strategy::new("list_items", skills_list_items),
            Strategy::new("inline_list", skills_inline_list),
        ]
    }

    fn placeholders(&self) -> Self::Output {
        SkillSet {
            technical: vec!["Relevant technical skill".to_string()],
            soft: vec!["Communication".to_string()],
        }
    }
}

pub struct CompetenciesExtractor;

impl SectionExtractor for CompetenciesExtractor {
    type Output = Vec<String>;

    fn kind(&self) -> SectionKind {
        SectionKind::CoreCompetencies
    }

    fn strategies(&self) -> Vec<Strategy<Self::Output>> {
        vec![
            Strategy::new("structured_blocks", competencies_structured_blocks),
            Strategy::new("list_items", competencies_list_items),
            Strategy::new("inline_list", competencies_inline_list),
        ]
    }

    fn placeholders(&self) -> Self::Output {
        vec!["Core competency".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::cascade::{extract, ExtractOptions};

    #[test]
    fn test_inline_skills_split_technical_and_soft() {
        let content = SectionContent::from_text(
            SectionKind::Skills,
            "Languages: Rust, Go, TypeScript\nCloud: AWS; Kubernetes\nLeadership, Communication",
        );
        let skills = extract(&SkillsExtractor, Some(&content), ExtractOptions::default()).value;
        assert_eq!(skills.technical, vec!["Rust", "Go", "TypeScript", "AWS", "Kubernetes"]);
        assert_eq!(skills.soft, vec!["Leadership", "Communication"]);
    }

    #[test]
    fn test_bulleted_skills_are_deduplicated() {
        let content = SectionContent::from_html(
            SectionKind::Skills,
            "<ul><li>Rust</li><li>rust</li><li>PostgreSQL (advanced, 5 yrs)</li></ul>",
        );
        let skills = extract(&SkillsExtractor, Some(&content), ExtractOptions::default()).value;
        assert_eq!(skills.technical, vec!["Rust", "PostgreSQL (advanced, 5 yrs)"]);
    }

    #[test]
    fn test_competencies_from_text() {
        let content = SectionContent::from_text(
            SectionKind::CoreCompetencies,
            "Strategic Planning | Budget Ownership | Vendor Management",
        );
        let out = extract(&CompetenciesExtractor, Some(&content), ExtractOptions::default());
        assert_eq!(
            out.value,
            vec!["Strategic Planning", "Budget Ownership", "Vendor Management"]
        );
    }

    #[test]
    fn test_soft_skills_label_forces_soft() {
        let skills = SkillSet::from_lines(["Technical: Rust, SQL", "Soft Skills: Empathy, Grit"]);
        assert_eq!(skills.technical, vec!["Rust", "SQL"]);
        assert_eq!(skills.soft, vec!["Empathy", "Grit"]);
    }

    #[test]
    fn test_prose_is_not_a_skill() {
        let tokens = clean_tokens(vec![
            "I have worked with many databases over a long and varied career in industry".to_string(),
            "SQL".to_string(),
        ]);
        assert_eq!(tokens, vec!["SQL"]);
    }
}
