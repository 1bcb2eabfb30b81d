//! Spoken-languages extractor.
//!
//! Resumes sometimes label a technical-skills block "Languages". Any technical
//! keyword anywhere in the section discards the whole section.

use crate::extraction::cascade::{Attempt, SectionExtractor, Strategy};
use crate::extraction::markup::{self, MarkupNode};
use crate::extraction::normalize::content_lines;
use crate::extraction::patterns::{is_bullet, split_list_items, strip_bullet, tidy_separators};
use crate::extraction::sections::{SectionContent, SectionKind};
use crate::models::LanguageProficiency;

/// Programming languages, frameworks and tools that never name a spoken language.
pub const TECHNICAL_KEYWORDS: &[&str] = &[
    "python", "java", "javascript", "typescript", "rust", "golang", "c++", "c#", ".net",
    "ruby", "php", "perl", "kotlin", "swift", "scala", "haskell", "elixir", "erlang",
    "clojure", "dart", "lua", "matlab", "fortran", "cobol", "sql", "nosql", "html", "html5",
    "css", "css3", "sass", "bash", "shell", "powershell", "react", "angular", "vue",
    "vue.js", "node", "node.js", "nodejs", "django", "flask", "rails", "spring", "laravel",
    "docker", "kubernetes", "terraform", "aws", "azure", "gcp", "linux", "git", "graphql",
    "tensorflow", "pytorch", "pandas", "numpy", "jquery", "objective-c", "solidity", "groovy",
    "assembly", "verilog", "vhdl", "json", "xml", "yaml",
];

const PROFICIENCY_WORDS: &[&str] = &[
    "native",
    "bilingual",
    "fluent",
    "proficient",
    "professional",
    "advanced",
    "intermediate",
    "conversational",
    "basic",
    "beginner",
    "elementary",
    "limited",
    "working",
    "full",
    "mother tongue",
];

pub struct LanguagesExtractor;

impl SectionExtractor for LanguagesExtractor {
    type Output = Vec<LanguageProficiency>;

    fn kind(&self) -> SectionKind {
        SectionKind::Languages
    }

    fn strategies(&self) -> Vec<Strategy<Self::Output>> {
        vec![
            Strategy::new("structured_blocks", structured_blocks),
            Strategy::new("list_items", list_items),
            Strategy::new("inline_list", inline_list),
        ]
    }

    fn screen(&self, content: &SectionContent) -> bool {
        !mentions_technical_keyword(&content.text)
    }

    fn placeholders(&self) -> Self::Output {
        vec![LanguageProficiency {
            name: "English".to_string(),
            proficiency: Some("Native".to_string()),
            is_fallback: true,
        }]
    }
}

/// Whether any whitespace/punctuation-delimited token is a technical keyword.
pub fn mentions_technical_keyword(text: &str) -> bool {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '-')))
        .map(|token| token.to_lowercase())
        .any(|token| {
            let trimmed = token.trim_end_matches(['.', '-']);
            TECHNICAL_KEYWORDS.contains(&token.as_str()) || TECHNICAL_KEYWORDS.contains(&trimmed)
        })
}

fn is_proficiency(text: &str) -> bool {
    let lower = text.to_lowercase();
    PROFICIENCY_WORDS.iter().any(|word| lower.contains(word))
        || is_cefr_level(lower.trim())
}

/// "A1".."C2".
fn is_cefr_level(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 2 && matches!(bytes[0], b'a' | b'b' | b'c') && matches!(bytes[1], b'1' | b'2')
}

/// A plausible language name: one to three capitalised alphabetic words.
fn is_language_name(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    !words.is_empty()
        && words.len() <= 3
        && words
            .iter()
            .all(|w| w.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\''))
        && text.chars().next().is_some_and(char::is_uppercase)
}

/// "English (Native)", "Spanish – Fluent", "French: B2", "German".
pub fn parse_item(item: &str) -> Option<LanguageProficiency> {
    let item = strip_bullet(item);

    let (name, proficiency) = if let Some((name, rest)) = item.split_once('(') {
        (name.to_string(), Some(rest.trim_end_matches(')').to_string()))
    } else if let Some((name, rest)) = [" – ", " — ", " - ", ": ", ":"]
        .iter()
        .find_map(|sep| item.split_once(sep))
    {
        (name.to_string(), Some(rest.to_string()))
    } else {
        split_trailing_proficiency(item)
    };

    let name = tidy_separators(&name);
    if !is_language_name(&name) {
        return None;
    }
    let proficiency = proficiency
        .map(|p| tidy_separators(&p))
        .filter(|p| !p.is_empty());
    Some(LanguageProficiency {
        name,
        proficiency,
        is_fallback: false,
    })
}

/// "English Native" → ("English", Some("Native")).
fn split_trailing_proficiency(item: &str) -> (String, Option<String>) {
    let words: Vec<&str> = item.split_whitespace().collect();
    for split in 1..words.len() {
        let tail = words[split..].join(" ");
        if is_proficiency(&tail) {
            return (words[..split].join(" "), Some(tail));
        }
    }
    (item.to_string(), None)
}

fn parse_items<I: IntoIterator<Item = String>>(items: I) -> Vec<LanguageProficiency> {
    items
        .into_iter()
        .flat_map(|item| split_list_items(&item))
        .filter_map(|item| parse_item(&item))
        .collect()
}

fn structured_blocks(content: &SectionContent) -> Attempt<Vec<LanguageProficiency>> {
    let Some(html) = content.html.as_deref() else {
        return Attempt::NotFound;
    };
    let nodes = markup::walk(html);
    if !markup::has_structure(&nodes) {
        return Attempt::NotFound;
    }

    // One item per wrapper block: "English" + "Native" → "English – Native".
    let mut items = Vec::new();
    let mut group: Vec<String> = Vec::new();
    for node in nodes {
        match node {
            MarkupNode::Boundary => {
                if !group.is_empty() {
                    items.push(group.join(" – "));
                    group.clear();
                }
            }
            MarkupNode::Bullet(text) => items.push(text),
            MarkupNode::Title(text) | MarkupNode::Text(text) => group.push(text),
            MarkupNode::Field { text, .. } => group.push(text),
        }
    }
    if !group.is_empty() {
        items.push(group.join(" – "));
    }
    Attempt::from_value(parse_items(items))
}

fn list_items(content: &SectionContent) -> Attempt<Vec<LanguageProficiency>> {
    let lines = content_lines(&content.text);
    if !lines.iter().any(|line| is_bullet(line)) {
        return Attempt::NotFound;
    }
    Attempt::from_value(parse_items(
        lines
            .into_iter()
            .filter(|line| is_bullet(line))
            .map(|line| strip_bullet(line).to_string()),
    ))
}

fn inline_list(content: &SectionContent) -> Attempt<Vec<LanguageProficiency>> {
    Attempt::from_value(parse_items(
        content_lines(&content.text).into_iter().map(str::to_string),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::cascade::{extract, ExtractOptions, Provenance};

    fn run(content: SectionContent) -> Vec<LanguageProficiency> {
        extract(&LanguagesExtractor, Some(&content), ExtractOptions::default()).value
    }

    #[test]
    fn test_technical_keyword_discards_section() {
        let content = SectionContent::from_text(SectionKind::Languages, "English (Native), Python");
        let out = extract(
            &LanguagesExtractor,
            Some(&content),
            ExtractOptions {
                fill_placeholders: true,
            },
        );
        assert!(out.value.is_empty());
        assert_eq!(out.provenance, Provenance::Discarded);
    }

    #[test]
    fn test_python_alone_yields_nothing() {
        assert!(run(SectionContent::from_text(SectionKind::Languages, "Python")).is_empty());
    }

    #[test]
    fn test_inline_list_with_proficiency() {
        let langs = run(SectionContent::from_text(
            SectionKind::Languages,
            "English (Native), Spanish – Fluent, French: B2, German",
        ));
        let names: Vec<&str> = langs.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["English", "Spanish", "French", "German"]);
        assert_eq!(langs[0].proficiency.as_deref(), Some("Native"));
        assert_eq!(langs[1].proficiency.as_deref(), Some("Fluent"));
        assert_eq!(langs[2].proficiency.as_deref(), Some("B2"));
        assert!(langs[3].proficiency.is_none());
    }

    #[test]
    fn test_bulleted_languages() {
        let langs = run(SectionContent::from_text(
            SectionKind::Languages,
            "• Mandarin Chinese - Professional working proficiency\n• Japanese Conversational",
        ));
        assert_eq!(langs.len(), 2);
        assert_eq!(langs[0].name, "Mandarin Chinese");
        assert_eq!(langs[1].name, "Japanese");
        assert_eq!(langs[1].proficiency.as_deref(), Some("Conversational"));
    }

    #[test]
    fn test_keyword_matching_is_token_based() {
        assert!(mentions_technical_keyword("Java, C++"));
        assert!(!mentions_technical_keyword("Javanese, Russian"));
    }
}
