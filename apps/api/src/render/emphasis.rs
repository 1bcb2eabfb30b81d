//! Splits bullet text into plain and bold runs for job keywords and metrics.

use regex::{Regex, RegexBuilder};

use crate::extraction::patterns::metric_spans;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }
}

/// What to bold inside body text.
#[derive(Debug, Clone, Default)]
pub struct Emphasis {
    keywords: Vec<Regex>,
    metrics: bool,
}

impl Emphasis {
    pub fn new(keywords: &[String], metrics: bool) -> Self {
        let mut words: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        // Longest first so "machine learning" wins over "learning".
        words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        words.dedup();
        let keywords = words
            .iter()
            .filter_map(|word| {
                RegexBuilder::new(&regex::escape(word))
                    .case_insensitive(true)
                    .build()
                    .ok()
            })
            .collect();
        Self { keywords, metrics }
    }

    pub fn is_active(&self) -> bool {
        self.metrics || !self.keywords.is_empty()
    }

    /// Byte ranges to bold, sorted and non-overlapping.
    fn spans(&self, text: &str) -> Vec<(usize, usize)> {
        let mut spans = if self.metrics {
            metric_spans(text)
        } else {
            Vec::new()
        };
        for keyword in &self.keywords {
            spans.extend(
                keyword
                    .find_iter(text)
                    .filter(|m| on_word_boundary(text, m.start(), m.end()))
                    .map(|m| (m.start(), m.end())),
            );
        }
        merge(spans)
    }

    pub fn runs(&self, text: &str) -> Vec<Run> {
        if !self.is_active() {
            return vec![Run::plain(text)];
        }
        let mut runs = Vec::new();
        let mut cursor = 0;
        for (start, end) in self.spans(text) {
            if start > cursor {
                runs.push(Run::plain(&text[cursor..start]));
            }
            runs.push(Run {
                text: text[start..end].to_string(),
                bold: true,
            });
            cursor = end;
        }
        if cursor < text.len() {
            runs.push(Run::plain(&text[cursor..]));
        }
        runs
    }
}

fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

fn merge(mut spans: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        let overlaps = merged.last().is_some_and(|&(_, last_end)| start <= last_end);
        if overlaps {
            if let Some(last) = merged.last_mut() {
                last.1 = last.1.max(end);
            }
        } else {
            merged.push((start, end));
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold(runs: &[Run]) -> Vec<&str> {
        runs.iter().filter(|r| r.bold).map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_inactive_emphasis_is_one_run() {
        let runs = Emphasis::default().runs("Cut costs by 40%");
        assert_eq!(runs, vec![Run::plain("Cut costs by 40%")]);
    }

    #[test]
    fn test_keywords_are_bolded_case_insensitively() {
        let emphasis = Emphasis::new(&["kubernetes".to_string(), "Go".to_string()], false);
        let runs = emphasis.runs("Migrated services to Kubernetes using Go and Google tooling");
        assert_eq!(bold(&runs), vec!["Kubernetes", "Go"]);
        let joined: String = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(joined, "Migrated services to Kubernetes using Go and Google tooling");
    }

    #[test]
    fn test_case_changes_that_resize_text_still_match() {
        // "İ" lowercases to two chars; matches must still land on the original text.
        let emphasis = Emphasis::new(&["rust".to_string(), "c++".to_string()], false);
        let runs = emphasis.runs("İstanbul team: RUST and C++ services");
        assert_eq!(bold(&runs), vec!["RUST", "C++"]);
        let joined: String = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(joined, "İstanbul team: RUST and C++ services");
    }

    #[test]
    fn test_overlapping_spans_merge() {
        assert_eq!(merge(vec![(5, 9), (0, 3), (2, 6)]), vec![(0, 9)]);
        assert_eq!(merge(vec![(0, 2), (4, 6)]), vec![(0, 2), (4, 6)]);
    }
}
