//! Summary extractor: the section's prose as one paragraph.

use crate::extraction::cascade::{Attempt, SectionExtractor, Strategy};
use crate::extraction::markup;
use crate::extraction::normalize::content_lines;
use crate::extraction::patterns::strip_bullet;
use crate::extraction::sections::{SectionContent, SectionKind};

pub struct SummaryExtractor;

impl SectionExtractor for SummaryExtractor {
    type Output = String;

    fn kind(&self) -> SectionKind {
        SectionKind::Summary
    }

    fn strategies(&self) -> Vec<Strategy<Self::Output>> {
        vec![
            Strategy::new("markup_paragraphs", markup_paragraphs),
            Strategy::new("paragraph", paragraph),
        ]
    }

    fn finish(&self, value: String) -> String {
        value.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn placeholders(&self) -> String {
        "Experienced professional with a track record of delivering results across teams and projects."
            .to_string()
    }
}

fn markup_paragraphs(content: &SectionContent) -> Attempt<String> {
    let Some(html) = content.html.as_deref() else {
        return Attempt::NotFound;
    };
    Attempt::from_value(markup::item_texts(&markup::walk(html)).join(" "))
}

fn paragraph(content: &SectionContent) -> Attempt<String> {
    let lines: Vec<&str> = content_lines(&content.text)
        .into_iter()
        .map(strip_bullet)
        .collect();
    Attempt::from_value(lines.join(" "))
}
