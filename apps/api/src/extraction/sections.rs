//! Section Locator — finds which resume sections are present, in source order,
//! and slices out each section's content window.
//!
//! Two independent detectors:
//! - markup: heading elements (`<h1>`–`<h4>`) whose text is a known label;
//! - text: start-of-line label matches on the normalized plain text.
//!
//! A content window runs from the end of its heading to the start of the next
//! detected heading of any kind, or the end of the document.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extraction::normalize::{decode_entities, html_to_text};
use crate::extraction::patterns::is_tech_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Awards,
    Languages,
    CoreCompetencies,
}

impl SectionKind {
    /// Canonical order, used only for sections the source did not order itself.
    pub const ALL: [SectionKind; 9] = [
        SectionKind::Summary,
        SectionKind::CoreCompetencies,
        SectionKind::Experience,
        SectionKind::Projects,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Certifications,
        SectionKind::Awards,
        SectionKind::Languages,
    ];

    /// Heading text used in rendered documents and prompts.
    pub fn display_name(self) -> &'static str {
        match self {
            SectionKind::Summary => "Professional Summary",
            SectionKind::Experience => "Experience",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
            SectionKind::Projects => "Projects",
            SectionKind::Certifications => "Certifications",
            SectionKind::Awards => "Awards & Recognition",
            SectionKind::Languages => "Languages",
            SectionKind::CoreCompetencies => "Core Competencies",
        }
    }

    /// Accepted heading labels, already in normalized form (lowercase, "&" → "and").
    fn labels(self) -> &'static [&'static str] {
        match self {
            SectionKind::Summary => &[
                "summary",
                "professional summary",
                "career summary",
                "executive summary",
                "profile",
                "professional profile",
                "objective",
                "career objective",
                "about me",
                "about",
            ],
            SectionKind::Experience => &[
                "experience",
                "work experience",
                "professional experience",
                "relevant experience",
                "employment",
                "employment history",
                "work history",
                "career history",
            ],
            SectionKind::Education => &[
                "education",
                "academic background",
                "education and training",
                "academic qualifications",
                "educational background",
            ],
            SectionKind::Skills => &[
                "skills",
                "technical skills",
                "key skills",
                "skills and abilities",
                "technical expertise",
                "technologies",
                "tools and technologies",
                "skills and tools",
            ],
            SectionKind::Projects => &[
                "projects",
                "key projects",
                "personal projects",
                "selected projects",
                "notable projects",
                "academic projects",
            ],
            SectionKind::Certifications => &[
                "certifications",
                "certificates",
                "certification",
                "licenses and certifications",
                "certifications and licenses",
                "professional certifications",
            ],
            SectionKind::Awards => &[
                "awards",
                "awards and recognition",
                "awards and honors",
                "honors and awards",
                "honors",
                "achievements",
                "awards and achievements",
                "recognition",
            ],
            SectionKind::Languages => &[
                "languages",
                "language skills",
                "spoken languages",
                "language proficiency",
            ],
            SectionKind::CoreCompetencies => &[
                "core competencies",
                "competencies",
                "key competencies",
                "areas of expertise",
                "core skills",
            ],
        }
    }

    /// Kinds whose heading may share a line with content ("Skills: Rust, Go").
    /// "Achievements: ..." inside a role must not open an Awards section.
    fn allows_inline_content(self) -> bool {
        matches!(
            self,
            SectionKind::Summary
                | SectionKind::Skills
                | SectionKind::Languages
                | SectionKind::CoreCompetencies
        )
    }

    /// Classifies a heading's text, tolerating case, punctuation and "&"/"and".
    pub fn from_heading(text: &str) -> Option<SectionKind> {
        let normalized = normalize_label(text);
        if normalized.is_empty() {
            return None;
        }
        SectionKind::ALL
            .into_iter()
            .find(|kind| kind.labels().contains(&normalized.as_str()))
    }
}

/// How a section boundary was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detection {
    StructuredMarkup,
    TextHeuristic,
}

/// Ephemeral boundary record. Offsets are byte offsets into the raw HTML for
/// `StructuredMarkup` and into the normalized text for `TextHeuristic`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpan {
    pub kind: SectionKind,
    pub heading: String,
    pub heading_start: usize,
    pub start: usize,
    pub end: usize,
    pub confidence: Detection,
}

/// One located section's content, handed to that kind's extractor.
#[derive(Debug, Clone)]
pub struct SectionContent {
    pub kind: SectionKind,
    pub heading: String,
    pub confidence: Detection,
    /// Raw markup of the content window, when the source was markup.
    pub html: Option<String>,
    /// Normalized plain text of the content window.
    pub text: String,
}

impl SectionContent {
    /// A plain-text section, used by tests and by text-only callers.
    pub fn from_text(kind: SectionKind, text: &str) -> Self {
        Self {
            kind,
            heading: kind.display_name().to_string(),
            confidence: Detection::TextHeuristic,
            html: None,
            text: html_to_text(text),
        }
    }

    /// A markup section; `text` is derived from the markup.
    pub fn from_html(kind: SectionKind, html: &str) -> Self {
        Self {
            kind,
            heading: kind.display_name().to_string(),
            confidence: Detection::StructuredMarkup,
            html: Some(html.to_string()),
            text: html_to_text(html),
        }
    }
}

/// The located document: header region plus ordered sections.
#[derive(Debug, Clone, Default)]
pub struct LocatedDocument {
    /// Normalized text before the first section heading (contact block).
    pub header: String,
    /// Normalized text of the whole document.
    pub full_text: String,
    pub sections: Vec<SectionContent>,
}

impl LocatedDocument {
    pub fn order(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    pub fn section(&self, kind: SectionKind) -> Option<&SectionContent> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

static MARKUP_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<h([1-4])\b[^>]*>(.*?)</h[1-6]\s*>").expect("valid regex")
});
static HAS_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?[a-z][a-z0-9]*\b[^>]*>").expect("valid regex"));

/// Lowercases, folds "&" to "and", drops punctuation and collapses spaces.
pub fn normalize_label(text: &str) -> String {
    let lowered = text.to_lowercase().replace('&', " and ");
    let cleaned: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn looks_like_markup(raw: &str) -> bool {
    HAS_TAG.is_match(raw)
}

/// Heading-element detection over raw markup. First heading per kind wins.
pub fn detect_markup_sections(html: &str) -> Vec<SectionSpan> {
    let mut spans: Vec<SectionSpan> = Vec::new();

    for caps in MARKUP_HEADING.captures_iter(html) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let heading = html_to_text(inner.as_str());
        let Some(kind) = SectionKind::from_heading(&heading) else {
            continue;
        };
        if spans.iter().any(|s| s.kind == kind) {
            continue;
        }
        spans.push(SectionSpan {
            kind,
            heading,
            heading_start: whole.start(),
            start: whole.end(),
            end: html.len(),
            confidence: Detection::StructuredMarkup,
        });
    }

    close_windows(&mut spans, html.len());
    spans
}

/// A section heading recognised on one line of text.
struct LineHeading<'a> {
    kind: SectionKind,
    label: &'a str,
    /// Byte offset within the line where same-line content starts ("Skills: Rust").
    inline_content: Option<usize>,
}

/// Classifies one line as a heading: either the whole line is a label, or a
/// label is followed by a colon and content. Technology labels ("Tech Stack:")
/// belong to entries and never open a section in the colon form.
fn classify_line(line: &str) -> Option<LineHeading<'_>> {
    let leading = line.len() - line.trim_start().len();
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (label, inline_content) = match trimmed.split_once(':') {
        Some((label, rest)) if !rest.trim().is_empty() => {
            if is_tech_label(label) {
                return None;
            }
            (label, Some(leading + label.len() + 1))
        }
        _ => (trimmed, None),
    };
    if label.chars().count() > 60 {
        return None;
    }

    let kind = SectionKind::from_heading(label)?;
    if inline_content.is_some() && !kind.allows_inline_content() {
        return None;
    }
    Some(LineHeading {
        kind,
        label: label.trim(),
        inline_content,
    })
}

/// Start-of-line label detection over normalized text. First match per kind wins.
///
/// A line counts as a heading when the whole line is a label, or when a label
/// is followed by a colon ("Skills: Rust, Go"); in the colon form the content
/// window starts after the colon. The colon form only opens a section before
/// any other section, after a blank line, or directly under another colon-form
/// heading; elsewhere it is a labelled line of the open section.
pub fn detect_text_sections(text: &str) -> Vec<SectionSpan> {
    let mut spans: Vec<SectionSpan> = Vec::new();
    let mut offset = 0usize;
    let mut after_blank = false;
    let mut after_inline_heading = false;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        if line.trim().is_empty() {
            after_blank = true;
            continue;
        }
        let at_block_start = spans.is_empty() || after_blank || after_inline_heading;
        after_blank = false;
        after_inline_heading = false;

        let Some(heading) = classify_line(line) else {
            continue;
        };
        if heading.inline_content.is_some() && !at_block_start {
            continue;
        }
        if spans.iter().any(|s| s.kind == heading.kind) {
            continue;
        }
        let start = match heading.inline_content {
            Some(at) => {
                after_inline_heading = true;
                line_start + at
            }
            None => offset,
        };
        spans.push(SectionSpan {
            kind: heading.kind,
            heading: heading.label.to_string(),
            heading_start: line_start,
            start: start.min(text.len()),
            end: text.len(),
            confidence: Detection::TextHeuristic,
        });
    }

    close_windows(&mut spans, text.len());
    spans
}

/// Tags that delimit a heading line inside markup.
const LINE_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "dt", "td", "th", "section", "header",
    "br", "tr", "ul", "ol", "table", "article",
];

static TEXT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r">([^<]+)").expect("valid regex"));

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// An opening tag that wraps the text after it (not `</x>`, `<br>` or `<x/>`).
fn is_wrapping_open(tag: &str) -> bool {
    !tag.starts_with("</") && !tag.ends_with("/>") && tag_name(tag) != "br"
}

/// Walks back over whitespace and tags ending at `pos`. Returns where the
/// opening tags wrapping the text start, and whether the run contains a
/// line-delimiting tag (or reaches the start of the document).
fn tags_before(raw: &str, pos: usize) -> (usize, bool) {
    let mut at = pos;
    let mut wrap_start = pos;
    let mut wrapping = true;
    let mut delimited = false;
    loop {
        let trimmed = raw[..at].trim_end();
        if trimmed.is_empty() {
            return (if wrapping { 0 } else { wrap_start }, true);
        }
        let Some(open) = trimmed.ends_with('>').then(|| trimmed.rfind('<')).flatten() else {
            return (wrap_start, delimited);
        };
        let tag = &trimmed[open..];
        delimited |= LINE_TAGS.contains(&tag_name(tag).as_str());
        wrapping &= is_wrapping_open(tag);
        if wrapping {
            wrap_start = open;
        }
        at = open;
    }
}

/// Walks forward over whitespace and tags starting at `pos`. Returns where the
/// tags closing the text end, and whether the run contains a line-delimiting
/// tag (or reaches the end of the document).
fn tags_after(raw: &str, pos: usize) -> (usize, bool) {
    let mut at = pos;
    let mut close_end = pos;
    let mut closing = true;
    let mut delimited = false;
    loop {
        let rest = &raw[at..];
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            return (raw.len(), true);
        }
        let Some(close) = trimmed.starts_with('<').then(|| trimmed.find('>')).flatten() else {
            return (close_end, delimited);
        };
        let tag = &trimmed[..=close];
        delimited |= LINE_TAGS.contains(&tag_name(tag).as_str());
        at += rest.len() - trimmed.len() + close + 1;
        closing &= !is_wrapping_open(tag);
        if closing {
            close_end = at;
        }
    }
}

/// Text-heuristic detection over raw markup: a heading is a text run that
/// sits on its own line (delimited by block tags on both sides) and reads as a
/// label, e.g. `<p><strong>LANGUAGES</strong></p>`. The colon form needs only
/// the leading delimiter. Offsets are into the raw markup.
pub fn detect_markup_text_sections(html: &str) -> Vec<SectionSpan> {
    let mut spans: Vec<SectionSpan> = Vec::new();
    let mut after_inline_heading = false;

    let first_heading = detect_markup_sections(html)
        .first()
        .map_or(html.len(), |s| s.heading_start);

    for caps in TEXT_RUN.captures_iter(html) {
        let Some(run) = caps.get(1) else {
            continue;
        };
        if run.as_str().trim().is_empty() {
            continue;
        }
        let (heading_start, line_before) = tags_before(html, run.start());
        // A list item reading "Languages" is an entry, not a heading.
        if !line_before || html[heading_start..run.start()].to_ascii_lowercase().contains("<li") {
            continue;
        }
        let at_block_start =
            (spans.is_empty() && run.start() < first_heading) || after_inline_heading;
        after_inline_heading = false;

        let text = decode_entities(run.as_str());
        let Some(heading) = classify_line(&text) else {
            continue;
        };
        let start = match heading.inline_content {
            Some(_) if !at_block_start => continue,
            Some(_) => {
                // The colon sits in the raw run too; entities never precede it in a label.
                match run.as_str().find(':') {
                    Some(colon) => run.start() + colon + 1,
                    None => continue,
                }
            }
            None => {
                let (end, line_after) = tags_after(html, run.end());
                if !line_after {
                    continue;
                }
                end
            }
        };
        if spans.iter().any(|s| s.kind == heading.kind) {
            continue;
        }
        after_inline_heading = heading.inline_content.is_some();
        spans.push(SectionSpan {
            kind: heading.kind,
            heading: heading.label.to_string(),
            heading_start,
            start,
            end: html.len(),
            confidence: Detection::TextHeuristic,
        });
    }

    close_windows(&mut spans, html.len());
    spans
}

/// Merges both detectors' spans over the same markup. Heading elements win
/// for a kind both found; a text span inside a heading element's own markup
/// is dropped.
fn merge_markup_spans(
    markup: Vec<SectionSpan>,
    text: Vec<SectionSpan>,
    len: usize,
) -> Vec<SectionSpan> {
    let mut spans = markup;
    for span in text {
        let duplicate = spans.iter().any(|s| {
            let inside = span.heading_start >= s.heading_start && span.heading_start < s.start;
            s.kind == span.kind || inside
        });
        if !duplicate {
            spans.push(span);
        }
    }
    close_windows(&mut spans, len);
    spans
}

/// Sorts by position and ends each window at the next heading of any kind.
fn close_windows(spans: &mut [SectionSpan], len: usize) {
    spans.sort_by_key(|s| s.heading_start);
    let starts: Vec<usize> = spans.iter().map(|s| s.heading_start).collect();
    for (i, span) in spans.iter_mut().enumerate() {
        span.end = starts.get(i + 1).copied().unwrap_or(len);
        if span.end < span.start {
            span.end = span.start;
        }
    }
}

/// Locates sections in raw content. For markup, heading elements and
/// line-shaped label text are both detected and merged by position; plain
/// text (or markup where neither finds anything) goes through the text
/// detector over the normalized content.
pub fn locate(raw: &str) -> LocatedDocument {
    let full_text = html_to_text(raw);
    if full_text.is_empty() {
        return LocatedDocument::default();
    }

    if looks_like_markup(raw) {
        let spans = merge_markup_spans(
            detect_markup_sections(raw),
            detect_markup_text_sections(raw),
            raw.len(),
        );
        if !spans.is_empty() {
            let header = html_to_text(&raw[..spans[0].heading_start]);
            let sections = spans
                .iter()
                .map(|span| {
                    let window = &raw[span.start..span.end];
                    SectionContent {
                        kind: span.kind,
                        heading: span.heading.clone(),
                        confidence: span.confidence,
                        html: Some(window.to_string()),
                        text: html_to_text(window),
                    }
                })
                .collect();
            return LocatedDocument {
                header,
                full_text,
                sections,
            };
        }
    }

    let spans = detect_text_sections(&full_text);
    let header = match spans.first() {
        Some(first) => full_text[..first.heading_start].trim().to_string(),
        None => full_text.clone(),
    };
    let sections = spans
        .iter()
        .map(|span| SectionContent {
            kind: span.kind,
            heading: span.heading.clone(),
            confidence: span.confidence,
            html: None,
            text: full_text[span.start..span.end].trim().to_string(),
        })
        .collect();

    LocatedDocument {
        header,
        full_text,
        sections,
    }
}

/// Section kinds in the order they first appear in `raw`.
pub fn section_order(raw: &str) -> Vec<SectionKind> {
    locate(raw).order()
}
