//! Certifications extractor. Output is capped at [`MAX_CERTIFICATIONS`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::cascade::{Attempt, SectionExtractor, Strategy};
use crate::extraction::markup::{self, FieldRole, MarkupNode};
use crate::extraction::normalize::content_lines;
use crate::extraction::patterns::{
    all_single_dates, find_date_range, is_bullet, split_name_issuer, strip_all_dates,
    strip_bullet, tidy_separators,
};
use crate::extraction::sections::{SectionContent, SectionKind};
use crate::models::Certification;

pub const MAX_CERTIFICATIONS: usize = 6;

static DATE_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:issued(?:\s+on)?|obtained|earned|expires?|expiry|expiration|valid\s+(?:until|through)|exp\.)\s*:?").expect("valid regex")
});

static EXPIRY_MARK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:expires?|expiry|expiration|valid\s+(?:until|through))\b").expect("valid regex")
});

pub struct CertificationsExtractor;

impl SectionExtractor for CertificationsExtractor {
    type Output = Vec<Certification>;

    fn kind(&self) -> SectionKind {
        SectionKind::Certifications
    }

    fn strategies(&self) -> Vec<Strategy<Self::Output>> {
        vec![
            Strategy::new("structured_blocks", structured_blocks),
            Strategy::new("list_items", list_items),
            Strategy::new("line_scan", line_scan),
        ]
    }

    fn finish(&self, mut value: Self::Output) -> Self::Output {
        value.truncate(MAX_CERTIFICATIONS);
        value
    }

    fn placeholders(&self) -> Self::Output {
        vec![Certification {
            name: "Professional Certification".to_string(),
            issuer: Some("Certifying Body".to_string()),
            issue_date: None,
            expiry_date: None,
            is_fallback: true,
        }]
    }
}

/// Issue and expiry dates from a line. "2021 - 2024" is issue and expiry;
/// a date after an "Expires" marker is the expiry.
fn apply_dates(cert: &mut Certification, line: &str) {
    if let Some(range) = find_date_range(line) {
        let points = all_single_dates(range);
        if cert.issue_date.is_none() {
            cert.issue_date = points.first().map(|d| d.to_string());
        }
        if cert.expiry_date.is_none() {
            cert.expiry_date = points.get(1).map(|d| d.to_string());
        }
        return;
    }

    let expiry_at = EXPIRY_MARK.find(line).map(|m| m.start());
    for date in all_single_dates(line) {
        let at = line.find(date).unwrap_or(0);
        let is_expiry = expiry_at.is_some_and(|mark| at > mark);
        let slot = if is_expiry {
            &mut cert.expiry_date
        } else {
            &mut cert.issue_date
        };
        if slot.is_none() {
            *slot = Some(date.to_string());
        }
    }
}

/// Name with dates and date words removed.
fn clean_name(line: &str) -> String {
    let without_dates = strip_all_dates(line);
    let without_words = DATE_WORDS.replace_all(&without_dates, "");
    tidy_separators(&without_words.replace("( , )", "").replace("(, )", ""))
}

/// One certification from one line.
pub fn parse_line(line: &str) -> Option<Certification> {
    let line = strip_bullet(line);
    let (name, issuer) = split_name_issuer(&clean_name(line));
    if name.is_empty() {
        return None;
    }
    let mut cert = Certification {
        name,
        issuer: issuer.filter(|i| !i.is_empty()),
        ..Default::default()
    };
    apply_dates(&mut cert, line);
    Some(cert)
}

/// A line that only carries dates or an issuer for the previous entry.
fn is_continuation(line: &str) -> bool {
    clean_name(line).is_empty() || line.to_lowercase().starts_with("issued by")
}

fn structured_blocks(content: &SectionContent) -> Attempt<Vec<Certification>> {
    let Some(html) = content.html.as_deref() else {
        return Attempt::NotFound;
    };
    let nodes = markup::walk(html);
    if !markup::has_structure(&nodes) {
        return Attempt::NotFound;
    }

    let mut certs: Vec<Certification> = Vec::new();
    for node in nodes {
        match node {
            MarkupNode::Boundary => {}
            MarkupNode::Title(text) | MarkupNode::Bullet(text) => certs.extend(parse_line(&text)),
            MarkupNode::Field {
                role: role @ (FieldRole::Issuer | FieldRole::Company | FieldRole::Date),
                text,
            } if !certs.is_empty() => {
                if let Some(cert) = certs.last_mut() {
                    if role == FieldRole::Date {
                        apply_dates(cert, &text);
                    } else {
                        cert.issuer.get_or_insert(text);
                    }
                }
            }
            MarkupNode::Field { text, .. } | MarkupNode::Text(text) => {
                push_or_attach(&mut certs, &text)
            }
        }
    }
    Attempt::from_value(certs)
}

fn list_items(content: &SectionContent) -> Attempt<Vec<Certification>> {
    let lines = content_lines(&content.text);
    if !lines.iter().any(|line| is_bullet(line)) {
        return Attempt::NotFound;
    }
    let mut certs: Vec<Certification> = Vec::new();
    for line in lines {
        if is_bullet(line) {
            certs.extend(parse_line(line));
        } else if let Some(cert) = certs.last_mut() {
            continuation(cert, line);
        }
    }
    Attempt::from_value(certs)
}

fn line_scan(content: &SectionContent) -> Attempt<Vec<Certification>> {
    let mut certs: Vec<Certification> = Vec::new();
    for line in content_lines(&content.text) {
        push_or_attach(&mut certs, line);
    }
    Attempt::from_value(certs)
}

/// Continuation lines attach to the last entry; anything else is a new entry.
fn push_or_attach(certs: &mut Vec<Certification>, line: &str) {
    if is_continuation(line) {
        if let Some(cert) = certs.last_mut() {
            continuation(cert, line);
            return;
        }
    }
    certs.extend(parse_line(line));
}

fn continuation(cert: &mut Certification, line: &str) {
    const ISSUED_BY: &str = "issued by";
    if line.to_lowercase().starts_with(ISSUED_BY) {
        let issuer = tidy_separators(&strip_all_dates(line.get(ISSUED_BY.len()..).unwrap_or("")));
        if cert.issuer.is_none() && !issuer.is_empty() {
            cert.issuer = Some(issuer);
        }
    }
    apply_dates(cert, line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::cascade::{extract, ExtractOptions};

    fn run(content: SectionContent) -> Vec<Certification> {
        extract(&CertificationsExtractor, Some(&content), ExtractOptions::default()).value
    }

    #[test]
    fn test_parse_line_with_issuer_and_dates() {
        let cert = parse_line("• AWS Certified Solutions Architect – Amazon Web Services (Issued 2022, Expires 2025)").unwrap();
        assert_eq!(cert.name, "AWS Certified Solutions Architect");
        assert_eq!(cert.issuer.as_deref(), Some("Amazon Web Services"));
        assert_eq!(cert.issue_date.as_deref(), Some("2022"));
        assert_eq!(cert.expiry_date.as_deref(), Some("2025"));
    }

    #[test]
    fn test_output_is_capped() {
        let text: String = (1..=10)
            .map(|i| format!("• Certification Number {i} – Issuer {i}\n"))
            .collect();
        let certs = run(SectionContent::from_text(SectionKind::Certifications, &text));
        assert_eq!(certs.len(), MAX_CERTIFICATIONS);
        assert_eq!(certs[0].name, "Certification Number 1");
        assert_eq!(certs[5].name, "Certification Number 6");
    }

    #[test]
    fn test_continuation_lines_attach_to_previous() {
        let text = "Certified Kubernetes Administrator\nIssued by CNCF\n2021 - 2024\nPMP";
        let certs = run(SectionContent::from_text(SectionKind::Certifications, text));
        assert_eq!(certs.len(), 2);
        assert_eq!(certs[0].issuer.as_deref(), Some("CNCF"));
        assert_eq!(certs[0].issue_date.as_deref(), Some("2021"));
        assert_eq!(certs[0].expiry_date.as_deref(), Some("2024"));
        assert_eq!(certs[1].name, "PMP");
    }

    #[test]
    fn test_markup_list_items() {
        let html = "<ul><li>CKA – CNCF</li><li>Scrum Master, Scrum Alliance 2020</li></ul>";
        let certs = run(SectionContent::from_html(SectionKind::Certifications, html));
        assert_eq!(certs.len(), 2);
        assert_eq!(certs[1].name, "Scrum Master");
        assert_eq!(certs[1].issuer.as_deref(), Some("Scrum Alliance"));
        assert_eq!(certs[1].issue_date.as_deref(), Some("2020"));
    }
}
