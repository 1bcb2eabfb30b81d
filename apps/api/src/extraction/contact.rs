//! Contact block extraction.
//!
//! The name comes from the first name-shaped line of the header region (the
//! text above the first section heading). Email, phone and links are regex
//! scans over the header, falling back to the whole document.

use crate::extraction::normalize::content_lines;
use crate::extraction::patterns::{
    contains_date, find_email, find_linkedin, find_phone, find_portfolio, looks_like_location,
    split_meta_segments,
};
use crate::extraction::sections::LocatedDocument;
use crate::models::ContactInfo;

/// Plausible full name: 1 to 5 words, no digits or contact punctuation.
fn looks_like_name(line: &str) -> bool {
    let words = line.split_whitespace().count();
    (1..=5).contains(&words)
        && line.chars().count() <= 60
        && !line.chars().any(|c| c.is_ascii_digit() || matches!(c, '@' | '/' | '|' | ':'))
        && line.chars().next().is_some_and(char::is_uppercase)
}

fn find_name(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .take(4)
        .find(|line| looks_like_name(line))
        .map(|line| line.to_string())
}

fn find_location(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .flat_map(|line| split_meta_segments(line))
        .find(|segment| {
            looks_like_location(segment) && find_email(segment).is_none() && !contains_date(segment)
        })
}

/// Contact details from the located document.
pub fn extract_contact(doc: &LocatedDocument) -> ContactInfo {
    let header_lines = content_lines(&doc.header);
    let fallback_lines: Vec<&str> = content_lines(&doc.full_text).into_iter().take(6).collect();
    let name_lines = if header_lines.is_empty() {
        &fallback_lines
    } else {
        &header_lines
    };

    ContactInfo {
        full_name: find_name(name_lines).unwrap_or_default(),
        email: scan(doc, |text| find_email(text).map(str::to_string)),
        phone: scan(doc, find_phone),
        location: find_location(name_lines),
        linkedin: scan(doc, |text| find_linkedin(text).map(str::to_string)),
        portfolio: scan(doc, |text| find_portfolio(text).map(str::to_string)),
    }
}

/// Header first, then the whole document.
fn scan(doc: &LocatedDocument, find: impl Fn(&str) -> Option<String>) -> Option<String> {
    find(&doc.header).or_else(|| find(&doc.full_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::sections::locate;

    #[test]
    fn test_contact_from_markup_header() {
        let html = "<h1>Jane Doe</h1><p>jane@example.com | (555) 123-4567 | Austin, TX</p>\
                    <p>linkedin.com/in/janedoe | github.com/janedoe</p><h2>Experience</h2><p>x</p>";
        let contact = extract_contact(&locate(html));
        assert_eq!(contact.full_name, "Jane Doe");
        assert_eq!(contact.email.as_deref(), Some("jane@example.com"));
        assert_eq!(contact.phone.as_deref(), Some("(555) 123-4567"));
        assert_eq!(contact.location.as_deref(), Some("Austin, TX"));
        assert_eq!(contact.linkedin.as_deref(), Some("linkedin.com/in/janedoe"));
        assert_eq!(contact.portfolio.as_deref(), Some("github.com/janedoe"));
    }

    #[test]
    fn test_name_skips_contact_lines() {
        let doc = locate("john@example.com\nJohn Smith\nSummary\nBuilds reliable distributed systems.");
        assert_eq!(extract_contact(&doc).full_name, "John Smith");
    }

    #[test]
    fn test_empty_document_has_empty_contact() {
        assert!(extract_contact(&locate("")).is_empty());
    }
}
