//! Heuristic patterns shared by the field extractors.
//!
//! Everything regex-shaped lives here so the matching rules can be tuned
//! without touching cascade control flow.

use once_cell::sync::Lazy;
use regex::Regex;

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

static DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    let point = format!(r"(?:(?:{MONTH}\s+|\d{{1,2}}/)?(?:19|20)\d{{2}})");
    let end = format!(r"(?:{point}|present|current|now|today|ongoing)");
    Regex::new(&format!(
        r"(?i)\b{point}\s*(?:-|–|—|to|until)\s*{end}\b"
    ))
    .expect("valid regex")
});

static SINGLE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:(?:{MONTH}\s+|\d{{1,2}}/)?(?:19|20)\d{{2}}|(?:expected|exp\.?)\s+(?:{MONTH}\s+)?(?:19|20)\d{{2}})\b"
    ))
    .expect("valid regex")
});

static BULLET_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[•●▪■◦‣∙·\-\*–—>✓✔]|\d{1,2}[.)])\s+").expect("valid regex")
});

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("valid regex")
});

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.\-]?)?(?:\(\d{2,4}\)|\d{2,4})[\s.\-]?\d{3,4}[\s.\-]?\d{3,4}")
        .expect("valid regex")
});

static LINKEDIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:[a-z]{2,3}\.)?linkedin\.com/[^\s|,;<>]+")
        .expect("valid regex")
});

static PORTFOLIO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://[^\s|,;<>]+|(?:www\.)?(?:github\.com|gitlab\.com|behance\.net|dribbble\.com)/[^\s|,;<>]+)")
        .expect("valid regex")
});

static LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z][A-Za-z.'\- ]{1,40},\s*(?:[A-Z]{2}|[A-Z][A-Za-z]+(?: [A-Z][A-Za-z]+)?)$")
        .expect("valid regex")
});

static DEGREE_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:bachelor(?:'s)?|master(?:'s)?|doctor(?:ate)?\s+of|ph\.?\s?d|associate(?:'s)?\s+(?:degree|of)|diploma|high\s+school|mba|b\.?tech|m\.?tech|b\.?sc|m\.?sc|b\.?eng|m\.?eng)\b",
    )
    .expect("valid regex")
});

/// Short abbreviations ("BS", "M.A.") collide with state codes, so they only
/// count at the start of a line.
static DEGREE_ABBREV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:B\.?S\.?|B\.?A\.?|M\.?S\.?|M\.?A\.?|B\.?E\.?|M\.?E\.?|A\.?A\.?|A\.?S\.?|J\.?D\.?|M\.?D\.?)(?:\s|,|$)")
        .expect("valid regex")
});

static INSTITUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:university|college|institute|school|academy|polytechnic|universit[éy]|universidad|conservatory|iit|mit)\b",
    )
    .expect("valid regex")
});

static METRIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:[$€£]\s?\d[\d,.]*\s?[kmb]?\+?|\d[\d,.]*\s?(?:%|x\b|\+)|\b\d[\d,.]*\s?(?:k|m|million|billion|thousand)\b)")
        .expect("valid regex")
});

/// Dictionary of soft skills used to split a flat skills list.
pub const SOFT_SKILLS: &[&str] = &[
    "communication",
    "leadership",
    "teamwork",
    "team player",
    "collaboration",
    "problem solving",
    "problem-solving",
    "critical thinking",
    "time management",
    "adaptability",
    "creativity",
    "mentoring",
    "mentorship",
    "coaching",
    "negotiation",
    "public speaking",
    "presentation",
    "stakeholder management",
    "conflict resolution",
    "attention to detail",
    "emotional intelligence",
    "decision making",
    "interpersonal",
    "organization",
    "self-motivated",
    "work ethic",
];

pub fn find_date_range(text: &str) -> Option<&str> {
    DATE_RANGE.find(text).map(|m| m.as_str())
}

pub fn find_single_date(text: &str) -> Option<&str> {
    SINGLE_DATE.find(text).map(|m| m.as_str())
}

/// Date range if present, otherwise a single date.
pub fn find_any_date(text: &str) -> Option<&str> {
    find_date_range(text).or_else(|| find_single_date(text))
}

pub fn all_single_dates(text: &str) -> Vec<&str> {
    SINGLE_DATE.find_iter(text).map(|m| m.as_str()).collect()
}

pub fn contains_date(text: &str) -> bool {
    SINGLE_DATE.is_match(text)
}

/// Removes the first date (range preferred) and tidies leftover separators.
pub fn strip_date(text: &str) -> String {
    let stripped = match find_date_range(text) {
        Some(range) => text.replacen(range, "", 1),
        None => match find_single_date(text) {
            Some(date) => text.replacen(date, "", 1),
            None => text.to_string(),
        },
    };
    tidy_separators(&stripped)
}

/// Trims separator debris ("Acme Corp | " → "Acme Corp", "( )" → "").
pub fn tidy_separators(text: &str) -> String {
    let cleaned = text.replace("()", "").replace("( )", "");
    cleaned
        .trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '|' | ',' | '-' | '–' | '—' | '•' | '·' | ':' | ';' | '/')
        })
        .to_string()
}

pub fn is_bullet(line: &str) -> bool {
    BULLET_PREFIX.is_match(line)
}

pub fn strip_bullet(line: &str) -> &str {
    match BULLET_PREFIX.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}

/// Capitalised, date-free, short line without sentence punctuation.
pub fn looks_like_title(line: &str) -> bool {
    let line = line.trim();
    let chars = line.chars().count();
    if !(2..=80).contains(&chars) || is_bullet(line) || contains_date(line) {
        return false;
    }
    if line.ends_with('.') || line.ends_with(',') || line.ends_with(';') {
        return false;
    }
    if line.split_whitespace().count() > 10 {
        return false;
    }
    line.chars()
        .next()
        .map(|c| c.is_uppercase() || c.is_ascii_digit())
        .unwrap_or(false)
}

/// Long or sentence-shaped line, likely a responsibility rather than a header.
pub fn looks_like_sentence(line: &str) -> bool {
    let words = line.split_whitespace().count();
    words >= 12 || (words >= 5 && line.trim_end().ends_with('.'))
}

pub fn find_email(text: &str) -> Option<&str> {
    EMAIL.find(text).map(|m| m.as_str())
}

/// Phone number with at least 7 digits that is not a year range.
pub fn find_phone(text: &str) -> Option<String> {
    PHONE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .find(|candidate| {
            let digits = candidate.chars().filter(|c| c.is_ascii_digit()).count();
            (7..=15).contains(&digits) && find_date_range(candidate).is_none()
        })
        .map(str::to_string)
}

pub fn find_linkedin(text: &str) -> Option<&str> {
    LINKEDIN.find(text).map(|m| m.as_str().trim_end_matches(['.', ')']))
}

pub fn find_portfolio(text: &str) -> Option<&str> {
    PORTFOLIO
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ')']))
        .find(|url| !url.to_lowercase().contains("linkedin.com"))
}

pub fn looks_like_location(text: &str) -> bool {
    LOCATION.is_match(text.trim())
}

pub fn has_degree(line: &str) -> bool {
    DEGREE_WORD.is_match(line) || DEGREE_ABBREV.is_match(strip_bullet(line))
}

pub fn has_institution(line: &str) -> bool {
    INSTITUTION.is_match(line)
}

/// Byte ranges of quantified figures ("40%", "$2M", "3x").
pub fn metric_spans(text: &str) -> Vec<(usize, usize)> {
    METRIC.find_iter(text).map(|m| (m.start(), m.end())).collect()
}

/// Labels that introduce a technology list inside an entry ("Tech Stack: Rust, Go").
pub const TECH_LABELS: &[&str] = &[
    "technologies",
    "technology",
    "tech",
    "tech stack",
    "stack",
    "tools",
    "built with",
    "technologies used",
];

pub fn is_tech_label(label: &str) -> bool {
    TECH_LABELS.contains(&label.trim().to_lowercase().as_str())
}

pub fn is_soft_skill(skill: &str) -> bool {
    let lower = skill.to_lowercase();
    SOFT_SKILLS.iter().any(|soft| lower.contains(soft))
}

/// Splits a "Label: item" line, returning the label if it is short enough to be one.
pub fn split_label(line: &str) -> (Option<&str>, &str) {
    match line.split_once(':') {
        Some((label, rest)) if label.split_whitespace().count() <= 4 && !label.contains("http") => {
            (Some(label.trim()), rest.trim())
        }
        _ => (None, line.trim()),
    }
}

/// Splits on `|`, `•`, `·` and spaced dashes: the separators resumes put
/// between company, location and dates on one line.
pub fn split_meta_segments(line: &str) -> Vec<String> {
    static SEPARATOR: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\s+[|•·–—-]\s+|\s*\|\s*|\s*•\s*|\s*·\s*").expect("valid regex"));
    SEPARATOR
        .split(line)
        .map(tidy_separators)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Removes every date from `text`.
pub fn strip_all_dates(text: &str) -> String {
    let mut out = text.to_string();
    while find_any_date(&out).is_some() {
        let next = strip_date(&out);
        if next == out {
            break;
        }
        out = next;
    }
    tidy_separators(&out)
}

/// "Name – Issuer", "Name | Issuer", "Name by Issuer", "Name, Issuer".
pub fn split_name_issuer(line: &str) -> (String, Option<String>) {
    let mut segments = split_meta_segments(line).into_iter();
    let first = segments.next().unwrap_or_default();
    if let Some(issuer) = segments.next() {
        return (first, Some(issuer));
    }
    for separator in [" issued by ", " Issued by ", " by ", " from ", ", "] {
        if let Some((name, issuer)) = first.split_once(separator) {
            let (name, issuer) = (tidy_separators(name), tidy_separators(issuer));
            if !name.is_empty() && !issuer.is_empty() {
                return (name, Some(issuer));
            }
        }
    }
    (first, None)
}

/// Splits an inline list on commas/semicolons/pipes/bullets, ignoring separators
/// inside parentheses.
pub fn split_list_items(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in text.chars() {
        match c {
            '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' | ';' | '|' | '•' | '·' if depth == 0 => {
                items.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    items.push(current);

    items
        .into_iter()
        .map(|item| item.trim().trim_end_matches('.').trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_formats() {
        assert_eq!(find_date_range("Acme | Jan 2022 – Present"), Some("Jan 2022 – Present"));
        assert_eq!(find_date_range("2020-2023"), Some("2020-2023"));
        assert_eq!(find_date_range("03/2019 to 11/2021"), Some("03/2019 to 11/2021"));
        assert_eq!(find_date_range("September 2018 - June 2020"), Some("September 2018 - June 2020"));
        assert!(find_date_range("Shipped 3 features").is_none());
    }

    #[test]
    fn test_single_date() {
        assert_eq!(find_single_date("Graduated May 2019"), Some("May 2019"));
        assert_eq!(find_single_date("Class of 2015"), Some("2015"));
        assert!(find_single_date("Reduced cost by 350 dollars").is_none());
    }

    #[test]
    fn test_strip_date_tidies_separators() {
        assert_eq!(strip_date("Acme Corp | 2020 - 2023"), "Acme Corp");
        assert_eq!(strip_date("Stanford University, 2019"), "Stanford University");
    }

    #[test]
    fn test_bullets() {
        assert!(is_bullet("• Shipped X"));
        assert!(is_bullet("- Fixed Y"));
        assert!(is_bullet("1. First"));
        assert!(!is_bullet("Senior Engineer"));
        assert_eq!(strip_bullet("* Led migration"), "Led migration");
    }

    #[test]
    fn test_title_heuristic() {
        assert!(looks_like_title("Senior Software Engineer"));
        assert!(!looks_like_title("2020 - 2023"));
        assert!(!looks_like_title("• Built pipelines"));
        assert!(!looks_like_title("built the billing service."));
        assert!(!looks_like_title(
            "Responsible for designing and operating the internal deployment platform used by every team"
        ));
    }

    #[test]
    fn test_contact_patterns() {
        assert_eq!(find_email("mail: jane.doe+cv@example.co.uk |"), Some("jane.doe+cv@example.co.uk"));
        assert_eq!(find_phone("Call (555) 123-4567 today").as_deref(), Some("(555) 123-4567"));
        assert_eq!(find_phone("+44 20 7946 0958").as_deref(), Some("+44 20 7946 0958"));
        assert!(find_phone("2019 - 2021").is_none());
        assert_eq!(
            find_linkedin("linkedin.com/in/janedoe | github.com/jane"),
            Some("linkedin.com/in/janedoe")
        );
        assert_eq!(
            find_portfolio("linkedin.com/in/janedoe | github.com/jane"),
            Some("github.com/jane")
        );
    }

    #[test]
    fn test_location() {
        assert!(looks_like_location("San Francisco, CA"));
        assert!(looks_like_location("Berlin, Germany"));
        assert!(!looks_like_location("jane@example.com"));
    }

    #[test]
    fn test_degree_detection() {
        assert!(has_degree("Bachelor of Science in Computer Science"));
        assert!(has_degree("B.S. Computer Science"));
        assert!(has_degree("MBA, Wharton"));
        assert!(!has_degree("Boston, MA"));
        assert!(has_institution("Stanford University"));
    }

    #[test]
    fn test_metric_spans() {
        let text = "Cut costs by 40% and saved $2M across 3x more traffic";
        let found: Vec<&str> = metric_spans(text).iter().map(|&(s, e)| &text[s..e]).collect();
        assert_eq!(found, vec!["40%", "$2M", "3x"]);
    }

    #[test]
    fn test_split_list_items_respects_parentheses() {
        assert_eq!(
            split_list_items("English (Native, C2), French (B1); Spanish"),
            vec!["English (Native, C2)", "French (B1)", "Spanish"]
        );
    }

    #[test]
    fn test_split_name_issuer() {
        assert_eq!(
            split_name_issuer("AWS Solutions Architect – Amazon Web Services"),
            (
                "AWS Solutions Architect".to_string(),
                Some("Amazon Web Services".to_string())
            )
        );
        assert_eq!(
            split_name_issuer("Best Paper Award by ACM"),
            ("Best Paper Award".to_string(), Some("ACM".to_string()))
        );
        assert_eq!(split_name_issuer("CKA"), ("CKA".to_string(), None));
    }

    #[test]
    fn test_strip_all_dates() {
        assert_eq!(strip_all_dates("Kubernetes CKA 2021 - 2024"), "Kubernetes CKA");
        assert_eq!(strip_all_dates("Dean's List 2018 | 2019"), "Dean's List");
    }

    #[test]
    fn test_split_meta_segments() {
        assert_eq!(
            split_meta_segments("Acme Corp | Remote"),
            vec!["Acme Corp", "Remote"]
        );
        assert_eq!(
            split_meta_segments("Globex – New York, NY"),
            vec!["Globex", "New York, NY"]
        );
    }
}
