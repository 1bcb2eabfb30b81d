//! Suggested download filenames, restricted to `[a-z0-9_.-]`.

use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_.\-]").expect("valid regex"));
static REPEATED_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{2,}").expect("valid regex"));

const DEFAULT_FILENAME: &str = "resume.docx";
const EXTENSION: &str = ".docx";

/// Lowercases and replaces every character outside `[a-z0-9_.-]` with `_`.
pub fn sanitize(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let replaced = DISALLOWED.replace_all(&lowered, "_");
    let collapsed = REPEATED_UNDERSCORE.replace_all(&replaced, "_");
    collapsed.trim_matches(|c| c == '_' || c == '.').to_string()
}

/// `<name>_resume.docx`, or the caller's override, sanitized either way.
pub fn suggested_filename(full_name: &str, requested: Option<&str>) -> String {
    let stem = match requested.map(sanitize).filter(|name| !name.is_empty()) {
        Some(name) => name,
        None => {
            let name = sanitize(full_name);
            if name.is_empty() {
                return DEFAULT_FILENAME.to_string();
            }
            format!("{name}_resume")
        }
    };
    if stem.ends_with(EXTENSION) {
        stem
    } else {
        format!("{stem}{EXTENSION}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_based_filename() {
        assert_eq!(suggested_filename("Jane Doe", None), "jane_doe_resume.docx");
        assert_eq!(
            suggested_filename("José  O'Brien-Smith", None),
            "jos_o_brien-smith_resume.docx"
        );
    }

    #[test]
    fn test_empty_name_falls_back() {
        assert_eq!(suggested_filename("", None), "resume.docx");
        assert_eq!(suggested_filename("!!!", None), "resume.docx");
    }

    #[test]
    fn test_override_is_sanitized() {
        assert_eq!(
            suggested_filename("Jane Doe", Some("My CV (final).docx")),
            "my_cv_final_.docx"
        );
        assert_eq!(suggested_filename("Jane Doe", Some("../../etc/passwd")), "etc_passwd.docx");
    }
}
