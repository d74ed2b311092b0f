//! Field name classification.

use std::cmp::Ordering;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BDSK_FILE_REGEX: Regex = Regex::new(r"(?i)^bdsk-file-([0-9]+)$").unwrap();
    static ref BDSK_URL_REGEX: Regex = Regex::new(r"(?i)^bdsk-url-([0-9]+)$").unwrap();
}

/// Field names that carry control data rather than prose.
const CONTROL_FIELDS: [&str; 5] = ["id", "entrytype", "url", "link", "file"];

/// Whether a field holds free text that may be cleaned up.
///
/// Case-insensitive. Control fields and BibDesk file/URL references are not
/// text, everything else is.
pub fn is_text_field(name: &str) -> bool {
    let name = name.to_lowercase();
    if CONTROL_FIELDS.contains(&name.as_str()) {
        return false;
    }
    !(BDSK_FILE_REGEX.is_match(&name) || BDSK_URL_REGEX.is_match(&name))
}

/// Index digits of a `bdsk-file-N` field name, as written.
pub fn attachment_index(name: &str) -> Option<&str> {
    BDSK_FILE_REGEX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Whether a field is a legacy `bdsk-url-N` link.
pub fn is_legacy_url_field(name: &str) -> bool {
    BDSK_URL_REGEX.is_match(name)
}

/// Compare two decimal digit strings by numeric value.
///
/// Works for any length, so `10` sorts after `9` and `007` equals `7`.
pub fn cmp_index(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("title")]
    #[case("Title")]
    #[case("author")]
    #[case("shorttitle")]
    #[case("abstract")]
    #[case("bdsk-file-")]
    #[case("bdsk-file-1a")]
    #[case("xbdsk-url-1")]
    #[case("urls")]
    fn text_fields(#[case] name: &str) {
        assert!(is_text_field(name));
    }

    #[rstest]
    #[case("bdsk-file-1")]
    #[case("Bdsk-File-12")]
    #[case("bdsk-url-2")]
    #[case("BDSK-URL-0")]
    #[case("url")]
    #[case("Url")]
    #[case("ID")]
    #[case("ENTRYTYPE")]
    #[case("link")]
    #[case("File")]
    fn control_fields(#[case] name: &str) {
        assert!(!is_text_field(name));
    }

    #[test]
    fn attachment_index_captures_digits() {
        assert_eq!(attachment_index("Bdsk-File-10"), Some("10"));
        assert_eq!(attachment_index("bdsk-file-007"), Some("007"));
        assert_eq!(attachment_index("bdsk-url-1"), None);
        assert_eq!(attachment_index("bdsk-file-1 "), None);
    }

    #[test]
    fn legacy_url_fields() {
        assert!(is_legacy_url_field("Bdsk-Url-1"));
        assert!(!is_legacy_url_field("url"));
        assert!(!is_legacy_url_field("bdsk-url-"));
    }

    #[test]
    fn cmp_index_is_numeric() {
        assert_eq!(cmp_index("9", "10"), Ordering::Less);
        assert_eq!(cmp_index("10", "9"), Ordering::Greater);
        assert_eq!(cmp_index("007", "7"), Ordering::Equal);
        assert_eq!(cmp_index("0", "00"), Ordering::Equal);
        assert_eq!(
            cmp_index("100000000000000000000000", "99999999999999999999999"),
            Ordering::Greater
        );
    }

    proptest! {
        #[test]
        fn classification_ignores_case(name in "\\PC{0,24}") {
            prop_assert_eq!(is_text_field(&name), is_text_field(&name.to_lowercase()));
        }

        #[test]
        fn reference_fields_are_never_text(kind in "[bB][dD][sS][kK]-([fF][iI][lL][eE]|[uU][rR][lL])", n in 0u32..10_000) {
            let name = format!("{}-{}", kind, n);
            prop_assert!(!is_text_field(&name));
        }
    }
}
