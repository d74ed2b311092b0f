//! BibTeX formatting module
//!
//! Converts BibTeXEntry structures back to BibTeX string format.

use super::entry::BibTeXEntry;

/// Format a single BibTeX entry to string
pub fn format_entry(entry: BibTeXEntry) -> String {
    format_entry_internal(&entry)
}

/// Format multiple entries to a single BibTeX string
pub fn format_entries(entries: Vec<BibTeXEntry>) -> String {
    entries
        .iter()
        .map(format_entry_internal)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Internal formatting function
fn format_entry_internal(entry: &BibTeXEntry) -> String {
    let mut result = String::new();

    // Entry type and cite key
    result.push('@');
    result.push_str(entry.entry_type.as_str());
    result.push('{');
    result.push_str(&entry.cite_key);
    result.push(',');
    result.push('\n');

    for field in &entry.fields {
        result.push_str("    ");
        result.push_str(&field.key);
        result.push_str(" = ");
        result.push_str(&format_field_value(&field.value));
        result.push(',');
        result.push('\n');
    }

    result.push('}');
    result
}

/// Format a field value, choosing appropriate delimiters
fn format_field_value(value: &str) -> String {
    // Purely numeric values need no delimiters
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return value.to_string();
    }

    // Braces preserve LaTeX commands and formatting
    let mut result = String::with_capacity(value.len() + 2);
    result.push('{');
    result.push_str(value);
    result.push('}');
    result
}

/// Format a @string definition
fn format_string_definition(key: &str, value: &str) -> String {
    format!("@string{{{} = {}}}", key, format_field_value(value))
}

/// Format a @preamble
fn format_preamble(text: &str) -> String {
    format!("@preamble{{{}}}", format_field_value(text))
}

/// Format a complete BibTeX file with strings, preambles, and entries
///
/// String definitions are written sorted by name so the output does not
/// depend on hash order. The result ends with a single newline.
pub fn format_complete(
    strings: &[(String, String)],
    preambles: &[String],
    entries: &[BibTeXEntry],
) -> String {
    let mut result = String::new();

    // Preambles first
    for preamble in preambles {
        result.push_str(&format_preamble(preamble));
        result.push_str("\n\n");
    }

    let mut sorted: Vec<&(String, String)> = strings.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    for (key, value) in sorted {
        result.push_str(&format_string_definition(key, value));
        result.push_str("\n\n");
    }

    for entry in entries {
        result.push_str(&format_entry_internal(entry));
        result.push_str("\n\n");
    }

    let mut result = result.trim_end().to_string();
    if !result.is_empty() {
        result.push('\n');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::BibTeXEntryType;

    #[test]
    fn test_format_simple_entry() {
        let mut entry = BibTeXEntry::new("Smith2024".to_string(), BibTeXEntryType::Article);
        entry.add_field("author", "John Smith");
        entry.add_field("title", "A Great Paper");
        entry.add_field("year", "2024");

        let formatted = format_entry(entry);
        assert!(formatted.contains("@article{Smith2024,"));
        assert!(formatted.contains("author = {John Smith}"));
        assert!(formatted.contains("title = {A Great Paper}"));
        // Year is numeric, so no braces
        assert!(formatted.contains("year = 2024,"));
    }

    #[test]
    fn test_format_empty_value_is_braced() {
        let mut entry = BibTeXEntry::new("Empty".to_string(), BibTeXEntryType::Misc);
        entry.add_field("note", "");

        let formatted = format_entry(entry);
        assert!(formatted.contains("note = {},"));
    }

    #[test]
    fn test_format_other_entry_type() {
        let entry = BibTeXEntry::new(
            "Patent1".to_string(),
            BibTeXEntryType::from_str("PATENT"),
        );
        assert_eq!(format_entry(entry), "@patent{Patent1,\n}");
    }

    #[test]
    fn test_format_complete_orders_strings() {
        let strings = vec![
            ("zz".to_string(), "Last".to_string()),
            ("aa".to_string(), "First".to_string()),
        ];
        let out = format_complete(&strings, &["\\newcommand{\\x}{y}".to_string()], &[]);
        assert_eq!(
            out,
            "@preamble{{\\newcommand{\\x}{y}}}\n\n@string{aa = {First}}\n\n@string{zz = {Last}}\n"
        );
    }

    #[test]
    fn test_format_complete_empty() {
        assert_eq!(format_complete(&[], &[], &[]), "");
    }
}
