//! Month macro expansion
//!
//! BibTeX styles predefine `jan` .. `dec` as string macros. Entries exported by
//! BibDesk frequently use them unquoted (`month = jun`).

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// Dictionary mapping month macros to full names.
    static ref MONTHS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("jan", "January");
        m.insert("feb", "February");
        m.insert("mar", "March");
        m.insert("apr", "April");
        m.insert("may", "May");
        m.insert("jun", "June");
        m.insert("jul", "July");
        m.insert("aug", "August");
        m.insert("sep", "September");
        m.insert("oct", "October");
        m.insert("nov", "November");
        m.insert("dec", "December");
        m
    };
}

/// Expand a month macro to the full month name (case-insensitive).
///
/// Returns `None` if the name is not one of the twelve predefined macros.
pub fn expand_month_macro(name: &str) -> Option<&'static str> {
    MONTHS.get(name.to_lowercase().as_str()).copied()
}

/// Check whether a name is a predefined month macro.
pub fn is_month_macro(name: &str) -> bool {
    expand_month_macro(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_known_months() {
        assert_eq!(expand_month_macro("jan"), Some("January"));
        assert_eq!(expand_month_macro("Sep"), Some("September"));
        assert_eq!(expand_month_macro("DEC"), Some("December"));
    }

    #[test]
    fn test_unknown_macro() {
        assert_eq!(expand_month_macro("june"), None);
        assert!(!is_month_macro("apj"));
        assert!(is_month_macro("nov"));
    }
}
