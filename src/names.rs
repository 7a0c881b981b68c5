//! Display names derived from field keys

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Matches a leading lowercase letter, a lowercase→uppercase transition, or
/// an uppercase letter that starts a lowercase run ("HTMLParser" → "HTML Parser").
static WORD_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^[a-z])|([a-z][A-Z])|([A-Z][a-z])").expect("word boundary regex is valid")
});

/// Convert a camelCase key to Title Case: `arbitratorExtraData` → `Arbitrator Extra Data`.
pub fn camel_to_title_case(key: &str) -> String {
    let titled = WORD_BOUNDARY.replace_all(key, |caps: &Captures| {
        if let Some(first) = caps.get(1) {
            first.as_str().to_uppercase()
        } else if let Some(pair) = caps.get(2) {
            let mut chars = pair.as_str().chars();
            match (chars.next(), chars.next()) {
                (Some(lower), Some(upper)) => format!("{} {}", lower, upper),
                _ => pair.as_str().to_string(),
            }
        } else {
            format!(" {}", &caps[3])
        }
    });

    // A key that already starts with a capital word would otherwise gain a leading space
    titled.trim_start().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_key() {
        assert_eq!(camel_to_title_case("arbitratorExtraData"), "Arbitrator Extra Data");
        assert_eq!(camel_to_title_case("partyB"), "Party B");
        assert_eq!(camel_to_title_case("payment"), "Payment");
    }

    #[test]
    fn test_single_space_per_boundary() {
        let titled = camel_to_title_case("someVeryLongFieldName");
        assert_eq!(titled, "Some Very Long Field Name");
        assert!(!titled.contains("  "));
    }

    #[test]
    fn test_acronyms_and_leading_capitals() {
        assert_eq!(camel_to_title_case("HTMLParser"), "HTML Parser");
        assert_eq!(camel_to_title_case("Email"), "Email");
        assert_eq!(camel_to_title_case("payment2"), "Payment2");
    }

    #[test]
    fn test_empty_key() {
        assert_eq!(camel_to_title_case(""), "");
    }
}
