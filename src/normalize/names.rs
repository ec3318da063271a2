use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::NAME_JOIN_SEPARATOR;
use crate::metrics;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("valid regex"));
static DATE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9/]").expect("valid regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// A name field that holds either one name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Names {
    Single(String),
    Many(Vec<String>),
}

impl From<&str> for Names {
    fn from(name: &str) -> Self {
        Names::Single(name.to_string())
    }
}

impl From<String> for Names {
    fn from(name: String) -> Self {
        Names::Single(name)
    }
}

impl From<Vec<String>> for Names {
    fn from(names: Vec<String>) -> Self {
        Names::Many(names)
    }
}

impl<const N: usize> From<[&str; N]> for Names {
    fn from(names: [&str; N]) -> Self {
        Names::Many(names.iter().map(|s| s.to_string()).collect())
    }
}

/// Fold a name field into one string.
///
/// A single name is returned unchanged. A list is joined with `"; "`; a list
/// that joins to nothing (e.g. an empty list) yields `None`.
pub fn join_names(names: &Names) -> Option<String> {
    match names {
        Names::Single(name) => Some(name.clone()),
        Names::Many(list) => {
            let joined = list.join(NAME_JOIN_SEPARATOR);
            if joined.is_empty() {
                None
            } else {
                Some(joined)
            }
        }
    }
}

/// Clean a free-text person name.
///
/// Uppercases, splits on runs of non-word characters, drops tokens equal to
/// one of `excluded_tokens`, strips digits and `/` (embedded birthdates) and
/// collapses whitespace. Matching is exact and happens after uppercasing, so
/// `excluded_tokens` should already be uppercase.
pub fn clean_person_name(name: Option<&str>, excluded_tokens: &[&str]) -> Option<String> {
    let name = name?;
    let upper = name.to_uppercase();

    let kept: Vec<&str> = NON_WORD
        .split(&upper)
        .filter(|token| !excluded_tokens.contains(token))
        .collect();
    let joined = kept.join(" ");

    let without_dates = DATE_CHARS.replace_all(&joined, "");
    let collapsed = WHITESPACE_RUN.replace_all(&without_dates, " ");

    metrics::normalize::name_cleaned();
    Some(collapsed.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_names() {
        assert_eq!(join_names(&Names::from("hello")), Some("hello".to_string()));
        assert_eq!(join_names(&Names::Many(vec![])), None);
        assert_eq!(join_names(&Names::from(["a", "b", "c"])), Some("a; b; c".to_string()));
    }

    #[test]
    fn test_join_names_single_is_verbatim() {
        assert_eq!(join_names(&Names::from("")), Some(String::new()));
        assert_eq!(join_names(&Names::from("  Smith ")), Some("  Smith ".to_string()));
    }

    #[test]
    fn test_join_names_empty_join_is_none() {
        assert_eq!(join_names(&Names::from([""])), None);
        assert_eq!(join_names(&Names::from(["", ""])), Some("; ".to_string()));
    }

    #[test]
    fn test_clean_person_name() {
        assert_eq!(clean_person_name(Some("kevin"), &[]), Some("KEVIN".to_string()));
        assert_eq!(clean_person_name(Some("Kevin 1/1/92"), &[]), Some("KEVIN".to_string()));
        assert_eq!(
            clean_person_name(Some("KEVIN UNK 1/1/92     WILSON"), &[]),
            Some("KEVIN UNK WILSON".to_string())
        );
        assert_eq!(
            clean_person_name(Some("KEVIN   UNK 1/1/92 WILSON"), &["UNK"]),
            Some("KEVIN WILSON".to_string())
        );
        assert_eq!(clean_person_name(None, &["UNK"]), None);
    }

    #[test]
    fn test_clean_person_name_exclusion_is_exact_after_uppercase() {
        // lowercase exclusions never match uppercased tokens
        assert_eq!(
            clean_person_name(Some("kevin unk wilson"), &["unk"]),
            Some("KEVIN UNK WILSON".to_string())
        );
        // partial tokens are kept
        assert_eq!(
            clean_person_name(Some("unknown kevin"), &["UNK"]),
            Some("UNKNOWN KEVIN".to_string())
        );
    }

    #[test]
    fn test_clean_person_name_punctuation_and_edges() {
        assert_eq!(
            clean_person_name(Some("  o'brien, patrick-j.  "), &[]),
            Some("O BRIEN PATRICK J".to_string())
        );
        assert_eq!(clean_person_name(Some("12/31/1999"), &[]), Some(String::new()));
        assert_eq!(clean_person_name(Some("mary_ann"), &[]), Some("MARY_ANN".to_string()));
        assert_eq!(clean_person_name(Some("josé"), &[]), Some("JOSÉ".to_string()));
    }
}
