use once_cell::sync::Lazy;
use regex::Regex;

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").expect("valid regex"));
static NOT_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"));

/// Make column headers usable as identifiers.
///
/// Keeps only the text after the first `:` (exports often prefix headers with a
/// table name), trims, lowercases, turns runs of spaces into `_` and drops
/// anything outside `[A-Za-z0-9_]`.
pub fn clean_column_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let tail = name.split_once(':').map_or(name, |(_, rest)| rest);
            let lowered = tail.trim().to_lowercase();
            let underscored = SPACE_RUN.replace_all(&lowered, "_");
            NOT_IDENT.replace_all(&underscored, "").into_owned()
        })
        .collect()
}
