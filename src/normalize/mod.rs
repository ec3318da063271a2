//! Record-cleaning utilities used to build identity-matching keys.
//!
//! Everything here is a pure function over `Option<&str>`: callers turn their
//! own "missing" markers (empty cells, `NA`, ...) into `None` before calling.

pub mod columns;
pub mod dates;
pub mod names;

pub use columns::clean_column_names;
pub use dates::{extract_date_fragment, pad_month, pad_year};
pub use names::{clean_person_name, join_names, Names};

/// Which normalizer to apply to a stream of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum NormalizeKind {
    /// Digits and slashes embedded in a name field
    Dob,
    /// Cleaned, uppercased person name
    Name,
    /// Four-digit year
    Year,
    /// Two-digit month
    Month,
    /// Identifier-safe column header
    Column,
}

impl NormalizeKind {
    pub fn apply(&self, value: Option<&str>, excluded_tokens: &[&str]) -> Option<String> {
        match self {
            NormalizeKind::Dob => extract_date_fragment(value),
            NormalizeKind::Name => clean_person_name(value, excluded_tokens),
            NormalizeKind::Year => pad_year(value),
            NormalizeKind::Month => pad_month(value),
            NormalizeKind::Column => value.map(|v| clean_column_names(&[v]).remove(0)),
        }
    }
}
