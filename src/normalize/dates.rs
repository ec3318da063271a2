use crate::metrics;

/// Pull the digits and `/` characters out of a field suspected to hold a birthdate.
///
/// The result is a fragment only; it is not checked for being a plausible date.
pub fn extract_date_fragment(name: Option<&str>) -> Option<String> {
    name.map(|s| s.chars().filter(|c| c.is_ascii_digit() || *c == '/').collect())
}

/// Turn a year string into a four-digit year.
///
/// Two characters get a `19` prefix, four or more are cut to the first four.
/// One or three characters are ambiguous and give `None`.
pub fn pad_year(value: Option<&str>) -> Option<String> {
    let value = value?;
    match value.chars().count() {
        2 => Some(format!("19{}", value)),
        n if n >= 4 => Some(value.chars().take(4).collect()),
        _ => {
            metrics::normalize::value_rejected("year");
            None
        }
    }
}

/// Turn a month string into a two-digit month, left-padding with `0`.
/// Anything wider than two characters gives `None`.
pub fn pad_month(value: Option<&str>) -> Option<String> {
    let value = value?;
    if value.chars().count() > 2 {
        metrics::normalize::value_rejected("month");
        return None;
    }
    Some(format!("{:0>2}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_date_fragment() {
        assert_eq!(
            extract_date_fragment(Some("foo 33 bar / 30/10 ///")),
            Some("33/30/10///".to_string())
        );
        assert_eq!(extract_date_fragment(Some("KEVIN WILSON")), Some(String::new()));
        assert_eq!(extract_date_fragment(Some("dob ١٢/3")), Some("/3".to_string()));
        assert_eq!(extract_date_fragment(None), None);
    }

    #[test]
    fn test_pad_year() {
        assert_eq!(pad_year(None), None);
        assert_eq!(pad_year(Some("1")), None);
        assert_eq!(pad_year(Some("20")), Some("1920".to_string()));
        assert_eq!(pad_year(Some("123")), None);
        assert_eq!(pad_year(Some("2020")), Some("2020".to_string()));
        assert_eq!(pad_year(Some("20202")), Some("2020".to_string()));
        assert_eq!(pad_year(Some("")), None);
    }

    #[test]
    fn test_pad_month() {
        assert_eq!(pad_month(None), None);
        assert_eq!(pad_month(Some("1")), Some("01".to_string()));
        assert_eq!(pad_month(Some("10")), Some("10".to_string()));
        assert_eq!(pad_month(Some("101")), None);
        assert_eq!(pad_month(Some("")), Some("00".to_string()));
    }
}
