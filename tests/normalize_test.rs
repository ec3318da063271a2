use femsntl::normalize::{
    clean_column_names, clean_person_name, extract_date_fragment, join_names, pad_month, pad_year,
    Names,
};

/// Build the identity key the matching stage joins on: cleaned name plus padded birth year/month.
fn identity_key(raw_name: Option<&str>, non_names: &[&str]) -> Option<String> {
    let name = clean_person_name(raw_name, non_names)?;
    let fragment = extract_date_fragment(raw_name)?;
    let mut parts = fragment.split('/');
    let month = pad_month(parts.next())?;
    let year = pad_year(parts.nth(1))?;
    Some(format!("{}|{}-{}", name, year, month))
}

#[test]
fn test_identity_key_from_name_with_embedded_birthdate() {
    assert_eq!(
        identity_key(Some("KEVIN   UNK 1/1/92 WILSON"), &["UNK"]),
        Some("KEVIN WILSON|1992-01".to_string())
    );
    assert_eq!(
        identity_key(Some("wilson, kevin 12/30/1992"), &[]),
        Some("WILSON KEVIN|1992-12".to_string())
    );
    // three-digit year is ambiguous and rejected rather than guessed
    assert_eq!(identity_key(Some("kevin 1/1/992"), &[]), None);
    assert_eq!(identity_key(None, &[]), None);
}

#[test]
fn test_documented_edge_cases() {
    assert_eq!(pad_year(Some("1")), None);
    assert_eq!(pad_year(Some("123")), None);
    assert_eq!(pad_year(Some("20")), Some("1920".to_string()));
    assert_eq!(pad_year(Some("20202")), Some("2020".to_string()));
    assert_eq!(pad_month(Some("1")), Some("01".to_string()));
    assert_eq!(pad_month(Some("101")), None);
    assert_eq!(
        extract_date_fragment(Some("foo 33 bar / 30/10 ///")),
        Some("33/30/10///".to_string())
    );
}

#[test]
fn test_join_then_clean_multi_valued_name_field() {
    let joined = join_names(&Names::Many(vec![
        "Kevin Wilson".to_string(),
        "K. Wilson 1/1/92".to_string(),
    ]));
    assert_eq!(joined.as_deref(), Some("Kevin Wilson; K. Wilson 1/1/92"));
    assert_eq!(
        clean_person_name(joined.as_deref(), &[]),
        Some("KEVIN WILSON K WILSON".to_string())
    );
    assert_eq!(join_names(&Names::Many(Vec::new())), None);
    assert_eq!(join_names(&Names::from("solo")), Some("solo".to_string()));
}

#[test]
fn test_column_names_from_export_header() {
    let header = ["Incident: Incident Number", "Patient DOB", "Unit #"];
    assert_eq!(
        clean_column_names(&header),
        vec!["incident_number", "patient_dob", "unit_"]
    );
}
