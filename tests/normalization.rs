use mapmerge::document::normalize;

#[test]
fn trims_and_lowercases() {
    assert_eq!(normalize("  A1 "), Some("a1".to_owned()));
    assert_eq!(normalize("FIELD-07"), Some("field-07".to_owned()));
    assert_eq!(normalize("already lower"), Some("already lower".to_owned()));
}

#[test]
fn blank_input_is_no_value() {
    assert_eq!(normalize(""), None);
    assert_eq!(normalize("   "), None);
    assert_eq!(normalize("\t\n"), None);
}

#[test]
fn idempotent() {
    for raw in ["  A1 ", "b2", "  MIXED Case  ", "x"] {
        let once = normalize(raw).expect("non-blank input normalizes");
        let twice = normalize(&once).expect("normalized input stays valid");
        assert_eq!(once, twice, "normalize(normalize({raw:?})) changed");
    }
}
