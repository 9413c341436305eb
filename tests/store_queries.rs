use std::path::PathBuf;

use rusqlite::Connection;
use tempfile::TempDir;

use mapmerge::datatype::ColumnValue;
use mapmerge::settings::StorageSettings;
use mapmerge::store::Store;

fn settings(path: PathBuf) -> StorageSettings {
    StorageSettings {
        path,
        table: "mapexport".to_owned(),
        column: "field".to_owned(),
        pool_size: 5,
    }
}

fn seeded_db(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("mapexport.db");
    let connection = Connection::open(&path).expect("open seed connection");
    connection
        .execute_batch(
            "
            create table mapexport (
                field text,
                area decimal(10, 2),
                irrigated boolean,
                seeded datetime,
                surveyed date,
                plots integer,
                yield_ratio real,
                note text
            );
            insert into mapexport values
                (' A1 ', '12.50', 1, '2024-03-01 10:30:00', '2024-03-01', 4, 0.75, 'north block'),
                ('B2', '3.25', 0, '2024-04-15 08:00:00', '2024-04-15', 1, 0.5, null),
                (null, null, null, null, null, null, null, 'orphan row'),
                ('  ', null, null, null, null, null, null, 'blank identifier');
            ",
        )
        .expect("seed reference table");
    path
}

fn column<'a>(row: &'a mapmerge::datatype::Row, name: &str) -> &'a ColumnValue {
    row.columns()
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v)
        .unwrap_or_else(|| panic!("row has no column {name}"))
}

#[test]
fn reference_set_is_normalized_and_skips_blanks() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&settings(seeded_db(&dir))).expect("open store");
    let reference = store.reference_set();
    assert_eq!(reference.len(), 2);
    assert!(reference.contains("a1"));
    assert!(reference.contains("b2"));
}

#[test]
fn fetch_converts_column_types_once_at_the_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&settings(seeded_db(&dir))).expect("open store");
    let rows = store.rows_for(&["a1".to_owned()]);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];

    assert_eq!(column(row, "field"), &ColumnValue::Text(" A1 ".to_owned()));
    assert_eq!(column(row, "area"), &ColumnValue::Float(12.5));
    assert_eq!(column(row, "irrigated"), &ColumnValue::Bool(true));
    assert_eq!(column(row, "plots"), &ColumnValue::Int(4));
    assert_eq!(column(row, "yield_ratio"), &ColumnValue::Float(0.75));
    assert_eq!(column(row, "note"), &ColumnValue::Text("north block".to_owned()));

    match column(row, "seeded") {
        ColumnValue::Timestamp(ts) => {
            assert_eq!(ts.to_string(), "2024-03-01 10:30:00");
        }
        other => panic!("seeded should be a timestamp, got {other:?}"),
    }
    // timestamps render as ISO-8601 in the document
    assert_eq!(
        column(row, "seeded").to_json(),
        serde_json::json!("2024-03-01T10:30:00")
    );
    // bare dates are already ISO-8601 text
    assert_eq!(
        column(row, "surveyed"),
        &ColumnValue::Text("2024-03-01".to_owned())
    );
}

#[test]
fn fetch_returns_null_columns_as_null() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&settings(seeded_db(&dir))).expect("open store");
    let rows = store.rows_for(&["b2".to_owned()]);
    assert_eq!(rows.len(), 1);
    assert_eq!(column(&rows[0], "note"), &ColumnValue::Null);
    assert_eq!(column(&rows[0], "note").to_json(), serde_json::Value::Null);
}

#[test]
fn empty_matched_list_short_circuits() {
    // no table exists, so any issued query would fail loudly; the empty
    // matched list must come back empty without touching storage at all
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&settings(dir.path().join("empty.db"))).expect("open store");
    assert!(store.rows_for(&[]).is_empty());
}

#[test]
fn query_failures_degrade_to_empty_results() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&settings(dir.path().join("empty.db"))).expect("open store");
    assert!(store.reference_set().is_empty());
    assert!(store.rows_for(&["a1".to_owned()]).is_empty());
}

#[test]
fn batch_fetch_binds_one_placeholder_per_identifier() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&settings(seeded_db(&dir))).expect("open store");
    let matched = vec!["a1".to_owned(), "b2".to_owned(), "a1".to_owned()];
    let rows = store.rows_for(&matched);
    // IN-predicate semantics: each stored row appears once however often it
    // was matched, and values are bound, never concatenated
    assert_eq!(rows.len(), 2);
}

#[test]
fn fetch_matches_on_normalized_identifiers() {
    // the IN-predicate compares on the normalized key, so rows stored with
    // different casing or padding still come back, unmodified
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&settings(seeded_db(&dir))).expect("open store");
    let rows = store.rows_for(&["b2".to_owned()]);
    assert_eq!(rows.len(), 1);
    assert_eq!(column(&rows[0], "field"), &ColumnValue::Text("B2".to_owned()));
}
