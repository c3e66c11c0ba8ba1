use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn reads_rows_and_custom_columns() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("metadata.tsv");
    fs::write(
        &path,
        "filename\tsubject_id\tdisease\nrep1.tsv\tp1\tCMV\nrep2.tsv\tp2\thealthy\n\n",
    )
    .expect("write file");

    let rows = read_metadata(&path).expect("read metadata");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].filename, "rep1.tsv");
    assert_eq!(rows[1].subject_id, "p2");
    assert_eq!(rows[0].custom.get("disease").map(String::as_str), Some("CMV"));
    assert!(!rows[0].custom.contains_key("filename"));
}

#[test]
fn missing_subject_column_is_reported() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("metadata.tsv");
    fs::write(&path, "filename\nrep1.tsv\n").expect("write file");
    match read_metadata(&path).unwrap_err() {
        InputError::MissingColumn { column, .. } => assert_eq!(column, "subject_id"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_subjects_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("metadata.tsv");
    fs::write(&path, "filename\tsubject_id\na.tsv\tp1\nb.tsv\tp1\n").expect("write file");
    assert!(matches!(
        read_metadata(&path),
        Err(InputError::DuplicateRepertoire(id)) if id == "p1"
    ));
}

#[test]
fn ragged_rows_report_line_number() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("metadata.tsv");
    fs::write(&path, "filename\tsubject_id\na.tsv\tp1\nb.tsv\n").expect("write file");
    assert!(matches!(
        read_metadata(&path),
        Err(InputError::InvalidTsvRow { line: 3, .. })
    ));
}
