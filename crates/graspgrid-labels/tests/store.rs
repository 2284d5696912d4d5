use graspgrid_core::{Arrow, ArrowFlags, Error, OffsetSet};
use graspgrid_labels::{find_label_file, store_file_name, LabelStore, UseCase};
use std::fs;

fn offsets(base: f32) -> OffsetSet {
    OffsetSet::from_columns(std::array::from_fn(|i| [base + i as f32, -(i as f32)]))
}

#[test]
fn every_fifth_new_record_is_test() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LabelStore::open(dir.path(), "3x3").unwrap();
    assert!(store.is_empty());

    let got: Vec<UseCase> = (0..6)
        .map(|i| store.upsert(&format!("cut_{i}.csv"), ArrowFlags::default(), None).unwrap())
        .collect();
    use UseCase::*;
    assert_eq!(got, vec![Test, Train, Train, Train, Train, Test]);
    assert_eq!(store.by_use_case(Test).count(), 2);
}

#[test]
fn update_keeps_split_and_overwrites_flags() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LabelStore::open(dir.path(), "3x3").unwrap();
    store.upsert("a.csv", ArrowFlags::from_arrows(&[Arrow::O]), Some(offsets(1.0))).unwrap();
    store.upsert("b.csv", ArrowFlags::default(), None).unwrap();

    // a.csv was inserted first and must stay in test
    let uc = store.upsert("a.csv", ArrowFlags::from_arrows(&[Arrow::L, Arrow::Ru]), None).unwrap();
    assert_eq!(uc, UseCase::Test);
    assert_eq!(store.len(), 2);

    let rec = store.get("a.csv").unwrap();
    assert_eq!(rec.flags.selected().collect::<Vec<_>>(), vec![Arrow::L, Arrow::Ru]);
    assert_eq!(rec.offsets, Some(offsets(1.0)));

    store.upsert("a.csv", ArrowFlags::default(), Some(offsets(5.0))).unwrap();
    assert_eq!(store.get("a.csv").unwrap().offsets, Some(offsets(5.0)));
}

#[test]
fn lookup_of_unknown_name_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = LabelStore::open(dir.path(), "5x5").unwrap();
    match store.lookup("missing.csv") {
        Err(Error::RecordNotFound(name)) => assert_eq!(name, "missing.csv"),
        other => panic!("expected RecordNotFound, got {other:?}"),
    }
}

#[test]
fn persist_and_reopen_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LabelStore::open(dir.path(), "3x3").unwrap();
    store.upsert("x_Cutout_3x3.csv", ArrowFlags::from_arrows(&[Arrow::Lo, Arrow::U]), Some(offsets(0.5))).unwrap();
    store.upsert("y_Cutout_3x3.csv", ArrowFlags::from_arrows(&[Arrow::R]), None).unwrap();
    store.persist().unwrap();

    let path = dir.path().join(store_file_name("3x3"));
    assert_eq!(store.path(), path.as_path());
    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("filename;use_case;arrowlo;"));
    let first = lines.next().unwrap();
    assert!(first.starts_with("x_Cutout_3x3.csv;test;1;0;0;0;0;0;1;0;"));
    assert!(first.contains("(0.5, -0)"));
    assert!(lines.next().unwrap().ends_with(";;;;;;;;;"));

    let back = LabelStore::open(dir.path(), "3x3").unwrap();
    assert_eq!(back.records(), store.records());
    assert!(back.lookup("y_Cutout_3x3.csv").unwrap()[Arrow::R]);
}

#[test]
fn reopened_store_continues_the_split_count() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LabelStore::open(dir.path(), "3x3").unwrap();
    for i in 0..5 {
        store.upsert(&format!("{i}.csv"), ArrowFlags::default(), None).unwrap();
    }
    store.persist().unwrap();

    let mut again = LabelStore::open(dir.path(), "3x3").unwrap();
    assert_eq!(again.upsert("5.csv", ArrowFlags::default(), None).unwrap(), UseCase::Test);
}

#[test]
fn label_file_is_found_by_name() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(find_label_file(dir.path()).unwrap(), None);
    fs::write(dir.path().join("scan_Cutout_3x3.csv"), "x;y;z\n").unwrap();
    fs::write(dir.path().join(store_file_name("3x3")), "").unwrap();
    let found = find_label_file(dir.path()).unwrap().unwrap();
    assert_eq!(found.file_name().unwrap(), "Cutout_3x3_Results_Labeled.csv");
}

#[test]
fn names_that_break_the_file_format_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LabelStore::open(dir.path(), "3x3").unwrap();
    for bad in ["a;b_Cutout_3x3.csv", "two\nlines.csv", "", "  "] {
        match store.upsert(bad, ArrowFlags::from_arrows(&[Arrow::O]), None) {
            Err(Error::InvalidRecordName(name)) => assert_eq!(name, bad),
            other => panic!("expected InvalidRecordName for {bad:?}, got {other:?}"),
        }
    }
    assert!(store.is_empty());

    // the rejected name never reaches the file, so the store still reopens
    store.upsert("ok_Cutout_3x3.csv", ArrowFlags::default(), None).unwrap();
    store.persist().unwrap();
    let back = LabelStore::open(dir.path(), "3x3").unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back.records()[0].use_case, UseCase::Test);
}
