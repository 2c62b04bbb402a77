use std::fs;

use ohc_artifacts::{load_record_set, FileOverflowSink};
use ohc_execution::OverflowSink;
use ohc_reconcile::{build_record_set, reconcile, Canonicalizer, RemoteRecordSet};

fn pending_of(n: usize) -> ohc_reconcile::PendingSet {
    let canon = Canonicalizer::default();
    let lines: Vec<String> = (0..n).map(|i| format!("WPA*02*{i:04}")).collect();
    let local = build_record_set(&canon, vec![lines]);
    reconcile(&local, &RemoteRecordSet::empty()).pending
}

#[test]
fn overflow_file_reads_back_as_the_same_records_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ohc_overflow_hashes.txt");
    let pending = pending_of(73);

    let receipt = FileOverflowSink::new(&path).persist(&pending).unwrap();
    assert_eq!(receipt.count, 73);
    assert_eq!(receipt.location, path.display().to_string());

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# ohc overflow: 73 pending record(s)"));

    let (reread, _) = load_record_set(&[path], &Canonicalizer::default()).unwrap();
    assert_eq!(reread.as_slice(), pending.as_slice());
}

#[test]
fn overflow_replaces_previous_file_and_leaves_no_temp() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overflow.txt");
    fs::write(&path, "stale\n").unwrap();

    FileOverflowSink::new(&path).persist(&pending_of(3)).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.contains("stale"));
    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names.len(), 1, "unexpected files: {names:?}");
}

#[test]
fn custom_marker_header_is_still_skipped_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("overflow.txt");
    let sink = FileOverflowSink::new(&path).with_comment_marker("//");
    sink.persist(&pending_of(2)).unwrap();

    let canon = Canonicalizer::with_comment_marker("//").unwrap();
    let (reread, _) = load_record_set(&[path], &canon).unwrap();
    assert_eq!(reread.len(), 2);
}

#[test]
fn unwritable_target_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    // target is an existing directory; rename over it fails
    let target = dir.path().join("taken");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("keep"), "x").unwrap();

    let err = FileOverflowSink::new(&target).persist(&pending_of(1));
    assert!(err.is_err());
    assert_eq!(fs::read_to_string(target.join("keep")).unwrap(), "x");
}
