//! Overflow file from one run is a valid input source for the next.

use ohc_artifacts::{load_record_set, FileOverflowSink};
use ohc_execution::{RunOutcome, UploadRun};
use ohc_reconcile::{Canonicalizer, Capacity};
use ohc_testkit::{hash_lines, local_set, FakeOhcService, MemorySink};

#[test]
fn overflow_then_resubmit_from_file_with_larger_capacity() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let overflow = dir.path().join("ohc_overflow_hashes.txt");
    let lines = hash_lines("o", 8);

    let service = FakeOhcService::with_remote::<&str>(&[]);
    let summary = UploadRun::new(
        &service,
        FileOverflowSink::new(&overflow),
        Canonicalizer::default(),
        Capacity::new(5)?,
    )
    .execute(local_set(&[lines.clone()]))?;
    assert!(matches!(summary.outcome, RunOutcome::Overflow { count: 8, .. }));
    assert_eq!(service.upload_count(), 0);

    let (reread, _) = load_record_set(&[overflow], &Canonicalizer::default())?;
    let service = FakeOhcService::with_remote(&lines[..3]);
    let summary = UploadRun::new(
        &service,
        MemorySink::new(),
        Canonicalizer::default(),
        Capacity::new(5)?,
    )
    .execute(reread)?;

    assert!(matches!(summary.outcome, RunOutcome::Submitted { count: 5, .. }));
    assert_eq!(service.uploads(), vec![lines[3..].to_vec()]);
    Ok(())
}
