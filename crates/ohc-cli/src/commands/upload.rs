//! `ohc upload`: one reconcile-and-submit run.

use std::path::PathBuf;

use anyhow::anyhow;
use ohc_artifacts::{load_record_set, resolve_sources, write_run_report, FileOverflowSink, RunReport};
use ohc_config::ConfigMode;
use ohc_execution::{RunError, RunOutcome, RunSummary, UploadRun};
use ohc_reconcile::{Canonicalizer, Capacity};
use tracing::{info, warn};
use uuid::Uuid;

use super::{build_client, load_command_config, CommandError, ExitStatus, OrExit};

pub struct UploadArgs {
    pub dir: PathBuf,
    pub config_paths: Vec<String>,
    pub strict_config: bool,
    pub report_dir: Option<PathBuf>,
    pub files: Vec<PathBuf>,
}

pub fn run_upload(args: UploadArgs) -> Result<ExitStatus, CommandError> {
    let run_id = Uuid::new_v4();
    let cfg = load_command_config(&args.config_paths, ConfigMode::Upload, args.strict_config)?;
    let settings = &cfg.settings;

    let canon = Canonicalizer::with_comment_marker(&settings.comment_marker)
        .ok_or_else(|| anyhow!("CONFIG_INVALID key=/input/comment_marker: must not be blank"))
        .or_exit(ExitStatus::Config)?;
    let capacity = Capacity::new(settings.capacity).or_exit(ExitStatus::Config)?;

    let sources = resolve_sources(Some(args.dir.as_path()), &settings.input_extension, &args.files)
        .or_exit(ExitStatus::LocalIo)?;
    let (local, stats) = load_record_set(&sources, &canon).or_exit(ExitStatus::LocalIo)?;
    info!(
        %run_id,
        sources = stats.sources,
        lines = stats.lines,
        ignored = stats.ignored,
        duplicates = stats.duplicates,
        unique = stats.unique,
        "local record set built"
    );

    let client = build_client(&cfg)?;
    let sink = FileOverflowSink::new(&settings.overflow_path)
        .with_comment_marker(canon.comment_marker());

    let summary = UploadRun::new(&client, sink, canon, capacity)
        .execute(local)
        .map_err(run_error)?;

    print_summary(run_id, &cfg.loaded.config_hash, sources.len(), &summary);

    // A report failure never changes the run's exit code.
    if let Some(root) = &args.report_dir {
        let report = RunReport::from_summary(run_id, &cfg.loaded.config_hash, &sources, &summary);
        match write_run_report(root, &report) {
            Ok(path) => println!("report_path={}", path.display()),
            Err(e) => warn!(%run_id, error = %format!("{e:#}"), "run report not written"),
        }
    }

    Ok(match &summary.outcome {
        RunOutcome::NoLocalRecords | RunOutcome::Empty => ExitStatus::Ok,
        RunOutcome::Overflow { .. } => ExitStatus::Overflow,
        RunOutcome::Submitted { reply, .. } if reply.is_accepted() => ExitStatus::Ok,
        RunOutcome::Submitted { .. } => ExitStatus::Rejected,
    })
}

fn run_error(e: RunError) -> CommandError {
    let status = match &e {
        RunError::Transport(_) => ExitStatus::Transport,
        RunError::RemoteRead(_) => ExitStatus::Rejected,
        RunError::Sink(_) => ExitStatus::LocalIo,
    };
    CommandError::new(status, e)
}

fn print_summary(run_id: Uuid, config_hash: &str, sources: usize, s: &RunSummary) {
    println!("run_id={}", run_id);
    println!("config_hash={}", config_hash);
    println!("sources={}", sources);
    println!("local_total={}", s.local_total);
    println!("already_remote={}", s.already_remote);
    println!("pending={}", s.pending);
    println!("outcome={}", s.outcome.as_str());

    match &s.outcome {
        RunOutcome::Overflow { count, receipt } => {
            println!("overflow_count={}", count);
            println!("overflow_path={}", receipt.location);
        }
        RunOutcome::Submitted { count, reply } => {
            println!("submit_count={}", count);
            println!("submit_http_status={}", reply.http_status);
            println!("submit_accepted={}", reply.is_accepted());
            if !reply.is_accepted() {
                println!("submit_error={}", reply.failure_message());
            }
            println!("submit_response={}", reply.body);
        }
        RunOutcome::NoLocalRecords | RunOutcome::Empty => {}
    }
}
