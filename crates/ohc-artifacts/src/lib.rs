//! ohc-artifacts
//!
//! Everything the uploader reads from or writes to the local filesystem:
//! input hash files, the overflow file and per-run reports.

mod overflow;
mod report;
mod sources;

pub use overflow::FileOverflowSink;
pub use report::{write_run_report, RunReport, REPORT_SCHEMA_VERSION};
pub use sources::{discover_sources, load_record_set, read_source_lines, resolve_sources};
