//! Local hash files: discovery and reading.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ohc_reconcile::{BuildStats, Canonicalizer, RecordSet, RecordSetBuilder};
use tracing::debug;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Regular files in `dir` named `*.<extension>`, sorted by file name.
/// Hidden files are skipped. No match is not an error.
pub fn discover_sources(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("read input dir failed: {}", dir.display()))?;

    let mut found: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("read input dir entry failed: {}", dir.display()))?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let matches = path.extension().map(|e| e == extension).unwrap_or(false);
        if !hidden && matches && path.is_file() {
            found.push(path);
        }
    }

    found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(found)
}

/// Discovered files first (if `dir` is given), then `explicit` paths in the
/// order given. A file reachable by two paths is listed once.
pub fn resolve_sources(
    dir: Option<&Path>,
    extension: &str,
    explicit: &[PathBuf],
) -> Result<Vec<PathBuf>> {
    let mut candidates = match dir {
        Some(d) => discover_sources(d, extension)?,
        None => Vec::new(),
    };
    candidates.extend(explicit.iter().cloned());

    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut out = Vec::with_capacity(candidates.len());
    for p in candidates {
        let key = fs::canonicalize(&p)
            .with_context(|| format!("input source not found: {}", p.display()))?;
        if !key.is_file() {
            bail!("input source is not a file: {}", p.display());
        }
        if seen.insert(key) {
            out.push(p);
        }
    }
    Ok(out)
}

/// Lines of one source. Invalid UTF-8 sequences are dropped, not fatal and
/// not replaced; a leading BOM is dropped. `\r\n` endings are handled by the
/// canonicalizer's trim.
pub fn read_source_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).with_context(|| format!("read source failed: {}", path.display()))?;
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    Ok(decode_dropping_invalid(bytes)
        .split('\n')
        .map(str::to_string)
        .collect())
}

/// Keep only the valid UTF-8 runs. A stray byte inside a hash line must not
/// turn it into a different record (U+FFFD would never match the remote copy).
fn decode_dropping_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

/// Read every source in order and build the run's Record Set.
///
/// Any unreadable source aborts before a Record Set exists.
pub fn load_record_set(paths: &[PathBuf], canon: &Canonicalizer) -> Result<(RecordSet, BuildStats)> {
    let mut builder = RecordSetBuilder::new(canon.clone());
    for p in paths {
        let lines = read_source_lines(p)?;
        debug!(path = %p.display(), lines = lines.len(), "read source");
        builder.ingest_source(lines);
    }
    let stats = builder.stats();
    Ok((builder.build(), stats))
}
