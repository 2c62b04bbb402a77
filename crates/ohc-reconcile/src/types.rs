use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Comment marker used by the service's hash files.
pub const DEFAULT_COMMENT_MARKER: &str = "#";

/// One normalized hash line.
///
/// Two records are equal iff their canonical text is byte-equal. The only way
/// to obtain a `Record` from raw text is [`Canonicalizer::canonicalize`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(String);

impl Record {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Record {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalization rule shared by local lines and remote task hashes.
///
/// A raw line is trimmed; blank lines and lines starting with the comment
/// marker are not records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canonicalizer {
    comment_marker: String,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self {
            comment_marker: DEFAULT_COMMENT_MARKER.to_string(),
        }
    }
}

impl Canonicalizer {
    /// Returns `None` for a blank marker (it would swallow every line).
    pub fn with_comment_marker(marker: &str) -> Option<Self> {
        let marker = marker.trim();
        if marker.is_empty() {
            return None;
        }
        Some(Self {
            comment_marker: marker.to_string(),
        })
    }

    pub fn comment_marker(&self) -> &str {
        &self.comment_marker
    }

    pub fn canonicalize(&self, raw: &str) -> Option<Record> {
        let t = raw.trim();
        if t.is_empty() || t.starts_with(self.comment_marker.as_str()) {
            return None;
        }
        Some(Record(t.to_string()))
    }
}

/// Ordered, unique local records for one run.
///
/// Order is order of first occurrence across all sources. Built only by
/// [`crate::RecordSetBuilder`]; immutable afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<Record>,
    index: HashSet<Record>,
}

impl RecordSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Appends `r` unless already present. Returns `true` when appended.
    pub(crate) fn insert(&mut self, r: Record) -> bool {
        if self.index.contains(&r) {
            return false;
        }
        self.index.insert(r.clone());
        self.records.push(r);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, r: &Record) -> bool {
        self.index.contains(r)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Records the service already holds for the account. Membership only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoteRecordSet {
    records: HashSet<Record>,
}

impl RemoteRecordSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a remote set from raw hash strings using `canon`.
    /// Strings that are not records (blank, comment) are dropped.
    pub fn from_raw<I, S>(canon: &Canonicalizer, raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = raw
            .into_iter()
            .filter_map(|s| canon.canonicalize(s.as_ref()))
            .collect();
        Self { records }
    }

    pub fn contains(&self, r: &Record) -> bool {
        self.records.contains(r)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Local records the service does not know yet, in Record Set order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingSet {
    records: Vec<Record>,
}

impl PendingSet {
    pub(crate) fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// Canonical text of every record, in order.
    pub fn to_strings(&self) -> Vec<String> {
        self.records.iter().map(|r| r.as_str().to_string()).collect()
    }
}

impl<'a> IntoIterator for &'a PendingSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_trims_and_skips_comments() {
        let c = Canonicalizer::default();
        assert_eq!(c.canonicalize("  abc \r").unwrap().as_str(), "abc");
        assert!(c.canonicalize("").is_none());
        assert!(c.canonicalize("   \t").is_none());
        assert!(c.canonicalize("# note").is_none());
        assert!(c.canonicalize("   #indented comment").is_none());
        // marker only matters at the start
        assert_eq!(c.canonicalize("a#b").unwrap().as_str(), "a#b");
    }

    #[test]
    fn custom_comment_marker() {
        let c = Canonicalizer::with_comment_marker("//").unwrap();
        assert!(c.canonicalize("// skip").is_none());
        assert_eq!(c.canonicalize("#kept").unwrap().as_str(), "#kept");
        assert!(Canonicalizer::with_comment_marker("  ").is_none());
    }

    #[test]
    fn record_set_insert_is_first_wins() {
        let c = Canonicalizer::default();
        let mut s = RecordSet::empty();
        assert!(s.insert(c.canonicalize("a").unwrap()));
        assert!(s.insert(c.canonicalize("b").unwrap()));
        assert!(!s.insert(c.canonicalize(" a ").unwrap()));
        let v: Vec<&str> = s.iter().map(Record::as_str).collect();
        assert_eq!(v, vec!["a", "b"]);
    }

    #[test]
    fn remote_set_uses_same_rule() {
        let c = Canonicalizer::default();
        let remote = RemoteRecordSet::from_raw(&c, ["  x ", "", "#y", "x"]);
        assert_eq!(remote.len(), 1);
        assert!(remote.contains(&c.canonicalize("x").unwrap()));
    }
}
