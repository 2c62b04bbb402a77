//! Record Set Builder.
//!
//! Merges any number of ordered line sources into one [`RecordSet`]. Sources
//! are consumed in the order given; dedup is global across sources and the
//! first occurrence wins.

use crate::{Canonicalizer, RecordSet};

/// Line accounting for one build, for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub sources: usize,
    pub lines: usize,
    /// Blank or comment lines.
    pub ignored: usize,
    /// Candidate records already present in the set.
    pub duplicates: usize,
    pub unique: usize,
}

#[derive(Debug, Default)]
pub struct RecordSetBuilder {
    canon: Canonicalizer,
    set: RecordSet,
    stats: BuildStats,
}

impl RecordSetBuilder {
    pub fn new(canon: Canonicalizer) -> Self {
        Self {
            canon,
            set: RecordSet::empty(),
            stats: BuildStats::default(),
        }
    }

    /// Feed one source. Call in the caller's stable source order.
    pub fn ingest_source<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stats.sources += 1;
        for line in lines {
            self.stats.lines += 1;
            match self.canon.canonicalize(line.as_ref()) {
                None => self.stats.ignored += 1,
                Some(r) => {
                    if self.set.insert(r) {
                        self.stats.unique += 1;
                    } else {
                        self.stats.duplicates += 1;
                    }
                }
            }
        }
        self
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    pub fn build(self) -> RecordSet {
        self.set
    }
}

/// Convenience: build a [`RecordSet`] from already-ordered sources.
pub fn build_record_set<Src, I, S>(canon: &Canonicalizer, sources: Src) -> RecordSet
where
    Src: IntoIterator<Item = I>,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut b = RecordSetBuilder::new(canon.clone());
    for src in sources {
        b.ingest_source(src);
    }
    b.build()
}
