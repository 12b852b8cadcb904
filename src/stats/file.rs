use crate::model::{Changes, FileChanges};
use crate::stats::user::{WEIGHT_ADDITIONS, WEIGHT_DELETIONS};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default)]
struct FileTally {
    additions: u64,
    deletions: u64,
    line_count: u64,
    loc: u64,
}

/// Path-keyed aggregate: change volume from the history log, current line
/// ownership from blame. Merge-only, like [`crate::stats::UserStats`].
#[derive(Debug, Clone, Default)]
pub struct FileStats {
    files: HashMap<String, FileTally>,
}

impl FileStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_changes(&mut self, path: &str, additions: u64, deletions: u64) {
        let tally = self.files.entry(path.to_string()).or_default();
        tally.additions += additions;
        tally.deletions += deletions;
    }

    /// Fold one file's per-author blame tallies: pair firsts are lines the
    /// author currently owns, pair seconds the subset that is code. A file
    /// whose blame produced nothing inserts no entry.
    pub fn add_blame(&mut self, path: &str, blames: &HashMap<String, (u64, u64)>) {
        if blames.is_empty() {
            return;
        }
        let tally = self.files.entry(path.to_string()).or_default();
        for &(lines, code) in blames.values() {
            tally.line_count += lines;
            tally.loc += code;
        }
    }

    pub fn merge(&mut self, other: &FileStats) {
        for (path, tally) in &other.files {
            let entry = self.files.entry(path.clone()).or_default();
            entry.additions += tally.additions;
            entry.deletions += tally.deletions;
            entry.line_count += tally.line_count;
            entry.loc += tally.loc;
        }
    }

    /// Copy with every key prefixed `"{prefix}/{path}"`, used to keep file
    /// keys from different repositories apart in a combined aggregate.
    pub fn with_prefix(&self, prefix: &str) -> FileStats {
        let mut prefixed = FileStats::new();
        for (path, tally) in &self.files {
            prefixed.files.insert(format!("{prefix}/{path}"), *tally);
        }
        prefixed
    }

    /// Change volume for one path; absent paths read as zero.
    pub fn changes(&self, path: &str) -> Changes {
        let tally = self.files.get(path).copied().unwrap_or_default();
        Changes::new(tally.additions, tally.deletions)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn rows(&self) -> Vec<FileChanges> {
        self.files
            .iter()
            .map(|(path, tally)| FileChanges {
                path: path.clone(),
                additions: tally.additions,
                deletions: tally.deletions,
                line_count: tally.line_count,
                loc: tally.loc,
            })
            .collect()
    }

    /// Rows ordered by weighted change volume, heaviest first.
    pub fn sorted_by_changes(&self) -> Vec<FileChanges> {
        let mut rows = self.rows();
        rows.sort_by(|a, b| {
            score(b)
                .partial_cmp(&score(a))
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.path.cmp(&b.path))
        });
        rows
    }

    /// Rows ordered by current line count, largest first; files with no
    /// remaining lines are omitted.
    pub fn sorted_by_line_count(&self) -> Vec<FileChanges> {
        let mut rows: Vec<_> = self.rows().into_iter().filter(|r| r.line_count > 0).collect();
        rows.sort_by(|a, b| b.line_count.cmp(&a.line_count).then_with(|| a.path.cmp(&b.path)));
        rows
    }
}

fn score(row: &FileChanges) -> f64 {
    row.additions as f64 * WEIGHT_ADDITIONS + row.deletions as f64 * WEIGHT_DELETIONS
}
