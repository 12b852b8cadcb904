use crate::model::{Changes, UserChanges};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Additions count for more than deletions when ranking contributors.
pub const WEIGHT_ADDITIONS: f64 = 2.5;
pub const WEIGHT_DELETIONS: f64 = 1.1;

/// Name of the synthetic summary row appended by [`UserStats::with_total`].
pub const TOTAL_ROW: &str = "Total";

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    additions: u64,
    deletions: u64,
    commits: u64,
}

/// Author-keyed aggregate. Values only ever grow by addition; merging two
/// aggregates is per-key summation, so the operation is commutative and
/// associative regardless of fold order.
#[derive(Debug, Clone, Default)]
pub struct UserStats {
    users: HashMap<String, Tally>,
}

impl UserStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_changes(&mut self, author: &str, additions: u64, deletions: u64) {
        let tally = self.users.entry(author.to_string()).or_default();
        tally.additions += additions;
        tally.deletions += deletions;
    }

    pub fn add_commit(&mut self, author: &str) {
        self.add_commits(author, 1);
    }

    pub fn add_commits(&mut self, author: &str, commits: u64) {
        self.users.entry(author.to_string()).or_default().commits += commits;
    }

    /// Fold one file's per-author counter pairs, first into additions and
    /// second into deletions.
    pub fn add_blames(&mut self, blames: &HashMap<String, (u64, u64)>) {
        for (author, &(first, second)) in blames {
            self.add_changes(author, first, second);
        }
    }

    pub fn merge(&mut self, other: &UserStats) {
        for (author, tally) in &other.users {
            self.add_changes(author, tally.additions, tally.deletions);
            self.add_commits(author, tally.commits);
        }
    }

    /// Totals for one author; absent authors read as zero.
    pub fn changes(&self, author: &str) -> Changes {
        let tally = self.users.get(author).copied().unwrap_or_default();
        Changes::new(tally.additions, tally.deletions)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn rows(&self) -> Vec<UserChanges> {
        self.users
            .iter()
            .map(|(author, tally)| UserChanges {
                author: author.clone(),
                additions: tally.additions,
                deletions: tally.deletions,
                commits: tally.commits,
            })
            .collect()
    }

    /// Rows ordered by weighted change volume, heaviest first, equal scores
    /// by ascending author name.
    pub fn sorted(&self) -> Vec<UserChanges> {
        let mut rows = self.rows();
        rows.sort_by(|a, b| {
            score(b)
                .partial_cmp(&score(a))
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.author.cmp(&b.author))
        });
        rows
    }

    /// Rows ordered by commit count, most commits first.
    pub fn sorted_by_commits(&self) -> Vec<UserChanges> {
        let mut rows = self.rows();
        rows.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.author.cmp(&b.author)));
        rows
    }

    /// Rows in a caller-chosen order, with the name tie-break applied on
    /// top so equal rows always come out the same way.
    pub fn sorted_by<F>(&self, compare: F) -> Vec<UserChanges>
    where
        F: Fn(&UserChanges, &UserChanges) -> Ordering,
    {
        let mut rows = self.rows();
        rows.sort_by(|a, b| compare(a, b).then_with(|| a.author.cmp(&b.author)));
        rows
    }

    /// Append a synthetic trailing row summing every other row.
    pub fn with_total(mut rows: Vec<UserChanges>) -> Vec<UserChanges> {
        let mut additions = 0;
        let mut deletions = 0;
        let mut commits = 0;
        for row in &rows {
            additions += row.additions;
            deletions += row.deletions;
            commits += row.commits;
        }
        rows.push(UserChanges {
            author: TOTAL_ROW.to_string(),
            additions,
            deletions,
            commits,
        });
        rows
    }
}

fn score(row: &UserChanges) -> f64 {
    row.additions as f64 * WEIGHT_ADDITIONS + row.deletions as f64 * WEIGHT_DELETIONS
}
