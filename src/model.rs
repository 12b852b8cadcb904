use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// A bare additions/deletions pair. Counters never go negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    pub additions: u64,
    pub deletions: u64,
}

impl Changes {
    pub fn new(additions: u64, deletions: u64) -> Self {
        Self { additions, deletions }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChanges {
    pub author: String,
    pub additions: u64,
    pub deletions: u64,
    pub commits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChanges {
    pub path: String,
    pub additions: u64,
    pub deletions: u64,
    /// Current number of blamed lines; zero once the file is gone.
    pub line_count: u64,
    /// Blamed lines excluding comments and blanks.
    pub loc: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRow {
    pub author: String,
    pub commits: u64,
    pub avg_additions: f64,
    pub avg_deletions: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipRow {
    pub author: String,
    pub lines: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLineRow {
    pub path: String,
    pub lines: u64,
    pub loc: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChangeRow {
    pub path: String,
    pub additions: u64,
    pub deletions: u64,
    pub status: FileStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Exists,
    Gone,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Exists => "exists",
            FileStatus::Gone => "gone",
        }
    }
}

/// Everything the renderer needs for one repository, rows pre-sorted.
/// Sections emptied by a scoped subcommand disappear from JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoReport {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commits: Vec<CommitRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_branches: Vec<UserChanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub main_branch: Vec<UserChanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code_ownership: Vec<OwnershipRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loc_ownership: Vec<OwnershipRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comment_ownership: Vec<OwnershipRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blank_ownership: Vec<OwnershipRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_by_lines: Vec<FileLineRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_by_changes: Vec<FileChangeRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repositories: Vec<RepoReport>,
}
