pub mod blame;
pub mod discover;
pub mod log;

pub use blame::collect_blame;
pub use discover::blamable_files;
pub use log::parse_log;

use crate::alias::AliasResolver;
use crate::git;
use crate::stats::{FileStats, RepositoryStats, UserStats};
use console::style;
use std::path::Path;
use std::time::Instant;

const LOG_FORMAT: &str = "--numstat --pretty=format:\"commit %H %an\"";

#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Branch treated as the main line of development.
    pub main_branch: String,
    /// Run `git fetch --all` before reading history.
    pub fetch: bool,
    /// Lookahead depth when searching for `src` directories.
    pub src_depth: u32,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            main_branch: "main".to_string(),
            fetch: true,
            src_depth: 1,
        }
    }
}

/// Run one repository's full pipeline: fetch, the two history passes, and
/// the blame pass. Never fails — a repository whose commands all error
/// simply comes back with every aggregate empty.
pub fn collect_repository(
    path: &Path,
    options: &CollectOptions,
    aliases: &dyn AliasResolver,
) -> RepositoryStats {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let started = Instant::now();

    if options.fetch {
        git::run_command(path, "git fetch --all");
    }

    let mut stats = RepositoryStats::empty(name.as_str());

    let history = git::run_command(path, &format!("git log --all --no-merges {LOG_FORMAT}"));
    parse_log(&history, aliases, &mut stats.all_branches, Some(&mut stats.files));

    // The main-branch pass intentionally keeps merge commits; only the
    // all-branches pass filters them.
    let main_log = git::run_command(
        path,
        &format!("git log {} {LOG_FORMAT}", options.main_branch),
    );
    parse_log(&main_log, aliases, &mut stats.main_branch, None);

    collect_blame(
        path,
        options.src_depth,
        aliases,
        &mut stats.contributions,
        &mut stats.comments,
        &mut stats.files,
    );

    eprintln!(
        "{} collected in {:.2}s",
        style(format!("[{name}]")).cyan(),
        started.elapsed().as_secs_f64()
    );

    stats
}
