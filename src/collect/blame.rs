use crate::alias::AliasResolver;
use crate::collect::discover;
use crate::git;
use crate::stats::{FileStats, UserStats};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// One line of `git blame --no-line-porcelain` output: hash, optional file
/// name, then `(author timestamp zone line-no)` and the line text. The
/// author may embed whitespace, so the capture is bounded by the trailing
/// timestamp.
static BLAME_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^[0-9a-z]+\s(?:.*"?\s)?\((.+)\s\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}:\d{2}\s[^)]+\)\s?(.*)$"#,
    )
    .unwrap()
});

/// Trimmed line text that counts as a comment: line comments, block
/// comment openers, and continuation lines of doc blocks.
static COMMENT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(//|/?\*)").unwrap());

/// Per-author tallies for a single file, exclusively owned by the task
/// that blamed the file until folded into the shared aggregates.
#[derive(Debug, Default)]
struct FileBlame {
    path: String,
    /// author -> (lines owned, lines owned that are code)
    lines: HashMap<String, (u64, u64)>,
    /// author -> (comment-or-blank lines, blank lines)
    comments: HashMap<String, (u64, u64)>,
}

/// Classify one blame invocation's output into per-author tallies.
///
/// Every line is total; a line is code unless its trimmed text is a
/// comment or empty; comment-or-blank lines land in the comment tally,
/// with blanks sub-counted separately. Lines that match nothing (error
/// markers, the sentinel) are skipped.
fn tally_blame_lines(lines: &[String], aliases: &dyn AliasResolver) -> FileBlame {
    let mut blame = FileBlame::default();
    for line in lines {
        let Some(caps) = BLAME_LINE.captures(line) else {
            continue;
        };
        let author = aliases.resolve(caps[1].trim());
        let text = caps[2].trim();

        let owned = blame.lines.entry(author.clone()).or_insert((0, 0));
        owned.0 += 1;
        let comment = blame.comments.entry(author).or_insert((0, 0));
        if text.is_empty() || COMMENT_LINE.is_match(text) {
            comment.0 += 1;
        } else {
            owned.1 += 1;
        }
        if text.is_empty() {
            comment.1 += 1;
        }
    }
    blame
}

fn blame_file(repo: &Path, file: &Path, aliases: &dyn AliasResolver) -> FileBlame {
    let command = format!("git blame --no-line-porcelain \"{}\"", file.display());
    let output = git::run_command(repo, &command);
    let mut blame = tally_blame_lines(&output, aliases);
    blame.path = file
        .strip_prefix(repo)
        .unwrap_or(file)
        .to_string_lossy()
        .replace('\\', "/");
    blame
}

/// Blame every discovered file and fold the results.
///
/// Files are independent, so the blame invocations fan out across the
/// rayon pool; each task owns its `FileBlame` until the sequential fold
/// below, which keeps the shared aggregates free of locks. A file whose
/// blame fails contributes nothing.
pub fn collect_blame(
    repo: &Path,
    lookahead: u32,
    aliases: &dyn AliasResolver,
    contributions: &mut UserStats,
    comments: &mut UserStats,
    files: &mut FileStats,
) {
    let paths = discover::blamable_files(repo, lookahead);

    let bar = ProgressBar::new(paths.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message("Blaming files");

    let results: Vec<FileBlame> = paths
        .par_iter()
        .progress_with(bar)
        .map(|path| blame_file(repo, path, aliases))
        .collect();

    for blame in results {
        contributions.add_blames(&blame.lines);
        comments.add_blames(&blame.comments);
        files.add_blame(&blame.path, &blame.lines);
    }
}
