use crate::alias::Aliases;
use crate::cli::CommonArgs;
use crate::collect::{collect_repository, CollectOptions};
use crate::error::Result;
use crate::git;
use crate::model::{
    CommitRow, FileChangeRow, FileLineRow, FileStatus, OwnershipRow, RepoReport, ReportOutput,
    UserChanges, SCHEMA_VERSION,
};
use crate::stats::{RepositoryStats, UserStats, TOTAL_ROW};
use anyhow::Context;
use chrono::Utc;
use console::style;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;

/// Which report sections a subcommand renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Full,
    Authors,
    Files,
}

pub fn exec(
    common: CommonArgs,
    scope: Scope,
    json: bool,
    ndjson: bool,
    paths: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let aliases = match &common.aliases {
        Some(path) => Aliases::from_file(path)
            .with_context(|| format!("Failed to load aliases from {}", path.display()))?,
        None => Aliases::new(),
    };

    let repos = resolve_paths(&paths);
    if repos.is_empty() {
        println!("No repositories given.");
        return Ok(());
    }

    let options = CollectOptions {
        main_branch: common.main_branch.clone(),
        fetch: !common.no_fetch,
        src_depth: common.src_depth,
    };

    // Repositories share no state, so each pipeline runs as its own task.
    let mut collected: Vec<RepositoryStats> = repos
        .par_iter()
        .map(|path| collect_repository(path, &options, &aliases))
        .collect();

    if collected.len() > 1 {
        let combined = RepositoryStats::accumulate(common.combined_name.as_str(), &collected);
        collected.push(combined);
    }

    let reports: Vec<RepoReport> = collected
        .iter()
        .map(|stats| scoped(build_report(stats), scope))
        .collect();

    if json {
        output_json(&reports)?;
    } else if ndjson {
        output_ndjson(&reports)?;
    } else {
        output_tables(&reports);
    }

    Ok(())
}

/// Deduplicate the given paths and keep only git working trees, warning
/// about the rest. An empty result is reported, not an error.
fn resolve_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut repos = Vec::new();
    for path in paths {
        if !seen.insert(path.clone()) {
            eprintln!(
                "{} {} is already registered, skipping",
                style("warning:").yellow(),
                path.display()
            );
            continue;
        }
        if !git::is_git_repository(path) {
            eprintln!(
                "{} {} does not contain a git repository, skipping",
                style("warning:").yellow(),
                path.display()
            );
            continue;
        }
        repos.push(path.clone());
    }
    repos
}

/// Turn one repository's aggregates into renderable, pre-sorted rows.
pub fn build_report(stats: &RepositoryStats) -> RepoReport {
    let commits = UserStats::with_total(stats.all_branches.sorted_by_commits())
        .into_iter()
        .map(|row| CommitRow {
            avg_additions: average(row.additions, row.commits),
            avg_deletions: average(row.deletions, row.commits),
            author: row.author,
            commits: row.commits,
        })
        .collect();

    let contributions = UserStats::with_total(stats.contributions.sorted());
    let code_ownership = ownership(&contributions, |row| row.additions);
    let loc_ownership = ownership(&contributions, |row| row.deletions);

    let comment_rows =
        UserStats::with_total(stats.comments.sorted_by(|a, b| b.additions.cmp(&a.additions)));
    let comment_ownership = ownership(&comment_rows, |row| row.additions);
    let blank_rows =
        UserStats::with_total(stats.comments.sorted_by(|a, b| b.deletions.cmp(&a.deletions)));
    let blank_ownership = ownership(&blank_rows, |row| row.deletions);

    let files_by_lines = stats
        .files
        .sorted_by_line_count()
        .into_iter()
        .map(|row| FileLineRow {
            path: row.path,
            lines: row.line_count,
            loc: row.loc,
        })
        .collect();

    let files_by_changes = stats
        .files
        .sorted_by_changes()
        .into_iter()
        .map(|row| FileChangeRow {
            status: if row.line_count == 0 {
                FileStatus::Gone
            } else {
                FileStatus::Exists
            },
            path: row.path,
            additions: row.additions,
            deletions: row.deletions,
        })
        .collect();

    RepoReport {
        name: stats.name.clone(),
        commits,
        all_branches: UserStats::with_total(stats.all_branches.sorted()),
        main_branch: UserStats::with_total(stats.main_branch.sorted()),
        code_ownership,
        loc_ownership,
        comment_ownership,
        blank_ownership,
        files_by_lines,
        files_by_changes,
    }
}

fn scoped(mut report: RepoReport, scope: Scope) -> RepoReport {
    match scope {
        Scope::Full => {}
        Scope::Authors => {
            report.files_by_lines.clear();
            report.files_by_changes.clear();
        }
        Scope::Files => {
            report.commits.clear();
            report.all_branches.clear();
            report.main_branch.clear();
            report.code_ownership.clear();
            report.loc_ownership.clear();
            report.comment_ownership.clear();
            report.blank_ownership.clear();
        }
    }
    report
}

/// Percent share per row, against the trailing Total row's value.
fn ownership<F>(rows: &[UserChanges], lines: F) -> Vec<OwnershipRow>
where
    F: Fn(&UserChanges) -> u64,
{
    let total = rows.last().map(&lines).unwrap_or(0);
    rows.iter()
        .map(|row| OwnershipRow {
            author: row.author.clone(),
            lines: lines(row),
            percent: percent_of(lines(row), total),
        })
        .collect()
}

fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 10000.0).round() / 100.0
}

fn average(sum: u64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (sum as f64 / count as f64 * 100.0).round() / 100.0
}

pub fn output_json(reports: &[RepoReport]) -> Result<()> {
    let output = ReportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repositories: reports.to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn output_ndjson(reports: &[RepoReport]) -> Result<()> {
    for report in reports {
        println!("{}", serde_json::to_string(report)?);
    }
    Ok(())
}

pub fn output_tables(reports: &[RepoReport]) {
    for report in reports {
        println!();
        println!("{}", style(format!("━━━ {} ━━━", report.name)).bold());

        if !report.commits.is_empty() {
            print_title("Per-user Commits");
            println!(
                "{:<28} {:>8} {:>14} {:>14}",
                style("Author").bold(),
                style("Commits").bold(),
                style("Avg additions").bold(),
                style("Avg deletions").bold()
            );
            for row in &report.commits {
                let line = format!(
                    "{:<28} {:>8} {:>14.2} {:>14.2}",
                    row.author, row.commits, row.avg_additions, row.avg_deletions
                );
                println!("{}", emphasize(&row.author, line));
            }
        }

        author_table("Additions / Deletions - All Branches", &report.all_branches);
        author_table("Additions / Deletions - Main Branch", &report.main_branch);
        ownership_table("Code Ownership - Git Blame", &report.code_ownership);
        ownership_table(
            "Code Ownership Excluding Comments - Git Blame",
            &report.loc_ownership,
        );
        ownership_table("Comments and Docs - Git Blame", &report.comment_ownership);
        ownership_table("Empty Lines - Git Blame", &report.blank_ownership);

        if !report.files_by_lines.is_empty() {
            print_title("Files by Line Count");
            println!(
                "{:<50} {:>10} {:>10}",
                style("File").bold(),
                style("Lines").bold(),
                style("LOC").bold()
            );
            for row in &report.files_by_lines {
                println!("{:<50} {:>10} {:>10}", row.path, row.lines, row.loc);
            }
        }

        if !report.files_by_changes.is_empty() {
            print_title("Changes per File");
            println!(
                "{:<50} {:>10} {:>10} {:>8}",
                style("File").bold(),
                style("Additions").bold(),
                style("Deletions").bold(),
                style("Status").bold()
            );
            for row in &report.files_by_changes {
                let status = format!("{:>8}", row.status.as_str());
                let status = match row.status {
                    FileStatus::Gone => style(status).red(),
                    FileStatus::Exists => style(status).green(),
                };
                println!(
                    "{:<50} {:>10} {:>10} {}",
                    row.path, row.additions, row.deletions, status
                );
            }
        }
    }
}

fn print_title(title: &str) {
    println!("\n{}", style(title).bold());
    println!("{}", "─".repeat(64));
}

fn author_table(title: &str, rows: &[UserChanges]) {
    if rows.is_empty() {
        return;
    }
    print_title(title);
    println!(
        "{:<28} {:>10} {:>10}",
        style("Author").bold(),
        style("Additions").bold(),
        style("Deletions").bold()
    );
    for row in rows {
        let line = format!("{:<28} {:>10} {:>10}", row.author, row.additions, row.deletions);
        println!("{}", emphasize(&row.author, line));
    }
}

fn ownership_table(title: &str, rows: &[OwnershipRow]) {
    if rows.is_empty() {
        return;
    }
    print_title(title);
    println!(
        "{:<28} {:>10} {:>10}",
        style("Author").bold(),
        style("Lines").bold(),
        style("Percent").bold()
    );
    for row in rows {
        let line = format!("{:<28} {:>10} {:>9.2}%", row.author, row.lines, row.percent);
        println!("{}", emphasize(&row.author, line));
    }
}

/// The synthetic Total row stands out in bold; styling wraps the already
/// padded text so column widths stay intact.
fn emphasize(author: &str, line: String) -> String {
    if author == TOTAL_ROW {
        style(line).bold().to_string()
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn sample() -> RepositoryStats {
        let mut stats = RepositoryStats::empty("demo");
        stats.all_branches.add_changes("Alice", 30, 10);
        stats.all_branches.add_commits("Alice", 3);
        stats.all_branches.add_changes("Bob", 10, 10);
        stats.all_branches.add_commits("Bob", 2);
        stats.main_branch.add_changes("Alice", 20, 5);
        stats.main_branch.add_commits("Alice", 2);

        let mut blames = HashMap::new();
        blames.insert("Alice".to_string(), (60u64, 45u64));
        blames.insert("Bob".to_string(), (40, 30));
        stats.contributions.add_blames(&blames);
        stats.files.add_blame("src/lib.rs", &blames);

        let mut comment_blames = HashMap::new();
        comment_blames.insert("Alice".to_string(), (15u64, 5u64));
        comment_blames.insert("Bob".to_string(), (10, 10));
        stats.comments.add_blames(&comment_blames);

        stats.files.add_changes("src/lib.rs", 40, 20);
        stats.files.add_changes("old/gone.rs", 9, 9);
        stats
    }

    #[test]
    fn commit_rows_carry_per_commit_averages() {
        let report = build_report(&sample());
        let alice = report.commits.iter().find(|r| r.author == "Alice").unwrap();
        assert_eq!(alice.commits, 3);
        assert_eq!(alice.avg_additions, 10.0);
        assert_eq!(alice.avg_deletions, 3.33);
    }

    #[test]
    fn zero_commits_average_to_zero() {
        let stats = RepositoryStats::empty("empty");
        let report = build_report(&stats);
        // Only the synthetic Total row, and it must not divide by zero
        assert_eq!(report.commits.len(), 1);
        assert_eq!(report.commits[0].avg_additions, 0.0);
    }

    #[test]
    fn ownership_percentages_are_shares_of_the_total() {
        let report = build_report(&sample());
        let alice = report.code_ownership.iter().find(|r| r.author == "Alice").unwrap();
        assert_eq!(alice.lines, 60);
        assert_eq!(alice.percent, 60.0);
        let total = report.code_ownership.last().unwrap();
        assert_eq!(total.author, TOTAL_ROW);
        assert_eq!(total.percent, 100.0);
    }

    #[test]
    fn blank_ownership_uses_its_own_denominator() {
        let report = build_report(&sample());
        let bob = report.blank_ownership.iter().find(|r| r.author == "Bob").unwrap();
        assert_eq!(bob.lines, 10);
        // 10 of 15 blank lines overall
        assert_eq!(bob.percent, 66.67);
    }

    #[test]
    fn total_row_additions_sum_the_rest() {
        let report = build_report(&sample());
        let rows = &report.all_branches;
        let total = rows.last().unwrap();
        let sum: u64 = rows[..rows.len() - 1].iter().map(|r| r.additions).sum();
        assert_eq!(total.additions, sum);
    }

    #[test]
    fn vanished_files_are_marked_gone() {
        let report = build_report(&sample());
        let gone = report.files_by_changes.iter().find(|r| r.path == "old/gone.rs").unwrap();
        assert_eq!(gone.status, FileStatus::Gone);
        let alive = report.files_by_changes.iter().find(|r| r.path == "src/lib.rs").unwrap();
        assert_eq!(alive.status, FileStatus::Exists);
        // gone files never show up in the line-count view
        assert!(report.files_by_lines.iter().all(|r| r.path != "old/gone.rs"));
    }

    #[test]
    fn scoped_reports_drop_the_other_sections() {
        let authors = scoped(build_report(&sample()), Scope::Authors);
        assert!(authors.files_by_changes.is_empty());
        assert!(!authors.all_branches.is_empty());

        let files = scoped(build_report(&sample()), Scope::Files);
        assert!(files.all_branches.is_empty());
        assert!(!files.files_by_changes.is_empty());
    }
}
