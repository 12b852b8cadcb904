use crate::alias::AliasResolver;
use crate::stats::{FileStats, UserStats};
use once_cell::sync::Lazy;
use regex::Regex;

/// Header produced by `--pretty=format:"commit %H %an"`. The author field
/// may itself contain whitespace.
static COMMIT_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^commit ([0-9a-z]+) ([A-Za-z0-9\s]+)$").unwrap());

/// `--numstat` line: additions, deletions, path. Binary files report `-`
/// for both counts and simply fail the match.
static NUMSTAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+)\s+(-?\d+)\s+([0-9A-Za-z/\-._()\[\]{}=>\s]+)$").unwrap());

/// Paths that never count: lockfiles, manifests, and generated artifacts.
/// Shared between the log parser and file discovery.
pub static EXCLUDED_FILES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(package\.json|p?npm-lock\.yaml|\.(py|xlsx|dot|svg))$").unwrap());

/// Parse one history-listing invocation's output into `users` and, when
/// given, `files`.
///
/// The scan is strictly sequential: line order encodes commit boundaries.
/// Stat lines accumulate under the most recent header and the running
/// totals flush when the next header arrives. Blank separator lines sit
/// between a header and its stat block, so they carry no meaning mid
/// stream; the trailing sentinel blank only matters as the guaranteed end
/// of the stream, where the final pending author flushes like any other.
/// A commit id seen twice keeps only its first occurrence — the later
/// block is dropped wholesale, including its commit count.
pub fn parse_log(
    lines: &[String],
    aliases: &dyn AliasResolver,
    users: &mut UserStats,
    mut files: Option<&mut FileStats>,
) {
    let mut seen = std::collections::HashSet::new();
    let mut current: Option<(String, u64, u64)> = None;

    for line in lines {
        if let Some(caps) = COMMIT_HEADER.captures(line) {
            if let Some((author, additions, deletions)) = current.take() {
                users.add_changes(&author, additions, deletions);
            }
            if !seen.insert(caps[1].to_string()) {
                continue;
            }
            let author = aliases.resolve(&caps[2]);
            users.add_commit(&author);
            current = Some((author, 0, 0));
            continue;
        }

        let Some((_, additions, deletions)) = current.as_mut() else {
            continue;
        };
        let Some(caps) = NUMSTAT.captures(line) else {
            continue;
        };
        let path = &caps[3];
        if EXCLUDED_FILES.is_match(path) {
            continue;
        }
        let add = caps[1].parse::<u64>().unwrap_or(0);
        let del = caps[2].parse::<u64>().unwrap_or(0);
        *additions += add;
        *deletions += del;
        if let Some(stats) = files.as_deref_mut() {
            stats.add_changes(path, add, del);
        }
    }

    if let Some((author, additions, deletions)) = current.take() {
        users.add_changes(&author, additions, deletions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Changes;
    use pretty_assertions::assert_eq;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn identity() -> impl Fn(&str) -> String {
        |raw: &str| raw.to_string()
    }

    #[test]
    fn totals_accumulate_per_author() {
        let mut users = UserStats::new();
        parse_log(
            &lines(&[
                "commit aaa1 Alice",
                "3\t1\tsrc/main.rs",
                "2\t0\tsrc/lib.rs",
                "commit bbb2 Bob",
                "7\t7\tsrc/main.rs",
                "",
            ]),
            &identity(),
            &mut users,
            None,
        );
        assert_eq!(users.changes("Alice"), Changes::new(5, 1));
        assert_eq!(users.changes("Bob"), Changes::new(7, 7));
    }

    #[test]
    fn separator_blanks_do_not_split_a_commit() {
        // `--pretty=format:..` puts a blank line between each header and
        // its numstat block
        let mut users = UserStats::new();
        parse_log(
            &lines(&[
                "commit aaa1 Alice",
                "",
                "3\t1\tsrc/main.rs",
                "commit bbb2 Bob",
                "",
                "2\t0\tsrc/lib.rs",
                "",
            ]),
            &identity(),
            &mut users,
            None,
        );
        assert_eq!(users.changes("Alice"), Changes::new(3, 1));
        assert_eq!(users.changes("Bob"), Changes::new(2, 0));
    }

    #[test]
    fn duplicate_commit_ids_count_once() {
        let mut users = UserStats::new();
        parse_log(
            &lines(&[
                "commit abc Alice",
                "3\t1\tfoo.go",
                "commit abc Alice",
                "5\t5\tbar.go",
                "",
            ]),
            &identity(),
            &mut users,
            None,
        );
        let rows = users.sorted();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].additions, 3);
        assert_eq!(rows[0].deletions, 1);
        assert_eq!(rows[0].commits, 1);
    }

    #[test]
    fn duplicate_stream_matches_first_occurrence_only() {
        let duplicated = lines(&[
            "commit abc Alice",
            "3\t1\tfoo.go",
            "commit abc Alice",
            "5\t5\tbar.go",
            "",
        ]);
        let first_only = lines(&["commit abc Alice", "3\t1\tfoo.go", ""]);

        let mut from_duplicated = UserStats::new();
        parse_log(&duplicated, &identity(), &mut from_duplicated, None);
        let mut from_first = UserStats::new();
        parse_log(&first_only, &identity(), &mut from_first, None);

        assert_eq!(from_duplicated.sorted(), from_first.sorted());
    }

    #[test]
    fn commit_without_stat_lines_still_counts() {
        let mut users = UserStats::new();
        parse_log(
            &lines(&["commit ccc3 Carol", "commit ddd4 Carol", ""]),
            &identity(),
            &mut users,
            None,
        );
        let rows = users.sorted_by_commits();
        assert_eq!(rows[0].commits, 2);
        assert_eq!(rows[0].additions, 0);
        assert_eq!(rows[0].deletions, 0);
    }

    #[test]
    fn sentinel_flushes_the_final_author() {
        let mut users = UserStats::new();
        parse_log(
            &lines(&["commit eee5 Dave", "9\t2\ta.rs", ""]),
            &identity(),
            &mut users,
            None,
        );
        assert_eq!(users.changes("Dave"), Changes::new(9, 2));
    }

    #[test]
    fn noise_lines_are_ignored() {
        let mut users = UserStats::new();
        parse_log(
            &lines(&[
                "warning: refname 'main' is ambiguous",
                "commit fff6 Eve",
                "-\t-\timage.png",
                "not a stat line at all!!",
                "4\t4\tsrc/thing.rs",
                "",
            ]),
            &identity(),
            &mut users,
            None,
        );
        assert_eq!(users.changes("Eve"), Changes::new(4, 4));
    }

    #[test]
    fn stat_lines_before_any_header_are_dropped() {
        let mut users = UserStats::new();
        parse_log(&lines(&["4\t4\tsrc/thing.rs", ""]), &identity(), &mut users, None);
        assert!(users.is_empty());
    }

    #[test]
    fn excluded_paths_drop_from_both_aggregates() {
        let mut users = UserStats::new();
        let mut files = FileStats::new();
        parse_log(
            &lines(&[
                "commit abc1 Alice",
                "100\t0\tpackage.json",
                "50\t0\tpnpm-lock.yaml",
                "20\t0\tscripts/gen.py",
                "3\t1\tsrc/main.rs",
                "",
            ]),
            &identity(),
            &mut users,
            Some(&mut files),
        );
        assert_eq!(users.changes("Alice"), Changes::new(3, 1));
        assert_eq!(files.changes("src/main.rs"), Changes::new(3, 1));
        assert_eq!(files.changes("package.json"), Changes::new(0, 0));
    }

    #[test]
    fn file_aggregate_sums_across_commits() {
        let mut users = UserStats::new();
        let mut files = FileStats::new();
        parse_log(
            &lines(&[
                "commit abc1 Alice",
                "3\t1\tsrc/main.rs",
                "commit def2 Bob",
                "2\t2\tsrc/main.rs",
                "",
            ]),
            &identity(),
            &mut users,
            Some(&mut files),
        );
        assert_eq!(files.changes("src/main.rs"), Changes::new(5, 3));
    }

    #[test]
    fn authors_resolve_through_aliases() {
        let mut aliases = crate::alias::Aliases::new();
        aliases.insert("Just1Developer", "JustOneDeveloper");
        let mut users = UserStats::new();
        parse_log(
            &lines(&["commit abc1 Just1Developer", "1\t0\ta.rs", ""]),
            &aliases,
            &mut users,
            None,
        );
        assert_eq!(users.changes("JustOneDeveloper"), Changes::new(1, 0));
        assert_eq!(users.changes("Just1Developer"), Changes::new(0, 0));
    }

    #[test]
    fn author_names_may_contain_whitespace() {
        let mut users = UserStats::new();
        parse_log(
            &lines(&["commit abc1 Mary Jane Watson", "2\t1\ta.rs", ""]),
            &identity(),
            &mut users,
            None,
        );
        assert_eq!(users.changes("Mary Jane Watson"), Changes::new(2, 1));
    }

    #[test]
    fn negative_stat_fields_clamp_to_zero() {
        let mut users = UserStats::new();
        parse_log(
            &lines(&["commit abc1 Alice", "-3\t-1\ta.rs", ""]),
            &identity(),
            &mut users,
            None,
        );
        assert_eq!(users.changes("Alice"), Changes::new(0, 0));
    }
}
