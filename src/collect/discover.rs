use crate::collect::log::EXCLUDED_FILES;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name that marks a source tree.
pub const SRC_MARKER: &str = "src";

/// Walk a repository for files worth blaming.
///
/// A directory is entered when the walk is already beneath a `src`
/// directory, the directory itself is named `src`, or a `src` directory
/// sits within `lookahead` levels below it. Everything else is pruned, so
/// vendored trees and build output never get blamed. Files with excluded
/// names are skipped wherever they sit. Order is not significant.
pub fn blamable_files(root: &Path, lookahead: u32) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk(root, false, lookahead, &mut files);
    files
}

fn walk(path: &Path, inside_src: bool, lookahead: u32, files: &mut Vec<PathBuf>) {
    if path.is_dir() {
        let Ok(entries) = fs::read_dir(path) else {
            return;
        };
        for entry in entries.flatten() {
            let child = entry.path();
            let is_marker = entry.file_name() == SRC_MARKER;
            if inside_src || is_marker || has_src_child(&child, lookahead) {
                walk(&child, inside_src || is_marker, lookahead, files);
            }
        }
        return;
    }

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if EXCLUDED_FILES.is_match(name) {
        return;
    }
    files.push(path.to_path_buf());
}

fn has_src_child(path: &Path, depth: u32) -> bool {
    if depth == 0 {
        return false;
    }
    let Ok(entries) = fs::read_dir(path) else {
        return false;
    };
    for entry in entries.flatten() {
        if entry.file_name() == SRC_MARKER {
            return true;
        }
        if depth > 1 && entry.path().is_dir() && has_src_child(&entry.path(), depth - 1) {
            return true;
        }
    }
    false
}
