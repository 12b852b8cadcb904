use std::path::Path;
use std::process::Command;

/// Run a shell command in `dir` and return its output as ordered lines.
///
/// stdout and stderr are merged. A command that cannot be spawned yields a
/// single `ERROR:` marker line instead of an error; downstream parsers
/// treat unrecognized lines as noise. The final empty line is the sentinel
/// that flushes any pending record in the log parser.
pub fn run_command(dir: &Path, command: &str) -> Vec<String> {
    let mut lines = Vec::new();

    #[cfg(windows)]
    let result = Command::new("cmd.exe").args(["/c", command]).current_dir(dir).output();
    #[cfg(not(windows))]
    let result = Command::new("sh").args(["-c", command]).current_dir(dir).output();

    match result {
        Ok(output) => {
            lines.extend(String::from_utf8_lossy(&output.stdout).lines().map(str::to_owned));
            lines.extend(String::from_utf8_lossy(&output.stderr).lines().map(str::to_owned));
        }
        Err(err) => lines.push(format!("ERROR: {err}")),
    }

    lines.push(String::new());
    lines
}

pub fn is_git_repository(path: &Path) -> bool {
    path.join(".git").exists()
}
