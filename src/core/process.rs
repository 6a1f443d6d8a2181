use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use ytogg_core::fs_paths::{AppPaths, DesktopPaths};

fn enhanced_path(bin_dir: &Path) -> String {
    let sep = if cfg!(windows) { ";" } else { ":" };
    let current = std::env::var("PATH").unwrap_or_default();
    format!("{}{}{}", bin_dir.display(), sep, current)
}

/// Child process with piped output that dies with its handle, so a timed-out
/// `wait` never leaves it running.
pub fn command<S: AsRef<OsStr>>(program: S) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(program);
    #[cfg(target_os = "windows")]
    cmd.creation_flags(0x08000000);
    cmd.env("PATH", enhanced_path(&DesktopPaths.bin_dir()));
    cmd.env("PYTHONIOENCODING", "utf-8");
    cmd.env("PYTHONUTF8", "1");
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

pub enum RunOutcome {
    Finished(std::process::Output),
    TimedOut,
}

pub async fn run_with_timeout(
    cmd: &mut tokio::process::Command,
    limit: Duration,
) -> std::io::Result<RunOutcome> {
    match tokio::time::timeout(limit, cmd.output()).await {
        Ok(output) => Ok(RunOutcome::Finished(output?)),
        Err(_) => Ok(RunOutcome::TimedOut),
    }
}

/// Last non-empty stderr line, which is where yt-dlp and ffmpeg put the reason.
pub fn stderr_summary(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    text.lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("no error output")
        .to_string()
}
