use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{PipelineError, ResolutionError, Result};
use crate::core::process::{self, RunOutcome};

/// A located yt-dlp binary plus the flags every invocation shares.
#[derive(Debug, Clone)]
pub struct YtDlp {
    pub path: PathBuf,
    pub proxy: Option<String>,
    pub extra_flags: Vec<String>,
}

impl YtDlp {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            proxy: None,
            extra_flags: Vec::new(),
        }
    }

    fn common_args(&self) -> Vec<String> {
        let mut args = vec!["--no-warnings".to_string(), "--no-playlist".to_string()];
        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }
        args.extend(self.extra_flags.iter().cloned());
        args
    }

    pub fn info_args(&self, url: &str) -> Vec<String> {
        let mut args = vec!["--dump-json".to_string()];
        args.extend(self.common_args());
        args.push(url.to_string());
        args
    }

    pub fn download_args(&self, url: &str, format_id: &str, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            format_id.to_string(),
            "--no-part".to_string(),
            "--force-overwrites".to_string(),
        ];
        args.extend(self.common_args());
        args.extend([
            "-o".to_string(),
            escape_output_template(&output.to_string_lossy()),
            url.to_string(),
        ]);
        args
    }

    pub async fn get_video_info(&self, url: &str, limit: Duration) -> Result<serde_json::Value> {
        let args = self.info_args(url);
        tracing::debug!("yt-dlp {}", args.join(" "));

        let mut cmd = process::command(&self.path);
        cmd.args(&args);
        let output = match process::run_with_timeout(&mut cmd, limit).await {
            Ok(RunOutcome::Finished(output)) => output,
            Ok(RunOutcome::TimedOut) => {
                return Err(ResolutionError::Timeout(limit.as_secs()).into());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::MissingTool("yt-dlp"));
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr).into());
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            PipelineError::from(ResolutionError::Extractor(format!(
                "yt-dlp returned invalid JSON: {}",
                e
            )))
        })
    }

    /// Downloads one format to exactly `output`, replacing any existing file.
    pub async fn download_format(
        &self,
        url: &str,
        format_id: &str,
        output: &Path,
        limit: Duration,
    ) -> Result<PathBuf> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let args = self.download_args(url, format_id, output);
        tracing::debug!("yt-dlp {}", args.join(" "));

        let mut cmd = process::command(&self.path);
        cmd.args(&args);
        let output_result = match process::run_with_timeout(&mut cmd, limit).await {
            Ok(RunOutcome::Finished(out)) => out,
            Ok(RunOutcome::TimedOut) => {
                return Err(PipelineError::Network(format!(
                    "audio download timed out after {}s",
                    limit.as_secs()
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::MissingTool("yt-dlp"));
            }
            Err(e) => return Err(e.into()),
        };

        if !output_result.status.success() {
            return Err(PipelineError::Network(format!(
                "yt-dlp download failed: {}",
                process::stderr_summary(&output_result.stderr)
            )));
        }

        if !tokio::fs::try_exists(output).await.unwrap_or(false) {
            return Err(PipelineError::Network(format!(
                "yt-dlp reported success but {:?} was not written",
                output
            )));
        }

        Ok(output.to_path_buf())
    }
}

/// `-o` is an output template; a literal `%` in the path has to be doubled.
fn escape_output_template(path: &str) -> String {
    path.replace('%', "%%")
}

pub fn classify_failure(stderr: &str) -> ResolutionError {
    let summary = process::stderr_summary(stderr.as_bytes());
    let lower = stderr.to_lowercase();

    const UNAVAILABLE: &[&str] = &[
        "private video",
        "video unavailable",
        "sign in",
        "members-only",
        "this live event",
        "has been removed",
    ];
    const INVALID: &[&str] = &["unsupported url", "is not a valid url", "incomplete youtube id"];

    if INVALID.iter().any(|p| lower.contains(p)) {
        return ResolutionError::InvalidIdentifier(summary);
    }
    if UNAVAILABLE.iter().any(|p| lower.contains(p)) {
        return ResolutionError::Unavailable(summary);
    }
    ResolutionError::Extractor(summary)
}
