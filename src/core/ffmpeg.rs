use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::error::{PipelineError, Result};
use crate::core::filename::file_name;
use crate::core::process::{self, RunOutcome};
use crate::models::media::AudioArtifact;

pub const OUTPUT_EXTENSION: &str = "ogg";

#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, input: &Path, folder: &Path, title: &str) -> Result<AudioArtifact>;
}

/// Computes `folder/<sanitized title>.ogg` and removes whatever is already
/// there, so re-running a video replaces its artifact instead of adding one.
pub async fn prepare_destination(folder: &Path, title: &str) -> Result<PathBuf> {
    let output = folder.join(file_name(title, OUTPUT_EXTENSION));

    match tokio::fs::remove_file(&output).await {
        Ok(()) => tracing::debug!("removed previous artifact {:?}", output),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    Ok(output)
}

pub struct FfmpegTranscoder {
    ffmpeg: PathBuf,
    quality: Option<f32>,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg: PathBuf, quality: Option<f32>, timeout: Duration) -> Self {
        Self {
            ffmpeg,
            quality,
            timeout,
        }
    }

    pub fn vorbis_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-map_metadata".to_string(),
            "-1".to_string(),
            "-c:a".to_string(),
            "libvorbis".to_string(),
        ];
        if let Some(q) = self.quality {
            args.push("-q:a".to_string());
            args.push(q.to_string());
        }
        args.push(output.to_string_lossy().to_string());
        args
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, folder: &Path, title: &str) -> Result<AudioArtifact> {
        let output = prepare_destination(folder, title).await?;
        let args = self.vorbis_args(input, &output);
        tracing::debug!("ffmpeg {}", args.join(" "));

        let mut cmd = process::command(&self.ffmpeg);
        cmd.args(&args);
        let result = match process::run_with_timeout(&mut cmd, self.timeout).await {
            Ok(RunOutcome::Finished(out)) => out,
            Ok(RunOutcome::TimedOut) => {
                return Err(PipelineError::Transcode(format!(
                    "ffmpeg timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::MissingTool("ffmpeg"));
            }
            Err(e) => return Err(e.into()),
        };

        if !result.status.success() {
            return Err(PipelineError::Transcode(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                process::stderr_summary(&result.stderr)
            )));
        }

        if !tokio::fs::try_exists(&output).await.unwrap_or(false) {
            return Err(PipelineError::Transcode(format!(
                "ffmpeg produced no output at {:?}",
                output
            )));
        }

        Ok(AudioArtifact::new(output))
    }
}
