use std::path::{Path, PathBuf};
use std::process::Stdio;

use ytogg_core::fs_paths::{AppPaths, DesktopPaths};

use crate::core::error::{PipelineError, Result};

fn bin_name(tool: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("{}.exe", tool)
    } else {
        tool.to_string()
    }
}

fn version_flag_for(tool: &str) -> &'static str {
    match tool {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    }
}

async fn responds_to_version(program: &Path, tool: &str) -> bool {
    crate::core::process::command(program)
        .arg(version_flag_for(tool))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Looks for `tool` on PATH, then in the managed bin dir.
pub async fn find_tool(tool: &str) -> Option<PathBuf> {
    let started = std::time::Instant::now();
    let name = bin_name(tool);

    let found = if responds_to_version(Path::new(&name), tool).await {
        Some(PathBuf::from(&name))
    } else {
        let managed = DesktopPaths.bin_dir().join(&name);
        managed.exists().then_some(managed)
    };

    tracing::debug!("find_tool({}) took {:?}: {:?}", tool, started.elapsed(), found);
    found
}

/// Uses `configured` when set, otherwise searches like [`find_tool`].
pub async fn resolve_tool(tool: &'static str, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() || responds_to_version(path, tool).await {
            return Ok(path.to_path_buf());
        }
        tracing::warn!("configured {} path {:?} is not usable, searching PATH", tool, path);
    }
    find_tool(tool).await.ok_or(PipelineError::MissingTool(tool))
}
