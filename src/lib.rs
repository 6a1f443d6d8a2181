use std::io::{BufRead, Write};

use anyhow::Context;
use ytogg_core::fs_paths::{AppPaths, DesktopPaths};
use ytogg_core::models::settings::FailurePolicy;

pub mod core;
pub mod models;
pub mod platforms;
pub mod storage;

use crate::core::pipeline::Pipeline;

pub const PROMPT: &str = "Enter YouTube URL: ";

/// Reads identifiers from `input` until EOF, running each one through the
/// pipeline. Returns how many runs succeeded.
pub fn prompt_loop<R: BufRead, W: Write>(
    runtime: &tokio::runtime::Runtime,
    pipeline: &Pipeline,
    policy: FailurePolicy,
    mut input: R,
    mut out: W,
) -> anyhow::Result<usize> {
    let mut succeeded = 0;

    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(succeeded);
        }
        let url = line.trim();
        if url.is_empty() {
            continue;
        }

        match runtime.block_on(pipeline.run_once(url)) {
            Ok(report) => {
                succeeded += 1;
                writeln!(out, "All files saved to: {}", report.output_folder.display())?;
            }
            Err(e) => {
                tracing::error!("run for {} failed: {}", url, e);
                if policy == FailurePolicy::Abort {
                    return Err(e).with_context(|| format!("processing {}", url));
                }
                writeln!(out, "Failed: {}", e)?;
            }
        }
        writeln!(out, "\n")?;
    }
}

pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let paths = DesktopPaths;
    let settings = storage::config::load_settings(&paths);
    if !paths.settings_file().exists() {
        if let Err(e) = storage::config::save_settings(&paths, &settings) {
            tracing::warn!("could not write default settings: {:#}", e);
        }
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    let pipeline = runtime
        .block_on(Pipeline::from_settings(&settings))
        .context("setting up the download pipeline")?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    prompt_loop(&runtime, &pipeline, settings.on_error, stdin.lock(), stdout.lock())?;
    Ok(())
}
