use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("not a YouTube video URL: {0}")]
    InvalidIdentifier(String),

    #[error("video unavailable: {0}")]
    Unavailable(String),

    #[error("no audio-only stream available")]
    NoAudioStream,

    #[error("video metadata is missing `{0}`")]
    MissingField(&'static str),

    #[error("yt-dlp failed: {0}")]
    Extractor(String),

    #[error("metadata lookup timed out after {0}s")]
    Timeout(u64),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("network error: {0}")]
    Network(String),

    #[error("transcode failed: {0}")]
    Transcode(String),

    #[error("cover image could not be decoded: {0}")]
    ImageDecode(#[source] image::ImageError),

    #[error("cover image could not be encoded: {0}")]
    ImageEncode(#[source] image::ImageError),

    #[error("failed to write tags to {path:?}: {source}")]
    TagWrite {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    #[error("{0} was not found; install it or set its path in settings.json")]
    MissingTool(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        PipelineError::Network(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
