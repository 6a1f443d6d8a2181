use std::path::{Path, PathBuf};

use ytogg_core::models::source::{AudioStream, SourceRecord};

#[derive(Debug, Clone)]
pub struct ResolvedMedia {
    pub record: SourceRecord,
    pub stream: AudioStream,
}

/// Owned handle to a transcoded file whose tags have not been written yet.
///
/// Not `Clone`: one run owns exactly one artifact. Tags only reach disk
/// through [`crate::core::tags::MetadataWriter::persist`].
#[derive(Debug)]
pub struct AudioArtifact {
    path: PathBuf,
}

impl AudioArtifact {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub video_id: String,
    pub output_folder: PathBuf,
    pub audio_path: PathBuf,
    pub thumb_path: Option<PathBuf>,
    pub cropped_path: Option<PathBuf>,
}
