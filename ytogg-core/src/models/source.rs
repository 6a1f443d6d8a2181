use serde::{Deserialize, Serialize};

/// Metadata of one resolved video. Immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub url: String,
    pub video_id: String,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub description: String,
}

/// An audio-only delivery variant picked from the platform's format list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStream {
    pub format_id: String,
    pub ext: String,
    pub acodec: String,
    pub abr: Option<f64>,
    pub filesize: Option<u64>,
}
