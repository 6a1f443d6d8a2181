use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::core::error::Result;
use crate::models::media::ResolvedMedia;

#[async_trait]
pub trait MediaSource: Send + Sync {
    fn name(&self) -> &str;
    fn can_handle(&self, url: &str) -> bool;
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia>;
    /// Writes the resolved audio stream to `dest`, overwriting it.
    async fn download_audio(&self, media: &ResolvedMedia, dest: &Path) -> Result<PathBuf>;
}
