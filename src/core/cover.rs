use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::core::error::{PipelineError, Result};

pub const COVER_THUMB_FILE: &str = "cover_thumb.jpg";
pub const COVER_CROPPED_FILE: &str = "cover_cropped.jpg";

#[derive(Debug)]
pub struct Cover {
    pub image: DynamicImage,
    pub thumb_path: PathBuf,
    pub cropped_path: PathBuf,
}

pub struct CoverFetcher {
    client: reqwest::Client,
    url_templates: Vec<String>,
    size: u32,
}

pub fn thumbnail_url(template: &str, video_id: &str) -> String {
    template.replace("{video_id}", video_id)
}

/// Scales `img` to cover a `size`×`size` square and crops the overflow
/// evenly from both sides. Always returns exactly `size`×`size` RGB.
pub fn fit_square(img: &DynamicImage, size: u32) -> DynamicImage {
    let fitted = img.resize_to_fill(size, size, FilterType::Lanczos3);
    DynamicImage::ImageRgb8(fitted.to_rgb8())
}

pub fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .map_err(PipelineError::ImageEncode)?;
    Ok(buf)
}

impl CoverFetcher {
    pub fn new(client: reqwest::Client, url_templates: Vec<String>, size: u32) -> Self {
        Self {
            client,
            url_templates,
            size,
        }
    }

    /// GETs each candidate URL in order and returns the first successful body.
    async fn download_thumbnail(&self, video_id: &str) -> Result<Vec<u8>> {
        let mut last_failure = String::from("no thumbnail URL configured");

        for template in &self.url_templates {
            let url = thumbnail_url(template, video_id);
            let response = match self.client.get(&url).send().await {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("thumbnail request to {} failed: {}", url, e);
                    last_failure = format!("{}: {}", url, e);
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                tracing::debug!("thumbnail {} returned HTTP {}", url, status);
                last_failure = format!("{} returned HTTP {}", url, status);
                continue;
            }

            match response.bytes().await {
                Ok(bytes) => {
                    tracing::debug!("thumbnail {} ({} bytes)", url, bytes.len());
                    return Ok(bytes.to_vec());
                }
                Err(e) => {
                    tracing::warn!("reading thumbnail body from {} failed: {}", url, e);
                    last_failure = format!("{}: {}", url, e);
                }
            }
        }

        Err(PipelineError::Network(format!(
            "no thumbnail available: {}",
            last_failure
        )))
    }

    /// Saves the raw thumbnail and the square crop into `folder`.
    pub async fn fetch(&self, video_id: &str, folder: &Path) -> Result<Cover> {
        let bytes = self.download_thumbnail(video_id).await?;

        let thumb_path = folder.join(COVER_THUMB_FILE);
        tokio::fs::write(&thumb_path, &bytes).await?;

        let decoded = image::load_from_memory(&bytes).map_err(PipelineError::ImageDecode)?;
        let cropped = fit_square(&decoded, self.size);

        let cropped_path = folder.join(COVER_CROPPED_FILE);
        cropped
            .save_with_format(&cropped_path, ImageFormat::Jpeg)
            .map_err(PipelineError::ImageEncode)?;

        tracing::info!(
            "cover {}x{} -> {}x{} saved to {:?}",
            decoded.width(),
            decoded.height(),
            cropped.width(),
            cropped.height(),
            folder
        );

        Ok(Cover {
            image: cropped,
            thumb_path,
            cropped_path,
        })
    }
}
