use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use ytogg_core::models::source::{AudioStream, SourceRecord};

use crate::core::error::{ResolutionError, Result};
use crate::core::ytdlp::YtDlp;
use crate::models::media::ResolvedMedia;
use crate::platforms::traits::MediaSource;

pub struct YouTubeSource {
    ytdlp: YtDlp,
    resolve_timeout: Duration,
    download_timeout: Duration,
}

impl YouTubeSource {
    pub fn new(ytdlp: YtDlp, resolve_timeout: Duration, download_timeout: Duration) -> Self {
        Self {
            ytdlp,
            resolve_timeout,
            download_timeout,
        }
    }

    pub fn is_youtube_host(host: &str) -> bool {
        let host = host.to_lowercase();
        host == "youtube.com"
            || host.ends_with(".youtube.com")
            || host == "youtu.be"
            || host == "youtube-nocookie.com"
            || host.ends_with(".youtube-nocookie.com")
    }

    pub fn extract_video_id(url: &str) -> Option<String> {
        let parsed = url::Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_lowercase();
        if !Self::is_youtube_host(&host) {
            return None;
        }

        let segments: Vec<&str> = parsed.path().split('/').filter(|s| !s.is_empty()).collect();

        let id = if host == "youtu.be" {
            segments.first().map(|s| s.to_string())
        } else {
            match segments.first() {
                Some(&"shorts") | Some(&"embed") | Some(&"live") => {
                    segments.get(1).map(|s| s.to_string())
                }
                _ => parsed
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.to_string()),
            }
        };

        id.filter(|id| !id.is_empty())
    }

    fn str_field<'a>(json: &'a serde_json::Value, key: &str) -> Option<&'a str> {
        json.get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn publish_year(json: &serde_json::Value) -> Option<i32> {
        if let Some(date) = Self::str_field(json, "upload_date") {
            if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y%m%d") {
                return Some(parsed.year());
            }
        }
        if let Some(year) = json.get("release_year").and_then(|v| v.as_i64()) {
            return i32::try_from(year).ok();
        }
        json.get("timestamp")
            .and_then(|v| v.as_i64())
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .map(|dt| dt.year())
    }

    /// Best audio-only format by average bitrate.
    pub fn select_audio_stream(json: &serde_json::Value) -> Option<AudioStream> {
        let formats = json.get("formats")?.as_array()?;

        formats
            .iter()
            .filter_map(|f| {
                let format_id = f.get("format_id")?.as_str()?.to_string();
                let vcodec = f.get("vcodec").and_then(|v| v.as_str()).unwrap_or("none");
                let acodec = f.get("acodec").and_then(|v| v.as_str()).unwrap_or("none");
                if vcodec != "none" || acodec == "none" {
                    return None;
                }
                Some(AudioStream {
                    format_id,
                    ext: f
                        .get("ext")
                        .and_then(|v| v.as_str())
                        .unwrap_or("m4a")
                        .to_string(),
                    acodec: acodec.to_string(),
                    abr: f
                        .get("abr")
                        .or_else(|| f.get("tbr"))
                        .and_then(|v| v.as_f64()),
                    filesize: f
                        .get("filesize")
                        .or_else(|| f.get("filesize_approx"))
                        .and_then(|v| v.as_u64()),
                })
            })
            .max_by(|a, b| {
                a.abr
                    .unwrap_or(0.0)
                    .partial_cmp(&b.abr.unwrap_or(0.0))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    pub fn parse_video_info(url: &str, json: &serde_json::Value) -> Result<ResolvedMedia> {
        if json.get("is_live").and_then(|v| v.as_bool()).unwrap_or(false) {
            return Err(
                ResolutionError::Unavailable("livestreams are not supported".into()).into(),
            );
        }

        let video_id = Self::str_field(json, "id").ok_or(ResolutionError::MissingField("id"))?;
        let title = Self::str_field(json, "title").ok_or(ResolutionError::MissingField("title"))?;
        let author = Self::str_field(json, "uploader")
            .or_else(|| Self::str_field(json, "channel"))
            .ok_or(ResolutionError::MissingField("uploader"))?;
        let year = Self::publish_year(json).ok_or(ResolutionError::MissingField("upload_date"))?;
        let description = json
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        let stream = Self::select_audio_stream(json).ok_or(ResolutionError::NoAudioStream)?;

        Ok(ResolvedMedia {
            record: SourceRecord {
                url: url.to_string(),
                video_id: video_id.to_string(),
                title: title.to_string(),
                author: author.to_string(),
                year,
                description,
            },
            stream,
        })
    }
}

#[async_trait]
impl MediaSource for YouTubeSource {
    fn name(&self) -> &str {
        "youtube"
    }

    fn can_handle(&self, url: &str) -> bool {
        Self::extract_video_id(url).is_some()
    }

    async fn resolve(&self, url: &str) -> Result<ResolvedMedia> {
        if !self.can_handle(url) {
            return Err(ResolutionError::InvalidIdentifier(url.to_string()).into());
        }

        let json = self.ytdlp.get_video_info(url, self.resolve_timeout).await?;
        let media = Self::parse_video_info(url, &json)?;
        tracing::info!(
            "resolved {} -> {:?} by {:?} ({}), stream {} {} {:?}kbps",
            media.record.video_id,
            media.record.title,
            media.record.author,
            media.record.year,
            media.stream.format_id,
            media.stream.acodec,
            media.stream.abr
        );
        Ok(media)
    }

    async fn download_audio(&self, media: &ResolvedMedia, dest: &Path) -> Result<PathBuf> {
        self.ytdlp
            .download_format(
                &media.record.url,
                &media.stream.format_id,
                dest,
                self.download_timeout,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PipelineError;
    use serde_json::json;

    fn sample_json() -> serde_json::Value {
        json!({
            "id": "abc123XYZ",
            "title": "Example Song",
            "uploader": "Example Artist",
            "channel": "Example Channel",
            "upload_date": "20200314",
            "description": "Official audio",
            "is_live": false,
            "formats": [
                {"format_id": "139", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.5", "abr": 48.0},
                {"format_id": "251", "ext": "webm", "vcodec": "none", "acodec": "opus", "abr": 160.0, "filesize": 4000000},
                {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2", "abr": 129.5},
                {"format_id": "18", "ext": "mp4", "vcodec": "avc1", "acodec": "mp4a.40.2", "tbr": 600.0},
                {"format_id": "137", "ext": "mp4", "vcodec": "avc1", "acodec": "none", "tbr": 4000.0}
            ]
        })
    }

    #[test]
    fn extract_id_variants() {
        let cases = [
            ("https://www.youtube.com/watch?v=abc123XYZ", "abc123XYZ"),
            ("https://youtube.com/watch?v=abc123XYZ&list=PL1", "abc123XYZ"),
            ("https://youtu.be/abc123XYZ?t=3", "abc123XYZ"),
            ("https://www.youtube.com/shorts/abc123XYZ", "abc123XYZ"),
            ("https://www.youtube.com/embed/abc123XYZ", "abc123XYZ"),
            ("https://music.youtube.com/watch?v=abc123XYZ", "abc123XYZ"),
            ("https://www.youtube-nocookie.com/embed/abc123XYZ", "abc123XYZ"),
        ];
        for (url, id) in cases {
            assert_eq!(YouTubeSource::extract_video_id(url).as_deref(), Some(id), "{}", url);
        }
    }

    #[test]
    fn extract_id_rejects_non_video_urls() {
        assert_eq!(YouTubeSource::extract_video_id("https://vimeo.com/123"), None);
        assert_eq!(YouTubeSource::extract_video_id("not a url"), None);
        assert_eq!(
            YouTubeSource::extract_video_id("https://www.youtube.com/playlist?list=PL123"),
            None
        );
        assert_eq!(YouTubeSource::extract_video_id("https://www.youtube.com/watch?v="), None);
        assert_eq!(YouTubeSource::extract_video_id("https://notyoutube.com/watch?v=abc"), None);
    }

    #[test]
    fn parse_video_info_fields() {
        let media = YouTubeSource::parse_video_info("https://youtu.be/abc123XYZ", &sample_json()).unwrap();
        assert_eq!(media.record.video_id, "abc123XYZ");
        assert_eq!(media.record.title, "Example Song");
        assert_eq!(media.record.author, "Example Artist");
        assert_eq!(media.record.year, 2020);
        assert_eq!(media.record.description, "Official audio");
        assert_eq!(media.record.url, "https://youtu.be/abc123XYZ");
    }

    #[test]
    fn selects_highest_bitrate_audio_only() {
        let stream = YouTubeSource::select_audio_stream(&sample_json()).unwrap();
        assert_eq!(stream.format_id, "251");
        assert_eq!(stream.ext, "webm");
        assert_eq!(stream.filesize, Some(4000000));
    }

    #[test]
    fn no_audio_only_stream_is_an_error() {
        let mut json = sample_json();
        json["formats"] = json!([
            {"format_id": "18", "ext": "mp4", "vcodec": "avc1", "acodec": "mp4a.40.2"}
        ]);
        let err = YouTubeSource::parse_video_info("u", &json).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Resolution(ResolutionError::NoAudioStream)
        ));
    }

    #[test]
    fn author_falls_back_to_channel() {
        let mut json = sample_json();
        json.as_object_mut().unwrap().remove("uploader");
        let media = YouTubeSource::parse_video_info("u", &json).unwrap();
        assert_eq!(media.record.author, "Example Channel");
    }

    #[test]
    fn year_falls_back_to_timestamp() {
        let mut json = sample_json();
        json.as_object_mut().unwrap().remove("upload_date");
        json["timestamp"] = json!(1_577_836_800i64);
        let media = YouTubeSource::parse_video_info("u", &json).unwrap();
        assert_eq!(media.record.year, 2020);
    }

    #[test]
    fn missing_description_is_empty() {
        let mut json = sample_json();
        json.as_object_mut().unwrap().remove("description");
        let media = YouTubeSource::parse_video_info("u", &json).unwrap();
        assert_eq!(media.record.description, "");
    }

    #[test]
    fn missing_title_is_an_error() {
        let mut json = sample_json();
        json.as_object_mut().unwrap().remove("title");
        let err = YouTubeSource::parse_video_info("u", &json).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Resolution(ResolutionError::MissingField("title"))
        ));
    }

    #[test]
    fn livestreams_rejected() {
        let mut json = sample_json();
        json["is_live"] = json!(true);
        let err = YouTubeSource::parse_video_info("u", &json).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Resolution(ResolutionError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn resolve_rejects_invalid_identifier_without_spawning() {
        let source = YouTubeSource::new(
            YtDlp::new(PathBuf::from("ytogg-no-such-ytdlp")),
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        let err = source.resolve("https://example.com/watch?v=abc").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Resolution(ResolutionError::InvalidIdentifier(_))
        ));
    }
}
