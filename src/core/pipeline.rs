use std::path::{Path, PathBuf};

use ytogg_core::models::settings::AppSettings;

use crate::core::cover::{Cover, CoverFetcher};
use crate::core::dependencies::resolve_tool;
use crate::core::error::Result;
use crate::core::ffmpeg::{FfmpegTranscoder, Transcoder};
use crate::core::filename::{audio_file_stem, output_folder_name};
use crate::core::http_client::build_client;
use crate::core::tags::{MetadataWriter, TagSet, VorbisCommentWriter};
use crate::core::ytdlp::YtDlp;
use crate::models::media::RunReport;
use crate::platforms::traits::MediaSource;
use crate::platforms::youtube::YouTubeSource;

/// Runs one identifier through resolve → download → transcode → cover →
/// tags → cleanup. Holds no per-run state, so `run_once` can be called
/// repeatedly.
pub struct Pipeline {
    output_root: PathBuf,
    temp_file_stem: String,
    cover_required: bool,
    source: Box<dyn MediaSource>,
    transcoder: Box<dyn Transcoder>,
    writer: Box<dyn MetadataWriter>,
    covers: CoverFetcher,
}

impl Pipeline {
    pub fn new(
        settings: &AppSettings,
        source: Box<dyn MediaSource>,
        transcoder: Box<dyn Transcoder>,
        writer: Box<dyn MetadataWriter>,
        covers: CoverFetcher,
    ) -> Self {
        Self {
            output_root: settings.download.output_dir.clone(),
            temp_file_stem: settings.download.temp_file_stem.clone(),
            cover_required: settings.cover.required,
            source,
            transcoder,
            writer,
            covers,
        }
    }

    /// Locates yt-dlp and ffmpeg and wires the production collaborators.
    pub async fn from_settings(settings: &AppSettings) -> Result<Self> {
        let ytdlp_path = resolve_tool("yt-dlp", settings.tools.ytdlp_path.as_deref()).await?;
        let ffmpeg_path = resolve_tool("ffmpeg", settings.tools.ffmpeg_path.as_deref()).await?;
        tracing::info!("using yt-dlp at {:?}, ffmpeg at {:?}", ytdlp_path, ffmpeg_path);

        let mut ytdlp = YtDlp::new(ytdlp_path);
        ytdlp.proxy = settings.proxy.url();
        ytdlp.extra_flags = settings.tools.extra_ytdlp_flags.clone();

        let source = YouTubeSource::new(
            ytdlp,
            settings.timeouts.resolve(),
            settings.timeouts.download(),
        );
        let transcoder = FfmpegTranscoder::new(
            ffmpeg_path,
            settings.transcode.vorbis_quality,
            settings.timeouts.transcode(),
        );
        let client = build_client(settings.timeouts.http(), &settings.proxy)?;
        let covers = CoverFetcher::new(
            client,
            settings.cover.thumbnail_urls.clone(),
            settings.cover.size,
        );

        Ok(Self::new(
            settings,
            Box::new(source),
            Box::new(transcoder),
            Box::new(VorbisCommentWriter),
            covers,
        ))
    }

    fn temp_path(&self, ext: &str) -> PathBuf {
        self.output_root
            .join(format!("{}.{}", self.temp_file_stem, ext))
    }

    async fn fetch_cover(&self, video_id: &str, folder: &Path) -> Result<Option<Cover>> {
        match self.covers.fetch(video_id, folder).await {
            Ok(cover) => Ok(Some(cover)),
            Err(e) if !self.cover_required => {
                tracing::warn!("continuing without cover art: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn run_once(&self, url: &str) -> Result<RunReport> {
        let url = url.trim();
        tracing::info!("[{}] resolving {}", self.source.name(), url);
        let media = self.source.resolve(url).await?;
        let record = &media.record;

        let folder = self
            .output_root
            .join(output_folder_name(&record.author, &record.title, record.year));
        tokio::fs::create_dir_all(&folder).await?;
        tracing::info!("output folder {:?}", folder);

        let temp = self.temp_path(&media.stream.ext);
        let downloaded = self.source.download_audio(&media, &temp).await?;
        tracing::info!("downloaded audio stream {} to {:?}", media.stream.format_id, downloaded);

        let title = audio_file_stem(&record.author, &record.title);
        let artifact = self.transcoder.transcode(&downloaded, &folder, &title).await?;
        tracing::info!("transcoded to {:?}", artifact.path());

        let cover = self.fetch_cover(&record.video_id, &folder).await?;

        let tags = TagSet::for_source(record, cover.as_ref().map(|c| &c.image))?;
        self.writer.persist(&artifact, &tags)?;

        if let Err(e) = tokio::fs::remove_file(&downloaded).await {
            tracing::warn!("could not remove temporary file {:?}: {}", downloaded, e);
        }

        let (thumb_path, cropped_path) = match cover {
            Some(c) => (Some(c.thumb_path), Some(c.cropped_path)),
            None => (None, None),
        };

        Ok(RunReport {
            video_id: record.video_id.clone(),
            output_folder: folder,
            audio_path: artifact.into_path(),
            thumb_path,
            cropped_path,
        })
    }
}
