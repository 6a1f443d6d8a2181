use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub download: DownloadSettings,
    #[serde(default)]
    pub cover: CoverSettings,
    #[serde(default)]
    pub transcode: TranscodeSettings,
    #[serde(default)]
    pub timeouts: TimeoutSettings,
    #[serde(default)]
    pub proxy: ProxySettings,
    #[serde(default)]
    pub tools: ToolSettings,
    #[serde(default)]
    pub on_error: FailurePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSettings {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_temp_file_stem")]
    pub temp_file_stem: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverSettings {
    #[serde(default = "default_cover_size")]
    pub size: u32,
    /// Tried in order; `{video_id}` is substituted.
    #[serde(default = "default_thumbnail_urls")]
    pub thumbnail_urls: Vec<String>,
    #[serde(default = "default_true")]
    pub required: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscodeSettings {
    /// libvorbis `-q:a` value. `None` keeps the encoder default.
    #[serde(default)]
    pub vorbis_quality: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutSettings {
    #[serde(default = "default_http_secs")]
    pub http_secs: u64,
    #[serde(default = "default_resolve_secs")]
    pub resolve_secs: u64,
    #[serde(default = "default_long_secs")]
    pub download_secs: u64,
    #[serde(default = "default_long_secs")]
    pub transcode_secs: u64,
}

impl TimeoutSettings {
    pub fn http(&self) -> Duration {
        Duration::from_secs(self.http_secs)
    }

    pub fn resolve(&self) -> Duration {
        Duration::from_secs(self.resolve_secs)
    }

    pub fn download(&self) -> Duration {
        Duration::from_secs(self.download_secs)
    }

    pub fn transcode(&self) -> Duration {
        Duration::from_secs(self.transcode_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxySettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_proxy_type")]
    pub proxy_type: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl ProxySettings {
    pub fn url(&self) -> Option<String> {
        if !self.enabled || self.host.is_empty() {
            return None;
        }
        let scheme = match self.proxy_type.as_str() {
            "socks5" => "socks5",
            "https" => "https",
            _ => "http",
        };
        if !self.username.is_empty() {
            Some(format!(
                "{}://{}:{}@{}:{}",
                scheme, self.username, self.password, self.host, self.port
            ))
        } else {
            Some(format!("{}://{}:{}", scheme, self.host, self.port))
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
    #[serde(default)]
    pub extra_ytdlp_flags: Vec<String>,
}

/// What the prompt loop does after a failed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    #[default]
    Continue,
    Abort,
}

fn default_schema_version() -> u32 {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_temp_file_stem() -> String {
    "temp_audio".into()
}

fn default_cover_size() -> u32 {
    720
}

pub fn default_thumbnail_urls() -> Vec<String> {
    ["maxresdefault", "sddefault", "hqdefault"]
        .iter()
        .map(|name| format!("https://img.youtube.com/vi/{{video_id}}/{}.jpg", name))
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_http_secs() -> u64 {
    30
}

fn default_resolve_secs() -> u64 {
    120
}

fn default_long_secs() -> u64 {
    1800
}

fn default_proxy_type() -> String {
    "http".into()
}

fn default_proxy_port() -> u16 {
    8080
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            temp_file_stem: default_temp_file_stem(),
        }
    }
}

impl Default for CoverSettings {
    fn default() -> Self {
        Self {
            size: default_cover_size(),
            thumbnail_urls: default_thumbnail_urls(),
            required: true,
        }
    }
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            http_secs: default_http_secs(),
            resolve_secs: default_resolve_secs(),
            download_secs: default_long_secs(),
            transcode_secs: default_long_secs(),
        }
    }
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            proxy_type: default_proxy_type(),
            host: String::new(),
            port: default_proxy_port(),
            username: String::new(),
            password: String::new(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            download: DownloadSettings::default(),
            cover: CoverSettings::default(),
            transcode: TranscodeSettings::default(),
            timeouts: TimeoutSettings::default(),
            proxy: ProxySettings::default(),
            tools: ToolSettings::default(),
            on_error: FailurePolicy::default(),
        }
    }
}
