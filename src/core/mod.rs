pub mod cover;
pub mod dependencies;
pub mod error;
pub mod ffmpeg;
pub mod filename;
pub mod http_client;
pub mod pipeline;
pub mod process;
pub mod tags;
pub mod ytdlp;
