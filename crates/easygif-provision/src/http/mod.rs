//! Fetching release assets over HTTP.

mod config;
mod downloader;

pub use config::DownloadConfig;
pub use downloader::{DownloadError, Downloader, FailureKind, OCTET_STREAM};
