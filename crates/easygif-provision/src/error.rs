use std::path::PathBuf;

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::codec::CodecError;
use crate::http::DownloadError;

#[derive(Error, Debug)]
pub enum Error {
    // Network errors
    #[error("Failed to download {what}: {source}")]
    Download {
        what: String,
        #[source]
        source: DownloadError,
    },

    // Archive errors
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    // Codec errors
    #[error("Invalid compression {what:?}: {source}")]
    Codec {
        what: String,
        #[source]
        source: CodecError,
    },

    // Filesystem errors
    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from:?} to {to:?}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Provisioning errors
    #[error("FFmpeg cannot be installed automatically on {platform}; put ffmpeg and ffprobe on PATH or in the binaries directory")]
    NotAutoProvisionable { platform: String },

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
