//! Build-time packaging of native artifacts.
//!
//! The freshly built artifact is copied into place and a compressed `.dfl`
//! sidecar is written next to it. The sidecar is what gets attached to a
//! release and later fetched by the installer.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::{Error, Result};

pub const SIDECAR_EXTENSION: &str = "dfl";

/// Result of packaging one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedArtifact {
    pub artifact: PathBuf,
    pub sidecar: PathBuf,
    pub raw_len: u64,
    pub compressed_len: u64,
}

impl PackagedArtifact {
    /// Compressed size as a fraction of the raw size.
    pub fn ratio(&self) -> f64 {
        if self.raw_len == 0 {
            return 1.0;
        }
        self.compressed_len as f64 / self.raw_len as f64
    }
}

/// `dst` with `.dfl` appended to the full file name.
pub fn sidecar_path(dst: &Path) -> PathBuf {
    let mut name = OsString::from(dst.as_os_str());
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    PathBuf::from(name)
}

/// Copy `src` to `dst` and write `dst.dfl` holding its raw-DEFLATE encoding.
///
/// Parent directories of `dst` are created as needed.
pub fn package(src: &Path, dst: &Path) -> Result<PackagedArtifact> {
    if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::copy(src, dst).map_err(|source| Error::Copy {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    })?;
    log::debug!("Copied {} to {}", src.display(), dst.display());

    let raw = fs::read(dst).map_err(|source| Error::Read {
        path: dst.to_path_buf(),
        source,
    })?;
    let compressed = codec::compress(&raw).map_err(|source| Error::Codec {
        what: dst.display().to_string(),
        source,
    })?;

    let sidecar = sidecar_path(dst);
    fs::write(&sidecar, &compressed).map_err(|source| Error::Write {
        path: sidecar.clone(),
        source,
    })?;
    log::debug!(
        "Wrote {} ({} -> {} bytes)",
        sidecar.display(),
        raw.len(),
        compressed.len()
    );

    Ok(PackagedArtifact {
        artifact: dst.to_path_buf(),
        sidecar,
        raw_len: raw.len() as u64,
        compressed_len: compressed.len() as u64,
    })
}
