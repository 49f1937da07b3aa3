//! Single-pass extraction of named entries.

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use super::record::{ArchiveRecord, CompressionMethod};
use crate::codec::{self, CodecError};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Invalid signature 0x{signature:08X} at offset 0x{offset:X}")]
    UnrecognizedSignature { offset: usize, signature: u32 },

    #[error("Malformed archive: record at offset 0x{offset:X} runs past the end of the data")]
    Truncated { offset: usize },

    #[error("Unsupported archive layout at offset 0x{offset:X}: {reason}")]
    Unsupported { offset: usize, reason: &'static str },

    #[error("Required files are not found: {}", missing.join(", "))]
    MissingRequiredEntries { missing: Vec<String> },
}

/// A wanted entry's compressed payload, copied out of the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredEntry {
    pub name: String,
    pub method: CompressionMethod,
    pub compressed: Vec<u8>,
}

impl RequiredEntry {
    /// Last path component of the entry name.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Decompress the payload according to the entry's method.
    pub fn decode(&self) -> Result<Vec<u8>, CodecError> {
        match self.method {
            CompressionMethod::Deflate => codec::decompress(&self.compressed),
            CompressionMethod::Stored => Ok(self.compressed.clone()),
            CompressionMethod::Other(method) => Err(CodecError::UnsupportedMethod(method)),
        }
    }
}

/// Extracts a fixed set of entries from an in-memory archive.
#[derive(Debug, Clone)]
pub struct ArchiveScanner {
    wanted: IndexSet<String>,
}

impl ArchiveScanner {
    pub fn new<I, S>(wanted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            wanted: wanted.into_iter().map(Into::into).collect(),
        }
    }

    pub fn wanted(&self) -> impl Iterator<Item = &str> {
        self.wanted.iter().map(String::as_str)
    }

    /// Scan `archive` from the first byte, returning every wanted entry keyed by
    /// its full name in the order found.
    pub fn extract(&self, archive: &[u8]) -> Result<IndexMap<String, RequiredEntry>, ArchiveError> {
        let mut found: IndexMap<String, RequiredEntry> = IndexMap::new();
        let mut offset = 0;

        while offset < archive.len() {
            let record = ArchiveRecord::parse(archive, offset)?;

            match &record {
                ArchiveRecord::LocalFile {
                    name,
                    method,
                    payload,
                    ..
                } => {
                    if let Some(name) = self.match_name(name) {
                        if found.contains_key(name) {
                            log::debug!("Ignoring duplicate entry {} at 0x{:X}", name, offset);
                        } else {
                            log::debug!(
                                "Found {} at 0x{:X} ({} bytes, {:?})",
                                name,
                                offset,
                                payload.len(),
                                method
                            );
                            found.insert(
                                name.to_string(),
                                RequiredEntry {
                                    name: name.to_string(),
                                    method: *method,
                                    compressed: payload.to_vec(),
                                },
                            );
                        }
                    }
                }
                ArchiveRecord::EndOfCentralDirectory => break,
                ArchiveRecord::CentralDirectory { .. } | ArchiveRecord::DigitalSignature { .. } => {}
            }

            offset += record.len();
        }

        if found.len() < self.wanted.len() {
            let missing = self
                .wanted
                .iter()
                .filter(|name| !found.contains_key(name.as_str()))
                .cloned()
                .collect();
            return Err(ArchiveError::MissingRequiredEntries { missing });
        }

        Ok(found)
    }

    fn match_name(&self, raw: &[u8]) -> Option<&str> {
        let name = std::str::from_utf8(raw).ok()?;
        self.wanted.get(name).map(String::as_str)
    }
}

/// Convenience wrapper around [`ArchiveScanner::extract`].
pub fn extract(archive: &[u8], wanted: &[&str]) -> Result<IndexMap<String, RequiredEntry>, ArchiveError> {
    ArchiveScanner::new(wanted.iter().copied()).extract(archive)
}
