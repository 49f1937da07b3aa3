//! Fixed-layout ZIP records, as seen by a forward scan.
//!
//! All integers are little-endian. Offsets below are relative to the record's
//! signature.

use super::ArchiveError;

pub const LOCAL_FILE_HEADER_SIG: u32 = 0x0403_4b50;
pub const CENTRAL_DIRECTORY_SIG: u32 = 0x0201_4b50;
pub const DIGITAL_SIGNATURE_SIG: u32 = 0x0505_4b50;
pub const END_OF_CENTRAL_DIRECTORY_SIG: u32 = 0x0605_4b50;
const ZIP64_END_OF_CENTRAL_DIRECTORY_SIG: u32 = 0x0606_4b50;
const ZIP64_END_LOCATOR_SIG: u32 = 0x0706_4b50;

const LOCAL_FILE_HEADER_LEN: usize = 30;
const CENTRAL_DIRECTORY_LEN: usize = 46;
const DIGITAL_SIGNATURE_LEN: usize = 6;

const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;
const ZIP64_MARKER: u32 = 0xffff_ffff;

/// Compression method of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Other(u16),
}

impl From<u16> for CompressionMethod {
    fn from(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            other => CompressionMethod::Other(other),
        }
    }
}

/// One record of the archive, borrowing from the scanned buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveRecord<'a> {
    /// Precedes an entry's payload, which is included here.
    LocalFile {
        name: &'a [u8],
        method: CompressionMethod,
        payload: &'a [u8],
        len: usize,
    },
    /// Metadata only; the payload lives with the local header.
    CentralDirectory { name: &'a [u8], len: usize },
    DigitalSignature { len: usize },
    /// Start of the trailing end-of-directory records.
    EndOfCentralDirectory,
}

impl<'a> ArchiveRecord<'a> {
    /// Parse the record starting at `offset`.
    pub fn parse(buf: &'a [u8], offset: usize) -> Result<Self, ArchiveError> {
        let fields = Fields { buf, offset };

        match fields.u32_at(0)? {
            LOCAL_FILE_HEADER_SIG => {
                let flags = fields.u16_at(6)?;
                let method = CompressionMethod::from(fields.u16_at(8)?);
                let compressed_size = fields.u32_at(18)?;
                let name_len = fields.u16_at(26)? as usize;
                let extra_len = fields.u16_at(28)? as usize;

                if compressed_size == ZIP64_MARKER {
                    return Err(ArchiveError::Unsupported {
                        offset,
                        reason: "ZIP64 entry sizes",
                    });
                }
                if flags & FLAG_DATA_DESCRIPTOR != 0 {
                    return Err(ArchiveError::Unsupported {
                        offset,
                        reason: "entry sizes stored in a trailing data descriptor",
                    });
                }

                let name = fields.span(LOCAL_FILE_HEADER_LEN, name_len)?;
                let payload_start = LOCAL_FILE_HEADER_LEN + name_len + extra_len;
                let payload = fields.span(payload_start, compressed_size as usize)?;

                Ok(ArchiveRecord::LocalFile {
                    name,
                    method,
                    payload,
                    len: payload_start + payload.len(),
                })
            }
            CENTRAL_DIRECTORY_SIG => {
                let name_len = fields.u16_at(28)? as usize;
                let extra_len = fields.u16_at(30)? as usize;
                let comment_len = fields.u16_at(32)? as usize;

                let name = fields.span(CENTRAL_DIRECTORY_LEN, name_len)?;
                let len = CENTRAL_DIRECTORY_LEN + name_len + extra_len + comment_len;
                fields.span(0, len)?;

                Ok(ArchiveRecord::CentralDirectory { name, len })
            }
            DIGITAL_SIGNATURE_SIG => {
                let data_len = fields.u16_at(4)? as usize;
                let len = DIGITAL_SIGNATURE_LEN + data_len;
                fields.span(0, len)?;

                Ok(ArchiveRecord::DigitalSignature { len })
            }
            END_OF_CENTRAL_DIRECTORY_SIG
            | ZIP64_END_OF_CENTRAL_DIRECTORY_SIG
            | ZIP64_END_LOCATOR_SIG => Ok(ArchiveRecord::EndOfCentralDirectory),
            signature => Err(ArchiveError::UnrecognizedSignature { offset, signature }),
        }
    }

    /// Bytes from the signature to the next record.
    ///
    /// Zero for the end-of-directory records, which stop the scan.
    pub fn len(&self) -> usize {
        match self {
            ArchiveRecord::LocalFile { len, .. }
            | ArchiveRecord::CentralDirectory { len, .. }
            | ArchiveRecord::DigitalSignature { len } => *len,
            ArchiveRecord::EndOfCentralDirectory => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounds-checked field access relative to a record start.
struct Fields<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Fields<'a> {
    fn span(&self, at: usize, len: usize) -> Result<&'a [u8], ArchiveError> {
        let truncated = || ArchiveError::Truncated {
            offset: self.offset,
        };

        let start = self.offset.checked_add(at).ok_or_else(truncated)?;
        let end = start.checked_add(len).ok_or_else(truncated)?;
        self.buf.get(start..end).ok_or_else(truncated)
    }

    fn u16_at(&self, at: usize) -> Result<u16, ArchiveError> {
        let bytes = self.span(at, 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn u32_at(&self, at: usize) -> Result<u32, ArchiveError> {
        let bytes = self.span(at, 4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
