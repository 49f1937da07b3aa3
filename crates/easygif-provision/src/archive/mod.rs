//! Pulling known entries out of a buffered ZIP archive.
//!
//! This is not a ZIP reader. [`ArchiveScanner`] makes one forward pass over the
//! records, copying out the payloads of the entries it was asked for, and never
//! consults the central directory. That is enough because the wanted names are
//! fixed up front and central directory records never carry data.

mod record;
mod scanner;

pub use record::{
    ArchiveRecord, CompressionMethod, CENTRAL_DIRECTORY_SIG, DIGITAL_SIGNATURE_SIG,
    END_OF_CENTRAL_DIRECTORY_SIG, LOCAL_FILE_HEADER_SIG,
};
pub use scanner::{extract, ArchiveError, ArchiveScanner, RequiredEntry};
