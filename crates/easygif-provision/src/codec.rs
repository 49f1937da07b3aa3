//! Raw DEFLATE compression for sidecars and archive entries.
//!
//! Streams carry no header, trailer or checksum. Decoding insists on reaching the
//! final block, but a stream that is structurally valid and still corrupted
//! decodes to wrong bytes without any error.

use std::io::Write;

use flate2::write::DeflateEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use thiserror::Error;

const MIN_GROWTH: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Corrupt deflate stream: {0}")]
    Corrupt(#[from] flate2::DecompressError),

    #[error("Deflate stream ended after {consumed} of {len} bytes without a final block")]
    Truncated { consumed: usize, len: usize },

    #[error("Unsupported compression method {0}")]
    UnsupportedMethod(u16),

    #[error("Compression failed: {0}")]
    Compress(#[from] std::io::Error),
}

/// Compress `data` into a raw DEFLATE stream.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Inflate a complete raw DEFLATE stream held in memory.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut inflater = Decompress::new(false);
    let mut out = Vec::with_capacity(data.len().saturating_mul(3).max(MIN_GROWTH));

    loop {
        let consumed = inflater.total_in() as usize;
        let produced = inflater.total_out();

        if out.len() == out.capacity() {
            out.reserve(out.capacity().max(MIN_GROWTH));
        }

        let status = inflater.decompress_vec(&data[consumed..], &mut out, FlushDecompress::None)?;
        if status == Status::StreamEnd {
            return Ok(out);
        }

        let stalled = inflater.total_in() as usize == consumed && inflater.total_out() == produced;
        if stalled && out.len() < out.capacity() {
            return Err(CodecError::Truncated {
                consumed,
                len: data.len(),
            });
        }
    }
}
