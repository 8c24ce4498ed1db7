//! Deflate codec
//!
//! zlib-wrapped deflate, the stream format every compressed file written by
//! this store uses (whole documents and individual values alike).

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};

use crate::error::{EmError, Result};

/// Compress bytes
pub fn deflate(input: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(input.len() / 2 + 16), Compression::default());
    encoder.write_all(input)?;
    Ok(encoder.finish()?)
}

/// Decompress bytes
///
/// Invalid and truncated streams are format errors, not I/O errors. Bytes
/// after the end of the stream are ignored.
pub fn inflate(input: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Decompress::new(true);
    let mut out = Vec::with_capacity(input.len().saturating_mul(2).max(64));

    loop {
        if out.len() == out.capacity() {
            out.reserve(out.capacity());
        }

        let before = (inflater.total_in(), inflater.total_out());
        let remaining = &input[inflater.total_in() as usize..];
        let status = inflater
            .decompress_vec(remaining, &mut out, FlushDecompress::None)
            .map_err(|e| EmError::Format(format!("Inflate failed: {}", e)))?;

        if status == Status::StreamEnd {
            return Ok(out);
        }
        // No progress with output space left: input ran out mid-stream
        if (inflater.total_in(), inflater.total_out()) == before {
            return Err(EmError::Format("Inflate failed: truncated stream".to_string()));
        }
    }
}
