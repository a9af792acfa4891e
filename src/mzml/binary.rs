//! Binary data decoding for mzML
//!
//! mzML stores numerical arrays (m/z, intensity) as Base64-encoded binary data,
//! optionally compressed with zlib. This module handles the decoding pipeline:
//!
//! 1. Base64 decode the text
//! 2. Decompress if needed (zlib)
//! 3. Interpret bytes as float32 or float64 (little-endian)

use std::io::Read;

use base64::prelude::*;
use byteorder::{ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;

use super::cv_params::accessions;

/// Compression types used in mzML binary data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionType {
    /// No compression (raw binary)
    #[default]
    None,
    /// zlib compression (most common)
    Zlib,
    /// Any MS-Numpress variant
    Numpress,
}

impl CompressionType {
    /// Determine compression type from CV accession
    pub fn from_cv_accession(accession: &str) -> Option<Self> {
        match accession {
            accessions::ZLIB_COMPRESSION => Some(CompressionType::Zlib),
            accessions::NO_COMPRESSION => Some(CompressionType::None),
            accessions::NUMPRESS_LINEAR
            | accessions::NUMPRESS_PIC
            | accessions::NUMPRESS_SLOF => Some(CompressionType::Numpress),
            _ => None,
        }
    }
}

/// Binary encoding precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryEncoding {
    /// 32-bit floating point (CV: MS:1000521)
    Float32,
    /// 64-bit floating point (CV: MS:1000523)
    #[default]
    Float64,
}

impl BinaryEncoding {
    /// Determine encoding from CV accession
    pub fn from_cv_accession(accession: &str) -> Option<Self> {
        match accession {
            accessions::FLOAT_32_BIT => Some(BinaryEncoding::Float32),
            accessions::FLOAT_64_BIT => Some(BinaryEncoding::Float64),
            _ => None,
        }
    }

    /// Get the byte size per value
    pub fn byte_size(&self) -> usize {
        match self {
            BinaryEncoding::Float32 => 4,
            BinaryEncoding::Float64 => 8,
        }
    }
}

/// Errors that can occur during binary decoding
#[derive(Debug, thiserror::Error)]
pub enum BinaryDecodeError {
    /// The `<binary>` text is not valid Base64
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// zlib stream could not be inflated
    #[error("Decompression error: {0}")]
    DecompressionError(#[from] std::io::Error),

    /// Decoded value count disagrees with the declared array length
    #[error("Invalid data length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected number of values or bytes
        expected: usize,
        /// Actual number of values or bytes
        actual: usize,
    },

    /// Compression scheme that this reader does not implement
    #[error("Unsupported compression: {0:?}")]
    UnsupportedCompression(CompressionType),
}

/// Decoder for mzML binary data arrays
pub struct BinaryDecoder;

impl BinaryDecoder {
    /// Decode the text of a `<binary>` element into f64 values.
    ///
    /// `expected_length` is the spectrum's `defaultArrayLength`; a decoded
    /// array of any other length is rejected. Blank text decodes to an empty
    /// array without a length check.
    pub fn decode(
        base64_data: &str,
        encoding: BinaryEncoding,
        compression: CompressionType,
        expected_length: Option<usize>,
    ) -> Result<Vec<f64>, BinaryDecodeError> {
        let text = base64_data.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let raw = BASE64_STANDARD.decode(text)?;
        let bytes = Self::inflate(raw, compression)?;
        let values = Self::read_floats(&bytes, encoding)?;

        match expected_length {
            Some(expected) if expected != values.len() => Err(BinaryDecodeError::InvalidLength {
                expected,
                actual: values.len(),
            }),
            _ => Ok(values),
        }
    }

    fn inflate(raw: Vec<u8>, compression: CompressionType) -> Result<Vec<u8>, BinaryDecodeError> {
        match compression {
            CompressionType::None => Ok(raw),
            CompressionType::Zlib => {
                let mut out = Vec::with_capacity(raw.len() * 2);
                ZlibDecoder::new(raw.as_slice()).read_to_end(&mut out)?;
                Ok(out)
            }
            CompressionType::Numpress => Err(BinaryDecodeError::UnsupportedCompression(compression)),
        }
    }

    /// Reinterpret little-endian bytes as floats, widening f32 to f64
    fn read_floats(bytes: &[u8], encoding: BinaryEncoding) -> Result<Vec<f64>, BinaryDecodeError> {
        let width = encoding.byte_size();
        let chunks = bytes.chunks_exact(width);
        if !chunks.remainder().is_empty() {
            return Err(BinaryDecodeError::InvalidLength {
                expected: bytes.len() - chunks.remainder().len(),
                actual: bytes.len(),
            });
        }

        let values = match encoding {
            BinaryEncoding::Float32 => chunks.map(|c| LittleEndian::read_f32(c) as f64).collect(),
            BinaryEncoding::Float64 => chunks.map(LittleEndian::read_f64).collect(),
        };
        Ok(values)
    }
}
