//! Error types for metadata parsing, injection and input handling.
//!
//! "No metadata" is never an error: extraction returns `None` for that case.
//! Only structural problems (a non-JPEG stream, lengths that point past the
//! end of the buffer) and failed splices are reported here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("not a JPEG")]
    NotJpeg,

    #[error("truncated segment at offset {offset}: declared {declared} payload bytes, {available} available")]
    TruncatedSegment {
        offset: usize,
        declared: usize,
        available: usize,
    },

    #[error("invalid segment length {length} at offset {offset}")]
    InvalidSegmentLength { offset: usize, length: u16 },

    #[error("unexpected end of data at offset {offset}: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("IPTC dataset {record}:{dataset} at offset {offset} uses extended length (0x{length:04X}), which is not supported")]
    ExtendedLength {
        offset: usize,
        record: u8,
        dataset: u8,
        length: u16,
    },

    #[error("metadata injection failed: {0}")]
    Injection(String),

    #[error("{0}")]
    UnsupportedType(String),

    #[error("compositing failed: {0}")]
    Compose(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// `true` for errors that mean the bytes are not a well-formed JPEG container.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::NotJpeg
                | Error::TruncatedSegment { .. }
                | Error::InvalidSegmentLength { .. }
                | Error::UnexpectedEof { .. }
                | Error::ExtendedLength { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
