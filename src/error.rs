use thiserror::Error;

use crate::jpeg_marker_code::JpegMarkerCode;

/// Result alias used throughout the encoder.
pub type Result<T> = std::result::Result<T, EncodeError>;

/// Pipeline step that raised an internal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Huffman,
    Entropy,
    Bitstream,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Huffman => "huffman table construction",
            Stage::Entropy => "entropy coding",
            Stage::Bitstream => "bitstream assembly",
        };
        f.write_str(name)
    }
}

/// Caller contract violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidArgument {
    #[error("Invalid argument width: {0}")]
    Width(u32),
    #[error("Invalid argument height: {0}")]
    Height(u32),
    #[error("Invalid argument size: expected {expected} bytes, got {actual}")]
    BufferLength { expected: usize, actual: usize },
    #[error("Invalid argument quality: {0}")]
    Quality(f32),
    #[error("Invalid argument comment: {0} bytes does not fit in one COM segment")]
    Comment(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(#[from] InvalidArgument),

    #[error("Unsupported pixel format code {code}")]
    UnsupportedFormat { code: u32 },

    #[error("Symbol 0x{symbol:02X} cannot be coded (component {component}, block {block})")]
    SymbolOverflow {
        component: usize,
        block: usize,
        symbol: u16,
    },

    #[error("Encoding failed during {stage}: {reason}")]
    EncodingError { stage: Stage, reason: String },
}

impl EncodeError {
    pub(crate) fn internal(stage: Stage, reason: impl Into<String>) -> Self {
        Self::EncodingError {
            stage,
            reason: reason.into(),
        }
    }

    /// Stable error code reported across the host boundary.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArguments(_) => "INVALID_ARGUMENTS",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::SymbolOverflow { .. } | Self::EncodingError { .. } => "ENCODING_ERROR",
        }
    }
}

/// Malformed input met while inspecting an encoded stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Missing SOI marker")]
    MissingStartOfImage,

    #[error("Unexpected end of data at offset {0}")]
    UnexpectedEnd(usize),

    #[error("Expected a marker at offset {offset}, found 0x{found:02X}")]
    ExpectedMarker { offset: usize, found: u8 },

    #[error("Invalid {marker:?} segment at offset {offset}: {reason}")]
    InvalidSegment {
        marker: JpegMarkerCode,
        offset: usize,
        reason: &'static str,
    },
}
