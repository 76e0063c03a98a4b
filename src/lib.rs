//! Baseline JPEG encoder for interleaved RGBA pixel buffers.
//!
//! The crate owns the complete baseline pipeline (ISO/IEC 10918-1 / ITU-T T.81,
//! process SOF0): color transform with chroma subsampling, 8x8 block
//! splitting, forward DCT, quality-scaled quantization, Huffman entropy coding
//! and JFIF bitstream assembly.
//!
//! ```no_run
//! let rgba = vec![255u8; 16 * 16 * 4];
//! let jpeg = fast_jpeg_encoder::encode_jpeg(16, 16, &rgba, Some(0.8)).unwrap();
//! assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
//! ```

pub mod constants;
pub mod error;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod jpeg1;
pub mod jpeg_marker_code;
pub mod jpeg_stream_reader;
pub mod jpeg_stream_writer;
pub mod wasm;

use num_enum::TryFromPrimitive;

pub use constants::DEFAULT_QUALITY;
pub use error::{EncodeError, InvalidArgument, Result, Stage, StreamError};
pub use jpeg1::encoder::{EncoderOptions, Jpeg1Encoder};

/// Layout of the interleaved source samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive)]
#[repr(u32)]
pub enum PixelFormat {
    #[default]
    Rgba8 = 0,
    Bgra8 = 1,
    Rgb8 = 2,
}

impl PixelFormat {
    /// Resolves a numeric format code received across a host boundary.
    pub fn from_code(code: u32) -> Result<Self> {
        Self::try_from(code).map_err(|_| EncodeError::UnsupportedFormat { code })
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 | Self::Bgra8 => 4,
            Self::Rgb8 => 3,
        }
    }

    #[inline]
    fn rgb(self, pixel: &[u8]) -> (u8, u8, u8) {
        match self {
            Self::Rgba8 | Self::Rgb8 => (pixel[0], pixel[1], pixel[2]),
            Self::Bgra8 => (pixel[2], pixel[1], pixel[0]),
        }
    }
}

/// A borrowed, validated view over caller-owned pixels.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: &'a [u8],
}

impl<'a> PixelBuffer<'a> {
    /// Wraps an RGBA8888 row-major buffer.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self> {
        Self::with_format(width, height, PixelFormat::Rgba8, data)
    }

    pub fn with_format(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: &'a [u8],
    ) -> Result<Self> {
        if width == 0 || width > constants::MAXIMUM_DIMENSION {
            return Err(InvalidArgument::Width(width).into());
        }
        if height == 0 || height > constants::MAXIMUM_DIMENSION {
            return Err(InvalidArgument::Height(height).into());
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
            .ok_or(InvalidArgument::BufferLength {
                expected: usize::MAX,
                actual: data.len(),
            })?;
        if data.len() != expected {
            return Err(InvalidArgument::BufferLength {
                expected,
                actual: data.len(),
            }
            .into());
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// RGB triple at (x, y); alpha is dropped.
    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let bpp = self.format.bytes_per_pixel();
        let idx = (y * self.width as usize + x) * bpp;
        self.format.rgb(&self.data[idx..idx + bpp])
    }
}

/// Chroma sampling relative to luma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromaSubsampling {
    /// Full-resolution chroma.
    Yuv444,
    /// Chroma halved horizontally.
    Yuv422,
    /// Chroma halved in both directions.
    #[default]
    Yuv420,
}

impl ChromaSubsampling {
    /// Luma sampling factors (H, V); chroma components always use 1x1.
    pub fn luma_factors(self) -> (usize, usize) {
        match self {
            Self::Yuv444 => (1, 1),
            Self::Yuv422 => (2, 1),
            Self::Yuv420 => (2, 2),
        }
    }
}

/// How components are arranged into scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanLayout {
    /// One scan carrying MCUs of every component.
    #[default]
    Interleaved,
    /// One scan per component.
    Planar,
}

/// Source of the Huffman tables written to DHT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HuffmanMode {
    /// ITU-T T.81 Annex K.3 tables.
    #[default]
    Standard,
    /// Tables generated from the image's own symbol statistics (Annex K.2).
    Optimized,
}

/// JFIF density units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DensityUnit {
    #[default]
    AspectRatio = 0,
    DotsPerInch = 1,
    DotsPerCentimeter = 2,
}

/// Encodes a row-major RGBA8888 buffer into a complete JFIF byte stream.
///
/// `quality` is in `[0, 1]` and defaults to [`DEFAULT_QUALITY`]. Finite values
/// outside the range are clamped; NaN is rejected. Chroma is subsampled 4:2:0
/// except at full quality, which keeps it at 4:4:4.
pub fn encode_jpeg(width: u32, height: u32, rgba: &[u8], quality: Option<f32>) -> Result<Vec<u8>> {
    let pixels = PixelBuffer::new(width, height, rgba)?;
    let options = EncoderOptions::for_quality(quality.unwrap_or(DEFAULT_QUALITY));
    Jpeg1Encoder::new(options).encode(&pixels)
}
