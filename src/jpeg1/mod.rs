//! JPEG 1 (Baseline) Implementation (ISO/IEC 10918-1 / ITU-T T.81)
//!
//! This module implements the sequential DCT-based baseline encoding process.
//!
//! Features:
//! - 8-bit grayscale and YCbCr output with 4:4:4, 4:2:2 and 4:2:0 sampling.
//! - Huffman coding with standard or image-optimized tables.
//! - Support for Restart Markers (DRI/RSTm).
//! - Planar and Interleaved scan support.

pub mod bit_writer;
pub mod block;
pub mod color;
pub mod dct;
pub mod encoder;
pub mod entropy;
pub mod huffman;
pub mod quantization;

pub use encoder::{EncoderOptions, Jpeg1Encoder};
