//! C Foreign Function Interface for fast-jpeg-encoder.
//!
//! Encoded buffers are allocated by Rust and handed to the caller, who must
//! release them with [`fje_free_buffer`].

use std::os::raw::{c_int, c_uchar};
use std::ptr;

use crate::jpeg_stream_reader::JpegStreamReader;
use crate::{EncodeError, EncoderOptions, Jpeg1Encoder, PixelBuffer, PixelFormat};

/// Status codes returned by every entry point.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FjeStatus {
    Ok = 0,
    InvalidArguments = 1,
    EncodingError = 2,
    UnsupportedFormat = 3,
}

impl From<&EncodeError> for FjeStatus {
    fn from(error: &EncodeError) -> Self {
        match error {
            EncodeError::InvalidArguments(_) => Self::InvalidArguments,
            EncodeError::UnsupportedFormat { .. } => Self::UnsupportedFormat,
            EncodeError::SymbolOverflow { .. } | EncodeError::EncodingError { .. } => {
                Self::EncodingError
            }
        }
    }
}

/// Image information structure.
#[repr(C)]
#[derive(Debug, Default)]
pub struct FjeImageInfo {
    pub width: u32,
    pub height: u32,
    pub components: u32,
    pub bits_per_sample: u32,
    pub scans: u32,
}

/// Encode an RGBA8888 buffer to JPEG.
///
/// # Safety
/// `rgba` must point to `rgba_len` readable bytes. `out_data` and `out_len`
/// must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fje_encode_jpeg(
    width: u32,
    height: u32,
    rgba: *const c_uchar,
    rgba_len: usize,
    quality: f32,
    out_data: *mut *mut c_uchar,
    out_len: *mut usize,
) -> c_int {
    unsafe {
        fje_encode_pixels(
            width,
            height,
            PixelFormat::Rgba8 as u32,
            rgba,
            rgba_len,
            quality,
            out_data,
            out_len,
        )
    }
}

/// Encode pixels in the layout named by `format` (0 RGBA, 1 BGRA, 2 RGB).
///
/// # Safety
/// Same contract as [`fje_encode_jpeg`].
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn fje_encode_pixels(
    width: u32,
    height: u32,
    format: u32,
    pixels: *const c_uchar,
    pixels_len: usize,
    quality: f32,
    out_data: *mut *mut c_uchar,
    out_len: *mut usize,
) -> c_int {
    if pixels.is_null() || out_data.is_null() || out_len.is_null() {
        return FjeStatus::InvalidArguments as c_int;
    }
    unsafe {
        *out_data = ptr::null_mut();
        *out_len = 0;
    }

    let source = unsafe { std::slice::from_raw_parts(pixels, pixels_len) };
    let encoder = Jpeg1Encoder::new(EncoderOptions::for_quality(quality));
    let encoded = PixelFormat::from_code(format)
        .and_then(|format| PixelBuffer::with_format(width, height, format, source))
        .and_then(|buffer| encoder.encode(&buffer));

    match encoded {
        Ok(bytes) => {
            let boxed = bytes.into_boxed_slice();
            let len = boxed.len();
            unsafe {
                *out_len = len;
                *out_data = Box::into_raw(boxed) as *mut c_uchar;
            }
            FjeStatus::Ok as c_int
        }
        Err(error) => {
            tracing::debug!(code = error.code(), "ffi encode failed: {}", error);
            FjeStatus::from(&error) as c_int
        }
    }
}

/// Release a buffer returned by one of the encode functions.
///
/// # Safety
/// `data` and `len` must come from a single successful encode call, and the
/// buffer must not be freed twice.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fje_free_buffer(data: *mut c_uchar, len: usize) {
    if !data.is_null() {
        let slice = ptr::slice_from_raw_parts_mut(data, len);
        let _ = unsafe { Box::from_raw(slice) };
    }
}

/// Read frame information from an encoded JPEG.
///
/// # Safety
/// `data` must point to `len` readable bytes. `info` must be valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fje_image_info(
    data: *const c_uchar,
    len: usize,
    info: *mut FjeImageInfo,
) -> c_int {
    if data.is_null() || info.is_null() || len == 0 {
        return FjeStatus::InvalidArguments as c_int;
    }
    let source = unsafe { std::slice::from_raw_parts(data, len) };
    let Ok(stream) = JpegStreamReader::read(source) else {
        return FjeStatus::InvalidArguments as c_int;
    };
    let Some(frame) = stream.frame else {
        return FjeStatus::InvalidArguments as c_int;
    };
    unsafe {
        *info = FjeImageInfo {
            width: frame.width as u32,
            height: frame.height as u32,
            components: frame.components.len() as u32,
            bits_per_sample: frame.precision as u32,
            scans: stream.scans.len() as u32,
        };
    }
    FjeStatus::Ok as c_int
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_and_free() {
        let rgba = vec![200u8; 8 * 8 * 4];
        let mut data = ptr::null_mut();
        let mut len = 0usize;
        let status =
            unsafe { fje_encode_jpeg(8, 8, rgba.as_ptr(), rgba.len(), 0.8, &mut data, &mut len) };
        assert_eq!(status, FjeStatus::Ok as c_int);
        assert!(!data.is_null());

        let bytes = unsafe { std::slice::from_raw_parts(data, len) };
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let mut info = FjeImageInfo::default();
        let status = unsafe { fje_image_info(data, len, &mut info) };
        assert_eq!(status, FjeStatus::Ok as c_int);
        assert_eq!((info.width, info.height, info.components, info.scans), (8, 8, 3, 1));

        unsafe { fje_free_buffer(data, len) };
    }

    #[test]
    fn test_status_codes() {
        let rgba = vec![0u8; 10];
        let mut data = ptr::null_mut();
        let mut len = 0usize;
        let status =
            unsafe { fje_encode_jpeg(4, 4, rgba.as_ptr(), rgba.len(), 0.5, &mut data, &mut len) };
        assert_eq!(status, FjeStatus::InvalidArguments as c_int);
        assert!(data.is_null());

        let status =
            unsafe { fje_encode_pixels(1, 1, 7, rgba.as_ptr(), 4, 0.5, &mut data, &mut len) };
        assert_eq!(status, FjeStatus::UnsupportedFormat as c_int);

        let status = unsafe { fje_encode_jpeg(1, 1, ptr::null(), 4, 0.5, &mut data, &mut len) };
        assert_eq!(status, FjeStatus::InvalidArguments as c_int);
    }
}
