//! WebAssembly bindings for fast-jpeg-encoder.
//!
//! This module provides JavaScript-compatible functions via wasm-bindgen
//! for use in browsers and Node.js.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Image information returned from WASM API.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub components: u32,
    pub scans: u32,
}

/// Encode RGBA pixels to JPEG.
///
/// # Arguments
/// * `rgba` - Row-major RGBA8888 samples
/// * `quality` - In `[0, 1]`; `undefined` selects the default
///
/// # Returns
/// The JPEG file bytes as Uint8Array
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn encode_jpeg(
    rgba: &[u8],
    width: u32,
    height: u32,
    quality: Option<f32>,
) -> Result<Vec<u8>, JsValue> {
    crate::encode_jpeg(width, height, rgba, quality)
        .map_err(|e| JsValue::from_str(&format!("{}: {}", e.code(), e)))
}

/// Get image information without decoding.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn get_image_info(data: &[u8]) -> Result<ImageInfo, JsValue> {
    let stream = crate::jpeg_stream_reader::JpegStreamReader::read(data)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let frame = stream
        .frame
        .ok_or_else(|| JsValue::from_str("No frame header"))?;
    Ok(ImageInfo {
        width: frame.width as u32,
        height: frame.height as u32,
        components: frame.components.len() as u32,
        scans: stream.scans.len() as u32,
    })
}
