//! RGB to YCbCr conversion and chroma subsampling.
//!
//! Follows the JFIF (BT.601 full range) equations:
//! ```text
//! Y  =  0.299000 * R + 0.587000 * G + 0.114000 * B
//! Cb = -0.168736 * R - 0.331264 * G + 0.500000 * B + 128
//! Cr =  0.500000 * R - 0.418688 * G - 0.081312 * B + 128
//! ```
//! evaluated in single precision. Samples are not rounded here; the only
//! rounding step of the pipeline is quantization. A subsampled chroma sample
//! is the transform of the mean RGB value over the luma-aligned window it
//! covers.

use crate::{ChromaSubsampling, PixelBuffer};

const R_TO_Y: f32 = 0.299;
const G_TO_Y: f32 = 0.587;
const B_TO_Y: f32 = 0.114;
const R_TO_CB: f32 = -0.168_736;
const G_TO_CB: f32 = -0.331_264;
const B_TO_CB: f32 = 0.5;
const R_TO_CR: f32 = 0.5;
const G_TO_CR: f32 = -0.418_688;
const B_TO_CR: f32 = -0.081_312;
const CBCR_CENTER: f32 = 128.0;

/// One component's samples, row-major, on the 0..=255 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

impl Plane {
    pub fn new(width: usize, height: usize, samples: Vec<f32>) -> Self {
        debug_assert_eq!(samples.len(), width * height);
        Self {
            width,
            height,
            samples,
        }
    }

    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self::new(width, height, vec![value; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample at (x, y), replicating the last row/column past the edges.
    #[inline]
    pub fn sample_clamped(&self, x: usize, y: usize) -> f32 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.samples[y * self.width + x]
    }
}

/// Planes produced for one image: `[Y]` or `[Y, Cb, Cr]`.
#[derive(Debug, Clone)]
pub struct PlaneSet {
    pub planes: Vec<Plane>,
    pub subsampling: ChromaSubsampling,
}

impl PlaneSet {
    pub fn luma(&self) -> &Plane {
        &self.planes[0]
    }

    pub fn is_grayscale(&self) -> bool {
        self.planes.len() == 1
    }
}

#[inline]
pub fn rgb_to_ycbcr(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let y = R_TO_Y * r + G_TO_Y * g + B_TO_Y * b;
    let cb = CBCR_CENTER + R_TO_CB * r + G_TO_CB * g + B_TO_CB * b;
    let cr = CBCR_CENTER + R_TO_CR * r + G_TO_CR * g + B_TO_CR * b;
    (y, cb, cr)
}

#[inline]
pub fn rgb_to_gray(r: f32, g: f32, b: f32) -> f32 {
    R_TO_Y * r + G_TO_Y * g + B_TO_Y * b
}

pub fn convert(
    pixels: &PixelBuffer<'_>,
    subsampling: ChromaSubsampling,
    grayscale: bool,
) -> PlaneSet {
    let width = pixels.width() as usize;
    let height = pixels.height() as usize;

    let mut luma = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let (r, g, b) = pixels.rgb(x, y);
            luma.push(rgb_to_gray(r as f32, g as f32, b as f32));
        }
    }
    let luma = Plane::new(width, height, luma);

    if grayscale {
        return PlaneSet {
            planes: vec![luma],
            subsampling,
        };
    }

    let (h, v) = subsampling.luma_factors();
    let (cb, cr) = subsample_chroma(pixels, h, v);
    PlaneSet {
        planes: vec![luma, cb, cr],
        subsampling,
    }
}

fn subsample_chroma(pixels: &PixelBuffer<'_>, h: usize, v: usize) -> (Plane, Plane) {
    let width = pixels.width() as usize;
    let height = pixels.height() as usize;
    let chroma_width = width.div_ceil(h);
    let chroma_height = height.div_ceil(v);
    let window = (h * v) as f32;

    let mut cb = Vec::with_capacity(chroma_width * chroma_height);
    let mut cr = Vec::with_capacity(chroma_width * chroma_height);

    for cy in 0..chroma_height {
        for cx in 0..chroma_width {
            let (mut rs, mut gs, mut bs) = (0u32, 0u32, 0u32);
            for dy in 0..v {
                let py = (cy * v + dy).min(height - 1);
                for dx in 0..h {
                    let px = (cx * h + dx).min(width - 1);
                    let (r, g, b) = pixels.rgb(px, py);
                    rs += r as u32;
                    gs += g as u32;
                    bs += b as u32;
                }
            }
            let (_, cb_val, cr_val) =
                rgb_to_ycbcr(rs as f32 / window, gs as f32 / window, bs as f32 / window);
            cb.push(cb_val);
            cr.push(cr_val);
        }
    }

    (
        Plane::new(chroma_width, chroma_height, cb),
        Plane::new(chroma_width, chroma_height, cr),
    )
}
