//! Quantization tables and coefficient quantization.
//!
//! Quality follows the IJG convention: a quality in `[0, 1]` maps to an
//! integer percentage `q` in `1..=100`, giving a scale of `5000 / q` below 50
//! and `200 - 2q` from 50 up. Scaled entries are clamped to `1..=255` so every
//! table stays valid for 8-bit baseline DQT segments.

use crate::constants::{BLOCK_DIM, MAXIMUM_AC_COEFFICIENT, MAXIMUM_DC_COEFFICIENT, ZIGZAG_ORDER};
use crate::jpeg1::dct::Coefficients;

/// Standard JPEG luminance quantization table (Quality 50).
pub const STD_LUMINANCE_QUANT_TABLE: [u8; BLOCK_DIM] = [
    16, 11, 10, 16, 24, 40, 51, 61,
    12, 12, 14, 19, 26, 58, 60, 55,
    14, 13, 16, 24, 40, 57, 69, 56,
    14, 17, 22, 29, 51, 87, 80, 62,
    18, 22, 37, 56, 68, 109, 103, 77,
    24, 35, 55, 64, 81, 104, 113, 92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103, 99,
];

/// Standard JPEG chrominance quantization table (Quality 50).
pub const STD_CHROMINANCE_QUANT_TABLE: [u8; BLOCK_DIM] = [
    17, 18, 24, 47, 99, 99, 99, 99,
    18, 21, 26, 66, 99, 99, 99, 99,
    24, 26, 56, 99, 99, 99, 99, 99,
    47, 66, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
];

/// Quantized coefficients in zig-zag order.
pub type QuantizedBlock = [i16; BLOCK_DIM];

/// Which base table a component uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Luminance,
    Chrominance,
}

impl TableKind {
    /// DQT/DHT destination slot.
    pub fn slot(self) -> u8 {
        match self {
            Self::Luminance => 0,
            Self::Chrominance => 1,
        }
    }
}

/// Maps a quality in `[0, 1]` to the IJG percentage.
pub fn quality_percent(quality: f32) -> u32 {
    (quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u32
}

/// IJG scale factor, in percent of the base table.
pub fn quality_scaling(percent: u32) -> u32 {
    let q = percent.clamp(1, 100);
    if q < 50 { 5000 / q } else { 200 - 2 * q }
}

/// Scales a quantization table by a quality factor (1-100).
pub fn get_scaled_quant_table(base_table: &[u8; BLOCK_DIM], quality: u32) -> [u8; BLOCK_DIM] {
    let s = quality_scaling(quality);
    let mut scaled_table = [0u8; BLOCK_DIM];
    for (out, &base) in scaled_table.iter_mut().zip(base_table.iter()) {
        *out = ((base as u32 * s + 50) / 100).clamp(1, 255) as u8;
    }
    scaled_table
}

/// An immutable quantization table, kept in natural order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantTable {
    kind: TableKind,
    values: [u8; BLOCK_DIM],
}

impl QuantTable {
    pub fn from_quality(kind: TableKind, quality: f32) -> Self {
        let base = match kind {
            TableKind::Luminance => &STD_LUMINANCE_QUANT_TABLE,
            TableKind::Chrominance => &STD_CHROMINANCE_QUANT_TABLE,
        };
        Self {
            kind,
            values: get_scaled_quant_table(base, quality_percent(quality)),
        }
    }

    /// Builds a table from explicit natural-order entries; zeros become 1.
    pub fn custom(kind: TableKind, values: [u8; BLOCK_DIM]) -> Self {
        Self {
            kind,
            values: values.map(|v| v.max(1)),
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn values(&self) -> &[u8; BLOCK_DIM] {
        &self.values
    }

    /// Entries in zig-zag order, as DQT stores them.
    pub fn zigzag(&self) -> [u8; BLOCK_DIM] {
        let mut out = [0u8; BLOCK_DIM];
        for (k, &natural) in ZIGZAG_ORDER.iter().enumerate() {
            out[k] = self.values[natural];
        }
        out
    }

    /// Divides each coefficient by its entry, rounding half away from zero,
    /// and returns the result in zig-zag order.
    pub fn quantize(&self, coefficients: &Coefficients) -> QuantizedBlock {
        let mut output = [0i16; BLOCK_DIM];
        for (k, &natural) in ZIGZAG_ORDER.iter().enumerate() {
            let q = self.values[natural] as f32;
            let limit = if k == 0 {
                MAXIMUM_DC_COEFFICIENT
            } else {
                MAXIMUM_AC_COEFFICIENT
            };
            let limit = limit as f32;
            output[k] = (coefficients[natural] / q).round().clamp(-limit, limit) as i16;
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_percent_clamps() {
        assert_eq!(quality_percent(0.0), 1);
        assert_eq!(quality_percent(-3.0), 1);
        assert_eq!(quality_percent(0.5), 50);
        assert_eq!(quality_percent(0.756), 76);
        assert_eq!(quality_percent(1.0), 100);
        assert_eq!(quality_percent(7.0), 100);
    }

    #[test]
    fn test_scaling_formula() {
        assert_eq!(quality_scaling(1), 5000);
        assert_eq!(quality_scaling(25), 200);
        assert_eq!(quality_scaling(50), 100);
        assert_eq!(quality_scaling(80), 40);
        assert_eq!(quality_scaling(100), 0);
    }

    #[test]
    fn test_quality_50_is_base_table() {
        let table = QuantTable::from_quality(TableKind::Luminance, 0.5);
        assert_eq!(table.values(), &STD_LUMINANCE_QUANT_TABLE);
    }

    #[test]
    fn test_extreme_qualities_stay_in_range() {
        let best = QuantTable::from_quality(TableKind::Chrominance, 1.0);
        assert!(best.values().iter().all(|&v| v == 1));

        let worst = QuantTable::from_quality(TableKind::Luminance, 0.0);
        assert!(worst.values().iter().all(|&v| (1..=255).contains(&v)));
        assert_eq!(worst.values()[0], 255);
    }

    #[test]
    fn test_zigzag_serialization() {
        let table = QuantTable::from_quality(TableKind::Luminance, 0.5);
        let zz = table.zigzag();
        assert_eq!(&zz[..6], &[16, 11, 12, 14, 12, 10]);
    }

    #[test]
    fn test_quantize_rounds_half_away_from_zero() {
        let table = QuantTable::custom(TableKind::Luminance, [2; BLOCK_DIM]);
        let mut coeffs = [0.0f32; BLOCK_DIM];
        coeffs[0] = 5.0; // 2.5 -> 3
        coeffs[1] = -5.0; // -2.5 -> -3
        coeffs[8] = 4.9; // 2.45 -> 2
        let q = table.quantize(&coeffs);
        assert_eq!(q[0], 3);
        assert_eq!(q[1], -3); // natural index 1 is zig-zag position 1
        assert_eq!(q[2], 2); // natural index 8 is zig-zag position 2
    }

    #[test]
    fn test_quantize_clamps_to_baseline_range() {
        let table = QuantTable::custom(TableKind::Luminance, [0; BLOCK_DIM]);
        assert!(table.values().iter().all(|&v| v == 1));
        let mut coeffs = [0.0f32; BLOCK_DIM];
        coeffs[0] = 5000.0;
        coeffs[1] = -1500.0;
        let q = table.quantize(&coeffs);
        assert_eq!(q[0], 2047);
        assert_eq!(q[1], -1023);
    }
}
