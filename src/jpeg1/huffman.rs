//! Huffman coding tables for JPEG 1 Baseline.
//!
//! Tables are specified the way DHT stores them (BITS counts per code length
//! plus HUFFVAL symbols) and expanded into a per-symbol code lookup
//! (ISO/IEC 10918-1 Annex C). [`FrequencyCounter`] and
//! [`generate_optimal_table`] build image-specific tables following Annex K.2.

use crate::error::{EncodeError, Result, Stage};

pub const MAX_CODE_LENGTH: usize = 16;

/// Represents a Huffman code with its bit value and length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanCode {
    pub value: u16,
    pub length: u8,
}

/// Standard JPEG DC luminance Huffman table lengths (Table K.3).
pub const STD_LUMINANCE_DC_LENGTHS: [u8; 16] = [
    0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0
];

/// Standard JPEG DC luminance Huffman table values (Table K.3).
pub const STD_LUMINANCE_DC_VALUES: [u8; 12] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11
];

/// Standard JPEG DC chrominance Huffman table lengths (Table K.4).
pub const STD_CHROMINANCE_DC_LENGTHS: [u8; 16] = [
    0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0
];

/// Standard JPEG DC chrominance Huffman table values (Table K.4).
pub const STD_CHROMINANCE_DC_VALUES: [u8; 12] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11
];

/// Standard JPEG AC luminance Huffman table lengths (Table K.5).
pub const STD_LUMINANCE_AC_LENGTHS: [u8; 16] = [
    0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 125
];

/// Standard JPEG AC luminance Huffman table values (Table K.5).
pub const STD_LUMINANCE_AC_VALUES: [u8; 162] = [
    0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12,
    0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07,
    0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xa1, 0x08,
    0x23, 0x42, 0xb1, 0xc1, 0x15, 0x52, 0xd1, 0xf0,
    0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0a, 0x16,
    0x17, 0x18, 0x19, 0x1a, 0x25, 0x26, 0x27, 0x28,
    0x29, 0x2a, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39,
    0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
    0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59,
    0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69,
    0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79,
    0x7a, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89,
    0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98,
    0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7,
    0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6,
    0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5,
    0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2, 0xd3, 0xd4,
    0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe1, 0xe2,
    0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea,
    0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
    0xf9, 0xfa,
];

/// Standard JPEG AC chrominance Huffman table lengths (Table K.6).
pub const STD_CHROMINANCE_AC_LENGTHS: [u8; 16] = [
    0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 119
];

/// Standard JPEG AC chrominance Huffman table values (Table K.6).
pub const STD_CHROMINANCE_AC_VALUES: [u8; 162] = [
    0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21,
    0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61, 0x71,
    0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91,
    0xa1, 0xb1, 0xc1, 0x09, 0x23, 0x33, 0x52, 0xf0,
    0x15, 0x62, 0x72, 0xd1, 0x0a, 0x16, 0x24, 0x34,
    0xe1, 0x25, 0xf1, 0x17, 0x18, 0x19, 0x1a, 0x26,
    0x27, 0x28, 0x29, 0x2a, 0x35, 0x36, 0x37, 0x38,
    0x39, 0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48,
    0x49, 0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58,
    0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68,
    0x69, 0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78,
    0x79, 0x7a, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87,
    0x88, 0x89, 0x8a, 0x92, 0x93, 0x94, 0x95, 0x96,
    0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5,
    0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4,
    0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3,
    0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2,
    0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda,
    0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9,
    0xea, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
    0xf9, 0xfa,
];

/// DC or AC table class, as written in the DHT Tc field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TableClass {
    Dc = 0,
    Ac = 1,
}

/// Encapsulates a Huffman table specification and its encoding lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffmanTable {
    pub class: TableClass,
    pub lengths: [u8; MAX_CODE_LENGTH],
    pub values: Vec<u8>,
    codes: [HuffmanCode; 256],
}

impl HuffmanTable {
    /// Builds a table from JPEG DHT lengths and values (Figures C.1 to C.3).
    pub fn build_from_dht(
        class: TableClass,
        lengths: &[u8; MAX_CODE_LENGTH],
        values: &[u8],
    ) -> Result<Self> {
        let total: usize = lengths.iter().map(|&n| n as usize).sum();
        if total != values.len() || total > 256 {
            return Err(EncodeError::internal(
                Stage::Huffman,
                format!("DHT declares {} codes but carries {} values", total, values.len()),
            ));
        }

        let mut codes = [HuffmanCode::default(); 256];
        let mut code = 0u32;
        let mut val_idx = 0;

        for (i, &count) in lengths.iter().enumerate() {
            let length = i + 1;
            for _ in 0..count {
                // The all-ones 16-bit code is reserved (Annex C).
                let limit = if length == MAX_CODE_LENGTH {
                    (1 << length) - 1
                } else {
                    1 << length
                };
                if code >= limit {
                    return Err(EncodeError::internal(Stage::Huffman, "code space exhausted"));
                }
                let symbol = values[val_idx] as usize;
                if codes[symbol].length != 0 {
                    return Err(EncodeError::internal(
                        Stage::Huffman,
                        format!("duplicate symbol 0x{:02X}", symbol),
                    ));
                }
                codes[symbol] = HuffmanCode {
                    value: code as u16,
                    length: length as u8,
                };
                code += 1;
                val_idx += 1;
            }
            code <<= 1;
        }

        Ok(Self {
            class,
            lengths: *lengths,
            values: values.to_vec(),
            codes,
        })
    }

    /// Returns the code for `symbol`, or `None` when the table has none.
    #[inline]
    pub fn code(&self, symbol: u8) -> Option<HuffmanCode> {
        let code = self.codes[symbol as usize];
        (code.length != 0).then_some(code)
    }

    pub fn standard_luminance_dc() -> Self {
        Self::standard(TableClass::Dc, &STD_LUMINANCE_DC_LENGTHS, &STD_LUMINANCE_DC_VALUES)
    }

    pub fn standard_luminance_ac() -> Self {
        Self::standard(TableClass::Ac, &STD_LUMINANCE_AC_LENGTHS, &STD_LUMINANCE_AC_VALUES)
    }

    pub fn standard_chrominance_dc() -> Self {
        Self::standard(TableClass::Dc, &STD_CHROMINANCE_DC_LENGTHS, &STD_CHROMINANCE_DC_VALUES)
    }

    pub fn standard_chrominance_ac() -> Self {
        Self::standard(TableClass::Ac, &STD_CHROMINANCE_AC_LENGTHS, &STD_CHROMINANCE_AC_VALUES)
    }

    fn standard(class: TableClass, lengths: &[u8; MAX_CODE_LENGTH], values: &[u8]) -> Self {
        match Self::build_from_dht(class, lengths, values) {
            Ok(table) => table,
            Err(_) => unreachable!("Annex K tables are well formed"),
        }
    }
}

/// Computes the magnitude category of an integer (ISO/IEC 10918-1 F.1.2.1).
#[inline]
pub fn magnitude_category(value: i16) -> u8 {
    (16 - value.unsigned_abs().leading_zeros()) as u8
}

/// Encodes the bits for a given category and value (ISO/IEC 10918-1 F.1.2.1.1).
///
/// Negative values are sent as the one's complement of their magnitude.
#[inline]
pub fn magnitude_bits(value: i16, category: u8) -> u16 {
    if category == 0 {
        return 0;
    }
    if value >= 0 {
        value as u16
    } else {
        (value as i32 + (1 << category) - 1) as u16
    }
}

/// Symbol occurrence counts for one table (257 slots, the last reserved).
#[derive(Clone, Debug)]
pub struct FrequencyCounter {
    pub counts: [u64; 257],
}

impl Default for FrequencyCounter {
    fn default() -> Self {
        Self { counts: [0; 257] }
    }
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn count(&mut self, symbol: u8) {
        self.counts[symbol as usize] += 1;
    }

    pub fn generate_table(&self, class: TableClass) -> Result<HuffmanTable> {
        generate_optimal_table(class, &self.counts)
    }
}

/// Generates a length-limited optimal table from symbol counts (Annex K.2).
///
/// A pseudo-symbol with count 1 is added so no real symbol receives the
/// all-ones code.
pub fn generate_optimal_table(class: TableClass, counts: &[u64; 257]) -> Result<HuffmanTable> {
    let mut freq = *counts;
    freq[256] = 1;

    let mut codesize = [0usize; 257];
    let mut others = [usize::MAX; 257];

    loop {
        // Smallest count, preferring the highest symbol on ties.
        let mut c1 = None;
        let mut v = u64::MAX;
        for (i, &f) in freq.iter().enumerate() {
            if f != 0 && f <= v {
                v = f;
                c1 = Some(i);
            }
        }
        let mut c2 = None;
        let mut v = u64::MAX;
        for (i, &f) in freq.iter().enumerate() {
            if f != 0 && f <= v && Some(i) != c1 {
                v = f;
                c2 = Some(i);
            }
        }
        let (Some(mut c1), Some(mut c2)) = (c1, c2) else {
            break;
        };

        freq[c1] += freq[c2];
        freq[c2] = 0;

        codesize[c1] += 1;
        while others[c1] != usize::MAX {
            c1 = others[c1];
            codesize[c1] += 1;
        }
        others[c1] = c2;

        codesize[c2] += 1;
        while others[c2] != usize::MAX {
            c2 = others[c2];
            codesize[c2] += 1;
        }
    }

    let max_size = codesize.iter().copied().max().unwrap_or(0);
    let mut bits = vec![0u32; max_size.max(MAX_CODE_LENGTH) + 1];
    for &size in codesize.iter().filter(|&&s| s > 0) {
        bits[size] += 1;
    }

    // Limit code lengths to 16 bits.
    for i in (MAX_CODE_LENGTH + 1..bits.len()).rev() {
        while bits[i] > 0 {
            let mut j = i - 2;
            while bits[j] == 0 {
                if j == 0 {
                    return Err(EncodeError::internal(
                        Stage::Huffman,
                        "code lengths cannot be limited",
                    ));
                }
                j -= 1;
            }
            bits[i] -= 2;
            bits[i - 1] += 1;
            bits[j + 1] += 2;
            bits[j] -= 1;
        }
    }

    // Drop the pseudo-symbol from the longest length in use.
    let mut longest = MAX_CODE_LENGTH;
    while longest > 0 && bits[longest] == 0 {
        longest -= 1;
    }
    if longest > 0 {
        bits[longest] -= 1;
    }

    let mut lengths = [0u8; MAX_CODE_LENGTH];
    for (len, out) in lengths.iter_mut().enumerate() {
        *out = bits[len + 1] as u8;
    }

    let mut values = Vec::new();
    for size in 1..=max_size {
        for (symbol, &s) in codesize.iter().enumerate().take(256) {
            if s == size {
                values.push(symbol as u8);
            }
        }
    }

    HuffmanTable::build_from_dht(class, &lengths, &values)
}
