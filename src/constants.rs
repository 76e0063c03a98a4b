pub const BLOCK_SIZE: usize = 8;
pub const BLOCK_DIM: usize = BLOCK_SIZE * BLOCK_SIZE;

/// Quality used when the caller does not supply one.
pub const DEFAULT_QUALITY: f32 = 0.7;

// SOF0 stores both dimensions in 16 bits.
pub const MAXIMUM_DIMENSION: u32 = u16::MAX as u32;

// Baseline magnitude categories, ISO/IEC 10918-1 F.1.2.
pub const MAXIMUM_DC_CATEGORY: u8 = 11;
pub const MAXIMUM_AC_CATEGORY: u8 = 10;
pub const MAXIMUM_DC_COEFFICIENT: i16 = (1 << MAXIMUM_DC_CATEGORY) - 1;
pub const MAXIMUM_AC_COEFFICIENT: i16 = (1 << MAXIMUM_AC_CATEGORY) - 1;

/// AC symbol for a run of 16 zero coefficients.
pub const ZRL_SYMBOL: u8 = 0xF0;
/// AC symbol terminating a block whose remaining coefficients are zero.
pub const EOB_SYMBOL: u8 = 0x00;

pub const JFIF_IDENTIFIER: [u8; 5] = *b"JFIF\0";
pub const JFIF_VERSION: [u8; 2] = [1, 1];

// The size in bytes of the segment length field.
pub const SEGMENT_LENGTH_SIZE: usize = 2;

// The maximum size of the data bytes that fit in a segment.
pub const SEGMENT_MAX_DATA_SIZE: usize = u16::MAX as usize - SEGMENT_LENGTH_SIZE;

/// Natural-order index of each zig-zag position.
pub const ZIGZAG_ORDER: [usize; BLOCK_DIM] = [
    0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];
