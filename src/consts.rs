//! Constants and tables for block coding
//!
//! Contains the standard luminance quantization base table and the
//! canonical 8x8 zigzag index table used to cross-check the generic
//! scan generator.

/// Default block dimension
pub const DEFAULT_BLOCK_SIZE: usize = 8;

/// Minimum quality factor
pub const MIN_QUALITY: u8 = 1;

/// Maximum quality factor
pub const MAX_QUALITY: u8 = 100;

/// Default quality factor
pub const DEFAULT_QUALITY: u8 = 85;

/// Level-shift bias applied at the pixel boundary
pub const PIXEL_BIAS: f64 = 128.0;

/// Largest representable 8-bit pixel value
pub const MAX_PIXEL_VALUE: f64 = 255.0;

/// Maximum zero-run length representable in a packed RLE symbol
pub const MAX_RUN_LENGTH: u16 = 255;

/// Maximum coefficient magnitude representable in a packed RLE symbol
/// (signed-magnitude in 16 bits: 1 sign bit + 15 magnitude bits)
pub const MAX_SYMBOL_MAGNITUDE: i32 = 0x7FFF;

/// Maximum number of unique symbols addressable by the 16-bit
/// symbol-count field of the wire format
pub const MAX_ALPHABET_SIZE: usize = u16::MAX as usize;

/// Maximum Huffman code length supported by the bit-level codec
pub const MAX_CODE_LENGTH: usize = 32;

/// Standard luminance quantization base table (8x8), values increasing
/// with spatial frequency. Scaled by the quality factor before use.
#[rustfmt::skip]
pub const STD_LUMA_QUANT: [u16; 64] = [
    16, 11, 10, 16,  24,  40,  51,  61,
    12, 12, 14, 19,  26,  58,  60,  55,
    14, 13, 16, 24,  40,  57,  69,  56,
    14, 17, 22, 29,  51,  87,  80,  62,
    18, 22, 37, 56,  68, 109, 103,  77,
    24, 35, 55, 64,  81, 104, 113,  92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103,  99,
];

/// Canonical 8x8 zigzag index table: entry `i` is the scan rank of the
/// coefficient at natural (row-major) position `i`.
#[rustfmt::skip]
pub const ZIGZAG_INDEX_8X8: [usize; 64] = [
     0,  1,  5,  6, 14, 15, 27, 28,
     2,  4,  7, 13, 16, 26, 29, 42,
     3,  8, 12, 17, 25, 30, 41, 43,
     9, 11, 18, 24, 31, 40, 44, 53,
    10, 19, 23, 32, 39, 45, 52, 54,
    20, 22, 33, 38, 46, 51, 55, 60,
    21, 34, 37, 47, 50, 56, 59, 61,
    35, 36, 48, 49, 57, 58, 62, 63,
];

/// Canonical 4x4 zigzag index table, same convention as [`ZIGZAG_INDEX_8X8`].
#[rustfmt::skip]
pub const ZIGZAG_INDEX_4X4: [usize; 16] = [
    0,  1,  5,  6,
    2,  4,  7, 12,
    3,  8, 11, 13,
    9, 10, 14, 15,
];
