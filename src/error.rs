//! Error types for zenblock

use std::fmt;

/// Result type for zenblock operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for zenblock operations
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Block size must be at least 1
    InvalidBlockSize {
        size: usize,
    },
    /// A block of the wrong dimension was passed to a context
    BlockSizeMismatch {
        expected: usize,
        actual: usize,
    },
    /// Invalid pixel data length
    InvalidPixelData {
        expected: usize,
        actual: usize,
    },
    /// Bit writer ran out of buffer capacity
    BitstreamOverflow {
        capacity: usize,
    },
    /// Bit reader ran past the end of its buffer
    BitstreamUnderflow,
    /// More unique RLE symbols than the 16-bit alphabet can address
    AlphabetOverflow {
        count: usize,
    },
    /// An RLE symbol is outside the packable range (run > 255 or |value| > 32767)
    SymbolRange {
        run: u16,
        value: i32,
    },
    /// Huffman code length exceeds the maximum (32 bits)
    HuffmanCodeOverflow {
        length: usize,
    },
    /// The transmitted symbol table does not describe a valid prefix code
    InvalidSymbolTable,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidBlockSize { size } => {
                write!(f, "Invalid block size {}: must be at least 1", size)
            }
            Error::BlockSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Block size mismatch: expected {0}x{0}, got {1}x{1}",
                    expected, actual
                )
            }
            Error::InvalidPixelData { expected, actual } => {
                write!(f, "Expected {} pixel samples, got {}", expected, actual)
            }
            Error::BitstreamOverflow { capacity } => {
                write!(
                    f,
                    "Bitstream overflow: buffer capacity of {} bytes exceeded",
                    capacity
                )
            }
            Error::BitstreamUnderflow => write!(f, "Bitstream underflow: no bits left to read"),
            Error::AlphabetOverflow { count } => {
                write!(
                    f,
                    "Alphabet overflow: {} unique symbols exceed the 16-bit limit",
                    count
                )
            }
            Error::SymbolRange { run, value } => {
                write!(
                    f,
                    "RLE symbol (run={}, value={}) outside the packable range",
                    run, value
                )
            }
            Error::HuffmanCodeOverflow { length } => {
                write!(f, "Huffman code length {} exceeds maximum (32 bits)", length)
            }
            Error::InvalidSymbolTable => write!(f, "Invalid Huffman symbol table"),
        }
    }
}

impl std::error::Error for Error {}
