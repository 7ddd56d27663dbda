//! # zenblock - Adaptive Block-DCT Compression Core
//!
//! zenblock implements the three algorithmically interesting stages of a
//! JPEG-like compressor, operating on a single N×N sample block at a
//! time:
//!
//! - **Orthonormal DCT**: a precomputed basis per block size; forward
//!   and inverse transforms are two matrix multiplications each, and the
//!   round trip is exact up to floating-point rounding
//! - **Perceptually-weighted quantization**: standard luminance weights
//!   for 8×8 blocks, radially synthesized weights for other sizes, with
//!   optional variance-adaptive scaling that quantizes flat blocks
//!   harder than detailed ones
//! - **Entropy coding**: zigzag reordering, run-length encoding, a
//!   per-block canonical Huffman code, and a self-describing bit-packed
//!   wire format with exact encode/decode symmetry
//!
//! Container I/O, color conversion, and subsampling are deliberately
//! outside this crate; hosts feed zero-centered sample blocks in and
//! get reconstructed sample blocks back.
//!
//! ## Usage
//!
//! ```rust
//! use zenblock::{samples_from_pixels, pixels_from_samples, BlockCodec};
//!
//! let pixels = [128u8; 64];
//! let codec = BlockCodec::new(8)?.quality(75);
//!
//! let samples = samples_from_pixels(&pixels, 8)?;
//! let coded = codec.encode_block(&samples)?;
//! let (decoded, _status) = codec.decode_block(&coded)?;
//! let restored = pixels_from_samples(&decoded);
//! # assert_eq!(restored, pixels);
//! # Ok::<(), zenblock::Error>(())
//! ```
//!
//! ## Sharing across threads
//!
//! Codecs and contexts are immutable after construction and may be
//! shared read-only across threads; each encode/decode call keeps its
//! transient entropy state on its own stack, so independent blocks of a
//! larger image are embarrassingly parallel.

// Core storage and tables
mod block;
mod consts;
mod error;
mod types;

// Pipeline stages
mod bitio;
mod dct;
mod encode;
mod entropy;
mod huffman;
mod quant;

// Public API
pub use bitio::{BitReader, BitWriter};
pub use block::{Block, CoeffBlock, SampleBlock};
pub use consts::{
    DEFAULT_BLOCK_SIZE, DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY, STD_LUMA_QUANT,
    ZIGZAG_INDEX_4X4, ZIGZAG_INDEX_8X8,
};
pub use dct::DctContext;
pub use encode::{pixels_from_samples, samples_from_pixels, BlockCodec};
pub use entropy::{rle_decode, rle_encode, EntropyCoder, RleSymbol};
pub use error::Error;
pub use quant::{block_variance, QuantContext};
pub use types::{CodedBlock, DecodeStatus, VarianceProxy};

/// Result type for zenblock operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contexts_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BlockCodec>();
        assert_send_sync::<DctContext>();
        assert_send_sync::<QuantContext>();
        assert_send_sync::<EntropyCoder>();
    }
}
