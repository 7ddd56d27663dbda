//! Per-block codec facade
//!
//! [`BlockCodec`] wires the pipeline stages together for one block size
//! and quality setting: forward DCT, (optionally adaptive) quantization,
//! and entropy coding on encode; the exact reverse on decode. The
//! contexts it owns are immutable after construction, so one codec can
//! be shared read-only across threads processing independent blocks.
//!
//! The pixel-boundary helpers convert between 8-bit pixel planes and
//! the zero-centered sample blocks the transform expects.

use crate::block::SampleBlock;
use crate::consts::{DEFAULT_QUALITY, MAX_PIXEL_VALUE, PIXEL_BIAS};
use crate::dct::DctContext;
use crate::entropy::EntropyCoder;
use crate::error::{Error, Result};
use crate::quant::{block_variance, QuantContext};
use crate::types::{CodedBlock, DecodeStatus, VarianceProxy};

/// Block compression pipeline for one (block size, quality, adaptive)
/// configuration.
#[derive(Clone, Debug)]
pub struct BlockCodec {
    dct: DctContext,
    quant: QuantContext,
    entropy: EntropyCoder,
}

impl BlockCodec {
    /// Create a codec for `block_size`×`block_size` blocks with the
    /// default quality and adaptive quantization disabled.
    pub fn new(block_size: usize) -> Result<Self> {
        Ok(Self {
            dct: DctContext::new(block_size)?,
            quant: QuantContext::new(block_size, DEFAULT_QUALITY, false)?,
            entropy: EntropyCoder::new(block_size)?,
        })
    }

    /// Set the quality factor (clamped to [1, 100]).
    #[must_use]
    pub fn quality(mut self, quality: u8) -> Self {
        self.quant = QuantContext::with_validated(
            self.quant.block_size(),
            quality,
            self.quant.is_adaptive(),
        );
        self
    }

    /// Enable or disable variance-adaptive quantization.
    #[must_use]
    pub fn adaptive(mut self, adaptive: bool) -> Self {
        self.quant = QuantContext::with_validated(
            self.quant.block_size(),
            self.quant.quality(),
            adaptive,
        );
        self
    }

    /// Block dimension this codec processes.
    #[inline]
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.dct.block_size()
    }

    /// Encode one zero-centered sample block.
    ///
    /// The variance proxy is derived from the sample block before the
    /// transform and travels with the coded data so the decoder can
    /// mirror the adaptive quantization exactly.
    pub fn encode_block(&self, samples: &SampleBlock) -> Result<CodedBlock> {
        let variance = VarianceProxy::from_variance(block_variance(samples));
        let coeffs = self.dct.forward(samples)?;
        let quantized = self.quant.quantize(&coeffs, variance)?;
        let data = self.entropy.encode(&quantized)?;
        Ok(CodedBlock { variance, data })
    }

    /// Decode one coded block back into a zero-centered sample block.
    ///
    /// The status reports whether the bitstream terminated cleanly or
    /// was truncated (in which case the missing coefficients were taken
    /// as zero).
    pub fn decode_block(&self, coded: &CodedBlock) -> Result<(SampleBlock, DecodeStatus)> {
        let (quantized, status) = self.entropy.decode(&coded.data)?;
        let coeffs = self.quant.dequantize(&quantized, coded.variance)?;
        let samples = self.dct.inverse(&coeffs)?;
        Ok((samples, status))
    }
}

/// Level-shift an 8-bit pixel block into the zero-centered sample block
/// the transform expects (`pixel - 128`).
pub fn samples_from_pixels(pixels: &[u8], block_size: usize) -> Result<SampleBlock> {
    if block_size == 0 {
        return Err(Error::InvalidBlockSize { size: block_size });
    }
    if pixels.len() != block_size * block_size {
        return Err(Error::InvalidPixelData {
            expected: block_size * block_size,
            actual: pixels.len(),
        });
    }
    let data = pixels.iter().map(|&p| f64::from(p) - PIXEL_BIAS).collect();
    SampleBlock::from_data(block_size, data)
}

/// Undo the level shift: `sample + 128`, rounded and clamped to the
/// valid pixel range.
#[must_use]
pub fn pixels_from_samples(samples: &SampleBlock) -> Vec<u8> {
    samples
        .as_slice()
        .iter()
        .map(|&s| (s + PIXEL_BIAS).round().clamp(0.0, MAX_PIXEL_VALUE) as u8)
        .collect()
}
