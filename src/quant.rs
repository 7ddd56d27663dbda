//! Quantization of DCT coefficients
//!
//! A quantization context owns a perceptually-weighted quantization
//! matrix and its reciprocal, generated once from the quality factor.
//! For 8x8 blocks the matrix scales the standard luminance base table;
//! other sizes synthesize a radially increasing matrix. In adaptive mode
//! a transient per-block matrix is derived from the block variance so
//! that flat blocks are quantized harder than detailed ones; the owned
//! matrices are never mutated.

use crate::block::{CoeffBlock, SampleBlock};
use crate::consts::{MAX_QUALITY, MIN_QUALITY, STD_LUMA_QUANT};
use crate::error::{Error, Result};
use crate::types::VarianceProxy;

/// Variance normalization divisor for the adaptive scale.
const VARIANCE_NORM: f64 = 1000.0;

/// Normalized variance bounds; scale ranges over [1.0, 1.9].
const NORM_VARIANCE_MIN: f64 = 0.1;
const NORM_VARIANCE_MAX: f64 = 1.0;

/// Quantization matrix cell bounds.
const QUANT_CELL_MIN: f64 = 1.0;
const QUANT_CELL_MAX: f64 = 255.0;

/// Precomputed quantization tables for one (block size, quality,
/// adaptive) triple.
///
/// Immutable after construction; shareable read-only across threads.
#[derive(Clone, Debug)]
pub struct QuantContext {
    n: usize,
    quality: u8,
    adaptive: bool,
    quant: Vec<f64>,
    dequant: Vec<f64>,
}

impl QuantContext {
    /// Build quantization and dequantization matrices.
    ///
    /// `quality` is clamped to [1, 100]; `block_size` of zero is an
    /// error.
    pub fn new(block_size: usize, quality: u8, adaptive: bool) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::InvalidBlockSize { size: block_size });
        }
        Ok(Self::with_validated(block_size, quality, adaptive))
    }

    /// Constructor for an already-validated block size.
    pub(crate) fn with_validated(n: usize, quality: u8, adaptive: bool) -> Self {
        let quality = quality.clamp(MIN_QUALITY, MAX_QUALITY);
        let quant = generate_quant_matrix(n, quality);
        let dequant = quant.iter().map(|&v| 1.0 / v).collect();
        Self {
            n,
            quality,
            adaptive,
            quant,
            dequant,
        }
    }

    /// Block dimension this context was built for.
    #[inline]
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.n
    }

    /// Clamped quality factor.
    #[inline]
    #[must_use]
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Whether per-block variance scaling is enabled.
    #[inline]
    #[must_use]
    pub fn is_adaptive(&self) -> bool {
        self.adaptive
    }

    /// Quantize DCT coefficients: each cell becomes
    /// `round(coeff / matrix_cell)`.
    ///
    /// `variance` is consulted only in adaptive mode; pass the proxy the
    /// matching `dequantize` call will receive.
    pub fn quantize(&self, coeffs: &SampleBlock, variance: VarianceProxy) -> Result<CoeffBlock> {
        self.check_size(coeffs.size())?;
        let scale = self.adaptive.then(|| adaptive_scale(variance));

        let mut out = CoeffBlock::zeroed(self.n);
        for idx in 0..self.n * self.n {
            let cell = self.effective_cell(idx, scale);
            out.as_mut_slice()[idx] = (coeffs.as_slice()[idx] / cell).round() as i32;
        }
        Ok(out)
    }

    /// Dequantize coefficients: each cell becomes
    /// `quant_coeff * (1 / reciprocal_cell)`, restoring the magnitude
    /// the encoder divided away. Given the same variance proxy the
    /// encoder used, the effective step mirrors `quantize` exactly.
    pub fn dequantize(&self, coeffs: &CoeffBlock, variance: VarianceProxy) -> Result<SampleBlock> {
        self.check_size(coeffs.size())?;
        let scale = self.adaptive.then(|| adaptive_scale(variance));

        let mut out = SampleBlock::zeroed(self.n);
        for idx in 0..self.n * self.n {
            let reciprocal = match scale {
                Some(s) if idx != 0 => self.dequant[idx] / s,
                _ => self.dequant[idx],
            };
            out.as_mut_slice()[idx] = f64::from(coeffs.as_slice()[idx]) / reciprocal;
        }
        Ok(out)
    }

    /// The quantization divisor for one cell under an optional adaptive
    /// scale. The DC cell is never scaled, preserving brightness
    /// fidelity; scaled AC cells are clamped to at least 1.0.
    fn effective_cell(&self, idx: usize, scale: Option<f64>) -> f64 {
        let base = self.quant[idx];
        match scale {
            Some(s) if idx != 0 => (base * s).max(QUANT_CELL_MIN),
            _ => base,
        }
    }

    fn check_size(&self, actual: usize) -> Result<()> {
        if actual != self.n {
            return Err(Error::BlockSizeMismatch {
                expected: self.n,
                actual,
            });
        }
        Ok(())
    }
}

/// Population variance `E[x²] - (E[x])²` over all samples of a block.
#[must_use]
pub fn block_variance(block: &SampleBlock) -> f64 {
    let count = block.len() as f64;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for &v in block.as_slice() {
        sum += v;
        sum_sq += v * v;
    }
    let mean = sum / count;
    sum_sq / count - mean * mean
}

/// Adaptive matrix multiplier for a block variance proxy.
///
/// High variance (detail) lowers the scale toward 1.0 to preserve
/// detail; low variance (flat areas) raises it toward 1.9.
fn adaptive_scale(variance: VarianceProxy) -> f64 {
    let norm = (variance.value() / VARIANCE_NORM).clamp(NORM_VARIANCE_MIN, NORM_VARIANCE_MAX);
    2.0 - norm
}

/// Generate the quantization matrix for a block size and clamped
/// quality factor.
fn generate_quant_matrix(n: usize, quality: u8) -> Vec<f64> {
    let scale = if quality < 50 {
        5000.0 / f64::from(quality)
    } else {
        200.0 - 2.0 * f64::from(quality)
    } / 100.0;

    let mut matrix = vec![0.0f64; n * n];
    if n == 8 {
        for (idx, cell) in matrix.iter_mut().enumerate() {
            *cell = (f64::from(STD_LUMA_QUANT[idx]) * scale).clamp(QUANT_CELL_MIN, QUANT_CELL_MAX);
        }
    } else {
        // Radially increasing weights for non-standard sizes
        for i in 0..n {
            for j in 0..n {
                let distance = ((i * i + j * j) as f64).sqrt();
                matrix[i * n + j] =
                    ((1.0 + distance) * scale * 8.0).clamp(QUANT_CELL_MIN, QUANT_CELL_MAX);
            }
        }
    }
    matrix
}
