//! Forward and inverse DCT over square blocks
//!
//! The transform context precomputes the orthonormal DCT-II basis for a
//! given block size and applies forward/inverse transforms as two matrix
//! multiplications each. Because the basis is orthonormal
//! (`basis * basis^T = I`), the inverse is the algebraic transpose of the
//! forward transform and the round trip is exact up to floating-point
//! rounding.

use std::f64::consts::PI;

use crate::block::SampleBlock;
use crate::error::{Error, Result};

/// Precomputed orthonormal DCT basis for one block size.
///
/// Immutable after construction; may be shared read-only across threads
/// processing independent blocks.
#[derive(Clone, Debug)]
pub struct DctContext {
    n: usize,
    basis: Vec<f64>,
    basis_t: Vec<f64>,
}

impl DctContext {
    /// Precompute the DCT basis and its transpose for `n`×`n` blocks.
    ///
    /// `basis[i][j] = alpha(i) * cos(pi * (2j + 1) * i / (2n))` with
    /// `alpha(0) = 1/sqrt(n)` and `alpha(i>0) = sqrt(2/n)`.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidBlockSize { size: n });
        }

        let mut basis = vec![0.0f64; n * n];
        for i in 0..n {
            let alpha = if i == 0 {
                1.0 / (n as f64).sqrt()
            } else {
                (2.0 / n as f64).sqrt()
            };
            for j in 0..n {
                basis[i * n + j] =
                    alpha * ((PI * (2 * j + 1) as f64 * i as f64) / (2.0 * n as f64)).cos();
            }
        }

        let mut basis_t = vec![0.0f64; n * n];
        for i in 0..n {
            for j in 0..n {
                basis_t[i * n + j] = basis[j * n + i];
            }
        }

        Ok(Self { n, basis, basis_t })
    }

    /// Block dimension this context was built for.
    #[inline]
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.n
    }

    /// Forward transform: `basis * block * basis^T`.
    ///
    /// Input samples are expected to be level-shifted (zero-centered) by
    /// the caller.
    pub fn forward(&self, block: &SampleBlock) -> Result<SampleBlock> {
        self.check_size(block)?;
        // temp = block * basis^T, output = basis * temp
        let temp = matmul(block.as_slice(), &self.basis_t, self.n);
        let out = matmul(&self.basis, &temp, self.n);
        SampleBlock::from_data(self.n, out)
    }

    /// Inverse transform: `basis^T * coeffs * basis`.
    pub fn inverse(&self, coeffs: &SampleBlock) -> Result<SampleBlock> {
        self.check_size(coeffs)?;
        let temp = matmul(&self.basis_t, coeffs.as_slice(), self.n);
        let out = matmul(&temp, &self.basis, self.n);
        SampleBlock::from_data(self.n, out)
    }

    fn check_size(&self, block: &SampleBlock) -> Result<()> {
        if block.size() != self.n {
            return Err(Error::BlockSizeMismatch {
                expected: self.n,
                actual: block.size(),
            });
        }
        Ok(())
    }
}

/// Multiply two n×n row-major matrices.
fn matmul(a: &[f64], b: &[f64], n: usize) -> Vec<f64> {
    let mut out = vec![0.0f64; n * n];
    for i in 0..n {
        for k in 0..n {
            let aik = a[i * n + k];
            for j in 0..n {
                out[i * n + j] += aik * b[k * n + j];
            }
        }
    }
    out
}
