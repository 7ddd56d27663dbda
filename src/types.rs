//! Cross-stage types for zenblock

/// Block variance quantized to a transmissible fixed-point proxy.
///
/// Adaptive quantization scales the quantization matrix by a factor
/// derived from the variance of the pre-transform sample block. The
/// decoder never sees that block, so the encoder quantizes the variance
/// to tenths in a `u16` and both sides derive the scale from this proxy,
/// making the adaptive round trip bit-exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarianceProxy(u16);

impl VarianceProxy {
    /// Proxy for zero variance (flat block).
    pub const ZERO: VarianceProxy = VarianceProxy(0);

    /// Quantize a raw variance to its wire proxy.
    ///
    /// The representable range is [0.0, 6553.5] in steps of 0.1; the
    /// adaptive scale saturates well below the upper bound, so clamping
    /// loses nothing.
    #[must_use]
    pub fn from_variance(variance: f64) -> Self {
        let clamped = variance.clamp(0.0, f64::from(u16::MAX) / 10.0);
        VarianceProxy((clamped * 10.0).round() as u16)
    }

    /// The variance value both encoder and decoder agree on.
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

/// Outcome of decoding an entropy-coded block.
///
/// The decoder never fails on a short payload; it zero-fills the
/// remaining coefficients and reports `Truncated` so callers can
/// distinguish a clean end-of-block from data loss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodeStatus {
    /// The payload terminated cleanly (end-of-block symbol or exactly
    /// N² coefficients).
    Complete,
    /// The payload ran out early; the remaining coefficients were
    /// zero-filled.
    Truncated,
}

/// One entropy-coded block plus the side information a container format
/// would carry alongside it.
///
/// The codec configuration (block size, quality, adaptive flag) is not
/// repeated per block; encoder and decoder must be constructed with the
/// same settings, the way quantization tables travel once per image in
/// conventional formats.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodedBlock {
    /// Variance proxy the encoder used for adaptive scaling. Ignored by
    /// non-adaptive codecs.
    pub variance: VarianceProxy,
    /// Self-describing entropy bitstream (symbol table + payload).
    pub data: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variance_proxy_roundtrip() {
        let proxy = VarianceProxy::from_variance(437.26);
        assert!((proxy.value() - 437.3).abs() < 1e-9);
    }

    #[test]
    fn test_variance_proxy_clamps() {
        assert_eq!(VarianceProxy::from_variance(-5.0), VarianceProxy::ZERO);
        assert_eq!(
            VarianceProxy::from_variance(1e9).value(),
            f64::from(u16::MAX) / 10.0
        );
    }
}
