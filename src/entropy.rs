//! Entropy coding of quantized coefficient blocks
//!
//! Encoding runs zigzag reordering, run-length encoding, per-block
//! Huffman construction, and bit packing into a self-describing wire
//! format; decoding reverses each stage. All Huffman state is built and
//! discarded inside a single call, so one coder can serve many blocks
//! and contexts may be shared across threads.
//!
//! Wire format (multi-byte integers big-endian, bits MSB-first):
//!
//! ```text
//! [16 bits] unique symbol count
//! per symbol, in dense-index order:
//!   [32 bits] packed key (run << 16 | signed-magnitude value)
//!   [8 bits]  huffman code length
//! [payload]  canonical-Huffman-coded RLE symbol stream
//! ```

use byteorder::{BigEndian, ReadBytesExt};

use crate::bitio::{BitReader, BitWriter};
use crate::block::CoeffBlock;
use crate::consts::{MAX_ALPHABET_SIZE, MAX_RUN_LENGTH, MAX_SYMBOL_MAGNITUDE};
use crate::error::{Error, Result};
use crate::huffman::{self, DecodeTree};
use crate::types::DecodeStatus;

/// One run-length symbol: `run` zeros followed by `value` in zigzag
/// order. `(0, 0)` is the end-of-block sentinel; real runs always
/// collapse leading zeros before a nonzero value, so the sentinel never
/// arises from data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RleSymbol {
    /// Number of zeros preceding the value
    pub run: u16,
    /// The nonzero value (zero only for the end-of-block sentinel)
    pub value: i32,
}

impl RleSymbol {
    /// End-of-block sentinel: all remaining coefficients are zero.
    pub const EOB: RleSymbol = RleSymbol { run: 0, value: 0 };

    /// True for the end-of-block sentinel.
    #[inline]
    #[must_use]
    pub fn is_eob(self) -> bool {
        self == Self::EOB
    }
}

/// Per-block-size entropy coder.
///
/// Owns only the precomputed zigzag scan table; every encode/decode
/// call keeps its transient state (RLE symbols, Huffman tree, cursors)
/// on its own stack.
#[derive(Clone, Debug)]
pub struct EntropyCoder {
    n: usize,
    scan: Vec<usize>,
}

impl EntropyCoder {
    /// Create a coder for `n`×`n` blocks.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidBlockSize { size: n });
        }
        Ok(Self {
            n,
            scan: scan_order(n),
        })
    }

    /// Block dimension this coder was built for.
    #[inline]
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.n
    }

    /// Reorder a coefficient block into its zigzag sequence.
    pub fn zigzag_scan(&self, block: &CoeffBlock) -> Result<Vec<i32>> {
        if block.size() != self.n {
            return Err(Error::BlockSizeMismatch {
                expected: self.n,
                actual: block.size(),
            });
        }
        let mut seq = vec![0i32; block.len()];
        for (idx, &dest) in self.scan.iter().enumerate() {
            seq[dest] = block.as_slice()[idx];
        }
        Ok(seq)
    }

    /// Scatter a zigzag sequence back into a coefficient block.
    pub fn inverse_zigzag(&self, seq: &[i32]) -> Result<CoeffBlock> {
        if seq.len() != self.n * self.n {
            return Err(Error::InvalidPixelData {
                expected: self.n * self.n,
                actual: seq.len(),
            });
        }
        let mut block = CoeffBlock::zeroed(self.n);
        for (idx, &src) in self.scan.iter().enumerate() {
            block.as_mut_slice()[idx] = seq[src];
        }
        Ok(block)
    }

    /// Entropy-encode a quantized coefficient block into a
    /// self-describing bitstream.
    pub fn encode(&self, block: &CoeffBlock) -> Result<Vec<u8>> {
        let seq = self.zigzag_scan(block)?;
        let symbols = rle_encode(&seq);

        // Deduplicate packed keys into a dense alphabet
        let mut keys: Vec<u32> = Vec::new();
        let mut freqs: Vec<u64> = Vec::new();
        let mut dense: Vec<u16> = Vec::with_capacity(symbols.len());
        for sym in &symbols {
            let key = pack_symbol(*sym)?;
            let idx = match keys.iter().position(|&k| k == key) {
                Some(idx) => idx,
                None => {
                    if keys.len() >= MAX_ALPHABET_SIZE {
                        return Err(Error::AlphabetOverflow {
                            count: keys.len() + 1,
                        });
                    }
                    keys.push(key);
                    freqs.push(0);
                    keys.len() - 1
                }
            };
            freqs[idx] += 1;
            dense.push(idx as u16);
        }

        let lengths = huffman::code_lengths(&freqs)?;
        let codes = huffman::canonical_codes(&lengths)?;

        let payload_bits: usize = freqs
            .iter()
            .zip(&lengths)
            .map(|(&f, &l)| f as usize * usize::from(l))
            .sum();
        let mut writer = BitWriter::new((payload_bits + 7) / 8);
        for &idx in &dense {
            let code = codes[usize::from(idx)];
            writer.write_bits(code.bits, code.len)?;
        }

        let mut out = Vec::with_capacity(2 + 5 * keys.len() + (payload_bits + 7) / 8);
        out.extend_from_slice(&(keys.len() as u16).to_be_bytes());
        for (key, len) in keys.iter().zip(&lengths) {
            out.extend_from_slice(&key.to_be_bytes());
            out.push(*len);
        }
        out.extend_from_slice(&writer.finish());
        Ok(out)
    }

    /// Decode an entropy-coded bitstream back into a coefficient block.
    ///
    /// A short or exhausted payload is not an error: the remaining
    /// coefficients are zero-filled and the status reports
    /// [`DecodeStatus::Truncated`]. A symbol table that does not
    /// describe a valid prefix code is rejected as
    /// [`Error::InvalidSymbolTable`].
    pub fn decode(&self, data: &[u8]) -> Result<(CoeffBlock, DecodeStatus)> {
        let len = self.n * self.n;
        let mut cursor = data;

        let count = match cursor.read_u16::<BigEndian>() {
            Ok(count) => usize::from(count),
            Err(_) => return Ok((CoeffBlock::zeroed(self.n), DecodeStatus::Truncated)),
        };
        if count == 0 {
            return Ok((CoeffBlock::zeroed(self.n), DecodeStatus::Complete));
        }

        let mut keys = Vec::with_capacity(count);
        let mut lengths = Vec::with_capacity(count);
        for _ in 0..count {
            let key = match cursor.read_u32::<BigEndian>() {
                Ok(key) => key,
                Err(_) => return Ok((CoeffBlock::zeroed(self.n), DecodeStatus::Truncated)),
            };
            let length = match cursor.read_u8() {
                Ok(length) => length,
                Err(_) => return Ok((CoeffBlock::zeroed(self.n), DecodeStatus::Truncated)),
            };
            keys.push(key);
            lengths.push(length);
        }

        let tree = DecodeTree::from_lengths(&lengths)?;
        let mut reader = BitReader::new(cursor);
        let mut seq = vec![0i32; len];
        let mut pos = 0usize;
        let mut status = DecodeStatus::Complete;

        'blocks: while pos < len {
            // Walk the tree bit by bit until a leaf
            let mut node = DecodeTree::ROOT;
            let dense_idx = loop {
                if let Some(sym) = tree.symbol(node) {
                    break sym;
                }
                let bit = match reader.read_bit() {
                    Ok(bit) => bit,
                    Err(_) => {
                        status = DecodeStatus::Truncated;
                        break 'blocks;
                    }
                };
                node = match tree.step(node, bit) {
                    Some(next) => next,
                    None => {
                        status = DecodeStatus::Truncated;
                        break 'blocks;
                    }
                };
            };

            let symbol = unpack_symbol(keys[usize::from(dense_idx)]);
            if symbol.is_eob() {
                break;
            }
            pos += usize::from(symbol.run);
            if pos < len {
                seq[pos] = symbol.value;
                pos += 1;
            } else {
                break;
            }
        }

        Ok((self.inverse_zigzag(&seq)?, status))
    }
}

/// Build the diagonal scan table for an `n`×`n` block by walking
/// anti-diagonals in alternating direction (up-right on even diagonal
/// sums, down-left on odd) and recording each visited flat index in
/// turn.
fn scan_order(n: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(n * n);
    for sum in 0..=2 * (n - 1) {
        let lo = sum.saturating_sub(n - 1);
        let hi = sum.min(n - 1);
        if sum % 2 == 0 {
            for i in (lo..=hi).rev() {
                order.push(i * n + (sum - i));
            }
        } else {
            for i in lo..=hi {
                order.push(i * n + (sum - i));
            }
        }
    }
    order
}

/// Run-length encode a zigzag sequence.
///
/// Trailing zeros collapse into the end-of-block sentinel; a sequence
/// ending in a nonzero value carries no sentinel.
#[must_use]
pub fn rle_encode(seq: &[i32]) -> Vec<RleSymbol> {
    let mut symbols = Vec::new();
    let mut run = 0u16;
    for &value in seq {
        if value != 0 {
            symbols.push(RleSymbol { run, value });
            run = 0;
        } else {
            run = run.saturating_add(1);
        }
    }
    if run > 0 {
        symbols.push(RleSymbol::EOB);
    }
    symbols
}

/// Expand run-length symbols back into a zigzag sequence of `len`
/// coefficients.
#[must_use]
pub fn rle_decode(symbols: &[RleSymbol], len: usize) -> Vec<i32> {
    let mut seq = vec![0i32; len];
    let mut pos = 0usize;
    for sym in symbols {
        if sym.is_eob() {
            break;
        }
        pos += usize::from(sym.run);
        if pos >= len {
            break;
        }
        seq[pos] = sym.value;
        pos += 1;
    }
    seq
}

/// Pack an RLE symbol into its 32-bit wire key:
/// `run << 16 | sign bit << 15 | magnitude`.
fn pack_symbol(sym: RleSymbol) -> Result<u32> {
    let magnitude = sym.value.unsigned_abs();
    if sym.run > MAX_RUN_LENGTH || magnitude > MAX_SYMBOL_MAGNITUDE as u32 {
        return Err(Error::SymbolRange {
            run: sym.run,
            value: sym.value,
        });
    }
    let encoded = if sym.value < 0 {
        0x8000 | magnitude
    } else {
        magnitude
    };
    Ok(u32::from(sym.run) << 16 | encoded)
}

/// Inverse of [`pack_symbol`].
fn unpack_symbol(key: u32) -> RleSymbol {
    let run = (key >> 16) as u16;
    let magnitude = (key & 0x7FFF) as i32;
    let value = if key & 0x8000 != 0 {
        -magnitude
    } else {
        magnitude
    };
    RleSymbol { run, value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{ZIGZAG_INDEX_4X4, ZIGZAG_INDEX_8X8};

    fn sequential_block(n: usize) -> CoeffBlock {
        CoeffBlock::from_data(n, (0..(n * n) as i32).collect()).unwrap()
    }

    #[test]
    fn test_zigzag_canonical_4x4() {
        let coder = EntropyCoder::new(4).unwrap();
        let seq = coder.zigzag_scan(&sequential_block(4)).unwrap();
        assert_eq!(
            seq,
            vec![0, 1, 5, 6, 2, 4, 7, 12, 3, 8, 11, 13, 9, 10, 14, 15]
        );
        let expected: Vec<i32> = ZIGZAG_INDEX_4X4.iter().map(|&v| v as i32).collect();
        assert_eq!(seq, expected);
    }

    #[test]
    fn test_zigzag_canonical_8x8() {
        let coder = EntropyCoder::new(8).unwrap();
        let seq = coder.zigzag_scan(&sequential_block(8)).unwrap();
        assert_eq!(&seq[..8], &[0, 1, 5, 6, 14, 15, 27, 28]);
        let expected: Vec<i32> = ZIGZAG_INDEX_8X8.iter().map(|&v| v as i32).collect();
        assert_eq!(seq, expected);
    }

    #[test]
    fn test_zigzag_bijection() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(0xb1ec);

        for n in [1, 2, 3, 5, 8, 16] {
            let coder = EntropyCoder::new(n).unwrap();
            let data: Vec<i32> = (0..n * n).map(|_| rng.gen_range(-999..999)).collect();
            let block = CoeffBlock::from_data(n, data).unwrap();
            let restored = coder
                .inverse_zigzag(&coder.zigzag_scan(&block).unwrap())
                .unwrap();
            assert_eq!(block, restored, "bijection failed for n={}", n);
        }
    }

    #[test]
    fn test_rle_fixture() {
        let seq = [100, 0, 0, 50, 0, 0, 0, 0, 25, 0, 0, 0, 0, 0, 0, 0];
        let symbols = rle_encode(&seq);
        assert_eq!(
            symbols,
            vec![
                RleSymbol { run: 0, value: 100 },
                RleSymbol { run: 2, value: 50 },
                RleSymbol { run: 4, value: 25 },
                RleSymbol::EOB,
            ]
        );
    }

    #[test]
    fn test_rle_roundtrip() {
        let cases: Vec<Vec<i32>> = vec![
            vec![0; 16],
            vec![7; 16],
            vec![0, 0, 0, -3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 9],
            vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ];
        for seq in cases {
            let decoded = rle_decode(&rle_encode(&seq), seq.len());
            assert_eq!(decoded, seq);
        }
    }

    #[test]
    fn test_rle_no_sentinel_when_dense() {
        let seq = [1, 2, 3, 4];
        let symbols = rle_encode(&seq);
        assert_eq!(symbols.len(), 4);
        assert!(!symbols.iter().any(|s| s.is_eob()));
    }

    #[test]
    fn test_pack_symbol_roundtrip() {
        for sym in [
            RleSymbol { run: 0, value: 1 },
            RleSymbol { run: 255, value: -32767 },
            RleSymbol { run: 16, value: 32767 },
            RleSymbol::EOB,
        ] {
            assert_eq!(unpack_symbol(pack_symbol(sym).unwrap()), sym);
        }
    }

    #[test]
    fn test_pack_symbol_range_errors() {
        assert!(matches!(
            pack_symbol(RleSymbol { run: 256, value: 1 }),
            Err(Error::SymbolRange { .. })
        ));
        assert!(matches!(
            pack_symbol(RleSymbol { run: 0, value: 32768 }),
            Err(Error::SymbolRange { .. })
        ));
        assert!(matches!(
            pack_symbol(RleSymbol { run: 0, value: -40000 }),
            Err(Error::SymbolRange { .. })
        ));
    }

    #[test]
    fn test_encode_decode_all_zero() {
        let coder = EntropyCoder::new(8).unwrap();
        let block = CoeffBlock::new(8).unwrap();
        let data = coder.encode(&block).unwrap();
        // 1 symbol table entry (EOB) + 1 payload bit
        assert_eq!(data.len(), 2 + 5 + 1);

        let (decoded, status) = coder.decode(&data).unwrap();
        assert_eq!(status, DecodeStatus::Complete);
        assert_eq!(decoded, block);
    }

    #[test]
    fn test_encode_decode_dc_only() {
        let coder = EntropyCoder::new(8).unwrap();
        let mut block = CoeffBlock::new(8).unwrap();
        block[(0, 0)] = -45;
        let data = coder.encode(&block).unwrap();

        let (decoded, status) = coder.decode(&data).unwrap();
        assert_eq!(status, DecodeStatus::Complete);
        assert_eq!(decoded, block);
    }

    #[test]
    fn test_encode_decode_sparse() {
        let coder = EntropyCoder::new(8).unwrap();
        let mut block = CoeffBlock::new(8).unwrap();
        block[(0, 0)] = 120;
        block[(0, 1)] = -31;
        block[(1, 0)] = -31;
        block[(2, 2)] = 7;
        block[(7, 7)] = 1;
        let data = coder.encode(&block).unwrap();

        let (decoded, status) = coder.decode(&data).unwrap();
        assert_eq!(status, DecodeStatus::Complete);
        assert_eq!(decoded, block);
    }

    #[test]
    fn test_encode_decode_dense() {
        // Every coefficient nonzero: no sentinel on the wire
        let coder = EntropyCoder::new(4).unwrap();
        let block = CoeffBlock::from_data(4, (1..=16).collect()).unwrap();
        let data = coder.encode(&block).unwrap();

        let (decoded, status) = coder.decode(&data).unwrap();
        assert_eq!(status, DecodeStatus::Complete);
        assert_eq!(decoded, block);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let coder = EntropyCoder::new(8).unwrap();
        let mut block = CoeffBlock::new(8).unwrap();
        for (idx, v) in block.as_mut_slice().iter_mut().enumerate() {
            *v = ((idx * 7) % 5) as i32 - 2;
        }
        assert_eq!(coder.encode(&block).unwrap(), coder.encode(&block).unwrap());
    }

    #[test]
    fn test_truncated_payload_zero_fills() {
        let coder = EntropyCoder::new(8).unwrap();
        let mut block = CoeffBlock::new(8).unwrap();
        block[(0, 0)] = 90;
        block[(3, 4)] = -12;
        block[(6, 1)] = 4;
        let data = coder.encode(&block).unwrap();

        // Chop the payload mid-stream
        let (truncated, status) = coder.decode(&data[..data.len() - 1]).unwrap();
        assert_eq!(status, DecodeStatus::Truncated);
        // Whatever decoded before the cut must match the original
        for idx in 0..64 {
            let v = truncated.as_slice()[idx];
            assert!(v == 0 || v == block.as_slice()[idx]);
        }
    }

    #[test]
    fn test_truncated_header_zero_fills() {
        let coder = EntropyCoder::new(8).unwrap();
        let (decoded, status) = coder.decode(&[0x00]).unwrap();
        assert_eq!(status, DecodeStatus::Truncated);
        assert!(decoded.as_slice().iter().all(|&v| v == 0));

        let (decoded, status) = coder.decode(&[]).unwrap();
        assert_eq!(status, DecodeStatus::Truncated);
        assert!(decoded.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_corrupt_symbol_table_rejected() {
        // count = 3, three identical 1-bit lengths oversubscribe the
        // code space
        let mut data = Vec::new();
        data.extend_from_slice(&3u16.to_be_bytes());
        for key in [0u32, 0x0001_0000, 0x0002_0000] {
            data.extend_from_slice(&key.to_be_bytes());
            data.push(1);
        }
        let coder = EntropyCoder::new(8).unwrap();
        assert!(matches!(
            coder.decode(&data),
            Err(Error::InvalidSymbolTable)
        ));
    }

    #[test]
    fn test_symbol_range_surfaces_from_encode() {
        let coder = EntropyCoder::new(8).unwrap();
        let mut block = CoeffBlock::new(8).unwrap();
        block[(0, 0)] = 100_000;
        assert!(matches!(
            coder.encode(&block),
            Err(Error::SymbolRange { .. })
        ));
    }

    #[test]
    fn test_degenerate_one_by_one_block() {
        let coder = EntropyCoder::new(1).unwrap();
        let block = CoeffBlock::from_data(1, vec![42]).unwrap();
        let data = coder.encode(&block).unwrap();
        let (decoded, status) = coder.decode(&data).unwrap();
        assert_eq!(status, DecodeStatus::Complete);
        assert_eq!(decoded, block);
    }
}
