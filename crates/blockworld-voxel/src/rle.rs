//! Run-Length Encoding (RLE) for chunk block arrays.
//!
//! Runs of identical block codes compress to `(value, count)` pairs. The
//! persisted form is the flat sequence `[code, count, code, count, ...]`.

use crate::block::BlockId;

/// Longest run a single pair can describe; longer runs are split.
pub const MAX_RUN_LENGTH: u16 = u16::MAX;

/// A single RLE run: `count` consecutive occurrences of `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RleRun {
    /// The block code.
    pub value: BlockId,
    /// Number of consecutive identical codes (1..=65535).
    pub count: u16,
}

/// Errors that can occur during RLE decoding.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RleError {
    /// Decoded length does not match expected length.
    #[error("RLE length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected number of elements.
        expected: usize,
        /// Actual number of decoded elements.
        actual: usize,
    },
    /// A flat pair sequence ended in the middle of a pair.
    #[error("RLE pair sequence has odd length {0}")]
    OddLength(usize),
}

/// Encodes a block array into RLE runs.
///
/// Runs are capped at [`MAX_RUN_LENGTH`]. An empty input produces an empty output.
pub fn rle_encode(blocks: &[BlockId]) -> Vec<RleRun> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < blocks.len() {
        let value = blocks[i];
        let mut count: u16 = 1;
        loop {
            let idx = i + (count as usize);
            if idx >= blocks.len() || blocks[idx] != value || count == MAX_RUN_LENGTH {
                break;
            }
            count += 1;
        }
        runs.push(RleRun { value, count });
        i += count as usize;
    }
    runs
}

/// Decodes RLE runs back into a dense block array.
///
/// Returns an error if the total decoded length does not match `expected_len`.
/// The length is checked before anything is allocated.
pub fn rle_decode(runs: &[RleRun], expected_len: usize) -> Result<Vec<BlockId>, RleError> {
    let total: usize = runs.iter().map(|r| r.count as usize).sum();
    if total != expected_len {
        return Err(RleError::LengthMismatch {
            expected: expected_len,
            actual: total,
        });
    }
    let mut result = Vec::with_capacity(expected_len);
    for run in runs {
        result.extend(std::iter::repeat_n(run.value, run.count as usize));
    }
    Ok(result)
}

/// Flattens runs into the persisted `[code, count, ...]` form.
pub fn runs_to_pairs(runs: &[RleRun]) -> Vec<u16> {
    let mut pairs = Vec::with_capacity(runs.len() * 2);
    for run in runs {
        pairs.push(run.value.0);
        pairs.push(run.count);
    }
    pairs
}

/// Parses the persisted `[code, count, ...]` form into runs.
pub fn runs_from_pairs(pairs: &[u16]) -> Result<Vec<RleRun>, RleError> {
    if pairs.len() % 2 != 0 {
        return Err(RleError::OddLength(pairs.len()));
    }
    Ok(pairs
        .chunks_exact(2)
        .map(|pair| RleRun {
            value: BlockId(pair[0]),
            count: pair[1],
        })
        .collect())
}

/// Encodes a block array straight to the persisted pair form.
pub fn encode_blocks(blocks: &[BlockId]) -> Vec<u16> {
    runs_to_pairs(&rle_encode(blocks))
}

/// Decodes the persisted pair form, requiring exactly `expected_len` blocks.
pub fn decode_blocks(pairs: &[u16], expected_len: usize) -> Result<Vec<BlockId>, RleError> {
    rle_decode(&runs_from_pairs(pairs)?, expected_len)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CHUNK_VOLUME;

    #[test]
    fn test_uniform_chunk_single_run() {
        let blocks = vec![BlockId::AIR; CHUNK_VOLUME];
        let runs = rle_encode(&blocks);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].count as usize, CHUNK_VOLUME);
        assert_eq!(runs[0].value, BlockId::AIR);
        assert_eq!(encode_blocks(&blocks), vec![0, CHUNK_VOLUME as u16]);
    }

    #[test]
    fn test_empty_input() {
        assert!(rle_encode(&[]).is_empty());
        assert_eq!(decode_blocks(&[], 0).unwrap(), Vec::<BlockId>::new());
    }

    #[test]
    fn test_single_element_runs() {
        let blocks: Vec<BlockId> = (0..100).map(|i| BlockId((i % 3) as u16)).collect();
        let runs = rle_encode(&blocks);
        assert_eq!(runs.len(), 100);
        assert!(runs.iter().all(|r| r.count == 1));
        assert_eq!(rle_decode(&runs, 100).unwrap(), blocks);
    }

    #[test]
    fn test_run_longer_than_limit_splits() {
        let len = MAX_RUN_LENGTH as usize * 2 + 7;
        let blocks = vec![BlockId::STONE; len];
        let runs = rle_encode(&blocks);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].count, MAX_RUN_LENGTH);
        assert_eq!(runs[1].count, MAX_RUN_LENGTH);
        assert_eq!(runs[2].count, 7);
        assert_eq!(decode_blocks(&encode_blocks(&blocks), len).unwrap(), blocks);
    }

    #[test]
    fn test_exact_limit_is_one_run() {
        let blocks = vec![BlockId::DIRT; MAX_RUN_LENGTH as usize];
        let runs = rle_encode(&blocks);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].count, MAX_RUN_LENGTH);
    }

    #[test]
    fn test_layered_chunk_roundtrip() {
        let mut blocks = vec![BlockId::AIR; CHUNK_VOLUME];
        for (i, b) in blocks.iter_mut().enumerate() {
            let y = i / 256;
            *b = match y {
                0..=30 => BlockId::STONE,
                31..=33 => BlockId::DIRT,
                34 => BlockId::GRASS,
                _ => BlockId::AIR,
            };
        }
        blocks[5_000] = BlockId::GLASS;
        let pairs = encode_blocks(&blocks);
        assert!(pairs.len() < 16);
        assert_eq!(decode_blocks(&pairs, CHUNK_VOLUME).unwrap(), blocks);
    }

    #[test]
    fn test_length_mismatch_short_and_long() {
        let short = decode_blocks(&[3, 10], CHUNK_VOLUME);
        assert_eq!(
            short,
            Err(RleError::LengthMismatch {
                expected: CHUNK_VOLUME,
                actual: 10
            })
        );

        let long = decode_blocks(&[0, u16::MAX], 100);
        assert!(matches!(long, Err(RleError::LengthMismatch { actual: 65_535, .. })));
    }

    #[test]
    fn test_odd_pair_sequence_rejected() {
        assert_eq!(decode_blocks(&[1, 2, 3], 2), Err(RleError::OddLength(3)));
    }
}
