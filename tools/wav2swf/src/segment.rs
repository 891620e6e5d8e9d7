//! Block segmentation
//!
//! Splits the mono sample buffer into fixed-size blocks, zero-padding the
//! tail. Padding is the only case that allocates; an already-aligned buffer
//! is borrowed as-is.

use std::borrow::Cow;

/// Number of blocks a buffer of `len` samples segments into.
pub fn block_count(len: usize, block_size: usize) -> usize {
    len.div_ceil(block_size)
}

/// Pad `samples` with trailing silence to a multiple of `block_size`.
pub fn pad_to_blocks(samples: &[i16], block_size: usize) -> Cow<'_, [i16]> {
    let padded_len = block_count(samples.len(), block_size) * block_size;
    if padded_len == samples.len() {
        Cow::Borrowed(samples)
    } else {
        let mut padded = Vec::with_capacity(padded_len);
        padded.extend_from_slice(samples);
        padded.resize(padded_len, 0);
        Cow::Owned(padded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_count_ceils() {
        assert_eq!(block_count(0, 576), 0);
        assert_eq!(block_count(1, 576), 1);
        assert_eq!(block_count(576, 576), 1);
        assert_eq!(block_count(577, 576), 2);
        // 3 seconds at 11025 Hz
        assert_eq!(block_count(33075, 576), 58);
    }

    #[test]
    fn test_aligned_buffer_is_borrowed() {
        let samples = vec![7i16; 1152];
        let padded = pad_to_blocks(&samples, 576);
        assert!(matches!(padded, Cow::Borrowed(_)));
        assert_eq!(padded.len(), 1152);
    }

    #[test]
    fn test_empty_input_yields_zero_blocks() {
        let padded = pad_to_blocks(&[], 576);
        assert!(padded.is_empty());
        assert!(matches!(padded, Cow::Borrowed(_)));
    }

    #[test]
    fn test_tail_is_zero_padded() {
        let samples = vec![123i16; 33075];
        let padded = pad_to_blocks(&samples, 576);

        assert!(matches!(padded, Cow::Owned(_)));
        assert_eq!(padded.len(), 58 * 576);
        // 57 full blocks plus 171 real samples, then 405 zeros
        assert_eq!(58 * 576 - 33075, 405);
        assert!(padded[..33075].iter().all(|&s| s == 123));
        assert!(padded[33075..].iter().all(|&s| s == 0));
    }
}
