//! Encoder: mono PCM blocks to framed payload bytes
//!
//! Each call to [`BlockEncoder::encode_block`] produces one self-delimiting
//! frame. The LMS predictor state is owned by the encoder and carried across
//! calls, so consecutive blocks of the same stream compress as one signal.

use crate::{
    bitrate_index, clamp_i16, CodecError, Lms, DEQUANT_TAB, MAX_FRAME_SAMPLES, QUANT_TAB,
    SCALEFACTOR_TAB, SLICE_LEN,
};

/// Encode a slice of up to 20 samples into one 64-bit word.
///
/// Tries all 16 scalefactors and keeps the one with the lowest squared error.
/// `lms` is advanced to the state produced by the winning scalefactor.
pub fn encode_slice(samples: &[i16], lms: &mut Lms) -> u64 {
    let mut best_slice = 0u64;
    let mut best_error = i64::MAX;
    let mut best_lms = *lms;

    for sf in 0..SCALEFACTOR_TAB.len() {
        let mut trial_lms = *lms;
        let mut slice = (sf as u64) << 60;
        let mut total_error = 0i64;

        for (i, &sample) in samples.iter().enumerate().take(SLICE_LEN) {
            let predicted = trial_lms.predict();
            let residual = sample as i32 - predicted;

            let scaled = residual / SCALEFACTOR_TAB[sf].max(1);
            let quantized = QUANT_TAB[(scaled.clamp(-8, 8) + 8) as usize];
            let dequantized = DEQUANT_TAB[sf][quantized as usize];
            let reconstructed = clamp_i16(predicted + dequantized);

            trial_lms.update(reconstructed, dequantized);

            let error = (sample as i32 - reconstructed) as i64;
            total_error += error * error;

            slice |= (quantized as u64) << (57 - i * 3);
        }

        if total_error < best_error {
            best_error = total_error;
            best_slice = slice;
            best_lms = trial_lms;
        }
    }

    *lms = best_lms;
    best_slice
}

/// Stateful block encoder.
///
/// Construction validates the bitrate against the ladder (fail-fast); the
/// ladder index is stamped into every frame header.
#[derive(Debug, Clone)]
pub struct BlockEncoder {
    lms: Lms,
    bitrate_index: u8,
}

impl BlockEncoder {
    /// Create an encoder for the whole run.
    ///
    /// # Errors
    /// Returns [`CodecError::UnsupportedBitrate`] if `bitrate` is not on the
    /// ladder.
    pub fn new(bitrate: u32) -> Result<Self, CodecError> {
        let bitrate_index =
            bitrate_index(bitrate).ok_or(CodecError::UnsupportedBitrate(bitrate))?;
        Ok(Self {
            lms: Lms::new(),
            bitrate_index,
        })
    }

    /// Encode one block of mono samples into a frame payload.
    ///
    /// # Errors
    /// Returns [`CodecError::BlockTooLarge`] if the block exceeds the
    /// per-frame sample limit.
    pub fn encode_block(&mut self, samples: &[i16]) -> Result<Vec<u8>, CodecError> {
        if samples.len() > MAX_FRAME_SAMPLES {
            return Err(CodecError::BlockTooLarge(samples.len()));
        }

        let slices = samples.len().div_ceil(SLICE_LEN);
        let mut frame = Vec::with_capacity(3 + 16 + slices * 8);

        // Frame header: ladder index + sample count
        frame.push(self.bitrate_index);
        frame.extend_from_slice(&(samples.len() as u16).to_be_bytes());

        // Snapshot of the predictor state at frame start
        self.lms.write_state(&mut frame);

        for chunk in samples.chunks(SLICE_LEN) {
            let slice = encode_slice(chunk, &mut self.lms);
            frame.extend_from_slice(&slice.to_be_bytes());
        }

        Ok(frame)
    }
}

/// Encode an entire sample buffer as consecutive `block_size` frames.
///
/// Used for the embedded-resource path, where the whole buffer is compressed
/// in one go instead of being interleaved with timeline records.
pub fn encode_all(samples: &[i16], bitrate: u32, block_size: usize) -> Result<Vec<u8>, CodecError> {
    let mut encoder = BlockEncoder::new(bitrate)?;
    let mut payload = Vec::new();
    for block in samples.chunks(block_size.max(1)) {
        payload.extend_from_slice(&encoder.encode_block(block)?);
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FRAME_HEADER_SIZE, LMS_STATE_SIZE};

    #[test]
    fn test_rejects_bad_bitrate() {
        assert_eq!(
            BlockEncoder::new(33).unwrap_err(),
            CodecError::UnsupportedBitrate(33)
        );
        assert!(BlockEncoder::new(32).is_ok());
    }

    #[test]
    fn test_rejects_oversized_block() {
        let mut encoder = BlockEncoder::new(32).unwrap();
        let huge = vec![0i16; MAX_FRAME_SAMPLES + 1];
        assert_eq!(
            encoder.encode_block(&huge).unwrap_err(),
            CodecError::BlockTooLarge(MAX_FRAME_SAMPLES + 1)
        );
    }

    #[test]
    fn test_frame_layout() {
        let mut encoder = BlockEncoder::new(32).unwrap();
        let frame = encoder.encode_block(&[100i16; 576]).unwrap();

        // 576 samples -> 29 slices (28 full + 1 partial)
        let slices = 576usize.div_ceil(SLICE_LEN);
        assert_eq!(frame.len(), FRAME_HEADER_SIZE + LMS_STATE_SIZE + slices * 8);

        assert_eq!(frame[0], 3); // ladder index of 32 kbit/s
        assert_eq!(u16::from_be_bytes([frame[1], frame[2]]), 576);
    }

    #[test]
    fn test_empty_block_is_header_only() {
        let mut encoder = BlockEncoder::new(8).unwrap();
        let frame = encoder.encode_block(&[]).unwrap();
        assert_eq!(frame.len(), FRAME_HEADER_SIZE + LMS_STATE_SIZE);
    }

    #[test]
    fn test_encode_all_empty() {
        let payload = encode_all(&[], 32, 576).unwrap();
        assert!(payload.is_empty());
    }
}
