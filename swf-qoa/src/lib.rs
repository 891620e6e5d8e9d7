//! swf-qoa: block codec for SWF sound stream payloads
//!
//! A QOA-derived (Quite OK Audio) codec cut down for the wav2swf pipeline.
//! It is NOT compatible with standard QOA files.
//!
//! **This is a pure codec** - it compresses blocks of mono 16-bit samples
//! into self-delimiting payload frames. Record framing (sample count, seek
//! correction) is handled by the caller (swf-common's stream block records).
//!
//! # Differences from Standard QOA
//!
//! | Feature | Standard QOA | swf-qoa |
//! |---------|--------------|---------|
//! | File magic | "qoaf" (4 bytes) | None (pure codec) |
//! | File header | 8 bytes | None (caller handles) |
//! | Frame header | 8 bytes | 3 bytes (bitrate index + samples) |
//! | Channels | 1-8 | Mono only |
//! | Frame length | up to 5120 samples | one stream block (576 or 1152) |
//!
//! The compressed frames are opaque to the container: SWF just carries them
//! inside sound records, the way it carries MPEG audio frames. The bitrate
//! ladder exists for the container's rate-control field; the ladder index is
//! recorded in every frame header.
//!
//! # Frame Format
//!
//! ```text
//! Frame header (3 bytes, repeats per encoded block):
//!   0x00: bitrate ladder index (u8)
//!   0x01: samples_in_frame (u16 BE)
//!
//! LMS state (16 bytes):
//!   history[4] as i16 BE + weights[4] as i16 BE
//!
//! Slices (8 bytes each):
//!   20 samples encoded as scalefactor (4 bits) + residuals (60 bits)
//! ```
//!
//! # Usage
//!
//! ```
//! use swf_qoa::BlockEncoder;
//!
//! let mut encoder = BlockEncoder::new(32).unwrap();
//! let block = vec![0i16; 576];
//! let payload = encoder.encode_block(&block).unwrap();
//!
//! let decoded = swf_qoa::decode(&payload, block.len()).unwrap();
//! assert_eq!(decoded.len(), block.len());
//! ```

mod decode;
mod encode;
mod lms;

pub use decode::{decode, decode_slice};
pub use encode::{encode_all, encode_slice, BlockEncoder};
pub use lms::Lms;

// =============================================================================
// Constants
// =============================================================================

/// Samples per slice (each slice is 64 bits)
pub const SLICE_LEN: usize = 20;

/// Largest block the encoder accepts per frame
pub const MAX_FRAME_SAMPLES: usize = 5120;

/// Frame header size (bitrate index + samples_in_frame)
pub const FRAME_HEADER_SIZE: usize = 3;

/// LMS state size (4 history + 4 weights as i16)
pub const LMS_STATE_SIZE: usize = 16;

/// Nominal bitrate ladder (kbit/s), fixed for a whole encode.
///
/// Mirrors the MPEG-audio ladder the target container was designed around;
/// the selected index is stamped into every frame header so a player can
/// budget its stream buffer.
pub const BITRATES: [u32; 14] = [8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160];

/// Scalefactor table (16 entries)
pub const SCALEFACTOR_TAB: [i32; 16] = [
    1, 7, 21, 45, 84, 138, 211, 304, 421, 562, 731, 928, 1157, 1419, 1715, 2048,
];

/// Quantization table (17 entries)
/// Maps residual / scalefactor result (-8..8) to 3-bit index
pub const QUANT_TAB: [u8; 17] = [
    7, 7, 7, 5, 5, 3, 3, 1, // -8..-1
    0, // 0
    0, 2, 2, 4, 4, 6, 6, 6, // 1..8
];

/// Dequantization table (16 scalefactors x 8 quantized values)
/// Pre-computed: dequant_tab[sf][qval] = round(scalefactor * dequant_mul[qval])
/// where dequant_mul = [0.75, -0.75, 2.5, -2.5, 4.5, -4.5, 7.0, -7.0]
pub const DEQUANT_TAB: [[i32; 8]; 16] = [
    [1, -1, 3, -3, 5, -5, 7, -7],
    [5, -5, 18, -18, 32, -32, 49, -49],
    [16, -16, 53, -53, 95, -95, 147, -147],
    [34, -34, 113, -113, 203, -203, 315, -315],
    [63, -63, 210, -210, 378, -378, 588, -588],
    [104, -104, 345, -345, 621, -621, 966, -966],
    [158, -158, 528, -528, 950, -950, 1477, -1477],
    [228, -228, 760, -760, 1368, -1368, 2128, -2128],
    [316, -316, 1053, -1053, 1895, -1895, 2947, -2947],
    [422, -422, 1405, -1405, 2529, -2529, 3934, -3934],
    [548, -548, 1828, -1828, 3290, -3290, 5117, -5117],
    [696, -696, 2320, -2320, 4176, -4176, 6496, -6496],
    [868, -868, 2893, -2893, 5207, -5207, 8099, -8099],
    [1064, -1064, 3548, -3548, 6386, -6386, 9933, -9933],
    [1286, -1286, 4288, -4288, 7718, -7718, 12005, -12005],
    [1536, -1536, 5120, -5120, 9216, -9216, 14336, -14336],
];

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur during encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Bitrate is not on the ladder
    UnsupportedBitrate(u32),
    /// A single block exceeds the per-frame sample limit
    BlockTooLarge(usize),
    /// Data was truncated before the requested sample count was reached
    TruncatedData,
}

impl core::fmt::Display for CodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CodecError::UnsupportedBitrate(b) => write!(f, "unsupported bitrate {b} kbit/s"),
            CodecError::BlockTooLarge(n) => {
                write!(f, "block of {n} samples exceeds {MAX_FRAME_SAMPLES} per frame")
            }
            CodecError::TruncatedData => write!(f, "truncated frame data"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Position of `bitrate` on the ladder, if it is a valid entry.
pub fn bitrate_index(bitrate: u32) -> Option<u8> {
    BITRATES.iter().position(|&b| b == bitrate).map(|i| i as u8)
}

/// Clamp value to 16-bit signed range
#[inline]
pub(crate) fn clamp_i16(v: i32) -> i32 {
    v.clamp(-32768, 32767)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_sine(freq: f32, sample_rate: u32, duration_sec: f32) -> Vec<i16> {
        let num_samples = (sample_rate as f32 * duration_sec) as usize;
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (f32::sin(t * freq * std::f32::consts::TAU) * 16000.0) as i16
            })
            .collect()
    }

    #[test]
    fn test_bitrate_index() {
        assert_eq!(bitrate_index(8), Some(0));
        assert_eq!(bitrate_index(32), Some(3));
        assert_eq!(bitrate_index(160), Some(13));
        assert_eq!(bitrate_index(33), None);
        assert_eq!(bitrate_index(192), None);
    }

    #[test]
    fn test_roundtrip_sine_blocks() {
        let original = generate_sine(440.0, 11025, 1.0);
        let mut encoder = BlockEncoder::new(32).unwrap();

        let mut payload = Vec::new();
        for block in original.chunks(576) {
            payload.extend_from_slice(&encoder.encode_block(block).unwrap());
        }

        let decoded = decode(&payload, original.len()).unwrap();
        assert_eq!(decoded.len(), original.len());
    }

    #[test]
    fn test_roundtrip_silence() {
        let original = vec![0i16; 11025];
        let payload = encode_all(&original, 32, 576).unwrap();
        let decoded = decode(&payload, original.len()).unwrap();

        assert_eq!(decoded.len(), original.len());

        let max_error: i16 = original
            .iter()
            .zip(&decoded)
            .map(|(a, b)| (a - b).abs())
            .max()
            .unwrap_or(0);
        assert!(max_error < 100, "silence max error too high: {}", max_error);
    }

    #[test]
    fn test_roundtrip_preserves_length() {
        for len in [1, 20, 100, 575, 576, 577, 1152, 33075] {
            let original: Vec<i16> = (0..len).map(|i| (i as i16).wrapping_mul(7)).collect();
            let payload = encode_all(&original, 64, 576).unwrap();
            let decoded = decode(&payload, original.len()).unwrap();

            assert_eq!(decoded.len(), original.len(), "length mismatch for {} samples", len);
        }
    }

    #[test]
    fn test_lms_carries_across_blocks() {
        // Encoding a signal as consecutive blocks with one encoder must match
        // encoding the same signal in one call: the predictor state carries.
        let signal = generate_sine(220.0, 11025, 0.25);
        let padded: Vec<i16> = {
            let mut v = signal.clone();
            v.resize(signal.len().div_ceil(576) * 576, 0);
            v
        };

        let mut encoder = BlockEncoder::new(32).unwrap();
        let mut blockwise = Vec::new();
        for block in padded.chunks(576) {
            blockwise.extend_from_slice(&encoder.encode_block(block).unwrap());
        }

        let whole = encode_all(&padded, 32, 576).unwrap();
        assert_eq!(blockwise, whole);
    }

    #[test]
    fn test_compression_ratio() {
        let original = generate_sine(440.0, 22050, 10.0);
        let payload = encode_all(&original, 32, 576).unwrap();

        let pcm_size = original.len() * 2;
        let ratio = pcm_size as f64 / payload.len() as f64;

        // Roughly 3.2 bits per sample plus per-block headers
        assert!(ratio > 4.0, "compression ratio too low: {:.2}:1", ratio);
        assert!(ratio < 6.0, "compression ratio too high: {:.2}:1", ratio);
    }
}
