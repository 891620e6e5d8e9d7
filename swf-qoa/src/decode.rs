//! Decoder: framed payload bytes back to mono PCM
//!
//! Used by the tests and by anything that wants to audit an encoded stream;
//! the conversion pipeline itself only encodes.

use crate::{CodecError, Lms, DEQUANT_TAB, FRAME_HEADER_SIZE, LMS_STATE_SIZE, SLICE_LEN};

/// Decode a single 64-bit slice into `output` (up to 20 samples).
///
/// Returns the number of samples written.
pub fn decode_slice(slice: u64, lms: &mut Lms, output: &mut [i16]) -> usize {
    let scalefactor = ((slice >> 60) & 0xF) as usize;
    let count = output.len().min(SLICE_LEN);

    for (i, out) in output.iter_mut().enumerate().take(count) {
        let quantized = ((slice >> (57 - i * 3)) & 0x7) as usize;

        let predicted = lms.predict();
        let dequantized = DEQUANT_TAB[scalefactor][quantized];
        let sample = crate::clamp_i16(predicted + dequantized);

        lms.update(sample, dequantized);
        *out = sample as i16;
    }

    count
}

/// Decode framed payload data to PCM.
///
/// `total_samples` bounds the output; the caller knows it from the container
/// record (the codec frames also carry per-frame counts, which drive the
/// walk through the payload).
///
/// # Errors
/// Returns [`CodecError::TruncatedData`] if the payload ends before
/// `total_samples` were produced.
pub fn decode(payload: &[u8], total_samples: usize) -> Result<Vec<i16>, CodecError> {
    if total_samples == 0 {
        return Ok(Vec::new());
    }

    let mut output = Vec::with_capacity(total_samples);
    let mut pos = 0;

    while output.len() < total_samples {
        if pos + FRAME_HEADER_SIZE + LMS_STATE_SIZE > payload.len() {
            return Err(CodecError::TruncatedData);
        }

        // Frame header: ladder index (ignored here) + sample count
        let samples_in_frame = u16::from_be_bytes([payload[pos + 1], payload[pos + 2]]) as usize;
        pos += FRAME_HEADER_SIZE;

        let state: [u8; LMS_STATE_SIZE] = payload[pos..pos + LMS_STATE_SIZE]
            .try_into()
            .map_err(|_| CodecError::TruncatedData)?;
        let mut lms = Lms::read_state(&state);
        pos += LMS_STATE_SIZE;

        let mut remaining = samples_in_frame.min(total_samples - output.len());
        let slices = samples_in_frame.div_ceil(SLICE_LEN);

        for _ in 0..slices {
            if pos + 8 > payload.len() {
                return Err(CodecError::TruncatedData);
            }
            let slice = u64::from_be_bytes([
                payload[pos],
                payload[pos + 1],
                payload[pos + 2],
                payload[pos + 3],
                payload[pos + 4],
                payload[pos + 5],
                payload[pos + 6],
                payload[pos + 7],
            ]);
            pos += 8;

            let mut buf = [0i16; SLICE_LEN];
            let want = remaining.min(SLICE_LEN);
            let got = decode_slice(slice, &mut lms, &mut buf[..want]);
            output.extend_from_slice(&buf[..got]);
            remaining -= got;
        }
    }

    Ok(output)
}
