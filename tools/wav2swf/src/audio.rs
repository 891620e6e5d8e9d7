//! WAV decode glue: load, widen to i16, reduce to mono, resample
//!
//! Collaborator code around `hound`; the pipeline proper only ever sees a
//! mono i16 buffer at the target rate.

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Load a WAV file as interleaved i16 samples plus its source rate and
/// channel count. 8/24/32-bit int and float inputs are converted to i16.
pub fn load_wav(path: &Path) -> Result<(Vec<i16>, u32, u16)> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("failed to read {:?}", path))?;

    let spec = reader.spec();

    let samples: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .samples::<i16>()
                .collect::<Result<_, _>>()
                .with_context(|| format!("malformed sample data in {:?}", path))?,
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| (v as i16) << 8))
                .collect::<Result<_, _>>()
                .with_context(|| format!("malformed sample data in {:?}", path))?,
            24 | 32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> (spec.bits_per_sample - 16)) as i16))
                .collect::<Result<_, _>>()
                .with_context(|| format!("malformed sample data in {:?}", path))?,
            bits => bail!("unsupported bit depth in {:?}: {}", path, bits),
        },
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * 32767.0) as i16))
            .collect::<Result<_, _>>()
            .with_context(|| format!("malformed sample data in {:?}", path))?,
    };

    Ok((samples, spec.sample_rate, spec.channels))
}

/// Average interleaved channels down to mono.
pub fn to_mono(samples: &[i16], channels: u16) -> Result<Vec<i16>> {
    match channels {
        1 => Ok(samples.to_vec()),
        2 => Ok(samples
            .chunks(2)
            .map(|pair| {
                if pair.len() == 2 {
                    ((pair[0] as i32 + pair[1] as i32) / 2) as i16
                } else {
                    pair[0]
                }
            })
            .collect()),
        n => bail!("unsupported channel count: {}", n),
    }
}

/// Linear-interpolation resampling.
pub fn resample(samples: &[i16], src_rate: u32, dst_rate: u32) -> Vec<i16> {
    if samples.is_empty() || src_rate == dst_rate {
        return samples.to_vec();
    }

    let ratio = src_rate as f64 / dst_rate as f64;
    let output_len = (samples.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 * ratio;
        let src_idx = src_pos as usize;
        let frac = src_pos - src_idx as f64;

        let sample = if src_idx + 1 < samples.len() {
            let a = samples[src_idx] as f64;
            let b = samples[src_idx + 1] as f64;
            (a + (b - a) * frac) as i16
        } else {
            samples[src_idx.min(samples.len() - 1)]
        };

        output.push(sample);
    }

    output
}
