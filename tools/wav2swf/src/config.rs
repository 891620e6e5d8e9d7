//! Run configuration and rate math
//!
//! One [`Config`] is built from the CLI and passed into the pipeline;
//! nothing here is process-global. Sample rate and bitrate are validated
//! up front so a bad run fails before any audio work starts.

use anyhow::{bail, Result};
use std::path::PathBuf;

/// Sample rates the container can express for stream sound.
pub const SAMPLE_RATES: [u32; 3] = [11025, 22050, 44100];

/// Snapping tolerance around each supported rate (fraction of the rate).
const SNAP_TOLERANCE: f64 = 0.05;

/// Default sound resource id for the embedded-resource mode.
pub const DEFINE_SOUND_ID: u16 = 24;

/// Streaming vs. single embedded resource, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundMode {
    /// Frame-interleaved stream blocks for continuous playback
    Streaming,
    /// One DefineSound resource plus a StartSound trigger
    Resource { loops: u16 },
}

/// Everything one conversion run needs. Lifetime = one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub output: PathBuf,
    pub cgi: bool,
    pub sample_rate: u32,
    pub bitrate: u32,
    /// Frame rate override, fixed-point x256. None = one frame per block.
    pub frame_rate_fp256: Option<u16>,
    pub mode: SoundMode,
    pub stop_first_frame: bool,
    pub flash_version: u8,
}

/// Snap a raw rate into the nearest supported rate's tolerance window.
///
/// Values outside every window are rejected with the allowed list.
pub fn snap_sample_rate(raw: u32) -> Result<u32> {
    for &rate in &SAMPLE_RATES {
        let window = rate as f64 * SNAP_TOLERANCE;
        if (raw as f64 - rate as f64).abs() <= window {
            return Ok(rate);
        }
    }
    bail!(
        "invalid sample rate: {} (allowed values: 11025, 22050, 44100)",
        raw
    );
}

/// Validate a bitrate against the codec ladder.
pub fn validate_bitrate(bitrate: u32) -> Result<u32> {
    if bitrate > 160 {
        bail!("bitrate must be <= 160 kbit/s (got {})", bitrate);
    }
    if swf_qoa::bitrate_index(bitrate).is_none() {
        bail!(
            "invalid bitrate {}. allowed bitrates are: {}",
            bitrate,
            swf_qoa::BITRATES
                .iter()
                .map(|b| b.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        );
    }
    Ok(bitrate)
}

/// Block size is a function of the sample rate alone, independent of the
/// encoder mode.
pub fn block_size(sample_rate: u32) -> usize {
    if sample_rate > 22050 {
        1152
    } else {
        576
    }
}

/// Derived rate math shared by the synchronizer and the record builders.
#[derive(Debug, Clone, Copy)]
pub struct Rates {
    pub block_size: usize,
    pub blocks_per_second: f64,
    pub frames_per_second: f64,
    pub frames_per_block: f64,
    pub samples_per_frame: f64,
}

impl Rates {
    pub fn derive(sample_rate: u32, frame_rate_fp256: Option<u16>) -> Self {
        let block_size = block_size(sample_rate);
        let blocks_per_second = sample_rate as f64 / block_size as f64;

        // Unforced, the display clock ticks once per block
        let frames_per_second = match frame_rate_fp256 {
            Some(fp) => fp as f64 / 256.0,
            None => blocks_per_second,
        };

        Rates {
            block_size,
            blocks_per_second,
            frames_per_second,
            frames_per_block: frames_per_second / blocks_per_second,
            samples_per_frame: (block_size as f64 * blocks_per_second) / frames_per_second,
        }
    }

    /// Header value: frames per second as fixed-point x256.
    pub fn frame_rate_fp256(&self) -> u16 {
        (self.frames_per_second * 256.0) as u16
    }
}
