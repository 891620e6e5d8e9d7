//! Record sequence assembly
//!
//! Turns a mono sample buffer into the ordered tag list for one movie:
//! either frame-interleaved stream blocks (streaming mode) or one embedded
//! DefineSound resource with a StartSound trigger (resource mode). The
//! sequence is produced once, handed to an emit target, and dropped.

use anyhow::{Context, Result};
use swf_common::tags::{self, sound_format};
use swf_common::{sound_rate_code, Movie};

use crate::config::{Config, Rates, DEFINE_SOUND_ID};
use crate::segment::pad_to_blocks;
use crate::sync::FrameSync;
use crate::SoundMode;

/// Rolling 16-bit value folded across blocks sharing a frame-group.
///
/// The container wants one sample-count field per logical record, not per
/// physical block, so continuation blocks accumulate into the open record:
/// the seed is read back from the freshly written record's first two bytes,
/// and each fold adds it again and patches the sum back in.
#[derive(Debug, Default)]
struct GroupChecksum {
    v1: u16,
    v2: u16,
}

impl GroupChecksum {
    fn start(&mut self, seed: u16) {
        self.v1 = seed;
        self.v2 = seed;
    }

    fn fold(&mut self) -> u16 {
        self.v1 = self.v1.wrapping_add(self.v2);
        self.v1
    }
}

/// Build the complete movie for one conversion run.
pub fn build_movie(samples: &[i16], cfg: &Config) -> Result<Movie> {
    let rates = Rates::derive(cfg.sample_rate, cfg.frame_rate_fp256);
    let mut movie = Movie::new(cfg.flash_version, rates.frame_rate_fp256());

    movie.tags.push(tags::set_background_color(0xff, 0xff, 0xff));

    if cfg.stop_first_frame {
        movie.tags.push(tags::do_action_stop());
        movie.tags.push(tags::show_frame());
    }

    match cfg.mode {
        SoundMode::Streaming => build_streaming(&mut movie, samples, cfg, &rates)?,
        SoundMode::Resource { loops } => build_resource(&mut movie, samples, cfg, &rates, loops)?,
    }

    movie.tags.push(tags::end());
    Ok(movie)
}

fn rate_code(sample_rate: u32) -> Result<u8> {
    sound_rate_code(sample_rate)
        .with_context(|| format!("sample rate {} has no container rate code", sample_rate))
}

/// Streaming mode: one pass over the block list, interleaving stream block
/// records with frame markers as the synchronizer dictates.
fn build_streaming(movie: &mut Movie, samples: &[i16], cfg: &Config, rates: &Rates) -> Result<()> {
    let padded = pad_to_blocks(samples, rates.block_size);
    let num_blocks = padded.len() / rates.block_size;

    movie.tags.push(tags::sound_stream_head(
        sound_format::QOA,
        rate_code(cfg.sample_rate)?,
        rates.samples_per_frame as u16,
    ));

    tracing::info!("{} blocks", num_blocks);

    let mut encoder = swf_qoa::BlockEncoder::new(cfg.bitrate)
        .context("block encoder rejected the configured bitrate")?;
    let mut sync = FrameSync::new(rates);
    let mut checksum = GroupChecksum::default();
    // Index of the open stream block record, set by every group opener
    let mut open_record: Option<usize> = None;

    for t in 0..num_blocks {
        let timing = sync.step();
        let block = &padded[t * rates.block_size..(t + 1) * rates.block_size];
        let payload = encoder
            .encode_block(block)
            .with_context(|| format!("failed to encode block {}", t))?;

        if timing.starts_frame_group {
            tracing::debug!("starting block {} seek {}", t, timing.seek);
            movie.tags.push(tags::sound_stream_block(
                rates.block_size as u16,
                timing.seek as i16,
                &payload,
            ));
            let idx = movie.tags.len() - 1;
            checksum.start(movie.tags[idx].peek_u16(0));
            open_record = Some(idx);
        } else {
            tracing::debug!("adding block {} to open record", t);
            let idx = open_record.context("continuation block with no open record")?;
            let record = &mut movie.tags[idx];
            record.append_payload(&payload);
            let folded = checksum.fold();
            record.patch_u16(0, folded);
        }

        for _ in 0..timing.frame_advances {
            movie.tags.push(tags::show_frame());
        }
    }

    Ok(())
}

/// Resource mode: the whole padded buffer becomes one addressable sound,
/// triggered once with a loop count. No per-block interleaving.
fn build_resource(
    movie: &mut Movie,
    samples: &[i16],
    cfg: &Config,
    rates: &Rates,
    loops: u16,
) -> Result<()> {
    let padded = pad_to_blocks(samples, rates.block_size);

    let payload = swf_qoa::encode_all(&padded, cfg.bitrate, rates.block_size)
        .context("failed to encode sound resource")?;

    tracing::info!(
        "embedded resource: {} samples, {} payload bytes, {} loops",
        padded.len(),
        payload.len(),
        loops
    );

    movie.tags.push(tags::define_sound(
        DEFINE_SOUND_ID,
        sound_format::QOA,
        rate_code(cfg.sample_rate)?,
        padded.len() as u32,
        &payload,
    ));
    movie.tags.push(tags::start_sound(DEFINE_SOUND_ID, loops));
    movie.tags.push(tags::show_frame());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use swf_common::tags::{
        TAG_DEFINE_SOUND, TAG_DO_ACTION, TAG_END, TAG_SHOW_FRAME, TAG_SOUND_STREAM_BLOCK,
        TAG_SOUND_STREAM_HEAD, TAG_START_SOUND,
    };

    fn test_config() -> Config {
        Config {
            output: PathBuf::from("output.swf"),
            cgi: false,
            sample_rate: 11025,
            bitrate: 32,
            frame_rate_fp256: None,
            mode: SoundMode::Streaming,
            stop_first_frame: false,
            flash_version: 5,
        }
    }

    fn count(movie: &Movie, id: u16) -> usize {
        movie.tags.iter().filter(|t| t.id == id).count()
    }

    #[test]
    fn test_streaming_default_one_marker_per_block() {
        // 3 seconds at 11025 Hz -> 58 blocks, framesPerBlock = 1
        let samples = vec![100i16; 33075];
        let movie = build_movie(&samples, &test_config()).unwrap();

        assert_eq!(count(&movie, TAG_SOUND_STREAM_HEAD), 1);
        assert_eq!(count(&movie, TAG_SOUND_STREAM_BLOCK), 58);
        assert_eq!(count(&movie, TAG_SHOW_FRAME), 58);
        assert_eq!(count(&movie, TAG_END), 1);
        assert_eq!(movie.frame_count(), 58);

        // stream blocks all carry the full block sample count
        for tag in movie.tags.iter().filter(|t| t.id == TAG_SOUND_STREAM_BLOCK) {
            assert_eq!(tag.peek_u16(0), 576);
        }
    }

    #[test]
    fn test_streaming_forced_frame_rate_folds_groups() {
        let mut cfg = test_config();
        cfg.frame_rate_fp256 = Some(12 * 256);

        // 100 blocks exactly
        let samples = vec![100i16; 100 * 576];
        let movie = build_movie(&samples, &cfg).unwrap();

        // trunc(100 * 12 / 19.140625) = 62 markers
        assert_eq!(count(&movie, TAG_SHOW_FRAME), 62);
        // fewer records than blocks: continuations folded in
        let records = count(&movie, TAG_SOUND_STREAM_BLOCK);
        assert!(records < 100, "expected folded records, got {}", records);

        // folded records carry the summed sample count
        let multi = movie
            .tags
            .iter()
            .find(|t| t.id == TAG_SOUND_STREAM_BLOCK && t.peek_u16(0) > 576);
        assert_eq!(multi.map(|t| t.peek_u16(0)), Some(1152));
    }

    #[test]
    fn test_resource_mode_structure() {
        let mut cfg = test_config();
        cfg.mode = SoundMode::Resource { loops: 3 };

        let samples = vec![100i16; 1000];
        let movie = build_movie(&samples, &cfg).unwrap();

        assert_eq!(count(&movie, TAG_DEFINE_SOUND), 1);
        assert_eq!(count(&movie, TAG_START_SOUND), 1);
        assert_eq!(count(&movie, TAG_SHOW_FRAME), 1);
        assert_eq!(count(&movie, TAG_SOUND_STREAM_BLOCK), 0);

        // DefineSound carries the padded sample count
        let define = movie
            .tags
            .iter()
            .find(|t| t.id == TAG_DEFINE_SOUND)
            .unwrap();
        let total = u32::from_le_bytes([
            define.data[3],
            define.data[4],
            define.data[5],
            define.data[6],
        ]);
        assert_eq!(total, 1152); // 1000 padded up to two blocks
    }

    #[test]
    fn test_stop_prologue() {
        let mut cfg = test_config();
        cfg.stop_first_frame = true;

        let samples = vec![0i16; 576];
        let movie = build_movie(&samples, &cfg).unwrap();

        assert_eq!(movie.tags[1].id, TAG_DO_ACTION);
        assert_eq!(movie.tags[2].id, TAG_SHOW_FRAME);
        // the prologue frame counts toward the header frame count
        assert_eq!(movie.frame_count(), 2);
    }

    #[test]
    fn test_empty_input_is_a_valid_empty_stream() {
        let movie = build_movie(&[], &test_config()).unwrap();
        assert_eq!(count(&movie, TAG_SOUND_STREAM_BLOCK), 0);
        assert_eq!(count(&movie, TAG_SHOW_FRAME), 0);
        assert_eq!(movie.tags.last().map(|t| t.id), Some(TAG_END));
    }

    #[test]
    fn test_group_checksum_folding() {
        let mut checksum = GroupChecksum::default();
        checksum.start(576);
        assert_eq!(checksum.fold(), 1152);
        assert_eq!(checksum.fold(), 1728);

        checksum.start(1152);
        assert_eq!(checksum.fold(), 2304);
    }
}
