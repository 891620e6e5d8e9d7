//! wav2swf - WAV to SWF converter
//!
//! Streams audio as frame-synchronized sound blocks, or embeds it as one
//! looping resource; writes to a file or to stdout behind a CGI header.

use anyhow::{bail, Result};
use clap::{ArgAction, Parser};
use std::io;
use std::path::PathBuf;

use swf_common::{CgiTarget, EmitTarget, FileTarget};
use wav2swf::{audio, config, Config, SoundMode};

#[derive(Parser)]
#[command(name = "wav2swf")]
#[command(about = "Converts WAV audio to SWF")]
#[command(version)]
struct Cli {
    /// Input WAV file
    input: PathBuf,

    /// Output filename
    #[arg(short, long, default_value = "output.swf")]
    output: PathBuf,

    /// Be more verbose (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Embed the sound as a single resource instead of streaming it
    #[arg(short = 'd', long)]
    define_sound: bool,

    /// Loop the sound n times (implies --define-sound)
    #[arg(short = 'l', long, value_name = "N")]
    loop_count: Option<u16>,

    /// Frame rate override in frames per second (fractional allowed)
    #[arg(short = 'r', long, value_name = "FPS")]
    frame_rate: Option<f32>,

    /// Sample rate in samples per second
    #[arg(short, long, default_value_t = 11025, value_name = "SPS")]
    sample_rate: u32,

    /// Bitrate in kbit/s
    #[arg(short, long, default_value_t = 32, value_name = "BPS")]
    bitrate: u32,

    /// For use as CGI: prepend an HTTP header and write to stdout
    #[arg(short = 'C', long)]
    cgi: bool,

    /// Stop the movie at frame 0 (resume via scripting)
    #[arg(short = 'S', long)]
    stop: bool,

    /// Target container format version
    #[arg(long, default_value_t = 5)]
    flash_version: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .init();
}

fn build_config(cli: &Cli) -> Result<Config> {
    let sample_rate = config::snap_sample_rate(cli.sample_rate)?;
    let bitrate = config::validate_bitrate(cli.bitrate)?;

    let frame_rate_fp256 = match cli.frame_rate {
        Some(fps) => {
            let fp = (fps * 256.0) as i64;
            if fp <= 0 || fp > u16::MAX as i64 {
                bail!("frame rate out of range: {}", fps);
            }
            Some(fp as u16)
        }
        None => None,
    };

    // A loop count forces resource mode, matching the CLI contract
    let mode = if cli.define_sound || cli.loop_count.is_some() {
        SoundMode::Resource {
            loops: cli.loop_count.unwrap_or(0),
        }
    } else {
        SoundMode::Streaming
    };

    Ok(Config {
        output: cli.output.clone(),
        cgi: cli.cgi,
        sample_rate,
        bitrate,
        frame_rate_fp256,
        mode,
        stop_first_frame: cli.stop,
        flash_version: cli.flash_version,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = build_config(&cli)?;

    let (raw, src_rate, channels) = audio::load_wav(&cli.input)?;
    let mono = audio::to_mono(&raw, channels)?;
    let samples = audio::resample(&mono, src_rate, cfg.sample_rate);

    tracing::info!(
        "loaded {:?}: {} samples ({} Hz, {} ch) -> {} mono samples at {} Hz",
        cli.input,
        raw.len(),
        src_rate,
        channels,
        samples.len(),
        cfg.sample_rate
    );

    let movie = wav2swf::build_movie(&samples, &cfg)?;

    if cfg.cgi {
        CgiTarget::new(io::stdout().lock()).emit(&movie)?;
    } else {
        FileTarget::new(&cfg.output).emit(&movie)?;
        tracing::info!("wrote {:?}", cfg.output);
    }

    Ok(())
}
