//! wav2swf library
//!
//! Converts decoded PCM audio into a timed SWF record sequence: mono
//! reduction and resampling, block segmentation, frame/block
//! synchronization, and the two emission modes (streaming sound blocks
//! interleaved with frame markers, or one embedded looping resource).
//!
//! The binary in `main.rs` is a thin CLI over [`stream::build_movie`].

pub mod audio;
pub mod config;
pub mod segment;
pub mod stream;
pub mod sync;

pub use config::{Config, Rates, SoundMode};
pub use stream::build_movie;
