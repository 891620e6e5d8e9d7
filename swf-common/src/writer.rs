//! Movie assembly and the two emission targets
//!
//! A [`Movie`] is the ordered record list plus the header fields the
//! container needs up front (version, fixed-point frame rate, stage size).
//! Serialization is one pass; the total-length field is patched afterwards.
//!
//! Emission is a strategy: [`FileTarget`] writes to a path, [`CgiTarget`]
//! prefixes a CGI/HTTP header and writes to any stream (normally stdout).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use thiserror::Error;

use crate::bits::pack_rect;
use crate::tags::{Tag, TAG_SHOW_FRAME};

/// Twips per pixel
pub const TWIPS: i32 = 20;

/// Emission failures. File errors keep the path for the top-level report.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to write {path}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write response stream")]
    Stream(#[source] io::Error),
}

/// An assembled movie: header fields plus the ordered record sequence.
#[derive(Debug, Clone)]
pub struct Movie {
    /// Container format version
    pub version: u8,
    /// Frames per second, fixed-point x256
    pub frame_rate_fp256: u16,
    /// Stage width in pixels
    pub width_px: u16,
    /// Stage height in pixels
    pub height_px: u16,
    /// Ordered records, terminator included
    pub tags: Vec<Tag>,
}

impl Movie {
    pub fn new(version: u8, frame_rate_fp256: u16) -> Self {
        Self {
            version,
            frame_rate_fp256,
            width_px: 300,
            height_px: 300,
            tags: Vec::new(),
        }
    }

    /// Number of frame markers in the sequence (the header frame count).
    pub fn frame_count(&self) -> u16 {
        self.tags.iter().filter(|t| t.id == TAG_SHOW_FRAME).count() as u16
    }

    /// Serialize the whole movie, header first, length field patched last.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"FWS");
        out.push(self.version);
        out.extend_from_slice(&0u32.to_le_bytes()); // total length, patched below

        out.extend_from_slice(&pack_rect(
            0,
            self.width_px as i32 * TWIPS,
            0,
            self.height_px as i32 * TWIPS,
        ));
        out.extend_from_slice(&self.frame_rate_fp256.to_le_bytes());
        out.extend_from_slice(&self.frame_count().to_le_bytes());

        for tag in &self.tags {
            write_tag(&mut out, tag);
        }

        let total = out.len() as u32;
        out[4..8].copy_from_slice(&total.to_le_bytes());
        out
    }
}

/// Tag header: type code in the top ten bits, length in the bottom six;
/// bodies of 0x3F bytes or more spill the length into a trailing u32.
fn write_tag(out: &mut Vec<u8>, tag: &Tag) {
    let len = tag.data.len();
    if len < 0x3F {
        out.extend_from_slice(&((tag.id << 6) | len as u16).to_le_bytes());
    } else {
        out.extend_from_slice(&((tag.id << 6) | 0x3F).to_le_bytes());
        out.extend_from_slice(&(len as u32).to_le_bytes());
    }
    out.extend_from_slice(&tag.data);
}

/// Where an assembled movie goes.
pub trait EmitTarget {
    fn emit(&mut self, movie: &Movie) -> Result<(), EmitError>;
}

/// Serialize to a local file path.
pub struct FileTarget {
    path: PathBuf,
}

impl FileTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EmitTarget for FileTarget {
    fn emit(&mut self, movie: &Movie) -> Result<(), EmitError> {
        let bytes = movie.to_bytes();
        let write = || -> io::Result<()> {
            let file = File::create(&self.path)?;
            let mut w = BufWriter::new(file);
            w.write_all(&bytes)?;
            w.flush()
        };
        write().map_err(|source| EmitError::File {
            path: self.path.clone(),
            source,
        })
    }
}

/// Serialize to a response stream behind a CGI header.
pub struct CgiTarget<W: Write> {
    out: W,
}

impl<W: Write> CgiTarget<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> EmitTarget for CgiTarget<W> {
    fn emit(&mut self, movie: &Movie) -> Result<(), EmitError> {
        let bytes = movie.to_bytes();
        let write = |out: &mut W| -> io::Result<()> {
            write!(
                out,
                "Content-type: application/x-shockwave-flash\nAccept-Ranges: bytes\nContent-Length: {}\n\n",
                bytes.len()
            )?;
            out.write_all(&bytes)?;
            out.flush()
        };
        write(&mut self.out).map_err(EmitError::Stream)
    }
}
