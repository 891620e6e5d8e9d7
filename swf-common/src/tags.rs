//! Tag records for timed sound streams
//!
//! POD byte buffers with typed builders. All multi-byte fields are
//! little-endian except where a builder notes otherwise.
//!
//! # Record layouts
//! ```text
//! SetBackgroundColor (9):  r u8, g u8, b u8
//! DoAction (12):           action bytes, terminated by 0x00
//! ShowFrame (1):           empty
//! End (0):                 empty
//!
//! SoundStreamHead (18):
//!   0x00: playback flags   rate(2) << 2 | sixteen_bit(1) << 1 | stereo(1)
//!   0x01: stream flags     codec(4) << 4 | rate(2) << 2 | sixteen_bit(1) << 1 | stereo(1)
//!   0x02: average samples per frame u16
//!   0x04: latency seek i16 (seek-carrying codecs only)
//!
//! SoundStreamBlock (19):
//!   0x00: sample count u16   <- patched when continuation blocks fold in
//!   0x02: seek i16           <- signed sample correction for resync
//!   0x04: codec payload
//!
//! DefineSound (14):
//!   0x00: sound id u16
//!   0x02: format u8          codec(4) << 4 | rate(2) << 2 | sixteen_bit(1) << 1 | stereo(1)
//!   0x03: sample count u32
//!   0x07: initial seek u16
//!   0x09: codec payload
//!
//! StartSound (15):
//!   0x00: sound id u16
//!   0x02: info flags u8      has_loops = 0x04
//!   0x03: loop count u16     (only when has_loops)
//! ```

/// Tag type codes (the subset this pipeline emits)
pub const TAG_END: u16 = 0;
pub const TAG_SHOW_FRAME: u16 = 1;
pub const TAG_SET_BACKGROUND_COLOR: u16 = 9;
pub const TAG_DO_ACTION: u16 = 12;
pub const TAG_DEFINE_SOUND: u16 = 14;
pub const TAG_START_SOUND: u16 = 15;
pub const TAG_SOUND_STREAM_HEAD: u16 = 18;
pub const TAG_SOUND_STREAM_BLOCK: u16 = 19;

/// 4-bit codec codes for the sound format byte
pub mod sound_format {
    /// Uncompressed big-endian PCM
    pub const RAW: u8 = 0;
    /// SWF ADPCM
    pub const ADPCM: u8 = 1;
    /// MPEG audio layer 3
    pub const MP3: u8 = 2;
    /// Uncompressed little-endian PCM
    pub const RAW_LE: u8 = 3;
    /// QOA-derived block codec (private code point; 0-11 are reserved
    /// by the container specification)
    pub const QOA: u8 = 12;
}

/// 2-bit rate code for the sound format byte. Rates outside the container's
/// four canonical rates have no code.
pub fn sound_rate_code(sample_rate: u32) -> Option<u8> {
    match sample_rate {
        5512 => Some(0),
        11025 => Some(1),
        22050 => Some(2),
        44100 => Some(3),
        _ => None,
    }
}

/// One container record: a type code plus its body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: u16,
    pub data: Vec<u8>,
}

impl Tag {
    pub fn new(id: u16) -> Self {
        Self {
            id,
            data: Vec::new(),
        }
    }

    fn push_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    fn push_u16(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    fn push_i16(&mut self, v: i16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    fn push_u32(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    /// Read a u16 back out of the body (used for the rolling sample-count
    /// field of open stream blocks).
    pub fn peek_u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.data[offset], self.data[offset + 1]])
    }

    /// Patch a u16 in place.
    pub fn patch_u16(&mut self, offset: usize, v: u16) {
        self.data[offset..offset + 2].copy_from_slice(&v.to_le_bytes());
    }

    /// Append continuation payload to an open stream block record.
    pub fn append_payload(&mut self, payload: &[u8]) {
        self.data.extend_from_slice(payload);
    }
}

/// SetBackgroundColor
pub fn set_background_color(r: u8, g: u8, b: u8) -> Tag {
    let mut tag = Tag::new(TAG_SET_BACKGROUND_COLOR);
    tag.push_u8(r);
    tag.push_u8(g);
    tag.push_u8(b);
    tag
}

/// DoAction holding a single Stop action
pub fn do_action_stop() -> Tag {
    let mut tag = Tag::new(TAG_DO_ACTION);
    tag.push_u8(0x07); // ActionStop
    tag.push_u8(0x00); // ActionEndFlag
    tag
}

/// ShowFrame: advance the display timeline by one frame
pub fn show_frame() -> Tag {
    Tag::new(TAG_SHOW_FRAME)
}

/// End: stream terminator
pub fn end() -> Tag {
    Tag::new(TAG_END)
}

/// SoundStreamHead for a mono 16-bit stream.
///
/// `avg_samples_per_frame` is the truncated samples-per-frame average; the
/// latency seek field is written as zero since per-record seeks carry the
/// correction.
pub fn sound_stream_head(codec: u8, rate_code: u8, avg_samples_per_frame: u16) -> Tag {
    let mut tag = Tag::new(TAG_SOUND_STREAM_HEAD);
    tag.push_u8(rate_code << 2 | 1 << 1); // playback: 16-bit mono
    tag.push_u8(codec << 4 | rate_code << 2 | 1 << 1); // stream format
    tag.push_u16(avg_samples_per_frame);
    tag.push_i16(0); // latency seek
    tag
}

/// SoundStreamBlock opening a new frame-group.
pub fn sound_stream_block(sample_count: u16, seek: i16, payload: &[u8]) -> Tag {
    let mut tag = Tag::new(TAG_SOUND_STREAM_BLOCK);
    tag.push_u16(sample_count);
    tag.push_i16(seek);
    tag.append_payload(payload);
    tag
}

/// DefineSound embedding a whole compressed buffer as one resource.
pub fn define_sound(id: u16, codec: u8, rate_code: u8, sample_count: u32, payload: &[u8]) -> Tag {
    let mut tag = Tag::new(TAG_DEFINE_SOUND);
    tag.push_u16(id);
    tag.push_u8(codec << 4 | rate_code << 2 | 1 << 1); // 16-bit mono
    tag.push_u32(sample_count);
    tag.push_u16(0); // initial seek
    tag.append_payload(payload);
    tag
}

/// StartSound triggering a defined resource, optionally looped.
pub fn start_sound(id: u16, loops: u16) -> Tag {
    let mut tag = Tag::new(TAG_START_SOUND);
    tag.push_u16(id);
    if loops > 0 {
        tag.push_u8(0x04); // has_loops
        tag.push_u16(loops);
    } else {
        tag.push_u8(0);
    }
    tag
}
