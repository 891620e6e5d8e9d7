//! swf-common: the subset of the SWF container this pipeline emits
//!
//! Only the records a timed sound stream needs are modeled: background
//! color, stop action, sound stream head/blocks, embedded sound resources,
//! frame markers and the end marker, plus the movie-level header. The
//! container's general tag set is out of scope.
//!
//! Everything here is byte-accurate manual serialization; the layouts are
//! documented per builder in [`tags`].

mod bits;
pub mod tags;
mod writer;

pub use bits::BitWriter;
pub use tags::{sound_format, sound_rate_code, Tag};
pub use writer::{CgiTarget, EmitError, EmitTarget, FileTarget, Movie};
