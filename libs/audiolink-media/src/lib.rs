//! # AudioLink Media Adapter
//!
//! Implements the domain `DurationExtractor` port. The payload is copied to a
//! request-scoped temporary file so the MP3 demuxer can seek through frame
//! headers, and the copy is removed on every exit path.

mod mp3;
mod scratch;

pub use mp3::{track_length_seconds, Mp3DurationExtractor};
pub use scratch::with_scoped_copy;
