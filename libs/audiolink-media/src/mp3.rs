//! MP3 duration extraction
//!
//! Reads the track length from MPEG audio framing without decoding samples.
//! When the first frame carries a Xing/Info/VBRI header, its frame count is
//! used; otherwise symphonia estimates the count from the seekable file, and
//! if it cannot, the packets are walked and their durations summed.

use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use audiolink_domain::{ports::DurationExtractor, IngestionError};
use bytes::Bytes;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};
use tracing::{debug, instrument, Span};

/// Duration extractor for `audio/mpeg` payloads
#[derive(Debug, Clone)]
pub struct Mp3DurationExtractor {
    temp_dir: PathBuf,
}

impl Default for Mp3DurationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Mp3DurationExtractor {
    /// Extractor writing its temporary copies to the system temp directory
    pub fn new() -> Self {
        Self::with_temp_dir(std::env::temp_dir())
    }

    /// Extractor writing its temporary copies to `temp_dir`
    pub fn with_temp_dir(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }
}

impl DurationExtractor for Mp3DurationExtractor {
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn extract_seconds(&self, data: Bytes) -> Result<u64, IngestionError> {
        let temp_dir = self.temp_dir.clone();
        let span = Span::current();

        // The blocking task owns the copy: it runs to completion, cleanup
        // included, even if the awaiting request is dropped.
        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            crate::with_scoped_copy(&temp_dir, ".mp3", &data, track_length_seconds)
        })
        .await
        .map_err(|e| IngestionError::extraction(format!("Duration task failed: {}", e)))?
    }
}

/// Track length of the MP3 file at `path`, rounded to the nearest second
pub fn track_length_seconds(path: &Path) -> Result<u64, IngestionError> {
    let file = File::open(path)
        .map_err(|e| IngestionError::extraction(format!("Failed to open audio copy: {}", e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("mp3");
    hint.mime_type("audio/mpeg");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| IngestionError::extraction(format!("Not an MPEG audio stream: {}", e)))?;
    let mut format = probed.format;

    let (track_id, time_base, declared_frames) = {
        let track = format
            .default_track()
            .ok_or_else(|| IngestionError::extraction("No audio track found"))?;
        let params = &track.codec_params;
        let time_base = params
            .time_base
            .or_else(|| params.sample_rate.map(|rate| TimeBase::new(1, rate)))
            .ok_or_else(|| IngestionError::extraction("Audio track has no sample rate"))?;
        (track.id, time_base, params.n_frames)
    };

    let n_frames = match declared_frames {
        Some(n) => n,
        None => count_frames(format.as_mut(), track_id)?,
    };
    if n_frames == 0 {
        return Err(IngestionError::extraction("No audio frames found"));
    }

    let seconds = round_seconds(time_base.calc_time(n_frames));
    debug!(n_frames, seconds, "Computed track length");
    Ok(seconds)
}

/// Sum packet durations of `track_id` until end of stream
fn count_frames(format: &mut dyn FormatReader, track_id: u32) -> Result<u64, IngestionError> {
    let mut total = 0u64;
    loop {
        match format.next_packet() {
            Ok(packet) if packet.track_id() == track_id => total += packet.dur(),
            Ok(_) => {}
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => {
                return Err(IngestionError::extraction(format!(
                    "Invalid audio frame sequence: {}",
                    e
                )))
            }
        }
    }
    Ok(total)
}

fn round_seconds(time: Time) -> u64 {
    if time.frac >= 0.5 {
        time.seconds + 1
    } else {
        time.seconds
    }
}
