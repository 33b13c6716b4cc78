//! Demux helpers for Symphonia.
//!
//! This module keeps container probing and packet iteration logic isolated
//! from the rest of the decode pipeline.
//!
//! Responsibilities:
//! - Probe a source file and select a reasonable default audio track
//! - Provide a `next_packet` helper that treats IO errors as end-of-stream

use std::fs::File;

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, Track};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::{Error, Result};

/// Probe the container and pick a default audio track.
///
/// Track selection policy:
/// - choose the first track that looks decodable (codec != NULL)
/// - and has a known sample rate (required for resampling decisions downstream)
///
/// `hint_extension` improves probe accuracy; the host tells us the source's
/// container format, so we always pass it through (e.g. "mp3", "mp4", "ogg").
pub fn probe_file_and_pick_default_track(
    file: File,
    hint_extension: Option<&str>,
) -> Result<(Box<dyn FormatReader>, Track)> {
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = hint_extension {
        hint.with_extension(ext);
    }

    let format_opts: FormatOptions = Default::default();
    let metadata_opts: MetadataOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| Error::AudioDecode(format!("failed to probe media source: {e}")))?;

    let format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
        .cloned()
        .ok_or_else(|| Error::AudioDecode("no audio track found".to_string()))?;

    Ok((format, track))
}

/// Read the next packet, treating IO errors as "end of stream".
///
/// This keeps the decode loop simple:
/// - `Ok(None)` means EOF or stream ended
/// - other errors are surfaced as decode failures
pub fn next_packet(format: &mut Box<dyn FormatReader>) -> Result<Option<Packet>> {
    match format.next_packet() {
        Ok(p) => Ok(Some(p)),
        Err(SymphoniaError::IoError(_)) => Ok(None),
        Err(e) => Err(Error::AudioDecode(format!("failed reading packet: {e}"))),
    }
}
