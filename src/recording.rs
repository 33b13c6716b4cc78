//! The normalized source recording.
//!
//! The whole recording is decoded and normalized exactly once at pipeline
//! start — mono, 16 kHz, `f32` in `[-1.0, 1.0]` — then shared read-only by
//! every per-annotation segment extraction.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;

use crate::audio_pipeline::{
    TARGET_SAMPLE_RATE, decoded_to_interleaved_f32, downmix_to_mono, resample_to_target,
};
use crate::decode::{decode_packet_and_then, make_decoder_for_track};
use crate::demux::{next_packet, probe_file_and_pick_default_track};
use crate::wav::samples_from_wav_reader;
use crate::{Error, Result};

/// The full decoded source audio: mono `f32` at [`TARGET_SAMPLE_RATE`].
#[derive(Debug, Clone)]
pub struct Recording {
    samples: Vec<f32>,
}

impl Recording {
    /// Build a recording directly from normalized samples.
    ///
    /// Intended for tests and other frontends that synthesize audio; the
    /// samples are assumed to already be mono at [`TARGET_SAMPLE_RATE`].
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Decode and normalize a source audio file.
    ///
    /// `format` is the container format the host told us about (e.g. "wav",
    /// "mp3", "mp4"). WAV takes a direct hound path; everything else goes
    /// through Symphonia probing with `format` as the extension hint.
    pub fn from_path(path: &Path, format: &str) -> Result<Self> {
        let (mono, src_rate) = if format.eq_ignore_ascii_case("wav") {
            let file = open_source(path)?;
            let (interleaved, spec) = samples_from_wav_reader(BufReader::new(file))?;
            (
                downmix_to_mono(&interleaved, spec.channels as usize),
                spec.sample_rate,
            )
        } else {
            decode_mono_with_symphonia(path, format)?
        };

        let samples = resample_to_target(&mono, src_rate)?;
        Ok(Self { samples })
    }

    /// All samples, in order.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Total duration in whole milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.samples.len() as u64 * 1000 / TARGET_SAMPLE_RATE as u64
    }

    /// Borrow the samples covering `[start_ms, end_ms)`.
    ///
    /// Clipping policy: a range that runs past the end of the recording is
    /// silently truncated to the available audio, and a range that is empty
    /// after truncation (`start >= end`) yields an empty slice. Neither case
    /// is an error — an annotation with no audio content simply transcribes
    /// to nothing.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> &[f32] {
        let start = ms_to_samples(start_ms).min(self.samples.len());
        let end = ms_to_samples(end_ms).min(self.samples.len());
        if start >= end {
            return &[];
        }
        &self.samples[start..end]
    }
}

fn ms_to_samples(ms: u64) -> usize {
    (ms * TARGET_SAMPLE_RATE as u64 / 1000) as usize
}

fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        Error::AudioDecode(format!("cannot open source audio '{}': {e}", path.display()))
    })
}

/// Decode a non-WAV container into mono samples at the source rate.
///
/// Each decoded buffer is downmixed as it arrives; the source rate comes from
/// the selected track's codec parameters (the demux layer guarantees it is
/// known).
fn decode_mono_with_symphonia(path: &Path, format: &str) -> Result<(Vec<f32>, u32)> {
    let file = open_source(path)?;
    let (mut reader, track) = probe_file_and_pick_default_track(file, Some(format))?;

    let src_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::AudioDecode("audio track has no sample rate".to_string()))?;

    let mut decoder = make_decoder_for_track(&track)?;
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut mono = Vec::new();

    while let Some(packet) = next_packet(&mut reader)? {
        if packet.track_id() != track.id {
            continue;
        }

        decode_packet_and_then(&mut decoder, &packet, |decoded| {
            let (interleaved, _, channels) = decoded_to_interleaved_f32(&decoded, &mut sample_buf)?;
            mono.extend(downmix_to_mono(&interleaved, channels));
            Ok(())
        })?;
    }

    Ok((mono, src_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn write_wav(path: &Path, spec: WavSpec, samples: &[i16]) {
        let mut writer = WavWriter::create(path, spec).expect("create WAV");
        for &s in samples {
            writer.write_sample(s).expect("write sample");
        }
        writer.finalize().expect("finalize WAV");
    }

    #[test]
    fn duration_derives_from_sample_count() {
        let recording = Recording::from_samples(vec![0.0; TARGET_SAMPLE_RATE as usize]);
        assert_eq!(recording.duration_ms(), 1000);

        let recording = Recording::from_samples(vec![0.0; TARGET_SAMPLE_RATE as usize / 2]);
        assert_eq!(recording.duration_ms(), 500);
    }

    #[test]
    fn slice_ms_maps_milliseconds_to_sample_offsets() {
        let recording = Recording::from_samples(vec![0.0; 16_000]);
        assert_eq!(recording.slice_ms(250, 500).len(), 4_000);
        assert_eq!(recording.slice_ms(0, 1000).len(), 16_000);
    }

    #[test]
    fn slice_ms_clips_past_the_end_of_the_recording() {
        let recording = Recording::from_samples(vec![0.0; 16_000]);

        // End past the recording truncates to the available audio.
        assert_eq!(recording.slice_ms(500, 5_000).len(), 8_000);

        // Entirely out of range yields an empty segment, not an error.
        assert!(recording.slice_ms(2_000, 3_000).is_empty());
    }

    #[test]
    fn slice_ms_with_inverted_range_is_empty() {
        let recording = Recording::from_samples(vec![0.0; 16_000]);
        assert!(recording.slice_ms(800, 800).is_empty());
        assert!(recording.slice_ms(900, 100).is_empty());
    }

    #[test]
    fn decodes_mono_wav_at_target_rate() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("mono.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: TARGET_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        write_wav(&path, spec, &vec![1000i16; 16_000]);

        let recording = Recording::from_path(&path, "wav")?;
        assert_eq!(recording.samples().len(), 16_000);
        assert_eq!(recording.duration_ms(), 1000);
        assert!((recording.samples()[0] - 1000.0 / i16::MAX as f32).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn stereo_wav_is_downmixed_to_mono() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: TARGET_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        // 4 frames of interleaved stereo.
        write_wav(&path, spec, &[100, 300, -100, 100, 0, 0, 200, 400]);

        let recording = Recording::from_path(&path, "wav")?;
        assert_eq!(recording.samples().len(), 4);
        let expected = 200.0 / i16::MAX as f32;
        assert!((recording.samples()[0] - expected).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn low_rate_wav_is_resampled_to_target() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("8k.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        write_wav(&path, spec, &vec![0i16; 8_000]);

        let recording = Recording::from_path(&path, "wav")?;
        // One second of source audio, now at the target rate (plus the
        // resampler's zero-padded tail).
        assert!(recording.duration_ms() >= 1000);
        assert!(recording.duration_ms() < 1300);
        Ok(())
    }

    #[test]
    fn missing_source_is_a_decode_error() {
        let err = Recording::from_path(Path::new("/nonexistent/audio.wav"), "wav").unwrap_err();
        assert!(matches!(err, Error::AudioDecode(_)));
    }
}
