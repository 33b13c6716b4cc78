//! WAV decoding fast path.
//!
//! The host's default source format is WAV, so we read it directly with hound
//! instead of going through container probing.
//!
//! Amplitude normalization: integer PCM is converted to `f32` and divided by
//! the maximum representable magnitude for the bit depth *actually present in
//! the header*. A fixed 16-bit divisor would silently corrupt the amplitude of
//! 24/32-bit sources without ever raising an error, and degraded amplitudes
//! degrade transcription quality — so the divisor is derived, never assumed.

use std::io::Read;

use hound::{SampleFormat, WavReader, WavSpec};

use crate::{Error, Result};

/// Decode WAV audio from a reader into interleaved `f32` samples in
/// `[-1.0, 1.0]`, plus the spec describing channel count and sample rate.
///
/// Channel downmix and resampling happen downstream in the audio pipeline;
/// this function only handles container reading and amplitude scaling.
pub fn samples_from_wav_reader<R: Read>(reader: R) -> Result<(Vec<f32>, WavSpec)> {
    let mut reader =
        WavReader::new(reader).map_err(|e| Error::AudioDecode(format!("invalid WAV data: {e}")))?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| Error::AudioDecode(format!("failed to read WAV samples: {e}")))?,
        SampleFormat::Int => {
            let max_magnitude = int_max_magnitude(spec.bits_per_sample)?;
            let mut samples = Vec::new();
            for sample in reader.samples::<i32>() {
                let pcm = sample
                    .map_err(|e| Error::AudioDecode(format!("failed to read WAV samples: {e}")))?;
                samples.push(pcm as f32 / max_magnitude);
            }
            samples
        }
    };

    Ok((samples, spec))
}

/// The largest positive value a signed integer sample of this width can hold.
fn int_max_magnitude(bits_per_sample: u16) -> Result<f32> {
    if bits_per_sample == 0 || bits_per_sample > 32 {
        return Err(Error::AudioDecode(format!(
            "unsupported WAV bit depth: {bits_per_sample}"
        )));
    }
    Ok(((1u64 << (bits_per_sample - 1)) - 1) as f32)
}
