//! PCM normalization for tierscribe.
//!
//! Responsibilities:
//! - Convert Symphonia-decoded PCM into interleaved `f32`
//! - Downmix to mono
//! - Resample to the target sample rate (when needed)
//!
//! Unlike a streaming transcriber, this tool decodes the whole recording once
//! at pipeline start, so normalization runs over complete buffers rather than
//! emitting chunks.

use rubato::{Resampler, SincFixedIn, WindowFunction};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};

use crate::{Error, Result};

/// The target mono sample rate (Hz) expected by the transcription engine.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Copy a decoded Symphonia buffer into interleaved `f32` samples.
///
/// Returns the samples plus the source rate and channel count. Symphonia's
/// `SampleBuffer<f32>` conversion scales integer PCM by the correct magnitude
/// for the source sample width, so amplitudes land in `[-1.0, 1.0]` without a
/// hardcoded divisor.
pub fn decoded_to_interleaved_f32(
    decoded: &AudioBufferRef<'_>,
    sample_buf_f32: &mut Option<SampleBuffer<f32>>,
) -> Result<(Vec<f32>, u32, usize)> {
    if sample_buf_f32.is_none() {
        let spec = *decoded.spec();
        let duration = decoded.capacity() as u64;
        *sample_buf_f32 = Some(SampleBuffer::<f32>::new(duration, spec));
    }

    let buf = sample_buf_f32
        .as_mut()
        .ok_or_else(|| Error::AudioDecode("sample buffer not initialized".to_string()))?;

    buf.copy_interleaved_ref(decoded.clone());

    let src_rate = decoded.spec().rate;
    let channels = decoded.spec().channels.count();
    if channels == 0 {
        return Err(Error::AudioDecode(
            "decoded audio had zero channels".to_string(),
        ));
    }

    Ok((buf.samples().to_vec(), src_rate, channels))
}

/// Downmix interleaved samples into mono by averaging channels.
///
/// Policy: equal-weight average across channels (simple, predictable).
pub fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }

    let frames = interleaved.len() / channels;
    let mut mono = Vec::with_capacity(frames);

    for f in 0..frames {
        let base = f * channels;
        let mut acc = 0.0;
        for c in 0..channels {
            acc += interleaved[base + c];
        }
        mono.push(acc / channels as f32);
    }

    mono
}

/// Resample a complete mono buffer to [`TARGET_SAMPLE_RATE`].
///
/// Already-at-target input is returned unchanged. rubato expects exact block
/// sizes, so the final partial block is zero-padded before processing; the
/// padding becomes a short silent tail, which is harmless for transcription.
pub fn resample_to_target(mono_src: &[f32], src_rate: u32) -> Result<Vec<f32>> {
    if src_rate == TARGET_SAMPLE_RATE {
        return Ok(mono_src.to_vec());
    }

    // How many source frames we feed rubato per `process()` call.
    let in_chunk_src_frames = 2048;

    let mut resampler = SincFixedIn::<f32>::new(
        TARGET_SAMPLE_RATE as f64 / src_rate as f64,
        2.0,
        rubato::SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: rubato::SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        },
        in_chunk_src_frames,
        1, // mono
    )
    .map_err(|e| Error::AudioDecode(format!("failed to init resampler: {e}")))?;

    let in_max = resampler.input_frames_max();

    let mut padded = mono_src.to_vec();
    let rem = padded.len() % in_max;
    if rem != 0 {
        padded.resize(padded.len() + (in_max - rem), 0.0);
    }

    let estimated_out =
        (padded.len() as f64 * TARGET_SAMPLE_RATE as f64 / src_rate as f64) as usize;
    let mut out = Vec::with_capacity(estimated_out);

    for block in padded.chunks(in_max) {
        let result = resampler
            .process(&[block], None)
            .map_err(|e| Error::AudioDecode(format!("resampler process failed: {e}")))?;

        if result.len() != 1 {
            return Err(Error::AudioDecode(
                "expected mono output from resampler".to_string(),
            ));
        }

        out.extend_from_slice(&result[0]);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_to_mono_single_channel_is_identity() {
        let input = vec![0.0, 1.0, -1.0];
        let mono = downmix_to_mono(&input, 1);
        assert_eq!(mono, input);
    }

    #[test]
    fn downmix_to_mono_averages_channels() {
        // Two frames of stereo: (L=1, R=3), (L=-1, R=1) => mono: 2, 0
        let interleaved = vec![1.0, 3.0, -1.0, 1.0];
        let mono = downmix_to_mono(&interleaved, 2);
        assert_eq!(mono, vec![2.0, 0.0]);
    }

    #[test]
    fn resample_at_target_rate_is_passthrough() -> Result<()> {
        let mono = vec![0.25f32; 100];
        let out = resample_to_target(&mono, TARGET_SAMPLE_RATE)?;
        assert_eq!(out, mono);
        Ok(())
    }

    #[test]
    fn resample_empty_input_yields_empty_output() -> Result<()> {
        let out = resample_to_target(&[], 8_000)?;
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn resample_doubles_frame_count_going_8k_to_16k() -> Result<()> {
        let mono = vec![0.0f32; 8_000];
        let out = resample_to_target(&mono, 8_000)?;

        // The input is zero-padded up to a whole number of rubato blocks, so
        // the output covers at least the source duration at twice the rate.
        assert!(out.len() >= 16_000);
        assert!(out.len() <= 16_000 + 2 * 2048);
        Ok(())
    }
}
