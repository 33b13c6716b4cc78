//! The transcription engine seam.

use crate::Result;

/// Pluggable ASR engine used by [`crate::pipeline`].
///
/// An engine turns one audio segment — mono `f32` samples at
/// [`crate::audio_pipeline::TARGET_SAMPLE_RATE`], amplitudes in `[-1.0, 1.0]`
/// — into decoded text.
///
/// Contract:
/// - Each call is independent; the engine carries loaded model state but no
///   per-segment state across calls.
/// - `&mut self` models exclusive access per call, so engines whose bindings
///   are not reentrant need no extra locking.
/// - Callers never pass an empty segment; the pipeline resolves those to an
///   empty transcription without invoking the engine.
/// - A failure is fatal to the run. Engines should not retry internally.
pub trait TranscriptionEngine {
    fn transcribe(&mut self, samples: &[f32]) -> Result<String>;
}
