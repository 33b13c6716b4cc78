//! Built-in engine powered by `whisper-rs` / `whisper.cpp`.

use std::os::raw::{c_char, c_void};
use std::sync::Once;

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::engine::TranscriptionEngine;
use crate::{Error, Result};

/// Where the model lives when the host doesn't say otherwise.
pub const DEFAULT_MODEL_PATH: &str = "models/ggml-base.bin";

/// Whisper-backed [`TranscriptionEngine`].
///
/// The model is loaded once at construction and reused for every segment.
/// Decoding is greedy (arg-max over the token distribution): no beam search
/// and no internal language-model rescoring, so the output for a segment is
/// the single most likely token sequence.
pub struct WhisperEngine {
    ctx: WhisperContext,
    language: Option<String>,
}

impl WhisperEngine {
    /// Load a whisper.cpp model from disk.
    ///
    /// `language` is an optional hint (e.g. `"qu"`); `None` lets the model
    /// auto-detect.
    pub fn new(model_path: &str, language: Option<String>) -> Result<Self> {
        // whisper.cpp logs straight to stderr by default and is very noisy;
        // silence it so the host protocol channel stays clean.
        init_whisper_logging();

        let ctx_params = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(model_path, ctx_params).map_err(|e| {
            Error::Transcription(format!("failed to load model from '{model_path}': {e}"))
        })?;

        Ok(Self { ctx, language })
    }

    fn build_full_params(&self) -> FullParams<'_, '_> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        params.set_n_threads(num_cpus::get() as i32);
        params.set_translate(false);
        params.set_language(self.language.as_deref());
        params.set_no_context(true);
        params.set_single_segment(false);

        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        params
    }
}

impl TranscriptionEngine for WhisperEngine {
    fn transcribe(&mut self, samples: &[f32]) -> Result<String> {
        let params = self.build_full_params();

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| Error::Transcription(format!("failed to create whisper state: {e}")))?;

        state
            .full(params, samples)
            .map_err(|e| Error::Transcription(format!("whisper inference failed: {e}")))?;

        let mut text = String::new();
        for segment in state.as_iter() {
            let piece = segment
                .to_str()
                .map_err(|e| Error::Transcription(format!("failed to read segment text: {e}")))?;
            text.push_str(piece);
        }

        Ok(text.trim().to_string())
    }
}

/// A no-op log callback used to silence logs emitted by whisper.cpp.
unsafe extern "C" fn whisper_log_callback(
    _level: u32,
    _c_msg: *const c_char,
    _user_data: *mut c_void,
) {
    // Intentionally left empty.
}

/// Ensure whisper logging is configured exactly once for the lifetime of the process.
fn init_whisper_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| unsafe {
        whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
    });
}
