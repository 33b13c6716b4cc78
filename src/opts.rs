//! Run options.

/// Options that control how a tier is processed.
///
/// This struct represents *library-level configuration*, not CLI flags
/// directly. The binary is responsible for mapping host input into this type
/// so that:
/// - the library remains reusable outside of the host integration
/// - other frontends (tests, batch jobs) can construct options programmatically
#[derive(Debug, Clone)]
pub struct Opts {
    /// Container format of the source recording, used as the decode hint
    /// (e.g. `"wav"`, `"mp3"`, `"mp4"`).
    pub source_format: String,

    /// Whether to run the LLM post-edit pass over each raw transcription.
    ///
    /// When disabled, the annotation's output is the raw transcription
    /// unchanged and no refiner is ever constructed.
    pub enable_post_editing: bool,

    /// Optional language hint for the ASR engine (e.g. `"qu"`).
    ///
    /// When `None`, the engine auto-detects the spoken language.
    pub language: Option<String>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            source_format: "wav".to_string(),
            enable_post_editing: false,
            language: None,
        }
    }
}
