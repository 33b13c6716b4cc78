use thiserror::Error;

/// Tierscribe's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Tierscribe's crate-wide error type.
///
/// Every failure aborts the run: the tool is a single-shot batch process
/// invoked by a host application, and the host treats any diagnostic line as
/// terminal. There are no retries anywhere in the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A required host parameter is missing or unusable. Raised before any
    /// audio or model work so the run fails cheaply.
    #[error("{0}")]
    Parameter(String),

    /// A line in the input tier matched the span shape but carried a
    /// malformed time field. Fail-fast: one bad span aborts the whole run.
    #[error("input tier line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The source recording could not be probed or decoded.
    #[error("failed to decode source audio: {0}")]
    AudioDecode(String),

    /// The transcription engine failed on a segment.
    #[error("transcription failed: {0}")]
    Transcription(String),

    /// The post-editing service call failed (credentials, transport, or a
    /// malformed response).
    #[error("post-editing failed: {0}")]
    Refinement(String),

    /// The output tier document could not be written.
    #[error("failed to write output tier: {0}")]
    SerializationIo(#[source] std::io::Error),

    /// Ambient I/O failure while reading inputs (tier document, parameter
    /// stream). Output writes use [`Error::SerializationIo`] instead.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Message(String),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}
