//! Built-in transcription engine implementations.

pub mod whisper;
