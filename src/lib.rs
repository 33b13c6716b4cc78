//! `tierscribe` — an ELAN "local recognizer" that transcribes annotation tiers.
//!
//! The host application hands us a tier of time-coded annotations plus the
//! source recording; we produce a machine transcription for the audio spanned
//! by each annotation, optionally run an LLM post-edit pass over it, and write
//! a new tier document back in the host's exchange format.
//!
//! This crate provides:
//! - Host parameter and input tier parsing
//! - One-time audio decoding + normalization (mono, 16 kHz, `f32`)
//! - Per-annotation segment extraction with silent clipping
//! - A pluggable transcription engine (Whisper built in)
//! - An optional chat-completion post-editor
//! - The output tier serializer
//!
//! The library is designed to be driven by the `tierscribe` binary, but every
//! stage is exposed so tests and other frontends can run the pipeline with
//! stub engines.

// Host-facing input surfaces.
pub mod annotation;
pub mod params;

// Audio decoding and normalization.
pub mod audio_pipeline;
pub mod decode;
pub mod demux;
pub mod recording;
pub mod wav;

// Transcription and post-editing stages.
pub mod backends;
pub mod engine;
pub mod refine;

// Output serialization.
pub mod tier_encoder;

// Orchestration.
pub mod opts;
pub mod pipeline;

// Logging configuration (used by binaries).
#[cfg(feature = "logging")]
pub mod logging;

pub mod error;

pub use error::{Error, Result};
