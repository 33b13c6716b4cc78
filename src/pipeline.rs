//! Per-annotation orchestration.
//!
//! The loop is strictly sequential and processes annotations in input order:
//! extract the segment, transcribe it, optionally post-edit, store the
//! result. Nothing is persisted here — the caller serializes the tier only
//! after every annotation has completed, so a failure part-way through
//! discards all in-memory results (the output document is all-or-nothing).

use tracing::debug;

use crate::Result;
use crate::annotation::Annotation;
use crate::engine::TranscriptionEngine;
use crate::recording::Recording;
use crate::refine::TextRefiner;

/// Observational progress reporting from the per-annotation loop.
///
/// Purely a side channel for the host's console; never used for resumption.
#[derive(Debug)]
pub enum ProgressEvent<'a> {
    /// The engine finished decoding a segment.
    Transcribed {
        index: usize,
        total: usize,
        text: &'a str,
    },

    /// The post-editor finished rewriting a segment.
    PostEdited {
        index: usize,
        total: usize,
        text: &'a str,
    },

    /// The annotation's final output has been stored.
    AnnotationDone { index: usize, total: usize },
}

/// Run the transcription (and optional post-edit) loop over all annotations.
///
/// On success every annotation's `output` is `Some`. Any stage failure aborts
/// immediately with the annotations processed so far left untouched in
/// memory and nothing written anywhere.
pub fn process_annotations(
    engine: &mut dyn TranscriptionEngine,
    refiner: Option<&dyn TextRefiner>,
    recording: &Recording,
    annotations: &mut [Annotation],
    mut on_progress: impl FnMut(&ProgressEvent<'_>),
) -> Result<()> {
    let total = annotations.len();

    for (index, annotation) in annotations.iter_mut().enumerate() {
        let segment = recording.slice_ms(annotation.start, annotation.end);
        debug!(
            start = annotation.start,
            end = annotation.end,
            samples = segment.len(),
            "processing annotation"
        );

        // Empty segments never reach the engine; their transcription is the
        // empty string. An annotation without audio content is not an error.
        let mut output = if segment.is_empty() {
            String::new()
        } else {
            engine.transcribe(segment)?
        };
        on_progress(&ProgressEvent::Transcribed {
            index,
            total,
            text: &output,
        });

        if let Some(refiner) = refiner {
            output = refiner.refine(&output)?;
            on_progress(&ProgressEvent::PostEdited {
                index,
                total,
                text: &output,
            });
        }

        annotation.output = Some(output);
        on_progress(&ProgressEvent::AnnotationDone { index, total });
    }

    Ok(())
}
