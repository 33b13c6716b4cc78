//! Output tier serialization.
//!
//! The output document is a wire-format contract with the host application:
//! the root element's attribute set and the per-span element shape must match
//! the host's schema byte for byte, or the host rejects the tier. Nothing
//! here is cosmetic formatting.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::annotation::Annotation;
use crate::{Error, Result};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const TIER_OPEN: &str = "<TIER xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
xsi:noNamespaceSchemaLocation=\"file:avatech-tier.xsd\" columns=\"XLS-R-ELAN-Output\">\n";
const TIER_CLOSE: &str = "</TIER>\n";

/// Streams the output tier document into a `Write` implementation.
///
/// Design:
/// - The document header is written lazily on the first span (or at close),
///   so constructing an encoder never touches the writer.
/// - `close()` always produces a well-formed document: a run with zero
///   annotations still gets the declaration, root element, and closing tag.
pub struct TierEncoder<W: Write> {
    /// The underlying writer we stream the document into.
    w: W,

    /// Whether we've written the declaration and opening root tag.
    started: bool,

    /// Whether the encoder has been closed.
    closed: bool,
}

impl<W: Write> TierEncoder<W> {
    /// Create a new encoder that writes to the provided writer.
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            closed: false,
        }
    }

    /// Write the declaration and opening root tag if we haven't yet.
    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w
                .write_all(XML_DECLARATION.as_bytes())
                .and_then(|()| self.w.write_all(TIER_OPEN.as_bytes()))
                .map_err(Error::SerializationIo)?;
            self.started = true;
        }
        Ok(())
    }

    /// Write one span element.
    ///
    /// `start_ms`/`end_ms` are millisecond integers; `text` is written
    /// verbatim. The host's schema does not escape span text, so neither do
    /// we — a transcript containing markup-significant characters would
    /// produce a malformed document. Known hazard, preserved deliberately.
    pub fn write_span(&mut self, start_ms: u64, end_ms: u64, text: &str) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write span: encoder is already closed"));
        }

        self.start_if_needed()?;

        writeln!(
            &mut self.w,
            "    <span start=\"{start_ms}\" end=\"{end_ms}\"><v>{text}</v></span>"
        )
        .map_err(Error::SerializationIo)?;

        Ok(())
    }

    /// Write the closing root tag and flush. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        // An empty run still yields a well-formed document.
        self.start_if_needed()?;

        self.w
            .write_all(TIER_CLOSE.as_bytes())
            .and_then(|()| self.w.flush())
            .map_err(Error::SerializationIo)?;

        self.closed = true;
        Ok(())
    }
}

/// Render a processed annotation sequence as a tier document.
///
/// Spans are written in slice order — the input document's order — never
/// re-sorted by time. Annotations that never received an output render with
/// empty text.
pub fn write_tier<W: Write>(w: W, annotations: &[Annotation]) -> Result<()> {
    let mut encoder = TierEncoder::new(w);
    for annotation in annotations {
        encoder.write_span(
            annotation.start,
            annotation.end,
            annotation.output.as_deref().unwrap_or_default(),
        )?;
    }
    encoder.close()
}

/// Render a processed annotation sequence into a file.
pub fn write_tier_to_path(path: &Path, annotations: &[Annotation]) -> Result<()> {
    let file = File::create(path).map_err(Error::SerializationIo)?;
    write_tier(BufWriter::new(file), annotations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(start: u64, end: u64, output: Option<&str>) -> Annotation {
        Annotation {
            start,
            end,
            value: String::new(),
            output: output.map(str::to_string),
        }
    }

    #[test]
    fn close_without_spans_emits_a_well_formed_empty_document() -> Result<()> {
        let mut out = Vec::new();
        write_tier(&mut out, &[])?;

        let s = std::str::from_utf8(&out).expect("utf-8 output");
        assert_eq!(
            s,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <TIER xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
             xsi:noNamespaceSchemaLocation=\"file:avatech-tier.xsd\" \
             columns=\"XLS-R-ELAN-Output\">\n\
             </TIER>\n"
        );
        Ok(())
    }

    #[test]
    fn spans_render_with_millisecond_integers_and_verbatim_text() -> Result<()> {
        let mut out = Vec::new();
        write_tier(
            &mut out,
            &[
                annotation(0, 1000, Some("imatata")),
                annotation(1250, 2000, Some("alli puncha")),
            ],
        )?;

        let s = std::str::from_utf8(&out).expect("utf-8 output");
        assert!(s.contains("    <span start=\"0\" end=\"1000\"><v>imatata</v></span>\n"));
        assert!(s.contains("    <span start=\"1250\" end=\"2000\"><v>alli puncha</v></span>\n"));
        assert!(s.ends_with("</TIER>\n"));
        Ok(())
    }

    #[test]
    fn spans_keep_input_order_even_when_times_go_backwards() -> Result<()> {
        let mut out = Vec::new();
        write_tier(
            &mut out,
            &[
                annotation(5000, 6000, Some("later")),
                annotation(0, 1000, Some("earlier")),
            ],
        )?;

        let s = std::str::from_utf8(&out).expect("utf-8 output");
        let later = s.find("later").expect("later span present");
        let earlier = s.find("earlier").expect("earlier span present");
        assert!(later < earlier);
        Ok(())
    }

    #[test]
    fn missing_output_renders_as_empty_text() -> Result<()> {
        let mut out = Vec::new();
        write_tier(&mut out, &[annotation(0, 500, None)])?;

        let s = std::str::from_utf8(&out).expect("utf-8 output");
        assert!(s.contains("<span start=\"0\" end=\"500\"><v></v></span>"));
        Ok(())
    }

    #[test]
    fn close_is_idempotent() -> Result<()> {
        let mut out = Vec::new();
        let mut encoder = TierEncoder::new(&mut out);
        encoder.close()?;
        encoder.close()?;

        let s = std::str::from_utf8(&out).expect("utf-8 output");
        assert_eq!(s.matches("</TIER>").count(), 1);
        Ok(())
    }

    #[test]
    fn write_after_close_errors() -> Result<()> {
        let mut out = Vec::new();
        let mut encoder = TierEncoder::new(&mut out);
        encoder.close()?;

        let err = encoder.write_span(0, 1000, "nope").unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
