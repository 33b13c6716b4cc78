//! Input tier parsing.
//!
//! The input tier is a line-oriented document in the host's exchange format;
//! the lines we care about embed a span with fractional-second timestamps and
//! an inline text value:
//!
//! ```text
//! <span start="1.250" end="2.000"><v>hola</v></span>
//! ```
//!
//! Parsing policy:
//! - Lines that don't match the span shape are silently skipped. This is a
//!   named policy, not an accident: tier documents carry header/footer lines
//!   that are not part of the annotation payload.
//! - A line that *does* match but carries a malformed time field aborts the
//!   run. One bad span means the document can't be trusted.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

static SPAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<span start="(.*?)" end="(.*?)"><v>(.*?)</v>"#).expect("span pattern must compile")
});

/// One time-coded annotation from the input tier.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Start offset into the recording, milliseconds.
    pub start: u64,

    /// End offset into the recording, milliseconds.
    pub end: u64,

    /// The original text label from the input tier. Carried through untouched.
    pub value: String,

    /// The derived transcription (post-edited when enabled). `None` until the
    /// transcription stage has run for this annotation.
    pub output: Option<String>,
}

/// Read and parse the annotations of an input tier document.
///
/// Returns annotations in document order; that order is preserved all the way
/// into the output tier. An empty document (no span lines) is a valid result.
pub fn read_annotations(path: &Path) -> Result<Vec<Annotation>> {
    let file = File::open(path)?;
    parse_annotations(BufReader::new(file))
}

/// Parse annotations from any line-oriented reader.
pub fn parse_annotations(reader: impl BufRead) -> Result<Vec<Annotation>> {
    let mut annotations = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(caps) = SPAN_PATTERN.captures(&line) else {
            continue;
        };

        let line_number = index + 1;
        annotations.push(Annotation {
            start: parse_timestamp_ms(&caps[1], line_number, "start")?,
            end: parse_timestamp_ms(&caps[2], line_number, "end")?,
            value: caps[3].to_string(),
            output: None,
        });
    }
    Ok(annotations)
}

/// Convert a fractional-second field to integer milliseconds.
///
/// Conversion is multiplication by 1000 and truncation toward zero, matching
/// the host's own tier arithmetic. Non-numeric, non-finite, or negative
/// fields are fatal.
fn parse_timestamp_ms(field: &str, line: usize, name: &str) -> Result<u64> {
    let seconds: f64 = field.parse().map_err(|_| Error::Parse {
        line,
        message: format!("invalid {name} time {field:?}"),
    })?;

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(Error::Parse {
            line,
            message: format!("invalid {name} time {field:?}"),
        });
    }

    Ok((seconds * 1000.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(doc: &str) -> Result<Vec<Annotation>> {
        parse_annotations(Cursor::new(doc))
    }

    #[test]
    fn parses_spans_in_document_order() -> Result<()> {
        let doc = "\
<span start=\"1.250\" end=\"2.000\"><v>uno</v></span>
<span start=\"0.500\" end=\"1.000\"><v>dos</v></span>
";
        let annotations = parse(doc)?;
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].start, 1250);
        assert_eq!(annotations[0].end, 2000);
        assert_eq!(annotations[0].value, "uno");
        assert_eq!(annotations[0].output, None);

        // Order follows the document, even when timestamps go backwards.
        assert_eq!(annotations[1].start, 500);
        assert_eq!(annotations[1].value, "dos");
        Ok(())
    }

    #[test]
    fn non_matching_lines_are_skipped_silently() -> Result<()> {
        let doc = "\
<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<TIER columns=\"orthography\">

<span start=\"0.000\" end=\"1.000\"><v>hola</v></span>
</TIER>
";
        let annotations = parse(doc)?;
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].value, "hola");
        Ok(())
    }

    #[test]
    fn empty_document_yields_zero_annotations() -> Result<()> {
        assert!(parse("")?.is_empty());
        assert!(parse("<TIER>\n</TIER>\n")?.is_empty());
        Ok(())
    }

    #[test]
    fn seconds_are_truncated_not_rounded() -> Result<()> {
        let doc = "<span start=\"1.2349\" end=\"2.9999\"><v>x</v></span>\n";
        let annotations = parse(doc)?;
        assert_eq!(annotations[0].start, 1234);
        assert_eq!(annotations[0].end, 2999);
        Ok(())
    }

    #[test]
    fn malformed_time_field_is_fatal() {
        let doc = "<span start=\"abc\" end=\"2.000\"><v>x</v></span>\n";
        let err = parse(doc).unwrap_err();
        match err {
            Error::Parse { line, ref message } => {
                assert_eq!(line, 1);
                assert!(message.contains("start"));
            }
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn negative_time_field_is_fatal() {
        let doc = "<span start=\"-1.0\" end=\"2.000\"><v>x</v></span>\n";
        assert!(parse(doc).is_err());
    }

    #[test]
    fn value_text_is_carried_through_verbatim() -> Result<()> {
        let doc = "<span start=\"0.0\" end=\"1.0\"><v>  two  words </v></span>\n";
        let annotations = parse(doc)?;
        assert_eq!(annotations[0].value, "  two  words ");
        Ok(())
    }
}
