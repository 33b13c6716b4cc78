//! Host parameter channel.
//!
//! The host application launches us and streams configuration over stdin, one
//! parameter per line:
//!
//! ```text
//! <param name="input_tier">/path/to/input.xml</param>
//! <param name="source">/path/to/recording.wav</param>
//! <param name="output_tier">/path/to/output.xml</param>
//! ```
//!
//! We scan until the stream is exhausted; lines that don't match the shape are
//! ignored (the host interleaves other protocol lines we don't consume).

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

static PARAM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<param name="(.*?)".*?>(.*?)</param>"#).expect("param pattern must compile")
});

/// The key/value parameters received from the host.
#[derive(Debug, Default, Clone)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    /// Scan a parameter stream until EOF.
    ///
    /// Values are trimmed. A key sent twice keeps the last value (last write
    /// wins). Unknown keys are retained; the host sends more than we read.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut values = HashMap::new();
        for line in reader.lines() {
            let line = line?;
            if let Some(caps) = PARAM_PATTERN.captures(&line) {
                values.insert(caps[1].to_string(), caps[2].trim().to_string());
            }
        }
        Ok(Self { values })
    }

    /// Look up an optional parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Look up a required parameter.
    ///
    /// A missing or empty value is a fatal [`Error::Parameter`], phrased the
    /// way the host expects to see it on its diagnostic channel.
    pub fn require(&self, key: &str) -> Result<&str> {
        match self.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::Parameter(format!("no `{key}` specified"))),
        }
    }
}
