//! LLM post-editing of raw transcriptions.
//!
//! The refiner receives a fixed system instruction describing the correction
//! task plus the raw transcription as the sole user message, and returns a
//! single corrected string. Service failures are fatal to the run: there is
//! no fallback to the raw transcription and no retry. The one concession to
//! the network dependency is a per-request deadline on the client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The correction task given to the model, verbatim, for every request.
pub const POST_EDIT_INSTRUCTION: &str = "You will be given an ASR transcript in Kichwa, \
and your task is to correct any errors in the transcript. \
You can also add punctuation and capitalization as needed. \
Please output only the corrected transcript.";

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const POST_EDIT_MODEL: &str = "gpt-4o-2024-08-06";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Pluggable text post-editor used by [`crate::pipeline`].
pub trait TextRefiner {
    /// Return the corrected form of `text`.
    fn refine(&self, text: &str) -> Result<String>;
}

/// A [`TextRefiner`] backed by an OpenAI-compatible chat-completions endpoint.
pub struct ChatRefiner {
    client: reqwest::blocking::Client,
    api_key: String,
}

impl ChatRefiner {
    /// Build a refiner with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("tierscribe")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Refinement(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    /// Build a refiner with credentials from `OPENAI_API_KEY`.
    ///
    /// A missing key fails here, before any per-annotation work starts.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::Refinement("OPENAI_API_KEY is not set".to_string()))?;
        Self::new(api_key)
    }
}

impl TextRefiner for ChatRefiner {
    fn refine(&self, text: &str) -> Result<String> {
        let request = ChatRequest {
            model: POST_EDIT_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: POST_EDIT_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| Error::Refinement(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| Error::Refinement(format!("service returned an error: {e}")))?;

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| Error::Refinement(format!("malformed response body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Refinement("response contained no choices".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}
