//! Remote annotation client for AI-assisted section restyling.
//!
//! Sends a section's context to a chat-completions endpoint and parses the
//! reply into a structured annotation. Models wrap JSON in markdown fences,
//! prepend prose, or return free text; parsing is tolerant of all of these
//! and degrades to a suggestions-only annotation rather than failing.

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::AnnotationConfig;

/// Structured reply from the annotation endpoint.
///
/// `raw` always carries the verbatim model output so nothing is lost when
/// parsing only partially succeeds. Serializes with camelCase keys
/// (`textOverrides`), matching what the browser frontend consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Replacement utility classes for the section wrapper
    pub classes: String,
    /// Per-tag text replacements
    pub text_overrides: BTreeMap<String, String>,
    /// Free-form follow-up suggestions
    pub suggestions: Vec<String>,
    /// Verbatim model output
    pub raw: String,
}

/// JSON shape the model is asked to produce.
#[derive(Debug, Deserialize)]
struct RawAnnotation {
    #[serde(default, alias = "styleClasses")]
    classes: String,
    #[serde(default, alias = "textOverrides")]
    text_overrides: BTreeMap<String, String>,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Parses model output into an [`Annotation`].
///
/// Tries, in order: a fenced ```json block, the outermost brace-delimited
/// span, and the whole reply as JSON. When none parses, the reply becomes a
/// single suggestion with empty classes, so callers always get a usable
/// value.
#[must_use]
pub fn parse_annotation(reply: &str) -> Annotation {
    for candidate in json_candidates(reply) {
        if let Ok(parsed) = serde_json::from_str::<RawAnnotation>(&candidate) {
            return Annotation {
                classes: parsed.classes.trim().to_string(),
                text_overrides: parsed
                    .text_overrides
                    .into_iter()
                    .map(|(tag, text)| (tag.to_lowercase(), text))
                    .collect(),
                suggestions: parsed.suggestions,
                raw: reply.to_string(),
            };
        }
    }

    warn!("Annotation reply was not parseable as JSON, falling back to raw suggestion");
    Annotation {
        classes: String::new(),
        text_overrides: BTreeMap::new(),
        suggestions: vec![reply.trim().to_string()],
        raw: reply.to_string(),
    }
}

fn json_candidates(reply: &str) -> Vec<String> {
    let mut candidates = Vec::new();

    let fence = Regex::new(r"```(?:json)?\s*([\s\S]*?)```").unwrap();
    if let Some(captures) = fence.captures(reply) {
        candidates.push(captures[1].trim().to_string());
    }

    if let (Some(start), Some(end)) = (reply.find('{'), reply.rfind('}')) {
        if start < end {
            candidates.push(reply[start..=end].to_string());
        }
    }

    candidates.push(reply.trim().to_string());
    candidates
}

// ============================================================================
// HTTP Client
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

const SYSTEM_PROMPT: &str = "You are a web design assistant for a section-based page builder. \
Sections are styled with Tailwind utility classes. \
Reply with a single JSON object: \
{\"classes\": \"<replacement wrapper classes>\", \
\"textOverrides\": {\"<tag>\": \"<new text>\"}, \
\"suggestions\": [\"<follow-up idea>\"]}. \
Omit textOverrides entries for text you would keep. Do not reply with anything besides the JSON object.";

/// Client for the remote annotation endpoint.
#[derive(Debug, Clone)]
pub struct AnnotationClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl AnnotationClient {
    /// Creates a client from annotation settings.
    ///
    /// `api_key` is optional; endpoints running locally often need none.
    pub fn new(config: &AnnotationConfig, api_key: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Requests an annotation for one section.
    ///
    /// `section_type` is the section's category label and `current_classes`
    /// the wrapper's present class string; both give the model context for
    /// the user's `prompt`.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-success status codes, and replies with
    /// no choices. An unparseable reply body is NOT an error; it falls back
    /// to a suggestions-only annotation.
    pub async fn annotate(
        &self,
        prompt: &str,
        section_type: &str,
        current_classes: &str,
    ) -> Result<Annotation> {
        let user_message = format!(
            "Section type: {section_type}\nCurrent wrapper classes: {current_classes}\nRequest: {prompt}"
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
        };

        let mut builder = self.http.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .context("Annotation request failed to send")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Annotation endpoint returned {status}: {body}");
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to decode annotation response body")?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("Annotation response contained no choices")?;

        debug!(reply_len = content.len(), "Received annotation reply");
        Ok(parse_annotation(&content))
    }
}
