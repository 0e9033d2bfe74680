//! Fact generation collaborator
//!
//! Produces one short motivating sentence about the deposit. The kiosk works
//! without it: every failure here ends up as an empty fact.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::FactSettings;
use crate::error::FactError;
use crate::types::{Language, Material};
use crate::FACT_MAX_WORDS;

lazy_static! {
    /// `**bold**` and `__bold__`
    static ref RE_STRONG: Regex = Regex::new(r"\*\*(\S(?:[^*]*\S)?)\*\*|__(\S(?:[^_]*\S)?)__").unwrap();

    /// `*italic*`, hugging the text on both sides
    static ref RE_ITALIC: Regex = Regex::new(r"\*(\S(?:[^*]*\S)?)\*").unwrap();

    /// `` `code` ``
    static ref RE_CODE: Regex = Regex::new(r"`([^`]+)`").unwrap();

    /// Runs of whitespace, including newlines
    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Opening and closing quote pairs a model may wrap its reply in
const QUOTE_PAIRS: [(char, char); 5] = [
    ('"', '"'),
    ('\'', '\''),
    ('“', '”'),
    ('«', '»'),
    ('„', '“'),
];

/// What was deposited, snapshotted when the user confirms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FactRequest {
    pub count: u32,
    pub material: Material,
    pub language: Language,
}

/// Source of the motivational fact
#[async_trait]
pub trait FactGenerator: Send + Sync {
    async fn generate_fact(&self, request: FactRequest) -> Result<String, FactError>;
}

/// Build the prompt sent to the text model
pub fn build_prompt(request: &FactRequest) -> String {
    format!(
        "The user just recycled {} {}.\n\
         Generate a very short, motivating, one-sentence fun fact or congratulatory message \
         about how much CO2 or energy they saved.\n\
         The message must be in {}.\n\
         Keep it under {} words.",
        request.count,
        request.material.fact_noun(),
        request.language.natural_name(),
        FACT_MAX_WORDS
    )
}

/// Normalize model output for display
///
/// Collapses whitespace, drops one pair of quotes wrapping the whole reply
/// and unwraps paired markdown emphasis. Lone `#`, `_` or quote characters
/// are part of the text and stay.
pub fn clean_fact(raw: &str) -> String {
    let text = RE_WHITESPACE.replace_all(raw.trim(), " ");
    let text = strip_wrapping_quotes(&text);
    let text = RE_STRONG.replace_all(text, "$1$2");
    let text = RE_ITALIC.replace_all(&text, "$1");
    let text = RE_CODE.replace_all(&text, "$1");
    text.trim().to_string()
}

/// Remove quotes only when they open and close the reply as a pair
fn strip_wrapping_quotes(text: &str) -> &str {
    for (open, close) in QUOTE_PAIRS {
        let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        else {
            continue;
        };
        // `"a" and "b"` is two quotations, not one wrapped reply
        if !inner.contains(close) {
            return inner.trim();
        }
    }
    text
}

/// Pick the generator for the given settings
///
/// Falls back to [`DisabledFactGenerator`] when facts are off, the key is
/// missing, or the HTTP client cannot be built.
pub fn from_settings(settings: &FactSettings) -> Arc<dyn FactGenerator> {
    let api_key = match settings.api_key.as_deref().map(str::trim) {
        Some(key) if settings.enabled && !key.is_empty() => key.to_string(),
        _ => {
            debug!("fact generation disabled");
            return Arc::new(DisabledFactGenerator);
        }
    };

    match GeminiFactGenerator::new(
        &settings.endpoint,
        &settings.model,
        api_key,
        Duration::from_secs(settings.timeout_secs),
    ) {
        Ok(generator) => Arc::new(generator),
        Err(e) => {
            warn!(error = %e, "fact client unavailable, continuing without facts");
            Arc::new(DisabledFactGenerator)
        }
    }
}

// =============================================================================
// DISABLED
// =============================================================================

/// Stand-in used when no credentials are configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledFactGenerator;

#[async_trait]
impl FactGenerator for DisabledFactGenerator {
    async fn generate_fact(&self, _request: FactRequest) -> Result<String, FactError> {
        Err(FactError::MissingCredentials)
    }
}

// =============================================================================
// GEMINI
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Client for the Gemini `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiFactGenerator {
    http: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiFactGenerator {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FactError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.into(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

#[async_trait]
impl FactGenerator for GeminiFactGenerator {
    async fn generate_fact(&self, request: FactRequest) -> Result<String, FactError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(&request)),
                }],
            }],
        };

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FactError::Upstream {
                status: status.as_u16(),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed.text().ok_or(FactError::EmptyResponse)?;
        debug!(model = %self.model, chars = text.len(), "fact generated");
        Ok(text)
    }
}

// =============================================================================
// TESTS
// =============================================================================
