//! Best-effort AI summaries for nomination answers.
//!
//! [`SummaryGenerator`] is the outbound seam; [`SummaryEnricher`] wraps it with a
//! timeout and collapses every failure into [`FALLBACK_AI_SUMMARY`], so enrichment
//! can never fail a nomination.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::NominationAnswer;
use crate::config::SummarizerConfig;

/// Stored on the nomination whenever the summarizer cannot produce text.
pub const FALLBACK_AI_SUMMARY: &str = "AI summary is not available for this nomination.";

const SUMMARY_INSTRUCTIONS: &str = "Summarize the following award nomination answers in two or three sentences. \
Focus on the nominee's concrete contributions.";

/// Failure modes of a single summarizer call.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("summarizer is not configured")]
    Disabled,
    #[error("summarizer timed out after {0:?}")]
    Timeout(Duration),
    #[error("summarizer request failed: {0}")]
    Transport(String),
    #[error("summarizer returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("summarizer response malformed: {0}")]
    Malformed(String),
}

/// Outbound text generation. Receives the serialized answers and returns free text.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    async fn summarize(&self, payload: &str) -> Result<String, EnrichmentError>;
}

/// Generator used when no summarizer endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSummaryGenerator;

#[async_trait]
impl SummaryGenerator for DisabledSummaryGenerator {
    async fn summarize(&self, _payload: &str) -> Result<String, EnrichmentError> {
        Err(EnrichmentError::Disabled)
    }
}

#[derive(Debug, Serialize)]
struct SummaryRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: Option<String>,
}

/// JSON-over-HTTP summarizer. The `reqwest::Client` is owned by the caller and
/// injected, so one connection pool serves the whole process.
#[derive(Debug, Clone)]
pub struct HttpSummaryGenerator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl HttpSummaryGenerator {
    pub fn new(client: Client, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
            model: model.into(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Build a client carrying the configured timeout. Returns `None` when disabled.
    pub fn from_config(config: &SummarizerConfig) -> Result<Option<Self>, reqwest::Error> {
        let Some(endpoint) = config.endpoint.as_deref() else {
            return Ok(None);
        };

        let client = Client::builder().timeout(config.timeout).build()?;
        let generator = Self::new(client, endpoint, config.model.as_str());
        Ok(Some(match &config.api_key {
            Some(key) => generator.with_api_key(key.as_str()),
            None => generator,
        }))
    }
}

#[async_trait]
impl SummaryGenerator for HttpSummaryGenerator {
    async fn summarize(&self, payload: &str) -> Result<String, EnrichmentError> {
        let request = SummaryRequest {
            model: &self.model,
            instructions: SUMMARY_INSTRUCTIONS,
            input: payload,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| EnrichmentError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable body".to_string());
            return Err(EnrichmentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response
            .json::<SummaryResponse>()
            .await
            .map_err(|err| EnrichmentError::Malformed(err.to_string()))?;

        parsed
            .summary
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| EnrichmentError::Malformed("empty summary".to_string()))
    }
}

/// Generator selected from configuration at startup.
#[derive(Debug, Clone)]
pub enum ConfiguredSummaryGenerator {
    Http(HttpSummaryGenerator),
    Disabled(DisabledSummaryGenerator),
}

impl ConfiguredSummaryGenerator {
    pub fn from_config(config: &SummarizerConfig) -> Result<Self, reqwest::Error> {
        Ok(match HttpSummaryGenerator::from_config(config)? {
            Some(generator) => Self::Http(generator),
            None => Self::Disabled(DisabledSummaryGenerator),
        })
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

#[async_trait]
impl SummaryGenerator for ConfiguredSummaryGenerator {
    async fn summarize(&self, payload: &str) -> Result<String, EnrichmentError> {
        match self {
            Self::Http(generator) => generator.summarize(payload).await,
            Self::Disabled(generator) => generator.summarize(payload).await,
        }
    }
}

/// Serialize answers into the enrichment payload, preserving display order.
pub fn answers_payload(answers: &[NominationAnswer]) -> Result<String, EnrichmentError> {
    serde_json::to_string(answers).map_err(|err| EnrichmentError::Malformed(err.to_string()))
}

/// Timeout-bounded wrapper that always yields text.
pub struct SummaryEnricher<G> {
    generator: Arc<G>,
    timeout: Duration,
}

impl<G> SummaryEnricher<G>
where
    G: SummaryGenerator + 'static,
{
    pub fn new(generator: Arc<G>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub async fn summarize_answers(&self, answers: &[NominationAnswer]) -> String {
        match self.try_summarize(answers).await {
            Ok(summary) => summary,
            Err(EnrichmentError::Disabled) => FALLBACK_AI_SUMMARY.to_string(),
            Err(err) => {
                warn!(error = %err, "ai summary unavailable, using fallback text");
                FALLBACK_AI_SUMMARY.to_string()
            }
        }
    }

    async fn try_summarize(&self, answers: &[NominationAnswer]) -> Result<String, EnrichmentError> {
        let payload = answers_payload(answers)?;
        tokio::time::timeout(self.timeout, self.generator.summarize(&payload))
            .await
            .map_err(|_| EnrichmentError::Timeout(self.timeout))?
    }
}
