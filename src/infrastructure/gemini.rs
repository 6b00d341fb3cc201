//! Product summaries from an external generative-text API.
//!
//! The upstream is treated as a black box that sometimes answers 503 when it
//! is overloaded. Only 503 is retried, following a fixed backoff schedule; any
//! other failure, or a 503 on the last attempt, is returned to the caller as is.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::config::GeminiConfig;
use crate::models::Product;

/// Delay before each attempt.
pub const DEFAULT_BACKOFFS: [Duration; 3] = [
    Duration::ZERO,
    Duration::from_millis(800),
    Duration::from_millis(1600),
];

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("text generation is not configured")]
    NotConfigured,
    #[error("request to text generation API failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("text generation API returned status={status} body={body}")]
    Status { status: u16, body: String },
    #[error("text generation API returned an unreadable body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("text generation API returned no text")]
    Empty,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError>;
}

/// Prompt asking for a short, upbeat pitch aimed at prospective buyers.
pub fn summary_prompt(product: &Product) -> String {
    format!(
        "Write a short introduction of the following item for people considering buying it.\n\
         \n\
         Title: {}\n\
         Price: {}\n\
         Description: {}\n\
         \n\
         Rules:\n\
         - Highlight a few appealing points.\n\
         - Keep it concise.\n\
         - Do not list caveats.\n\
         - Do not use ** for emphasis.\n",
        product.title, product.price, product.description
    )
}

pub async fn generate_product_summary(
    generator: &dyn TextGenerator,
    product: &Product,
) -> Result<String, UpstreamError> {
    generator.generate(&summary_prompt(product)).await
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    backoffs: Vec<Duration>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            backoffs: DEFAULT_BACKOFFS.to_vec(),
        }
    }

    pub fn with_backoffs(mut self, backoffs: Vec<Duration>) -> Self {
        self.backoffs = backoffs;
        self
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError> {
        let key = self.api_key.as_deref().ok_or(UpstreamError::NotConfigured)?;
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        let mut last_error = UpstreamError::Empty;
        let attempts = self.backoffs.len();

        for (attempt, wait) in self.backoffs.iter().enumerate() {
            if !wait.is_zero() {
                tokio::time::sleep(*wait).await;
            }

            let response = self
                .http
                .post(&self.endpoint)
                .query(&[("key", key)])
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let bytes = response.bytes().await?;

            if status == StatusCode::SERVICE_UNAVAILABLE && attempt + 1 < attempts {
                tracing::warn!(
                    "Text generation overloaded, retrying (attempt {}/{})",
                    attempt + 1,
                    attempts
                );
                last_error = UpstreamError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                };
                continue;
            }

            if !status.is_success() {
                return Err(UpstreamError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                });
            }

            let parsed: GenerateResponse = serde_json::from_slice(&bytes)?;
            return parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content.parts.into_iter().next())
                .map(|p| p.text)
                .ok_or(UpstreamError::Empty);
        }

        Err(last_error)
    }
}
