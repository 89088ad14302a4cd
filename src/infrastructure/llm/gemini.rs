use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{EmbeddingTask, LlmClient, LlmError};
use crate::settings::AppConfig;

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client for the Gemini REST API.
///
/// Constructed even without an API key so the server can start; every
/// call then fails with [`LlmError::NotConfigured`].
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    embedding_model: String,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::HttpClient(e.to_string()))?;

        Ok(GeminiClient {
            client,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            api_key: config
                .gemini_api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            model: config.gemini_model.clone(),
            embedding_model: config.embedding_model.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.api_key.as_deref().ok_or(LlmError::NotConfigured)
    }

    async fn post<B, R>(&self, url: String, body: &B) -> Result<R, LlmError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key()?)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    LlmError::HttpClient(format!("Request timed out after {}s", REQUEST_TIMEOUT_SECS))
                } else {
                    LlmError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();

        let text = text.trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    model: String,
    content: Content<'a>,
    task_type: &'static str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[async_trait]
impl LlmClient for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: [Content { parts: [Part { text: prompt }] }],
        };

        let response: GenerateResponse = self.post(url, &body).await?;
        response.into_text().ok_or(LlmError::EmptyResponse)
    }

    #[instrument(skip(self, text), fields(model = %self.embedding_model))]
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:embedContent",
            self.base_url, self.embedding_model
        );
        let body = EmbedRequest {
            model: format!("models/{}", self.embedding_model),
            content: Content { parts: [Part { text }] },
            task_type: match task {
                EmbeddingTask::Query => "RETRIEVAL_QUERY",
                EmbeddingTask::Document => "RETRIEVAL_DOCUMENT",
            },
        };

        let response: EmbedResponse = self.post(url, &body).await?;
        if response.embedding.values.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(response.embedding.values)
    }
}
