use async_trait::async_trait;
use derive_more::Display;

pub mod gemini;

pub use gemini::GeminiClient;

#[derive(Debug, Display)]
pub enum LlmError {
    #[display("Language model API key is not configured")]
    NotConfigured,

    #[display("Cannot reach language model at {_0}")]
    Connection(String),

    #[display("HTTP client error: {_0}")]
    HttpClient(String),

    #[display("Language model returned {status}: {body}")]
    Api { status: u16, body: String },

    #[display("Unexpected language model response: {_0}")]
    ResponseParsing(String),

    #[display("Language model returned an empty response")]
    EmptyResponse,
}

impl std::error::Error for LlmError {}

/// What an embedding will be compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingTask {
    /// A search query or member profile.
    Query,
    /// An alumni row stored for later lookup.
    Document,
}

/// Text generation and embeddings behind one seam so use cases can be
/// exercised with a mock.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>, LlmError>;
}

/// Removes a surrounding Markdown fence (```json ... ``` or ``` ... ```)
/// from a model answer that should be bare JSON.
pub fn strip_json_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Drops the first and last lines of an answer that opens with a fence.
pub fn strip_text_fence(raw: &str) -> String {
    let text = raw.trim();
    if !text.starts_with("```") {
        return text.to_string();
    }

    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= 2 {
        return String::new();
    }
    lines[1..lines.len() - 1].join("\n").trim().to_string()
}
