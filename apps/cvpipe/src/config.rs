use std::time::Duration;

use anyhow::Result;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_api_base: String,
    pub openai_model: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_api_base: std::env::var("OPENAI_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| crate::llm_client::DEFAULT_MODEL.to_string()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| anyhow::anyhow!("Required environment variable '{key}' is not set"))
}

/// Tunables for one extraction run. Defaults mirror the production
/// settings: chunks of 10 documents, 3 concurrent workers, 3 attempts
/// per document, 5 s pause between chunks.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of documents per sequentially-scheduled chunk.
    pub batch_size: usize,
    /// Bound on concurrent extraction workers within a chunk.
    pub worker_count: usize,
    /// Attempt ceiling per document (load + LLM call + parse).
    pub max_retries: u32,
    /// Pause between chunks to respect provider rate limits.
    /// `Duration::ZERO` disables pacing entirely.
    pub pacing: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            worker_count: 3,
            max_retries: 3,
            pacing: Duration::from_secs(5),
        }
    }
}
