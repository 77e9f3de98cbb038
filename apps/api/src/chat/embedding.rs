//! Query-side embedding client for an OpenAI-compatible `/v1/embeddings` endpoint.
//!
//! The endpoint must serve `EMBEDDING_MODEL`, the model the knowledge base
//! was ingested with. The retriever rejects vectors of any other length.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::chat::retriever::Embedder;

/// Embedding model shared with ingestion. Changing it requires re-ingesting the index.
pub const EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const EMBEDDING_DIMENSIONS: usize = 384;

const EMBEDDING_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding endpoint returned no vectors")]
    EmptyResponse,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpEmbedder {
    /// `base_url` is the server root, e.g. `http://localhost:8081/v1`.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(EMBEDDING_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            api_key,
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        debug!(model = EMBEDDING_MODEL, text_len = text.len(), "Embedding query");

        let mut request = self.client.post(&self.endpoint).json(&EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input: vec![text],
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: EmbeddingResponse = response.json().await?;
        body.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(EmbeddingError::EmptyResponse)
    }

    fn model_id(&self) -> &str {
        EMBEDDING_MODEL
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }
}
