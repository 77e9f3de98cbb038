//! Knowledge Retriever: embeds a question and returns the nearest knowledge-base passages.
//!
//! The embedding model is a build-time contract with the offline ingestion job:
//! the index only holds vectors from `EMBEDDING_MODEL`, so the query side must
//! embed with the same model and dimensionality.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error};

use crate::chat::embedding::EmbeddingError;
use crate::chat::ChatError;

/// Passages retrieved per chat question.
pub const RETRIEVAL_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Collection '{0}' does not exist")]
    CollectionMissing(String),

    #[error("Index query failed: {0}")]
    Query(String),
}

/// A stored passage as returned by a nearest-neighbour query.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeHit {
    /// Occupation code plus chunk sequence, e.g. `15-1252.00#2`.
    pub doc_id: String,
    pub title: String,
    pub content: String,
    /// Cosine distance (0.0 = identical direction).
    pub distance: f64,
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn model_id(&self) -> &str;

    fn dimensions(&self) -> usize;
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn collection_exists(&self, collection: &str) -> Result<bool, IndexError>;

    /// Up to `limit` passages nearest to `embedding` by cosine distance, nearest
    /// first. Only rows with the same dimensionality as `embedding` are considered.
    async fn nearest(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<KnowledgeHit>, IndexError>;
}

#[derive(Clone)]
pub struct KnowledgeRetriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    collection: String,
}

impl KnowledgeRetriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            index,
            collection: collection.into(),
        }
    }

    /// Passage texts nearest to `query`, nearest first. An index with no
    /// matching documents gives an empty list.
    pub async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<String>, ChatError> {
        let embedding = self.embedder.embed(query).await.map_err(|e| {
            error!(model = self.embedder.model_id(), "Embedding failed: {e}");
            ChatError::Degraded(format!("embedding failed: {e}"))
        })?;

        if embedding.len() != self.embedder.dimensions() {
            error!(
                model = self.embedder.model_id(),
                expected = self.embedder.dimensions(),
                got = embedding.len(),
                "Embedding dimension mismatch; the endpoint is serving a different model"
            );
            return Err(ChatError::Degraded(format!(
                "embedding has {} dimensions, expected {}",
                embedding.len(),
                self.embedder.dimensions()
            )));
        }

        let hits = self
            .index
            .nearest(&self.collection, &embedding, limit)
            .await
            .map_err(|e| match e {
                IndexError::CollectionMissing(_) => {
                    error!("Knowledge index misconfigured: {e}");
                    ChatError::NotConfigured(e.to_string())
                }
                IndexError::Query(_) => {
                    error!("Knowledge index query failed: {e}");
                    ChatError::Degraded(e.to_string())
                }
            })?;

        debug!(
            collection = %self.collection,
            hits = hits.len(),
            nearest = ?hits.first().map(|h| h.doc_id.as_str()),
            "Retrieved knowledge passages"
        );

        Ok(hits.into_iter().map(|h| h.content).collect())
    }
}
