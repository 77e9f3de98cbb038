//! Knowledge index backed by PostgreSQL + pgvector.
//!
//! One table per collection, written by the offline ingestion job:
//! `id TEXT PRIMARY KEY, title TEXT, content TEXT, embedding vector(384)`.
//! Queries use the cosine-distance operator `<=>`, matching the ingestion metric.
//! Each call checks a connection out of the pool and returns it on every exit path.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use crate::chat::retriever::{IndexError, KnowledgeHit, VectorIndex};

pub struct PgVectorIndex {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct HitRow {
    id: String,
    title: String,
    content: String,
    distance: f64,
}

impl PgVectorIndex {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_err(e: sqlx::Error) -> IndexError {
        IndexError::Query(e.to_string())
    }
}

/// Collection names become table names; anything but alphanumerics and `_` is replaced.
fn table_name(collection: &str) -> Result<String, IndexError> {
    let sanitized: String = collection
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        return Err(IndexError::CollectionMissing(collection.to_string()));
    }
    Ok(sanitized.to_lowercase())
}

#[async_trait]
impl VectorIndex for PgVectorIndex {
    async fn collection_exists(&self, collection: &str) -> Result<bool, IndexError> {
        let table = table_name(collection)?;
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(&table)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_err)?;
        Ok(exists)
    }

    async fn nearest(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<KnowledgeHit>, IndexError> {
        if !self.collection_exists(collection).await? {
            return Err(IndexError::CollectionMissing(collection.to_string()));
        }
        let table = table_name(collection)?;

        let sql = format!(
            "SELECT id, title, content, (embedding <=> $1::vector)::float8 AS distance \
             FROM {table} \
             WHERE vector_dims(embedding) = $2 \
             ORDER BY embedding <=> $1::vector \
             LIMIT $3"
        );

        let rows = sqlx::query_as::<_, HitRow>(&sql)
            .bind(embedding.to_vec())
            .bind(embedding.len() as i32)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(Self::map_err)?;

        debug!(collection, table = %table, hits = rows.len(), "pgvector nearest-neighbour query");

        Ok(rows
            .into_iter()
            .map(|r| KnowledgeHit {
                doc_id: r.id,
                title: r.title,
                content: r.content,
                distance: r.distance,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_sanitizes() {
        assert_eq!(table_name("onet_data").unwrap(), "onet_data");
        assert_eq!(table_name("O*NET data;drop").unwrap(), "o_net_data_drop");
    }

    #[test]
    fn test_empty_collection_name_is_missing() {
        assert!(matches!(
            table_name(""),
            Err(IndexError::CollectionMissing(_))
        ));
    }
}
