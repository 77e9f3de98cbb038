//! Startup sequence. Builds every dependency once and records one
//! `ComponentStatus` per dependency.
//!
//! Order: corpus, competency tables, language model, embedding model,
//! knowledge index. A failed step never skips a later one, so the readiness
//! report always lists all five.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::chat::embedding::{HttpEmbedder, EMBEDDING_MODEL};
use crate::chat::generator::AnswerGenerator;
use crate::chat::pgvector_index::PgVectorIndex;
use crate::chat::retriever::{Embedder, KnowledgeRetriever, VectorIndex};
use crate::chat::ChatService;
use crate::config::Config;
use crate::corpus::competency::{CompetencyCategory, CompetencyIndex};
use crate::corpus::Corpus;
use crate::db::create_pool;
use crate::llm_client::{self, LlmClient};
use crate::state::{
    AppState, Capability, ComponentStatus, Readiness, COMPETENCIES, CORPUS,
    EMBEDDING_MODEL as EMBEDDING_COMPONENT, KNOWLEDGE_INDEX, LANGUAGE_MODEL,
};

pub async fn build_state(config: &Config) -> AppState {
    let mut statuses = Vec::with_capacity(5);

    let corpus = load_corpus(config, &mut statuses).await;
    let competencies = load_competencies(config, &mut statuses).await;
    let generator = init_generator(config, &mut statuses);
    let embedder = init_embedder(config, &mut statuses);
    let index = init_index(config, &mut statuses).await;

    let retriever = match (embedder, index) {
        (Capability::Ready(embedder), Capability::Ready(index)) => Capability::Ready(
            KnowledgeRetriever::new(embedder, index, config.knowledge_collection.clone()),
        ),
        (Capability::Missing(reason), _) | (_, Capability::Missing(reason)) => {
            Capability::Missing(reason)
        }
    };

    let readiness = Readiness::from_components(statuses);
    info!("Startup readiness: {:?}", readiness.status);

    AppState {
        corpus,
        competencies: Arc::new(competencies),
        chat: ChatService::new(retriever, generator),
        readiness: Arc::new(readiness),
    }
}

async fn load_corpus(config: &Config, statuses: &mut Vec<ComponentStatus>) -> Capability<Arc<Corpus>> {
    let data_dir = config.data_dir.clone();
    // Parsing and k-means are CPU-bound; keep them off the async executor.
    let result = tokio::task::spawn_blocking(move || Corpus::load(&data_dir)).await;

    match result {
        Ok(Ok(corpus)) => {
            let detail = format!(
                "{} occupations in {} clusters",
                corpus.occupations().len(),
                corpus.centroids().len()
            );
            info!("Occupation corpus ready: {detail}");
            statuses.push(ComponentStatus::ready(CORPUS, detail));
            Capability::Ready(Arc::new(corpus))
        }
        Ok(Err(e)) => {
            error!("Occupation corpus could not be built: {e}");
            statuses.push(ComponentStatus::missing(CORPUS, e.to_string()));
            Capability::Missing(e.to_string())
        }
        Err(join_error) => {
            error!("Occupation corpus loader panicked: {join_error}");
            let reason = "corpus loader panicked".to_string();
            statuses.push(ComponentStatus::missing(CORPUS, reason.clone()));
            Capability::Missing(reason)
        }
    }
}

async fn load_competencies(config: &Config, statuses: &mut Vec<ComponentStatus>) -> CompetencyIndex {
    let data_dir = config.data_dir.clone();
    match tokio::task::spawn_blocking(move || CompetencyIndex::load(&data_dir)).await {
        Ok((index, warnings)) => {
            let mut detail = CompetencyCategory::ALL
                .iter()
                .map(|c| format!("{:?}: {} occupations", c, index.occupation_count(*c)))
                .collect::<Vec<_>>()
                .join(", ");
            // Missing tables only empty their category; recommendations still work.
            if !warnings.is_empty() {
                detail = format!("{detail} ({})", warnings.join("; "));
            }
            statuses.push(ComponentStatus::ready(COMPETENCIES, detail));
            index
        }
        Err(join_error) => {
            warn!("Competency loader panicked: {join_error}");
            statuses.push(ComponentStatus::missing(COMPETENCIES, "competency loader panicked"));
            CompetencyIndex::default()
        }
    }
}

fn init_generator(config: &Config, statuses: &mut Vec<ComponentStatus>) -> Capability<AnswerGenerator> {
    let Some(api_key) = &config.open_router_api_key else {
        warn!("OPEN_ROUTER_API_KEY is not set; chat is disabled");
        let reason = "OPEN_ROUTER_API_KEY is not set".to_string();
        statuses.push(ComponentStatus::missing(LANGUAGE_MODEL, reason.clone()));
        return Capability::Missing(reason);
    };

    match LlmClient::new(api_key.expose().to_string(), config.llm.clone()) {
        Ok(client) => {
            info!(
                "LLM client initialized (model: {}, temperature: {}, max_tokens: {})",
                llm_client::MODEL,
                client.settings().temperature,
                client.settings().max_tokens
            );
            statuses.push(ComponentStatus::ready(LANGUAGE_MODEL, llm_client::MODEL));
            Capability::Ready(AnswerGenerator::new(
                Arc::new(client),
                Duration::from_secs(config.llm.timeout_secs),
            ))
        }
        Err(e) => {
            error!("Failed to initialize LLM client: {e}");
            statuses.push(ComponentStatus::missing(LANGUAGE_MODEL, e.to_string()));
            Capability::Missing(e.to_string())
        }
    }
}

fn init_embedder(config: &Config, statuses: &mut Vec<ComponentStatus>) -> Capability<Arc<dyn Embedder>> {
    let Some(url) = &config.embedding_url else {
        warn!("EMBEDDING_URL is not set; chat is disabled");
        let reason = "EMBEDDING_URL is not set".to_string();
        statuses.push(ComponentStatus::missing(EMBEDDING_COMPONENT, reason.clone()));
        return Capability::Missing(reason);
    };

    let api_key = config.embedding_api_key.as_ref().map(|k| k.expose().to_string());
    match HttpEmbedder::new(url, api_key) {
        Ok(embedder) => {
            info!("Embedding client initialized (model: {EMBEDDING_MODEL})");
            statuses.push(ComponentStatus::ready(EMBEDDING_COMPONENT, EMBEDDING_MODEL));
            Capability::Ready(Arc::new(embedder))
        }
        Err(e) => {
            error!("Failed to initialize embedding client: {e}");
            statuses.push(ComponentStatus::missing(EMBEDDING_COMPONENT, e.to_string()));
            Capability::Missing(e.to_string())
        }
    }
}

async fn init_index(config: &Config, statuses: &mut Vec<ComponentStatus>) -> Capability<Arc<dyn VectorIndex>> {
    let Some(database_url) = &config.database_url else {
        warn!("DATABASE_URL is not set; chat is disabled");
        let reason = "DATABASE_URL is not set".to_string();
        statuses.push(ComponentStatus::missing(KNOWLEDGE_INDEX, reason.clone()));
        return Capability::Missing(reason);
    };

    let pool = match create_pool(database_url.expose()).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Knowledge index connection failed: {e}");
            let reason = "could not connect to the knowledge database".to_string();
            statuses.push(ComponentStatus::missing(KNOWLEDGE_INDEX, reason.clone()));
            return Capability::Missing(reason);
        }
    };

    let index = PgVectorIndex::new(pool);
    let collection = &config.knowledge_collection;
    match index.collection_exists(collection).await {
        Ok(true) => {
            info!("Knowledge collection '{collection}' found");
            statuses.push(ComponentStatus::ready(KNOWLEDGE_INDEX, collection.clone()));
            Capability::Ready(Arc::new(index))
        }
        Ok(false) => {
            error!("Knowledge collection '{collection}' does not exist; run the ingestion job");
            let reason = format!("collection '{collection}' does not exist");
            statuses.push(ComponentStatus::missing(KNOWLEDGE_INDEX, reason.clone()));
            Capability::Missing(reason)
        }
        Err(e) => {
            error!("Knowledge collection check failed: {e}");
            statuses.push(ComponentStatus::missing(KNOWLEDGE_INDEX, e.to_string()));
            Capability::Missing(e.to_string())
        }
    }
}
