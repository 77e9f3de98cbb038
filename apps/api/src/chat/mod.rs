// Career chat: retrieval over the occupational knowledge base, then a single
// grounded completion. All LLM calls go through llm_client.

pub mod embedding;
pub mod generator;
pub mod handlers;
pub mod pgvector_index;
pub mod prompts;
pub mod retriever;

use thiserror::Error;
use tracing::info;

use crate::chat::generator::AnswerGenerator;
use crate::chat::retriever::{KnowledgeRetriever, RETRIEVAL_LIMIT};
use crate::state::Capability;

/// Typed outcome of a failed chat request. Dependency faults never escape as anything else.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Caller-fixable: a required field is missing or blank.
    #[error("{0}")]
    Validation(String),

    /// A dependency was never initialised (missing credential, absent index).
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// A configured dependency failed at request time.
    #[error("Degraded service: {0}")]
    Degraded(String),
}

/// Retrieval + generation, each of which may be absent.
#[derive(Clone)]
pub struct ChatService {
    retriever: Capability<KnowledgeRetriever>,
    generator: Capability<AnswerGenerator>,
}

impl ChatService {
    pub fn new(
        retriever: Capability<KnowledgeRetriever>,
        generator: Capability<AnswerGenerator>,
    ) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Validates input, retrieves `RETRIEVAL_LIMIT` passages for the question,
    /// and returns the grounded answer.
    pub async fn answer(&self, question: &str, profile_summary: &str) -> Result<String, ChatError> {
        if question.trim().is_empty() || profile_summary.trim().is_empty() {
            return Err(ChatError::Validation(
                "Question and profile summary are required.".to_string(),
            ));
        }

        let generator = self
            .generator
            .get()
            .map_err(|reason| ChatError::NotConfigured(format!("language model: {reason}")))?;
        let retriever = self
            .retriever
            .get()
            .map_err(|reason| ChatError::NotConfigured(format!("knowledge index: {reason}")))?;

        let passages = retriever.retrieve(question, RETRIEVAL_LIMIT).await?;
        info!(passages = passages.len(), "Generating grounded answer");

        generator.generate(question, profile_summary, &passages).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::chat::generator::tests::{Behaviour, FakeModel};
    use crate::chat::retriever::tests::{FakeEmbedder, FakeIndex};
    use crate::llm_client::Role;

    struct Harness {
        service: ChatService,
        embedder: Arc<FakeEmbedder>,
        index: Arc<FakeIndex>,
        model: Arc<FakeModel>,
    }

    fn harness(behaviour: Behaviour) -> Harness {
        let embedder = Arc::new(FakeEmbedder::new(8));
        let index = Arc::new(FakeIndex::with_documents(&[
            "Doc 1: Info about marketing.",
            "Doc 2: Info about sales.",
        ]));
        let model = Arc::new(FakeModel::new(behaviour));

        let service = ChatService::new(
            Capability::Ready(KnowledgeRetriever::new(
                embedder.clone(),
                index.clone(),
                "onet_data",
            )),
            Capability::Ready(AnswerGenerator::new(model.clone(), Duration::from_secs(5))),
        );

        Harness {
            service,
            embedder,
            index,
            model,
        }
    }

    #[tokio::test]
    async fn test_end_to_end_answer_with_mocked_dependencies() {
        let h = harness(Behaviour::Answer("This is the final AI answer.".to_string()));

        let answer = h
            .service
            .answer(
                "Tell me about marketing jobs.",
                "R:4.5, I:3.2, A:2.1, S:4.8, E:3.9, C:4.1",
            )
            .await
            .unwrap();

        assert_eq!(answer, "This is the final AI answer.");
        assert_eq!(
            *h.embedder.calls.lock().unwrap(),
            vec!["Tell me about marketing jobs.".to_string()]
        );
        assert_eq!(*h.index.limits.lock().unwrap(), vec![RETRIEVAL_LIMIT]);
        assert_eq!(RETRIEVAL_LIMIT, 5);

        let calls = h.model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let user = calls[0].iter().find(|m| m.role == Role::User).unwrap();
        assert!(user.content.contains("Doc 1: Info about marketing."));
        assert!(user.content.contains("Doc 2: Info about sales."));
    }

    #[tokio::test]
    async fn test_missing_llm_is_not_configured() {
        let h = harness(Behaviour::Answer("unused".to_string()));
        let service = ChatService::new(
            h.service.retriever.clone(),
            Capability::Missing("OPEN_ROUTER_API_KEY is not set".to_string()),
        );

        let result = service.answer("q", "p").await;

        assert!(matches!(result, Err(ChatError::NotConfigured(msg)) if msg.contains("language model")));
        assert!(h.embedder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_index_is_not_configured() {
        let h = harness(Behaviour::Answer("unused".to_string()));
        let service = ChatService::new(
            Capability::Missing("DATABASE_URL is not set".to_string()),
            h.service.generator.clone(),
        );

        let result = service.answer("q", "p").await;

        assert!(matches!(result, Err(ChatError::NotConfigured(msg)) if msg.contains("knowledge index")));
        assert!(h.model.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_llm_failure_is_degraded() {
        let h = harness(Behaviour::Fail);
        let result = h.service.answer("q", "p").await;
        assert!(matches!(result, Err(ChatError::Degraded(_))));
    }

    #[tokio::test]
    async fn test_blank_fields_rejected_before_any_call() {
        let h = harness(Behaviour::Answer("unused".to_string()));

        for (question, profile) in [("", "p"), ("q", "  "), ("", "")] {
            let result = h.service.answer(question, profile).await;
            assert!(matches!(result, Err(ChatError::Validation(_))));
        }
        assert!(h.embedder.calls.lock().unwrap().is_empty());
        assert!(h.model.calls.lock().unwrap().is_empty());
    }
}
