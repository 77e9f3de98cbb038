use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::chat::ChatService;
use crate::corpus::competency::CompetencyIndex;
use crate::corpus::Corpus;

/// A dependency that was either initialised at startup or recorded as absent.
/// Checked at the start of each operation instead of null-checking clients.
#[derive(Debug, Clone)]
pub enum Capability<T> {
    Ready(T),
    /// Why the dependency is unavailable (never contains credentials).
    Missing(String),
}

impl<T> Capability<T> {
    pub fn get(&self) -> Result<&T, &str> {
        match self {
            Capability::Ready(value) => Ok(value),
            Capability::Missing(reason) => Err(reason),
        }
    }
}

/// Startup outcome of one dependency.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentStatus {
    pub component: &'static str,
    pub ready: bool,
    pub detail: String,
}

impl ComponentStatus {
    pub fn ready(component: &'static str, detail: impl Into<String>) -> Self {
        Self {
            component,
            ready: true,
            detail: detail.into(),
        }
    }

    pub fn missing(component: &'static str, detail: impl Into<String>) -> Self {
        Self {
            component,
            ready: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Recommendations and chat both available.
    Ok,
    /// Recommendations available, chat is not.
    Degraded,
    /// Recommendations unavailable.
    Unavailable,
}

/// Aggregate readiness recorded once by the startup sequence.
#[derive(Debug, Clone, Serialize)]
pub struct Readiness {
    pub status: ServiceStatus,
    pub components: Vec<ComponentStatus>,
    pub checked_at: DateTime<Utc>,
}

pub const CORPUS: &str = "occupation_corpus";
pub const COMPETENCIES: &str = "competency_index";
pub const LANGUAGE_MODEL: &str = "language_model";
pub const EMBEDDING_MODEL: &str = "embedding_model";
pub const KNOWLEDGE_INDEX: &str = "knowledge_index";

impl Readiness {
    pub fn from_components(components: Vec<ComponentStatus>) -> Self {
        let ready = |name: &str| components.iter().any(|c| c.component == name && c.ready);

        let status = if !ready(CORPUS) {
            ServiceStatus::Unavailable
        } else if ready(LANGUAGE_MODEL) && ready(EMBEDDING_MODEL) && ready(KNOWLEDGE_INDEX) {
            ServiceStatus::Ok
        } else {
            ServiceStatus::Degraded
        };

        Self {
            status,
            components,
            checked_at: Utc::now(),
        }
    }
}

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Everything here is immutable after startup; handlers share it without locks.
#[derive(Clone)]
pub struct AppState {
    /// `Missing` when the reference dataset could not be loaded.
    pub corpus: Capability<Arc<Corpus>>,
    pub competencies: Arc<CompetencyIndex>,
    pub chat: ChatService,
    pub readiness: Arc<Readiness>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_get() {
        let ready: Capability<u8> = Capability::Ready(7);
        let missing: Capability<u8> = Capability::Missing("no key".to_string());
        assert_eq!(ready.get(), Ok(&7));
        assert_eq!(missing.get(), Err("no key"));
    }

    #[test]
    fn test_readiness_aggregates_components() {
        let all_ready = [CORPUS, COMPETENCIES, LANGUAGE_MODEL, EMBEDDING_MODEL, KNOWLEDGE_INDEX]
            .map(|c| ComponentStatus::ready(c, "ok"))
            .to_vec();
        assert_eq!(
            Readiness::from_components(all_ready.clone()).status,
            ServiceStatus::Ok
        );

        let mut no_llm = all_ready.clone();
        no_llm[2] = ComponentStatus::missing(LANGUAGE_MODEL, "OPEN_ROUTER_API_KEY is not set");
        assert_eq!(
            Readiness::from_components(no_llm).status,
            ServiceStatus::Degraded
        );

        let mut no_corpus = all_ready;
        no_corpus[0] = ComponentStatus::missing(CORPUS, "occupations.json not found");
        assert_eq!(
            Readiness::from_components(no_corpus).status,
            ServiceStatus::Unavailable
        );
    }
}
