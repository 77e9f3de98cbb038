use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::corpus::competency::Competencies;
use crate::errors::AppError;
use crate::models::interest::InterestVector;
use crate::models::occupation::ClusterCentroid;
use crate::recommendation::profile::QuestionnaireAnswers;
use crate::recommendation::ranker::{rank_occupations, Recommendation, TOP_K};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub profile: InterestVector,
    /// Ready to pass as `profile_summary` to the chat endpoint.
    pub profile_summary: String,
    pub recommendations: Vec<Recommendation>,
    /// True when the dataset loaded but held no occupations.
    pub corpus_empty: bool,
}

#[derive(Debug, Serialize)]
pub struct ClustersResponse {
    pub clusters: Vec<ClusterCentroid>,
}

#[derive(Debug, Serialize)]
pub struct CompetenciesResponse {
    pub code: String,
    #[serde(flatten)]
    pub competencies: Competencies,
}

/// POST /api/v1/recommend
pub async fn handle_recommend(
    State(state): State<AppState>,
    payload: Result<Json<QuestionnaireAnswers>, JsonRejection>,
) -> Result<Json<RecommendResponse>, AppError> {
    let corpus = state
        .corpus
        .get()
        .map_err(|reason| AppError::DataUnavailable(reason.to_string()))?;

    let Json(answers) = payload?;
    let profile = answers.into_profile()?;
    if profile.is_zero() {
        warn!("Recommendation requested with no answers; every similarity will be 0");
    }

    let recommendations =
        rank_occupations(&profile, corpus.occupations(), &state.competencies, TOP_K);
    info!(
        profile = %profile.summary(),
        returned = recommendations.len(),
        "Recommendations ranked"
    );

    Ok(Json(RecommendResponse {
        profile_summary: profile.summary(),
        profile,
        recommendations,
        corpus_empty: corpus.is_empty(),
    }))
}

/// GET /api/v1/clusters
pub async fn handle_clusters(
    State(state): State<AppState>,
) -> Result<Json<ClustersResponse>, AppError> {
    let corpus = state
        .corpus
        .get()
        .map_err(|reason| AppError::DataUnavailable(reason.to_string()))?;

    Ok(Json(ClustersResponse {
        clusters: corpus.centroids().to_vec(),
    }))
}

/// GET /api/v1/occupations/:code/competencies
pub async fn handle_competencies(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Json<CompetenciesResponse> {
    let competencies = state.competencies.lookup(&code);
    Json(CompetenciesResponse { code, competencies })
}
