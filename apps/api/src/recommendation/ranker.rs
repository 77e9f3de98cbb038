//! Similarity Ranker: cosine similarity of a user profile against every occupation.

use serde::Serialize;
use tracing::warn;

use crate::corpus::competency::{Competencies, CompetencyIndex};
use crate::models::interest::InterestVector;
use crate::models::occupation::OccupationProfile;

/// Number of occupations returned per recommendation.
pub const TOP_K: usize = 20;

/// Slack allowed for floating-point overshoot before a score counts as out of range.
const SIMILARITY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub code: String,
    pub title: String,
    pub cluster_label: String,
    /// 0.0 – 1.0
    pub similarity: f64,
    #[serde(flatten)]
    pub competencies: Competencies,
}

/// Cosine similarity. Either vector being all-zero gives 0.0.
pub fn cosine_similarity(a: &InterestVector, b: &InterestVector) -> f64 {
    let (a, b) = (a.to_array(), b.to_array());
    let dot: f64 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Scores every occupation against `profile` and returns the best `limit`,
/// highest similarity first. Equal scores keep corpus order.
pub fn rank_occupations(
    profile: &InterestVector,
    occupations: &[OccupationProfile],
    competencies: &CompetencyIndex,
    limit: usize,
) -> Vec<Recommendation> {
    let mut scored: Vec<(&OccupationProfile, f64)> = occupations
        .iter()
        .map(|o| (o, checked_similarity(profile, o)))
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .take(limit)
        .map(|(occupation, similarity)| Recommendation {
            code: occupation.code.clone(),
            title: occupation.title.clone(),
            cluster_label: occupation.cluster_label.clone(),
            similarity,
            competencies: competencies.lookup(&occupation.code),
        })
        .collect()
}

/// Flags scores outside [0, 1] (only possible with negative inputs) and clamps them.
fn checked_similarity(profile: &InterestVector, occupation: &OccupationProfile) -> f64 {
    let similarity = cosine_similarity(profile, &occupation.scores);
    if !(-SIMILARITY_EPSILON..=1.0 + SIMILARITY_EPSILON).contains(&similarity) {
        warn!(
            code = %occupation.code,
            similarity,
            "Similarity outside [0, 1]; check for negative interest scores"
        );
    }
    similarity.clamp(0.0, 1.0)
}
