use serde::{Deserialize, Serialize};

use crate::models::interest::InterestVector;

/// One reference occupation after clustering. Immutable once the corpus is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupationProfile {
    /// O*NET-SOC code, e.g. `15-1252.00`.
    pub code: String,
    pub title: String,
    /// Interest scores with missing values already zero-filled.
    pub scores: InterestVector,
    /// 1-based cluster id.
    pub cluster_id: u8,
    pub cluster_label: String,
}

/// Mean vector of one cluster plus its derived label (e.g. `S-E-C`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterCentroid {
    pub cluster_id: u8,
    pub center: InterestVector,
    pub label: String,
    pub member_count: usize,
}
