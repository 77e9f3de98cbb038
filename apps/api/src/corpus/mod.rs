//! Occupation Corpus: reference occupations joined with their RIASEC profiles
//! and grouped into archetype clusters.
//!
//! Built once at startup (see `startup.rs`) and shared read-only afterwards.

pub mod clustering;
pub mod competency;
pub mod dataset;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::corpus::clustering::{derive_label, fit_kmeans, CLUSTER_COUNT, CLUSTER_SEED};
use crate::corpus::dataset::{
    join_profiles, pivot_interests, read_records, InterestRecord, OccupationRecord, RawOccupation,
    INTERESTS_FILE, OCCUPATIONS_FILE,
};
use crate::models::interest::InterestVector;
use crate::models::occupation::{ClusterCentroid, OccupationProfile};

/// Startup failures. Any of these means recommendations cannot be served.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Required data file not found: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "No occupation code is shared between {occupations} occupations and {profiles} interest profiles"
    )]
    JoinFailed { occupations: usize, profiles: usize },

    #[error("Only {distinct} distinct interest profiles; need at least {clusters} to cluster")]
    InsufficientRecords { distinct: usize, clusters: usize },
}

#[derive(Debug, Clone)]
pub struct Corpus {
    occupations: Vec<OccupationProfile>,
    centroids: Vec<ClusterCentroid>,
}

impl Corpus {
    /// Reads `occupations.json` and `interests.json` from `data_dir`, joins and clusters them.
    pub fn load(data_dir: &Path) -> Result<Self, CorpusError> {
        let occupations: Vec<OccupationRecord> = read_records(&data_dir.join(OCCUPATIONS_FILE))?;
        let interests: Vec<InterestRecord> = read_records(&data_dir.join(INTERESTS_FILE))?;

        let profiles = pivot_interests(&interests);
        let joined = join_profiles(&occupations, &profiles);

        // Only an empty occupation file is "loaded but empty"; occupations with
        // no usable interest profile mean the join itself failed.
        if joined.is_empty() && !occupations.is_empty() {
            return Err(CorpusError::JoinFailed {
                occupations: occupations.len(),
                profiles: profiles.len(),
            });
        }

        Self::build(joined, CLUSTER_COUNT)
    }

    /// Clusters already-joined occupations into `cluster_count` groups.
    /// An empty input gives an empty (but valid) corpus.
    pub fn build(records: Vec<RawOccupation>, cluster_count: usize) -> Result<Self, CorpusError> {
        if records.is_empty() {
            info!("Occupation corpus is empty; recommendations will return no matches");
            return Ok(Self {
                occupations: Vec::new(),
                centroids: Vec::new(),
            });
        }

        let distinct = records
            .iter()
            .map(|r| r.scores.map(f64::to_bits))
            .collect::<HashSet<_>>()
            .len();
        if distinct < cluster_count {
            return Err(CorpusError::InsufficientRecords {
                distinct,
                clusters: cluster_count,
            });
        }

        let points: Vec<_> = records.iter().map(|r| r.scores).collect();
        let fit = fit_kmeans(&points, cluster_count, CLUSTER_SEED);

        let mut centroids: Vec<ClusterCentroid> = fit
            .centers
            .iter()
            .enumerate()
            .map(|(i, center)| {
                let center = InterestVector::from_array(*center);
                ClusterCentroid {
                    cluster_id: cluster_id(i),
                    label: derive_label(&center),
                    center,
                    member_count: 0,
                }
            })
            .collect();

        let occupations = records
            .into_iter()
            .zip(&fit.assignments)
            .map(|(record, &cluster)| {
                centroids[cluster].member_count += 1;
                OccupationProfile {
                    code: record.code,
                    title: record.title,
                    scores: InterestVector::from_array(record.scores),
                    cluster_id: centroids[cluster].cluster_id,
                    cluster_label: centroids[cluster].label.clone(),
                }
            })
            .collect::<Vec<_>>();

        info!(
            "Clustered {} occupations into {} groups in {} iterations",
            occupations.len(),
            centroids.len(),
            fit.iterations
        );

        Ok(Self {
            occupations,
            centroids,
        })
    }

    pub fn occupations(&self) -> &[OccupationProfile] {
        &self.occupations
    }

    pub fn centroids(&self) -> &[ClusterCentroid] {
        &self.centroids
    }

    pub fn is_empty(&self) -> bool {
        self.occupations.is_empty()
    }
}

fn cluster_id(index: usize) -> u8 {
    u8::try_from(index + 1).unwrap_or(u8::MAX)
}
