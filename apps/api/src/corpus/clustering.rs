//! Seeded k-means over six-dimensional interest vectors, plus cluster labelling.
//!
//! Initialisation is k-means++ driven by a `StdRng` seeded with `CLUSTER_SEED`,
//! so a given dataset always produces the same partition.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::interest::{Dimension, InterestVector, DIMENSION_COUNT};

/// Number of occupation archetype groups.
pub const CLUSTER_COUNT: usize = 8;
pub const CLUSTER_SEED: u64 = 42;

const MAX_ITERATIONS: usize = 300;
/// Convergence threshold on the summed squared centroid shift.
const TOLERANCE: f64 = 1e-4;
const LABEL_DIMENSIONS: usize = 3;

type Point = [f64; DIMENSION_COUNT];

#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub centers: Vec<Point>,
    /// Cluster index (0-based) for each input point, in input order.
    pub assignments: Vec<usize>,
    pub iterations: usize,
}

/// Partitions `points` into `k` clusters.
///
/// Callers must guarantee at least `k` distinct points; with fewer, some
/// clusters would duplicate a center and end up empty.
pub fn fit_kmeans(points: &[Point], k: usize, seed: u64) -> KMeansFit {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centers = seed_centers(points, k, &mut rng);
    let mut assignments = assign(points, &centers);
    let mut iterations = 0;

    while iterations < MAX_ITERATIONS {
        iterations += 1;

        let updated = update_centers(points, &mut assignments, &centers);
        let shift: f64 = centers
            .iter()
            .zip(&updated)
            .map(|(old, new)| squared_distance(old, new))
            .sum();
        centers = updated;
        assignments = assign(points, &centers);

        if shift <= TOLERANCE {
            break;
        }
    }

    KMeansFit {
        centers,
        assignments,
        iterations,
    }
}

/// k-means++ seeding: first center uniform, then each next center drawn with
/// probability proportional to its squared distance from the nearest chosen one.
fn seed_centers(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let mut centers = Vec::with_capacity(k);
    if points.is_empty() || k == 0 {
        return centers;
    }

    centers.push(points[rng.gen_range(0..points.len())]);

    while centers.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .map(|p| nearest(p, &centers).1)
            .collect();
        let total: f64 = weights.iter().sum();

        let chosen = if total > 0.0 {
            let target = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            weights
                .iter()
                .position(|w| {
                    cumulative += w;
                    cumulative > target
                })
                .unwrap_or(points.len() - 1)
        } else {
            0
        };
        centers.push(points[chosen]);
    }

    centers
}

fn assign(points: &[Point], centers: &[Point]) -> Vec<usize> {
    points.iter().map(|p| nearest(p, centers).0).collect()
}

/// Recomputes every center as its members' mean. An empty cluster is re-seeded
/// with the point farthest from its current center, which is moved into it.
fn update_centers(points: &[Point], assignments: &mut [usize], centers: &[Point]) -> Vec<Point> {
    let k = centers.len();
    let mut sums = vec![[0.0; DIMENSION_COUNT]; k];
    let mut counts = vec![0usize; k];

    for (point, &cluster) in points.iter().zip(assignments.iter()) {
        counts[cluster] += 1;
        for (acc, value) in sums[cluster].iter_mut().zip(point) {
            *acc += value;
        }
    }

    let mut updated = centers.to_vec();
    for cluster in 0..k {
        if counts[cluster] > 0 {
            updated[cluster] = sums[cluster].map(|s| s / counts[cluster] as f64);
            continue;
        }

        let farthest = points
            .iter()
            .enumerate()
            .filter(|(i, _)| counts[assignments[*i]] > 1)
            .max_by(|(i, a), (j, b)| {
                squared_distance(a, &centers[assignments[*i]])
                    .total_cmp(&squared_distance(b, &centers[assignments[*j]]))
            })
            .map(|(i, _)| i);

        if let Some(index) = farthest {
            counts[assignments[index]] -= 1;
            counts[cluster] = 1;
            assignments[index] = cluster;
            updated[cluster] = points[index];
        }
    }

    updated
}

/// Index of the nearest center and the squared distance to it. Ties go to the lower index.
fn nearest(point: &Point, centers: &[Point]) -> (usize, f64) {
    centers
        .iter()
        .enumerate()
        .map(|(i, c)| (i, squared_distance(point, c)))
        .fold((0, f64::INFINITY), |best, candidate| {
            if candidate.1 < best.1 {
                candidate
            } else {
                best
            }
        })
}

fn squared_distance(a: &Point, b: &Point) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Label of a centroid: codes of its three highest dimensions, highest first,
/// hyphen-joined (e.g. `S-E-C`). Equal values keep canonical R, I, A, S, E, C order.
pub fn derive_label(center: &InterestVector) -> String {
    let mut ranked = Dimension::ALL;
    // `sort_by` is stable, so equal scores stay in canonical order.
    ranked.sort_by(|a, b| center.get(*b).total_cmp(&center.get(*a)));

    ranked
        .iter()
        .take(LABEL_DIMENSIONS)
        .map(|d| d.code().to_string())
        .collect::<Vec<_>>()
        .join("-")
}
