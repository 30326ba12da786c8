//! Nearest-centroid assignment for a k-means model fitted offline.

use serde::{Deserialize, Serialize};

use super::SegmentId;

/// Fitted k-means centroids, one row per segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KMeans {
    pub centroids: Vec<Vec<f64>>,
}

impl KMeans {
    pub fn new(centroids: Vec<Vec<f64>>) -> Self {
        Self { centroids }
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    /// Index of the closest centroid by squared Euclidean distance. Ties go
    /// to the lowest index.
    pub fn predict(&self, sample: &[f64]) -> SegmentId {
        let mut best = 0usize;
        let mut best_distance = f64::INFINITY;

        for (index, centroid) in self.centroids.iter().enumerate() {
            let distance = squared_distance(sample, centroid);
            if distance < best_distance {
                best_distance = distance;
                best = index;
            }
        }

        SegmentId(best as u32)
    }

    pub(crate) fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.centroids.is_empty() {
            return Err("kmeans model has no centroids".to_string());
        }
        for (index, centroid) in self.centroids.iter().enumerate() {
            if centroid.len() != n_features {
                return Err(format!(
                    "centroid {index} has {} entries, expected {n_features}",
                    centroid.len()
                ));
            }
            if centroid.iter().any(|value| !value.is_finite()) {
                return Err(format!("centroid {index} has non-finite coordinates"));
            }
        }
        Ok(())
    }
}

fn squared_distance(left: &[f64], right: &[f64]) -> f64 {
    left.iter().zip(right.iter()).map(|(a, b)| (a - b) * (a - b)).sum()
}
