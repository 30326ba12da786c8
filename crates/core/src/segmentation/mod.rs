//! Cart segmentation.
//!
//! A cart's frequent aisles are one-hot encoded over the aisle catalog,
//! standardized with the fitted scaler and assigned to the nearest k-means
//! centroid. The centroid index is the segment id used to pick a rule table.

mod kmeans;
mod scaler;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use kmeans::KMeans;
pub use scaler::StandardScaler;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(pub u32);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps a one-hot cart vector to a segment.
pub trait SegmentClassifier: Send + Sync + fmt::Debug {
    fn classify(&self, features: &[f64]) -> SegmentId;
}

/// Fitted scaler followed by the fitted clusterer.
#[derive(Clone, Debug, PartialEq)]
pub struct Segmenter {
    scaler: StandardScaler,
    clusterer: KMeans,
}

impl Segmenter {
    pub fn new(scaler: StandardScaler, clusterer: KMeans) -> Self {
        Self { scaler, clusterer }
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn clusterer(&self) -> &KMeans {
        &self.clusterer
    }
}

impl SegmentClassifier for Segmenter {
    fn classify(&self, features: &[f64]) -> SegmentId {
        self.clusterer.predict(&self.scaler.transform(features))
    }
}
