pub mod artifacts;
pub mod config;
pub mod domain;
pub mod errors;
pub mod recommend;
pub mod rules;
pub mod segmentation;

pub use artifacts::{ArtifactBundle, ArtifactSummary};
pub use domain::aisle::{AisleCatalog, FrequentAisles};
pub use domain::product::{ProductAisleMap, ProductId};
pub use errors::{ApplicationError, ArtifactError};
pub use recommend::{
    AisleRecommender, EmptyReason, Recommendation, RecommendationRequest, RecommendationTrace,
    RecommendedAisle, RuleSource, DEFAULT_TOP_K, DEMO_CART,
};
pub use rules::{AssociationRule, RuleTable, SegmentRules};
pub use segmentation::{KMeans, SegmentClassifier, SegmentId, Segmenter, StandardScaler};
