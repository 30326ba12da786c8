//! Pretrained model artifacts.
//!
//! The artifact directory holds one JSON document per artifact. Everything is
//! read and validated once at startup; a bundle is immutable afterwards.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::domain::aisle::{AisleCatalog, FrequentAisles};
use crate::domain::product::{ProductAisleMap, ProductId};
use crate::errors::ArtifactError;
use crate::rules::{RuleTable, SegmentRules};
use crate::segmentation::{KMeans, SegmentId, Segmenter, StandardScaler};

pub const DEFAULT_ARTIFACT_DIR: &str = "model_artifacts";

pub const AISLE_COLUMNS_FILE: &str = "aisle_columns.json";
pub const FREQUENT_AISLES_FILE: &str = "frequent_aisles.json";
pub const PRODUCT_AISLES_FILE: &str = "product2aisle.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const KMEANS_FILE: &str = "kmeans.json";
pub const SEGMENT_RULES_FILE: &str = "seg_rule_lists.json";

/// Every artifact file, in the order they are read and fingerprinted.
pub const ARTIFACT_FILES: [&str; 6] = [
    AISLE_COLUMNS_FILE,
    FREQUENT_AISLES_FILE,
    PRODUCT_AISLES_FILE,
    SCALER_FILE,
    KMEANS_FILE,
    SEGMENT_RULES_FILE,
];

#[derive(Clone, Debug, PartialEq)]
pub struct ArtifactBundle {
    catalog: AisleCatalog,
    frequent: FrequentAisles,
    products: ProductAisleMap,
    segmenter: Segmenter,
    rules: SegmentRules,
    fingerprint: Option<String>,
}

/// Counts and fingerprint reported by operator tooling.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArtifactSummary {
    pub aisles: usize,
    pub frequent_aisles: usize,
    pub products: usize,
    pub clusters: usize,
    pub rule_segments: usize,
    pub aggregate_rules: usize,
    pub fingerprint: Option<String>,
}

impl ArtifactBundle {
    /// Assembles a bundle from in-memory artifacts, applying the same checks
    /// as [`ArtifactBundle::load`].
    pub fn new(
        catalog: AisleCatalog,
        frequent: FrequentAisles,
        products: ProductAisleMap,
        segmenter: Segmenter,
        rules: SegmentRules,
    ) -> Result<Self, ArtifactError> {
        let bundle = Self { catalog, frequent, products, segmenter, rules, fingerprint: None };
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();
        let mut hasher = Sha256::new();

        let columns: Vec<String> = read_document(dir, AISLE_COLUMNS_FILE, &mut hasher)?;
        let frequent: Vec<String> = read_document(dir, FREQUENT_AISLES_FILE, &mut hasher)?;
        let products: HashMap<u64, String> =
            read_document(dir, PRODUCT_AISLES_FILE, &mut hasher)?;
        let scaler: StandardScaler = read_document(dir, SCALER_FILE, &mut hasher)?;
        let clusterer: KMeans = read_document(dir, KMEANS_FILE, &mut hasher)?;
        let tables: BTreeMap<u32, RuleTable> =
            read_document(dir, SEGMENT_RULES_FILE, &mut hasher)?;

        let catalog = AisleCatalog::new(columns).map_err(|duplicate| {
            ArtifactError::invalid("aisle_columns", format!("duplicate aisle `{duplicate}`"))
        })?;
        let products =
            products.into_iter().map(|(id, aisle)| (ProductId(id), aisle)).collect();
        let rules = SegmentRules::new(
            tables.into_iter().map(|(segment, table)| (SegmentId(segment), table)).collect(),
        );

        let mut bundle = Self::new(
            catalog,
            FrequentAisles::new(frequent),
            products,
            Segmenter::new(scaler, clusterer),
            rules,
        )?;
        bundle.fingerprint = Some(format!("sha256:{:x}", hasher.finalize()));

        let summary = bundle.summary();
        info!(
            event_name = "artifacts.loaded",
            dir = %dir.display(),
            aisles = summary.aisles,
            frequent_aisles = summary.frequent_aisles,
            products = summary.products,
            clusters = summary.clusters,
            aggregate_rules = summary.aggregate_rules,
            fingerprint = summary.fingerprint.as_deref().unwrap_or("none"),
            "model artifacts loaded"
        );

        Ok(bundle)
    }

    pub fn catalog(&self) -> &AisleCatalog {
        &self.catalog
    }

    pub fn frequent(&self) -> &FrequentAisles {
        &self.frequent
    }

    pub fn products(&self) -> &ProductAisleMap {
        &self.products
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn rules(&self) -> &SegmentRules {
        &self.rules
    }

    /// SHA-256 over the raw artifact files; `None` for in-memory bundles.
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            aisles: self.catalog.len(),
            frequent_aisles: self.frequent.len(),
            products: self.products.len(),
            clusters: self.segmenter.clusterer().n_clusters(),
            rule_segments: self.rules.segment_count(),
            aggregate_rules: self.rules.aggregate().len(),
            fingerprint: self.fingerprint.clone(),
        }
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.catalog.is_empty() {
            return Err(ArtifactError::invalid("aisle_columns", "aisle list is empty"));
        }

        if let Some(unknown) = self.frequent.iter().find(|aisle| !self.catalog.contains(aisle)) {
            return Err(ArtifactError::invalid(
                "frequent_aisles",
                format!("`{unknown}` is not an aisle column"),
            ));
        }

        let width = self.catalog.len();
        self.segmenter
            .scaler()
            .validate(width)
            .map_err(|message| ArtifactError::invalid("scaler", message))?;
        self.segmenter
            .clusterer()
            .validate(width)
            .map_err(|message| ArtifactError::invalid("kmeans", message))?;
        self.rules.validate().map_err(|message| ArtifactError::invalid("seg_rule_lists", message))?;

        let clusters = self.segmenter.clusterer().n_clusters();
        for (segment, _) in self.rules.segments() {
            if segment.0 as usize >= clusters {
                warn!(
                    event_name = "artifacts.rules.unreachable_segment",
                    segment = segment.0,
                    clusters,
                    "rule table is keyed by a segment the clusterer never predicts"
                );
            }
        }

        Ok(())
    }
}

fn read_document<T: DeserializeOwned>(
    dir: &Path,
    file_name: &str,
    hasher: &mut Sha256,
) -> Result<T, ArtifactError> {
    let path: PathBuf = dir.join(file_name);
    let raw =
        fs::read(&path).map_err(|source| ArtifactError::ReadFile { path: path.clone(), source })?;
    hasher.update(file_name.as_bytes());
    hasher.update(&raw);
    serde_json::from_slice(&raw).map_err(|source| ArtifactError::ParseFile { path, source })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::{ArtifactBundle, ARTIFACT_FILES, FREQUENT_AISLES_FILE, KMEANS_FILE, SCALER_FILE};
    use crate::domain::product::ProductId;
    use crate::errors::ArtifactError;
    use crate::segmentation::SegmentId;

    fn write_artifacts(dir: &Path) {
        let documents = [
            r#"["bread", "fresh fruits", "milk"]"#,
            r#"["fresh fruits", "milk"]"#,
            r#"{"24852": "fresh fruits", "27845": "milk", "3": "bread"}"#,
            r#"{"mean": [0.2, 0.5, 0.4], "scale": [0.4, 0.5, 0.5]}"#,
            r#"{"centroids": [[-0.5, 1.0, -0.8], [-0.5, -1.0, 1.2]]}"#,
            r#"{"0": [{"antecedents": ["fresh fruits"], "consequents": ["bread"], "lift": 1.3}],
                "1": []}"#,
        ];
        for (file_name, body) in ARTIFACT_FILES.iter().zip(documents) {
            fs::write(dir.join(file_name), body).expect("write artifact");
        }
    }

    #[test]
    fn load_reads_every_artifact_and_fingerprints_them() {
        let dir = TempDir::new().expect("tempdir");
        write_artifacts(dir.path());

        let bundle = ArtifactBundle::load(dir.path()).expect("artifacts load");

        assert_eq!(bundle.catalog().len(), 3);
        assert_eq!(bundle.products().aisle_of(ProductId(27845)), Some("milk"));
        assert!(bundle.rules().for_segment(SegmentId(0)).is_some());
        assert!(bundle.rules().for_segment(SegmentId(1)).is_none());
        assert_eq!(bundle.rules().aggregate().len(), 1);

        let fingerprint = bundle.fingerprint().unwrap_or_default();
        assert!(fingerprint.starts_with("sha256:"));
        assert_eq!(bundle.summary().clusters, 2);
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let dir = TempDir::new().expect("tempdir");
        write_artifacts(dir.path());
        let before = ArtifactBundle::load(dir.path()).expect("artifacts load");

        fs::write(dir.path().join(FREQUENT_AISLES_FILE), r#"["milk"]"#).expect("rewrite");
        let after = ArtifactBundle::load(dir.path()).expect("artifacts load");

        assert_ne!(before.fingerprint(), after.fingerprint());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = TempDir::new().expect("tempdir");
        write_artifacts(dir.path());
        fs::remove_file(dir.path().join(KMEANS_FILE)).expect("remove");

        let error = ArtifactBundle::load(dir.path()).err();
        assert!(matches!(error, Some(ArtifactError::ReadFile { .. })));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = TempDir::new().expect("tempdir");
        write_artifacts(dir.path());
        fs::write(dir.path().join(SCALER_FILE), "{\"mean\": [0.1,").expect("rewrite");

        let error = ArtifactBundle::load(dir.path()).err();
        assert!(matches!(error, Some(ArtifactError::ParseFile { .. })));
    }

    #[test]
    fn scaler_width_must_match_catalog() {
        let dir = TempDir::new().expect("tempdir");
        write_artifacts(dir.path());
        fs::write(dir.path().join(SCALER_FILE), r#"{"mean": [0.2], "scale": [0.4]}"#)
            .expect("rewrite");

        let error = ArtifactBundle::load(dir.path()).err();
        assert!(matches!(error, Some(ArtifactError::Invalid { artifact: "scaler", .. })));
    }

    #[test]
    fn frequent_aisles_must_be_columns() {
        let dir = TempDir::new().expect("tempdir");
        write_artifacts(dir.path());
        fs::write(dir.path().join(FREQUENT_AISLES_FILE), r#"["frozen pizza"]"#).expect("rewrite");

        let error = ArtifactBundle::load(dir.path()).err();
        assert!(matches!(error, Some(ArtifactError::Invalid { artifact: "frequent_aisles", .. })));
    }
}
