//! Recommendation engine implementation

use std::collections::BTreeSet;

use super::types::*;
use crate::artifacts::ArtifactBundle;
use crate::domain::product::ProductId;
use crate::rules::AssociationRule;
use crate::segmentation::SegmentClassifier;

/// Verbose requests surface each pipeline step at INFO, others at DEBUG.
macro_rules! diagnostic {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// Immutable recommendation context built once from loaded artifacts.
#[derive(Debug)]
pub struct AisleRecommender {
    artifacts: ArtifactBundle,
    classifier: Box<dyn SegmentClassifier>,
}

impl AisleRecommender {
    /// Classify carts with the bundle's fitted scaler and clusterer
    pub fn new(artifacts: ArtifactBundle) -> Self {
        let classifier = Box::new(artifacts.segmenter().clone());
        Self { artifacts, classifier }
    }

    /// Classify carts with a caller-supplied classifier
    pub fn with_classifier(
        artifacts: ArtifactBundle,
        classifier: impl SegmentClassifier + 'static,
    ) -> Self {
        Self { artifacts, classifier: Box::new(classifier) }
    }

    pub fn artifacts(&self) -> &ArtifactBundle {
        &self.artifacts
    }

    /// Ranked aisle labels for a cart. Never fails; degenerate carts yield
    /// an empty list.
    pub fn recommend_aisles(
        &self,
        product_ids: &[ProductId],
        top_k: usize,
        verbose: bool,
    ) -> Vec<String> {
        let request = RecommendationRequest::new(product_ids.iter().copied())
            .with_top_k(top_k)
            .with_verbose(verbose);
        self.recommend(&request).labels()
    }

    /// Full recommendation with contributing lifts, sources and a trace
    pub fn recommend(&self, request: &RecommendationRequest) -> Recommendation {
        let verbose = request.verbose;
        let top_k = request.top_k;
        let mut trace = RecommendationTrace::default();

        if top_k == 0 {
            diagnostic!(verbose, event_name = "recommend.skipped", "top_k is zero");
            return Recommendation::empty(trace, EmptyReason::ZeroTopK);
        }

        // Products to aisles; unknown ids drop out.
        let products = self.artifacts.products();
        let mut cart: BTreeSet<String> = request
            .product_ids
            .iter()
            .filter_map(|product_id| products.aisle_of(*product_id))
            .map(str::to_owned)
            .collect();
        trace.cart_aisles = cart.iter().cloned().collect();
        diagnostic!(
            verbose,
            event_name = "recommend.cart.mapped",
            cart_aisles = ?trace.cart_aisles,
            "categories in cart (raw)"
        );

        if cart.is_empty() {
            return self.finish_empty(trace, EmptyReason::NoKnownProducts, verbose);
        }

        self.artifacts.frequent().retain_in(&mut cart);
        trace.frequent_cart_aisles = cart.iter().cloned().collect();
        diagnostic!(
            verbose,
            event_name = "recommend.cart.frequent",
            cart_aisles = ?trace.frequent_cart_aisles,
            "categories after frequent filter"
        );

        if cart.is_empty() {
            return self.finish_empty(trace, EmptyReason::NoFrequentAisles, verbose);
        }

        let features = self.artifacts.catalog().one_hot(cart.iter().map(String::as_str));
        let segment = self.classifier.classify(&features);
        trace.segment = Some(segment);
        diagnostic!(
            verbose,
            event_name = "recommend.segment.predicted",
            segment = segment.0,
            "predicted segment"
        );

        let rules = self.artifacts.rules();
        let (table, source) = match rules.for_segment(segment) {
            Some(table) => (table, RuleSource::Segment),
            None => {
                diagnostic!(
                    verbose,
                    event_name = "recommend.rules.aggregate_substituted",
                    segment = segment.0,
                    "segment has no rules, using aggregate rules"
                );
                trace.used_aggregate_table = true;
                (rules.aggregate(), RuleSource::Aggregate)
            }
        };

        let hits = table.ranked_matches(&cart);
        trace.rules_hit = hits.len();
        diagnostic!(verbose, event_name = "recommend.rules.hit", rules_hit = hits.len(), "rules hit");

        if hits.is_empty() {
            return self.finish_empty(trace, EmptyReason::NoMatchingRules, verbose);
        }

        let mut recommended = Vec::with_capacity(top_k);
        collect_consequents(&hits, &cart, top_k, source, &mut recommended);

        if recommended.is_empty() {
            diagnostic!(
                verbose,
                event_name = "recommend.fallback.start",
                "no recommendations in segment, trying aggregate rules"
            );
            let fallback_hits = rules.aggregate().ranked_matches(&cart);
            trace.fallback_used = true;
            trace.fallback_rules_hit = fallback_hits.len();
            diagnostic!(
                verbose,
                event_name = "recommend.fallback.rules_hit",
                rules_hit = fallback_hits.len(),
                "rules hit in aggregate rules"
            );
            collect_consequents(
                &fallback_hits,
                &cart,
                top_k,
                RuleSource::Aggregate,
                &mut recommended,
            );
        }

        recommended.truncate(top_k);
        if recommended.is_empty() {
            return self.finish_empty(trace, EmptyReason::NoNewConsequents, verbose);
        }

        let labels: Vec<&str> = recommended.iter().map(|entry| entry.aisle.as_str()).collect();
        diagnostic!(
            verbose,
            event_name = "recommend.completed",
            recommended = ?labels,
            "recommended aisles"
        );

        Recommendation { aisles: recommended, trace, empty_reason: None }
    }

    fn finish_empty(
        &self,
        trace: RecommendationTrace,
        reason: EmptyReason,
        verbose: bool,
    ) -> Recommendation {
        diagnostic!(
            verbose,
            event_name = "recommend.empty",
            reason = ?reason,
            "{}",
            reason.description()
        );
        Recommendation::empty(trace, reason)
    }
}

/// Walks ranked rules and their consequents in order, appending aisles that
/// are neither in the cart nor already recommended until `top_k` is reached.
fn collect_consequents(
    hits: &[&AssociationRule],
    cart: &BTreeSet<String>,
    top_k: usize,
    source: RuleSource,
    recommended: &mut Vec<RecommendedAisle>,
) {
    for rule in hits {
        for aisle in &rule.consequents {
            if recommended.len() >= top_k {
                return;
            }
            if cart.contains(aisle) || recommended.iter().any(|entry| &entry.aisle == aisle) {
                continue;
            }
            recommended.push(RecommendedAisle { aisle: aisle.clone(), lift: rule.lift, source });
        }
    }
}
