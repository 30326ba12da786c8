//! Types for the recommendation engine

use serde::Serialize;

use crate::domain::product::ProductId;
use crate::segmentation::SegmentId;

/// Request for aisle recommendations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRequest {
    /// Products currently in the cart; unknown ids are ignored
    pub product_ids: Vec<ProductId>,
    /// Maximum number of aisles to return
    pub top_k: usize,
    /// Emit per-step diagnostics at INFO instead of DEBUG
    pub verbose: bool,
}

impl RecommendationRequest {
    /// Create a request for the given cart with the default cap
    pub fn new<I, P>(product_ids: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ProductId>,
    {
        Self {
            product_ids: product_ids.into_iter().map(Into::into).collect(),
            top_k: super::DEFAULT_TOP_K,
            verbose: false,
        }
    }

    /// Set the maximum number of aisles
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Toggle verbose diagnostics
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Which rule table produced a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    /// The cart segment's own rules
    Segment,
    /// The deduplicated union of all segment rules
    Aggregate,
}

/// One recommended aisle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedAisle {
    pub aisle: String,
    /// Lift of the rule that contributed this aisle
    pub lift: f64,
    pub source: RuleSource,
}

/// Why a recommendation came back empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// Cap of zero requested
    ZeroTopK,
    /// No product id is in the product→aisle map
    NoKnownProducts,
    /// None of the cart aisles is frequent
    NoFrequentAisles,
    /// No rule antecedent intersects the cart
    NoMatchingRules,
    /// Rules fired but every consequent is already in the cart
    NoNewConsequents,
}

impl EmptyReason {
    pub fn description(&self) -> &'static str {
        match self {
            EmptyReason::ZeroTopK => "no recommendations requested",
            EmptyReason::NoKnownProducts => "no product matched the product to aisle map",
            EmptyReason::NoFrequentAisles => "no frequent aisle left after filtering",
            EmptyReason::NoMatchingRules => "no rule matched the cart aisles",
            EmptyReason::NoNewConsequents => {
                "no recommendations even in the aggregate rules"
            }
        }
    }
}

/// What the pipeline saw on its way to the result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecommendationTrace {
    /// Aisles of known products, before the frequent filter
    pub cart_aisles: Vec<String>,
    /// Aisles left after the frequent filter
    pub frequent_cart_aisles: Vec<String>,
    pub segment: Option<SegmentId>,
    /// The segment had no rules and the aggregate table was used instead
    pub used_aggregate_table: bool,
    pub rules_hit: usize,
    /// The primary pass proposed nothing and the aggregate was consulted
    pub fallback_used: bool,
    pub fallback_rules_hit: usize,
}

/// Ranked recommendation with its trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub aisles: Vec<RecommendedAisle>,
    pub trace: RecommendationTrace,
    pub empty_reason: Option<EmptyReason>,
}

impl Recommendation {
    pub(crate) fn empty(trace: RecommendationTrace, reason: EmptyReason) -> Self {
        Self { aisles: Vec::new(), trace, empty_reason: Some(reason) }
    }

    /// Aisle labels in rank order
    pub fn labels(&self) -> Vec<String> {
        self.aisles.iter().map(|recommended| recommended.aisle.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.aisles.is_empty()
    }
}
