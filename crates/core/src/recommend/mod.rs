//! Aisle recommendation for a shopping cart.
//!
//! Products are mapped to aisles, filtered to the frequent ones, the cart is
//! assigned a segment, and the segment's association rules are ranked by
//! lift to propose aisles the cart does not hold yet. The aggregate rule
//! table stands in when a segment has no rules or its rules propose nothing.

mod engine;
mod types;

pub use engine::AisleRecommender;
pub use types::*;

/// Recommendations returned when the caller does not set a cap.
pub const DEFAULT_TOP_K: usize = 5;

/// Cart used by the demo entry point.
pub const DEMO_CART: [u64; 3] = [24852, 13176, 21137];
