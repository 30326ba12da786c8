//! Association rules mined per cart segment.

mod segments;
mod table;

pub use segments::SegmentRules;
pub use table::{AssociationRule, RuleTable};
