use std::collections::{BTreeMap, HashSet};

use super::table::{AssociationRule, RuleTable};
use crate::segmentation::SegmentId;

/// Rule tables keyed by segment, plus the deduplicated union used when a
/// segment has nothing of its own.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentRules {
    tables: BTreeMap<SegmentId, RuleTable>,
    aggregate: RuleTable,
}

impl SegmentRules {
    pub fn new(tables: BTreeMap<SegmentId, RuleTable>) -> Self {
        let aggregate = aggregate_rules(&tables);
        Self { tables, aggregate }
    }

    /// The segment's own table, or `None` when it is absent or empty.
    pub fn for_segment(&self, segment: SegmentId) -> Option<&RuleTable> {
        self.tables.get(&segment).filter(|table| !table.is_empty())
    }

    pub fn aggregate(&self) -> &RuleTable {
        &self.aggregate
    }

    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &RuleTable)> {
        self.tables.iter().map(|(segment, table)| (*segment, table))
    }

    pub fn segment_count(&self) -> usize {
        self.tables.len()
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        for (segment, table) in &self.tables {
            table.validate().map_err(|message| format!("segment {segment}: {message}"))?;
        }
        Ok(())
    }
}

/// Union of the non-empty tables in ascending segment order. A rule whose
/// antecedents and consequents were already seen is dropped.
fn aggregate_rules(tables: &BTreeMap<SegmentId, RuleTable>) -> RuleTable {
    let mut seen: HashSet<(Vec<&str>, Vec<&str>)> = HashSet::new();
    let mut rules: Vec<AssociationRule> = Vec::new();

    for table in tables.values().filter(|table| !table.is_empty()) {
        for rule in table.rules() {
            let key = (
                rule.antecedents.iter().map(String::as_str).collect::<Vec<_>>(),
                rule.consequents.iter().map(String::as_str).collect::<Vec<_>>(),
            );
            if seen.insert(key) {
                rules.push(rule.clone());
            }
        }
    }

    RuleTable::new(rules)
}
