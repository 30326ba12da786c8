use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// "Carts holding any of `antecedents` tend to also hold `consequents`."
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    pub antecedents: BTreeSet<String>,
    pub consequents: Vec<String>,
    pub lift: f64,
}

impl AssociationRule {
    pub fn new<A, C>(antecedents: A, consequents: C, lift: f64) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            antecedents: antecedents.into_iter().map(Into::into).collect(),
            consequents: consequents.into_iter().map(Into::into).collect(),
            lift,
        }
    }

    /// True when at least one antecedent is in the cart.
    pub fn fires_for(&self, cart: &BTreeSet<String>) -> bool {
        self.antecedents.iter().any(|aisle| cart.contains(aisle))
    }
}

/// Ordered association rules for one segment, or the aggregate of all of them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<AssociationRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<AssociationRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[AssociationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules firing for `cart`, strongest lift first. Equal lifts keep table order.
    pub fn ranked_matches(&self, cart: &BTreeSet<String>) -> Vec<&AssociationRule> {
        let mut hits: Vec<&AssociationRule> =
            self.rules.iter().filter(|rule| rule.fires_for(cart)).collect();
        hits.sort_by(|a, b| by_lift_descending(a.lift, b.lift));
        hits
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        for (index, rule) in self.rules.iter().enumerate() {
            if !rule.lift.is_finite() {
                return Err(format!("rule {index} has a non-finite lift"));
            }
            if rule.antecedents.is_empty() {
                return Err(format!("rule {index} has no antecedents"));
            }
        }
        Ok(())
    }
}

impl FromIterator<AssociationRule> for RuleTable {
    fn from_iter<T: IntoIterator<Item = AssociationRule>>(iter: T) -> Self {
        Self { rules: iter.into_iter().collect() }
    }
}

fn by_lift_descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
