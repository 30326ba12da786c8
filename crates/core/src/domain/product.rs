use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Many-to-one mapping from product to the single aisle it is shelved in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductAisleMap {
    aisles: HashMap<ProductId, String>,
}

impl ProductAisleMap {
    pub fn new(aisles: HashMap<ProductId, String>) -> Self {
        Self { aisles }
    }

    pub fn aisle_of(&self, product_id: ProductId) -> Option<&str> {
        self.aisles.get(&product_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aisles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aisles.is_empty()
    }
}

impl FromIterator<(ProductId, String)> for ProductAisleMap {
    fn from_iter<T: IntoIterator<Item = (ProductId, String)>>(iter: T) -> Self {
        Self { aisles: iter.into_iter().collect() }
    }
}
