use std::collections::{BTreeSet, HashMap};

/// Ordered aisle universe. The position of an aisle is its one-hot column,
/// and must match the column order the scaler and clusterer were fitted on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AisleCatalog {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl AisleCatalog {
    /// Builds the catalog, returning the first repeated label on duplicates.
    pub fn new(columns: Vec<String>) -> Result<Self, String> {
        let mut index = HashMap::with_capacity(columns.len());
        for (position, aisle) in columns.iter().enumerate() {
            if index.insert(aisle.clone(), position).is_some() {
                return Err(aisle.clone());
            }
        }

        Ok(Self { columns, index })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, aisle: &str) -> Option<usize> {
        self.index.get(aisle).copied()
    }

    pub fn contains(&self, aisle: &str) -> bool {
        self.index.contains_key(aisle)
    }

    /// Binary presence vector over the catalog columns. Labels outside the
    /// catalog are skipped.
    pub fn one_hot<'a>(&self, aisles: impl IntoIterator<Item = &'a str>) -> Vec<f64> {
        let mut vector = vec![0.0; self.columns.len()];
        for aisle in aisles {
            if let Some(position) = self.index_of(aisle) {
                vector[position] = 1.0;
            }
        }
        vector
    }
}

/// Aisles significant enough to drive segmentation and recommendation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequentAisles {
    aisles: BTreeSet<String>,
}

impl FrequentAisles {
    pub fn new(aisles: impl IntoIterator<Item = String>) -> Self {
        Self { aisles: aisles.into_iter().collect() }
    }

    pub fn contains(&self, aisle: &str) -> bool {
        self.aisles.contains(aisle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.aisles.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aisles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aisles.is_empty()
    }

    /// Keeps only the frequent members of `cart`.
    pub fn retain_in(&self, cart: &mut BTreeSet<String>) {
        cart.retain(|aisle| self.contains(aisle));
    }
}
