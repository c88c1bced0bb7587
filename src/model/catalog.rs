// src/model/catalog.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a product in the catalog (e.g. "P1").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

/// Identifier of a supplier/carrier (e.g. "B1").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierId(pub String);

/// A period of the planning horizon. Period 1 has no predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(pub u32);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl SupplierId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Period {
    pub fn index(self) -> u32 {
        self.0
    }

    pub fn previous(self) -> Option<Period> {
        if self.0 > 1 {
            Some(Period(self.0 - 1))
        } else {
            None
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SupplierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three index sets of a model instance.
///
/// Order is preserved as given; every table and report iterates
/// products, then suppliers, then periods in this order.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub products: Vec<ProductId>,
    pub periods: Vec<Period>,
    pub suppliers: Vec<SupplierId>,
}

impl Catalog {
    pub fn new(products: Vec<ProductId>, periods: Vec<Period>, suppliers: Vec<SupplierId>) -> Self {
        Self {
            products,
            periods,
            suppliers,
        }
    }

    /// Catalog with periods `1..=horizon`.
    pub fn with_horizon(products: &[&str], horizon: u32, suppliers: &[&str]) -> Self {
        Self::new(
            products.iter().map(|p| ProductId::new(*p)).collect(),
            (1..=horizon).map(Period).collect(),
            suppliers.iter().map(|s| SupplierId::new(*s)).collect(),
        )
    }

    /// True when the periods read exactly 1, 2, ..., n.
    pub fn periods_contiguous(&self) -> bool {
        self.periods
            .iter()
            .enumerate()
            .all(|(i, p)| p.0 as usize == i + 1)
    }

    pub fn period_indices(&self) -> Vec<u32> {
        self.periods.iter().map(|p| p.0).collect()
    }

    /// Periods up to and including `period`.
    pub fn periods_through(&self, period: Period) -> impl Iterator<Item = Period> + '_ {
        self.periods.iter().copied().filter(move |p| *p <= period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_catalog_is_contiguous() {
        let catalog = Catalog::with_horizon(&["P1", "P2"], 3, &["B1", "B2"]);
        assert!(catalog.periods_contiguous());
        assert_eq!(catalog.period_indices(), vec![1, 2, 3]);
    }

    #[test]
    fn test_gap_in_periods_is_detected() {
        let mut catalog = Catalog::with_horizon(&["P1"], 3, &["B1"]);
        catalog.periods = vec![Period(1), Period(3)];
        assert!(!catalog.periods_contiguous());

        catalog.periods = vec![Period(2), Period(3)];
        assert!(!catalog.periods_contiguous());
    }

    #[test]
    fn test_first_period_has_no_predecessor() {
        assert_eq!(Period(1).previous(), None);
        assert_eq!(Period(3).previous(), Some(Period(2)));
    }

    #[test]
    fn test_periods_through() {
        let catalog = Catalog::with_horizon(&["P1"], 3, &["B1"]);
        let through: Vec<Period> = catalog.periods_through(Period(2)).collect();
        assert_eq!(through, vec![Period(1), Period(2)]);
    }
}
