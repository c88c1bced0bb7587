// src/model/params.rs

use crate::error::ConfigurationError;
use crate::model::catalog::{Catalog, Period, ProductId, SupplierId};
use crate::optimization::builder::ProductionMode;
use std::collections::BTreeMap;

pub type ProductPeriodTable = BTreeMap<(ProductId, Period), f64>;
pub type SupplierPeriodTable = BTreeMap<(SupplierId, Period), f64>;

/// Frozen numeric inputs of one model instance.
///
/// Production emission is stored per (product, period); a flat or
/// per-period factor is expanded into this shape by the caller.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    pub catalog: Catalog,
    pub demand: ProductPeriodTable,
    pub ordering_cost: ProductPeriodTable,
    pub holding_cost: ProductPeriodTable,
    pub procurement_cost: SupplierPeriodTable,
    pub transport_emission: SupplierPeriodTable,
    pub production_emission: ProductPeriodTable,
    pub inventory_carrying_cost: f64,
    /// Known production rates; only read in fixed production mode.
    pub production_schedule: Option<ProductPeriodTable>,
    /// Maximum replenishment events per (product, period).
    pub replenishment_cap: i64,
}

/// Builds a (product, period) table from a value function.
pub fn product_table<F>(catalog: &Catalog, mut value: F) -> ProductPeriodTable
where
    F: FnMut(&ProductId, Period) -> f64,
{
    let mut table = BTreeMap::new();
    for product in &catalog.products {
        for &period in &catalog.periods {
            table.insert((product.clone(), period), value(product, period));
        }
    }
    table
}

/// Builds a (supplier, period) table from a value function.
pub fn supplier_table<F>(catalog: &Catalog, mut value: F) -> SupplierPeriodTable
where
    F: FnMut(&SupplierId, Period) -> f64,
{
    let mut table = BTreeMap::new();
    for supplier in &catalog.suppliers {
        for &period in &catalog.periods {
            table.insert((supplier.clone(), period), value(supplier, period));
        }
    }
    table
}

fn check_value(table: &'static str, key: String, value: f64) -> Result<f64, ConfigurationError> {
    if !value.is_finite() {
        return Err(ConfigurationError::NonFiniteValue { table, key });
    }
    if value < 0.0 {
        return Err(ConfigurationError::NegativeValue { table, key, value });
    }
    Ok(value)
}

fn check_product_table(
    name: &'static str,
    table: &ProductPeriodTable,
    catalog: &Catalog,
) -> Result<(), ConfigurationError> {
    for product in &catalog.products {
        for &period in &catalog.periods {
            let key = format!("({}, {})", product, period);
            match table.get(&(product.clone(), period)) {
                Some(&value) => {
                    check_value(name, key, value)?;
                }
                None => return Err(ConfigurationError::MissingEntry { table: name, key }),
            }
        }
    }
    Ok(())
}

fn check_supplier_table(
    name: &'static str,
    table: &SupplierPeriodTable,
    catalog: &Catalog,
) -> Result<(), ConfigurationError> {
    for supplier in &catalog.suppliers {
        for &period in &catalog.periods {
            let key = format!("({}, {})", supplier, period);
            match table.get(&(supplier.clone(), period)) {
                Some(&value) => {
                    check_value(name, key, value)?;
                }
                None => return Err(ConfigurationError::MissingEntry { table: name, key }),
            }
        }
    }
    Ok(())
}

impl ParameterSet {
    /// Checks every table the model builder will index for `mode`.
    pub fn validate(&self, mode: ProductionMode) -> Result<(), ConfigurationError> {
        if !self.catalog.periods_contiguous() {
            return Err(ConfigurationError::NonContiguousPeriods(
                self.catalog.period_indices(),
            ));
        }

        check_product_table("demand", &self.demand, &self.catalog)?;
        check_product_table("ordering_cost", &self.ordering_cost, &self.catalog)?;
        check_product_table("holding_cost", &self.holding_cost, &self.catalog)?;
        check_product_table(
            "production_emission",
            &self.production_emission,
            &self.catalog,
        )?;
        check_supplier_table("procurement_cost", &self.procurement_cost, &self.catalog)?;
        check_supplier_table(
            "transport_emission",
            &self.transport_emission,
            &self.catalog,
        )?;
        check_value(
            "inventory_carrying_cost",
            "global".to_string(),
            self.inventory_carrying_cost,
        )?;

        if mode == ProductionMode::Fixed {
            let schedule = self
                .production_schedule
                .as_ref()
                .ok_or(ConfigurationError::MissingProductionSchedule)?;
            check_product_table("production_schedule", schedule, &self.catalog)?;
        }

        Ok(())
    }

    pub fn demand(&self, product: &ProductId, period: Period) -> Option<f64> {
        self.demand.get(&(product.clone(), period)).copied()
    }

    /// Total demand of `product` over the whole horizon.
    pub fn total_demand(&self, product: &ProductId) -> f64 {
        self.catalog
            .periods
            .iter()
            .filter_map(|&t| self.demand(product, t))
            .sum()
    }

    /// Demand of `product` accumulated through `period`.
    pub fn cumulative_demand(&self, product: &ProductId, period: Period) -> f64 {
        self.catalog
            .periods_through(period)
            .filter_map(|t| self.demand(product, t))
            .sum()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Reference instance with a hand-picked demand table.
    pub(crate) fn reference_params() -> ParameterSet {
        let catalog = Catalog::with_horizon(&["P1", "P2"], 3, &["B1", "B2"]);
        let demand_rows = [("P1", [60.0, 55.0, 50.0]), ("P2", [50.0, 60.0, 55.0])];
        let demand = product_table(&catalog, |p, t| {
            demand_rows
                .iter()
                .find(|(name, _)| *name == p.0)
                .map(|(_, row)| row[(t.0 - 1) as usize])
                .unwrap_or(0.0)
        });
        let costs = [("B1", [400.0, 420.0, 440.0]), ("B2", [430.0, 450.0, 470.0])];
        let emissions = [("B1", [40.0, 38.0, 36.0]), ("B2", [35.0, 33.0, 31.0])];
        let pick = |rows: &[(&str, [f64; 3]); 2], s: &SupplierId, t: Period| {
            rows.iter()
                .find(|(name, _)| *name == s.0)
                .map(|(_, row)| row[(t.0 - 1) as usize])
                .unwrap_or(0.0)
        };

        ParameterSet {
            demand,
            ordering_cost: product_table(&catalog, |_, _| 20.0),
            holding_cost: product_table(&catalog, |_, _| 10.0),
            procurement_cost: supplier_table(&catalog, |s, t| pick(&costs, s, t)),
            transport_emission: supplier_table(&catalog, |s, t| pick(&emissions, s, t)),
            production_emission: product_table(&catalog, |_, _| 0.08),
            inventory_carrying_cost: 5.0,
            production_schedule: Some(product_table(&catalog, |_, t| 30.0 + 5.0 * t.0 as f64)),
            replenishment_cap: 10,
            catalog,
        }
    }

    #[test]
    fn test_reference_params_validate_in_both_modes() {
        let params = reference_params();
        assert_eq!(params.validate(ProductionMode::Fixed), Ok(()));
        assert_eq!(params.validate(ProductionMode::Decision), Ok(()));
    }

    #[test]
    fn test_missing_cost_entry_is_reported() {
        let mut params = reference_params();
        params
            .holding_cost
            .remove(&(ProductId::new("P2"), Period(2)));

        let err = params.validate(ProductionMode::Decision).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingEntry {
                table: "holding_cost",
                key: "(P2, 2)".to_string()
            }
        );
    }

    #[test]
    fn test_negative_factor_is_rejected() {
        let mut params = reference_params();
        params
            .transport_emission
            .insert((SupplierId::new("B1"), Period(1)), -1.0);

        assert!(matches!(
            params.validate(ProductionMode::Decision),
            Err(ConfigurationError::NegativeValue {
                table: "transport_emission",
                ..
            })
        ));
    }

    #[test]
    fn test_non_contiguous_periods_are_rejected() {
        let mut params = reference_params();
        params.catalog.periods = vec![Period(1), Period(2), Period(4)];

        assert_eq!(
            params.validate(ProductionMode::Fixed),
            Err(ConfigurationError::NonContiguousPeriods(vec![1, 2, 4]))
        );
    }

    #[test]
    fn test_schedule_only_required_in_fixed_mode() {
        let mut params = reference_params();
        params.production_schedule = None;

        assert_eq!(params.validate(ProductionMode::Decision), Ok(()));
        assert_eq!(
            params.validate(ProductionMode::Fixed),
            Err(ConfigurationError::MissingProductionSchedule)
        );
    }

    #[test]
    fn test_demand_totals() {
        let params = reference_params();
        let p1 = ProductId::new("P1");
        assert_eq!(params.total_demand(&p1), 165.0);
        assert_eq!(params.cumulative_demand(&p1, Period(2)), 115.0);
    }
}
