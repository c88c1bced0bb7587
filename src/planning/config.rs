// src/planning/config.rs

use crate::error::ConfigurationError;
use crate::io::demand::generate_normal_demand;
use crate::model::catalog::{Catalog, Period, ProductId, SupplierId};
use crate::model::params::{product_table, ParameterSet, SupplierPeriodTable};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierConfig {
    pub name: String,
    /// Unit procurement cost per period, period 1 first.
    pub procurement_cost: Vec<f64>,
    /// Transport emission per unit per period, period 1 first.
    pub transport_emission: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandConfig {
    pub seed: u64,
    pub mean: f64,
    pub std_dev: f64,
}

/// Fixed production rate `base + step · t` for every product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub base: f64,
    pub step: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub products: Vec<String>,
    pub periods: u32,
    pub suppliers: Vec<SupplierConfig>,
    pub demand: DemandConfig,
    pub ordering_cost: f64,
    pub holding_cost: f64,
    pub inventory_carrying_cost: f64,
    /// Production emission per unit; one value for all periods.
    pub production_emission: f64,
    pub production_schedule: ScheduleConfig,
    pub replenishment_cap: i64,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            products: vec!["P1".to_string(), "P2".to_string()],
            periods: 3,
            suppliers: vec![
                SupplierConfig {
                    name: "B1".to_string(),
                    procurement_cost: vec![400.0, 420.0, 440.0],
                    transport_emission: vec![40.0, 38.0, 36.0],
                },
                SupplierConfig {
                    name: "B2".to_string(),
                    procurement_cost: vec![430.0, 450.0, 470.0],
                    transport_emission: vec![35.0, 33.0, 31.0],
                },
            ],
            demand: DemandConfig {
                seed: 0,
                mean: 50.0,
                std_dev: 10.0,
            },
            ordering_cost: 20.0,
            holding_cost: 10.0,
            inventory_carrying_cost: 5.0,
            production_emission: 0.08,
            production_schedule: ScheduleConfig {
                base: 30.0,
                step: 5.0,
            },
            replenishment_cap: 10,
        }
    }
}

impl PlanConfig {
    /// Loads a JSON config; absent fields fall back to the defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(
            self.products.iter().map(ProductId::new).collect(),
            (1..=self.periods).map(Period).collect(),
            self.suppliers.iter().map(|s| SupplierId::new(&s.name)).collect(),
        )
    }

    /// Materializes the tables, drawing demand once from the configured seed.
    ///
    /// Supplier rows shorter than the horizon leave entries out; the
    /// parameter set's validation reports them.
    pub fn parameter_set(&self) -> Result<ParameterSet, ConfigurationError> {
        let catalog = self.catalog();
        let demand = generate_normal_demand(
            &catalog,
            self.demand.mean,
            self.demand.std_dev,
            self.demand.seed,
        )?;

        let mut procurement_cost = SupplierPeriodTable::new();
        let mut transport_emission = SupplierPeriodTable::new();
        for supplier in &self.suppliers {
            let id = SupplierId::new(&supplier.name);
            for &period in &catalog.periods {
                let index = (period.0 - 1) as usize;
                if let Some(&cost) = supplier.procurement_cost.get(index) {
                    procurement_cost.insert((id.clone(), period), cost);
                }
                if let Some(&factor) = supplier.transport_emission.get(index) {
                    transport_emission.insert((id.clone(), period), factor);
                }
            }
        }

        let schedule = &self.production_schedule;
        Ok(ParameterSet {
            demand,
            ordering_cost: product_table(&catalog, |_, _| self.ordering_cost),
            holding_cost: product_table(&catalog, |_, _| self.holding_cost),
            procurement_cost,
            transport_emission,
            production_emission: product_table(&catalog, |_, _| self.production_emission),
            inventory_carrying_cost: self.inventory_carrying_cost,
            production_schedule: Some(product_table(&catalog, |_, t| {
                schedule.base + schedule.step * t.0 as f64
            })),
            replenishment_cap: self.replenishment_cap,
            catalog,
        })
    }
}
