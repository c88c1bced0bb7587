// src/optimization/extract.rs

use crate::error::ExtractionError;
use crate::model::catalog::{Period, ProductId, SupplierId};
use crate::model::params::ParameterSet;
use crate::model::schema::{Model, ProductPeriodExprs};
use crate::optimization::builder::ProductionMode;
use crate::solver::traits::Assignment;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Solved decisions of one (product, period).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPeriodRecord {
    pub product: String,
    pub period: u32,
    pub demand: f64,
    pub production_rate: f64,
    pub inventory_level: f64,
    pub shipment_size: f64,
    pub replenishment_count: u32,
    /// `replenishment_count × shipment_size`
    pub shipped: f64,
    /// Running total of `shipped` in report order (product-major).
    pub running_shipped: f64,
    pub production_emission: f64,
}

/// Quantity sourced from one supplier for one product in one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcurementRecord {
    pub product: String,
    pub supplier: String,
    pub period: u32,
    pub quantity: f64,
    pub transport_emission: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CostBreakdown {
    pub ordering: f64,
    pub holding: f64,
    pub procurement: f64,
    pub inventory: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.ordering + self.holding + self.procurement + self.inventory
    }
}

/// Everything a reporting layer needs from one solved run.
///
/// Transport and production emissions are kept as separate totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    pub mode: ProductionMode,
    pub objective: f64,
    pub costs: CostBreakdown,
    pub replenishment_cap: u32,
    pub periods: Vec<ProductPeriodRecord>,
    pub procurement: Vec<ProcurementRecord>,
    pub total_shipped: f64,
    pub transport_emission: f64,
    pub production_emission: f64,
}

impl PlanReport {
    pub fn record(&self, product: &str, period: u32) -> Option<&ProductPeriodRecord> {
        self.periods
            .iter()
            .find(|r| r.product == product && r.period == period)
    }

    /// Records of one product in period order.
    pub fn product_records<'a>(
        &'a self,
        product: &'a str,
    ) -> impl Iterator<Item = &'a ProductPeriodRecord> + 'a {
        self.periods.iter().filter(move |r| r.product == product)
    }

    /// Total procurement across products and suppliers in `period`.
    pub fn procured_in(&self, period: u32) -> f64 {
        self.procurement
            .iter()
            .filter(|r| r.period == period)
            .map(|r| r.quantity)
            .sum()
    }

    /// Total production across products in `period`.
    pub fn produced_in(&self, period: u32) -> f64 {
        self.periods
            .iter()
            .filter(|r| r.period == period)
            .map(|r| r.production_rate)
            .sum()
    }
}

/// Reads a successful assignment back into named metrics. Never mutates it.
pub struct ResultExtractor<'a> {
    params: &'a ParameterSet,
    model: &'a Model,
}

fn factor<K: Ord>(
    table_name: &'static str,
    table: &BTreeMap<K, f64>,
    key: &K,
    label: impl FnOnce() -> String,
) -> Result<f64, ExtractionError> {
    table
        .get(key)
        .copied()
        .ok_or_else(|| ExtractionError::MissingFactor {
            table: table_name,
            key: label(),
        })
}

impl<'a> ResultExtractor<'a> {
    pub fn new(params: &'a ParameterSet, model: &'a Model) -> Self {
        Self { params, model }
    }

    pub fn extract(&self, assignment: &Assignment) -> Result<PlanReport, ExtractionError> {
        let expected = self.model.variables().len();
        if assignment.len() != expected {
            return Err(ExtractionError::ShapeMismatch {
                expected,
                actual: assignment.len(),
            });
        }

        let catalog = &self.params.catalog;
        let schema = self.model.schema();

        let mut periods = Vec::with_capacity(catalog.products.len() * catalog.periods.len());
        let mut running_shipped = 0.0;
        let mut production_emission = 0.0;

        for product in &catalog.products {
            for &period in &catalog.periods {
                let key = (product.clone(), period);
                let value = |map: &ProductPeriodExprs| {
                    map.get(&key).map(|e| assignment.value_of(e)).unwrap_or(0.0)
                };

                let replenishment_count =
                    value(&schema.replenishment_count).round().max(0.0) as u32;
                let shipment_size = value(&schema.shipment_size);
                let shipped = replenishment_count as f64 * shipment_size;
                let production_rate = value(&schema.production_rate);
                running_shipped += shipped;

                let emission_factor = factor(
                    "production_emission",
                    &self.params.production_emission,
                    &key,
                    || format!("({}, {})", product, period),
                )?;
                let emission = production_rate * emission_factor;
                production_emission += emission;

                periods.push(ProductPeriodRecord {
                    product: product.0.clone(),
                    period: period.index(),
                    demand: self.params.demand(product, period).unwrap_or(0.0),
                    production_rate,
                    inventory_level: value(&schema.inventory_level),
                    shipment_size,
                    replenishment_count,
                    shipped,
                    running_shipped,
                    production_emission: emission,
                });
            }
        }

        let (procurement, transport_emission) = self.procurement(assignment)?;

        let parts = self.model.objective_parts();
        let costs = CostBreakdown {
            ordering: assignment.value_of(&parts.ordering),
            holding: assignment.value_of(&parts.holding),
            procurement: assignment.value_of(&parts.procurement),
            inventory: assignment.value_of(&parts.inventory),
        };

        debug!(
            objective = assignment.objective(),
            transport_emission, production_emission, "extracted plan"
        );

        Ok(PlanReport {
            mode: self.model.mode(),
            objective: assignment.objective(),
            costs,
            replenishment_cap: self.model.replenishment_cap(),
            periods,
            procurement,
            total_shipped: running_shipped,
            transport_emission,
            production_emission,
        })
    }

    fn procurement(
        &self,
        assignment: &Assignment,
    ) -> Result<(Vec<ProcurementRecord>, f64), ExtractionError> {
        let catalog = &self.params.catalog;
        let schema = self.model.schema();
        let mut records = Vec::new();
        let mut total_emission = 0.0;

        for product in &catalog.products {
            for supplier in &catalog.suppliers {
                for &period in &catalog.periods {
                    let quantity = schema
                        .procurement_alloc
                        .get(&(product.clone(), supplier.clone(), period))
                        .map(|e| assignment.value_of(e))
                        .unwrap_or(0.0);
                    let emission = quantity * self.transport_factor(supplier, period)?;
                    total_emission += emission;

                    records.push(ProcurementRecord {
                        product: product.0.clone(),
                        supplier: supplier.0.clone(),
                        period: period.index(),
                        quantity,
                        transport_emission: emission,
                    });
                }
            }
        }

        Ok((records, total_emission))
    }

    fn transport_factor(
        &self,
        supplier: &SupplierId,
        period: Period,
    ) -> Result<f64, ExtractionError> {
        factor(
            "transport_emission",
            &self.params.transport_emission,
            &(supplier.clone(), period),
            || format!("({}, {})", supplier, period),
        )
    }
}

/// Product identifiers of a report, in first-seen order.
pub fn report_products(report: &PlanReport) -> Vec<ProductId> {
    let mut products: Vec<ProductId> = Vec::new();
    for record in &report.periods {
        if !products.iter().any(|p| p.0 == record.product) {
            products.push(ProductId::new(record.product.clone()));
        }
    }
    products
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::params::tests::reference_params;
    use crate::optimization::builder::ModelBuilder;

    /// Hand-made assignment: P1 ships 60/55/50 and P2 ships 50/60/55 with
    /// four events every period, all procurement from B1.
    fn hand_assignment(model: &Model) -> Assignment {
        let shipped = |name: &str| -> Option<f64> {
            let rest = name.strip_prefix("s[")?.strip_suffix(",4]")?;
            match rest {
                "P1,1" => Some(60.0),
                "P1,2" => Some(55.0),
                "P1,3" => Some(50.0),
                "P2,1" => Some(50.0),
                "P2,2" => Some(60.0),
                "P2,3" => Some(55.0),
                _ => None,
            }
        };
        let inventory = |name: &str| -> Option<f64> {
            // Q[t] = Q[t-1] + p[t] - shipped[t]/2
            match name {
                "Q[P1,1]" => Some(5.0),
                "Q[P1,2]" => Some(17.5),
                "Q[P1,3]" => Some(37.5),
                "Q[P2,1]" => Some(10.0),
                "Q[P2,2]" => Some(20.0),
                "Q[P2,3]" => Some(37.5),
                _ => None,
            }
        };
        let procured = |name: &str| -> Option<f64> {
            match name {
                "P[P1,B1,1]" => Some(70.0),
                "P[P1,B1,2]" => Some(80.0),
                "P[P1,B1,3]" => Some(90.0),
                _ => None,
            }
        };

        let values = model
            .variables()
            .iter()
            .map(|v| {
                if v.name.starts_with("z[") && v.name.ends_with(",4]") {
                    1.0
                } else {
                    shipped(&v.name)
                        .or_else(|| inventory(&v.name))
                        .or_else(|| procured(&v.name))
                        .unwrap_or(0.0)
                }
            })
            .collect();
        Assignment::from_values(model, values)
    }

    #[test]
    fn test_hand_assignment_is_feasible() {
        let params = reference_params();
        let model = ModelBuilder::new(&params, ProductionMode::Fixed).build().unwrap();
        let assignment = hand_assignment(&model);

        assert_eq!(
            model.violated_constraints(assignment.values(), 1e-9),
            Vec::<&str>::new()
        );
    }

    #[test]
    fn test_extracts_per_period_metrics() {
        let params = reference_params();
        let model = ModelBuilder::new(&params, ProductionMode::Fixed).build().unwrap();
        let report = ResultExtractor::new(&params, &model)
            .extract(&hand_assignment(&model))
            .unwrap();

        let r = report.record("P1", 1).unwrap();
        assert_eq!(r.replenishment_count, 4);
        assert!((r.shipment_size - 15.0).abs() < 1e-9);
        assert!((r.shipped - 60.0).abs() < 1e-9);
        assert_eq!(r.production_rate, 35.0);
        assert_eq!(r.inventory_level, 5.0);
        assert_eq!(report.periods.len(), 6);
        assert_eq!(report.procurement.len(), 12);
    }

    #[test]
    fn test_running_total_spans_all_products() {
        let params = reference_params();
        let model = ModelBuilder::new(&params, ProductionMode::Fixed).build().unwrap();
        let report = ResultExtractor::new(&params, &model)
            .extract(&hand_assignment(&model))
            .unwrap();

        let p1_last = report.record("P1", 3).unwrap();
        let p2_first = report.record("P2", 1).unwrap();
        assert!((p1_last.running_shipped - 165.0).abs() < 1e-9);
        assert!((p2_first.running_shipped - 215.0).abs() < 1e-9);
        assert!((report.total_shipped - 330.0).abs() < 1e-9);
    }

    #[test]
    fn test_emissions_are_reported_separately() {
        let params = reference_params();
        let model = ModelBuilder::new(&params, ProductionMode::Fixed).build().unwrap();
        let report = ResultExtractor::new(&params, &model)
            .extract(&hand_assignment(&model))
            .unwrap();

        // B1 factors 40, 38, 36 on 70, 80, 90 units
        let transport = 70.0 * 40.0 + 80.0 * 38.0 + 90.0 * 36.0;
        assert!((report.transport_emission - transport).abs() < 1e-9);
        // 240 produced units at 0.08
        assert!((report.production_emission - 19.2).abs() < 1e-9);
    }

    #[test]
    fn test_cost_breakdown_sums_to_objective() {
        let params = reference_params();
        let model = ModelBuilder::new(&params, ProductionMode::Fixed).build().unwrap();
        let report = ResultExtractor::new(&params, &model)
            .extract(&hand_assignment(&model))
            .unwrap();

        // ordering: 6 periods × 4 events × 20
        assert!((report.costs.ordering - 480.0).abs() < 1e-9);
        // holding: 10 / 2 × (total shipped / 4)
        assert!((report.costs.holding - 412.5).abs() < 1e-9);
        assert!((report.costs.total() - report.objective).abs() < 1e-6);
    }

    #[test]
    fn test_foreign_assignment_is_rejected() {
        let params = reference_params();
        let fixed = ModelBuilder::new(&params, ProductionMode::Fixed).build().unwrap();
        let decision = ModelBuilder::new(&params, ProductionMode::Decision)
            .build()
            .unwrap();
        let assignment = hand_assignment(&fixed);

        let err = ResultExtractor::new(&params, &decision)
            .extract(&assignment)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_report_products_keep_catalog_order() {
        let params = reference_params();
        let model = ModelBuilder::new(&params, ProductionMode::Fixed).build().unwrap();
        let report = ResultExtractor::new(&params, &model)
            .extract(&hand_assignment(&model))
            .unwrap();

        assert_eq!(
            report_products(&report),
            vec![ProductId::new("P1"), ProductId::new("P2")]
        );
    }
}
