// src/optimization/audit.rs

//! Re-checks a solved plan against the properties every valid plan holds,
//! using only the extracted numbers.

use crate::optimization::extract::{report_products, PlanReport};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    Backlog {
        product: String,
        period: u32,
        shipped: f64,
        demand: f64,
    },
    Fulfilment {
        product: String,
        shipped: f64,
        demand: f64,
    },
    InventoryBalance {
        product: String,
        period: u32,
        expected: f64,
        actual: f64,
    },
    MaterialBalance {
        period: u32,
        procured: f64,
        produced: f64,
    },
    CapExceeded {
        product: String,
        period: u32,
        count: u32,
        cap: u32,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::Backlog {
                product,
                period,
                shipped,
                demand,
            } => write!(
                f,
                "{} backlogged through period {}: shipped {:.4} < demand {:.4}",
                product, period, shipped, demand
            ),
            InvariantViolation::Fulfilment {
                product,
                shipped,
                demand,
            } => write!(
                f,
                "{} horizon shipped {:.4} differs from demand {:.4}",
                product, shipped, demand
            ),
            InvariantViolation::InventoryBalance {
                product,
                period,
                expected,
                actual,
            } => write!(
                f,
                "{} inventory in period {} is {:.4}, recursion gives {:.4}",
                product, period, actual, expected
            ),
            InvariantViolation::MaterialBalance {
                period,
                procured,
                produced,
            } => write!(
                f,
                "period {} procured {:.4} but produced {:.4}",
                period, procured, produced
            ),
            InvariantViolation::CapExceeded {
                product,
                period,
                count,
                cap,
            } => write!(
                f,
                "{} period {} uses {} replenishments, cap is {}",
                product, period, count, cap
            ),
        }
    }
}

fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(1.0)
}

/// Every violated property of `report`, empty for a consistent plan.
///
/// `tolerance` is relative, with an absolute floor of `tolerance` itself.
pub fn audit(report: &PlanReport, tolerance: f64) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for product in report_products(report) {
        let name = product.0.as_str();
        let mut shipped_so_far = 0.0;
        let mut demand_so_far = 0.0;
        let mut previous_inventory: Option<f64> = None;

        for record in report.product_records(name) {
            shipped_so_far += record.shipped;
            demand_so_far += record.demand;

            if shipped_so_far < demand_so_far && !close(shipped_so_far, demand_so_far, tolerance) {
                violations.push(InvariantViolation::Backlog {
                    product: name.to_string(),
                    period: record.period,
                    shipped: shipped_so_far,
                    demand: demand_so_far,
                });
            }

            let expected =
                previous_inventory.unwrap_or(0.0) + record.production_rate - record.shipped / 2.0;
            if !close(expected, record.inventory_level, tolerance) {
                violations.push(InvariantViolation::InventoryBalance {
                    product: name.to_string(),
                    period: record.period,
                    expected,
                    actual: record.inventory_level,
                });
            }
            previous_inventory = Some(record.inventory_level);

            if record.replenishment_count > report.replenishment_cap {
                violations.push(InvariantViolation::CapExceeded {
                    product: name.to_string(),
                    period: record.period,
                    count: record.replenishment_count,
                    cap: report.replenishment_cap,
                });
            }
        }

        if !close(shipped_so_far, demand_so_far, tolerance) {
            violations.push(InvariantViolation::Fulfilment {
                product: name.to_string(),
                shipped: shipped_so_far,
                demand: demand_so_far,
            });
        }
    }

    let mut periods: Vec<u32> = report.periods.iter().map(|r| r.period).collect();
    periods.sort_unstable();
    periods.dedup();
    for period in periods {
        let procured = report.procured_in(period);
        let produced = report.produced_in(period);
        if !close(procured, produced, tolerance) {
            violations.push(InvariantViolation::MaterialBalance {
                period,
                procured,
                produced,
            });
        }
    }

    violations
}
