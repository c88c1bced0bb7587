// src/io/reporting.rs

use crate::optimization::extract::PlanReport;
use crate::planning::engine::ModeComparison;
use serde::Serialize;
use std::error::Error;
use std::path::Path;

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;

    for row in rows {
        wtr.serialize(row)?;
    }

    // Flush the buffer to ensure all data is written
    wtr.flush()?;
    Ok(())
}

/// Writes the per-(product, period) table and the procurement table as CSV.
///
/// # Arguments
/// * `dir` - Directory that receives `plan_periods.csv` and `plan_procurement.csv`.
/// * `report` - The extracted plan.
pub fn write_plan_csv(dir: &Path, report: &PlanReport) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    write_rows(&dir.join("plan_periods.csv"), &report.periods)?;
    write_rows(&dir.join("plan_procurement.csv"), &report.procurement)?;

    println!(
        "Successfully exported {} period rows and {} procurement rows to '{}'",
        report.periods.len(),
        report.procurement.len(),
        dir.display()
    );
    Ok(())
}

/// Prints the plan the way an analyst reads it: per-period decisions,
/// procurement, then the two emission totals side by side.
pub fn print_plan(report: &PlanReport) {
    println!("=== Optimal Plan ({} production) ===", report.mode);
    println!("Objective: {:.4}", report.objective);
    let costs = &report.costs;
    println!(
        "  ordering {:.2} | holding {:.2} | procurement {:.2} | inventory {:.2}",
        costs.ordering, costs.holding, costs.procurement, costs.inventory
    );

    println!("\n--- Per product and period ---");
    for r in &report.periods {
        println!(
            "Product: {}, Period: {}, Demand: {}, Production: {:.4}, Inventory Q: {:.4}",
            r.product, r.period, r.demand, r.production_rate, r.inventory_level
        );
        println!(
            "    n: {}, q: {:.4}, n*q: {:.4}",
            r.replenishment_count, r.shipment_size, r.shipped
        );
    }
    println!(
        "Total n*q across all products and periods: {:.4}",
        report.total_shipped
    );

    println!("\n--- Procurement ---");
    for r in report.procurement.iter().filter(|r| r.quantity > 0.0) {
        println!(
            "Product: {}, Supplier: {}, Period: {}, P: {:.4}, Emission: {:.4}",
            r.product, r.supplier, r.period, r.quantity, r.transport_emission
        );
    }

    println!("\n--- Carbon Emission ---");
    println!("Transport:  {:.2}", report.transport_emission);
    println!("Production: {:.2}", report.production_emission);
}

pub fn print_comparison(comparison: &ModeComparison) {
    println!("=== Production Mode Comparison ===");
    for report in [&comparison.fixed, &comparison.decision] {
        let mode = report.mode.to_string();
        println!(
            "{:>8}: objective {:.4}, transport emission {:.2}, production emission {:.2}",
            mode, report.objective, report.transport_emission, report.production_emission
        );
    }
    println!(
        "Saving from free production: {:.4}",
        comparison.objective_gap()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::builder::ProductionMode;
    use crate::optimization::extract::{CostBreakdown, ProcurementRecord, ProductPeriodRecord};

    fn small_report() -> PlanReport {
        PlanReport {
            mode: ProductionMode::Decision,
            objective: 10.0,
            costs: CostBreakdown::default(),
            replenishment_cap: 10,
            periods: vec![ProductPeriodRecord {
                product: "P1".to_string(),
                period: 1,
                demand: 4.0,
                production_rate: 2.0,
                inventory_level: 0.0,
                shipment_size: 2.0,
                replenishment_count: 2,
                shipped: 4.0,
                running_shipped: 4.0,
                production_emission: 0.16,
            }],
            procurement: vec![ProcurementRecord {
                product: "P1".to_string(),
                supplier: "B1".to_string(),
                period: 1,
                quantity: 2.0,
                transport_emission: 80.0,
            }],
            total_shipped: 4.0,
            transport_emission: 80.0,
            production_emission: 0.16,
        }
    }

    #[test]
    fn test_csv_export_writes_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        write_plan_csv(dir.path(), &small_report()).unwrap();

        let periods = std::fs::read_to_string(dir.path().join("plan_periods.csv")).unwrap();
        let mut lines = periods.lines();
        assert_eq!(
            lines.next().unwrap(),
            "product,period,demand,production_rate,inventory_level,shipment_size,replenishment_count,shipped,running_shipped,production_emission"
        );
        assert!(lines.next().unwrap().starts_with("P1,1,4.0,2.0"));

        let procurement = std::fs::read_to_string(dir.path().join("plan_procurement.csv")).unwrap();
        assert_eq!(procurement.lines().count(), 2);
    }
}
