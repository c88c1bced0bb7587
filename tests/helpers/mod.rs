// tests/helpers/mod.rs
// Shared fixtures for the integration tests.

#![allow(dead_code)]

use carbon_lot_sizing::model::params::{product_table, supplier_table};
use carbon_lot_sizing::model::schema::Model;
use carbon_lot_sizing::solver::implementations::MicroLpBackend;
use carbon_lot_sizing::{Assignment, Catalog, ParameterSet, SolverBackend, SolverFailure};
use std::cell::Cell;

/// Two products, two suppliers, three periods; feasible in both modes.
pub fn reference_params() -> ParameterSet {
    let catalog = Catalog::with_horizon(&["P1", "P2"], 3, &["B1", "B2"]);
    let demand = product_table(&catalog, |p, t| {
        let row = match p.0.as_str() {
            "P1" => [60.0, 55.0, 50.0],
            _ => [50.0, 60.0, 55.0],
        };
        row[(t.0 - 1) as usize]
    });
    let procurement_cost = supplier_table(&catalog, |s, t| {
        let base = if s.0 == "B1" { 400.0 } else { 430.0 };
        base + 20.0 * (t.0 - 1) as f64
    });
    let transport_emission = supplier_table(&catalog, |s, t| {
        let base = if s.0 == "B1" { 40.0 } else { 35.0 };
        base - 2.0 * (t.0 - 1) as f64
    });

    ParameterSet {
        demand,
        ordering_cost: product_table(&catalog, |_, _| 20.0),
        holding_cost: product_table(&catalog, |_, _| 10.0),
        procurement_cost,
        transport_emission,
        production_emission: product_table(&catalog, |_, _| 0.08),
        inventory_carrying_cost: 5.0,
        production_schedule: Some(product_table(&catalog, |_, t| 30.0 + 5.0 * t.0 as f64)),
        replenishment_cap: 10,
        catalog,
    }
}

/// Delegates to the bundled backend and counts solve calls.
#[derive(Debug, Default)]
pub struct CountingBackend {
    inner: MicroLpBackend,
    calls: Cell<usize>,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl SolverBackend for CountingBackend {
    fn name(&self) -> &str {
        "counting"
    }

    fn solve(&self, model: &Model) -> Result<Assignment, SolverFailure> {
        self.calls.set(self.calls.get() + 1);
        self.inner.solve(model)
    }
}
