// src/optimization/builder.rs

use crate::error::ModelConstructionError;
use crate::model::catalog::{Period, ProductId};
use crate::model::params::ParameterSet;
use crate::model::schema::{
    DecisionSchema, Domain, LinearExpr, Model, ModelDraft, ObjectiveParts, Relation,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// Whether production rates are known inputs or solved decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductionMode {
    /// Production follows the parameter set's fixed schedule.
    Fixed,
    /// Production is a free non-negative variable.
    Decision,
}

impl fmt::Display for ProductionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductionMode::Fixed => f.write_str("fixed"),
            ProductionMode::Decision => f.write_str("decision"),
        }
    }
}

/// Turns a parameter set into an immutable [`Model`].
///
/// The product `replenishment_count × shipment_size` is expressed exactly
/// by one binary per admissible event count: selecting `k` events routes the
/// period's shipped quantity through `s[k]`, so the count is `Σ k·z[k]` and
/// the shipment size is `Σ s[k]/k`.
pub struct ModelBuilder<'a> {
    params: &'a ParameterSet,
    mode: ProductionMode,
}

fn lookup<K: Ord>(
    table_name: &'static str,
    table: &BTreeMap<K, f64>,
    key: &K,
    label: impl FnOnce() -> String,
) -> Result<f64, ModelConstructionError> {
    table
        .get(key)
        .copied()
        .ok_or_else(|| ModelConstructionError::MissingParameter {
            table: table_name,
            key: label(),
        })
}

fn product_key(product: &ProductId, period: Period) -> (ProductId, Period) {
    (product.clone(), period)
}

impl<'a> ModelBuilder<'a> {
    pub fn new(params: &'a ParameterSet, mode: ProductionMode) -> Self {
        Self { params, mode }
    }

    fn check_shape(&self) -> Result<u32, ModelConstructionError> {
        let catalog = &self.params.catalog;
        if catalog.products.is_empty() {
            return Err(ModelConstructionError::EmptyCatalog("products"));
        }
        if catalog.periods.is_empty() {
            return Err(ModelConstructionError::EmptyCatalog("periods"));
        }
        if catalog.suppliers.is_empty() {
            return Err(ModelConstructionError::EmptyCatalog("suppliers"));
        }
        if !catalog.periods_contiguous() {
            return Err(ModelConstructionError::NonContiguousPeriods(
                catalog.period_indices(),
            ));
        }
        let cap = self.params.replenishment_cap;
        if cap < 0 {
            return Err(ModelConstructionError::NegativeReplenishmentCap(cap));
        }
        u32::try_from(cap).map_err(|_| ModelConstructionError::NegativeReplenishmentCap(cap))
    }

    fn demand(&self, product: &ProductId, period: Period) -> Result<f64, ModelConstructionError> {
        lookup(
            "demand",
            &self.params.demand,
            &product_key(product, period),
            || format!("({}, {})", product, period),
        )
    }

    fn production(
        &self,
        draft: &mut ModelDraft,
        product: &ProductId,
        period: Period,
    ) -> Result<LinearExpr, ModelConstructionError> {
        match self.mode {
            ProductionMode::Fixed => {
                let schedule = self.params.production_schedule.as_ref().ok_or_else(|| {
                    ModelConstructionError::MissingParameter {
                        table: "production_schedule",
                        key: "schedule".to_string(),
                    }
                })?;
                let rate = lookup(
                    "production_schedule",
                    schedule,
                    &product_key(product, period),
                    || format!("({}, {})", product, period),
                )?;
                Ok(LinearExpr::constant(rate))
            }
            ProductionMode::Decision => {
                let p = draft.add_variable(
                    format!("p[{},{}]", product, period),
                    Domain::Continuous,
                    0.0,
                    None,
                );
                Ok(LinearExpr::var(p))
            }
        }
    }

    /// Largest quantity one period can ship.
    ///
    /// Never more than the horizon demand. Under a fixed schedule inventory
    /// stays non-negative only while half the cumulative shipments fit in
    /// cumulative production, which caps period `t` at twice the production
    /// through `t`.
    fn shipment_bound(
        &self,
        product: &ProductId,
        period: Period,
        total_demand: f64,
    ) -> Result<f64, ModelConstructionError> {
        let schedule = match (self.mode, self.params.production_schedule.as_ref()) {
            (ProductionMode::Fixed, Some(schedule)) => schedule,
            _ => return Ok(total_demand),
        };

        let mut produced = 0.0;
        for earlier in self.params.catalog.periods_through(period) {
            produced += lookup(
                "production_schedule",
                schedule,
                &product_key(product, earlier),
                || format!("({}, {})", product, earlier),
            )?;
        }
        Ok(total_demand.min(2.0 * produced))
    }

    pub fn build(&self) -> Result<Model, ModelConstructionError> {
        let cap = self.check_shape()?;
        let params = self.params;
        let catalog = &params.catalog;

        let mut draft = ModelDraft::default();
        let mut schema = DecisionSchema::default();
        let mut objective = ObjectiveParts::default();

        for product in &catalog.products {
            let mut total_demand = 0.0;
            for &period in &catalog.periods {
                total_demand += self.demand(product, period)?;
            }

            for &period in &catalog.periods {
                let key = product_key(product, period);
                let label = || format!("({}, {})", product, period);
                let big_m = self.shipment_bound(product, period, total_demand)?;
                let ordering_cost = lookup("ordering_cost", &params.ordering_cost, &key, label)?;
                let holding_cost = lookup("holding_cost", &params.holding_cost, &key, label)?;

                let mut count = LinearExpr::new();
                let mut size = LinearExpr::new();
                let mut shipped = LinearExpr::new();
                let mut selected = LinearExpr::new();

                for k in 1..=cap {
                    let events = k as f64;
                    let z = draft.add_variable(
                        format!("z[{},{},{}]", product, period, k),
                        Domain::Binary,
                        0.0,
                        Some(1.0),
                    );
                    let s = draft.add_variable(
                        format!("s[{},{},{}]", product, period, k),
                        Domain::Continuous,
                        0.0,
                        Some(big_m),
                    );
                    count.add_term(z, events);
                    selected.add_term(z, 1.0);
                    shipped.add_term(s, 1.0);
                    size.add_term(s, 1.0 / events);

                    draft.add_constraint(
                        format!("event_link[{},{},{}]", product, period, k),
                        LinearExpr::var(s),
                        Relation::Le,
                        LinearExpr::term(z, big_m),
                    );
                }

                if cap > 0 {
                    draft.add_constraint(
                        format!("single_frequency[{},{}]", product, period),
                        selected,
                        Relation::Le,
                        LinearExpr::constant(1.0),
                    );
                    draft.add_constraint(
                        format!("replenishment_cap[{},{}]", product, period),
                        count.clone(),
                        Relation::Le,
                        LinearExpr::constant(cap as f64),
                    );
                }

                objective.ordering.add_scaled(&count, ordering_cost);
                // average inventory of a batch is half its size
                objective.holding.add_scaled(&size, holding_cost / 2.0);

                let production = self.production(&mut draft, product, period)?;
                let inventory = draft.add_variable(
                    format!("Q[{},{}]", product, period),
                    Domain::Continuous,
                    0.0,
                    None,
                );
                objective
                    .inventory
                    .add_term(inventory, params.inventory_carrying_cost);

                schema.replenishment_count.insert(key.clone(), count);
                schema.shipment_size.insert(key.clone(), size);
                schema.shipped.insert(key.clone(), shipped);
                schema.production_rate.insert(key.clone(), production);
                schema.inventory_level.insert(key, LinearExpr::var(inventory));
            }
        }

        self.add_inventory_balance(&mut draft, &schema);
        self.add_procurement(&mut draft, &mut schema, &mut objective)?;
        self.add_demand_coverage(&mut draft, &schema)?;

        info!(
            mode = %self.mode,
            variables = draft.variables.len(),
            constraints = draft.constraints.len(),
            "model built"
        );

        Ok(Model::new(
            self.mode,
            cap,
            draft.variables,
            draft.constraints,
            objective,
            schema,
        ))
    }

    /// Q[t] = Q[t-1] + p[t] - shipped[t]/2, with no Q[0] term in period 1.
    fn add_inventory_balance(&self, draft: &mut ModelDraft, schema: &DecisionSchema) {
        for product in &self.params.catalog.products {
            for &period in &self.params.catalog.periods {
                let key = product_key(product, period);
                let mut rhs = LinearExpr::new();
                let previous = period.previous().map(|t| product_key(product, t));
                if let Some(q_prev) = previous.and_then(|k| schema.inventory_level.get(&k)) {
                    rhs += q_prev;
                }
                if let Some(p) = schema.production_rate.get(&key) {
                    rhs += p;
                }
                if let Some(shipped) = schema.shipped.get(&key) {
                    rhs.add_scaled(shipped, -0.5);
                }
                let lhs = schema.inventory_level.get(&key).cloned().unwrap_or_default();

                draft.add_constraint(
                    format!("inventory_balance[{},{}]", product, period),
                    lhs,
                    Relation::Eq,
                    rhs,
                );
            }
        }
    }

    /// Procurement variables, their cost, and the per-period material balance.
    fn add_procurement(
        &self,
        draft: &mut ModelDraft,
        schema: &mut DecisionSchema,
        objective: &mut ObjectiveParts,
    ) -> Result<(), ModelConstructionError> {
        let params = self.params;
        let catalog = &params.catalog;

        for product in &catalog.products {
            for supplier in &catalog.suppliers {
                for &period in &catalog.periods {
                    let unit_cost = lookup(
                        "procurement_cost",
                        &params.procurement_cost,
                        &(supplier.clone(), period),
                        || format!("({}, {})", supplier, period),
                    )?;
                    let alloc = draft.add_variable(
                        format!("P[{},{},{}]", product, supplier, period),
                        Domain::Continuous,
                        0.0,
                        None,
                    );
                    objective.procurement.add_term(alloc, unit_cost);
                    schema.procurement_alloc.insert(
                        (product.clone(), supplier.clone(), period),
                        LinearExpr::var(alloc),
                    );
                }
            }
        }

        for &period in &catalog.periods {
            let mut sourced = LinearExpr::new();
            let mut produced = LinearExpr::new();
            for product in &catalog.products {
                for supplier in &catalog.suppliers {
                    if let Some(alloc) = schema.procurement_alloc.get(&(
                        product.clone(),
                        supplier.clone(),
                        period,
                    )) {
                        sourced += alloc;
                    }
                }
                if let Some(p) = schema.production_rate.get(&product_key(product, period)) {
                    produced += p;
                }
            }
            draft.add_constraint(
                format!("material_balance[{}]", period),
                sourced,
                Relation::Eq,
                produced,
            );
        }

        Ok(())
    }

    /// Exact fulfilment over the horizon and cumulative no-backlog coverage.
    fn add_demand_coverage(
        &self,
        draft: &mut ModelDraft,
        schema: &DecisionSchema,
    ) -> Result<(), ModelConstructionError> {
        let catalog = &self.params.catalog;

        for product in &catalog.products {
            let mut cumulative_shipped = LinearExpr::new();
            let mut cumulative_demand = 0.0;

            for &period in &catalog.periods {
                if let Some(shipped) = schema.shipped.get(&product_key(product, period)) {
                    cumulative_shipped += shipped;
                }
                cumulative_demand += self.demand(product, period)?;

                draft.add_constraint(
                    format!("no_backlog[{},{}]", product, period),
                    cumulative_shipped.clone(),
                    Relation::Ge,
                    LinearExpr::constant(cumulative_demand),
                );
            }

            debug!(product = %product, total_demand = cumulative_demand, "fulfilment target");
            draft.add_constraint(
                format!("demand_fulfillment[{}]", product),
                cumulative_shipped,
                Relation::Eq,
                LinearExpr::constant(cumulative_demand),
            );
        }

        Ok(())
    }
}
