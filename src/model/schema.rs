// src/model/schema.rs

//! Immutable description of a built optimization model.
//!
//! The builder declares variables and constraints here; a solver backend
//! reads them and hands back one value per declared variable.

use crate::model::catalog::{Period, ProductId, SupplierId};
use crate::optimization::builder::ProductionMode;
use std::collections::BTreeMap;
use std::ops::{AddAssign, SubAssign};

/// Position of a variable in `Model::variables`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Continuous,
    Integer,
    Binary,
}

impl Domain {
    pub fn is_integral(self) -> bool {
        !matches!(self, Domain::Continuous)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    pub domain: Domain,
    pub lower: f64,
    pub upper: Option<f64>,
}

/// `Σ coefficient · variable + constant`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn var(id: VarId) -> Self {
        Self::term(id, 1.0)
    }

    pub fn term(id: VarId, coefficient: f64) -> Self {
        Self {
            terms: vec![(id, coefficient)],
            constant: 0.0,
        }
    }

    pub fn add_term(&mut self, id: VarId, coefficient: f64) {
        match self.terms.iter_mut().find(|(v, _)| *v == id) {
            Some((_, c)) => *c += coefficient,
            None => self.terms.push((id, coefficient)),
        }
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// `self += factor · other`
    pub fn add_scaled(&mut self, other: &LinearExpr, factor: f64) {
        for &(id, c) in &other.terms {
            self.add_term(id, c * factor);
        }
        self.constant += other.constant * factor;
    }

    pub fn scaled(&self, factor: f64) -> LinearExpr {
        let mut out = LinearExpr::new();
        out.add_scaled(self, factor);
        out
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn constant_part(&self) -> f64 {
        self.constant
    }

    /// True when the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.iter().all(|(_, c)| *c == 0.0)
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(id, c)| c * values.get(id.0).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }
}

impl AddAssign<&LinearExpr> for LinearExpr {
    fn add_assign(&mut self, rhs: &LinearExpr) {
        self.add_scaled(rhs, 1.0);
    }
}

impl SubAssign<&LinearExpr> for LinearExpr {
    fn sub_assign(&mut self, rhs: &LinearExpr) {
        self.add_scaled(rhs, -1.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

/// `expr (relation) rhs` with every constant moved to the right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDef {
    pub name: String,
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl ConstraintDef {
    pub fn new(
        name: impl Into<String>,
        lhs: LinearExpr,
        relation: Relation,
        rhs: LinearExpr,
    ) -> Self {
        let mut expr = lhs;
        expr -= &rhs;
        let rhs = -expr.constant;
        expr.constant = 0.0;
        Self {
            name: name.into(),
            expr,
            relation,
            rhs,
        }
    }

    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.relation {
            Relation::Eq => (lhs - self.rhs).abs() <= tolerance,
            Relation::Le => lhs <= self.rhs + tolerance,
            Relation::Ge => lhs >= self.rhs - tolerance,
        }
    }
}

pub type ProductPeriodExprs = BTreeMap<(ProductId, Period), LinearExpr>;

/// Where each named decision of the problem lives in the variable vector.
///
/// Some decisions are plain variables, others are expressions over
/// auxiliary variables (replenishment count and shipment size) or constants
/// (production rate in fixed mode).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionSchema {
    pub replenishment_count: ProductPeriodExprs,
    pub shipment_size: ProductPeriodExprs,
    pub shipped: ProductPeriodExprs,
    pub production_rate: ProductPeriodExprs,
    pub inventory_level: ProductPeriodExprs,
    pub procurement_alloc: BTreeMap<(ProductId, SupplierId, Period), LinearExpr>,
}

/// Objective components, kept apart so a report can break the total down.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectiveParts {
    pub ordering: LinearExpr,
    pub holding: LinearExpr,
    pub procurement: LinearExpr,
    pub inventory: LinearExpr,
}

impl ObjectiveParts {
    pub fn total(&self) -> LinearExpr {
        let mut total = self.ordering.clone();
        total += &self.holding;
        total += &self.procurement;
        total += &self.inventory;
        total
    }
}

/// A minimization model, immutable once built.
#[derive(Debug, Clone)]
pub struct Model {
    mode: ProductionMode,
    replenishment_cap: u32,
    variables: Vec<VariableDef>,
    constraints: Vec<ConstraintDef>,
    objective: LinearExpr,
    objective_parts: ObjectiveParts,
    schema: DecisionSchema,
}

impl Model {
    pub(crate) fn new(
        mode: ProductionMode,
        replenishment_cap: u32,
        variables: Vec<VariableDef>,
        constraints: Vec<ConstraintDef>,
        objective_parts: ObjectiveParts,
        schema: DecisionSchema,
    ) -> Self {
        Self {
            mode,
            replenishment_cap,
            variables,
            constraints,
            objective: objective_parts.total(),
            objective_parts,
            schema,
        }
    }

    pub fn mode(&self) -> ProductionMode {
        self.mode
    }

    pub fn replenishment_cap(&self) -> u32 {
        self.replenishment_cap
    }

    pub fn variables(&self) -> &[VariableDef] {
        &self.variables
    }

    pub fn constraints(&self) -> &[ConstraintDef] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn objective_parts(&self) -> &ObjectiveParts {
        &self.objective_parts
    }

    pub fn schema(&self) -> &DecisionSchema {
        &self.schema
    }

    /// Number of constraints of one family, e.g. `"no_backlog"`.
    pub fn constraint_count(&self, family: &str) -> usize {
        self.constraints
            .iter()
            .filter(|c| c.name.split('[').next() == Some(family))
            .count()
    }

    /// Names of constraints the given values violate.
    pub fn violated_constraints(&self, values: &[f64], tolerance: f64) -> Vec<&str> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied(values, tolerance))
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Accumulates variables and constraints before they are frozen into a [`Model`].
#[derive(Debug, Default)]
pub(crate) struct ModelDraft {
    pub variables: Vec<VariableDef>,
    pub constraints: Vec<ConstraintDef>,
}

impl ModelDraft {
    pub fn add_variable(
        &mut self,
        name: String,
        domain: Domain,
        lower: f64,
        upper: Option<f64>,
    ) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(VariableDef {
            name,
            domain,
            lower,
            upper,
        });
        id
    }

    pub fn add_constraint(
        &mut self,
        name: String,
        lhs: LinearExpr,
        relation: Relation,
        rhs: LinearExpr,
    ) {
        self.constraints.push(ConstraintDef::new(name, lhs, relation, rhs));
    }
}
