// src/solver/traits.rs

use crate::model::schema::{LinearExpr, Model};
use std::fmt;
use thiserror::Error;

/// Why a solve attempt produced no assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    Infeasible,
    NonConvergent,
    Unbounded,
    BackendUnavailable,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::Infeasible => "infeasible",
            FailureReason::NonConvergent => "non-convergent",
            FailureReason::Unbounded => "unbounded",
            FailureReason::BackendUnavailable => "backend unavailable",
        };
        f.write_str(text)
    }
}

/// A failed solve, surfaced to the caller as is.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason}: {detail}")]
pub struct SolverFailure {
    pub reason: FailureReason,
    pub detail: String,
}

impl SolverFailure {
    pub fn new(reason: FailureReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

/// Values of every model variable after a successful solve.
///
/// Only a solver backend creates one, so holding an `Assignment`
/// means the solve succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    objective: f64,
    values: Vec<f64>,
}

impl Assignment {
    /// Snaps integral variables and evaluates the objective on the result.
    pub fn from_values(model: &Model, mut values: Vec<f64>) -> Self {
        for (value, def) in values.iter_mut().zip(model.variables()) {
            if def.domain.is_integral() {
                *value = value.round();
            }
            if *value < def.lower {
                *value = def.lower;
            }
        }
        let objective = model.objective().evaluate(&values);
        Self { objective, values }
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_of(&self, expr: &LinearExpr) -> f64 {
        expr.evaluate(&self.values)
    }
}

/// A numeric backend that solves a built model once.
///
/// Implementations own any timeout or cancellation policy; the caller
/// never retries.
pub trait SolverBackend: fmt::Debug {
    fn name(&self) -> &str;

    fn solve(&self, model: &Model) -> Result<Assignment, SolverFailure>;
}
