// src/solver/implementations.rs

use crate::model::schema::{Domain, LinearExpr, Model, Relation};
use crate::solver::traits::{Assignment, FailureReason, SolverBackend, SolverFailure};
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};
use tracing::{debug, info};

// =========================================================================
// 1. MicroLP (pure Rust branch-and-bound via good_lp)
// =========================================================================

/// Mixed-integer linear backend built on good_lp's `microlp` solver.
#[derive(Debug, Clone, Default)]
pub struct MicroLpBackend;

impl MicroLpBackend {
    pub fn new() -> Self {
        Self
    }
}

fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Expression {
    let mut out = Expression::default();
    for &(id, coefficient) in expr.terms() {
        out += vars[id.index()] * coefficient;
    }
    out
}

fn map_resolution_error(err: ResolutionError) -> SolverFailure {
    match err {
        ResolutionError::Infeasible => {
            SolverFailure::new(
                FailureReason::Infeasible,
                "no point satisfies every constraint",
            )
        }
        ResolutionError::Unbounded => {
            SolverFailure::new(
                FailureReason::Unbounded,
                "objective decreases without bound",
            )
        }
        other => SolverFailure::new(FailureReason::NonConvergent, other.to_string()),
    }
}

impl SolverBackend for MicroLpBackend {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, model: &Model) -> Result<Assignment, SolverFailure> {
        let mut problem = ProblemVariables::new();
        let vars: Vec<Variable> = model
            .variables()
            .iter()
            .map(|def| {
                let mut definition = variable().min(def.lower).name(def.name.clone());
                if let Some(upper) = def.upper {
                    definition = definition.max(upper);
                }
                definition = match def.domain {
                    Domain::Continuous => definition,
                    Domain::Integer => definition.integer(),
                    Domain::Binary => definition.binary(),
                };
                problem.add(definition)
            })
            .collect();

        let mut solver = problem
            .minimise(to_expression(model.objective(), &vars))
            .using(good_lp::microlp);

        for c in model.constraints() {
            let lhs = to_expression(&c.expr, &vars);
            let con = match c.relation {
                Relation::Eq => constraint::eq(lhs, c.rhs),
                Relation::Le => constraint::leq(lhs, c.rhs),
                Relation::Ge => constraint::geq(lhs, c.rhs),
            };
            solver = solver.with(con);
        }

        debug!(
            variables = vars.len(),
            constraints = model.constraints().len(),
            "handing model to microlp"
        );

        let solution = solver.solve().map_err(map_resolution_error)?;
        let values: Vec<f64> = vars.iter().map(|v| solution.value(*v)).collect();
        let assignment = Assignment::from_values(model, values);

        info!(objective = assignment.objective(), "microlp solved model");
        Ok(assignment)
    }
}

// =========================================================================
// 2. Backend selection
// =========================================================================

/// Names accepted by [`backend_by_name`].
pub const AVAILABLE_BACKENDS: &[&str] = &["microlp"];

/// Resolves a backend by name; unknown names are unavailable backends.
pub fn backend_by_name(name: &str) -> Result<Box<dyn SolverBackend>, SolverFailure> {
    match name.to_ascii_lowercase().as_str() {
        "microlp" => Ok(Box::new(MicroLpBackend::new())),
        other => Err(SolverFailure::new(
            FailureReason::BackendUnavailable,
            format!(
                "no backend named '{}' (available: {})",
                other,
                AVAILABLE_BACKENDS.join(", ")
            ),
        )),
    }
}
