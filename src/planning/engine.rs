// src/planning/engine.rs

use crate::error::PlanError;
use crate::model::params::ParameterSet;
use crate::optimization::audit::audit;
use crate::optimization::builder::{ModelBuilder, ProductionMode};
use crate::optimization::extract::{PlanReport, ResultExtractor};
use crate::solver::traits::SolverBackend;
use tracing::{info, warn};

/// Relative tolerance used when re-checking solved plans.
pub const DEFAULT_AUDIT_TOLERANCE: f64 = 1e-5;

/// Runs one optimization: validate, build, solve once, extract.
///
/// Any failure ends the run; no partial report is produced.
pub struct Planner<'a> {
    backend: &'a dyn SolverBackend,
    audit_tolerance: f64,
}

/// Both production variants solved on the same parameter set.
#[derive(Debug, Clone)]
pub struct ModeComparison {
    pub fixed: PlanReport,
    pub decision: PlanReport,
}

impl ModeComparison {
    /// Cost saved by letting production float; never meaningfully negative.
    pub fn objective_gap(&self) -> f64 {
        self.fixed.objective - self.decision.objective
    }
}

impl<'a> Planner<'a> {
    pub fn new(backend: &'a dyn SolverBackend) -> Self {
        Self {
            backend,
            audit_tolerance: DEFAULT_AUDIT_TOLERANCE,
        }
    }

    pub fn with_audit_tolerance(mut self, tolerance: f64) -> Self {
        self.audit_tolerance = tolerance;
        self
    }

    pub fn run(
        &self,
        params: &ParameterSet,
        mode: ProductionMode,
    ) -> Result<PlanReport, PlanError> {
        params.validate(mode)?;

        let model = ModelBuilder::new(params, mode).build()?;

        info!(backend = self.backend.name(), mode = %mode, "solving model");
        let assignment = self.backend.solve(&model).inspect_err(|failure| {
            warn!(reason = %failure.reason, detail = %failure.detail, "solve failed");
        })?;

        let report = ResultExtractor::new(params, &model).extract(&assignment)?;

        for violation in audit(&report, self.audit_tolerance) {
            warn!(%violation, "solved plan violates an invariant");
        }

        info!(
            objective = report.objective,
            transport_emission = report.transport_emission,
            production_emission = report.production_emission,
            "plan ready"
        );
        Ok(report)
    }

    pub fn compare_modes(&self, params: &ParameterSet) -> Result<ModeComparison, PlanError> {
        let fixed = self.run(params, ProductionMode::Fixed)?;
        let decision = self.run(params, ProductionMode::Decision)?;

        let comparison = ModeComparison { fixed, decision };
        info!(
            gap = comparison.objective_gap(),
            "production modes compared"
        );
        Ok(comparison)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;
    use crate::model::catalog::Period;
    use crate::model::params::tests::reference_params;
    use crate::model::schema::Model;
    use crate::solver::implementations::MicroLpBackend;
    use crate::solver::traits::{Assignment, FailureReason, SolverFailure};

    #[test]
    fn test_run_produces_audited_report() {
        crate::logging::init_test();
        let backend = MicroLpBackend::new();
        let report = Planner::new(&backend)
            .run(&reference_params(), ProductionMode::Fixed)
            .unwrap();

        assert_eq!(report.mode, ProductionMode::Fixed);
        assert_eq!(audit(&report, 1e-5), vec![]);
        let breakdown_gap = (report.costs.total() - report.objective).abs();
        assert!(breakdown_gap < 1e-6 * report.objective);
    }

    #[test]
    fn test_configuration_error_stops_before_build() {
        let mut params = reference_params();
        params.catalog.periods = vec![Period(1), Period(3)];

        let backend = MicroLpBackend::new();
        let err = Planner::new(&backend)
            .run(&params, ProductionMode::Decision)
            .unwrap_err();
        assert!(matches!(
            err,
            PlanError::Configuration(ConfigurationError::NonContiguousPeriods(_))
        ));
    }

    #[test]
    fn test_negative_cap_is_a_construction_error() {
        let mut params = reference_params();
        params.replenishment_cap = -3;

        let backend = MicroLpBackend::new();
        let err = Planner::new(&backend)
            .run(&params, ProductionMode::Fixed)
            .unwrap_err();
        assert!(matches!(err, PlanError::ModelConstruction(_)));
    }

    #[derive(Debug)]
    struct Unavailable;

    impl SolverBackend for Unavailable {
        fn name(&self) -> &str {
            "unavailable"
        }

        fn solve(&self, _model: &Model) -> Result<Assignment, SolverFailure> {
            Err(SolverFailure::new(
                FailureReason::BackendUnavailable,
                "offline",
            ))
        }
    }

    #[test]
    fn test_solver_failure_is_surfaced_verbatim() {
        let err = Planner::new(&Unavailable)
            .run(&reference_params(), ProductionMode::Fixed)
            .unwrap_err();

        match err {
            PlanError::Solver(failure) => {
                assert_eq!(failure.reason, FailureReason::BackendUnavailable);
                assert_eq!(failure.detail, "offline");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
