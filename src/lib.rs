//! Multi-period production, inventory and procurement planning with
//! transport and production carbon accounting.
//!
//! A run validates a [`ParameterSet`], builds an immutable [`Model`] for the
//! chosen [`ProductionMode`], hands it once to a [`SolverBackend`], and reads
//! the [`Assignment`] back into a [`PlanReport`].

pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod optimization;
pub mod planning;
pub mod solver;

pub use error::{ConfigurationError, ExtractionError, ModelConstructionError, PlanError};
pub use model::catalog::{Catalog, Period, ProductId, SupplierId};
pub use model::params::ParameterSet;
pub use model::schema::Model;
pub use optimization::builder::{ModelBuilder, ProductionMode};
pub use optimization::extract::{PlanReport, ResultExtractor};
pub use planning::config::PlanConfig;
pub use planning::engine::Planner;
pub use solver::traits::{Assignment, FailureReason, SolverBackend, SolverFailure};
