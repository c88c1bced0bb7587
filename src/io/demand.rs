// src/io/demand.rs

use crate::error::ConfigurationError;
use crate::model::catalog::Catalog;
use crate::model::params::{product_table, ProductPeriodTable};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Generates the same demand for every (product, period).
pub fn generate_constant_demand(catalog: &Catalog, value: f64) -> ProductPeriodTable {
    product_table(catalog, |_, _| value)
}

/// Draws one demand per (product, period) from a Normal distribution.
///
/// The generator is seeded, so the same seed always yields the same table.
/// Draws are taken product by product, period by period, truncated toward
/// zero and clamped at 0 (demand cannot be negative).
///
/// # Arguments
/// * `mean` - Average demand per period (e.g., 50.0).
/// * `std_dev` - Spread of the demand (e.g., 10.0).
/// * `seed` - Seed of the random stream.
pub fn generate_normal_demand(
    catalog: &Catalog,
    mean: f64,
    std_dev: f64,
    seed: u64,
) -> Result<ProductPeriodTable, ConfigurationError> {
    if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
        return Err(ConfigurationError::InvalidDistribution(format!(
            "demand needs a finite mean and a non-negative spread, got mean {} and std_dev {}",
            mean, std_dev
        )));
    }
    let normal = Normal::new(mean, std_dev)
        .map_err(|e| ConfigurationError::InvalidDistribution(e.to_string()))?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    Ok(product_table(catalog, |_, _| {
        let val: f64 = normal.sample(&mut rng);
        val.trunc().max(0.0)
    }))
}
