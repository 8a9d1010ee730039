use std::sync::Arc;

use ndarray::Array1;

use crate::bounds::Bounds;
use crate::error::Result;
use crate::objective::Minimise;
use crate::{ParticleSwarm, PsoConfig, PsoReport};

/// Convenience function mirroring SciPy's API shape (simplified):
/// - `func`: objective function mapping x -> f(x), minimised
/// - `bounds`: vector of (lower, upper) pairs
/// - `config`: PSO configuration
pub fn particle_swarm<F>(func: F, bounds: &[(f64, f64)], config: PsoConfig) -> Result<PsoReport>
where
	F: Fn(&Array1<f64>) -> f64 + Send + Sync + 'static,
{
	let bounds = Bounds::from_pairs(bounds)?;
	ParticleSwarm::with_config(Arc::new(Minimise(func)), bounds, config).solve()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{PsoConfigBuilder, PsoError};

	#[test]
	fn test_rejects_inverted_bounds() {
		let err = particle_swarm(|x: &Array1<f64>| x[0], &[(1.0, -1.0)], PsoConfig::default()).unwrap_err();
		assert!(matches!(err, PsoError::InvalidBounds { dimension: 0, .. }));
	}

	#[test]
	fn test_fixed_dimension_stays_put() {
		let config = PsoConfigBuilder::new().seed(5).popsize(8).maxiter(30).build();
		let report = particle_swarm(
			|x: &Array1<f64>| x.iter().map(|v| v * v).sum(),
			&[(-2.0, 2.0), (0.5, 0.5)],
			config,
		)
		.unwrap();
		assert_eq!(report.x[1], 0.5);
		assert!(report.success);
		assert_eq!(report.nit, 30);
	}
}
