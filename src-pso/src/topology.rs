use serde::{Deserialize, Serialize};

use crate::error::{PsoError, Result};
use crate::particle::Particle;

/// Neighbourhood structure used to resolve each particle's neighbourhood best.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Topology {
	/// Every particle sees the whole swarm (gbest)
	GlobalBest,
	/// Particles see `radius` neighbours on each side of a ring (lbest)
	Ring { radius: usize },
}

impl Default for Topology {
	fn default() -> Self {
		Topology::GlobalBest
	}
}

fn empty_population() -> PsoError {
	PsoError::InvalidParameter { name: "population_size", value: 0.0, reason: "population is empty" }
}

/// Best personal best among `candidates`, starting from `incumbent`.
///
/// A candidate replaces the current best only when strictly better, so
/// `incumbent` survives ties.
fn best_from(particles: &[Particle], incumbent: usize, candidates: &[usize]) -> Result<usize> {
	let mut best = incumbent;
	for &j in candidates {
		if particles[j].best_fitness().is_better_than(&particles[best].best_fitness())? {
			best = j;
		}
	}
	Ok(best)
}

impl Topology {
	/// Indices visible from particle `index`, in scan order
	fn window(&self, n: usize, index: usize) -> Vec<usize> {
		match *self {
			Topology::GlobalBest => (0..n).collect(),
			Topology::Ring { radius } => {
				let width = (2 * radius + 1).min(n);
				let start = (index + n - radius % n) % n;
				(0..width).map(|k| (start + k) % n).collect()
			}
		}
	}

	/// Neighbourhood best of particle `index` from a fresh scan; the
	/// earliest candidate in scan order wins ties.
	pub fn neighbourhood_best(&self, particles: &[Particle], index: usize) -> Result<usize> {
		let window = self.window(particles.len(), index);
		let first = *window.first().ok_or_else(empty_population)?;
		best_from(particles, first, &window)
	}

	/// Neighbourhood best of particle `index`, keeping the one it already
	/// references unless a neighbour is strictly better. A stored reference
	/// that left the ring window is dropped.
	pub fn update_neighbourhood_best(&self, particles: &[Particle], index: usize) -> Result<usize> {
		let window = self.window(particles.len(), index);
		let first = *window.first().ok_or_else(empty_population)?;
		let stored = particles[index].neighbourhood_best();
		let incumbent = if window.contains(&stored) { stored } else { first };
		best_from(particles, incumbent, &window)
	}

	/// Resolve every particle's neighbourhood best from scratch
	pub fn initialise(&self, particles: &mut [Particle]) -> Result<()> {
		for i in 0..particles.len() {
			let best = self.neighbourhood_best(particles, i)?;
			particles[i].set_neighbourhood_best(best);
		}
		Ok(())
	}

	/// Refresh every particle's neighbourhood best, incumbents surviving ties
	pub fn assign(&self, particles: &mut [Particle]) -> Result<()> {
		for i in 0..particles.len() {
			let best = self.update_neighbourhood_best(particles, i)?;
			particles[i].set_neighbourhood_best(best);
		}
		Ok(())
	}
}
