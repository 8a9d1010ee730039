use ndarray::Array1;

use crate::bounds::Bounds;
use crate::error::{PsoError, Result};
use crate::fitness::Fitness;

/// A candidate solution with its velocity and best-found memory.
///
/// Position, velocity and best position share one dimension, fixed at
/// construction; every setter rejects vectors of another length.
#[derive(Debug, Clone)]
pub struct Particle {
	position: Array1<f64>,
	velocity: Array1<f64>,
	best_position: Array1<f64>,
	best_fitness: Fitness,
	fitness: Fitness,
	/// index of the neighbourhood best within the owning population
	neighbourhood_best: usize,
}

impl Particle {
	/// Unevaluated particle: both fitness values start as `Inferior`
	pub fn new(position: Array1<f64>, velocity: Array1<f64>) -> Result<Self> {
		if velocity.len() != position.len() {
			return Err(PsoError::DimensionMismatch {
				what: "velocity",
				expected: position.len(),
				found: velocity.len(),
			});
		}
		Ok(Self {
			best_position: position.clone(),
			position,
			velocity,
			best_fitness: Fitness::Inferior,
			fitness: Fitness::Inferior,
			neighbourhood_best: 0,
		})
	}

	pub fn dimension(&self) -> usize {
		self.position.len()
	}

	pub fn position(&self) -> &Array1<f64> {
		&self.position
	}

	pub fn velocity(&self) -> &Array1<f64> {
		&self.velocity
	}

	pub fn best_position(&self) -> &Array1<f64> {
		&self.best_position
	}

	pub fn best_fitness(&self) -> Fitness {
		self.best_fitness
	}

	pub fn fitness(&self) -> Fitness {
		self.fitness
	}

	pub fn neighbourhood_best(&self) -> usize {
		self.neighbourhood_best
	}

	pub(crate) fn set_neighbourhood_best(&mut self, index: usize) {
		self.neighbourhood_best = index;
	}

	fn check(&self, what: &'static str, found: usize) -> Result<()> {
		if found != self.dimension() {
			return Err(PsoError::DimensionMismatch { what, expected: self.dimension(), found });
		}
		Ok(())
	}

	pub fn set_velocity(&mut self, velocity: Array1<f64>) -> Result<()> {
		self.check("velocity", velocity.len())?;
		self.velocity = velocity;
		Ok(())
	}

	pub fn set_position(&mut self, position: Array1<f64>) -> Result<()> {
		self.check("position", position.len())?;
		self.position = position;
		Ok(())
	}

	/// Replace the current fitness after a re-evaluation
	pub fn set_fitness(&mut self, fitness: Fitness) {
		self.fitness = fitness;
	}

	/// `position += velocity`, then clip into the domain
	pub fn advance(&mut self, bounds: &Bounds) -> Result<()> {
		bounds.check_dimension("particle", self.dimension())?;
		self.position += &self.velocity;
		bounds.clamp_inplace(&mut self.position)
	}

	/// Adopt the current position as personal best on strict improvement only.
	pub fn update_personal_best(&mut self) -> Result<bool> {
		if self.fitness.is_better_than(&self.best_fitness)? {
			self.best_fitness = self.fitness;
			self.best_position.assign(&self.position);
			return Ok(true);
		}
		Ok(false)
	}
}
