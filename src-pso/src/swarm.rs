use std::sync::Arc;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::control::MaxVelocity;
use crate::error::{PsoError, Result};
use crate::fitness::Fitness;
use crate::guide::{GuideContext, GuideSelectionStrategy};
use crate::knowledge::Published;
use crate::objective::Objective;
use crate::parallel_eval::{ParallelConfig, evaluate_positions};
use crate::particle::Particle;
use crate::random::RandomSource;
use crate::topology::Topology;
use crate::velocity::{ControlContext, VelocityContext, VelocityUpdateStrategy};
use crate::velocity_gc::{GC_DEFAULT_MAX_VELOCITY, GcParameters, GcVelocityUpdate};
use crate::velocity_standard::StandardVelocityUpdate;
use crate::PsoConfig;

/// When particle updates become visible to the rest of the swarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IterationPolicy {
	/// All velocities, then all moves, then all evaluations, then all bests
	Synchronous,
	/// Each particle completes its update before the next one starts
	Asynchronous,
}

impl Default for IterationPolicy {
	fn default() -> Self {
		IterationPolicy::Synchronous
	}
}

/// Initial velocity of freshly created particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VelocityInit {
	Zero,
	/// uniform in +/-10% of each dimension's span
	Random,
}

impl Default for VelocityInit {
	fn default() -> Self {
		VelocityInit::Zero
	}
}

/// Serializable choice of velocity update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VelocityPolicy {
	Standard,
	GuaranteedConvergence(GcParameters),
}

impl Default for VelocityPolicy {
	fn default() -> Self {
		VelocityPolicy::Standard
	}
}

/// Build the prototype velocity strategy described by `config`
pub fn build_velocity_strategy(config: &PsoConfig, random: RandomSource) -> Result<VelocityUpdateStrategy> {
	let standard = StandardVelocityUpdate::new(random)
		.with_inertia(config.inertia.clone())
		.with_cognitive(config.cognitive.clone())
		.with_social(config.social.clone())
		.with_max_velocity(config.max_velocity.clone());
	Ok(match &config.velocity {
		VelocityPolicy::Standard => VelocityUpdateStrategy::Standard(standard),
		VelocityPolicy::GuaranteedConvergence(params) => {
			// an unset vMax falls back to the GC default
			let standard = if config.max_velocity == MaxVelocity::default() {
				standard.with_max_velocity(MaxVelocity::broadcast(GC_DEFAULT_MAX_VELOCITY))
			} else {
				standard
			};
			VelocityUpdateStrategy::GuaranteedConvergence(GcVelocityUpdate::with_parameters(standard, params)?)
		}
	})
}

/// One population: particles, their per-particle strategies and the
/// objective they are evaluated on.
pub struct Swarm {
	objective: Arc<dyn Objective>,
	bounds: Bounds,
	particles: Vec<Particle>,
	velocity: Vec<VelocityUpdateStrategy>,
	guides: Vec<GuideSelectionStrategy>,
	topology: Topology,
	policy: IterationPolicy,
	parallel: ParallelConfig,
	best_index: usize,
	iteration: usize,
	max_iterations: usize,
	nfev: usize,
	population_index: usize,
}

impl Swarm {
	/// Create, evaluate and rank a new population.
	///
	/// Every particle gets its own duplicate of the configured velocity and
	/// guide strategies; all of them draw from `random`.
	pub fn new(objective: Arc<dyn Objective>, bounds: Bounds, config: &PsoConfig, random: RandomSource) -> Result<Self> {
		let n = bounds.dimension();
		if n == 0 {
			return Err(PsoError::DimensionMismatch { what: "bounds", expected: 1, found: 0 });
		}
		if config.popsize == 0 {
			return Err(PsoError::InvalidParameter {
				name: "popsize",
				value: 0.0,
				reason: "population needs at least one particle",
			});
		}
		if let MaxVelocity::PerDimension(v) = &config.max_velocity {
			if v.len() != n {
				return Err(PsoError::DimensionMismatch { what: "vmax", expected: n, found: v.len() });
			}
		}

		let velocity_prototype = build_velocity_strategy(config, random.clone())?;
		let guide_prototype = GuideSelectionStrategy::from_policy(config.guide, random.clone());

		let mut particles = Vec::with_capacity(config.popsize);
		for _ in 0..config.popsize {
			let position = bounds.sample(&random);
			let velocity = match config.velocity_init {
				VelocityInit::Zero => Array1::zeros(n),
				VelocityInit::Random => {
					Array1::from_shape_fn(n, |i| (2.0 * random.uniform() - 1.0) * 0.1 * bounds.span(i))
				}
			};
			particles.push(Particle::new(position, velocity)?);
		}

		let mut swarm = Self {
			objective,
			bounds,
			velocity: (0..config.popsize).map(|_| velocity_prototype.duplicate()).collect(),
			guides: (0..config.popsize).map(|_| guide_prototype.duplicate()).collect(),
			particles,
			topology: config.topology,
			policy: config.iteration,
			parallel: config.parallel.clone(),
			best_index: 0,
			iteration: 0,
			max_iterations: config.maxiter,
			nfev: 0,
			population_index: 0,
		};
		swarm.evaluate_all()?;
		swarm.topology.initialise(&mut swarm.particles)?;
		swarm.refresh_best()?;
		log::debug!(
			"swarm initialised: {} particles, {} dimensions, best={:?}",
			swarm.particles.len(),
			n,
			swarm.best_fitness()
		);
		Ok(swarm)
	}

	pub(crate) fn set_population_index(&mut self, index: usize) {
		self.population_index = index;
	}

	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}
	pub fn bounds(&self) -> &Bounds {
		&self.bounds
	}
	pub fn iteration(&self) -> usize {
		self.iteration
	}
	pub fn nfev(&self) -> usize {
		self.nfev
	}
	pub fn policy(&self) -> IterationPolicy {
		self.policy
	}
	pub fn best_index(&self) -> usize {
		self.best_index
	}
	pub fn best_particle(&self) -> &Particle {
		&self.particles[self.best_index]
	}
	pub fn best_position(&self) -> &Array1<f64> {
		self.best_particle().best_position()
	}
	pub fn best_fitness(&self) -> Fitness {
		self.best_particle().best_fitness()
	}

	/// GC radius of the strategy owned by the current best particle
	pub fn rho(&self) -> Option<f64> {
		self.velocity[self.best_index].rho()
	}

	/// Entry this population exposes on the knowledge board
	pub fn publish(&self) -> Published {
		Published {
			position: self.best_position().clone(),
			fitness: self.best_fitness(),
			iteration: self.iteration,
		}
	}

	fn checked(fitness: Fitness, index: usize) -> Result<Fitness> {
		match fitness.value() {
			Some(v) if v.is_nan() => Err(PsoError::NonFinite { what: "fitness", index }),
			_ => Ok(fitness),
		}
	}

	fn evaluate_all(&mut self) -> Result<()> {
		let positions: Vec<&Array1<f64>> = self.particles.iter().map(|p| p.position()).collect();
		let fitness = evaluate_positions(&positions, self.objective.as_ref(), &self.parallel);
		self.nfev += fitness.len();
		for (i, f) in fitness.into_iter().enumerate() {
			self.particles[i].set_fitness(Self::checked(f, i)?);
			self.particles[i].update_personal_best()?;
		}
		Ok(())
	}

	fn evaluate_one(&mut self, i: usize) -> Result<()> {
		let f = self.objective.evaluate(self.particles[i].position());
		self.nfev += 1;
		self.particles[i].set_fitness(Self::checked(f, i)?);
		self.particles[i].update_personal_best()?;
		Ok(())
	}

	/// Keep the incumbent best unless another particle is strictly better
	fn refresh_best(&mut self) -> Result<()> {
		let mut best = self.best_index;
		for j in 0..self.particles.len() {
			if self.particles[j].best_fitness().is_better_than(&self.particles[best].best_fitness())? {
				best = j;
			}
		}
		self.best_index = best;
		Ok(())
	}

	/// Neighbourhood-best position and guide of particle `i` under the current state
	fn resolve_guide(&self, i: usize, board: Option<&[Arc<Published>]>) -> Result<(Array1<f64>, Array1<f64>)> {
		let nbest = self.particles[self.particles[i].neighbourhood_best()].best_position().clone();
		let ctx = GuideContext {
			neighbourhood_best: &nbest,
			populations: board,
			population_index: self.population_index,
		};
		let guide = self.guides[i].select_guide(&self.particles[i], &ctx)?;
		Ok((nbest, guide))
	}

	fn control_update(&mut self, i: usize, tracked: usize, iteration: usize) -> Result<()> {
		let ctx = ControlContext {
			is_tracked_best: i == tracked,
			iteration,
			max_iterations: self.max_iterations,
			bounds: &self.bounds,
		};
		self.velocity[i].update_control_parameters(&self.particles[i], &ctx)
	}

	/// Run one iteration under the configured policy.
	///
	/// `board` is the snapshot of published sub-population bests; it is only
	/// consulted by VEPSO guide selection.
	pub fn step(&mut self, board: Option<&[Arc<Published>]>) -> Result<()> {
		let iteration = self.iteration + 1;
		match self.policy {
			IterationPolicy::Synchronous => self.step_synchronous(board, iteration)?,
			IterationPolicy::Asynchronous => self.step_asynchronous(board, iteration)?,
		}
		self.iteration = iteration;
		Ok(())
	}

	fn step_synchronous(&mut self, board: Option<&[Arc<Published>]>, iteration: usize) -> Result<()> {
		let n = self.particles.len();
		let tracked = self.best_index;
		self.topology.assign(&mut self.particles)?;

		let mut targets = Vec::with_capacity(n);
		for i in 0..n {
			targets.push(self.resolve_guide(i, board)?);
		}
		for (i, (nbest, guide)) in targets.iter().enumerate() {
			let ctx = VelocityContext { guide, neighbourhood_best: nbest, is_tracked_best: i == tracked };
			self.velocity[i].update_velocity(&mut self.particles[i], &ctx)?;
		}
		for p in self.particles.iter_mut() {
			p.advance(&self.bounds)?;
		}
		self.evaluate_all()?;
		for i in 0..n {
			self.control_update(i, tracked, iteration)?;
		}
		self.refresh_best()
	}

	fn step_asynchronous(&mut self, board: Option<&[Arc<Published>]>, iteration: usize) -> Result<()> {
		for i in 0..self.particles.len() {
			let tracked = self.best_index;
			let nb = self.topology.update_neighbourhood_best(&self.particles, i)?;
			self.particles[i].set_neighbourhood_best(nb);

			let (nbest, guide) = self.resolve_guide(i, board)?;
			let ctx = VelocityContext { guide: &guide, neighbourhood_best: &nbest, is_tracked_best: i == tracked };
			self.velocity[i].update_velocity(&mut self.particles[i], &ctx)?;
			self.particles[i].advance(&self.bounds)?;
			self.evaluate_one(i)?;
			self.control_update(i, tracked, iteration)?;
			self.refresh_best()?;
		}
		Ok(())
	}
}
