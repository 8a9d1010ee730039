//! Guaranteed Convergence PSO (GCPSO) velocity update.
//!
//! The particle currently tracked as the swarm's best ignores the usual
//! cognitive/social attraction and instead performs a random walk of radius
//! `rho` around the neighbourhood best:
//!
//! `v = -x + nbest + w*v + rho*(1 - 2u)`
//!
//! `rho` grows after `success_count_threshold` consecutive successes and
//! shrinks after `failure_count_threshold` consecutive failures, so plain PSO's
//! zero-velocity stagnation at the best particle cannot happen.
//!
//! References:
//! - F. van den Bergh and A. Engelbrecht, "A new locally convergent particle
//!   swarm optimizer", IEEE SMC 2002.
//! - F. van den Bergh, "An Analysis of Particle Swarm Optimizers", PhD thesis,
//!   University of Pretoria, 2002.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::control::{ControlParameter, MaxVelocity};
use crate::error::{PsoError, Result};
use crate::fitness::Fitness;
use crate::particle::Particle;
use crate::random::RandomSource;
use crate::velocity::{ControlContext, VelocityContext};
use crate::velocity_standard::StandardVelocityUpdate;

/// vMax applied to GC swarms whose configuration leaves it unset
pub const GC_DEFAULT_MAX_VELOCITY: f64 = 0.5;

/// Initial settings of the adaptive rho controller.
///
/// `rho` is problem dependent: 1.0 is far too wide for a `[0, 1]` domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcParameters {
	pub rho: f64,
	pub rho_lower_bound: f64,
	/// must be > 1
	pub rho_expand_coefficient: f64,
	/// must lie in (0, 1)
	pub rho_contract_coefficient: f64,
	pub success_count_threshold: usize,
	pub failure_count_threshold: usize,
}

impl Default for GcParameters {
	fn default() -> Self {
		Self {
			rho: 1.0,
			rho_lower_bound: 1.0e-323,
			rho_expand_coefficient: 1.2,
			rho_contract_coefficient: 0.5,
			success_count_threshold: 15,
			failure_count_threshold: 5,
		}
	}
}

impl GcParameters {
	pub fn validate(&self) -> Result<()> {
		if !(self.rho > 0.0) || !self.rho.is_finite() {
			return Err(PsoError::InvalidParameter {
				name: "rho",
				value: self.rho,
				reason: "must be strictly positive",
			});
		}
		if !(self.rho_lower_bound > 0.0) {
			return Err(PsoError::InvalidParameter {
				name: "rho_lower_bound",
				value: self.rho_lower_bound,
				reason: "must be strictly positive",
			});
		}
		if !(self.rho_expand_coefficient > 1.0) || !self.rho_expand_coefficient.is_finite() {
			return Err(PsoError::InvalidParameter {
				name: "rho_expand_coefficient",
				value: self.rho_expand_coefficient,
				reason: "must be greater than 1",
			});
		}
		if !(self.rho_contract_coefficient > 0.0 && self.rho_contract_coefficient < 1.0) {
			return Err(PsoError::InvalidParameter {
				name: "rho_contract_coefficient",
				value: self.rho_contract_coefficient,
				reason: "must lie in (0, 1)",
			});
		}
		if self.success_count_threshold == 0 || self.failure_count_threshold == 0 {
			return Err(PsoError::InvalidParameter {
				name: "count_threshold",
				value: 0.0,
				reason: "thresholds must be at least 1",
			});
		}
		Ok(())
	}
}

#[derive(Debug, Clone)]
pub struct GcVelocityUpdate {
	standard: StandardVelocityUpdate,
	rho: ControlParameter,
	rho_lower_bound: ControlParameter,
	rho_expand_coefficient: ControlParameter,
	rho_contract_coefficient: ControlParameter,
	success_count: usize,
	failure_count: usize,
	success_count_threshold: usize,
	failure_count_threshold: usize,
	old_fitness: Fitness,
}

impl GcVelocityUpdate {
	/// GC with default rho settings on a standard update whose vMax is 0.5
	pub fn new(random: RandomSource) -> Self {
		let standard =
			StandardVelocityUpdate::new(random).with_max_velocity(MaxVelocity::broadcast(GC_DEFAULT_MAX_VELOCITY));
		Self::build(standard, &GcParameters::default())
	}

	/// GC wrapping `standard`, which also serves the non-best particles
	pub fn with_parameters(standard: StandardVelocityUpdate, params: &GcParameters) -> Result<Self> {
		params.validate()?;
		Ok(Self::build(standard, params))
	}

	fn build(standard: StandardVelocityUpdate, params: &GcParameters) -> Self {
		Self {
			standard,
			rho: ControlParameter::adaptive(params.rho),
			rho_lower_bound: ControlParameter::constant(params.rho_lower_bound),
			rho_expand_coefficient: ControlParameter::constant(params.rho_expand_coefficient),
			rho_contract_coefficient: ControlParameter::constant(params.rho_contract_coefficient),
			success_count: 0,
			failure_count: 0,
			success_count_threshold: params.success_count_threshold,
			failure_count_threshold: params.failure_count_threshold,
			old_fitness: Fitness::Inferior,
		}
	}

	pub fn with_random(mut self, random: RandomSource) -> Self {
		self.standard = self.standard.with_random(random);
		self
	}

	pub fn standard(&self) -> &StandardVelocityUpdate {
		&self.standard
	}
	pub fn rho(&self) -> f64 {
		self.rho.get()
	}
	pub fn success_count(&self) -> usize {
		self.success_count
	}
	pub fn failure_count(&self) -> usize {
		self.failure_count
	}
	pub fn old_fitness(&self) -> Fitness {
		self.old_fitness
	}

	/// Copies counters, rho and the wrapped standard update; shares the random handle.
	pub fn duplicate(&self) -> Self {
		self.clone()
	}

	pub fn update_velocity(&mut self, particle: &mut Particle, ctx: &VelocityContext<'_>) -> Result<()> {
		if !ctx.is_tracked_best {
			return self.standard.update_velocity(particle, ctx.guide);
		}

		let n = particle.dimension();
		let nbest = ctx.neighbourhood_best;
		if nbest.len() != n {
			return Err(PsoError::DimensionMismatch {
				what: "neighbourhood best",
				expected: n,
				found: nbest.len(),
			});
		}
		let w = self.standard.inertia().get();
		let rho = self.rho.get();
		let random = self.standard.random();

		let position = particle.position();
		let velocity = particle.velocity();
		let mut next = Array1::<f64>::zeros(n);
		for i in 0..n {
			let u = random.uniform();
			let component = -position[i] + nbest[i] + w * velocity[i] + rho * (1.0 - 2.0 * u);
			next[i] = self.standard.clamp(component, i, n)?;
		}
		particle.set_velocity(next)?;

		// compared against the re-evaluated fitness in update_control_parameters
		self.old_fitness = particle.fitness();
		Ok(())
	}

	pub fn update_control_parameters(&mut self, particle: &Particle, ctx: &ControlContext<'_>) -> Result<()> {
		if !ctx.is_tracked_best {
			self.success_count = 0;
			self.failure_count = 0;
			self.standard.update_control_parameters(ctx.iteration, ctx.max_iterations);
			return Ok(());
		}

		// any change counts as success, improvement or not
		if particle.fitness() != self.old_fitness {
			self.failure_count = 0;
			self.success_count += 1;
		} else {
			self.success_count = 0;
			self.failure_count += 1;
		}
		self.update_rho(ctx.bounds)
	}

	/// Expand or contract rho, then clamp into `[rho_lower_bound, span(0) / expand]`.
	fn update_rho(&mut self, bounds: &Bounds) -> Result<()> {
		if bounds.dimension() == 0 {
			return Err(PsoError::DimensionMismatch { what: "bounds", expected: 1, found: 0 });
		}
		let span = bounds.span(0);
		if !(span > 0.0) {
			return Err(PsoError::DegenerateBounds { dimension: 0 });
		}
		let expand = self.rho_expand_coefficient.get();
		let ceiling = span / expand;

		let rho = self.rho.get();
		let mut next = rho;
		if self.success_count >= self.success_count_threshold {
			next = expand * rho;
		}
		if self.failure_count >= self.failure_count_threshold {
			next = self.rho_contract_coefficient.get() * rho;
		}

		let floor = self.rho_lower_bound.get();
		if next <= floor {
			next = floor;
		}
		if next >= ceiling {
			next = ceiling;
		}
		if next != rho {
			log::trace!(
				"GC rho {:.6e} -> {:.6e} (success={}, failure={})",
				rho,
				next,
				self.success_count,
				self.failure_count
			);
		}
		self.rho.set(next)
	}
}
