use ndarray::Array1;

use crate::bounds::Bounds;
use crate::error::Result;
use crate::particle::Particle;
use crate::random::RandomSource;
use crate::velocity_gc::GcVelocityUpdate;
use crate::velocity_standard::StandardVelocityUpdate;

/// Everything a velocity update reads besides the particle itself.
pub struct VelocityContext<'a> {
	/// external guide chosen by the guide-selection strategy
	pub guide: &'a Array1<f64>,
	/// best position of the particle's neighbourhood best
	pub neighbourhood_best: &'a Array1<f64>,
	/// the particle is the one the swarm tracks as its best for this pass
	pub is_tracked_best: bool,
}

/// Inputs of the paired control-parameter update, run after re-evaluation.
pub struct ControlContext<'a> {
	pub is_tracked_best: bool,
	pub iteration: usize,
	pub max_iterations: usize,
	pub bounds: &'a Bounds,
}

#[derive(Debug, Clone)]
pub enum VelocityUpdateStrategy {
	Standard(StandardVelocityUpdate),
	GuaranteedConvergence(GcVelocityUpdate),
}

impl VelocityUpdateStrategy {
	pub fn update_velocity(&mut self, particle: &mut Particle, ctx: &VelocityContext<'_>) -> Result<()> {
		match self {
			VelocityUpdateStrategy::Standard(s) => s.update_velocity(particle, ctx.guide),
			VelocityUpdateStrategy::GuaranteedConvergence(gc) => gc.update_velocity(particle, ctx),
		}
	}

	pub fn update_control_parameters(&mut self, particle: &Particle, ctx: &ControlContext<'_>) -> Result<()> {
		match self {
			VelocityUpdateStrategy::Standard(s) => {
				s.update_control_parameters(ctx.iteration, ctx.max_iterations);
				Ok(())
			}
			VelocityUpdateStrategy::GuaranteedConvergence(gc) => {
				gc.update_control_parameters(particle, ctx)
			}
		}
	}

	pub fn duplicate(&self) -> Self {
		match self {
			VelocityUpdateStrategy::Standard(s) => VelocityUpdateStrategy::Standard(s.duplicate()),
			VelocityUpdateStrategy::GuaranteedConvergence(gc) => {
				VelocityUpdateStrategy::GuaranteedConvergence(gc.duplicate())
			}
		}
	}

	pub fn with_random(self, random: RandomSource) -> Self {
		match self {
			VelocityUpdateStrategy::Standard(s) => VelocityUpdateStrategy::Standard(s.with_random(random)),
			VelocityUpdateStrategy::GuaranteedConvergence(gc) => {
				VelocityUpdateStrategy::GuaranteedConvergence(gc.with_random(random))
			}
		}
	}

	/// Current GC search radius, `None` for the standard update
	pub fn rho(&self) -> Option<f64> {
		match self {
			VelocityUpdateStrategy::Standard(_) => None,
			VelocityUpdateStrategy::GuaranteedConvergence(gc) => Some(gc.rho()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fitness::Fitness;

	fn start() -> Particle {
		let mut p = Particle::new(Array1::from(vec![1.0, -2.0]), Array1::from(vec![0.3, 0.1])).unwrap();
		p.set_fitness(Fitness::Minimise(5.0));
		p.update_personal_best().unwrap();
		p.set_position(Array1::from(vec![0.5, -1.0])).unwrap();
		p
	}

	/// Drive a strategy through `steps` rounds, returning the velocity trajectory
	fn trajectory(strategy: &mut VelocityUpdateStrategy, steps: usize) -> Vec<Vec<f64>> {
		let bounds = Bounds::from_pairs(&[(-5.0, 5.0), (-5.0, 5.0)]).unwrap();
		let guide = Array1::from(vec![0.0, 0.0]);
		let mut p = start();
		let mut out = Vec::new();
		for it in 0..steps {
			let best = it % 3 != 2;
			let nbest = p.best_position().clone();
			let vctx = VelocityContext { guide: &guide, neighbourhood_best: &nbest, is_tracked_best: best };
			strategy.update_velocity(&mut p, &vctx).unwrap();
			p.advance(&bounds).unwrap();
			let x = p.position();
			p.set_fitness(Fitness::Minimise(x[0] * x[0] + x[1] * x[1]));
			p.update_personal_best().unwrap();
			let cctx = ControlContext { is_tracked_best: best, iteration: it, max_iterations: steps, bounds: &bounds };
			strategy.update_control_parameters(&p, &cctx).unwrap();
			out.push(p.velocity().to_vec());
		}
		out
	}

	#[test]
	fn test_duplicate_replays_identically() {
		let mut original = VelocityUpdateStrategy::GuaranteedConvergence(GcVelocityUpdate::new(RandomSource::seeded(11)))
			.with_random(RandomSource::seeded(99));
		let mut copy = original.duplicate().with_random(RandomSource::seeded(99));

		let a = trajectory(&mut original, 40);
		let b = trajectory(&mut copy, 40);
		assert_eq!(a, b);
		assert_eq!(original.rho(), copy.rho());
	}

	#[test]
	fn test_duplicate_does_not_leak_state() {
		let mut original = VelocityUpdateStrategy::GuaranteedConvergence(GcVelocityUpdate::new(RandomSource::seeded(5)));
		let copy = original.duplicate().with_random(RandomSource::seeded(5));
		trajectory(&mut original, 30);
		let mut fresh = copy.duplicate().with_random(RandomSource::seeded(5));
		let mut reference = VelocityUpdateStrategy::GuaranteedConvergence(GcVelocityUpdate::new(RandomSource::seeded(5)));
		assert_eq!(trajectory(&mut fresh, 10), trajectory(&mut reference, 10));
	}

	#[test]
	fn test_standard_has_no_rho() {
		let s = VelocityUpdateStrategy::Standard(StandardVelocityUpdate::new(RandomSource::seeded(1)));
		assert_eq!(s.rho(), None);
	}
}
