use ndarray::Array1;

use crate::control::{ControlParameter, MaxVelocity};
use crate::error::{PsoError, Result};
use crate::particle::Particle;
use crate::random::RandomSource;

/// Constriction-equivalent inertia weight from Clerc & Kennedy
pub const DEFAULT_INERTIA: f64 = 0.729844;
/// Matching acceleration coefficient for c1 and c2
pub const DEFAULT_ACCELERATION: f64 = 1.496180;

/// Inertia-weight PSO velocity update:
/// `v = w*v + c1*r1*(pbest - x) + c2*r2*(guide - x)`, clamped to vMax.
#[derive(Debug, Clone)]
pub struct StandardVelocityUpdate {
	inertia: ControlParameter,
	cognitive: ControlParameter,
	social: ControlParameter,
	max_velocity: MaxVelocity,
	random: RandomSource,
}

impl StandardVelocityUpdate {
	pub fn new(random: RandomSource) -> Self {
		Self {
			inertia: ControlParameter::constant(DEFAULT_INERTIA),
			cognitive: ControlParameter::constant(DEFAULT_ACCELERATION),
			social: ControlParameter::constant(DEFAULT_ACCELERATION),
			max_velocity: MaxVelocity::default(),
			random,
		}
	}

	pub fn with_inertia(mut self, w: ControlParameter) -> Self {
		self.inertia = w;
		self
	}
	pub fn with_cognitive(mut self, c1: ControlParameter) -> Self {
		self.cognitive = c1;
		self
	}
	pub fn with_social(mut self, c2: ControlParameter) -> Self {
		self.social = c2;
		self
	}
	pub fn with_max_velocity(mut self, vmax: MaxVelocity) -> Self {
		self.max_velocity = vmax;
		self
	}
	/// Swap the random stream, e.g. to give a duplicate its own sequence
	pub fn with_random(mut self, random: RandomSource) -> Self {
		self.random = random;
		self
	}

	pub fn inertia(&self) -> &ControlParameter {
		&self.inertia
	}
	pub fn cognitive(&self) -> &ControlParameter {
		&self.cognitive
	}
	pub fn social(&self) -> &ControlParameter {
		&self.social
	}
	pub fn max_velocity(&self) -> &MaxVelocity {
		&self.max_velocity
	}
	pub fn random(&self) -> &RandomSource {
		&self.random
	}

	/// Independent copy of the parameters; the random handle is shared.
	pub fn duplicate(&self) -> Self {
		self.clone()
	}

	/// NaN check then vMax truncation of one component
	pub(crate) fn clamp(&self, component: f64, i: usize, dimension: usize) -> Result<f64> {
		if component.is_nan() {
			return Err(PsoError::NonFinite { what: "velocity", index: i });
		}
		self.max_velocity.clamp(component, i, dimension)
	}

	pub fn update_velocity(&self, particle: &mut Particle, guide: &Array1<f64>) -> Result<()> {
		let n = particle.dimension();
		if guide.len() != n {
			return Err(PsoError::DimensionMismatch { what: "guide", expected: n, found: guide.len() });
		}
		let w = self.inertia.get();
		let c1 = self.cognitive.get();
		let c2 = self.social.get();

		let position = particle.position();
		let pbest = particle.best_position();
		let velocity = particle.velocity();
		let mut next = Array1::<f64>::zeros(n);
		for i in 0..n {
			let r1 = self.random.uniform();
			let r2 = self.random.uniform();
			let component = w * velocity[i]
				+ c1 * r1 * (pbest[i] - position[i])
				+ c2 * r2 * (guide[i] - position[i]);
			next[i] = self.clamp(component, i, n)?;
		}
		particle.set_velocity(next)
	}

	/// Advance time-varying coefficients; a no-op for constant ones.
	pub fn update_control_parameters(&mut self, iteration: usize, max_iterations: usize) {
		self.inertia.update(iteration, max_iterations);
		self.cognitive.update(iteration, max_iterations);
		self.social.update(iteration, max_iterations);
		self.max_velocity.update(iteration, max_iterations);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn one_d(x: f64, v: f64, pbest: f64) -> Particle {
		let mut p = Particle::new(Array1::from(vec![pbest]), Array1::from(vec![v])).unwrap();
		p.set_fitness(crate::fitness::Fitness::Minimise(0.0));
		p.update_personal_best().unwrap();
		p.set_position(Array1::from(vec![x])).unwrap();
		p
	}

	fn strategy(vmax: f64, draws: Vec<f64>) -> StandardVelocityUpdate {
		StandardVelocityUpdate::new(RandomSource::replay(draws).unwrap())
			.with_inertia(ControlParameter::constant(0.7))
			.with_cognitive(ControlParameter::constant(1.4))
			.with_social(ControlParameter::constant(1.4))
			.with_max_velocity(MaxVelocity::broadcast(vmax))
	}

	#[test]
	fn test_reference_update() {
		let mut p = one_d(0.0, 1.0, 2.0);
		strategy(100.0, vec![0.5]).update_velocity(&mut p, &Array1::from(vec![4.0])).unwrap();
		assert!((p.velocity()[0] - 4.9).abs() < 1e-12, "v = {}", p.velocity()[0]);
	}

	#[test]
	fn test_vmax_truncates() {
		let mut p = one_d(0.0, 1.0, 2.0);
		strategy(2.0, vec![0.5]).update_velocity(&mut p, &Array1::from(vec![4.0])).unwrap();
		assert_eq!(p.velocity()[0], 2.0);

		let mut p = one_d(0.0, -1.0, -2.0);
		strategy(2.0, vec![0.5]).update_velocity(&mut p, &Array1::from(vec![-4.0])).unwrap();
		assert_eq!(p.velocity()[0], -2.0);
	}

	#[test]
	fn test_no_drift_without_forcing() {
		let s = strategy(1.0, vec![0.0]);
		let mut p = one_d(3.0, 0.0, 3.0);
		let guide = Array1::from(vec![3.0]);
		for _ in 0..25 {
			s.update_velocity(&mut p, &guide).unwrap();
			assert_eq!(p.velocity()[0], 0.0);
		}
	}

	#[test]
	fn test_guide_dimension_is_checked() {
		let mut p = one_d(0.0, 0.0, 0.0);
		let err = strategy(1.0, vec![0.5]).update_velocity(&mut p, &Array1::zeros(2)).unwrap_err();
		assert!(matches!(err, PsoError::DimensionMismatch { what: "guide", .. }));
	}

	#[test]
	fn test_nan_velocity_is_surfaced() {
		let mut p = one_d(0.0, f64::NAN, 0.0);
		let err = strategy(1.0, vec![0.5]).update_velocity(&mut p, &Array1::zeros(1)).unwrap_err();
		assert_eq!(err, PsoError::NonFinite { what: "velocity", index: 0 });
	}

	#[test]
	fn test_linear_inertia_advances() {
		let mut s = strategy(1.0, vec![0.5]).with_inertia(ControlParameter::linear(0.9, 0.4));
		s.update_control_parameters(10, 10);
		assert!((s.inertia().get() - 0.4).abs() < 1e-12);
	}
}
