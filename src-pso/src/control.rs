use serde::{Deserialize, Serialize};

use crate::error::{PsoError, Result};

/// A scalar value source used by the velocity strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlParameter {
	/// Fixed for the lifetime of the owning strategy
	Constant(f64),
	/// Moves linearly from `initial` (iteration 0) to `target` (last iteration)
	Linear { initial: f64, target: f64, value: f64 },
	/// Driven by the update rule of the strategy holding it (e.g. GC's rho)
	Adaptive(f64),
}

impl ControlParameter {
	pub fn constant(value: f64) -> Self {
		ControlParameter::Constant(value)
	}

	pub fn linear(initial: f64, target: f64) -> Self {
		ControlParameter::Linear { initial, target, value: initial }
	}

	pub fn adaptive(value: f64) -> Self {
		ControlParameter::Adaptive(value)
	}

	pub fn get(&self) -> f64 {
		match *self {
			ControlParameter::Constant(v) => v,
			ControlParameter::Linear { value, .. } => value,
			ControlParameter::Adaptive(v) => v,
		}
	}

	/// Overwrite the value. Only adaptive parameters accept this.
	pub fn set(&mut self, value: f64) -> Result<()> {
		match self {
			ControlParameter::Adaptive(v) => {
				*v = value;
				Ok(())
			}
			_ => Err(PsoError::ImmutableParameter),
		}
	}

	/// Advance a time-varying parameter; constant and adaptive values are untouched.
	pub fn update(&mut self, iteration: usize, max_iterations: usize) {
		if let ControlParameter::Linear { initial, target, value } = self {
			let ratio = if max_iterations == 0 {
				1.0
			} else {
				(iteration.min(max_iterations)) as f64 / max_iterations as f64
			};
			*value = *initial + (*target - *initial) * ratio;
		}
	}
}

impl Default for ControlParameter {
	fn default() -> Self {
		ControlParameter::Constant(0.0)
	}
}

/// Velocity clamp: one vMax for every dimension or one per dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MaxVelocity {
	Broadcast(ControlParameter),
	PerDimension(Vec<ControlParameter>),
}

impl Default for MaxVelocity {
	fn default() -> Self {
		MaxVelocity::Broadcast(ControlParameter::constant(f64::MAX))
	}
}

impl MaxVelocity {
	pub fn broadcast(value: f64) -> Self {
		MaxVelocity::Broadcast(ControlParameter::constant(value))
	}

	pub fn per_dimension(values: &[f64]) -> Self {
		MaxVelocity::PerDimension(values.iter().map(|&v| ControlParameter::constant(v)).collect())
	}

	/// vMax for dimension `i` of a `dimension`-sized particle
	pub fn get(&self, i: usize, dimension: usize) -> Result<f64> {
		match self {
			MaxVelocity::Broadcast(p) => Ok(p.get()),
			MaxVelocity::PerDimension(ps) => {
				if ps.len() != dimension {
					return Err(PsoError::DimensionMismatch {
						what: "vmax",
						expected: dimension,
						found: ps.len(),
					});
				}
				Ok(ps[i].get())
			}
		}
	}

	/// Truncate `component` to `[-vmax, +vmax]`
	pub fn clamp(&self, component: f64, i: usize, dimension: usize) -> Result<f64> {
		let vmax = self.get(i, dimension)?;
		Ok(component.max(-vmax).min(vmax))
	}

	pub fn update(&mut self, iteration: usize, max_iterations: usize) {
		match self {
			MaxVelocity::Broadcast(p) => p.update(iteration, max_iterations),
			MaxVelocity::PerDimension(ps) => {
				ps.iter_mut().for_each(|p| p.update(iteration, max_iterations))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_constant_cannot_be_set() {
		let mut c = ControlParameter::constant(0.7);
		assert_eq!(c.set(0.1), Err(PsoError::ImmutableParameter));
		c.update(10, 100);
		assert_eq!(c.get(), 0.7);
	}

	#[test]
	fn test_linear_moves_with_iterations() {
		let mut w = ControlParameter::linear(0.9, 0.4);
		assert_eq!(w.get(), 0.9);
		w.update(50, 100);
		assert!((w.get() - 0.65).abs() < 1e-12);
		w.update(100, 100);
		assert!((w.get() - 0.4).abs() < 1e-12);
		assert!(w.set(1.0).is_err());
	}

	#[test]
	fn test_adaptive_is_settable() {
		let mut rho = ControlParameter::adaptive(1.0);
		rho.set(1.2).unwrap();
		assert_eq!(rho.get(), 1.2);
	}

	#[test]
	fn test_vmax_clamp_is_exact() {
		let vmax = MaxVelocity::broadcast(2.0);
		assert_eq!(vmax.clamp(4.9, 0, 1).unwrap(), 2.0);
		assert_eq!(vmax.clamp(-7.5, 0, 1).unwrap(), -2.0);
		assert_eq!(vmax.clamp(1.5, 0, 1).unwrap(), 1.5);
	}

	#[test]
	fn test_per_dimension_vmax_checks_length() {
		let vmax = MaxVelocity::per_dimension(&[1.0, 2.0]);
		assert_eq!(vmax.clamp(3.0, 1, 2).unwrap(), 2.0);
		assert!(matches!(
			vmax.get(0, 3),
			Err(PsoError::DimensionMismatch { what: "vmax", expected: 3, found: 2 })
		));
	}
}
