use thiserror::Error;

use crate::fitness::Fitness;

/// Errors raised by the swarm core.
///
/// Every variant is a precondition violation: nothing here is retried, the
/// caller decides whether the whole run has to stop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PsoError {
	#[error("cannot compare fitness values of different direction: {left:?} vs {right:?}")]
	InvalidComparison { left: Fitness, right: Fitness },

	#[error("{what} has dimension {found}, expected {expected}")]
	DimensionMismatch { what: &'static str, expected: usize, found: usize },

	#[error("dimension {dimension} has zero width, rho ceiling is undefined")]
	DegenerateBounds { dimension: usize },

	#[error("bound[{dimension}] is invalid: lower={lower}, upper={upper}")]
	InvalidBounds { dimension: usize, lower: f64, upper: f64 },

	#[error("invalid parameter {name}={value}: {reason}")]
	InvalidParameter { name: &'static str, value: f64, reason: &'static str },

	#[error("control parameter is not adaptive and cannot be set")]
	ImmutableParameter,

	#[error("{what} is NaN at index {index}")]
	NonFinite { what: &'static str, index: usize },

	#[error("no populations available for knowledge transfer")]
	NoPopulations,
}

pub type Result<T> = std::result::Result<T, PsoError>;
