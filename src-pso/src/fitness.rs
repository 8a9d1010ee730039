use serde::{Deserialize, Serialize};

use crate::error::{PsoError, Result};

/// Quality of a position under one optimisation direction.
///
/// `Inferior` stands in before a position has ever been evaluated and loses
/// against every real fitness, whatever its direction. Equality is exact:
/// `Minimise(1.0) == Minimise(1.0)` but nothing is "close enough".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Fitness {
	Minimise(f64),
	Maximise(f64),
	Inferior,
}

/// Outcome of `compare(a, b)`, read as "a is ... than b".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
	Better,
	Worse,
	Equal,
}

impl Fitness {
	/// Raw value, `None` for the inferior sentinel
	pub fn value(&self) -> Option<f64> {
		match *self {
			Fitness::Minimise(v) | Fitness::Maximise(v) => Some(v),
			Fitness::Inferior => None,
		}
	}

	pub fn is_inferior(&self) -> bool {
		matches!(self, Fitness::Inferior)
	}

	/// Compare `self` against `other`. See [`compare`].
	pub fn compare(&self, other: &Fitness) -> Result<Comparison> {
		compare(self, other)
	}

	/// True only on strict improvement; `Equal` keeps the incumbent.
	pub fn is_better_than(&self, other: &Fitness) -> Result<bool> {
		Ok(compare(self, other)? == Comparison::Better)
	}
}

fn ordered(a: f64, b: f64, lower_wins: bool) -> Result<Comparison> {
	if a.is_nan() {
		return Err(PsoError::NonFinite { what: "fitness", index: 0 });
	}
	if b.is_nan() {
		return Err(PsoError::NonFinite { what: "fitness", index: 1 });
	}
	let cmp = if a == b {
		Comparison::Equal
	} else if (a < b) == lower_wins {
		Comparison::Better
	} else {
		Comparison::Worse
	};
	Ok(cmp)
}

/// Compare two fitness values under their shared direction.
///
/// Mixing directions is a programming error and yields
/// [`PsoError::InvalidComparison`] unless one side is `Inferior`.
pub fn compare(a: &Fitness, b: &Fitness) -> Result<Comparison> {
	match (a, b) {
		(Fitness::Inferior, Fitness::Inferior) => Ok(Comparison::Equal),
		(Fitness::Inferior, _) => Ok(Comparison::Worse),
		(_, Fitness::Inferior) => Ok(Comparison::Better),
		(Fitness::Minimise(x), Fitness::Minimise(y)) => ordered(*x, *y, true),
		(Fitness::Maximise(x), Fitness::Maximise(y)) => ordered(*x, *y, false),
		_ => Err(PsoError::InvalidComparison { left: *a, right: *b }),
	}
}
