use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{PsoError, Result};

#[derive(Debug)]
enum Stream {
	Seeded(StdRng),
	Replay { values: Vec<f64>, cursor: usize },
}

/// Uniform(0,1) generator handle injected into the stochastic strategies.
///
/// Cloning the handle shares the underlying stream: two strategies holding
/// clones draw alternately from one sequence. Build a new source with
/// [`RandomSource::seeded`] to get an independent stream.
#[derive(Debug, Clone)]
pub struct RandomSource {
	stream: Arc<Mutex<Stream>>,
}

impl RandomSource {
	pub fn seeded(seed: u64) -> Self {
		Self { stream: Arc::new(Mutex::new(Stream::Seeded(StdRng::seed_from_u64(seed)))) }
	}

	/// Replays `values` cyclically. Every value must lie in [0, 1].
	pub fn replay(values: Vec<f64>) -> Result<Self> {
		if values.is_empty() {
			return Err(PsoError::InvalidParameter {
				name: "replay",
				value: 0.0,
				reason: "needs at least one value",
			});
		}
		if let Some(&v) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
			return Err(PsoError::InvalidParameter { name: "replay", value: v, reason: "values must lie in [0, 1]" });
		}
		Ok(Self { stream: Arc::new(Mutex::new(Stream::Replay { values, cursor: 0 })) })
	}

	/// Seeded from the OS entropy pool; the seed is logged so the run can be replayed.
	pub fn from_entropy() -> Self {
		let seed: u64 = rand::rng().random();
		log::info!("random source seeded from entropy: seed={}", seed);
		Self::seeded(seed)
	}

	/// Next uniform draw in [0, 1)
	pub fn uniform(&self) -> f64 {
		let mut guard = self.stream.lock();
		match &mut *guard {
			Stream::Seeded(rng) => rng.random::<f64>(),
			Stream::Replay { values, cursor } => {
				let v = values[*cursor];
				*cursor = (*cursor + 1) % values.len();
				v
			}
		}
	}

	/// Uniform index in `0..n`; `n` must be positive
	pub fn index(&self, n: usize) -> usize {
		debug_assert!(n > 0);
		((self.uniform() * n as f64) as usize).min(n - 1)
	}

	/// True when both handles draw from the same stream
	pub fn shares_stream_with(&self, other: &RandomSource) -> bool {
		Arc::ptr_eq(&self.stream, &other.stream)
	}
}
