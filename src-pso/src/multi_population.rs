//! Vector-Evaluated PSO driver.
//!
//! One [`Swarm`] per sub-objective. Before every step the driver takes a
//! snapshot of the [`KnowledgeBoard`]; every sub-swarm steps against that
//! snapshot (on the rayon pool when parallelism is enabled). Once all of them
//! succeed each new best is written into its own slot. Guides are therefore
//! one iteration stale and independent of scheduling.

use std::sync::Arc;
use std::time::Instant;

use ndarray::Array1;
use rayon::prelude::*;

use crate::bounds::Bounds;
use crate::error::{PsoError, Result};
use crate::fitness::Fitness;
use crate::guide::GuidePolicy;
use crate::knowledge::KnowledgeBoard;
use crate::objective::Objective;
use crate::random::RandomSource;
use crate::swarm::Swarm;
use crate::{CallbackAction, PsoConfig, PsoIntermediate};

/// Per-population outcome of a VEPSO run
#[derive(Debug, Clone)]
pub struct VepsoReport {
	pub x: Vec<Array1<f64>>,
	pub fitness: Vec<Fitness>,
	pub message: String,
	pub nit: usize,
	pub nfev: usize,
}

pub struct MultiPopulation {
	swarms: Vec<Swarm>,
	board: KnowledgeBoard,
	config: PsoConfig,
	iteration: usize,
}

impl MultiPopulation {
	/// Build one sub-swarm per objective and publish their initial bests.
	///
	/// With a configured seed `s`, population `i` draws from `seed(s + i)`.
	pub fn new(objectives: Vec<Arc<dyn Objective>>, bounds: Bounds, config: PsoConfig) -> Result<Self> {
		if objectives.is_empty() {
			return Err(PsoError::NoPopulations);
		}
		if let GuidePolicy::NeighbourhoodBest = config.guide {
			log::warn!("multi-population run with neighbourhood-best guides: sub-swarms will not exchange knowledge");
		}

		let mut swarms = Vec::with_capacity(objectives.len());
		for (i, objective) in objectives.into_iter().enumerate() {
			let random = match config.seed {
				Some(seed) => RandomSource::seeded(seed.wrapping_add(i as u64)),
				None => RandomSource::from_entropy(),
			};
			let mut swarm = Swarm::new(objective, bounds.clone(), &config, random)?;
			swarm.set_population_index(i);
			swarms.push(swarm);
		}
		let board = KnowledgeBoard::new(swarms.iter().map(|s| s.publish()).collect());
		log::info!(
			"VEPSO init: {} populations of {} particles, {} dimensions",
			swarms.len(),
			config.popsize,
			bounds.dimension()
		);
		Ok(Self { swarms, board, config, iteration: 0 })
	}

	pub fn swarms(&self) -> &[Swarm] {
		&self.swarms
	}

	pub fn board(&self) -> &KnowledgeBoard {
		&self.board
	}

	pub fn iteration(&self) -> usize {
		self.iteration
	}

	pub fn nfev(&self) -> usize {
		self.swarms.iter().map(|s| s.nfev()).sum()
	}

	/// Step every sub-swarm once against a snapshot of the board.
	pub fn step(&mut self) -> Result<()> {
		let snapshot = self.board.snapshot();
		let advance = |swarm: &mut Swarm| swarm.step(Some(snapshot.as_slice()));
		if self.config.parallel.enabled {
			self.swarms.par_iter_mut().try_for_each(advance)?;
		} else {
			self.swarms.iter_mut().try_for_each(advance)?;
		}
		// publish only once every population has completed the step
		for (index, swarm) in self.swarms.iter().enumerate() {
			self.board.publish(index, swarm.publish());
		}
		self.iteration += 1;
		Ok(())
	}

	/// Iterate until `maxiter` or a callback stop.
	///
	/// The callback sees one intermediate per population per iteration, in
	/// population order.
	pub fn solve(&mut self) -> Result<VepsoReport> {
		self.run().inspect_err(|e| log::error!("VEPSO aborted: {}", e))
	}

	fn run(&mut self) -> Result<VepsoReport> {
		let timing_enabled = std::env::var("SWARMOPT_PSO_TIMING").map(|v| v != "0").unwrap_or(false);
		self.config.parallel.install();

		let mut stopped = false;
		let mut nit = 0;
		while nit < self.config.maxiter && !stopped {
			let t0 = Instant::now();
			self.step()?;
			nit += 1;
			if timing_enabled && (nit <= 5 || nit % 10 == 0) {
				eprintln!("TIMING iter {:4}: step={:.3} ms, nfev={}", nit, t0.elapsed().as_secs_f64() * 1e3, self.nfev());
			}
			for (i, swarm) in self.swarms.iter().enumerate() {
				log::debug!("VEPSO iter {:4}  population {}  best={:?}", nit, i, swarm.best_fitness());
			}

			if let Some(ref mut cb) = self.config.callback {
				for (i, swarm) in self.swarms.iter().enumerate() {
					let intermediate = PsoIntermediate {
						x: swarm.best_position().clone(),
						fitness: swarm.best_fitness(),
						iter: nit,
						rho: swarm.rho(),
						population: i,
					};
					if let CallbackAction::Stop = cb(&intermediate) {
						stopped = true;
						break;
					}
				}
			}
		}

		let message = if stopped {
			"Optimization stopped by callback".to_string()
		} else {
			format!("Maximum iterations reached: {}", self.config.maxiter)
		};
		log::info!("VEPSO finished: {} (nfev={})", message, self.nfev());
		Ok(VepsoReport {
			x: self.swarms.iter().map(|s| s.best_position().clone()).collect(),
			fitness: self.swarms.iter().map(|s| s.best_fitness()).collect(),
			message,
			nit,
			nfev: self.nfev(),
		})
	}
}
