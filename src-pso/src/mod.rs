//! Particle Swarm Optimisation (PSO) in pure Rust using ndarray
//!
//! Box-constrained global optimiser built from small, swappable strategies.
//!
//! Supported features:
//! - Standard inertia-weight velocity update with constant or linearly varying coefficients
//! - Guaranteed-Convergence PSO (GCPSO): the best particle runs an adaptive local search
//! - Vector-Evaluated PSO (VEPSO): one sub-swarm per objective, cross-informed through a
//!   knowledge board (random or ring transfer)
//! - Global-best and ring (lbest) topologies
//! - Synchronous and asynchronous iteration policies
//! - Per-dimension or broadcast velocity clamping
//! - Parallel objective evaluation and sub-swarm stepping with rayon
//! - Seeded, replayable random streams injected into every stochastic strategy

#![allow(missing_docs)]
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

pub mod bounds;
pub mod control;
pub mod error;
pub mod fitness;
pub mod objective;
pub mod particle;
pub mod random;

pub mod topology;

pub mod velocity;
pub mod velocity_gc;
pub mod velocity_standard;

pub mod guide;
pub mod knowledge;

pub mod multi_population;
pub mod parallel_eval;
pub mod particle_swarm;
pub mod recorder;
pub mod run_recorded;
pub mod swarm;

pub use bounds::Bounds;
pub use control::{ControlParameter, MaxVelocity};
pub use error::{PsoError, Result};
pub use fitness::{Comparison, Fitness, compare};
pub use guide::{GuidePolicy, GuideSelectionStrategy};
pub use knowledge::{KnowledgeBoard, KnowledgePolicy, KnowledgeTransferStrategy, Published};
pub use multi_population::{MultiPopulation, VepsoReport};
pub use objective::{Maximise, Minimise, Objective};
pub use parallel_eval::ParallelConfig;
pub use particle::Particle;
pub use particle_swarm::particle_swarm;
pub use random::RandomSource;
pub use recorder::{OptimizationRecord, OptimizationRecorder};
pub use run_recorded::run_recorded_particle_swarm;
pub use swarm::{IterationPolicy, Swarm, VelocityInit, VelocityPolicy};
pub use topology::Topology;
pub use velocity::VelocityUpdateStrategy;
pub use velocity_gc::{GcParameters, GcVelocityUpdate};
pub use velocity_standard::{DEFAULT_ACCELERATION, DEFAULT_INERTIA, StandardVelocityUpdate};

/// Configuration for the particle swarm optimiser
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct PsoConfig {
	pub maxiter: usize,
	/// number of particles (per sub-swarm for VEPSO)
	pub popsize: usize,
	/// `None` draws a seed from entropy and logs it
	pub seed: Option<u64>,
	pub inertia: ControlParameter,
	pub cognitive: ControlParameter,
	pub social: ControlParameter,
	pub max_velocity: MaxVelocity,
	pub velocity: VelocityPolicy,
	pub guide: GuidePolicy,
	pub topology: Topology,
	pub iteration: IterationPolicy,
	pub velocity_init: VelocityInit,
	/// Log the best fitness of every iteration at info level
	pub disp: bool,
	/// Optional per-iteration callback (may stop early)
	#[serde(skip)]
	pub callback: Option<Box<dyn FnMut(&PsoIntermediate) -> CallbackAction>>,
	/// Parallel evaluation configuration
	pub parallel: ParallelConfig,
}

impl Default for PsoConfig {
	fn default() -> Self {
		Self {
			maxiter: 1000,
			popsize: 20,
			seed: None,
			inertia: ControlParameter::constant(DEFAULT_INERTIA),
			cognitive: ControlParameter::constant(DEFAULT_ACCELERATION),
			social: ControlParameter::constant(DEFAULT_ACCELERATION),
			max_velocity: MaxVelocity::default(),
			velocity: VelocityPolicy::default(),
			guide: GuidePolicy::default(),
			topology: Topology::default(),
			iteration: IterationPolicy::default(),
			velocity_init: VelocityInit::default(),
			disp: false,
			callback: None,
			parallel: ParallelConfig::default(),
		}
	}
}

impl PsoConfig {
	/// Load a configuration from JSON; absent fields keep their defaults.
	pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
		serde_json::to_string_pretty(self)
	}

	/// Random stream for this run
	pub(crate) fn random_source(&self) -> RandomSource {
		match self.seed {
			Some(seed) => RandomSource::seeded(seed),
			None => RandomSource::from_entropy(),
		}
	}
}

/// Fluent builder for `PsoConfig`.
pub struct PsoConfigBuilder {
	cfg: PsoConfig,
}

impl Default for PsoConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl PsoConfigBuilder {
	pub fn new() -> Self {
		Self { cfg: PsoConfig::default() }
	}
	pub fn maxiter(mut self, v: usize) -> Self {
		self.cfg.maxiter = v;
		self
	}
	pub fn popsize(mut self, v: usize) -> Self {
		self.cfg.popsize = v;
		self
	}
	pub fn seed(mut self, v: u64) -> Self {
		self.cfg.seed = Some(v);
		self
	}
	pub fn inertia(mut self, v: ControlParameter) -> Self {
		self.cfg.inertia = v;
		self
	}
	pub fn cognitive(mut self, v: ControlParameter) -> Self {
		self.cfg.cognitive = v;
		self
	}
	pub fn social(mut self, v: ControlParameter) -> Self {
		self.cfg.social = v;
		self
	}
	pub fn max_velocity(mut self, v: MaxVelocity) -> Self {
		self.cfg.max_velocity = v;
		self
	}
	pub fn velocity(mut self, v: VelocityPolicy) -> Self {
		self.cfg.velocity = v;
		self
	}
	/// Shorthand for GCPSO with the given parameters
	pub fn guaranteed_convergence(mut self, params: GcParameters) -> Self {
		self.cfg.velocity = VelocityPolicy::GuaranteedConvergence(params);
		self
	}
	pub fn guide(mut self, v: GuidePolicy) -> Self {
		self.cfg.guide = v;
		self
	}
	pub fn topology(mut self, v: Topology) -> Self {
		self.cfg.topology = v;
		self
	}
	pub fn iteration(mut self, v: IterationPolicy) -> Self {
		self.cfg.iteration = v;
		self
	}
	pub fn velocity_init(mut self, v: VelocityInit) -> Self {
		self.cfg.velocity_init = v;
		self
	}
	pub fn disp(mut self, v: bool) -> Self {
		self.cfg.disp = v;
		self
	}
	pub fn callback(mut self, cb: Box<dyn FnMut(&PsoIntermediate) -> CallbackAction>) -> Self {
		self.cfg.callback = Some(cb);
		self
	}
	pub fn parallel(mut self, parallel: ParallelConfig) -> Self {
		self.cfg.parallel = parallel;
		self
	}
	pub fn enable_parallel(mut self, enable: bool) -> Self {
		self.cfg.parallel.enabled = enable;
		self
	}
	pub fn parallel_threads(mut self, num_threads: usize) -> Self {
		self.cfg.parallel.num_threads = Some(num_threads);
		self
	}
	pub fn build(self) -> PsoConfig {
		self.cfg
	}
}

/// Result/Report of a PSO run
#[derive(Clone)]
pub struct PsoReport {
	pub x: Array1<f64>,
	pub fitness: Fitness,
	pub success: bool,
	pub message: String,
	pub nit: usize,
	pub nfev: usize,
}

impl PsoReport {
	/// Raw objective value of the best position (`NaN` if nothing was evaluated)
	pub fn fun(&self) -> f64 {
		self.fitness.value().unwrap_or(f64::NAN)
	}
}

impl fmt::Debug for PsoReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PsoReport")
			.field("x", &format!("len={}", self.x.len()))
			.field("fitness", &self.fitness)
			.field("success", &self.success)
			.field("message", &self.message)
			.field("nit", &self.nit)
			.field("nfev", &self.nfev)
			.finish()
	}
}

/// Information passed to callback after each iteration
pub struct PsoIntermediate {
	pub x: Array1<f64>,
	pub fitness: Fitness,
	pub iter: usize,
	/// GC search radius of the best particle's strategy, if any
	pub rho: Option<f64>,
	/// sub-population the values belong to; always 0 for a single swarm
	pub population: usize,
}

/// Action returned by callback
pub enum CallbackAction {
	Continue,
	Stop,
}

/// Particle swarm optimiser over a single objective
pub struct ParticleSwarm {
	objective: Arc<dyn Objective>,
	bounds: Bounds,
	config: PsoConfig,
}

impl ParticleSwarm {
	pub fn new(objective: Arc<dyn Objective>, bounds: Bounds) -> Self {
		Self { objective, bounds, config: PsoConfig::default() }
	}

	pub fn with_config(objective: Arc<dyn Objective>, bounds: Bounds, config: PsoConfig) -> Self {
		Self { objective, bounds, config }
	}

	/// Mutable access to configuration
	pub fn config_mut(&mut self) -> &mut PsoConfig {
		&mut self.config
	}

	/// Run the optimisation and return a report
	pub fn solve(&mut self) -> Result<PsoReport> {
		self.run().inspect_err(|e| log::error!("PSO aborted: {}", e))
	}

	fn run(&mut self) -> Result<PsoReport> {
		let start = Instant::now();
		let timing_enabled = std::env::var("SWARMOPT_PSO_TIMING").map(|v| v != "0").unwrap_or(false);

		self.config.parallel.install();
		log::info!(
			"PSO init: {} dimensions, population={}, maxiter={}, velocity={:?}, topology={:?}, policy={:?}",
			self.bounds.dimension(),
			self.config.popsize,
			self.config.maxiter,
			self.config.velocity,
			self.config.topology,
			self.config.iteration
		);

		let random = self.config.random_source();
		let mut swarm = Swarm::new(self.objective.clone(), self.bounds.clone(), &self.config, random)?;
		log::debug!("PSO iter {:4}  best={:?}", 0, swarm.best_fitness());

		let mut nit = 0;
		let mut stopped = false;
		let mut t_step_tot = 0.0;
		for iter in 1..=self.config.maxiter {
			let t0 = Instant::now();
			swarm.step(None)?;
			nit = iter;
			let t_step = t0.elapsed().as_secs_f64();
			t_step_tot += t_step;

			if timing_enabled && (iter <= 5 || iter % 10 == 0) {
				eprintln!("TIMING iter {:4}: step={:.3} ms, nfev={}", iter, t_step * 1e3, swarm.nfev());
			}
			if self.config.disp {
				log::info!("PSO iter {:4}  best={:?}  rho={:?}", iter, swarm.best_fitness(), swarm.rho());
			} else {
				log::debug!("PSO iter {:4}  best={:?}", iter, swarm.best_fitness());
			}

			if let Some(ref mut cb) = self.config.callback {
				let intermediate = PsoIntermediate {
					x: swarm.best_position().clone(),
					fitness: swarm.best_fitness(),
					iter,
					rho: swarm.rho(),
					population: 0,
				};
				if let CallbackAction::Stop = cb(&intermediate) {
					stopped = true;
					break;
				}
			}
		}

		let message = if stopped {
			"Optimization stopped by callback".to_string()
		} else {
			format!("Maximum iterations reached: {}", self.config.maxiter)
		};
		if timing_enabled {
			eprintln!("TIMING total: step={:.3} s, wall={:.3} s", t_step_tot, start.elapsed().as_secs_f64());
		}
		log::info!("PSO finished: {} (best={:?}, nfev={})", message, swarm.best_fitness(), swarm.nfev());

		Ok(PsoReport {
			x: swarm.best_position().clone(),
			fitness: swarm.best_fitness(),
			success: !swarm.best_fitness().is_inferior(),
			message,
			nit,
			nfev: swarm.nfev(),
		})
	}
}

#[cfg(test)]
mod config_tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let cfg = PsoConfig::default();
		assert_eq!(cfg.inertia.get(), 0.729844);
		assert_eq!(cfg.cognitive.get(), 1.496180);
		assert_eq!(cfg.social.get(), 1.496180);
		assert_eq!(cfg.max_velocity.get(0, 1).unwrap(), f64::MAX);
		assert_eq!(cfg.iteration, IterationPolicy::Synchronous);
		assert!(cfg.callback.is_none());
	}

	#[test]
	fn test_json_keeps_unspecified_defaults() {
		let cfg = PsoConfig::from_json(r#"{"maxiter": 50, "seed": 7, "topology": {"Ring": {"radius": 2}}}"#).unwrap();
		assert_eq!(cfg.maxiter, 50);
		assert_eq!(cfg.seed, Some(7));
		assert_eq!(cfg.topology, Topology::Ring { radius: 2 });
		assert_eq!(cfg.popsize, 20);
	}

	#[test]
	fn test_json_round_trip_drops_callback() {
		let cfg = PsoConfigBuilder::new()
			.guaranteed_convergence(GcParameters::default())
			.callback(Box::new(|_| CallbackAction::Continue))
			.build();
		let back = PsoConfig::from_json(&cfg.to_json().unwrap()).unwrap();
		assert_eq!(back.velocity, cfg.velocity);
		assert!(back.callback.is_none());
	}

	#[test]
	fn test_callback_stops_early() {
		let bounds = Bounds::from_pairs(&[(-1.0, 1.0); 2]).unwrap();
		let objective = Arc::new(Minimise(|x: &Array1<f64>| x.iter().map(|v| v * v).sum::<f64>()));
		let config = PsoConfigBuilder::new()
			.seed(1)
			.popsize(5)
			.maxiter(100)
			.callback(Box::new(|im: &PsoIntermediate| {
				if im.iter >= 3 { CallbackAction::Stop } else { CallbackAction::Continue }
			}))
			.build();
		let report = ParticleSwarm::with_config(objective, bounds, config).solve().unwrap();
		assert_eq!(report.nit, 3);
		assert_eq!(report.nfev, 5 * 4);
		assert_eq!(report.message, "Optimization stopped by callback");
	}
}
