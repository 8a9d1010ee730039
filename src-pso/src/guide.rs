use std::sync::Arc;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{PsoError, Result};
use crate::knowledge::{KnowledgePolicy, KnowledgeTransferStrategy, Published};
use crate::particle::Particle;
use crate::random::RandomSource;

/// What guide selection may consult for one particle.
pub struct GuideContext<'a> {
	pub neighbourhood_best: &'a Array1<f64>,
	/// board snapshot of every sub-population; `None` for a lone swarm
	pub populations: Option<&'a [Arc<Published>]>,
	/// index of the particle's own population in `populations`
	pub population_index: usize,
}

/// Serializable choice of guide selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GuidePolicy {
	NeighbourhoodBest,
	VectorEvaluated(KnowledgePolicy),
}

impl Default for GuidePolicy {
	fn default() -> Self {
		GuidePolicy::NeighbourhoodBest
	}
}

/// Vector-Evaluated PSO guide selection.
///
/// Each sub-swarm is evaluated on its own sub-objective; the global guide of
/// its particles is the published best of a (usually different) sub-swarm.
///
/// K. E. Parsopoulos, D. K. Tasoulis and M. N. Vrahatis, "Multiobjective
/// Optimization using Parallel Vector Evaluated Particle Swarm Optimization",
/// IASTED AIA 2004.
#[derive(Debug, Clone)]
pub struct VepsoGuideSelection {
	knowledge: KnowledgeTransferStrategy,
}

impl VepsoGuideSelection {
	pub fn new(knowledge: KnowledgeTransferStrategy) -> Self {
		Self { knowledge }
	}

	pub fn knowledge_transfer(&self) -> &KnowledgeTransferStrategy {
		&self.knowledge
	}

	pub fn select_guide(&self, ctx: &GuideContext<'_>) -> Result<Array1<f64>> {
		let populations = ctx.populations.ok_or(PsoError::NoPopulations)?;
		self.knowledge.transfer_knowledge(populations, ctx.population_index)
	}

	pub fn duplicate(&self) -> Self {
		Self { knowledge: self.knowledge.duplicate() }
	}
}

#[derive(Debug, Clone)]
pub enum GuideSelectionStrategy {
	NeighbourhoodBest,
	VectorEvaluated(VepsoGuideSelection),
}

impl Default for GuideSelectionStrategy {
	fn default() -> Self {
		GuideSelectionStrategy::NeighbourhoodBest
	}
}

impl GuideSelectionStrategy {
	pub fn from_policy(policy: GuidePolicy, random: RandomSource) -> Self {
		match policy {
			GuidePolicy::NeighbourhoodBest => GuideSelectionStrategy::NeighbourhoodBest,
			GuidePolicy::VectorEvaluated(k) => GuideSelectionStrategy::VectorEvaluated(
				VepsoGuideSelection::new(KnowledgeTransferStrategy::from_policy(k, random)),
			),
		}
	}

	/// Guide vector for `particle`; its length must match the particle.
	pub fn select_guide(&self, particle: &Particle, ctx: &GuideContext<'_>) -> Result<Array1<f64>> {
		let guide = match self {
			GuideSelectionStrategy::NeighbourhoodBest => ctx.neighbourhood_best.clone(),
			GuideSelectionStrategy::VectorEvaluated(vepso) => vepso.select_guide(ctx)?,
		};
		if guide.len() != particle.dimension() {
			return Err(PsoError::DimensionMismatch {
				what: "guide",
				expected: particle.dimension(),
				found: guide.len(),
			});
		}
		Ok(guide)
	}

	pub fn duplicate(&self) -> Self {
		match self {
			GuideSelectionStrategy::NeighbourhoodBest => GuideSelectionStrategy::NeighbourhoodBest,
			GuideSelectionStrategy::VectorEvaluated(v) => GuideSelectionStrategy::VectorEvaluated(v.duplicate()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fitness::Fitness;

	fn published(x: f64) -> Arc<Published> {
		Arc::new(Published { position: Array1::from(vec![x, x]), fitness: Fitness::Minimise(x), iteration: 3 })
	}

	fn particle() -> Particle {
		Particle::new(Array1::zeros(2), Array1::zeros(2)).unwrap()
	}

	#[test]
	fn test_nbest_returns_neighbourhood_best() {
		let nbest = Array1::from(vec![1.5, -2.0]);
		let ctx = GuideContext { neighbourhood_best: &nbest, populations: None, population_index: 0 };
		let guide = GuideSelectionStrategy::NeighbourhoodBest.select_guide(&particle(), &ctx).unwrap();
		assert_eq!(guide, nbest);
	}

	#[test]
	fn test_vepso_uses_other_population() {
		let pops = vec![published(10.0), published(20.0)];
		let own = Array1::from(vec![-1.0, -1.0]);
		let strategy = GuideSelectionStrategy::from_policy(
			GuidePolicy::VectorEvaluated(KnowledgePolicy::Ring { offset: 1 }),
			RandomSource::seeded(0),
		);
		let ctx = GuideContext { neighbourhood_best: &own, populations: Some(pops.as_slice()), population_index: 0 };
		assert_eq!(strategy.select_guide(&particle(), &ctx).unwrap().to_vec(), vec![20.0, 20.0]);
		let ctx = GuideContext { neighbourhood_best: &own, populations: Some(pops.as_slice()), population_index: 1 };
		assert_eq!(strategy.select_guide(&particle(), &ctx).unwrap().to_vec(), vec![10.0, 10.0]);
	}

	#[test]
	fn test_vepso_without_board_fails() {
		let own = Array1::zeros(2);
		let strategy = GuideSelectionStrategy::from_policy(
			GuidePolicy::VectorEvaluated(KnowledgePolicy::Random),
			RandomSource::seeded(0),
		);
		let ctx = GuideContext { neighbourhood_best: &own, populations: None, population_index: 0 };
		assert_eq!(strategy.select_guide(&particle(), &ctx).unwrap_err(), PsoError::NoPopulations);
	}

	#[test]
	fn test_guide_dimension_checked() {
		let pops = vec![Arc::new(Published { position: Array1::zeros(3), fitness: Fitness::Inferior, iteration: 0 })];
		let own = Array1::zeros(2);
		let strategy = GuideSelectionStrategy::VectorEvaluated(VepsoGuideSelection::new(
			KnowledgeTransferStrategy::Ring { offset: 0 },
		));
		let ctx = GuideContext { neighbourhood_best: &own, populations: Some(pops.as_slice()), population_index: 0 };
		assert!(matches!(
			strategy.select_guide(&particle(), &ctx),
			Err(PsoError::DimensionMismatch { what: "guide", expected: 2, found: 3 })
		));
	}
}
