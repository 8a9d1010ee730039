//! Cross-population knowledge transfer for VEPSO.
//!
//! Each sub-population owns one slot of a [`KnowledgeBoard`] and is the only
//! writer of it. Readers never touch a swarm: they take an immutable snapshot
//! of all slots before a step and pick one entry from it.

use std::sync::Arc;

use ndarray::Array1;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{PsoError, Result};
use crate::fitness::Fitness;
use crate::random::RandomSource;

/// Best position a sub-population exposes to the others
#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub position: Array1<f64>,
    pub fitness: Fitness,
    pub iteration: usize,
}

/// One single-writer/multi-reader slot per sub-population.
#[derive(Debug)]
pub struct KnowledgeBoard {
    slots: Vec<RwLock<Arc<Published>>>,
}

impl KnowledgeBoard {
    pub fn new(initial: Vec<Published>) -> Self {
        Self { slots: initial.into_iter().map(|p| RwLock::new(Arc::new(p))).collect() }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Replace the published entry of population `index`
    pub fn publish(&self, index: usize, published: Published) {
        *self.slots[index].write() = Arc::new(published);
    }

    pub fn get(&self, index: usize) -> Arc<Published> {
        self.slots[index].read().clone()
    }

    /// Immutable view of every slot, taken at one point in time
    pub fn snapshot(&self) -> Vec<Arc<Published>> {
        self.slots.iter().map(|s| s.read().clone()).collect()
    }
}

/// Serializable choice of policy; the random stream is injected on build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum KnowledgePolicy {
    Random,
    Ring { offset: isize },
}

impl Default for KnowledgePolicy {
    fn default() -> Self {
        KnowledgePolicy::Ring { offset: 1 }
    }
}

#[derive(Debug, Clone)]
pub enum KnowledgeTransferStrategy {
    /// Uniform choice among all populations, own included
    Random(RandomSource),
    /// `(own + offset) mod count`
    Ring { offset: isize },
}

impl KnowledgeTransferStrategy {
    pub fn from_policy(policy: KnowledgePolicy, random: RandomSource) -> Self {
        match policy {
            KnowledgePolicy::Random => KnowledgeTransferStrategy::Random(random),
            KnowledgePolicy::Ring { offset } => KnowledgeTransferStrategy::Ring { offset },
        }
    }

    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// Index of the source population for a particle of population `own_index`
    pub fn select(&self, count: usize, own_index: usize) -> Result<usize> {
        if count == 0 {
            return Err(PsoError::NoPopulations);
        }
        let index = match self {
            KnowledgeTransferStrategy::Random(random) => random.index(count),
            KnowledgeTransferStrategy::Ring { offset } => {
                (own_index as isize + offset).rem_euclid(count as isize) as usize
            }
        };
        Ok(index)
    }

    /// Published best position of the selected population
    pub fn transfer_knowledge(&self, populations: &[Arc<Published>], own_index: usize) -> Result<Array1<f64>> {
        let index = self.select(populations.len(), own_index)?;
        Ok(populations[index].position.clone())
    }
}
