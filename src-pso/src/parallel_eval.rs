use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::fitness::Fitness;
use crate::objective::Objective;

/// Parallel evaluation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Evaluate particles (and step sub-swarms) on the rayon pool
    pub enabled: bool,
    /// Size of the global rayon pool; `None` keeps rayon's default
    pub num_threads: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self { enabled: true, num_threads: None }
    }
}

impl ParallelConfig {
    /// Configure the global rayon pool once; later calls are ignored by rayon.
    pub fn install(&self) {
        if let Some(n) = self.num_threads {
            let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
        }
    }
}

/// Evaluate every position, preserving order
pub fn evaluate_positions(
    positions: &[&Array1<f64>],
    objective: &dyn Objective,
    config: &ParallelConfig,
) -> Vec<Fitness> {
    if config.enabled {
        positions.par_iter().map(|x| objective.evaluate(x)).collect()
    } else {
        positions.iter().map(|x| objective.evaluate(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::Minimise;

    #[test]
    fn test_parallel_matches_sequential() {
        let objective = Minimise(|x: &Array1<f64>| x.iter().map(|v| v * v).sum::<f64>());
        let xs: Vec<Array1<f64>> = (0..64).map(|i| Array1::from(vec![i as f64, -(i as f64)])).collect();
        let refs: Vec<&Array1<f64>> = xs.iter().collect();
        let par = evaluate_positions(&refs, &objective, &ParallelConfig::default());
        let seq = evaluate_positions(&refs, &objective, &ParallelConfig { enabled: false, num_threads: None });
        assert_eq!(par, seq);
        assert_eq!(seq[3], Fitness::Minimise(18.0));
    }
}
