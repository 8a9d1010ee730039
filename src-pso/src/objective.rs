use ndarray::Array1;

use crate::fitness::Fitness;

/// Black-box objective consumed by the swarm.
///
/// Implementations must be pure: the same position always yields the same
/// fitness, and evaluation may happen on any rayon worker.
pub trait Objective: Send + Sync {
    fn evaluate(&self, x: &Array1<f64>) -> Fitness;
}

/// Minimise a plain function `x -> f(x)`
pub struct Minimise<F>(pub F);

/// Maximise a plain function `x -> f(x)`
pub struct Maximise<F>(pub F);

impl<F> Objective for Minimise<F>
where
    F: Fn(&Array1<f64>) -> f64 + Send + Sync,
{
    fn evaluate(&self, x: &Array1<f64>) -> Fitness {
        Fitness::Minimise((self.0)(x))
    }
}

impl<F> Objective for Maximise<F>
where
    F: Fn(&Array1<f64>) -> f64 + Send + Sync,
{
    fn evaluate(&self, x: &Array1<f64>) -> Fitness {
        Fitness::Maximise((self.0)(x))
    }
}
