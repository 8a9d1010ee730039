use ndarray::Array1;

use crate::error::{PsoError, Result};
use crate::random::RandomSource;

/// Per-dimension search domain `[lower[i], upper[i]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    lower: Array1<f64>,
    upper: Array1<f64>,
}

impl Bounds {
    pub fn new(lower: Array1<f64>, upper: Array1<f64>) -> Result<Self> {
        if lower.len() != upper.len() {
            return Err(PsoError::DimensionMismatch {
                what: "upper bounds",
                expected: lower.len(),
                found: upper.len(),
            });
        }
        for (i, (&lo, &hi)) in lower.iter().zip(upper.iter()).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || hi < lo {
                return Err(PsoError::InvalidBounds { dimension: i, lower: lo, upper: hi });
            }
        }
        Ok(Self { lower, upper })
    }

    /// Build from `(lower, upper)` pairs, SciPy style
    pub fn from_pairs(bounds: &[(f64, f64)]) -> Result<Self> {
        let lower = bounds.iter().map(|&(lo, _)| lo).collect::<Array1<f64>>();
        let upper = bounds.iter().map(|&(_, hi)| hi).collect::<Array1<f64>>();
        Self::new(lower, upper)
    }

    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &Array1<f64> {
        &self.lower
    }

    pub fn upper(&self) -> &Array1<f64> {
        &self.upper
    }

    pub fn span(&self, i: usize) -> f64 {
        self.upper[i] - self.lower[i]
    }

    pub fn check_dimension(&self, what: &'static str, found: usize) -> Result<()> {
        if found != self.dimension() {
            return Err(PsoError::DimensionMismatch { what, expected: self.dimension(), found });
        }
        Ok(())
    }

    /// Clip every component of `x` into the domain
    pub fn clamp_inplace(&self, x: &mut Array1<f64>) -> Result<()> {
        self.check_dimension("position", x.len())?;
        for i in 0..x.len() {
            if x[i] < self.lower[i] {
                x[i] = self.lower[i];
            }
            if x[i] > self.upper[i] {
                x[i] = self.upper[i];
            }
        }
        Ok(())
    }

    /// Uniform sample inside the domain; fixed dimensions return their bound.
    pub fn sample(&self, random: &RandomSource) -> Array1<f64> {
        Array1::from_shape_fn(self.dimension(), |i| {
            let span = self.span(i);
            if span > 0.0 { self.lower[i] + random.uniform() * span } else { self.lower[i] }
        })
    }
}
