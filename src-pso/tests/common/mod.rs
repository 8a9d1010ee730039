#![allow(dead_code)]

use ndarray::Array1;

pub fn sphere(x: &Array1<f64>) -> f64 {
    x.iter().map(|v| v * v).sum()
}

/// Sphere centred at `centre` in every dimension
pub fn shifted_sphere(centre: f64) -> impl Fn(&Array1<f64>) -> f64 + Send + Sync + 'static {
    move |x: &Array1<f64>| x.iter().map(|v| (v - centre) * (v - centre)).sum()
}

pub fn rosenbrock(x: &Array1<f64>) -> f64 {
    x.windows(2)
        .into_iter()
        .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
        .sum()
}

pub fn create_bounds(n: usize, half_width: f64) -> Vec<(f64, f64)> {
    vec![(-half_width, half_width); n]
}
