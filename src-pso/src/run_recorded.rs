use ndarray::Array1;

use crate::particle_swarm::particle_swarm;
use crate::{OptimizationRecorder, PsoConfig, PsoReport};

/// Helper function for running particle swarm optimisation with recording
///
/// Installs an [`OptimizationRecorder`] callback (replacing any configured
/// one), minimises `func` and writes `<output_dir>/<function_name>.csv`.
pub fn run_recorded_particle_swarm<F>(
    function_name: &str,
    func: F,
    bounds: &[(f64, f64)],
    mut config: PsoConfig,
    output_dir: &str,
) -> Result<(PsoReport, String), Box<dyn std::error::Error>>
where
    F: Fn(&Array1<f64>) -> f64 + Send + Sync + 'static,
{
    let recorder = OptimizationRecorder::new(function_name.to_string());
    config.callback = Some(recorder.create_callback());

    let result = particle_swarm(func, bounds, config)?;
    let csv_path = recorder.save_to_csv(output_dir)?;

    Ok((result, csv_path))
}
