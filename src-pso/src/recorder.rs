use std::fs::create_dir_all;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::fitness::Fitness;
use crate::{CallbackAction, PsoIntermediate};

/// Records optimisation progress via PSO callbacks
#[derive(Debug)]
pub struct OptimizationRecorder {
    /// Function name (used for CSV filename)
    function_name: String,
    records: Arc<Mutex<Vec<OptimizationRecord>>>,
    /// Best fitness seen so far
    best: Arc<Mutex<Option<Fitness>>>,
}

/// A single optimisation iteration record
#[derive(Debug, Clone)]
pub struct OptimizationRecord {
    pub iteration: usize,
    /// Best x found so far
    pub x: Vec<f64>,
    /// Best function result so far
    pub best_result: f64,
    /// Whether this iteration improved the best known result
    pub is_improvement: bool,
}

impl OptimizationRecorder {
    pub fn new(function_name: String) -> Self {
        Self {
            function_name,
            records: Arc::new(Mutex::new(Vec::new())),
            best: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a callback function that records optimisation progress
    pub fn create_callback(&self) -> Box<dyn FnMut(&PsoIntermediate) -> CallbackAction + Send> {
        let records = self.records.clone();
        let best = self.best.clone();

        Box::new(move |intermediate: &PsoIntermediate| -> CallbackAction {
            let is_improvement = {
                let mut best_guard = best.lock();
                let improved = match *best_guard {
                    Some(previous) => match intermediate.fitness.is_better_than(&previous) {
                        Ok(better) => better,
                        Err(e) => {
                            log::warn!("recorder cannot compare fitness at iteration {}: {}", intermediate.iter, e);
                            false
                        }
                    },
                    None => true,
                };
                if improved {
                    *best_guard = Some(intermediate.fitness);
                }
                improved
            };

            records.lock().push(OptimizationRecord {
                iteration: intermediate.iter,
                x: intermediate.x.to_vec(),
                best_result: intermediate.fitness.value().unwrap_or(f64::NAN),
                is_improvement,
            });
            CallbackAction::Continue
        })
    }

    /// Save all recorded iterations to `<output_dir>/<function_name>.csv`
    pub fn save_to_csv(&self, output_dir: &str) -> Result<String, Box<dyn std::error::Error>> {
        create_dir_all(output_dir)?;
        let filename = Path::new(output_dir).join(format!("{}.csv", self.function_name));
        let mut writer = csv::Writer::from_path(&filename)?;

        let records = self.records.lock();
        if let Some(first) = records.first() {
            let mut header = vec!["iteration".to_string()];
            header.extend((0..first.x.len()).map(|i| format!("x{}", i)));
            header.push("best_result".to_string());
            header.push("is_improvement".to_string());
            writer.write_record(&header)?;

            for record in records.iter() {
                let mut row = vec![record.iteration.to_string()];
                row.extend(record.x.iter().map(|xi| xi.to_string()));
                row.push(record.best_result.to_string());
                row.push(record.is_improvement.to_string());
                writer.write_record(&row)?;
            }
        }
        writer.flush()?;

        Ok(filename.to_string_lossy().into_owned())
    }

    pub fn get_records(&self) -> Vec<OptimizationRecord> {
        self.records.lock().clone()
    }

    pub fn num_iterations(&self) -> usize {
        self.records.lock().len()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
        *self.best.lock() = None;
    }

    /// Get the final best solution if any iterations were recorded
    pub fn get_best_solution(&self) -> Option<(Vec<f64>, f64)> {
        self.records.lock().last().map(|r| (r.x.clone(), r.best_result))
    }
}
