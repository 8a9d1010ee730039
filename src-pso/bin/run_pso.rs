use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use ndarray::Array1;
use swarmopt_pso::{
    Bounds, GcParameters, GuidePolicy, IterationPolicy, KnowledgePolicy, Minimise, MultiPopulation,
    Objective, OptimizationRecorder, ParticleSwarm, PsoConfig, Topology, VelocityPolicy,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Problem {
    /// Sum of squares, optimum at the origin
    Sphere,
    /// Two spheres centred at 0 and 2, one VEPSO sub-swarm each
    Schaffer,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Velocity {
    Standard,
    Gc,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Transfer {
    Ring,
    Random,
}

/// Run particle swarm optimisation on a benchmark problem
#[derive(Parser)]
#[command(name = "run_pso")]
#[command(about = "Run standard, GC or vector-evaluated PSO on a benchmark problem")]
struct Cli {
    #[arg(long, value_enum, default_value = "sphere")]
    problem: Problem,

    #[arg(long, value_enum, default_value = "standard")]
    velocity: Velocity,

    /// Knowledge transfer between VEPSO sub-swarms
    #[arg(long, value_enum, default_value = "ring")]
    transfer: Transfer,

    /// Number of dimensions
    #[arg(short = 'n', long, default_value = "10")]
    dimensions: usize,

    /// Half-width of the search box [-b, b]
    #[arg(short, long, default_value = "5.12")]
    bound: f64,

    #[arg(long, default_value = "30")]
    popsize: usize,

    #[arg(long, default_value = "500")]
    maxiter: usize,

    #[arg(long)]
    seed: Option<u64>,

    /// Ring (lbest) topology radius; global best when absent
    #[arg(long)]
    ring: Option<usize>,

    /// Update particles one at a time instead of in lock-step
    #[arg(long)]
    asynchronous: bool,

    /// JSON configuration file; command-line flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the progress CSV
    #[arg(short, long)]
    output: Option<String>,
}

fn sphere_at(centre: f64) -> impl Fn(&Array1<f64>) -> f64 + Send + Sync {
    move |x: &Array1<f64>| x.iter().map(|v| (v - centre) * (v - centre)).sum()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PsoConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => PsoConfig::default(),
    };
    config.maxiter = cli.maxiter;
    config.popsize = cli.popsize;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(radius) = cli.ring {
        config.topology = Topology::Ring { radius };
    }
    if cli.asynchronous {
        config.iteration = IterationPolicy::Asynchronous;
    }
    if let Velocity::Gc = cli.velocity {
        config.velocity = VelocityPolicy::GuaranteedConvergence(GcParameters::default());
    }

    let recorder = OptimizationRecorder::new(format!("{:?}_{:?}", cli.problem, cli.velocity).to_lowercase());
    if cli.output.is_some() {
        config.callback = Some(recorder.create_callback());
    }

    let bounds = Bounds::from_pairs(&vec![(-cli.bound, cli.bound); cli.dimensions])?;
    match cli.problem {
        Problem::Sphere => {
            let objective = Arc::new(Minimise(sphere_at(0.0)));
            let report = ParticleSwarm::with_config(objective, bounds, config).solve()?;
            println!("{:?}", report);
            println!("best f = {:.6e}", report.fun());
            println!("best x = {:?}", report.x.to_vec());
        }
        Problem::Schaffer => {
            let knowledge = match cli.transfer {
                Transfer::Ring => KnowledgePolicy::Ring { offset: 1 },
                Transfer::Random => KnowledgePolicy::Random,
            };
            config.guide = GuidePolicy::VectorEvaluated(knowledge);
            let objectives: Vec<Arc<dyn Objective>> =
                vec![Arc::new(Minimise(sphere_at(0.0))), Arc::new(Minimise(sphere_at(2.0)))];
            let report = MultiPopulation::new(objectives, bounds, config)?.solve()?;
            println!("{} after {} iterations, nfev={}", report.message, report.nit, report.nfev);
            for (i, (x, f)) in report.x.iter().zip(report.fitness.iter()).enumerate() {
                println!("population {}: f = {:?}, x = {:?}", i, f, x.to_vec());
            }
        }
    }

    if let Some(dir) = &cli.output {
        let path = recorder.save_to_csv(dir)?;
        println!("progress written to {}", path);
    }
    Ok(())
}
