//! Command line entry point: solve one Solomon instance and print the result.

use clap::Parser;
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use vrptw_hyper::config::{Config, Variant};
use vrptw_hyper::problem::{DistancePrecision, Problem};
use vrptw_hyper::utils::round2;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Instance file in Solomon format
    #[arg(short, long)]
    file: PathBuf,

    /// Strategy: expo, expo-record, kheiri, kheiri-all, thompson, thompson-record, alns, alns-improved
    #[arg(short, long, default_value_t = Variant::ExpoHyper)]
    variant: Variant,

    /// Time limit in seconds
    #[arg(short, long)]
    time: Option<f64>,

    /// Maximum number of applied sequences
    #[arg(short, long)]
    iterations: Option<u64>,

    /// Acceptance tolerance
    #[arg(long, default_value_t = 0.01)]
    delta: f64,

    /// Learning rate of the exponential weights
    #[arg(long, default_value_t = 0.5)]
    eta: f64,

    /// Floor of every transition probability
    #[arg(long, default_value_t = 0.01)]
    alpha: f64,

    /// Floor and ceiling of the apply probability
    #[arg(long, default_value_t = 0.1)]
    beta: f64,

    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Keep full precision travel times instead of truncating to one decimal
    #[arg(long)]
    exact_distances: bool,

    /// Add the probing operators to the catalog
    #[arg(long)]
    diagnostic: bool,

    /// Do not echo the run transcript
    #[arg(short, long)]
    quiet: bool,

    /// Write the run report as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::new()
            .with_variant(self.variant)
            .with_delta(self.delta)
            .with_eta(self.eta)
            .with_alpha(self.alpha)
            .with_beta(self.beta)
            .with_seed(self.seed)
            .with_verbose(!self.quiet)
            .with_diagnostic_operators(self.diagnostic);

        if let Some(seconds) = self.time {
            config = config.with_time_limit(Duration::from_secs_f64(seconds.max(0.0)));
        } else if self.iterations.is_some() {
            // An iteration budget alone bounds the run
            config = config.without_time_limit();
        }
        if let Some(iterations) = self.iterations {
            config = config.with_iteration_limit(iterations);
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.config();
    config.validate()?;

    let precision = if args.exact_distances {
        DistancePrecision::Exact
    } else {
        DistancePrecision::OneDecimal
    };
    let problem = Problem::from_file(&args.file, precision)?;
    info!(
        "Loaded problem: {} with {} customers",
        problem.name,
        problem.get_customer_count()
    );

    let report = vrptw_hyper::solve(&problem, config)?;

    println!("Algorithm: {}", report.algorithm);
    println!("Feasible: {}", report.feasible);
    if report.feasible {
        println!("Total cost: {:.2}", report.total_cost);
    } else {
        println!("Total cost: infeasible");
    }
    println!("Routes: {}", report.routes.len());
    println!("Iterations: {}", report.iterations);
    println!("Run time: {}s", round2(report.run_time));

    if let Some(path) = &args.output {
        report.save_json(path)?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}
