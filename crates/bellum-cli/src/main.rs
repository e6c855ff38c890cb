//! Bellum CLI - resource-task scheduling engine
//!
//! Loads a project file, runs one of the registered solvers against it, and
//! prints the resulting schedule.

mod input;
mod output;

use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bellum_core::{EstimationMatrix, PearsonEstimator};
use bellum_engine::{Scheduler, SolverRegistry};

use crate::output::SolutionSummaryDto;

#[derive(Parser)]
#[command(name = "bellum")]
#[command(author, version, about = "Resource-task scheduling engine", long_about = None)]
struct Cli {
    /// Verbose output (-v, -vv for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a project file with the given solver
    Run {
        /// Input project file (JSON)
        #[arg(value_name = "FILE")]
        file: std::path::PathBuf,

        /// Solver to use
        #[arg(short, long, default_value = "cp")]
        solver: String,

        /// Time budget for the solver, in seconds
        #[arg(short, long, default_value_t = 30)]
        time_limit: u64,

        /// Print every improving solution, not just the best one
        #[arg(long)]
        history: bool,
    },

    /// List the registered solvers
    Solvers,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    match cli.command {
        Commands::Run { file, solver, time_limit, history } => run(&file, &solver, time_limit, history),
        Commands::Solvers => list_solvers(),
    }
}

fn run(file: &std::path::Path, solver_name: &str, time_limit_secs: u64, history: bool) -> Result<()> {
    let contents = fs::read_to_string(file)
        .with_context(|| format!("failed to read project file {}", file.display()))?;
    let project = input::load(&contents)?;

    let registry = SolverRegistry::with_defaults();
    let descriptor = registry.find(solver_name)?;
    tracing::info!(solver = descriptor.name(), tasks = project.tasks().len(), "scheduling project");

    let scheduler = Scheduler::new(descriptor.algorithm());
    let estimation_matrix = EstimationMatrix::new(Box::new(PearsonEstimator::new()));
    let time_limit = Duration::from_secs(time_limit_secs);

    if history {
        let solutions = scheduler.collect_all_optimal_schedules(&project, &estimation_matrix, time_limit)?;
        println!("{}", serde_json::to_string_pretty(&SolutionSummaryDto::from_history(&solutions))?);
    } else {
        let solution = scheduler.find_optimal_schedule(&project, &estimation_matrix, time_limit, |improved| {
            tracing::debug!(optimal = improved.optimal, "improved solution found");
        })?;
        println!("{}", serde_json::to_string_pretty(&SolutionSummaryDto::from_solution(&solution))?);
    }

    Ok(())
}

fn list_solvers() -> Result<()> {
    let registry = SolverRegistry::with_defaults();
    for name in registry.names() {
        let descriptor = registry.find(name)?;
        println!("{:<6} {}", descriptor.name(), descriptor.description());
    }
    Ok(())
}
