use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use env_logger::Builder;

use simplex_lp::config::SolverConfig;
use simplex_lp::generate::random_batch;
use simplex_lp::io::{load_batch, load_problem, write_batch, write_report, SolutionReport};
use simplex_lp::oracle::{compare_batch, ReferenceOracle};
use simplex_lp::two_phase;

#[derive(Debug, Parser)]
#[command(version, about = "Solve linear programs with the two-phase revised simplex method")]
struct Cli {
    /// Solve the problem in this JSON file and print the result
    #[arg(long, value_name = "PATH", conflicts_with_all = ["test", "generate"])]
    solve: Option<PathBuf>,

    /// Compare every problem in this JSON array against the reference solver
    #[arg(long, value_name = "PATH", conflicts_with = "generate")]
    test: Option<PathBuf>,

    /// Write a batch of random problems to this file
    #[arg(long, value_name = "PATH")]
    generate: Option<PathBuf>,

    /// Number of problems written by --generate
    #[arg(long, default_value_t = 10)]
    count: usize,

    /// Seed for --generate
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Pivot limit per simplex phase
    #[arg(long, default_value_t = SolverConfig::DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Interpreter used to run the reference solver
    #[arg(long, default_value = "python3")]
    oracle: String,

    /// Reference solver script
    #[arg(long, default_value = "scripts/solve_reference.py")]
    oracle_script: PathBuf,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

pub fn main() -> Result<()> {
    // Unknown arguments are reported, not treated as a failure.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().context("Printing usage")?;
            return Ok(());
        },
    };

    Builder::new().filter_level(cli.verbose.log_level_filter()).init();

    let config = SolverConfig::default().with_max_iterations(cli.max_iterations);

    if let Some(path) = cli.solve {
        let document = load_problem(&path)
            .with_context(|| format!("Reading problem {}", path.display()))?;
        let problem = document.to_general_form().context("Checking problem")?;
        let solution = two_phase::solve(&problem, &config).context("Solving problem")?;
        write_report(io::stdout().lock(), &SolutionReport::from(&solution))
            .context("Writing solution")?;
    } else if let Some(path) = cli.test {
        let documents = load_batch(&path)
            .with_context(|| format!("Reading problems {}", path.display()))?;
        let oracle = ReferenceOracle::new(cli.oracle, cli.oracle_script);
        let report = compare_batch(&documents, &oracle, &config).context("Comparing results")?;
        println!("{} problems: {} match, {} differ, {} skipped",
                 documents.len(), report.matches, report.mismatches, report.skipped);
    } else if let Some(path) = cli.generate {
        let documents = random_batch(cli.count, cli.seed);
        let file = File::create(&path)
            .with_context(|| format!("Creating {}", path.display()))?;
        write_batch(BufWriter::new(file), &documents).context("Writing problems")?;
        log::info!("wrote {} problems to {}", documents.len(), path.display());
    } else {
        println!("No command provided, see --help");
    }

    Ok(())
}
