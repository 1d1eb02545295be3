use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;

use zonevf::io::{read_case, write_result};

#[derive(Parser, Debug)]
#[command(name = "zonevf")]
#[command(about = "View factors from sample points to the surfaces of a zone")]
#[command(version)]
struct Cli {
    /// Case file (JSON)
    case: PathBuf,

    /// Result file (JSON). Prints a per-point summary when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run on the calling thread only
    #[arg(long)]
    serial: bool,

    /// Number of worker threads (default: all available cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let mut case = read_case(&cli.case)?;
    if cli.serial {
        case.config.parallel = false;
    }
    if cli.threads.is_some() {
        case.config.num_workers = cli.threads;
    }

    let result = case
        .run()
        .with_context(|| format!("View factor run failed for {}", cli.case.display()))?;

    match &cli.output {
        Some(path) => {
            write_result(path, &result)?;
            info!("Result written to {}", path.display());
        }
        None => {
            for (p, pvf) in result.per_point().iter().enumerate() {
                let factors: Vec<String> =
                    pvf.view_factors.iter().map(|f| format!("{f:.4}")).collect();
                println!(
                    "{p:>5} {:.3} | sky {:.4} | {}",
                    pvf.point,
                    pvf.sky_view_factor,
                    factors.join(" ")
                );
            }
        }
    }
    for warning in &result.warnings {
        log::warn!("{warning:?}");
    }
    Ok(())
}
