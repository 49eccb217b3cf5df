use clap::Parser;

use pvi::stats;

/// Sufficient statistics and effective sample sizes for Potts models of multiple sequence alignments.
#[derive(Parser)]
#[command(version)]
enum Cli {
    /// Reweight an alignment, count its marginals and estimate its effective sample size.
    Stats(stats::Cli),
}

fn main() -> anyhow::Result<()> {
    match Cli::parse() {
        Cli::Stats(cli) => stats::cli(cli),
    }
}
