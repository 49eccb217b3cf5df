use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use lib_pvi::{
    alignment::Alignment,
    config::{Config, Estimator},
    diagnostics::Diagnostics,
    estimator::{IndexedEstimator, ParameterEstimator},
    output::{write_coupling_scores, write_parameters},
    pipeline,
};
use log::{LevelFilter, info, warn};
use serde::Serialize;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

#[derive(Parser)]
pub struct Cli {
    #[clap(long, short = 'l', default_value = "info")]
    log_level: LevelFilter,

    /// The aligned sequences in fasta format.
    #[clap(long, short = 'i')]
    alignment: PathBuf,

    /// A configuration file in toml format.
    ///
    /// Settings given on the command line take precedence.
    #[clap(long, short = 'c')]
    config: Option<PathBuf>,

    /// Sequences with at most this fraction of differing sites are neighbours.
    ///
    /// Values outside of [0, 1] disable reweighting and sample size estimation.
    #[clap(long, short = 't', allow_hyphen_values = true)]
    theta: Option<f64>,

    /// The effective number of samples per neighbourhood.
    #[clap(long, short = 's')]
    scale: Option<f64>,

    /// A prefix of the name of the focus sequence.
    #[clap(long, short = 'f')]
    focus: Option<String>,

    /// A custom alphabet whose first symbol is the gap.
    #[clap(long, short = 'a', allow_hyphen_values = true)]
    alphabet: Option<String>,

    /// Condition all statistics on non-gap characters.
    #[clap(long, short = 'g')]
    gap_reduce: bool,

    #[clap(long, short = 'e')]
    estimator: Option<Estimator>,

    /// Number of threads for reweighting.
    #[clap(long, short = 'j')]
    threads: Option<usize>,

    /// Number of rounds of the sample size estimation.
    #[clap(long)]
    iterations: Option<usize>,

    /// Seed of the sample size estimation.
    #[clap(long)]
    seed: Option<u64>,

    /// Log the duration of each stage.
    #[clap(long)]
    timing: bool,

    /// The file to store the alignment statistics in toml format.
    #[clap(long, short = 'o')]
    output: Option<PathBuf>,

    /// The file to store the sequence weights in tsv format.
    #[clap(long, short = 'w')]
    weights: Option<PathBuf>,

    /// Write parameters that encode their own position in the binary parameter format.
    ///
    /// Useful to check readers of the format, since no parameters are estimated.
    #[clap(long)]
    debug_parameters: Option<PathBuf>,

    /// Write coupling scores of the position-encoding parameters.
    #[clap(long)]
    debug_couplings: Option<PathBuf>,

    /// Report raw coupling norms without average product correction.
    #[clap(long)]
    zero_apc: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    n_seqs: usize,
    n_sites: usize,
    n_codes: usize,
    n_pairs: usize,
    n_params: usize,
    n_eff: f64,
    alphabet: String,
    focus: Option<FocusSummary>,
}

#[derive(Debug, Serialize)]
struct FocusSummary {
    name: String,
    row: usize,
    sequence: String,
    offsets: Vec<usize>,
}

pub fn cli(cli: Cli) -> Result<()> {
    if let Err(error) = TermLogger::init(
        cli.log_level,
        Default::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        warn!("Logger was not initialised: {error}");
    }

    let config = load_config(&cli)?;
    let diagnostics = Diagnostics::new(&config.diagnostics);
    let alignment = pipeline::run(&cli.alignment, &config, &diagnostics)
        .with_context(|| format!("Processing alignment {:?} failed", cli.alignment))?;

    info!(
        "{} sequences, {} sites, {} codes, effective sample size {:.1}",
        alignment.n_seqs(),
        alignment.n_sites(),
        alignment.n_codes,
        alignment.n_eff
    );

    if let Some(output) = &cli.output {
        let summary = toml::to_string(&summarise(&alignment))?;
        fs::write(output, summary).with_context(|| format!("Writing {output:?} failed"))?;
    }

    if let Some(weights) = &cli.weights {
        write_weights(weights, &alignment)?;
    }

    if cli.debug_parameters.is_some() || cli.debug_couplings.is_some() {
        let parameters = IndexedEstimator.estimate(&alignment, &config)?;

        if let Some(path) = &cli.debug_parameters {
            info!("Writing position-encoding parameters to {path:?}");
            write_parameters(create(path)?, &alignment, &parameters)?;
        }
        if let Some(path) = &cli.debug_couplings {
            info!("Writing coupling scores of position-encoding parameters to {path:?}");
            write_coupling_scores(create(path)?, &alignment, &parameters, config.zero_apc)?;
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config: Config = if let Some(path) = &cli.config {
        info!("Loading configuration {path:?}");
        let config = fs::read_to_string(path)
            .with_context(|| format!("Reading configuration {path:?} failed"))?;
        toml::from_str(&config)
            .with_context(|| format!("Parsing configuration {path:?} failed"))?
    } else {
        Config::default()
    };

    if let Some(theta) = cli.theta {
        config.theta = theta;
    }
    if let Some(scale) = cli.scale {
        config.scale = scale;
    }
    if let Some(focus) = &cli.focus {
        config.focus = Some(focus.clone());
    }
    if let Some(alphabet) = &cli.alphabet {
        config.alphabet = Some(alphabet.clone());
    }
    if let Some(estimator) = cli.estimator {
        config.estimator = estimator;
    }
    if let Some(threads) = cli.threads {
        config.threads = Some(threads);
    }
    if let Some(iterations) = cli.iterations {
        config.sample_size.iterations = iterations;
    }
    if let Some(seed) = cli.seed {
        config.sample_size.seed = seed;
    }
    config.gap_reduce |= cli.gap_reduce;
    config.zero_apc |= cli.zero_apc;
    config.diagnostics.timing |= cli.timing;

    Ok(config)
}

fn summarise(alignment: &Alignment) -> Summary {
    let focus = alignment.target.map(|row| FocusSummary {
        name: alignment.names[row].clone(),
        row,
        sequence: (0..alignment.n_sites())
            .filter_map(|site| alignment.focus_symbol(site))
            .collect(),
        offsets: (0..alignment.n_sites())
            .map(|site| alignment.site_number(site))
            .collect(),
    });

    Summary {
        n_seqs: alignment.n_seqs(),
        n_sites: alignment.n_sites(),
        n_codes: alignment.n_codes,
        n_pairs: alignment.n_pairs(),
        n_params: alignment.n_params,
        n_eff: alignment.n_eff,
        alphabet: alignment.alphabet.to_string(),
        focus,
    }
}

fn write_weights(path: &Path, alignment: &Alignment) -> Result<()> {
    info!("Writing sequence weights to {path:?}");
    let mut output = BufWriter::new(create(path)?);
    writeln!(output, "name\tweight")?;
    for (name, weight) in alignment.names.iter().zip(&alignment.weights) {
        writeln!(output, "{name}\t{weight}")?;
    }
    output.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("Creating {path:?} failed"))
}
