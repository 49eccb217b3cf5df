use std::{
    env,
    path::{Path, PathBuf},
    process,
};

use anyhow::{Result, anyhow};
use clap::Parser;
use pvi::stats;

pub fn run_in_repo_root(args: &str) -> Result<()> {
    // The manifest directory is "[...]/pvi/pvi-tests", fixtures are referenced from "[...]/pvi".
    env::set_current_dir(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .ok_or(anyhow!("No parent directory"))?,
    )?;

    if args.starts_with("stats ") {
        let args = stats::Cli::parse_from(args.split_whitespace());
        stats::cli(args)?;
    } else {
        return Err(anyhow!("Unknown subcommand in {args:?}"));
    }

    Ok(())
}

/// A path in the temporary directory that is unique to this test process.
pub fn output_path(name: &str) -> PathBuf {
    env::temp_dir().join(format!("pvi_tests_{}_{name}", process::id()))
}
