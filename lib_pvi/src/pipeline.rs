use std::path::Path;

use log::info;

use crate::{
    alignment::Alignment,
    config::Config,
    diagnostics::Diagnostics,
    error::Result,
    estimator::ParameterLayout,
    ingest::{IngestOptions, ingest},
    marginals::count_marginals,
    reweight::{NeighborScan, reweight},
    sample_size::estimate_sample_size,
};

/// Read the alignment at `path` and compute everything a parameter estimator needs.
///
/// The stages run in order: ingestion, reweighting, marginal counting and,
/// if reweighting is enabled, effective sample size estimation.
pub fn run(
    path: impl AsRef<Path>,
    config: &Config,
    diagnostics: &Diagnostics,
) -> Result<Alignment> {
    config.validate()?;

    let mut alignment = {
        let _timer = diagnostics.stage("reading the alignment");
        ingest(path, &IngestOptions::from_config(config)?)?
    };

    {
        let _timer = diagnostics.stage("reweighting");
        match config.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                pool.install(|| {
                    reweight(
                        &mut alignment,
                        config.theta,
                        config.scale,
                        NeighborScan::AllPairs,
                    )
                });
            }
            None => reweight(
                &mut alignment,
                config.theta,
                config.scale,
                NeighborScan::Symmetric,
            ),
        }
    }

    {
        let _timer = diagnostics.stage("counting marginals");
        count_marginals(&mut alignment, config.gap_reduce);
    }
    alignment.n_params = ParameterLayout::for_alignment(&alignment, config.estimator).n_params();

    if config.reweighting_enabled() {
        let _timer = diagnostics.stage("estimating the sample size");
        let ratio = estimate_sample_size(&mut alignment, &config.sample_size, diagnostics)?;
        info!(
            "Effective sample size: {:.1}\t({:.0}% identical neighborhood = {:.3} samples)",
            alignment.n_eff,
            100.0 * (1.0 - config.theta),
            ratio * config.scale
        );
    }

    Ok(alignment)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::run;
    use crate::{
        config::{Config, SampleSizeConfig},
        diagnostics::Diagnostics,
        error::Error,
    };

    fn write_alignment(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "lib_pvi_pipeline_{}_{name}.fa",
            std::process::id()
        ));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn without_reweighting() {
        let path = write_alignment("plain", ">s1\nAACA\n>s2\nAACA\n>s3\nCCAA\n");
        let config = Config {
            theta: 2.0,
            alphabet: Some("-AC".to_string()),
            ..Default::default()
        };
        let alignment = run(&path, &config, &Diagnostics::quiet()).unwrap();
        fs::remove_file(&path).unwrap();

        let fi = alignment.marginals.as_ref().unwrap().fi.site(0).to_vec();
        assert_eq!(alignment.n_eff, 3.0);
        assert_eq!(fi.len(), 3);
        assert_eq!(fi[0], 0.0);
        assert!((fi[1] - 2.0 / 3.0).abs() < 1e-12);
        assert!((fi[2] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(alignment.n_params, 4 * 3 + 6 * 9);
    }

    #[test]
    fn sequential_and_threaded_runs_agree() {
        let path = write_alignment(
            "threads",
            ">a\nACDEFG\n>b\nACDEFH\n>c\nKLMNPQ\n>d\nACDKLM\n>e\nACDEFG\n",
        );
        let config = Config {
            sample_size: SampleSizeConfig {
                iterations: 20,
                batch_size: 10,
                ..Default::default()
            },
            ..Default::default()
        };
        let threaded = Config {
            threads: Some(2),
            ..config.clone()
        };

        let sequential = run(&path, &config, &Diagnostics::quiet()).unwrap();
        let parallel = run(&path, &threaded, &Diagnostics::quiet()).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(sequential.weights, parallel.weights);
        assert_eq!(sequential.n_eff.to_bits(), parallel.n_eff.to_bits());
    }

    #[test]
    fn invalid_configuration_is_rejected_before_reading() {
        let config = Config {
            threads: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            run("/nonexistent.fa", &config, &Diagnostics::quiet()),
            Err(Error::Config(_))
        ));
    }
}
