use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    alphabet::Alphabet,
    error::{Error, Result},
};

pub const REWEIGHTING_THETA: f64 = 0.20;
pub const REWEIGHTING_SCALE: f64 = 1.0;

/// Settings for a complete statistics run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Sequences with at most this fraction of differing sites are neighbours.
    ///
    /// Values outside of `[0, 1]` disable reweighting.
    pub theta: f64,

    /// The effective number of samples per neighbourhood.
    pub scale: f64,

    /// A prefix of the name of the focus sequence.
    pub focus: Option<String>,

    /// A custom alphabet. The amino acid alphabet is used if not set.
    pub alphabet: Option<String>,

    /// Condition all statistics on non-gap characters.
    pub gap_reduce: bool,

    /// The parameter estimator that consumes the statistics.
    pub estimator: Estimator,

    /// Report raw coupling norms instead of applying the average product correction.
    pub zero_apc: bool,

    /// Number of worker threads for reweighting.
    ///
    /// If unset, reweighting runs sequentially and exploits the symmetry of sequence identity.
    pub threads: Option<usize>,

    pub sample_size: SampleSizeConfig,

    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Estimator {
    /// Maximum a posteriori estimation with the pseudo-likelihood.
    PseudoLikelihood,
    /// Maximum a posteriori estimation with persistent Markov chains.
    Persistent,
    /// Full Bayesian estimation.
    Bayes,
    /// Variational Bayes, producing posterior means and standard deviations.
    Variational,
}

/// Settings for the stochastic effective sample size estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SampleSizeConfig {
    /// Number of Robbins-Monro rounds.
    pub iterations: usize,
    /// Number of random site pairs sampled per round.
    pub batch_size: usize,
    pub learning_rate: f64,
    pub seed: u64,
    /// Dirichlet pseudocount added to every code when resampling site distributions.
    pub prior: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Log sample size estimation progress every this many rounds. Zero disables progress reports.
    pub progress_interval: usize,
    /// Log the duration of each pipeline stage at info level.
    pub timing: bool,
}

impl Config {
    pub fn alphabet(&self) -> Result<Alphabet> {
        match &self.alphabet {
            Some(symbols) => Alphabet::custom(symbols),
            None => Ok(Alphabet::protein()),
        }
    }

    /// Returns true if sequence reweighting is enabled.
    pub fn reweighting_enabled(&self) -> bool {
        (0.0..=1.0).contains(&self.theta)
    }

    /// Returns an error if a setting is outside its domain.
    ///
    /// A `theta` outside of `[0, 1]` is not an error, it disables reweighting.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale > 0.0) || !self.scale.is_finite() {
            return Err(Error::Config(format!(
                "scale must be positive, but is {}",
                self.scale
            )));
        }
        if self.threads == Some(0) {
            return Err(Error::Config("threads must be at least one".to_string()));
        }
        self.sample_size.validate()?;
        self.alphabet()?;
        Ok(())
    }
}

impl SampleSizeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config(
                "sample size batch size must be at least one".to_string(),
            ));
        }
        if !self.learning_rate.is_finite() {
            return Err(Error::Config(format!(
                "sample size learning rate must be finite, but is {}",
                self.learning_rate
            )));
        }
        if !(self.prior > 0.0) {
            return Err(Error::Config(format!(
                "sample size prior must be positive, but is {}",
                self.prior
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theta: REWEIGHTING_THETA,
            scale: REWEIGHTING_SCALE,
            focus: None,
            alphabet: None,
            gap_reduce: false,
            estimator: Estimator::PseudoLikelihood,
            zero_apc: false,
            threads: None,
            sample_size: Default::default(),
            diagnostics: Default::default(),
        }
    }
}

impl Default for SampleSizeConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            batch_size: 100,
            learning_rate: 10.0,
            seed: 42,
            prior: 1.0,
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            progress_interval: 50,
            timing: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Estimator, SampleSizeConfig};
    use crate::error::Error;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert!(config.reweighting_enabled());
        assert!(config.alphabet().unwrap().is_protein());
    }

    #[test]
    fn partial_toml() {
        let config: Config = toml::from_str(
            "theta = 1.5\nestimator = \"variational\"\n\n[sample_size]\niterations = 10\n",
        )
        .unwrap();
        assert_eq!(config.theta, 1.5);
        assert!(!config.reweighting_enabled());
        assert_eq!(config.estimator, Estimator::Variational);
        assert_eq!(config.sample_size.iterations, 10);
        assert_eq!(config.sample_size.batch_size, 100);
        assert_eq!(config.scale, 1.0);
    }

    #[test]
    fn invalid_values() {
        let mut config = Config {
            scale: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        config.scale = 1.0;
        config.threads = Some(0);
        assert!(config.validate().is_err());
        config.threads = Some(2);
        config.alphabet = Some(String::new());
        assert!(config.validate().is_err());
        config.alphabet = Some("-ACGT".to_string());
        config.validate().unwrap();
    }

    #[test]
    fn invalid_sample_size_values() {
        for sample_size in [
            SampleSizeConfig {
                batch_size: 0,
                ..Default::default()
            },
            SampleSizeConfig {
                learning_rate: f64::NAN,
                ..Default::default()
            },
            SampleSizeConfig {
                prior: -1.0,
                ..Default::default()
            },
        ] {
            assert!(matches!(sample_size.validate(), Err(Error::Config(_))));
            let config = Config {
                sample_size,
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(Error::Config(_))));
        }
    }

    #[test]
    fn theta_out_of_range_is_not_an_error() {
        let config = Config {
            theta: -1.0,
            ..Default::default()
        };
        config.validate().unwrap();
        assert!(!config.reweighting_enabled());
    }
}
