//! Calibration of the effective sample size against the finite-sample bias of mutual information.
//!
//! The weighted alignment has an average pairwise mutual information.
//! Independent site pairs sampled `N` times show a positive mutual information
//! that shrinks as `N` grows. A Robbins-Monro iteration searches for the `N` at which
//! both agree, and the sequence weights are rescaled so that they sum to that `N`.

use log::{debug, info, warn};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    alignment::{Alignment, Marginals},
    config::SampleSizeConfig,
    diagnostics::Diagnostics,
    error::{Error, Result},
    index::pairs,
};

use categorical::{cumulate, inverse_cdf, sample_categorical};

mod categorical;

#[cfg(test)]
mod tests;

/// Rescale the sequence weights to the estimated effective sample size.
///
/// Requires marginals to have been counted and a valid configuration.
/// If they were conditioned on non-gaps, the sample size of each site pair is reduced
/// by its joint non-gap fraction.
///
/// Returns the ratio by which all weights were multiplied.
pub fn estimate_sample_size(
    alignment: &mut Alignment,
    config: &SampleSizeConfig,
    diagnostics: &Diagnostics,
) -> Result<f64> {
    config.validate()?;
    let marginals = alignment.marginals.as_ref().ok_or(Error::MissingMarginals)?;
    let n_sites = alignment.n_sites();
    if n_sites < 2 {
        warn!("Sample size estimation requires at least two sites, keeping the current weights");
        return Ok(1.0);
    }

    let average_mi = average_mutual_information(marginals);
    debug!("Average mutual information of the alignment: {average_mi:.6}");

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut trial = Trial::new(marginals.fi.n_codes());
    let mut log_n = alignment.n_eff.ln();

    for round in 0..config.iterations {
        let n = log_n.exp();
        let mut batch_mi = 0.0;
        for _ in 0..config.batch_size {
            batch_mi += trial.run(marginals, n, config.prior, &mut rng);
        }
        batch_mi /= config.batch_size as f64;

        if diagnostics.report_round(round) {
            info!("{:8}\t{:8.3}\t{:8.2}", round + 1, batch_mi, n);
        }

        log_n += (batch_mi - average_mi) * (config.learning_rate / (round + 1) as f64);
    }

    let n_eff = log_n.exp();
    let ratio = n_eff / alignment.n_eff;
    for weight in &mut alignment.weights {
        *weight *= ratio;
    }
    alignment.n_eff = n_eff;

    Ok(ratio)
}

/// The mutual information of all site pairs, averaged over the pairs.
///
/// Returns zero if there are no pairs.
pub fn average_mutual_information(marginals: &Marginals) -> f64 {
    let n_sites = marginals.fi.n_sites();
    let mut sum = 0.0;
    let mut n_pairs = 0;
    for (i, j) in pairs(n_sites) {
        sum += mutual_information(
            marginals.fij.block(i, j),
            marginals.fi.site(i),
            marginals.fi.site(j),
        );
        n_pairs += 1;
    }

    if n_pairs == 0 {
        0.0
    } else {
        sum / n_pairs as f64
    }
}

/// The mutual information of a joint distribution with row marginals `fi` and column marginals `fj`.
///
/// Zero entries of the joint distribution do not contribute.
fn mutual_information(joint: &[f64], fi: &[f64], fj: &[f64]) -> f64 {
    let n_codes = fj.len();
    joint
        .iter()
        .enumerate()
        .filter(|&(_, &p)| p > 0.0)
        .map(|(index, &p)| p * (p.ln() - fi[index / n_codes].ln() - fj[index % n_codes].ln()))
        .sum()
}

/// Scratch space for sampling the mutual information of an independent site pair.
struct Trial {
    n_codes: usize,
    counts_i: Vec<f64>,
    counts_j: Vec<f64>,
    cdf_i: Vec<f64>,
    cdf_j: Vec<f64>,
    joint: Vec<f64>,
    sampled_i: Vec<f64>,
    sampled_j: Vec<f64>,
}

impl Trial {
    fn new(n_codes: usize) -> Self {
        Self {
            n_codes,
            counts_i: vec![0.0; n_codes],
            counts_j: vec![0.0; n_codes],
            cdf_i: vec![0.0; n_codes],
            cdf_j: vec![0.0; n_codes],
            joint: vec![0.0; n_codes * n_codes],
            sampled_i: vec![0.0; n_codes],
            sampled_j: vec![0.0; n_codes],
        }
    }

    /// Pick a random site pair and return the mutual information of `n` samples
    /// drawn from the product of its resampled site distributions.
    fn run(&mut self, marginals: &Marginals, n: f64, prior: f64, rng: &mut StdRng) -> f64 {
        let n_sites = marginals.fi.n_sites();
        let i = rng.gen_range(0..n_sites);
        let mut j = rng.gen_range(0..n_sites - 1);
        if j >= i {
            j += 1;
        }

        let local_n = match &marginals.gaps {
            Some(gaps) => n * gaps.ungapij[[i.min(j), i.max(j)]],
            None => n,
        };
        let n_samples = stochastic_round(local_n, rng);
        if n_samples == 0 {
            return 0.0;
        }
        let samples = n_samples as f64;

        for (count, &f) in self.counts_i.iter_mut().zip(marginals.fi.site(i)) {
            *count = (samples * f).round();
        }
        for (count, &f) in self.counts_j.iter_mut().zip(marginals.fi.site(j)) {
            *count = (samples * f).round();
        }
        sample_categorical(&self.counts_i, prior, &mut self.cdf_i, rng);
        sample_categorical(&self.counts_j, prior, &mut self.cdf_j, rng);
        cumulate(&mut self.cdf_i);
        cumulate(&mut self.cdf_j);

        self.joint.fill(0.0);
        let sample_weight = 1.0 / samples;
        for _ in 0..n_samples {
            let a = inverse_cdf(&self.cdf_i, rng.gen_range(0.0..1.0));
            let b = inverse_cdf(&self.cdf_j, rng.gen_range(0.0..1.0));
            self.joint[a * self.n_codes + b] += sample_weight;
        }

        for (a, sampled) in self.sampled_i.iter_mut().enumerate() {
            *sampled = self.joint[a * self.n_codes..(a + 1) * self.n_codes]
                .iter()
                .sum();
        }
        for (b, sampled) in self.sampled_j.iter_mut().enumerate() {
            *sampled = self.joint[b..].iter().step_by(self.n_codes).sum();
        }

        mutual_information(&self.joint, &self.sampled_i, &self.sampled_j)
    }
}

/// Round down, or up with a probability equal to the fractional part.
fn stochastic_round(value: f64, rng: &mut StdRng) -> usize {
    let floor = value.floor();
    let round_up = rng.gen_range(0.0..1.0) < value - floor;
    floor as usize + usize::from(round_up)
}
