use rand::Rng;
use rand_distr::{Distribution, Gamma};

/// Draw a probability vector from the Dirichlet posterior of the given counts.
///
/// Every code receives `prior` pseudocounts in addition to its count.
/// The draw is realised by normalising independent gamma draws.
/// Falls back to a uniform distribution if all draws vanish.
pub fn sample_categorical<R: Rng + ?Sized>(
    counts: &[f64],
    prior: f64,
    probabilities: &mut [f64],
    rng: &mut R,
) {
    debug_assert_eq!(counts.len(), probabilities.len());

    for (probability, &count) in probabilities.iter_mut().zip(counts) {
        *probability = match Gamma::new(count + prior, 1.0) {
            Ok(gamma) => gamma.sample(rng),
            Err(_) => 0.0,
        };
    }

    let sum: f64 = probabilities.iter().sum();
    if sum > 0.0 {
        let sum_inv = 1.0 / sum;
        probabilities
            .iter_mut()
            .for_each(|probability| *probability *= sum_inv);
    } else {
        probabilities.fill(1.0 / probabilities.len() as f64);
    }
}

/// Overwrite the probabilities with their cumulative sums.
pub fn cumulate(probabilities: &mut [f64]) {
    let mut sum = 0.0;
    for value in probabilities {
        sum += *value;
        *value = sum;
    }
}

/// The first code whose cumulative probability is at least `u`.
///
/// Returns the last code if rounding left the final cumulative value below `u`.
pub fn inverse_cdf(cdf: &[f64], u: f64) -> usize {
    cdf.iter()
        .position(|&cumulative| u <= cumulative)
        .unwrap_or(cdf.len() - 1)
}
