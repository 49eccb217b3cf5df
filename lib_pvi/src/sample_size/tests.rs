use ndarray::{Array2, array};

use super::{average_mutual_information, estimate_sample_size};
use crate::{
    alignment::Alignment, alphabet::Alphabet, config::SampleSizeConfig,
    diagnostics::Diagnostics, error::Error, marginals::count_marginals,
};

fn counted(sequences: Array2<i8>, gap_reduce: bool) -> Alignment {
    let names = (0..sequences.nrows()).map(|s| format!("s{s}")).collect();
    let mut alignment = Alignment::new(Alphabet::custom("-AC").unwrap(), sequences, names);
    count_marginals(&mut alignment, gap_reduce);
    alignment
}

fn mixed() -> Array2<i8> {
    array![
        [1, 2, 1, 0, 2, 1],
        [1, 2, 2, 1, 2, 1],
        [2, 1, 1, 1, 0, 2],
        [2, 2, 2, 0, 1, 1],
        [1, 1, 1, 2, 2, 2],
        [0, 2, 1, 1, 1, 1],
        [1, 2, 2, 2, 2, 0],
        [2, 1, 1, 1, 2, 1]
    ]
}

fn short_run() -> SampleSizeConfig {
    SampleSizeConfig {
        iterations: 60,
        batch_size: 20,
        ..Default::default()
    }
}

#[test]
fn correlated_sites_have_mutual_information() {
    let alignment = counted(array![[1, 1], [2, 2]], false);
    let mi = average_mutual_information(alignment.marginals.as_ref().unwrap());
    assert!((mi - 2f64.ln()).abs() < 1e-12, "{mi}");
}

#[test]
fn independent_sites_have_no_mutual_information() {
    let alignment = counted(array![[1, 1], [1, 2], [2, 1], [2, 2]], false);
    let mi = average_mutual_information(alignment.marginals.as_ref().unwrap());
    assert!(mi.abs() < 1e-12, "{mi}");
}

#[test]
fn requires_marginals() {
    let mut alignment = Alignment::new(
        Alphabet::custom("-AC").unwrap(),
        array![[1, 2], [2, 1]],
        vec!["a".to_string(), "b".to_string()],
    );
    assert!(matches!(
        estimate_sample_size(&mut alignment, &short_run(), &Diagnostics::quiet()),
        Err(Error::MissingMarginals)
    ));
}

#[test]
fn rejects_non_positive_prior() {
    let mut alignment = counted(mixed(), false);
    let config = SampleSizeConfig {
        prior: 0.0,
        ..short_run()
    };
    assert!(matches!(
        estimate_sample_size(&mut alignment, &config, &Diagnostics::quiet()),
        Err(Error::Config(_))
    ));
}

#[test]
fn deterministic_for_a_fixed_seed() {
    for gap_reduce in [false, true] {
        let mut first = counted(mixed(), gap_reduce);
        let mut second = first.clone();
        let first_ratio =
            estimate_sample_size(&mut first, &short_run(), &Diagnostics::quiet()).unwrap();
        let second_ratio =
            estimate_sample_size(&mut second, &short_run(), &Diagnostics::quiet()).unwrap();

        assert_eq!(first_ratio.to_bits(), second_ratio.to_bits());
        assert_eq!(first.n_eff.to_bits(), second.n_eff.to_bits());
        assert_eq!(first.weights, second.weights);
    }
}

#[test]
fn weights_are_rescaled_to_the_new_sample_size() {
    let mut alignment = counted(mixed(), false);
    alignment.weights = vec![0.5, 0.5, 1.0, 1.0, 1.0, 0.25, 0.25, 1.0];
    alignment.update_n_eff();
    let before = alignment.weights.clone();
    let n_eff_before = alignment.n_eff;

    let ratio =
        estimate_sample_size(&mut alignment, &short_run(), &Diagnostics::quiet()).unwrap();

    assert!(ratio.is_finite() && ratio > 0.0);
    assert!((alignment.n_eff - ratio * n_eff_before).abs() < 1e-9 * alignment.n_eff);
    let sum: f64 = alignment.weights.iter().sum();
    assert!((sum - alignment.n_eff).abs() < 1e-9 * alignment.n_eff);
    for (after, before) in alignment.weights.iter().zip(before) {
        assert!((after - before * ratio).abs() < 1e-12 * after.max(1.0));
    }
}

#[test]
fn zero_iterations_keep_the_sample_size() {
    let mut alignment = counted(mixed(), false);
    let config = SampleSizeConfig {
        iterations: 0,
        ..short_run()
    };
    let ratio = estimate_sample_size(&mut alignment, &config, &Diagnostics::quiet()).unwrap();
    assert!((ratio - 1.0).abs() < 1e-12);
    assert!((alignment.n_eff - 8.0).abs() < 1e-9);
}

#[test]
fn single_site_is_left_unchanged() {
    let mut alignment = counted(array![[1], [2], [1]], false);
    let ratio =
        estimate_sample_size(&mut alignment, &short_run(), &Diagnostics::quiet()).unwrap();
    assert_eq!(ratio, 1.0);
    assert_eq!(alignment.weights, [1.0, 1.0, 1.0]);
    assert_eq!(alignment.n_eff, 3.0);
}

#[test]
fn disjoint_gap_patterns_keep_weights_positive() {
    // Sites 0 and 1 are never both non-gap.
    let mut alignment = counted(array![[1, 0, 1], [0, 2, 2], [1, 0, 2], [0, 1, 1]], true);
    let mi = average_mutual_information(alignment.marginals.as_ref().unwrap());
    assert!((mi - 2f64.ln() / 3.0).abs() < 1e-12, "{mi}");

    let ratio = estimate_sample_size(&mut alignment, &short_run(), &Diagnostics::quiet()).unwrap();
    assert!(ratio.is_finite() && ratio > 0.0, "{ratio}");
    assert!(alignment.n_eff.is_finite() && alignment.n_eff > 0.0);
    assert!(alignment.weights.iter().all(|&weight| weight > 0.0));
}
