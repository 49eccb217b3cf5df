use ndarray::array;

use super::{
    average_product_correction, coupling_norms, write_coupling_scores, write_parameters,
    write_parameters_full,
};
use crate::{
    alignment::Alignment,
    alphabet::Alphabet,
    config::{Config, Estimator},
    error::Error,
    estimator::{IndexedEstimator, ParameterEstimator, ParameterLayout, Parameters},
    index::PairVector,
    ingest::{IngestOptions, ingest_reader},
    marginals::count_marginals,
};

fn two_sites() -> Alignment {
    let mut alignment = Alignment::new(
        Alphabet::custom("-AC").unwrap(),
        array![[1, 2], [2, 2], [1, 0]],
        vec!["a".to_string(), "b".to_string(), "c".to_string()],
    );
    count_marginals(&mut alignment, false);
    alignment
}

fn read_i32(bytes: &[u8], position: usize) -> i32 {
    i32::from_le_bytes(bytes[position..position + 4].try_into().unwrap())
}

fn read_f32(bytes: &[u8], position: usize) -> f32 {
    f32::from_le_bytes(bytes[position..position + 4].try_into().unwrap())
}

#[test]
fn frobenius_norms() {
    let layout = ParameterLayout::point(2, 2);
    let values = [0.0, 0.0, 0.0, 0.0, 3.0, 0.0, 4.0, 0.0];
    let norms = coupling_norms(&layout, &values).unwrap();
    assert_eq!(norms.as_slice(), [5.0]);

    assert!(matches!(
        coupling_norms(&layout, &values[1..]),
        Err(Error::ParameterLength {
            expected: 8,
            actual: 7
        })
    ));
}

#[test]
fn average_product_correction_of_three_sites() {
    let mut norms = PairVector::zeros(3);
    norms.as_mut_slice().copy_from_slice(&[1.0, 2.0, 3.0]);
    average_product_correction(&mut norms, 3);
    for (actual, expected) in norms.as_slice().iter().zip([-0.5, 0.125, 0.5]) {
        assert!((actual - expected).abs() < 1e-12, "{actual} != {expected}");
    }
}

#[test]
fn zero_norms_are_not_corrected() {
    let mut norms = PairVector::zeros(3);
    average_product_correction(&mut norms, 3);
    assert_eq!(norms.as_slice(), [0.0, 0.0, 0.0]);
}

#[test]
fn coupling_scores_without_focus() {
    let alignment = Alignment::new(
        Alphabet::custom("-A").unwrap(),
        array![[1, 1], [0, 1]],
        vec!["a".to_string(), "b".to_string()],
    );
    let parameters = Parameters::Point(vec![0.0, 0.0, 0.0, 0.0, 3.0, 0.0, 4.0, 0.0]);

    let mut output = Vec::new();
    write_coupling_scores(&mut output, &alignment, &parameters, true).unwrap();
    assert_eq!(String::from_utf8(output).unwrap(), "1 - 2 - 0 5.000000\n");

    let mut output = Vec::new();
    write_coupling_scores(&mut output, &alignment, &parameters, false).unwrap();
    assert_eq!(String::from_utf8(output).unwrap(), "1 - 2 - 0 0.000000\n");
}

#[test]
fn coupling_scores_with_focus() {
    let options = IngestOptions {
        focus: Some("X".to_string()),
        gap_reduce: true,
        ..IngestOptions::new(Alphabet::custom("-AC").unwrap())
    };
    let alignment = ingest_reader(">X/10-20\nAC-C\n>Y\nACAC\n".as_bytes(), &options).unwrap();
    let parameters = IndexedEstimator
        .estimate(&alignment, &Config::default())
        .unwrap();

    let mut output = Vec::new();
    write_coupling_scores(&mut output, &alignment, &parameters, false).unwrap();
    let output = String::from_utf8(output).unwrap();
    let lines: Vec<_> = output.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("10 A 11 C 0 "), "{output}");
    assert!(lines[1].starts_with("10 A 13 C 0 "), "{output}");
    assert!(lines[2].starts_with("11 C 13 C 0 "), "{output}");
}

#[test]
fn full_layout() {
    let alignment = two_sites();
    let parameters = IndexedEstimator
        .estimate(&alignment, &Config::default())
        .unwrap();
    let mut output = Vec::new();
    write_parameters(&mut output, &alignment, &parameters).unwrap();

    assert_eq!(output.len(), 8 + 2 + 8 + 24 + 24 + 8 + 36 + 36);
    assert_eq!(read_i32(&output, 0), 2);
    assert_eq!(read_i32(&output, 4), 3);
    assert_eq!(&output[8..10], b"--");
    assert_eq!(read_i32(&output, 10), 1);
    assert_eq!(read_i32(&output, 14), 2);
    // fi of the first site is [0, 2/3, 1/3]
    assert_eq!(read_f32(&output, 18), 0.0);
    assert_eq!(read_f32(&output, 22), (2.0f64 / 3.0) as f32);
    // h(0, 0) and h(1, 2)
    assert_eq!(read_f32(&output, 42), 1.0);
    assert_eq!(read_f32(&output, 62), (2.0f64 + 2.0 / 3.0) as f32);
    assert_eq!(read_i32(&output, 66), 1);
    assert_eq!(read_i32(&output, 70), 2);
    // e(0, 1, 0, 0) follows the 3 x 3 block of fij
    assert_eq!(read_f32(&output, 74 + 36), 1002.0);
}

#[test]
fn variational_layout() {
    let alignment = two_sites();
    let config = Config {
        estimator: Estimator::Variational,
        ..Default::default()
    };
    let parameters = IndexedEstimator.estimate(&alignment, &config).unwrap();
    let mut output = Vec::new();
    write_parameters(&mut output, &alignment, &parameters).unwrap();

    assert_eq!(
        output.len(),
        18 + 16 + 16 + 8 + 24 + 48 + (8 + 3 * 36)
    );
    // Scale hyperparameters as (mean, std) pairs
    assert_eq!(read_f32(&output, 18), 0.0);
    assert_eq!(read_f32(&output, 22), 1.0);
    assert_eq!(read_f32(&output, 26), 1.0);
    assert_eq!(read_f32(&output, 30), 1.0);
    // Site relevance means, then their standard deviations
    assert_eq!(read_f32(&output, 34), 2.0);
    assert_eq!(read_f32(&output, 38), 3.0);
    assert_eq!(read_f32(&output, 42), 1.0);
    // Pair relevance mean
    assert_eq!(read_f32(&output, 50), 4.0);
}

#[test]
fn full_layout_requires_marginals_and_matching_length() {
    let mut alignment = two_sites();
    let layout = ParameterLayout::point(2, 3);

    assert!(matches!(
        write_parameters_full(Vec::new(), &alignment, &vec![0.0; layout.len() + 1]),
        Err(Error::ParameterLength { .. })
    ));

    alignment.marginals = None;
    assert!(matches!(
        write_parameters_full(Vec::new(), &alignment, &vec![0.0; layout.len()]),
        Err(Error::MissingMarginals)
    ));
}
