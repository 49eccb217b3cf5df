//! Weighted first and second order marginal distributions.

use log::{debug, warn};

use crate::{
    alignment::{Alignment, GapStatistics, Marginals},
    index::{PairArray, PairVector, SiteArray, pairs},
};


/// Compute the weighted marginals of the alignment and store them in it.
///
/// If `gap_reduce` is set, the gap symbol is removed from the statistics:
/// `n_codes` becomes one less than the alphabet size, gap and joint non-gap fractions are recorded,
/// and `fi`/`fij` become distributions conditioned on the absence of gaps.
pub fn count_marginals(alignment: &mut Alignment, gap_reduce: bool) {
    let marginals = if gap_reduce {
        alignment.n_codes = alignment.alphabet.len() - 1;
        count_gap_reduced(alignment)
    } else {
        alignment.n_codes = alignment.alphabet.len();
        count_standard(alignment)
    };
    debug!(
        "Counted marginals over {} sites and {} pairs with {} codes",
        alignment.n_sites(),
        alignment.n_pairs(),
        alignment.n_codes
    );
    alignment.marginals = Some(marginals);
}

fn count_standard(alignment: &Alignment) -> Marginals {
    let n_sites = alignment.n_sites();
    let n_codes = alignment.n_codes;
    let z_inv = 1.0 / alignment.n_eff;

    let mut fi = SiteArray::zeros(n_sites, n_codes);
    let mut fij = PairArray::zeros(n_sites, n_codes);

    for (row, &weight) in alignment.sequences.rows().into_iter().zip(&alignment.weights) {
        let weight = weight * z_inv;
        for (i, &code) in row.iter().enumerate() {
            fi[[i, code as usize]] += weight;
        }
        for (i, j) in pairs(n_sites) {
            fij[[i, j, row[i] as usize, row[j] as usize]] += weight;
        }
    }

    Marginals {
        fi,
        fij,
        gaps: None,
    }
}

fn count_gap_reduced(alignment: &Alignment) -> Marginals {
    let n_sites = alignment.n_sites();
    let n_codes = alignment.n_codes;
    let z_inv = 1.0 / alignment.n_eff;

    let mut gapi = vec![0.0; n_sites];
    let mut ungapij = PairVector::zeros(n_sites);
    let mut fi = SiteArray::zeros(n_sites, n_codes);
    let mut fij = PairArray::zeros(n_sites, n_codes);

    for (row, &weight) in alignment.sequences.rows().into_iter().zip(&alignment.weights) {
        for (i, &code) in row.iter().enumerate() {
            if code == 0 {
                gapi[i] += weight;
            } else {
                fi[[i, code as usize - 1]] += weight;
            }
        }
        for (i, j) in pairs(n_sites) {
            if row[i] > 0 && row[j] > 0 {
                ungapij[[i, j]] += weight;
                fij[[i, j, row[i] as usize - 1, row[j] as usize - 1]] += weight;
            }
        }
    }

    gapi.iter_mut().for_each(|gap| *gap *= z_inv);
    ungapij
        .as_mut_slice()
        .iter_mut()
        .for_each(|ungap| *ungap *= z_inv);

    for i in 0..n_sites {
        if !normalise(fi.site_mut(i)) {
            warn!(
                "Site {} has no weighted non-gap observations, using a uniform distribution",
                i + 1
            );
        }
    }
    for (i, j) in pairs(n_sites) {
        let block = fij.block_mut(i, j);
        if !normalise(block) {
            warn!(
                "Sites {} and {} have no weighted joint non-gap observations, assuming independence",
                i + 1,
                j + 1
            );
            // Product of the site marginals, so the pair carries no mutual information.
            let (fi_i, fi_j) = (fi.site(i), fi.site(j));
            for (index, value) in block.iter_mut().enumerate() {
                *value = fi_i[index / n_codes] * fi_j[index % n_codes];
            }
        }
    }

    Marginals {
        fi,
        fij,
        gaps: Some(GapStatistics { gapi, ungapij }),
    }
}

/// Scale the values to sum to one.
///
/// Returns false and sets a uniform distribution if the values sum to zero.
fn normalise(values: &mut [f64]) -> bool {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        let sum_inv = 1.0 / sum;
        values.iter_mut().for_each(|value| *value *= sum_inv);
        true
    } else {
        let uniform = 1.0 / values.len() as f64;
        values.fill(uniform);
        false
    }
}
