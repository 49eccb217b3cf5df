//! Sequence weights by inverse neighbourhood size.

use log::{info, warn};
use rayon::prelude::*;

use crate::alignment::Alignment;


/// How neighbour counts are computed.
///
/// Both strategies produce identical counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborScan {
    /// Compare each unordered pair once and credit both sequences.
    ///
    /// This writes to two counters per comparison and therefore runs sequentially.
    Symmetric,
    /// Compare every ordered pair, distributing the outer sequences over the current rayon pool.
    ///
    /// Each worker only writes the count of its own sequence.
    AllPairs,
}

/// Reweight sequences by the inverse of their neighbourhood size.
///
/// A sequence `t` is a neighbour of `s` if their identity is at least `(1 - theta) * n_sites`.
/// Each sequence is its own neighbour. If `theta` is outside of `[0, 1]`, no neighbourhood
/// weighting is applied. In both cases, the weights are multiplied by `scale` afterwards,
/// and the effective sample size is recomputed.
pub fn reweight(alignment: &mut Alignment, theta: f64, scale: f64, scan: NeighborScan) {
    let reweighting = (0.0..=1.0).contains(&theta);

    if reweighting {
        alignment.weights = neighbor_counts(alignment, theta, scan)
            .into_iter()
            .map(|count| 1.0 / count as f64)
            .collect();
    } else {
        alignment.weights.fill(1.0);
    }

    for weight in &mut alignment.weights {
        *weight *= scale;
    }
    alignment.update_n_eff();

    if reweighting {
        info!(
            "Neighborhood sample size: {:.1}\t({:.0}% identical neighborhood = {:.3} samples)",
            alignment.n_eff,
            100.0 * (1.0 - theta),
            scale
        );
    } else {
        warn!("Theta not between 0 and 1, no sequence reweighting applied");
    }
}

/// Count the neighbours of each sequence, including the sequence itself.
pub fn neighbor_counts(alignment: &Alignment, theta: f64, scan: NeighborScan) -> Vec<usize> {
    let n_seqs = alignment.n_seqs();
    let threshold = (1.0 - theta) * alignment.n_sites() as f64;
    let is_neighbor = |s: usize, t: usize| identity(alignment, s, t) as f64 >= threshold;

    match scan {
        NeighborScan::Symmetric => {
            let mut counts = vec![1; n_seqs];
            for s in 0..n_seqs {
                for t in s + 1..n_seqs {
                    if is_neighbor(s, t) {
                        counts[s] += 1;
                        counts[t] += 1;
                    }
                }
            }
            counts
        }
        NeighborScan::AllPairs => (0..n_seqs)
            .into_par_iter()
            .map(|s| 1 + (0..n_seqs).filter(|&t| t != s && is_neighbor(s, t)).count())
            .collect(),
    }
}

/// The number of sites at which two sequences carry the same code.
pub fn identity(alignment: &Alignment, s: usize, t: usize) -> usize {
    alignment
        .row(s)
        .iter()
        .zip(alignment.row(t))
        .filter(|(a, b)| a == b)
        .count()
}
