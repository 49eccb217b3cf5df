use ndarray::{Array2, ArrayView1};

use crate::{
    alphabet::{Alphabet, Code},
    index::{PairArray, PairVector, SiteArray, pair_count},
};

/// An encoded multiple sequence alignment together with the statistics derived from it.
///
/// The alignment is created by [`ingest`](crate::ingest::ingest) and then extended in place
/// by each later pipeline stage.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub alphabet: Alphabet,
    /// The number of codes that the statistics range over.
    ///
    /// Equals the alphabet size, or one less if marginals are conditioned on non-gaps.
    pub n_codes: usize,
    /// One row per sequence, one column per site.
    pub sequences: Array2<Code>,
    pub names: Vec<String>,
    pub weights: Vec<f64>,
    /// The sum of all weights.
    pub n_eff: f64,
    /// Row of the focus sequence.
    pub target: Option<usize>,
    /// Original 1-based numbering of each site. Present in focus mode.
    pub offsets: Option<Vec<usize>>,
    pub marginals: Option<Marginals>,
    /// Size of the parameter vector produced by the downstream estimator.
    pub n_params: usize,
}

/// Weighted first and second order statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Marginals {
    pub fi: SiteArray,
    pub fij: PairArray,
    /// Only present if the marginals are conditioned on non-gaps.
    pub gaps: Option<GapStatistics>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GapStatistics {
    /// Weighted fraction of gaps per site.
    pub gapi: Vec<f64>,
    /// Weighted fraction of sequences without a gap at either site of a pair.
    pub ungapij: PairVector,
}

impl Alignment {
    /// Create an alignment with unit weights.
    pub fn new(alphabet: Alphabet, sequences: Array2<Code>, names: Vec<String>) -> Self {
        debug_assert_eq!(sequences.nrows(), names.len());
        let n_seqs = sequences.nrows();
        Self {
            n_codes: alphabet.len(),
            alphabet,
            sequences,
            names,
            weights: vec![1.0; n_seqs],
            n_eff: n_seqs as f64,
            target: None,
            offsets: None,
            marginals: None,
            n_params: 0,
        }
    }

    pub fn n_seqs(&self) -> usize {
        self.sequences.nrows()
    }

    pub fn n_sites(&self) -> usize {
        self.sequences.ncols()
    }

    pub fn n_pairs(&self) -> usize {
        pair_count(self.n_sites())
    }

    pub fn code(&self, sequence: usize, site: usize) -> Code {
        self.sequences[[sequence, site]]
    }

    pub fn row(&self, sequence: usize) -> ArrayView1<'_, Code> {
        self.sequences.row(sequence)
    }

    /// Recompute the effective sample size from the weights.
    pub fn update_n_eff(&mut self) {
        self.n_eff = self.weights.iter().sum();
    }

    /// The original 1-based number of a site.
    pub fn site_number(&self, site: usize) -> usize {
        self.offsets
            .as_ref()
            .map(|offsets| offsets[site])
            .unwrap_or(site + 1)
    }

    /// The focus residue at a site, if there is a focus sequence.
    pub fn focus_symbol(&self, site: usize) -> Option<char> {
        self.target
            .and_then(|target| self.alphabet.symbol(self.code(target, site)))
    }

    pub fn focus_name(&self) -> Option<&str> {
        self.target.map(|target| self.names[target].as_str())
    }
}
