//! Flat storage for per-site and per-site-pair statistics.
//!
//! Site pairs are always unordered with `i < j` and are enumerated row by row:
//! `(0, 1), (0, 2), ..., (0, n-1), (1, 2), ...`.

use std::ops::{Index, IndexMut};

/// Number of unordered site pairs.
#[inline]
pub fn pair_count(n_sites: usize) -> usize {
    n_sites * n_sites.saturating_sub(1) / 2
}

/// The position of the unordered pair `(i, j)` with `i < j` in row-by-row enumeration.
#[inline]
pub fn pair_index(i: usize, j: usize, n_sites: usize) -> usize {
    debug_assert!(i < j && j < n_sites);
    i * (n_sites - 1) - i * (i + 1) / 2 + j - 1
}

/// Iterate over all unordered site pairs in storage order.
pub fn pairs(n_sites: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n_sites).flat_map(move |i| ((i + 1)..n_sites).map(move |j| (i, j)))
}

/// A value per site and code, indexed by `[site, code]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteArray {
    n_sites: usize,
    n_codes: usize,
    data: Vec<f64>,
}

impl SiteArray {
    pub fn zeros(n_sites: usize, n_codes: usize) -> Self {
        Self {
            n_sites,
            n_codes,
            data: vec![0.0; n_sites * n_codes],
        }
    }

    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    pub fn n_codes(&self) -> usize {
        self.n_codes
    }

    pub fn site(&self, site: usize) -> &[f64] {
        &self.data[site * self.n_codes..(site + 1) * self.n_codes]
    }

    pub fn site_mut(&mut self, site: usize) -> &mut [f64] {
        &mut self.data[site * self.n_codes..(site + 1) * self.n_codes]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

impl Index<[usize; 2]> for SiteArray {
    type Output = f64;

    fn index(&self, [site, code]: [usize; 2]) -> &Self::Output {
        &self.data[site_to_index(site, code, self.n_codes)]
    }
}

impl IndexMut<[usize; 2]> for SiteArray {
    fn index_mut(&mut self, [site, code]: [usize; 2]) -> &mut Self::Output {
        &mut self.data[site_to_index(site, code, self.n_codes)]
    }
}

/// A `n_codes x n_codes` block per unordered site pair, indexed by `[i, j, a, b]` with `i < j`.
///
/// Within a block, `a` is the code at site `i` and selects the row.
#[derive(Debug, Clone, PartialEq)]
pub struct PairArray {
    n_sites: usize,
    n_codes: usize,
    data: Vec<f64>,
}

impl PairArray {
    pub fn zeros(n_sites: usize, n_codes: usize) -> Self {
        Self {
            n_sites,
            n_codes,
            data: vec![0.0; pair_count(n_sites) * n_codes * n_codes],
        }
    }

    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    pub fn n_codes(&self) -> usize {
        self.n_codes
    }

    fn block_len(&self) -> usize {
        self.n_codes * self.n_codes
    }

    pub fn block(&self, i: usize, j: usize) -> &[f64] {
        let start = pair_index(i, j, self.n_sites) * self.block_len();
        &self.data[start..start + self.block_len()]
    }

    pub fn block_mut(&mut self, i: usize, j: usize) -> &mut [f64] {
        let block_len = self.block_len();
        let start = pair_index(i, j, self.n_sites) * block_len;
        &mut self.data[start..start + block_len]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

impl Index<[usize; 4]> for PairArray {
    type Output = f64;

    fn index(&self, [i, j, a, b]: [usize; 4]) -> &Self::Output {
        &self.data[pair_to_index(i, j, a, b, self.n_sites, self.n_codes)]
    }
}

impl IndexMut<[usize; 4]> for PairArray {
    fn index_mut(&mut self, [i, j, a, b]: [usize; 4]) -> &mut Self::Output {
        &mut self.data[pair_to_index(i, j, a, b, self.n_sites, self.n_codes)]
    }
}

/// A single value per unordered site pair, indexed by `[i, j]` with `i < j`.
#[derive(Debug, Clone, PartialEq)]
pub struct PairVector {
    n_sites: usize,
    data: Vec<f64>,
}

impl PairVector {
    pub fn zeros(n_sites: usize) -> Self {
        Self {
            n_sites,
            data: vec![0.0; pair_count(n_sites)],
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

impl Index<[usize; 2]> for PairVector {
    type Output = f64;

    fn index(&self, [i, j]: [usize; 2]) -> &Self::Output {
        &self.data[pair_index(i, j, self.n_sites)]
    }
}

impl IndexMut<[usize; 2]> for PairVector {
    fn index_mut(&mut self, [i, j]: [usize; 2]) -> &mut Self::Output {
        &mut self.data[pair_index(i, j, self.n_sites)]
    }
}

#[inline]
fn site_to_index(site: usize, code: usize, n_codes: usize) -> usize {
    debug_assert!(code < n_codes);
    site * n_codes + code
}

#[inline]
fn pair_to_index(i: usize, j: usize, a: usize, b: usize, n_sites: usize, n_codes: usize) -> usize {
    debug_assert!(a < n_codes && b < n_codes);
    (pair_index(i, j, n_sites) * n_codes + a) * n_codes + b
}
