//! The interface to parameter estimation engines and the layout of their parameter vectors.

use crate::{
    alignment::Alignment,
    config::{Config, Estimator},
    error::{Error, Result},
    index::{pair_count, pair_index, pairs},
};

/// Fits the fields and couplings of a Potts model to a finished alignment.
pub trait ParameterEstimator {
    fn estimate(&self, alignment: &Alignment, config: &Config) -> Result<Parameters>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parameters {
    /// A point estimate laid out by [`ParameterLayout::point`].
    Point(Vec<f64>),
    /// Posterior means and standard deviations, both laid out by [`ParameterLayout::variational`].
    Variational { mean: Vec<f64>, std: Vec<f64> },
}

impl Parameters {
    /// The point estimate, or the posterior mean.
    pub fn values(&self) -> &[f64] {
        match self {
            Self::Point(values) => values,
            Self::Variational { mean, .. } => mean,
        }
    }

    pub fn is_variational(&self) -> bool {
        matches!(self, Self::Variational { .. })
    }
}

/// Positions of fields and couplings in a flat parameter vector.
///
/// Fields `h(i, a)` come first, site by site, followed by one `n_codes x n_codes` coupling block
/// `e(i, j, a, b)` per site pair in pair order.
/// The variational layout precedes this block with two global scale hyperparameters,
/// one relevance hyperparameter per site and one per site pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterLayout {
    n_sites: usize,
    n_codes: usize,
    offset: usize,
}

impl ParameterLayout {
    pub fn point(n_sites: usize, n_codes: usize) -> Self {
        Self {
            n_sites,
            n_codes,
            offset: 0,
        }
    }

    pub fn variational(n_sites: usize, n_codes: usize) -> Self {
        Self {
            n_sites,
            n_codes,
            offset: 2 + n_sites + pair_count(n_sites),
        }
    }

    /// The layout an estimator produces for the alignment.
    pub fn for_alignment(alignment: &Alignment, estimator: Estimator) -> Self {
        match estimator {
            Estimator::Variational => Self::variational(alignment.n_sites(), alignment.n_codes),
            Estimator::PseudoLikelihood | Estimator::Persistent | Estimator::Bayes => {
                Self::point(alignment.n_sites(), alignment.n_codes)
            }
        }
    }

    /// The layout of parameters that were estimated for the alignment.
    pub fn for_parameters(alignment: &Alignment, parameters: &Parameters) -> Self {
        if parameters.is_variational() {
            Self::variational(alignment.n_sites(), alignment.n_codes)
        } else {
            Self::point(alignment.n_sites(), alignment.n_codes)
        }
    }

    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    pub fn n_codes(&self) -> usize {
        self.n_codes
    }

    /// The number of fields and couplings.
    pub fn n_params(&self) -> usize {
        self.n_sites * self.n_codes + pair_count(self.n_sites) * self.n_codes * self.n_codes
    }

    /// The number of hyperparameters preceding the fields.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The length of a parameter vector.
    pub fn len(&self) -> usize {
        self.offset + self.n_params()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn h(&self, i: usize, a: usize) -> usize {
        debug_assert!(i < self.n_sites && a < self.n_codes);
        self.offset + i * self.n_codes + a
    }

    #[inline]
    pub fn e(&self, i: usize, j: usize, a: usize, b: usize) -> usize {
        debug_assert!(a < self.n_codes && b < self.n_codes);
        self.offset
            + self.n_sites * self.n_codes
            + (pair_index(i, j, self.n_sites) * self.n_codes + a) * self.n_codes
            + b
    }

    /// The coupling block of a site pair.
    pub fn coupling_block<'values>(
        &self,
        values: &'values [f64],
        i: usize,
        j: usize,
    ) -> &'values [f64] {
        let start = self.e(i, j, 0, 0);
        &values[start..start + self.n_codes * self.n_codes]
    }

    /// The relevance hyperparameter of a site. Only meaningful for the variational layout.
    pub fn site_relevance(&self, i: usize) -> usize {
        2 + i
    }

    /// The relevance hyperparameter of a site pair. Only meaningful for the variational layout.
    pub fn pair_relevance(&self, i: usize, j: usize) -> usize {
        2 + self.n_sites + pair_index(i, j, self.n_sites)
    }

    /// Returns an error unless every vector of the parameters has the length of this layout.
    pub fn check(&self, parameters: &Parameters) -> Result<()> {
        match parameters {
            Parameters::Point(values) => self.check_values(values),
            Parameters::Variational { mean, std } => {
                self.check_values(mean)?;
                self.check_values(std)
            }
        }
    }

    pub fn check_values(&self, values: &[f64]) -> Result<()> {
        if values.len() == self.len() {
            Ok(())
        } else {
            Err(Error::ParameterLength {
                expected: self.len(),
                actual: values.len(),
            })
        }
    }
}

/// Produces parameters that encode their own position instead of fitting the model.
///
/// Field `h(i, a)` is `(i + 1) + a / n_codes` and coupling `e(i, j, a, b)` is
/// `1000 (i + 1) + (j + 1) + a / n_codes + b / (100 n_codes)`.
/// Hyperparameters of the variational layout are set to their index, and all standard deviations to one.
/// This makes the output of writers recognisable by downstream readers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexedEstimator;

impl ParameterEstimator for IndexedEstimator {
    fn estimate(&self, alignment: &Alignment, config: &Config) -> Result<Parameters> {
        let layout = ParameterLayout::for_alignment(alignment, config.estimator);
        let n_codes = layout.n_codes() as f64;
        let mut values = vec![0.0; layout.len()];

        for (index, value) in values[..layout.offset()].iter_mut().enumerate() {
            *value = index as f64;
        }
        for i in 0..layout.n_sites() {
            for a in 0..layout.n_codes() {
                values[layout.h(i, a)] = (i + 1) as f64 + a as f64 / n_codes;
            }
        }
        for (i, j) in pairs(layout.n_sites()) {
            for a in 0..layout.n_codes() {
                for b in 0..layout.n_codes() {
                    values[layout.e(i, j, a, b)] = 1000.0 * (i + 1) as f64
                        + (j + 1) as f64
                        + a as f64 / n_codes
                        + b as f64 / 100.0 / n_codes;
                }
            }
        }

        Ok(match config.estimator {
            Estimator::Variational => Parameters::Variational {
                std: vec![1.0; values.len()],
                mean: values,
            },
            Estimator::PseudoLikelihood | Estimator::Persistent | Estimator::Bayes => {
                Parameters::Point(values)
            }
        })
    }
}
