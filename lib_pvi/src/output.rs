//! Writers for estimated parameters and coupling scores.

use std::io::Write;

use crate::{alignment::Alignment, error::Result, estimator::Parameters};

pub use binary::{write_parameters_full, write_parameters_variational};
pub use couplings::{average_product_correction, coupling_norms, write_coupling_scores};

mod binary;
mod couplings;

#[cfg(test)]
mod tests;

/// Write the parameters in the binary layout that matches their kind.
pub fn write_parameters(
    writer: impl Write,
    alignment: &Alignment,
    parameters: &Parameters,
) -> Result<()> {
    match parameters {
        Parameters::Point(values) => write_parameters_full(writer, alignment, values),
        Parameters::Variational { mean, std } => {
            write_parameters_variational(writer, alignment, mean, std)
        }
    }
}
