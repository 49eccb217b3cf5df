use std::io::{BufWriter, Write};

use log::{debug, warn};

use crate::{
    alignment::Alignment,
    error::Result,
    estimator::{ParameterLayout, Parameters},
    index::{PairVector, pairs},
};

/// The Frobenius norm of the coupling block of every site pair.
pub fn coupling_norms(layout: &ParameterLayout, values: &[f64]) -> Result<PairVector> {
    layout.check_values(values)?;
    let mut norms = PairVector::zeros(layout.n_sites());
    for (i, j) in pairs(layout.n_sites()) {
        norms[[i, j]] = layout
            .coupling_block(values, i, j)
            .iter()
            .map(|e| e * e)
            .sum::<f64>()
            .sqrt();
    }
    Ok(norms)
}

/// Subtract the product of the site averages divided by the overall average from each norm.
pub fn average_product_correction(norms: &mut PairVector, n_sites: usize) {
    if n_sites < 2 {
        return;
    }

    let n_pairs = (n_sites * (n_sites - 1)) as f64 / 2.0;
    let site_share = 1.0 / (n_sites - 1) as f64;
    let mut site_average = vec![0.0; n_sites];
    let mut average = 0.0;
    for (i, j) in pairs(n_sites) {
        let norm = norms[[i, j]];
        site_average[i] += norm * site_share;
        site_average[j] += norm * site_share;
        average += norm / n_pairs;
    }

    if average == 0.0 {
        warn!("All coupling norms are zero, skipping the average product correction");
        return;
    }
    for (i, j) in pairs(n_sites) {
        norms[[i, j]] -= site_average[i] * site_average[j] / average;
    }
}

/// Write one line per site pair with the site numbers, the focus residues and the coupling score.
///
/// Without a focus sequence, sites are numbered from one and residues are written as `-`.
/// The score is the norm of the coupling block, or of its posterior mean,
/// with the average product correction unless `zero_apc` is set.
pub fn write_coupling_scores(
    writer: impl Write,
    alignment: &Alignment,
    parameters: &Parameters,
    zero_apc: bool,
) -> Result<()> {
    let n_sites = alignment.n_sites();
    let layout = ParameterLayout::for_parameters(alignment, parameters);
    let mut scores = coupling_norms(&layout, parameters.values())?;
    if zero_apc {
        debug!("Writing coupling norms without average product correction");
    } else {
        average_product_correction(&mut scores, n_sites);
    }

    let residue = |site| alignment.focus_symbol(site).unwrap_or('-');
    let mut writer = BufWriter::new(writer);
    for (i, j) in pairs(n_sites) {
        writeln!(
            writer,
            "{} {} {} {} 0 {:.6}",
            alignment.site_number(i),
            residue(i),
            alignment.site_number(j),
            residue(j),
            scores[[i, j]]
        )?;
    }
    writer.flush()?;
    Ok(())
}
