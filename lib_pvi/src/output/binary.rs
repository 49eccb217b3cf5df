//! Fixed-layout little-endian parameter files.
//!
//! Integers are written as `i32` and real numbers as `f32`.
//! Both layouts start with the same header:
//! the number of sites, the number of codes, one byte per site with the focus residue
//! (or the first alphabet symbol without a focus sequence) and the original number of each site.

use std::io::{BufWriter, Write};

use log::debug;

use crate::{
    alignment::Alignment,
    error::{Error, Result},
    estimator::ParameterLayout,
    index::pairs,
};

/// Write point estimates of fields and couplings together with the marginals.
pub fn write_parameters_full(
    writer: impl Write,
    alignment: &Alignment,
    values: &[f64],
) -> Result<()> {
    let marginals = alignment.marginals.as_ref().ok_or(Error::MissingMarginals)?;
    let layout = ParameterLayout::point(alignment.n_sites(), alignment.n_codes);
    layout.check_values(values)?;
    debug!("Writing {} point parameters", layout.n_params());

    let mut writer = BufWriter::new(writer);
    write_header(&mut writer, alignment)?;
    write_f32s(&mut writer, marginals.fi.as_slice())?;
    write_fields(&mut writer, &layout, values)?;

    for (i, j) in pairs(layout.n_sites()) {
        write_i32(&mut writer, i + 1)?;
        write_i32(&mut writer, j + 1)?;
        write_f32s(&mut writer, marginals.fij.block(i, j))?;
        write_f32s(&mut writer, layout.coupling_block(values, i, j))?;
    }

    writer.flush()?;
    Ok(())
}

/// Write posterior means and standard deviations of all parameters and hyperparameters
/// together with the marginals.
pub fn write_parameters_variational(
    writer: impl Write,
    alignment: &Alignment,
    mean: &[f64],
    std: &[f64],
) -> Result<()> {
    let marginals = alignment.marginals.as_ref().ok_or(Error::MissingMarginals)?;
    let layout = ParameterLayout::variational(alignment.n_sites(), alignment.n_codes);
    layout.check_values(mean)?;
    layout.check_values(std)?;
    debug!(
        "Writing {} variational parameters with {} hyperparameters",
        layout.n_params(),
        layout.offset()
    );

    let mut writer = BufWriter::new(writer);
    write_header(&mut writer, alignment)?;

    for (&scale_mean, &scale_std) in mean.iter().zip(std).take(2) {
        write_f32(&mut writer, scale_mean)?;
        write_f32(&mut writer, scale_std)?;
    }
    write_site_relevances(&mut writer, &layout, mean)?;
    write_site_relevances(&mut writer, &layout, std)?;
    write_pair_relevances(&mut writer, &layout, mean)?;
    write_pair_relevances(&mut writer, &layout, std)?;

    write_f32s(&mut writer, marginals.fi.as_slice())?;
    write_fields(&mut writer, &layout, mean)?;
    write_fields(&mut writer, &layout, std)?;

    for (i, j) in pairs(layout.n_sites()) {
        write_i32(&mut writer, i + 1)?;
        write_i32(&mut writer, j + 1)?;
        write_f32s(&mut writer, marginals.fij.block(i, j))?;
        write_f32s(&mut writer, layout.coupling_block(mean, i, j))?;
        write_f32s(&mut writer, layout.coupling_block(std, i, j))?;
    }

    writer.flush()?;
    Ok(())
}

fn write_header(writer: &mut impl Write, alignment: &Alignment) -> Result<()> {
    write_i32(writer, alignment.n_sites())?;
    write_i32(writer, alignment.n_codes)?;

    let placeholder = alignment.alphabet.symbols().first().copied().unwrap_or('-');
    let focus: Vec<_> = (0..alignment.n_sites())
        .map(|site| {
            let symbol = alignment.focus_symbol(site).unwrap_or(placeholder);
            u8::try_from(symbol).unwrap_or(b'?')
        })
        .collect();
    writer.write_all(&focus)?;

    for site in 0..alignment.n_sites() {
        write_i32(writer, alignment.site_number(site))?;
    }
    Ok(())
}

fn write_fields(writer: &mut impl Write, layout: &ParameterLayout, values: &[f64]) -> Result<()> {
    let start = layout.offset();
    write_f32s(writer, &values[start..start + layout.n_sites() * layout.n_codes()])
}

fn write_site_relevances(
    writer: &mut impl Write,
    layout: &ParameterLayout,
    values: &[f64],
) -> Result<()> {
    for i in 0..layout.n_sites() {
        write_f32(writer, values[layout.site_relevance(i)])?;
    }
    Ok(())
}

fn write_pair_relevances(
    writer: &mut impl Write,
    layout: &ParameterLayout,
    values: &[f64],
) -> Result<()> {
    for (i, j) in pairs(layout.n_sites()) {
        write_f32(writer, values[layout.pair_relevance(i, j)])?;
    }
    Ok(())
}

fn write_i32(writer: &mut impl Write, value: usize) -> Result<()> {
    let value = i32::try_from(value).map_err(|_| Error::IntegerOverflow(value))?;
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_f32(writer: &mut impl Write, value: f64) -> Result<()> {
    writer.write_all(&(value as f32).to_le_bytes())?;
    Ok(())
}

fn write_f32s(writer: &mut impl Write, values: &[f64]) -> Result<()> {
    values
        .iter()
        .try_for_each(|&value| write_f32(writer, value))
}

