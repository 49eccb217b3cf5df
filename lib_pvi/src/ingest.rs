//! Reading, encoding and focus-mode reduction of multiple sequence alignments.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::{debug, info, warn};
use ndarray::{Array2, Axis};

use crate::{
    alignment::Alignment,
    alphabet::{Alphabet, Code},
    config::Config,
    error::{Error, Result},
};

pub use fasta::RawRecord;
pub use region::parse_region_start;

mod fasta;
mod region;


#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub alphabet: Alphabet,
    /// A prefix of the name of the focus sequence.
    pub focus: Option<String>,
    /// Discard columns where the focus sequence has a gap, for any alphabet.
    pub gap_reduce: bool,
}

impl IngestOptions {
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            focus: None,
            gap_reduce: false,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            alphabet: config.alphabet()?,
            focus: config.focus.clone(),
            gap_reduce: config.gap_reduce,
        })
    }
}

/// Read and encode the fasta alignment at `path`.
pub fn ingest(path: impl AsRef<Path>, options: &IngestOptions) -> Result<Alignment> {
    let path = path.as_ref();
    info!("Reading alignment {path:?}");
    let records = {
        let file = File::open(path)?;
        fasta::parse_records(BufReader::new(file))?
    };
    build_alignment(records, options)
}

/// Read and encode a fasta alignment from an arbitrary reader.
pub fn ingest_reader(reader: impl BufRead, options: &IngestOptions) -> Result<Alignment> {
    build_alignment(fasta::parse_records(reader)?, options)
}

fn build_alignment(records: Vec<RawRecord>, options: &IngestOptions) -> Result<Alignment> {
    let n_sites = validate_lengths(&records)?;
    let alphabet = &options.alphabet;
    let n_codes = alphabet.len() as Code;
    debug!(
        "Encoding {} sequences of length {n_sites} over alphabet {alphabet}",
        records.len()
    );

    let mut sequences = Array2::zeros((records.len(), n_sites));
    let mut names = Vec::with_capacity(records.len());
    for (mut row, record) in sequences.rows_mut().into_iter().zip(records) {
        for (code, character) in row.iter_mut().zip(record.sequence.chars()) {
            *code = alphabet.encode(character);
        }
        names.push(record.name);
    }
    let n_seqs = names.len();

    // Rows containing out-of-alphabet characters are always discarded.
    let valid_rows: Vec<_> = sequences
        .rows()
        .into_iter()
        .map(|row| row.iter().all(|&code| code >= -n_codes && code < n_codes))
        .collect();
    let n_valid_seqs = valid_rows.iter().filter(|&&valid| valid).count();
    info!("{n_valid_seqs} valid sequences out of {n_seqs}");
    if n_valid_seqs == 0 {
        return Err(Error::NoValidSequences(n_seqs));
    }

    let focus = options
        .focus
        .as_deref()
        .and_then(|identifier| find_focus(&names, identifier).map(|row| (identifier, row)))
        .filter(|&(_, row)| {
            let valid = valid_rows[row];
            if !valid {
                warn!(
                    "Focus sequence {} contains out-of-alphabet characters, proceeding without focus sequence",
                    names[row]
                );
            }
            valid
        });

    // In focus mode, keep only the columns where the focus sequence is informative.
    let valid_sites: Vec<_> = if let Some((_, target)) = focus {
        let discard_lowercase = alphabet.is_protein();
        let discard_gaps = alphabet.is_protein() || options.gap_reduce;
        sequences
            .row(target)
            .iter()
            .map(|&code| !(discard_lowercase && code < 0) && !(discard_gaps && code == 0))
            .collect()
    } else {
        vec![true; n_sites]
    };
    let n_valid_sites = valid_sites.iter().filter(|&&valid| valid).count();
    if focus.is_some() {
        info!("{n_valid_sites} sites out of {n_sites}");
    } else {
        info!("{n_sites} sites");
    }
    if n_valid_sites == 0 {
        return Err(Error::NoSites);
    }

    let mut target = None;
    let mut offsets = None;
    if let Some((identifier, row)) = focus {
        let region_start = match parse_region_start(&names[row], identifier) {
            Some(Ok(start)) => {
                info!("Region starts at {start}");
                start
            }
            Some(Err(error)) => {
                warn!(
                    "Error parsing region of {}, assuming start at 1: {error}",
                    names[row]
                );
                1
            }
            None => 1,
        };

        // The first column is numbered with the region start, dropped columns still count.
        offsets = Some(
            valid_sites
                .iter()
                .enumerate()
                .filter(|&(_, &valid)| valid)
                .map(|(site, _)| site + region_start)
                .collect(),
        );
        target = Some(valid_rows[..=row].iter().filter(|&&valid| valid).count() - 1);
    }

    if n_valid_seqs < n_seqs || n_valid_sites < n_sites {
        let row_indices = indices_of(&valid_rows);
        let site_indices = indices_of(&valid_sites);
        sequences = sequences
            .select(Axis(0), &row_indices)
            .select(Axis(1), &site_indices);
        names = names
            .into_iter()
            .zip(&valid_rows)
            .filter_map(|(name, &valid)| valid.then_some(name))
            .collect();
    }

    // Soft-masked residues that survived column filtering become ordinary residues.
    sequences.mapv_inplace(|code| if code < 0 { code + n_codes } else { code });

    let mut alignment = Alignment::new(options.alphabet.clone(), sequences, names);
    alignment.target = target;
    alignment.offsets = offsets;
    Ok(alignment)
}

/// Returns the length shared by all sequences.
fn validate_lengths(records: &[RawRecord]) -> Result<usize> {
    let first = records.first().ok_or(Error::NoRecords)?;
    let expected = first.sequence.chars().count();

    for record in records {
        let length = record.sequence.chars().count();
        if length != expected {
            return Err(Error::SequenceLength {
                name: record.name.clone(),
                length,
                expected,
                sequence: record.sequence.clone(),
            });
        }
    }

    if expected == 0 {
        Err(Error::NoSites)
    } else {
        Ok(expected)
    }
}

/// Returns the first row whose name starts with `identifier`.
pub fn find_focus(names: &[String], identifier: &str) -> Option<usize> {
    let mut matches = names
        .iter()
        .enumerate()
        .filter(|(_, name)| name.starts_with(identifier))
        .map(|(row, _)| row);

    let Some(target) = matches.next() else {
        warn!("Could not find {identifier}, proceeding without focus sequence");
        return None;
    };
    for duplicate in matches {
        warn!(
            "Multiple sequences start with {identifier}, ignoring sequence {}",
            duplicate + 1
        );
    }
    info!("Found focus {identifier} as sequence {}", target + 1);

    Some(target)
}

fn indices_of(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(index, &valid)| valid.then_some(index))
        .collect()
}
