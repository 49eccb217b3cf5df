use std::fmt::Display;

use crate::error::{Error, Result};

/// A signed residue code.
///
/// Codes in `[0, n)` are residues of the alphabet, codes in `[-n, 0)` are soft-masked
/// (lowercase) residues shifted down by `n`, and the code `n` marks a character outside the alphabet.
pub type Code = i8;

/// The reference amino acid alphabet. Position zero is the gap.
pub const PROTEIN_SYMBOLS: &str = "-ACDEFGHIKLMNPQRSTVWY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphabetKind {
    /// The built-in amino acid alphabet, which enables protein-specific handling of
    /// `.` characters, lowercase columns and gap columns.
    Protein,
    /// A user-supplied alphabet.
    Custom,
}

/// An ordered set of symbols, where the first symbol acts as gap or wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    kind: AlphabetKind,
}

impl Alphabet {
    pub fn protein() -> Self {
        Self {
            symbols: PROTEIN_SYMBOLS.chars().collect(),
            kind: AlphabetKind::Protein,
        }
    }

    /// Create a custom alphabet.
    ///
    /// Protein-specific processing is never applied to custom alphabets,
    /// even if their symbols equal [`PROTEIN_SYMBOLS`].
    pub fn custom(symbols: &str) -> Result<Self> {
        let symbols: Vec<_> = symbols.chars().collect();
        if symbols.is_empty() {
            Err(Error::EmptyAlphabet)
        } else if symbols.len() > Code::MAX as usize {
            Err(Error::AlphabetTooLarge(symbols.len()))
        } else {
            Ok(Self {
                symbols,
                kind: AlphabetKind::Custom,
            })
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn kind(&self) -> AlphabetKind {
        self.kind
    }

    pub fn is_protein(&self) -> bool {
        self.kind == AlphabetKind::Protein
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// The out-of-alphabet code.
    pub fn invalid_code(&self) -> Code {
        self.len() as Code
    }

    /// Returns the symbol of a non-negative in-range code.
    pub fn symbol(&self, code: Code) -> Option<char> {
        usize::try_from(code)
            .ok()
            .and_then(|index| self.symbols.get(index).copied())
    }

    /// Encode a single alignment character.
    ///
    /// * An exact match of the symbol at position `k` yields `k`.
    /// * A lowercase form of the symbol at position `k` yields `k - n`.
    /// * Anything else yields `n`.
    pub fn encode(&self, character: char) -> Code {
        let character = if self.is_protein() && character == '.' {
            '-'
        } else {
            character
        };
        let upper = character.to_ascii_uppercase();
        let n = self.len() as Code;

        match self.symbols.iter().position(|&symbol| symbol == upper) {
            Some(index) if self.symbols[index] == character => index as Code,
            Some(index) => index as Code - n,
            None => n,
        }
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::protein()
    }
}

impl Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for symbol in &self.symbols {
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}
