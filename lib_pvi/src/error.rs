use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("An IO error occurred: {0}.")]
    Io(#[from] std::io::Error),

    #[error("Error reading alignment: sequences should start with '>', but found '{found}'.")]
    MissingNameMarker { found: char },

    #[error("The alignment contains no sequence records.")]
    NoRecords,

    #[error(
        "Incompatible sequence length ({length} should be {expected}) for {name}:\n{sequence}"
    )]
    SequenceLength {
        name: String,
        length: usize,
        expected: usize,
        sequence: String,
    },

    #[error("None of the {0} sequences consists only of alphabet characters.")]
    NoValidSequences(usize),

    #[error("The alignment contains no sites to analyse.")]
    NoSites,

    #[error("The alphabet must contain at least one symbol.")]
    EmptyAlphabet,

    #[error("The alphabet has {0} symbols, but at most 127 are supported.")]
    AlphabetTooLarge(usize),

    #[error("A parsing error of kind '{kind:?}' occurred when the remaining input was '{input}'.")]
    Parser {
        input: String,
        kind: nom::error::ErrorKind,
    },

    #[error("Parsing was unsuccessful due to incomplete input: {0:?}.")]
    ParserIncomplete(nom::Needed),

    #[error("Expected a parameter vector of length {expected}, but got {actual}.")]
    ParameterLength { expected: usize, actual: usize },

    #[error("The value {0} does not fit into the 32 bit integer of the output format.")]
    IntegerOverflow(usize),

    #[error("Marginals have not been computed for this alignment.")]
    MissingMarginals,

    #[error("Unable to create the worker thread pool: {0}.")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub fn translate_nom_error(error: nom::Err<nom::error::Error<&str>>) -> Error {
    match error {
        nom::Err::Incomplete(needed) => Error::ParserIncomplete(needed),
        nom::Err::Error(error) | nom::Err::Failure(error) => Error::Parser {
            input: error.input.to_string(),
            kind: error.code,
        },
    }
}
