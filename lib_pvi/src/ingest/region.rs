use nom::{
    IResult,
    character::complete::{char, digit1},
    combinator::map_res,
    sequence::preceded,
};

use crate::error::{Result, translate_nom_error};

/// Parse the start of the region annotation `/START-END` that directly follows the focus
/// identifier in the focus name.
///
/// Returns `None` if the identifier is not directly followed by `/`.
/// Otherwise returns the 1-based position of the first alignment column in the full sequence,
/// or the parser error if the region does not start with a number.
pub fn parse_region_start(name: &str, identifier: &str) -> Option<Result<usize>> {
    let rest = name.strip_prefix(identifier)?;
    if !rest.starts_with('/') || rest.len() < 2 {
        return None;
    }

    Some(
        region_start(rest)
            .map(|(_, start)| start)
            .map_err(translate_nom_error),
    )
}

fn region_start(input: &str) -> IResult<&str, usize> {
    preceded(char('/'), map_res(digit1, str::parse::<usize>))(input)
}
