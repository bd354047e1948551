use nom::character::complete::{char, digit1, one_of};
use nom::combinator::{map_res, opt, recognize};
use nom::sequence::{pair, tuple};
use nom::{IResult, Parser};
use nom_supreme::ParserExt;
use nom_supreme::error::ErrorTree;
use nom_supreme::final_parser::{Location, final_parser};

pub type NomResult<'a, Ret> = IResult<&'a str, Ret, ErrorTree<&'a str>>;

pub fn p_u32(input: &str) -> NomResult<u32> {
    map_res(digit1, |number: &str| number.parse::<u32>())
        .context("integer")
        .parse(input)
}

/// Optionally signed decimal number, e.g. `16`, `-3`, `+16.5`.
pub fn p_decimal(input: &str) -> NomResult<f64> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        |number: &str| number.parse::<f64>(),
    )
    .context("number")
    .parse(input)
}

/// Returns the first match of `parser` found anywhere inside `input`.
pub fn find_first<'a, O, P>(mut parser: P, input: &'a str) -> Option<O>
where
    P: Parser<&'a str, O, ErrorTree<&'a str>>,
{
    input
        .char_indices()
        .find_map(|(index, _)| parser.parse(&input[index..]).ok().map(|(_, value)| value))
}

/// Runs `parser` and makes sure that it has consumed the whole input.
pub fn consume_all<'a, O, P>(parser: P, input: &'a str) -> anyhow::Result<O>
where
    P: Parser<&'a str, O, ErrorTree<&'a str>>,
{
    final_parser(parser)(input)
        .map_err(|error: ErrorTree<Location>| anyhow::anyhow!("Parse error\n{error}"))
}
