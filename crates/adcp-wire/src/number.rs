use crate::error::{Result, WireError};

/// Parse an integer literal in any of the notations the command line
/// accepts: decimal (optionally negative), `0x` hex, `0b` binary, and
/// leading-zero octal.
///
/// Only plain decimal may carry a sign; the prefixed notations are
/// unsigned digit strings.
pub fn parse_number(token: &str) -> Result<i128> {
    let invalid = || WireError::InvalidNumber(token.to_string());

    if let Some(hex) = token.strip_prefix("0x") {
        i128::from_str_radix(hex, 16).map_err(|_| invalid())
    } else if let Some(bin) = token.strip_prefix("0b") {
        i128::from_str_radix(bin, 2).map_err(|_| invalid())
    } else if token.len() > 1 && token.starts_with('0') {
        i128::from_str_radix(&token[1..], 8).map_err(|_| invalid())
    } else {
        token.parse::<i128>().map_err(|_| invalid())
    }
}
