//! `/proc/loadavg`: `1m 5m 15m running/total last_pid`.

use crate::parse::tokens::{single_line, tokens};
use crate::parse::{Arity, ParseError};
use crate::table::{Cell, Row};

pub fn parse(content: &str) -> Result<Vec<Row>, ParseError> {
    let toks = tokens(single_line(content)?);
    match toks.as_slice() {
        [one, five, fifteen, _running, last_pid, ..] => Ok(vec![vec![
            Cell::from(*one),
            Cell::from(*five),
            Cell::from(*fifteen),
            Cell::from(*last_pid),
        ]]),
        other => Err(ParseError::TokenCount {
            line: 1,
            expected: Arity::AtLeast(5),
            actual: other.len(),
        }),
    }
}
