//! `/proc/net/dev`: two header lines, then one line per interface.
//!
//! Older kernels print no space between the interface colon and the first
//! counter, so the name is split at `:` instead of by whitespace.

use crate::parse::tokens::{lines, tokens};
use crate::parse::{Arity, ParseError};
use crate::table::{Cell, Row};

const HEADER_LINES: usize = 2;
const COUNTERS: usize = 16;

/// Splits an interface line into its name and the counter tokens.
fn parse_interface_line(line: &str) -> Option<(&str, Vec<&str>)> {
    let (iface, data) = line.trim().split_once(':')?;
    Some((iface.trim(), tokens(data)))
}

pub fn parse(content: &str) -> Result<Vec<Row>, ParseError> {
    lines(content)
        .into_iter()
        .enumerate()
        .skip(HEADER_LINES)
        .map(|(idx, line)| {
            let lineno = idx + 1;
            let (iface, counters) = parse_interface_line(line).ok_or(
                ParseError::MissingDelimiter {
                    line: lineno,
                    delimiter: ':',
                },
            )?;
            if counters.len() != COUNTERS {
                return Err(ParseError::TokenCount {
                    line: lineno,
                    expected: Arity::Exactly(COUNTERS + 1),
                    actual: counters.len() + 1,
                });
            }

            let mut row = Vec::with_capacity(COUNTERS + 1);
            row.push(Cell::from(iface));
            row.extend(counters.into_iter().map(Cell::from));
            Ok(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
";

    #[test]
    fn test_parse_interfaces() {
        let content = format!(
            "{HEADER}    lo: 1000 10 0 0 0 0 0 0 1000 10 0 0 0 0 0 0\n  eth0:2000 20 1 2 3 4 5 6 3000 30 7 8 9 10 11 12\n"
        );
        let rows = parse(&content).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], Cell::from("lo"));
        assert_eq!(rows[1][0], Cell::from("eth0"));
        assert_eq!(rows[1][1], Cell::from("2000"));
        assert_eq!(rows[1][16], Cell::from("12"));
        assert!(rows.iter().all(|r| r.len() == 17));
    }

    #[test]
    fn test_headers_only() {
        assert!(parse(HEADER).unwrap().is_empty());
    }

    #[test]
    fn test_short_line() {
        let content = format!("{HEADER}  eth0: 1 2 3\n");
        let err = parse(&content).unwrap_err();
        assert_eq!(
            err,
            ParseError::TokenCount {
                line: 3,
                expected: Arity::Exactly(17),
                actual: 4
            }
        );
    }

    #[test]
    fn test_missing_colon() {
        let content = format!("{HEADER}  eth0 1 2 3\n");
        assert!(matches!(
            parse(&content).unwrap_err(),
            ParseError::MissingDelimiter { line: 3, .. }
        ));
    }
}
