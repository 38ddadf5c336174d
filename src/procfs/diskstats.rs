//! `/proc/diskstats`.
//!
//! Kernels before 4.18 print 14 fields, 4.18 adds four discard counters and
//! 5.5 adds two flush counters. Columns a line does not carry are null.

use crate::parse::tokens::{lines, tokens};
use crate::parse::{Arity, ParseError};
use crate::table::{Cell, Row};

const COLUMNS: usize = 20;
const ACCEPTED: Arity = Arity::OneOf(&[14, 18, 20]);

pub fn parse(content: &str) -> Result<Vec<Row>, ParseError> {
    lines(content)
        .into_iter()
        .enumerate()
        .map(|(idx, line)| {
            let toks = tokens(line);
            if !ACCEPTED.accepts(toks.len()) {
                return Err(ParseError::TokenCount {
                    line: idx + 1,
                    expected: ACCEPTED,
                    actual: toks.len(),
                });
            }
            let mut row: Row = toks.into_iter().map(Cell::from).collect();
            row.resize(COLUMNS, Cell::Null);
            Ok(row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE_14: &str = "   8       0 sda 100 2 300 4 500 6 700 8 0 900 1000";
    const LINE_18: &str = "   8       1 sda1 100 2 300 4 500 6 700 8 0 900 1000 1 2 3 4";
    const LINE_20: &str = " 259       0 nvme0n1 100 2 300 4 500 6 700 8 0 900 1000 1 2 3 4 5 6";

    #[test]
    fn test_accepts_kernel_variants() {
        let content = format!("{LINE_14}\n{LINE_18}\n{LINE_20}\n");
        let rows = parse(&content).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.len() == COLUMNS));
        assert_eq!(rows[0][2], Cell::from("sda"));
    }

    #[test]
    fn test_missing_columns_are_null() {
        let rows = parse(LINE_14).unwrap();
        assert_eq!(rows[0][13], Cell::from("1000"));
        assert!(rows[0][14..].iter().all(|c| *c == Cell::Null));

        let rows = parse(LINE_18).unwrap();
        assert_eq!(rows[0][17], Cell::from("4"));
        assert_eq!(rows[0][18], Cell::Null);
    }

    #[test]
    fn test_rejects_fifteen_tokens() {
        let content = format!("{LINE_14}\n{LINE_14} 1\n");
        let err = parse(&content).unwrap_err();
        assert_eq!(
            err,
            ParseError::TokenCount {
                line: 2,
                expected: ACCEPTED,
                actual: 15
            }
        );
    }
}
