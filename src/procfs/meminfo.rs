//! `/proc/meminfo`: `<key>: <value> [<unit>]` per line, reported in bytes.

use crate::parse::coerce::human_size_to_bytes;
use crate::parse::tokens::{lines, tokens};
use crate::parse::{Arity, ParseError};
use crate::table::{Cell, Row};

pub fn parse(content: &str) -> Result<Vec<Row>, ParseError> {
    lines(content)
        .into_iter()
        .enumerate()
        .map(|(idx, line)| {
            let (key, value) = match tokens(line).as_slice() {
                [key, value] => (*key, (*value).to_owned()),
                [key, value, unit] => {
                    let bytes = human_size_to_bytes(value, unit).map_err(|source| {
                        ParseError::Value {
                            row: idx + 1,
                            column: 2,
                            source,
                        }
                    })?;
                    (*key, bytes.to_string())
                }
                other => {
                    return Err(ParseError::TokenCount {
                        line: idx + 1,
                        expected: Arity::OneOf(&[2, 3]),
                        actual: other.len(),
                    });
                }
            };
            let key = key.strip_suffix(':').unwrap_or(key);
            Ok(vec![Cell::from(key), Cell::from(value)])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_converted_to_bytes() {
        let content = "\
MemTotal:       16318228 kB
HugePages_Total:       0
Hugepagesize:       2048 kB
";
        let rows = parse(content).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![Cell::from("MemTotal"), Cell::from("16709865472")],
                vec![Cell::from("HugePages_Total"), Cell::from("0")],
                vec![Cell::from("Hugepagesize"), Cell::from("2097152")],
            ]
        );
    }

    #[test]
    fn test_rejects_extra_tokens() {
        let err = parse("MemTotal: 1 kB extra\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::TokenCount {
                line: 1,
                expected: Arity::OneOf(&[2, 3]),
                actual: 4
            }
        );
    }

    #[test]
    fn test_unknown_unit() {
        let err = parse("MemTotal: 1 parsecs\n").unwrap_err();
        assert!(matches!(err, ParseError::Value { row: 1, column: 2, .. }));
    }
}
