//! `/proc/stat`.

use crate::parse::tokens::{lines, tokens};
use crate::parse::{Arity, ParseError};
use crate::table::{Cell, Row};

const CPU_FIELDS: usize = 5;

/// Aggregate `user nice system idle iowait` ticks from the leading `cpu` line.
pub fn parse_cputime(content: &str) -> Result<Vec<Row>, ParseError> {
    let lines = lines(content);
    let first = lines.first().ok_or(ParseError::LineCount {
        expected: Arity::AtLeast(1),
        actual: 0,
    })?;

    let toks = tokens(first);
    if toks.len() < CPU_FIELDS + 1 {
        return Err(ParseError::TokenCount {
            line: 1,
            expected: Arity::AtLeast(CPU_FIELDS + 1),
            actual: toks.len(),
        });
    }

    Ok(vec![
        toks[1..=CPU_FIELDS].iter().map(|t| Cell::from(*t)).collect(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cputime_first_line() {
        let content = "\
cpu  10132153 290696 3084719 46828483 16683 0 25195 0 0 0
cpu0 1393280 32966 572056 13343292 6130 0 17875 0 0 0
intr 199292
";
        let rows = parse_cputime(content).unwrap();
        let expected: Row = ["10132153", "290696", "3084719", "46828483", "16683"]
            .into_iter()
            .map(Cell::from)
            .collect();
        assert_eq!(rows, vec![expected]);
    }

    #[test]
    fn test_cputime_too_few_tokens() {
        let err = parse_cputime("cpu 1 2 3\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::TokenCount {
                line: 1,
                expected: Arity::AtLeast(6),
                actual: 4
            }
        );
        assert!(matches!(
            parse_cputime("").unwrap_err(),
            ParseError::LineCount { actual: 0, .. }
        ));
    }
}
