//! Per-process files under `/proc/<pid>/`.

use std::path::{Path, PathBuf};

use crate::parse::tokens::{lines, single_line, tokens};
use crate::parse::{Arity, ParseError};
use crate::table::{Cell, Row};

const STAT_COLUMNS: usize = 52;
const IO_FIELDS: usize = 7;

/// `/proc/<ppid>/task/<ppid>/children`
pub fn children_path(proc_root: &Path, ppid: u32) -> PathBuf {
    proc_root.join(format!("{ppid}/task/{ppid}/children"))
}

pub fn stat_path(proc_root: &Path, pid: &str) -> PathBuf {
    proc_root.join(pid).join("stat")
}

pub fn io_path(proc_root: &Path, pid: &str) -> PathBuf {
    proc_root.join(pid).join("io")
}

pub fn cmdline_path(proc_root: &Path, pid: &str) -> PathBuf {
    proc_root.join(pid).join("cmdline")
}

/// Lists the child pids from a `children` file. An empty file has none.
pub fn parse_children(content: &str) -> Vec<String> {
    lines(content)
        .into_iter()
        .flat_map(tokens)
        .map(str::to_owned)
        .collect()
}

/// Splits `/proc/<pid>/stat` into its 52 fields.
///
/// The command name sits between the first `(` and the last `)` and may
/// itself contain spaces and parentheses.
pub fn parse_stat(content: &str) -> Result<Row, ParseError> {
    let line = single_line(content)?;
    let open = line.find('(').ok_or(ParseError::MissingDelimiter {
        line: 1,
        delimiter: '(',
    })?;
    let close = line
        .rfind(')')
        .filter(|close| *close > open)
        .ok_or(ParseError::MissingDelimiter {
            line: 1,
            delimiter: ')',
        })?;

    let pid = line[..open].trim();
    let comm = &line[open + 1..close];
    let rest = tokens(&line[close + 1..]);
    if rest.len() + 2 != STAT_COLUMNS {
        return Err(ParseError::TokenCount {
            line: 1,
            expected: Arity::Exactly(STAT_COLUMNS),
            actual: rest.len() + 2,
        });
    }

    let mut row = Vec::with_capacity(STAT_COLUMNS);
    row.push(Cell::from(pid));
    row.push(Cell::from(comm));
    row.extend(rest.into_iter().map(Cell::from));
    Ok(row)
}

/// Shapes `/proc/<pid>/io` into `pid` followed by its seven counters.
pub fn parse_io(pid: &str, content: &str) -> Result<Row, ParseError> {
    let lines = lines(content);
    if lines.len() != IO_FIELDS {
        return Err(ParseError::LineCount {
            expected: Arity::Exactly(IO_FIELDS),
            actual: lines.len(),
        });
    }

    let mut row = Vec::with_capacity(IO_FIELDS + 1);
    row.push(Cell::from(pid));
    for (idx, line) in lines.into_iter().enumerate() {
        match tokens(line).as_slice() {
            [_key, value] => row.push(Cell::from(*value)),
            other => {
                return Err(ParseError::TokenCount {
                    line: idx + 1,
                    expected: Arity::Exactly(2),
                    actual: other.len(),
                });
            }
        }
    }
    Ok(row)
}

/// Renders a NUL separated command line with spaces.
pub fn render_cmdline(raw: &str) -> String {
    raw.split('\0')
        .filter(|arg| !arg.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT_TAIL: &str = "S 1 100 100 0 -1 4194560 1553 0 0 0 2 1 0 0 20 0 1 0 \
        123456 229376000 4107 18446744073709551615 1 1 0 0 0 0 0 4096 536873472 0 0 0 \
        17 3 0 0 0 0 0 0 0 0 0 0 0 0 0";

    #[test]
    fn test_parse_stat_plain_command() {
        let content = format!("4242 (postgres) {STAT_TAIL}\n");
        let row = parse_stat(&content).unwrap();
        assert_eq!(row.len(), STAT_COLUMNS);
        assert_eq!(row[0], Cell::from("4242"));
        assert_eq!(row[1], Cell::from("postgres"));
        assert_eq!(row[2], Cell::from("S"));
        assert_eq!(row[51], Cell::from("0"));
    }

    #[test]
    fn test_parse_stat_command_with_parens_and_spaces() {
        let content = format!("77 (tmux: (server) x) {STAT_TAIL}\n");
        let row = parse_stat(&content).unwrap();
        assert_eq!(row[1], Cell::from("tmux: (server) x"));
        assert_eq!(row[2], Cell::from("S"));
        assert_eq!(row.len(), STAT_COLUMNS);
    }

    #[test]
    fn test_parse_stat_wrong_width() {
        let err = parse_stat("1 (init) S 0 1\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::TokenCount {
                line: 1,
                expected: Arity::Exactly(52),
                actual: 5
            }
        );
        assert!(matches!(
            parse_stat("1 init S\n").unwrap_err(),
            ParseError::MissingDelimiter { delimiter: '(', .. }
        ));
    }

    #[test]
    fn test_parse_io() {
        let content = "\
rchar: 323934931
wchar: 323929600
syscr: 632687
syscw: 632675
read_bytes: 0
write_bytes: 323932160
cancelled_write_bytes: 0
";
        let row = parse_io("17", content).unwrap();
        assert_eq!(row.len(), 8);
        assert_eq!(row[0], Cell::from("17"));
        assert_eq!(row[1], Cell::from("323934931"));
        assert_eq!(row[7], Cell::from("0"));

        assert!(matches!(
            parse_io("17", "rchar: 1\n").unwrap_err(),
            ParseError::LineCount { actual: 1, .. }
        ));
    }

    #[test]
    fn test_parse_children_and_cmdline() {
        assert_eq!(parse_children("12 13 14 \n"), vec!["12", "13", "14"]);
        assert!(parse_children("").is_empty());
        assert_eq!(
            render_cmdline("postgres\0-D\0/var/lib/pg\0"),
            "postgres -D /var/lib/pg"
        );
        assert_eq!(
            children_path(Path::new("/proc"), 9),
            PathBuf::from("/proc/9/task/9/children")
        );
    }
}
