//! Registry of the line formats used by kernel virtual files.
//!
//! Every [`FormatKind`] knows its output signature and turns file content
//! into raw rows. Coercion into typed values happens later in
//! [`crate::table::assemble`].

use crate::procfs;
use crate::table::{Cell, ColumnType, Row, signature};

use super::tokens::{lines, parse_keqv_line, parse_nested_keyed_line, single_line, tokens};
use super::{Arity, ParseError};

/// Fixed-column kernel files, each with its own grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelFile {
    Diskstats,
    Mountinfo,
    Meminfo,
    NetDev,
    CpuTime,
    LoadAvg,
    PidStat,
}

/// Line format of a virtual file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Exactly one line holding one value.
    Scalar(ColumnType),
    /// One value per line, or one value per token when the file has a
    /// single line (`cpu.max`, `cgroup.controllers`).
    MultilineScalar(ColumnType),
    /// Exactly one line of space separated values, returned as one array.
    ArraySeparated(ColumnType),
    /// `<key> <value>` per line.
    FlatKeyed,
    /// `<key> <subkey> <value>`, or `<subkey> <value>` for an aggregate line.
    KeySubkeyValue,
    /// `<group> <subkey>=<value> ...` with the same number of pairs on every line.
    NestedKeyed,
    /// Downward API `key="quoted value"` per line.
    KeyEqualsQuoted,
    Kernel(KernelFile),
}

fn single_column(ty: ColumnType) -> &'static [ColumnType] {
    match ty {
        ColumnType::Text => &[ColumnType::Text],
        ColumnType::Int4 => &[ColumnType::Int4],
        ColumnType::Int8 => &[ColumnType::Int8],
        ColumnType::Float8 => &[ColumnType::Float8],
        ColumnType::Numeric => &[ColumnType::Numeric],
        ColumnType::TextArray => &[ColumnType::TextArray],
        ColumnType::Int8Array => &[ColumnType::Int8Array],
    }
}

impl FormatKind {
    /// Column signature of the rows this format produces.
    pub fn signature(self) -> &'static [ColumnType] {
        match self {
            FormatKind::Scalar(ty)
            | FormatKind::MultilineScalar(ty)
            | FormatKind::ArraySeparated(ty) => single_column(ty),
            FormatKind::FlatKeyed => signature::TEXT_INT8,
            FormatKind::KeySubkeyValue => signature::TEXT_TEXT_INT8,
            FormatKind::NestedKeyed => signature::TEXT_TEXT_FLOAT8,
            FormatKind::KeyEqualsQuoted => signature::TEXT_TEXT,
            FormatKind::Kernel(kind) => kind.signature(),
        }
    }

    /// Splits `content` into raw rows matching [`Self::signature`].
    pub fn parse(self, content: &str) -> Result<Vec<Row>, ParseError> {
        match self {
            FormatKind::Scalar(_) => Ok(vec![vec![Cell::from(single_line(content)?)]]),
            FormatKind::MultilineScalar(_) => {
                let lines = lines(content);
                let values = if lines.len() == 1 { tokens(lines[0]) } else { lines };
                Ok(values.into_iter().map(|v| vec![Cell::from(v)]).collect())
            }
            FormatKind::ArraySeparated(_) => {
                let line = single_line(content)?;
                let items = tokens(line).into_iter().map(str::to_owned).collect();
                Ok(vec![vec![Cell::List(items)]])
            }
            FormatKind::FlatKeyed => parse_flat_keyed(content),
            FormatKind::KeySubkeyValue => parse_key_subkey_value(content),
            FormatKind::NestedKeyed => parse_nested_keyed(content),
            FormatKind::KeyEqualsQuoted => lines(content)
                .into_iter()
                .enumerate()
                .map(|(idx, line)| {
                    let (key, value) = parse_keqv_line(line, idx + 1)?;
                    Ok(vec![Cell::Token(key), Cell::Token(value)])
                })
                .collect(),
            FormatKind::Kernel(kind) => kind.parse(content),
        }
    }
}

impl KernelFile {
    pub fn signature(self) -> &'static [ColumnType] {
        match self {
            KernelFile::Diskstats => signature::DISKSTATS,
            KernelFile::Mountinfo => signature::MOUNTINFO,
            KernelFile::Meminfo => signature::TEXT_INT8,
            KernelFile::NetDev => signature::NET_DEV,
            KernelFile::CpuTime => signature::CPUTIME,
            KernelFile::LoadAvg => signature::LOADAVG,
            KernelFile::PidStat => signature::PID_STAT,
        }
    }

    pub fn parse(self, content: &str) -> Result<Vec<Row>, ParseError> {
        match self {
            KernelFile::Diskstats => procfs::diskstats::parse(content),
            KernelFile::Mountinfo => procfs::mountinfo::parse(content),
            KernelFile::Meminfo => procfs::meminfo::parse(content),
            KernelFile::NetDev => procfs::netdev::parse(content),
            KernelFile::CpuTime => procfs::stat::parse_cputime(content),
            KernelFile::LoadAvg => procfs::loadavg::parse(content),
            KernelFile::PidStat => procfs::pid::parse_stat(content).map(|row| vec![row]),
        }
    }
}

fn parse_flat_keyed(content: &str) -> Result<Vec<Row>, ParseError> {
    lines(content)
        .into_iter()
        .enumerate()
        .map(|(idx, line)| match tokens(line).as_slice() {
            [key, value] => Ok(vec![Cell::from(*key), Cell::from(*value)]),
            other => Err(ParseError::TokenCount {
                line: idx + 1,
                expected: Arity::Exactly(2),
                actual: other.len(),
            }),
        })
        .collect()
}

const AGGREGATE_KEY: &str = "all";

fn parse_key_subkey_value(content: &str) -> Result<Vec<Row>, ParseError> {
    lines(content)
        .into_iter()
        .enumerate()
        .map(|(idx, line)| match tokens(line).as_slice() {
            [subkey, value] => Ok(vec![
                Cell::from(AGGREGATE_KEY),
                Cell::from(*subkey),
                Cell::from(*value),
            ]),
            [key, subkey, value] => Ok(vec![
                Cell::from(*key),
                Cell::from(*subkey),
                Cell::from(*value),
            ]),
            other => Err(ParseError::TokenCount {
                line: idx + 1,
                expected: Arity::OneOf(&[2, 3]),
                actual: other.len(),
            }),
        })
        .collect()
}

fn parse_nested_keyed(content: &str) -> Result<Vec<Row>, ParseError> {
    let lines = lines(content);
    let Some(first) = lines.first() else {
        return Ok(Vec::new());
    };
    let expected = parse_nested_keyed_line(first, 1)?.field_count();

    let mut rows = Vec::with_capacity(lines.len() * expected.saturating_sub(1));
    for (idx, line) in lines.iter().enumerate() {
        let kv = parse_nested_keyed_line(line, idx + 1)?;
        if kv.field_count() != expected {
            return Err(ParseError::NotNestedKeyed {
                line: idx + 1,
                expected,
                actual: kv.field_count(),
            });
        }
        rows.extend(kv.pairs.into_iter().map(|(subkey, value)| {
            vec![Cell::from(kv.group), Cell::from(subkey), Cell::from(value)]
        }));
    }
    Ok(rows)
}
