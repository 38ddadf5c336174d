use std::fmt;

use crate::procfs::mountinfo::MountInfoError;

/// Number of tokens or lines a grammar accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
    OneOf(&'static [usize]),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exactly(expected) => n == expected,
            Arity::AtLeast(min) => n >= min,
            Arity::OneOf(set) => set.contains(&n),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::OneOf(set) => {
                let joined: Vec<String> = set.iter().map(ToString::to_string).collect();
                write!(f, "one of {}", joined.join(", "))
            }
        }
    }
}

/// Errors raised while decoding the content of a virtual file.
///
/// Line numbers are 1-based. The path is attached by the caller.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseError {
    #[error("expected {expected} tokens, got {actual} on line {line}")]
    TokenCount {
        line: usize,
        expected: Arity,
        actual: usize,
    },

    #[error("expected {expected} lines, got {actual}")]
    LineCount { expected: Arity, actual: usize },

    #[error(
        "not a nested keyed file: line {line} has {actual} fields, first line has {expected}"
    )]
    NotNestedKeyed {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("malformed subkey=value pair `{token}` on line {line}")]
    MalformedPair { line: usize, token: String },

    #[error("missing `{delimiter}` on line {line}")]
    MissingDelimiter { line: usize, delimiter: char },

    #[error("malformed mountinfo line {line}: {source}")]
    Mountinfo {
        line: usize,
        #[source]
        source: MountInfoError,
    },

    #[error("malformed quoted value on line {line}: {source}")]
    Escape {
        line: usize,
        #[source]
        source: EscapeError,
    },

    #[error("row {row} has {actual} columns, expected {expected}")]
    ColumnCount {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("row {row}, column {column}: {source}")]
    Value {
        row: usize,
        column: usize,
        #[source]
        source: CoerceError,
    },
}

/// Errors raised by the quoted-string decoder.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EscapeError {
    #[error("malformed \\{escape} literal, expected {needed} hex digits")]
    ShortHex { escape: char, needed: usize },

    #[error("invalid unicode code point {0:#x}")]
    InvalidCodePoint(u32),

    #[error("escaped bytes are not valid UTF-8 after {offset} bytes")]
    InvalidUtf8 { offset: usize },
}

/// Errors raised when converting a single token into a typed value.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoerceError {
    #[error("`{value}` is not a valid {target}")]
    Invalid { value: String, target: &'static str },

    #[error("invalid size `{0}`")]
    InvalidSize(String),

    #[error("invalid size unit `{0}`, valid units are bytes, kB, MB, GB, TB and PB")]
    UnknownUnit(String),

    #[error("size `{0}` is out of range")]
    OutOfRange(String),
}
