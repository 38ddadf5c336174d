use std::fmt;
use std::str::FromStr;

/// Declared type of an output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Int4,
    Int8,
    Float8,
    Numeric,
    TextArray,
    Int8Array,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Int4 => "int4",
            ColumnType::Int8 => "int8",
            ColumnType::Float8 => "float8",
            ColumnType::Numeric => "numeric",
            ColumnType::TextArray => "text[]",
            ColumnType::Int8Array => "int8[]",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown column type `{0}`")]
pub struct UnknownColumnType(pub String);

impl FromStr for ColumnType {
    type Err = UnknownColumnType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ColumnType::Text),
            "int4" | "integer" | "int" => Ok(ColumnType::Int4),
            "int8" | "bigint" => Ok(ColumnType::Int8),
            "float8" | "double precision" | "double" => Ok(ColumnType::Float8),
            "numeric" => Ok(ColumnType::Numeric),
            "text[]" => Ok(ColumnType::TextArray),
            "int8[]" | "bigint[]" => Ok(ColumnType::Int8Array),
            other => Err(UnknownColumnType(other.to_owned())),
        }
    }
}

/// A typed value in a result row.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Int4(i32),
    Int8(i64),
    Float8(f64),
    Numeric(i128),
    TextArray(Vec<String>),
    Int8Array(Vec<i64>),
}

/// A raw, not yet coerced field produced by a line parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Column absent from the source line, e.g. counters older kernels omit.
    Null,
    Token(String),
    List(Vec<String>),
}

impl From<&str> for Cell {
    fn from(tok: &str) -> Self {
        Cell::Token(tok.to_owned())
    }
}

impl From<String> for Cell {
    fn from(tok: String) -> Self {
        Cell::Token(tok)
    }
}

pub type Row = Vec<Cell>;

/// Rows whose values all match `columns`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TypedTable {
    pub columns: Vec<ColumnType>,
    pub rows: Vec<Vec<Value>>,
}

impl TypedTable {
    pub fn empty(signature: &[ColumnType]) -> Self {
        Self {
            columns: signature.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
