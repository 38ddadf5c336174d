use std::path::Path;

use crate::parse::{CoerceError, ParseError, coerce};
use crate::{Error, Result};

use super::{Cell, ColumnType, Row, TypedTable, Value};

/// Whether the subsystem behind a table is switched on.
#[derive(Debug, Clone, Copy)]
pub enum Availability<'a> {
    /// Administratively disabled: an empty table is the expected answer.
    Disabled,
    /// Enabled and backed by the given file: zero rows means the source is broken.
    Enabled(&'a Path),
}

/// Validates `rows` against `signature` and coerces every cell.
///
/// # Errors
///
/// - [`Error::NoData`] if the source is enabled but produced no rows.
/// - [`Error::Malformed`] if a row has the wrong column count or a cell fails coercion.
pub fn assemble(
    rows: Vec<Row>,
    signature: &[ColumnType],
    availability: Availability<'_>,
) -> Result<TypedTable> {
    let path = match availability {
        Availability::Disabled => return Ok(TypedTable::empty(signature)),
        Availability::Enabled(path) => path,
    };
    if rows.is_empty() {
        return Err(Error::NoData {
            path: path.to_path_buf(),
        });
    }

    let malformed = |source| Error::Malformed {
        path: path.to_path_buf(),
        source,
    };

    let mut typed = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        if row.len() != signature.len() {
            return Err(malformed(ParseError::ColumnCount {
                row: idx + 1,
                expected: signature.len(),
                actual: row.len(),
            }));
        }

        let values = row
            .into_iter()
            .zip(signature)
            .enumerate()
            .map(|(col, (cell, ty))| {
                coerce_cell(cell, *ty).map_err(|source| ParseError::Value {
                    row: idx + 1,
                    column: col + 1,
                    source,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(malformed)?;
        typed.push(values);
    }

    Ok(TypedTable {
        columns: signature.to_vec(),
        rows: typed,
    })
}

/// Coerces one raw cell into a value of the given column type.
pub fn coerce_cell(cell: Cell, ty: ColumnType) -> std::result::Result<Value, CoerceError> {
    let value = match (cell, ty) {
        (Cell::Null, _) => Value::Null,
        (Cell::Token(tok), ColumnType::Text) => Value::Text(tok),
        (Cell::Token(tok), ColumnType::Int4) => Value::Int4(coerce::to_int32(&tok)?),
        (Cell::Token(tok), ColumnType::Int8) => Value::Int8(coerce::to_int64(&tok)?),
        (Cell::Token(tok), ColumnType::Float8) => Value::Float8(coerce::to_float64(&tok)?),
        (Cell::Token(tok), ColumnType::Numeric) => Value::Numeric(coerce::to_numeric(&tok)?),
        (Cell::List(items), ColumnType::TextArray) => Value::TextArray(items),
        (Cell::List(items), ColumnType::Int8Array) => Value::Int8Array(
            items
                .iter()
                .map(|item| coerce::to_int64(item))
                .collect::<std::result::Result<_, _>>()?,
        ),
        (Cell::Token(tok), ty) => {
            return Err(CoerceError::Invalid {
                value: tok,
                target: ty.as_str(),
            });
        }
        (Cell::List(items), ty) => {
            return Err(CoerceError::Invalid {
                value: items.join(" "),
                target: ty.as_str(),
            });
        }
    };
    Ok(value)
}
