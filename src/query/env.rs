//! Queries over the process environment.
use std::env::VarError;

use crate::table::Value;
use crate::{Error, Result};

fn lookup(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(Error::EnvVar {
            name: name.to_owned(),
            reason: "value is not valid unicode",
        }),
    }
}

/// Value of the variable, `NULL` when unset.
pub fn text(name: &str) -> Result<Value> {
    Ok(lookup(name)?.map_or(Value::Null, Value::Text))
}

/// Value of the variable as a strict base-10 integer, `NULL` when unset.
///
/// # Errors
///
/// [`Error::EnvVar`] if the value has any non-numeric content.
pub fn bigint(name: &str) -> Result<Value> {
    let Some(raw) = lookup(name)? else {
        return Ok(Value::Null);
    };
    raw.parse::<i64>()
        .map(Value::Int8)
        .map_err(|_| Error::EnvVar {
            name: name.to_owned(),
            reason: "contents not an integer",
        })
}
