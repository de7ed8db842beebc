//! Label discovery and binary normalization.

use crate::dataset::{Column, ColumnData, Table};
use crate::error::{ChurnError, Result};
use std::collections::BTreeSet;

/// How many actual column names an error message shows.
const COLUMN_PREVIEW: usize = 30;

/// How many distinct offending values an error message shows.
const OFFENDING_PREVIEW: usize = 10;

/// Return the first candidate name present in `table`.
///
/// # Errors
/// [`ChurnError::Configuration`] listing the candidates and a preview of the
/// table's columns when none is present.
pub fn find_target_column<S: AsRef<str>>(table: &Table, candidates: &[S]) -> Result<String> {
    for candidate in candidates {
        if table.contains(candidate.as_ref()) {
            return Ok(candidate.as_ref().to_string());
        }
    }

    let names = table.column_names();
    let preview: Vec<&str> = names.iter().take(COLUMN_PREVIEW).copied().collect();
    let ellipsis = if names.len() > COLUMN_PREVIEW { ", ..." } else { "" };
    let expected: Vec<&str> = candidates.iter().map(AsRef::as_ref).collect();

    Err(ChurnError::Configuration(format!(
        "could not find a target column; expected one of {:?}, columns found: [{}{}]",
        expected,
        preview.join(", "),
        ellipsis
    )))
}

/// Map a normalized label token to its class.
fn lookup(token: &str) -> Option<u8> {
    match token {
        "yes" | "true" | "1" => Some(1),
        "no" | "false" | "0" => Some(0),
        _ => None,
    }
}

fn unmapped_error(column: &Column, offending: BTreeSet<String>) -> ChurnError {
    let shown: Vec<String> = offending.iter().take(OFFENDING_PREVIEW).cloned().collect();
    ChurnError::Data(format!(
        "target column '{}' has {} value(s) outside {{yes/no, true/false, 1/0}}: {:?}",
        column.name(),
        offending.len(),
        shown
    ))
}

/// Normalize a label column to 0/1.
///
/// Text labels are trimmed and lower-cased before lookup; boolean and numeric
/// labels are cast directly. Every row must map: missing cells and values
/// outside the lexicon are rejected, never coerced.
pub fn to_binary_target(column: &Column) -> Result<Vec<u8>> {
    let mut offending = BTreeSet::new();

    let labels: Vec<u8> = match column.data() {
        ColumnData::Categorical(values) => values
            .iter()
            .map(|value| match value {
                Some(raw) => lookup(&raw.trim().to_lowercase()).unwrap_or_else(|| {
                    offending.insert(raw.clone());
                    0
                }),
                None => {
                    offending.insert("<missing>".to_string());
                    0
                }
            })
            .collect(),
        ColumnData::Boolean(values) => values
            .iter()
            .map(|value| match value {
                Some(b) => u8::from(*b),
                None => {
                    offending.insert("<missing>".to_string());
                    0
                }
            })
            .collect(),
        ColumnData::Numeric(values) => values
            .iter()
            .map(|&v| {
                if v == 0.0 {
                    0
                } else if v == 1.0 {
                    1
                } else {
                    offending.insert(if v.is_nan() {
                        "<missing>".to_string()
                    } else {
                        v.to_string()
                    });
                    0
                }
            })
            .collect(),
    };

    if !offending.is_empty() {
        return Err(unmapped_error(column, offending));
    }
    Ok(labels)
}

/// Resolve the label column of `table` and normalize it.
///
/// Returns the column name together with the 0/1 labels.
pub fn resolve_target<S: AsRef<str>>(table: &Table, candidates: &[S]) -> Result<(String, Vec<u8>)> {
    let name = find_target_column(table, candidates)?;
    let column = table
        .column(&name)
        .ok_or_else(|| ChurnError::Configuration(format!("target column '{}' vanished", name)))?;
    let labels = to_binary_target(column)?;
    Ok((name, labels))
}
