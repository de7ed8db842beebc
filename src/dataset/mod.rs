//! In-memory tabular data.
//!
//! A [`Table`] is an ordered set of equally long, named [`Column`]s. Each
//! column has one of three kinds, inferred once at load time:
//!
//! - **Numeric**: stored as `f64`, missing cells are `NaN`.
//! - **Boolean**: `true`/`false` literals, missing cells are `None`.
//! - **Categorical**: raw text, missing cells are `None`.
//!
//! Tables are read-only; column removal and row selection produce new tables.
//!
//! # Example
//!
//! ```rust
//! use churnsense::dataset::{Column, ColumnData, Table};
//!
//! let table = Table::new(vec![
//!     Column::new("tenure", ColumnData::Numeric(vec![1.0, f64::NAN, 24.0])),
//!     Column::new("Churn", ColumnData::Categorical(vec![
//!         Some("Yes".into()), Some("No".into()), Some("No".into()),
//!     ])),
//! ]).unwrap();
//!
//! assert_eq!(table.n_rows(), 3);
//! assert_eq!(table.numeric_column_names(), vec!["tenure"]);
//! ```

use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod loader;
pub use self::loader::{load_csv, read_csv};

/// Inferred type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Categorical,
}

/// Cell storage of a column.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    /// Numbers; `NaN` marks a missing cell.
    Numeric(Vec<f64>),
    /// Boolean literals.
    Boolean(Vec<Option<bool>>),
    /// Free text.
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Boolean(_) => ColumnKind::Boolean,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
        }
    }

    fn take(&self, rows: &[usize]) -> Self {
        match self {
            ColumnData::Numeric(v) => ColumnData::Numeric(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Boolean(v) => ColumnData::Boolean(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Categorical(v) => {
                ColumnData::Categorical(rows.iter().map(|&r| v[r].clone()).collect())
            }
        }
    }
}

/// A named column.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().filter(|x| x.is_nan()).count(),
            ColumnData::Boolean(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Categorical(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }
}

/// Ordered collection of equally long columns with unique names.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.len() != n_rows {
                return Err(ChurnError::Data(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.len(),
                    n_rows
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(ChurnError::Data(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }

        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Names of numeric columns, in table order.
    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.kind() == ColumnKind::Numeric)
            .map(Column::name)
            .collect()
    }

    /// Names of categorical and boolean columns, in table order.
    pub fn categorical_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.kind() != ColumnKind::Numeric)
            .map(Column::name)
            .collect()
    }

    /// New table without the named columns. Unknown names are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Table {
        let columns = self
            .columns
            .iter()
            .filter(|c| !names.contains(&c.name.as_str()))
            .cloned()
            .collect();
        Table {
            columns,
            n_rows: self.n_rows,
        }
    }

    /// New table with the given rows, in the given order.
    ///
    /// # Panics
    /// Panics if any index is out of bounds.
    pub fn take_rows(&self, rows: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.data.take(rows)))
            .collect();
        Table {
            columns,
            n_rows: rows.len(),
        }
    }
}
