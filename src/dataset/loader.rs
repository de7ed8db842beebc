//! CSV loading with per-column type inference.

use crate::dataset::{Column, ColumnData, Table};
use crate::error::{ChurnError, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Cell values read as missing.
const MISSING_TOKENS: [&str; 19] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
    "#NA", "#N/A N/A", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN",
];

const TRUE_TOKENS: [&str; 3] = ["True", "TRUE", "true"];
const FALSE_TOKENS: [&str; 3] = ["False", "FALSE", "false"];

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    if TRUE_TOKENS.contains(&cell) {
        Some(true)
    } else if FALSE_TOKENS.contains(&cell) {
        Some(false)
    } else {
        None
    }
}

/// Pick the narrowest kind that holds every non-missing cell.
fn infer_column(name: String, cells: Vec<String>) -> Column {
    let present = || cells.iter().filter(|c| !is_missing(c));

    if present().all(|c| c.trim().parse::<f64>().is_ok()) {
        let values = cells
            .iter()
            .map(|c| {
                if is_missing(c) {
                    f64::NAN
                } else {
                    c.trim().parse::<f64>().unwrap_or(f64::NAN)
                }
            })
            .collect();
        return Column::new(name, ColumnData::Numeric(values));
    }

    if present().all(|c| parse_bool(c).is_some()) {
        let values = cells
            .iter()
            .map(|c| if is_missing(c) { None } else { parse_bool(c) })
            .collect();
        return Column::new(name, ColumnData::Boolean(values));
    }

    let values = cells
        .into_iter()
        .map(|c| if is_missing(&c) { None } else { Some(c) })
        .collect();
    Column::new(name, ColumnData::Categorical(values))
}

/// Read a CSV with a header row from any reader.
///
/// `origin` only labels errors.
pub fn read_csv<R: Read>(reader: R, origin: &Path) -> Result<Table> {
    let source_err = |source: csv::Error| ChurnError::DataSource {
        path: origin.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(source_err)?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() {
        return Err(ChurnError::Data(format!(
            "{} has no header row",
            origin.display()
        )));
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in rdr.records() {
        let record = record.map_err(source_err)?;
        for (col, value) in record.iter().enumerate() {
            cells[col].push(value.to_string());
        }
    }

    let columns: Vec<Column> = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| infer_column(name, values))
        .collect();

    for column in &columns {
        debug!(
            column = column.name(),
            kind = ?column.kind(),
            missing = column.missing_count(),
            "inferred column"
        );
    }

    Table::new(columns)
}

/// Load the CSV file at `path`.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ChurnError::DataSource {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    let table = read_csv(BufReader::new(file), path)?;
    info!(
        path = %path.display(),
        rows = table.n_rows(),
        columns = table.n_cols(),
        "loaded dataset"
    );
    Ok(table)
}
