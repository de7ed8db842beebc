//! Removal of the label and answer-leaking columns from the features.

use crate::dataset::Table;
use tracing::info;

/// Feature table after filtering, with the columns that were actually removed.
#[derive(Clone, Debug)]
pub struct LeakageFiltered {
    pub features: Table,
    /// Target first, then present leakage columns in list order.
    pub dropped: Vec<String>,
}

/// Drop `target` and every leakage column present in `table`.
///
/// Names that are not in the table are ignored. Remaining columns keep their order.
pub fn drop_leakage_columns<S: AsRef<str>>(
    table: &Table,
    target: &str,
    leakage: &[S],
) -> LeakageFiltered {
    let mut dropped = Vec::with_capacity(leakage.len() + 1);
    if table.contains(target) {
        dropped.push(target.to_string());
    }
    for name in leakage {
        let name = name.as_ref();
        if name != target && table.contains(name) && !dropped.iter().any(|d| d == name) {
            dropped.push(name.to_string());
        }
    }

    let refs: Vec<&str> = dropped.iter().map(String::as_str).collect();
    let features = table.drop_columns(&refs);

    info!(
        dropped = ?dropped,
        remaining = features.n_cols(),
        "filtered target and leakage columns"
    );

    LeakageFiltered { features, dropped }
}
