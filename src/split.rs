//! Stratified, seeded train/test partitioning.
//!
//! The held-out fraction is taken per class so both partitions keep the
//! label's class balance. Given the same labels and seed the partition is
//! always identical.

use crate::dataset::Table;
use crate::error::{ChurnError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::info;

/// Parameters of a stratified shuffle split.
#[derive(Clone, Debug)]
pub struct StratifiedSplit {
    pub test_fraction: f64,
    pub seed: u64,
}

/// Row indices of each partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Features and labels of both partitions.
#[derive(Clone, Debug)]
pub struct TrainTestSplit {
    pub x_train: Table,
    pub x_test: Table,
    pub y_train: Vec<u8>,
    pub y_test: Vec<u8>,
}

impl Default for StratifiedSplit {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Distribute `total` slots across classes proportionally to `counts`.
///
/// Floors first, then hands leftover slots to the largest fractional
/// remainders; ties go to the earlier class. Never exceeds a class's count.
fn allocate(counts: &[usize], total: usize) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| total as f64 * c as f64 / n as f64)
        .collect();
    let mut alloc: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut remaining = total - alloc.iter().sum::<usize>();
    while remaining > 0 {
        let mut progressed = false;
        for &class in &order {
            if remaining == 0 {
                break;
            }
            if alloc[class] < counts[class] {
                alloc[class] += 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    alloc
}

impl StratifiedSplit {
    pub fn new(test_fraction: f64, seed: u64) -> Self {
        Self {
            test_fraction,
            seed,
        }
    }

    /// Partition row indices of `labels`.
    ///
    /// # Errors
    /// [`ChurnError::Configuration`] when the split is infeasible: fewer than
    /// two classes, a class with a single member, a partition too small to
    /// hold every class, or a test fraction outside (0, 1).
    pub fn split(&self, labels: &[u8]) -> Result<SplitIndices> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ChurnError::Configuration(format!(
                "test fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }

        let mut by_class: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
        for (row, &label) in labels.iter().enumerate() {
            by_class.entry(label).or_default().push(row);
        }
        let class_counts: Vec<(u8, usize)> =
            by_class.iter().map(|(&c, rows)| (c, rows.len())).collect();

        let n = labels.len();
        let n_test = (self.test_fraction * n as f64).ceil() as usize;
        let n_train = n.saturating_sub(n_test);
        let n_classes = by_class.len();

        if n_classes < 2 {
            return Err(ChurnError::Configuration(format!(
                "stratified split needs at least two classes, class counts: {:?}",
                class_counts
            )));
        }
        if let Some((class, count)) = class_counts.iter().find(|(_, count)| *count < 2) {
            return Err(ChurnError::Configuration(format!(
                "class {} has only {} member(s), too few to appear in both partitions; class counts: {:?}",
                class, count, class_counts
            )));
        }
        if n_test < n_classes || n_train < n_classes {
            return Err(ChurnError::Configuration(format!(
                "train size {} / test size {} cannot hold {} classes; class counts: {:?}",
                n_train, n_test, n_classes, class_counts
            )));
        }

        let counts: Vec<usize> = class_counts.iter().map(|(_, c)| *c).collect();
        let train_alloc = allocate(&counts, n_train);
        let left: Vec<usize> = counts
            .iter()
            .zip(&train_alloc)
            .map(|(c, t)| c - t)
            .collect();
        let test_alloc = allocate(&left, n_test);

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut train = Vec::with_capacity(n_train);
        let mut test = Vec::with_capacity(n_test);

        for (i, rows) in by_class.into_values().enumerate() {
            let mut rows = rows;
            rows.shuffle(&mut rng);
            train.extend_from_slice(&rows[..train_alloc[i]]);
            test.extend_from_slice(&rows[train_alloc[i]..train_alloc[i] + test_alloc[i]]);
        }

        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        Ok(SplitIndices { train, test })
    }
}

/// Split features and labels into train and test partitions.
pub fn train_test_split(
    features: &Table,
    labels: &[u8],
    params: &StratifiedSplit,
) -> Result<TrainTestSplit> {
    if features.n_rows() != labels.len() {
        return Err(ChurnError::Data(format!(
            "feature table has {} rows but there are {} labels",
            features.n_rows(),
            labels.len()
        )));
    }

    let indices = params.split(labels)?;

    let pick = |rows: &[usize]| rows.iter().map(|&r| labels[r]).collect::<Vec<u8>>();
    let split = TrainTestSplit {
        x_train: features.take_rows(&indices.train),
        x_test: features.take_rows(&indices.test),
        y_train: pick(&indices.train),
        y_test: pick(&indices.test),
    };

    info!(
        train_rows = split.y_train.len(),
        test_rows = split.y_test.len(),
        train_positive = split.y_train.iter().filter(|&&y| y == 1).count(),
        test_positive = split.y_test.iter().filter(|&&y| y == 1).count(),
        "stratified split"
    );

    Ok(split)
}
