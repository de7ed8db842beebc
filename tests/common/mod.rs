//! Synthetic churn data shared by the integration tests.

#![allow(dead_code)]

use churnsense::dataset::{read_csv, Table};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::path::Path;

/// One synthetic customer.
#[derive(Clone, Debug)]
pub struct Customer {
    pub id: String,
    pub tenure: Option<f64>,
    pub monthly_charges: Option<f64>,
    pub contract: String,
    pub partner: bool,
    pub churn_score: f64,
    pub churned: bool,
}

/// `n` customers, exactly 30% churned, about 5% missing numeric cells.
pub fn customers(n: usize, seed: u64) -> Vec<Customer> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let churned = i % 10 < 3;
            let tenure = if churned {
                rng.gen_range(0.0..30.0)
            } else {
                rng.gen_range(10.0..72.0)
            };
            let charges = if churned {
                rng.gen_range(55.0..115.0)
            } else {
                rng.gen_range(20.0..95.0)
            };
            let contract = if churned && rng.gen_bool(0.7) {
                "Month-to-month"
            } else {
                ["Month-to-month", "One year", "Two year"][rng.gen_range(0..3)]
            };
            Customer {
                id: format!("C{:05}", i),
                tenure: (!rng.gen_bool(0.05)).then_some(tenure),
                monthly_charges: (!rng.gen_bool(0.05)).then_some(charges),
                contract: contract.to_string(),
                partner: rng.gen_bool(0.5),
                churn_score: (if churned { 70.0 } else { 20.0 }) + rng.gen_range(0.0..25.0),
                churned,
            }
        })
        .collect()
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.3}", v)).unwrap_or_default()
}

/// CSV text with a `label_column` holding `Yes`/`No`.
pub fn to_csv(customers: &[Customer], label_column: &str) -> String {
    let mut out = format!(
        "CustomerID,tenure,MonthlyCharges,Contract,Partner,ChurnScore,{}\n",
        label_column
    );
    for c in customers {
        out.push_str(&format!(
            "{},{},{},{},{},{:.2},{}\n",
            c.id,
            cell(c.tenure),
            cell(c.monthly_charges),
            c.contract,
            if c.partner { "True" } else { "False" },
            c.churn_score,
            if c.churned { "Yes" } else { "No" },
        ));
    }
    out
}

pub fn to_table(customers: &[Customer]) -> Table {
    read_csv(to_csv(customers, "ChurnLabel").as_bytes(), Path::new("synthetic.csv")).unwrap()
}

/// Write `csv` to `<root>/data/raw/churn.csv`.
pub fn write_dataset(root: &Path, csv: &str) {
    let dir = root.join("data").join("raw");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("churn.csv"), csv).unwrap();
}
