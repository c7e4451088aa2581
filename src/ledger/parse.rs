use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use super::{Expense, LedgerStore};

/// One row of the bank export. Charges carry a negative `Amount`;
/// everything else (payments, credits) is skipped.
#[derive(Clone, Debug, Deserialize)]
struct RawRecord {
    #[serde(default, rename = "Amount")]
    amount: f64,
    #[serde(default, rename = "Description")]
    description: String,
    #[serde(default, rename = "Trans Date")]
    trans_date: String,
}

fn parse_trans_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

fn parse_records(raw: &str) -> Result<Vec<Expense>> {
    let records: Vec<RawRecord> =
        serde_json::from_str(raw).context("invalid JSON in ledger file")?;

    let mut expenses = Vec::with_capacity(records.len());
    for record in records {
        if !record.amount.is_finite() || record.amount >= 0.0 {
            continue;
        }
        let Some(date) = parse_trans_date(&record.trans_date) else {
            continue;
        };
        expenses.push(Expense {
            id: expenses.len(),
            amount: (-record.amount) as f32,
            name: record.description,
            date,
            category_count: 0,
        });
    }
    Ok(expenses)
}

pub fn load_ledger(path: &Path) -> Result<LedgerStore> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading ledger file {}", path.display()))?;
    let expenses = parse_records(&raw)?;
    Ok(LedgerStore::new(expenses))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"Trans Date": "01/09/2017", "Description": "COFFEE SHOP", "Amount": -4.5},
        {"Trans Date": "2017-01-10", "Description": "GROCERIES", "Amount": -82.13},
        {"Trans Date": "01/11/2017", "Description": "PAYMENT RECEIVED", "Amount": 250.0},
        {"Trans Date": "not a date", "Description": "MYSTERY", "Amount": -1.0}
    ]"#;

    #[test]
    fn keeps_only_negative_amount_rows_with_valid_dates() {
        let expenses = parse_records(SAMPLE).unwrap();
        assert_eq!(expenses.len(), 2);

        assert_eq!(expenses[0].name, "COFFEE SHOP");
        assert!((expenses[0].amount - 4.5).abs() < 1e-6);
        assert_eq!(
            expenses[0].date,
            NaiveDate::from_ymd_opt(2017, 1, 9).unwrap()
        );

        // Ids are dense and assigned in input order.
        assert_eq!(expenses[1].id, 1);
        assert_eq!(
            expenses[1].date,
            NaiveDate::from_ymd_opt(2017, 1, 10).unwrap()
        );
    }

    #[test]
    fn empty_array_parses_to_an_empty_ledger() {
        assert!(parse_records("[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_records("{").is_err());
    }
}
