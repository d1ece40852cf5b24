//! Load loan sheets from CSV

use super::data::LoanRecord;
use super::validate::{validate_records, ValidatedLoans};
use crate::error::LoadError;
use csv::{Reader, Trim};
use std::path::Path;

/// Raw CSV row matching the seven-column loan sheet
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Loan Number")]
    loan_number: u32,
    #[serde(rename = "Lender/Description")]
    description: String,
    #[serde(rename = "Loan Type")]
    loan_type: String,
    #[serde(rename = "Term (months)")]
    term_months: Option<u32>,
    #[serde(rename = "Principal Balance")]
    principal_balance: f64,
    #[serde(rename = "Minimum Monthly Payment")]
    min_monthly_payment: f64,
    #[serde(rename = "Annual Interest Rate (%)")]
    annual_interest_rate: f64,
}

impl CsvRow {
    fn to_record(self) -> LoanRecord {
        LoanRecord {
            loan_number: self.loan_number,
            description: self.description,
            loan_type: self.loan_type,
            term_months: self.term_months.unwrap_or(0),
            principal_balance: self.principal_balance,
            min_monthly_payment: self.min_monthly_payment,
            annual_interest_rate: self.annual_interest_rate,
        }
    }
}

/// Load raw loan records from a CSV file
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<LoanRecord>, LoadError> {
    let file = std::fs::File::open(path)?;
    load_records_from_reader(file)
}

/// Load raw loan records from any reader (e.g., string buffer, upload body)
pub fn load_records_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LoanRecord>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    read_rows(&mut csv_reader)
}

fn read_rows<R: std::io::Read>(reader: &mut Reader<R>) -> Result<Vec<LoanRecord>, LoadError> {
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        records.push(row.to_record());
    }
    Ok(records)
}

/// Load and validate a loan sheet in one step
pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<ValidatedLoans, LoadError> {
    let records = load_records(path)?;
    Ok(validate_records(&records)?)
}
