//! Loan data structures matching the loan sheet format

use serde::{Deserialize, Serialize};

/// Annual rates at or above this are read as percentages (4.5 = 4.5% APR)
pub const PERCENT_DETECTION_THRESHOLD: f64 = 1.0;

/// How annual rates in a loan set are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateFormat {
    /// Percentage points, e.g. 4.5 for 4.5% APR
    Percentage,
    /// Decimal fraction, e.g. 0.045 for 4.5% APR
    Decimal,
}

impl RateFormat {
    /// Detect the format of a whole rate set
    ///
    /// If *any* rate exceeds 1 every rate is read as a percentage. This is a
    /// per-set heuristic, not a per-row decision.
    pub fn detect(annual_rates: &[f64]) -> Self {
        if annual_rates.iter().any(|&r| r > PERCENT_DETECTION_THRESHOLD) {
            RateFormat::Percentage
        } else {
            RateFormat::Decimal
        }
    }

    /// Convert an annual rate in this format to a monthly decimal rate
    pub fn to_monthly(&self, annual_rate: f64) -> f64 {
        match self {
            RateFormat::Percentage => annual_rate / 100.0 / 12.0,
            RateFormat::Decimal => annual_rate / 12.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RateFormat::Percentage => "Percentage (e.g., 4.5)",
            RateFormat::Decimal => "Decimal (e.g., 0.045)",
        }
    }
}

/// A single row of the loan sheet, as supplied by a loader or API layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    /// Unique loan identifier
    #[serde(rename = "Loan Number", alias = "loan_number")]
    pub loan_number: u32,

    #[serde(rename = "Lender/Description", alias = "lender_description", default)]
    pub description: String,

    #[serde(rename = "Loan Type", alias = "loan_type", default)]
    pub loan_type: String,

    /// Original term in months (informational only)
    #[serde(rename = "Term (months)", alias = "term_months", default)]
    pub term_months: u32,

    /// Current principal balance
    #[serde(rename = "Principal Balance", alias = "principal_balance")]
    pub principal_balance: f64,

    /// Minimum monthly payment (principal + interest)
    #[serde(rename = "Minimum Monthly Payment", alias = "min_monthly_payment")]
    pub min_monthly_payment: f64,

    /// Annual interest rate, percentage or decimal (see [`RateFormat::detect`])
    #[serde(rename = "Annual Interest Rate (%)", alias = "annual_interest_rate")]
    pub annual_interest_rate: f64,
}

impl LoanRecord {
    /// Create a record with only the fields the engine consumes
    pub fn new(
        loan_number: u32,
        principal_balance: f64,
        min_monthly_payment: f64,
        annual_interest_rate: f64,
    ) -> Self {
        Self {
            loan_number,
            description: String::new(),
            loan_type: String::new(),
            term_months: 0,
            principal_balance,
            min_monthly_payment,
            annual_interest_rate,
        }
    }
}

/// A validated loan ready for simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    /// Unique, stable loan identifier
    pub loan_number: u32,

    /// Monthly interest rate as a decimal fraction
    pub monthly_rate: f64,

    /// Minimum monthly payment (principal + interest)
    pub min_payment: f64,

    /// Starting principal balance
    pub balance: f64,
}

impl Loan {
    pub fn new(loan_number: u32, monthly_rate: f64, min_payment: f64, balance: f64) -> Self {
        Self {
            loan_number,
            monthly_rate,
            min_payment,
            balance,
        }
    }

    /// Interest accrued on the starting balance for one month
    pub fn first_month_interest(&self) -> f64 {
        self.monthly_rate * self.balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rate_format_detection() {
        assert_eq!(RateFormat::detect(&[4.5, 5.2, 19.99]), RateFormat::Percentage);
        assert_eq!(RateFormat::detect(&[0.045, 0.052]), RateFormat::Decimal);
        // One percentage-looking value flips the whole set
        assert_eq!(RateFormat::detect(&[0.5, 4.5]), RateFormat::Percentage);
        // Exactly 1 is still decimal (100% APR)
        assert_eq!(RateFormat::detect(&[1.0, 0.2]), RateFormat::Decimal);
    }

    #[test]
    fn test_monthly_conversion() {
        assert_abs_diff_eq!(RateFormat::Percentage.to_monthly(12.0), 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(RateFormat::Decimal.to_monthly(0.12), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_record_deserializes_from_api_field_names() {
        let json = r#"{
            "loan_number": 3,
            "lender_description": "Credit Card",
            "loan_type": "Private",
            "term_months": 60,
            "principal_balance": 8000.0,
            "min_monthly_payment": 300.0,
            "annual_interest_rate": 19.99
        }"#;
        let record: LoanRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.loan_number, 3);
        assert_eq!(record.description, "Credit Card");
        assert_abs_diff_eq!(record.annual_interest_rate, 19.99);
    }
}
