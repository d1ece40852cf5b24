//! Input validation and rate conversion for loan records
//!
//! Nothing is simulated unless every record passes; warnings are advisory.

use std::collections::HashSet;
use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use super::data::{Loan, LoanRecord, RateFormat};
use crate::error::EngineError;

/// Upper bound on annual rates, in percentage points
pub const MAX_ANNUAL_RATE: f64 = 100.0;

/// Upper bound on monthly decimal rates, matching `MAX_ANNUAL_RATE`
pub const MAX_MONTHLY_RATE: f64 = MAX_ANNUAL_RATE / 100.0 / 12.0;

/// Monthly rates outside this band are flagged but accepted
pub const MIN_PLAUSIBLE_MONTHLY_RATE: f64 = 0.00001;
pub const MAX_PLAUSIBLE_MONTHLY_RATE: f64 = 0.05;

/// Non-fatal observations about a loan set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationWarning {
    /// Percentage format was detected but some rates look like decimals
    MixedRateRegimes { loan_numbers: Vec<u32> },
    /// Converted monthly rate falls outside the plausible band
    UnusualMonthlyRate { loan_number: u32, monthly_rate: f64 },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::MixedRateRegimes { loan_numbers } => write!(
                f,
                "rates read as percentages, but loans {:?} have rates <= 1 that may be decimals",
                loan_numbers
            ),
            ValidationWarning::UnusualMonthlyRate {
                loan_number,
                monthly_rate,
            } => write!(
                f,
                "loan {} has unusual monthly rate {:.6}",
                loan_number, monthly_rate
            ),
        }
    }
}

/// Loans that passed validation, in input order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedLoans {
    pub loans: Vec<Loan>,
    pub rate_format: RateFormat,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidatedLoans {
    pub fn total_balance(&self) -> f64 {
        self.loans.iter().map(|l| l.balance).sum()
    }
}

/// Validate records and convert annual rates to monthly decimals
pub fn validate_records(records: &[LoanRecord]) -> Result<ValidatedLoans, EngineError> {
    if records.is_empty() {
        return Err(EngineError::invalid("(none)", "no loans supplied"));
    }

    for record in records {
        check_annual_rate(record)?;
    }

    let annual_rates: Vec<f64> = records.iter().map(|r| r.annual_interest_rate).collect();
    let rate_format = RateFormat::detect(&annual_rates);

    let mut warnings = Vec::new();

    if rate_format == RateFormat::Percentage {
        let suspicious: Vec<u32> = records
            .iter()
            .filter(|r| r.annual_interest_rate > 0.0 && r.annual_interest_rate <= 1.0)
            .map(|r| r.loan_number)
            .collect();
        if !suspicious.is_empty() {
            warnings.push(ValidationWarning::MixedRateRegimes {
                loan_numbers: suspicious,
            });
        }
    }

    let loans: Vec<Loan> = records
        .iter()
        .map(|r| {
            Loan::new(
                r.loan_number,
                rate_format.to_monthly(r.annual_interest_rate),
                r.min_monthly_payment,
                r.principal_balance,
            )
        })
        .collect();
    validate_loans(&loans)?;

    for loan in &loans {
        if loan.monthly_rate < MIN_PLAUSIBLE_MONTHLY_RATE
            || loan.monthly_rate > MAX_PLAUSIBLE_MONTHLY_RATE
        {
            warnings.push(ValidationWarning::UnusualMonthlyRate {
                loan_number: loan.loan_number,
                monthly_rate: loan.monthly_rate,
            });
        }
    }

    for w in &warnings {
        warn!("{}", w);
    }

    Ok(ValidatedLoans {
        loans,
        rate_format,
        warnings,
    })
}

/// Check engine-ready loans: non-empty, unique ids, finite amounts,
/// positive balances, non-negative minimums and monthly rates in range
///
/// Every public entry point runs this before the first simulated month.
pub fn validate_loans(loans: &[Loan]) -> Result<(), EngineError> {
    if loans.is_empty() {
        return Err(EngineError::invalid("(none)", "no loans supplied"));
    }

    let mut seen = HashSet::new();
    for loan in loans {
        check_loan(loan)?;
        if !seen.insert(loan.loan_number) {
            return Err(EngineError::invalid(loan.loan_number, "duplicate loan number"));
        }
    }
    Ok(())
}

fn check_loan(loan: &Loan) -> Result<(), EngineError> {
    let id = loan.loan_number;
    let fields = [
        ("principal balance", loan.balance),
        ("minimum payment", loan.min_payment),
        ("interest rate", loan.monthly_rate),
    ];
    for (name, value) in fields {
        if !value.is_finite() {
            return Err(EngineError::invalid(id, format!("{} is not a number", name)));
        }
    }

    if loan.balance <= 0.0 {
        return Err(EngineError::invalid(id, "principal balance must be positive"));
    }
    if loan.min_payment < 0.0 {
        return Err(EngineError::invalid(id, "minimum payment cannot be negative"));
    }
    if loan.monthly_rate < 0.0 || loan.monthly_rate > MAX_MONTHLY_RATE {
        return Err(EngineError::invalid(
            id,
            format!(
                "monthly rate {} outside [0, {:.6}]",
                loan.monthly_rate, MAX_MONTHLY_RATE
            ),
        ));
    }
    Ok(())
}

fn check_annual_rate(record: &LoanRecord) -> Result<(), EngineError> {
    let rate = record.annual_interest_rate;
    if !rate.is_finite() {
        return Err(EngineError::invalid(record.loan_number, "interest rate is not a number"));
    }
    if !(0.0..=MAX_ANNUAL_RATE).contains(&rate) {
        return Err(EngineError::invalid(
            record.loan_number,
            format!("interest rate {} outside [0, {}]", rate, MAX_ANNUAL_RATE),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_percentage_set_converts() {
        let records = vec![
            LoanRecord::new(1, 10_000.0, 200.0, 6.0),
            LoanRecord::new(2, 2_500.0, 75.0, 18.0),
        ];
        let validated = validate_records(&records).unwrap();
        assert_eq!(validated.rate_format, RateFormat::Percentage);
        assert_abs_diff_eq!(validated.loans[0].monthly_rate, 0.005, epsilon = 1e-12);
        assert_abs_diff_eq!(validated.loans[1].monthly_rate, 0.015, epsilon = 1e-12);
        assert!(validated.warnings.is_empty());
        assert_abs_diff_eq!(validated.total_balance(), 12_500.0);
    }

    #[test]
    fn test_mixed_regimes_warn_but_pass() {
        let records = vec![
            LoanRecord::new(1, 10_000.0, 200.0, 0.5),
            LoanRecord::new(2, 2_500.0, 75.0, 4.5),
        ];
        let validated = validate_records(&records).unwrap();
        assert_eq!(validated.rate_format, RateFormat::Percentage);
        assert!(validated
            .warnings
            .contains(&ValidationWarning::MixedRateRegimes { loan_numbers: vec![1] }));
    }

    #[test]
    fn test_zero_rate_flagged_as_unusual() {
        let records = vec![LoanRecord::new(4, 1_000.0, 50.0, 0.0)];
        let validated = validate_records(&records).unwrap();
        assert_eq!(validated.rate_format, RateFormat::Decimal);
        assert_eq!(
            validated.warnings,
            vec![ValidationWarning::UnusualMonthlyRate {
                loan_number: 4,
                monthly_rate: 0.0
            }]
        );
    }

    #[test]
    fn test_rejections() {
        let bad_balance = vec![LoanRecord::new(1, 0.0, 10.0, 5.0)];
        assert!(matches!(
            validate_records(&bad_balance),
            Err(EngineError::InvalidInput { .. })
        ));

        let bad_rate = vec![LoanRecord::new(1, 100.0, 10.0, 150.0)];
        assert!(validate_records(&bad_rate).is_err());

        let negative_min = vec![LoanRecord::new(1, 100.0, -1.0, 5.0)];
        assert!(validate_records(&negative_min).is_err());

        let nan = vec![LoanRecord::new(1, f64::NAN, 10.0, 5.0)];
        assert!(validate_records(&nan).is_err());

        let dup = vec![
            LoanRecord::new(1, 100.0, 10.0, 5.0),
            LoanRecord::new(1, 200.0, 10.0, 5.0),
        ];
        let err = validate_records(&dup).unwrap_err();
        assert!(err.to_string().contains("duplicate"));

        assert!(validate_records(&[]).is_err());
    }

    #[test]
    fn test_validate_loans_rejects_each_bad_field() {
        let ok = Loan::new(1, 0.01, 50.0, 1_000.0);
        assert!(validate_loans(&[ok]).is_ok());

        let cases = [
            (Loan::new(1, 0.01, 50.0, -500.0), "positive"),
            (Loan::new(1, 0.01, 50.0, 0.0), "positive"),
            (Loan::new(1, 0.01, 50.0, f64::NAN), "not a number"),
            (Loan::new(1, 0.01, -5.0, 1_000.0), "negative"),
            (Loan::new(1, f64::INFINITY, 50.0, 1_000.0), "not a number"),
            (Loan::new(1, -0.01, 50.0, 1_000.0), "outside"),
            (Loan::new(1, 0.5, 50.0, 1_000.0), "outside"),
        ];
        for (loan, reason) in cases {
            match validate_loans(&[loan]) {
                Err(EngineError::InvalidInput { reason: got, .. }) => {
                    assert!(got.contains(reason), "{:?}: {}", loan, got)
                }
                other => panic!("{:?} accepted: {:?}", loan, other),
            }
        }
    }

    #[test]
    fn test_validate_loans_rejects_duplicates_and_empty() {
        let dup = [
            Loan::new(1, 0.01, 50.0, 1_000.0),
            Loan::new(1, 0.02, 25.0, 500.0),
        ];
        let err = validate_loans(&dup).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
        assert!(validate_loans(&[]).is_err());
    }
}
