//! Load loan books from CSV

use super::LoanTerms;
use crate::error::LoanBookError;
use crate::money::Money;
use chrono::DateTime;
use csv::Reader;
use std::path::Path;

/// Raw CSV row matching the loan book columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "LoanID")]
    loan_id: u32,
    /// Amount in cents
    #[serde(rename = "LoanAmount")]
    loan_amount: i64,
    #[serde(rename = "Duration")]
    duration: u32,
    #[serde(rename = "NominalRate")]
    nominal_rate: f64,
    #[serde(rename = "StartDate")]
    start_date: String,
}

impl CsvRow {
    fn to_terms(self) -> Result<LoanTerms, LoanBookError> {
        let loan_id = self.loan_id;
        let start_date = DateTime::parse_from_rfc3339(self.start_date.trim()).map_err(|source| {
            LoanBookError::StartDate {
                loan_id,
                value: self.start_date.clone(),
                source,
            }
        })?;

        let terms = LoanTerms::new(
            Money::from_cents(self.loan_amount),
            self.duration,
            self.nominal_rate,
            start_date,
        )
        .map_err(|source| LoanBookError::Row { loan_id, source })?;

        Ok(terms.with_loan_id(loan_id))
    }
}

/// Load all loans from a CSV file
pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<Vec<LoanTerms>, LoanBookError> {
    let reader = Reader::from_path(path)?;
    read_loans(reader)
}

/// Load loans from any reader (e.g., string buffer, network stream)
pub fn load_loans_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LoanTerms>, LoanBookError> {
    read_loans(Reader::from_reader(reader))
}

fn read_loans<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<LoanTerms>, LoanBookError> {
    let mut loans = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        loans.push(row.to_terms()?);
    }

    log::debug!("loaded {} loans from loan book", loans.len());
    Ok(loans)
}
