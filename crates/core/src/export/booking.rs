//! Ledger booking file.
//!
//! One semicolon separated row per claim with comma decimals, booking the
//! claim amount from the clearing account to the cost type's ledger
//! account.

use chrono::DateTime;
use chrono_tz::Tz;
use claimflow_shared::config::BookingConstants;
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::ExportError;
use crate::expense::Expense;

/// Booking side, always credit.
const CREDIT: &str = "C";
/// VAT is never booked.
const ZERO_VAT: &str = "0,00";
const ZERO_3: &str = "000";
const ZERO_2: &str = "00";

/// One row of the booking file. Field order is column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRow {
    /// Shared with the payment remittance.
    #[serde(rename = "BoekingsomschrijvingBron")]
    pub reference: String,
    #[serde(rename = "Document-datum")]
    document_date: String,
    #[serde(rename = "Boekings-jaar")]
    booking_year: String,
    #[serde(rename = "Periode")]
    period: String,
    #[serde(rename = "Bron-bedrijfs-nummer")]
    source_company_number: String,
    #[serde(rename = "Bron gr boekrek")]
    source_ledger_account: String,
    #[serde(rename = "Bron Org Code")]
    source_org_code: String,
    #[serde(rename = "Bron Process")]
    source_process: &'static str,
    #[serde(rename = "Bron Produkt")]
    source_product: &'static str,
    #[serde(rename = "Bron EC")]
    source_ec: &'static str,
    #[serde(rename = "Bron VP")]
    source_vp: &'static str,
    #[serde(rename = "Doel-bedrijfs-nummer")]
    target_company_number: String,
    /// Ledger account of the cost type.
    #[serde(rename = "Doel-gr boekrek")]
    pub target_ledger_account: String,
    #[serde(rename = "Doel Org code")]
    target_org_code: String,
    #[serde(rename = "Doel Proces")]
    target_process: &'static str,
    #[serde(rename = "Doel Produkt")]
    target_product: &'static str,
    #[serde(rename = "Doel EC")]
    target_ec: &'static str,
    #[serde(rename = "Doel VP")]
    target_vp: &'static str,
    #[serde(rename = "D/C")]
    debit_credit: &'static str,
    /// Claim amount, comma decimal.
    #[serde(rename = "Bedrag excl. BTW")]
    pub amount: String,
    #[serde(rename = "BTW-Bedrag")]
    vat: &'static str,
}

impl BookingRow {
    /// Builds the row booking `expense` onto `ledger_account`, dated by the
    /// run's local time.
    #[must_use]
    pub fn new(
        expense: &Expense,
        ledger_account: String,
        run_local: &DateTime<Tz>,
        constants: &BookingConstants,
    ) -> Self {
        Self {
            reference: expense.reference(),
            document_date: run_local.format("%d%m%Y").to_string(),
            booking_year: run_local.format("%Y").to_string(),
            period: run_local.format("%m").to_string(),
            source_company_number: constants.source_company_number.clone(),
            source_ledger_account: constants.source_ledger_account.clone(),
            source_org_code: constants.source_org_code.clone(),
            source_process: ZERO_3,
            source_product: ZERO_3,
            source_ec: ZERO_3,
            source_vp: ZERO_2,
            target_company_number: constants.target_company_number.clone(),
            target_ledger_account: ledger_account,
            target_org_code: constants.target_org_code.clone(),
            target_process: ZERO_3,
            target_product: ZERO_3,
            target_ec: ZERO_3,
            target_vp: ZERO_2,
            debit_credit: CREDIT,
            amount: comma_decimal(expense.amount),
            vat: ZERO_VAT,
        }
    }
}

/// Formats an amount with two decimals and a decimal comma.
#[must_use]
pub fn comma_decimal(amount: Decimal) -> String {
    two_decimals(amount).replace('.', ",")
}

/// Formats an amount with exactly two decimals.
#[must_use]
pub fn two_decimals(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded.to_string()
}

/// Renders the booking file with its header row.
///
/// # Errors
///
/// `ExportError::Render` if the CSV writer fails.
pub fn render_booking_file(rows: &[BookingRow]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| ExportError::Render(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Render(e.to_string()))
}
