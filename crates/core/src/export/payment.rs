//! SEPA credit transfer initiation (pain.001.001.03).
//!
//! One batch per run: a single `PmtInf` debiting the organization account,
//! with one `CdtTrfTxInf` per claim paying the employee.

use chrono::{DateTime, SecondsFormat};
use chrono_tz::Tz;
use claimflow_shared::config::OrganizationConfig;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;

use super::booking::two_decimals;
use super::error::ExportError;
use crate::bank::resolve_bic;
use crate::expense::Expense;

const PAIN_NAMESPACE: &str = "urn:iso:std:iso:20022:tech:xsd:pain.001.001.03";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const CURRENCY: &str = "EUR";

/// One credit transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// End-to-end id and remittance text.
    pub reference: String,
    /// Amount paid.
    pub amount: Decimal,
    /// Creditor name, transliterated to ASCII.
    pub creditor_name: String,
    /// Creditor IBAN without whitespace.
    pub creditor_iban: String,
    /// Creditor bank BIC, or `NOTPROVIDED`.
    pub creditor_bic: &'static str,
}

impl Transfer {
    /// Builds the transfer paying out `expense`.
    #[must_use]
    pub fn new(expense: &Expense) -> Self {
        let record = &expense.employee.afas_data;
        Self {
            reference: expense.reference(),
            amount: expense.amount.round_dp(2),
            creditor_name: deunicode::deunicode(&record.display_name),
            creditor_iban: record.iban.split_whitespace().collect(),
            creditor_bic: resolve_bic(&record.iban),
        }
    }
}

/// A complete payment batch.
#[derive(Debug, Clone)]
pub struct PaymentBatch<'a> {
    /// `{prefix}/{run_id}`, used as message, payment info and instruction id.
    pub message_id: String,
    /// Run time in the organization's time zone.
    pub created: DateTime<Tz>,
    /// The paying organization.
    pub organization: &'a OrganizationConfig,
    /// Transfers in claim order.
    pub transfers: Vec<Transfer>,
}

impl PaymentBatch<'_> {
    /// Sum of all transfer amounts, each already at two decimals.
    #[must_use]
    pub fn control_sum(&self) -> Decimal {
        self.transfers.iter().map(|t| t.amount).sum()
    }

    /// Renders the pain.001 document.
    ///
    /// # Errors
    ///
    /// `ExportError::Render` if writing fails.
    pub fn render(&self) -> Result<Vec<u8>, ExportError> {
        let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
        let count = self.transfers.len().to_string();
        let control_sum = two_decimals(self.control_sum());
        let org = self.organization;

        emit(&mut w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut document = BytesStart::new("Document");
        document.push_attribute(("xmlns", PAIN_NAMESPACE));
        document.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
        emit(&mut w, Event::Start(document))?;
        open(&mut w, "CstmrCdtTrfInitn")?;

        open(&mut w, "GrpHdr")?;
        leaf(&mut w, "MsgId", &self.message_id)?;
        leaf(
            &mut w,
            "CreDtTm",
            &self.created.to_rfc3339_opts(SecondsFormat::Secs, false),
        )?;
        leaf(&mut w, "NbOfTxs", &count)?;
        leaf(&mut w, "CtrlSum", &control_sum)?;
        open(&mut w, "InitgPty")?;
        leaf(&mut w, "Nm", &org.company_name)?;
        close(&mut w, "InitgPty")?;
        close(&mut w, "GrpHdr")?;

        open(&mut w, "PmtInf")?;
        leaf(&mut w, "PmtInfId", &self.message_id)?;
        leaf(&mut w, "PmtMtd", "TRF")?;
        leaf(&mut w, "NbOfTxs", &count)?;
        leaf(&mut w, "CtrlSum", &control_sum)?;
        open(&mut w, "PmtTpInf")?;
        leaf(&mut w, "InstrPrty", "NORM")?;
        open(&mut w, "SvcLvl")?;
        leaf(&mut w, "Cd", "SEPA")?;
        close(&mut w, "SvcLvl")?;
        close(&mut w, "PmtTpInf")?;
        leaf(
            &mut w,
            "ReqdExctnDt",
            &self.created.date_naive().format("%Y-%m-%d").to_string(),
        )?;
        open(&mut w, "Dbtr")?;
        leaf(&mut w, "Nm", &org.company_name)?;
        close(&mut w, "Dbtr")?;
        account(&mut w, "DbtrAcct", &org.iban)?;
        agent(&mut w, "DbtrAgt", &org.bic)?;

        for transfer in &self.transfers {
            self.write_transfer(&mut w, transfer)?;
        }

        close(&mut w, "PmtInf")?;
        close(&mut w, "CstmrCdtTrfInitn")?;
        close(&mut w, "Document")?;
        Ok(w.into_inner())
    }

    fn write_transfer(
        &self,
        w: &mut Writer<Vec<u8>>,
        transfer: &Transfer,
    ) -> Result<(), ExportError> {
        open(w, "CdtTrfTxInf")?;
        open(w, "PmtId")?;
        leaf(w, "InstrId", &self.message_id)?;
        leaf(w, "EndToEndId", &transfer.reference)?;
        close(w, "PmtId")?;

        open(w, "Amt")?;
        let mut amount = BytesStart::new("InstdAmt");
        amount.push_attribute(("Ccy", CURRENCY));
        emit(w, Event::Start(amount))?;
        emit(w, Event::Text(BytesText::new(&two_decimals(transfer.amount))))?;
        close(w, "InstdAmt")?;
        close(w, "Amt")?;
        leaf(w, "ChrgBr", "SLEV")?;

        agent(w, "CdtrAgt", transfer.creditor_bic)?;
        open(w, "Cdtr")?;
        leaf(w, "Nm", &transfer.creditor_name)?;
        close(w, "Cdtr")?;
        account(w, "CdtrAcct", &transfer.creditor_iban)?;

        open(w, "RmtInf")?;
        leaf(w, "Ustrd", &transfer.reference)?;
        close(w, "RmtInf")?;
        close(w, "CdtTrfTxInf")
    }
}

// ============================================================================
// Writer helpers
// ============================================================================

fn emit(w: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), ExportError> {
    w.write_event(event)
        .map_err(|e| ExportError::Render(e.to_string()))
}

fn open(w: &mut Writer<Vec<u8>>, name: &str) -> Result<(), ExportError> {
    emit(w, Event::Start(BytesStart::new(name)))
}

fn close(w: &mut Writer<Vec<u8>>, name: &str) -> Result<(), ExportError> {
    emit(w, Event::End(BytesEnd::new(name)))
}

fn leaf(w: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), ExportError> {
    open(w, name)?;
    emit(w, Event::Text(BytesText::new(text)))?;
    close(w, name)
}

fn account(w: &mut Writer<Vec<u8>>, name: &str, iban: &str) -> Result<(), ExportError> {
    open(w, name)?;
    open(w, "Id")?;
    leaf(w, "IBAN", iban)?;
    close(w, "Id")?;
    close(w, name)
}

fn agent(w: &mut Writer<Vec<u8>>, name: &str, bic: &str) -> Result<(), ExportError> {
    open(w, name)?;
    open(w, "FinInstnId")?;
    leaf(w, "BIC", bic)?;
    close(w, "FinInstnId")?;
    close(w, name)
}
