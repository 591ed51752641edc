//! Ledger entry (move) domain types.

use chrono::NaiveDate;
use rejournal_shared::types::{CompanyId, LedgerEntryId, LedgerId, LineId};
use serde::{Deserialize, Serialize};

use super::journal::LedgerKind;

/// Lifecycle state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    /// Entry is being drafted.
    Draft,
    /// Entry has been posted to the ledger.
    Posted,
    /// Entry has been cancelled.
    Cancelled,
}

/// Semantic type of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Miscellaneous journal entry.
    Misc,
    /// Customer invoice.
    CustomerInvoice,
    /// Customer credit note.
    CustomerRefund,
    /// Sales receipt.
    CustomerReceipt,
    /// Vendor bill.
    VendorBill,
    /// Vendor credit note.
    VendorRefund,
    /// Purchase receipt.
    VendorReceipt,
}

impl EntryType {
    /// Returns the type as its stored tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Misc => "misc",
            Self::CustomerInvoice => "customer_invoice",
            Self::CustomerRefund => "customer_refund",
            Self::CustomerReceipt => "customer_receipt",
            Self::VendorBill => "vendor_bill",
            Self::VendorRefund => "vendor_refund",
            Self::VendorReceipt => "vendor_receipt",
        }
    }

    /// Ledger kind this type of entry belongs on.
    ///
    /// `None` for miscellaneous entries, which may live on any ledger.
    #[must_use]
    pub const fn ledger_kind(&self) -> Option<LedgerKind> {
        match self {
            Self::CustomerInvoice | Self::CustomerRefund | Self::CustomerReceipt => {
                Some(LedgerKind::Sale)
            }
            Self::VendorBill | Self::VendorRefund | Self::VendorReceipt => {
                Some(LedgerKind::Purchase)
            }
            Self::Misc => None,
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line of an entry. Only its reconciliation status matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLine {
    /// Unique identifier.
    pub id: LineId,
    /// Whether the line is fully reconciled.
    #[serde(default)]
    pub reconciled: bool,
}

/// One accounting transaction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: LedgerEntryId,
    /// Owning ledger.
    pub ledger_id: LedgerId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Lifecycle state.
    pub state: EntryState,
    /// Semantic type.
    pub entry_type: EntryType,
    /// Accounting date.
    pub date: NaiveDate,
    /// Display number. Empty until the numbering collaborator assigns one.
    #[serde(default)]
    pub sequence_number: String,
    /// Set once the hash-chain seal has been applied.
    #[serde(default)]
    pub locked: bool,
    /// Lines of the entry.
    #[serde(default)]
    pub lines: Vec<EntryLine>,
}

impl LedgerEntry {
    /// Returns the number, or `/` while unnumbered.
    #[must_use]
    pub fn display_name(&self) -> &str {
        display_number(&self.sequence_number)
    }

    /// Returns true if posted and sealed by the hash chain.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.state == EntryState::Posted && self.locked
    }

    /// Returns true if any line has been reconciled.
    #[must_use]
    pub fn has_reconciled_lines(&self) -> bool {
        self.lines.iter().any(|line| line.reconciled)
    }
}

/// Renders a sequence number, using `/` for a blank one.
#[must_use]
pub fn display_number(number: &str) -> &str {
    if number.is_empty() { "/" } else { number }
}
