//! Collaborator interfaces the engine reads from and writes through.
//!
//! Implementations own persistence. The engine never touches storage directly,
//! which keeps validation and analysis testable without a mutable store.

use rejournal_shared::types::{
    AccountId, CompanyId, LedgerEntryId, LedgerId, PaymentId, PaymentMethodBindingId,
    ReceiptbookId,
};

use super::error::StoreError;
use crate::books::{Company, CounterpartyType, Ledger, LedgerEntry, PaymentRecord, Receiptbook};

/// Fields rewritten on a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryChanges {
    /// New owning ledger.
    pub ledger_id: LedgerId,
    /// New display number. `Some("")` clears it; `None` leaves it alone.
    pub sequence_number: Option<String>,
}

/// Fields rewritten on a payment moving to another ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentChanges {
    /// New owning ledger.
    pub ledger_id: LedgerId,
    /// Binding selected on the new ledger.
    pub method_binding_id: PaymentMethodBindingId,
    /// Code of the selected binding.
    pub method_code: String,
    /// Outstanding account from the binding or the company default.
    pub outstanding_account_id: AccountId,
    /// Reconciliation flag after the move. Always false.
    pub is_reconciled: bool,
    /// New receiptbook; `None` keeps the current one.
    pub receiptbook_id: Option<ReceiptbookId>,
}

/// Ledger entry store.
#[cfg_attr(test, mockall::automock)]
pub trait EntryStore {
    /// Loads entries in the order of `ids`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::EntryNotFound` for an unknown id.
    fn find_by_ids(&self, ids: &[LedgerEntryId]) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Writes `changes` without running invoice/payment synchronization.
    fn update(&self, id: LedgerEntryId, changes: &EntryChanges) -> Result<(), StoreError>;

    /// Asks the numbering collaborator for a fresh number and returns it.
    fn recompute_display_number(&self, id: LedgerEntryId) -> Result<String, StoreError>;

    /// Appends a note to the entry's audit trail.
    fn append_audit_note(&self, id: LedgerEntryId, body: &str) -> Result<(), StoreError>;
}

/// Payment store.
#[cfg_attr(test, mockall::automock)]
pub trait PaymentStore {
    /// Payments linked to any of `entry_ids`.
    fn find_by_entries(&self, entry_ids: &[LedgerEntryId])
    -> Result<Vec<PaymentRecord>, StoreError>;

    /// Low-level payment write that skips the payment's synchronization with its entry.
    ///
    /// ORDERING-SENSITIVE. A regular payment write pushes the payment's ledger onto its
    /// entry and vice versa. The engine moves payments first through this method and only
    /// then moves their entries; routing payment moves through a synchronizing write would
    /// let the entry revert to the payment's old ledger. Do not use this for anything but
    /// ledger reassignment.
    fn update_direct(&self, id: PaymentId, changes: &PaymentChanges) -> Result<(), StoreError>;

    /// Appends a note to the payment's audit trail.
    fn append_audit_note(&self, id: PaymentId, body: &str) -> Result<(), StoreError>;
}

/// Ledger and company lookups.
#[cfg_attr(test, mockall::automock)]
pub trait LedgerDirectory {
    /// Ledger with its payment method bindings.
    fn ledger(&self, id: LedgerId) -> Result<Option<Ledger>, StoreError>;

    /// Company with its default outstanding accounts.
    fn company(&self, id: CompanyId) -> Result<Option<Company>, StoreError>;
}

/// Receiptbook lookups.
#[cfg_attr(test, mockall::automock)]
pub trait ReceiptbookDirectory {
    /// Preferred active receiptbook for a counterparty type within a company.
    fn find_receiptbook(
        &self,
        counterparty_type: CounterpartyType,
        company_id: CompanyId,
    ) -> Result<Option<Receiptbook>, StoreError>;
}
