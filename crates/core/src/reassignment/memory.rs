//! In-memory books implementing every collaborator port.
//!
//! Backs the command line tool and the engine tests. Single-threaded, like the
//! engine itself.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use chrono::{DateTime, Datelike, Utc};
use rejournal_shared::types::{CompanyId, LedgerEntryId, LedgerId, PaymentId};
use serde::{Deserialize, Serialize};

use super::error::StoreError;
use super::ports::{
    EntryChanges, EntryStore, LedgerDirectory, PaymentChanges, PaymentStore, ReceiptbookDirectory,
};
use crate::books::{Company, CounterpartyType, Ledger, LedgerEntry, PaymentRecord, Receiptbook};

/// Serializable content of a set of books.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BooksSnapshot {
    /// Companies.
    #[serde(default)]
    pub companies: Vec<Company>,
    /// Ledgers with their bindings.
    #[serde(default)]
    pub ledgers: Vec<Ledger>,
    /// Ledger entries.
    #[serde(default)]
    pub entries: Vec<LedgerEntry>,
    /// Payments.
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
    /// Receiptbooks.
    #[serde(default)]
    pub receiptbooks: Vec<Receiptbook>,
}

/// Record an audit note is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum AuditTarget {
    /// A ledger entry.
    Entry(LedgerEntryId),
    /// A payment.
    Payment(PaymentId),
}

/// A note appended to a record's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditNote {
    /// Annotated record.
    pub target: AuditTarget,
    /// Note text.
    pub body: String,
    /// When the note was posted.
    pub posted_at: DateTime<Utc>,
}

/// Books held in memory.
#[derive(Debug, Default)]
pub struct MemoryBooks {
    companies: Vec<Company>,
    ledgers: Vec<Ledger>,
    receiptbooks: Vec<Receiptbook>,
    entries: RefCell<Vec<LedgerEntry>>,
    payments: RefCell<Vec<PaymentRecord>>,
    audit: RefCell<Vec<AuditNote>>,
    writes: Cell<usize>,
    payment_sync: bool,
    failing_entries: HashSet<LedgerEntryId>,
    failing_payments: HashSet<PaymentId>,
}

impl MemoryBooks {
    /// Loads books from a snapshot.
    #[must_use]
    pub fn new(snapshot: BooksSnapshot) -> Self {
        Self {
            companies: snapshot.companies,
            ledgers: snapshot.ledgers,
            receiptbooks: snapshot.receiptbooks,
            entries: RefCell::new(snapshot.entries),
            payments: RefCell::new(snapshot.payments),
            ..Self::default()
        }
    }

    /// Simulates the payment synchronization hook on entry writes.
    ///
    /// With the hook on, writing an entry whose payment sits on another ledger
    /// pulls the entry back onto the payment's ledger. This breaks the
    /// `EntryStore::update` contract on purpose: it reproduces a store whose
    /// entry writes still synchronize, so that payment-first ordering can be
    /// checked. An entry whose payment could not be moved is then reported as
    /// changed while it stays on the payment's ledger.
    #[must_use]
    pub fn with_payment_sync(mut self) -> Self {
        self.payment_sync = true;
        self
    }

    /// Makes every write to `id` fail with a conflict.
    #[must_use]
    pub fn failing_entry(mut self, id: LedgerEntryId) -> Self {
        self.failing_entries.insert(id);
        self
    }

    /// Makes every write to `id` fail with a conflict.
    #[must_use]
    pub fn failing_payment(mut self, id: PaymentId) -> Self {
        self.failing_payments.insert(id);
        self
    }

    /// Current state of an entry.
    #[must_use]
    pub fn entry(&self, id: LedgerEntryId) -> Option<LedgerEntry> {
        self.entries.borrow().iter().find(|e| e.id == id).cloned()
    }

    /// Current state of a payment.
    #[must_use]
    pub fn payment(&self, id: PaymentId) -> Option<PaymentRecord> {
        self.payments.borrow().iter().find(|p| p.id == id).cloned()
    }

    /// Audit notes posted on `target`, oldest first.
    #[must_use]
    pub fn notes_for(&self, target: AuditTarget) -> Vec<String> {
        self.audit
            .borrow()
            .iter()
            .filter(|note| note.target == target)
            .map(|note| note.body.clone())
            .collect()
    }

    /// Every audit note, oldest first.
    #[must_use]
    pub fn audit_trail(&self) -> Vec<AuditNote> {
        self.audit.borrow().clone()
    }

    /// Number of writes performed so far (updates and notes).
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Current content as a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> BooksSnapshot {
        BooksSnapshot {
            companies: self.companies.clone(),
            ledgers: self.ledgers.clone(),
            entries: self.entries.borrow().clone(),
            payments: self.payments.borrow().clone(),
            receiptbooks: self.receiptbooks.clone(),
        }
    }

    fn record_write(&self) {
        self.writes.set(self.writes.get() + 1);
    }

    fn post_note(&self, target: AuditTarget, body: &str) {
        self.record_write();
        self.audit.borrow_mut().push(AuditNote {
            target,
            body: body.to_string(),
            posted_at: Utc::now(),
        });
    }

    fn next_number(&self, ledger_id: LedgerId, year: i32) -> Result<String, StoreError> {
        let ledger = self
            .ledgers
            .iter()
            .find(|l| l.id == ledger_id)
            .ok_or_else(|| StoreError::Backend(format!("Ledger not found: {ledger_id}")))?;
        let prefix = format!("{}/{year}/", ledger.code);
        let last = self
            .entries
            .borrow()
            .iter()
            .filter_map(|e| e.sequence_number.strip_prefix(&prefix)?.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        let next = last
            .checked_add(1)
            .ok_or_else(|| StoreError::Backend(format!("Sequence exhausted for {prefix}")))?;
        Ok(format!("{prefix}{next:04}"))
    }
}

impl EntryStore for MemoryBooks {
    fn find_by_ids(&self, ids: &[LedgerEntryId]) -> Result<Vec<LedgerEntry>, StoreError> {
        ids.iter()
            .map(|id| self.entry(*id).ok_or(StoreError::EntryNotFound(*id)))
            .collect()
    }

    fn update(&self, id: LedgerEntryId, changes: &EntryChanges) -> Result<(), StoreError> {
        if self.failing_entries.contains(&id) {
            return Err(StoreError::Conflict(format!(
                "ledger entry {id} is being edited by another transaction"
            )));
        }

        let synced_ledger = self
            .payment_sync
            .then(|| {
                self.payments
                    .borrow()
                    .iter()
                    .find(|p| p.entry_id == id)
                    .map(|p| p.ledger_id)
            })
            .flatten();

        let mut entries = self.entries.borrow_mut();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::EntryNotFound(id))?;

        entry.ledger_id = synced_ledger.unwrap_or(changes.ledger_id);
        if let Some(number) = &changes.sequence_number {
            entry.sequence_number.clone_from(number);
        }
        drop(entries);

        self.record_write();
        Ok(())
    }

    fn recompute_display_number(&self, id: LedgerEntryId) -> Result<String, StoreError> {
        let entry = self.entry(id).ok_or(StoreError::EntryNotFound(id))?;
        if !entry.sequence_number.is_empty() {
            return Ok(entry.sequence_number);
        }

        let number = self.next_number(entry.ledger_id, entry.date.year())?;
        if let Some(stored) = self.entries.borrow_mut().iter_mut().find(|e| e.id == id) {
            stored.sequence_number.clone_from(&number);
        }
        self.record_write();
        Ok(number)
    }

    fn append_audit_note(&self, id: LedgerEntryId, body: &str) -> Result<(), StoreError> {
        if self.entry(id).is_none() {
            return Err(StoreError::EntryNotFound(id));
        }
        self.post_note(AuditTarget::Entry(id), body);
        Ok(())
    }
}

impl PaymentStore for MemoryBooks {
    fn find_by_entries(
        &self,
        entry_ids: &[LedgerEntryId],
    ) -> Result<Vec<PaymentRecord>, StoreError> {
        Ok(self
            .payments
            .borrow()
            .iter()
            .filter(|p| entry_ids.contains(&p.entry_id))
            .cloned()
            .collect())
    }

    fn update_direct(&self, id: PaymentId, changes: &PaymentChanges) -> Result<(), StoreError> {
        if self.failing_payments.contains(&id) {
            return Err(StoreError::Conflict(format!(
                "payment {id} is being edited by another transaction"
            )));
        }

        let mut payments = self.payments.borrow_mut();
        let payment = payments
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::PaymentNotFound(id))?;

        payment.ledger_id = changes.ledger_id;
        payment.method_binding_id = Some(changes.method_binding_id);
        payment.method_code = Some(changes.method_code.clone());
        payment.outstanding_account_id = Some(changes.outstanding_account_id);
        payment.is_reconciled = changes.is_reconciled;
        if let Some(receiptbook_id) = changes.receiptbook_id {
            payment.receiptbook_id = Some(receiptbook_id);
        }
        drop(payments);

        self.record_write();
        Ok(())
    }

    fn append_audit_note(&self, id: PaymentId, body: &str) -> Result<(), StoreError> {
        if self.payment(id).is_none() {
            return Err(StoreError::PaymentNotFound(id));
        }
        self.post_note(AuditTarget::Payment(id), body);
        Ok(())
    }
}

impl LedgerDirectory for MemoryBooks {
    fn ledger(&self, id: LedgerId) -> Result<Option<Ledger>, StoreError> {
        Ok(self.ledgers.iter().find(|l| l.id == id).cloned())
    }

    fn company(&self, id: CompanyId) -> Result<Option<Company>, StoreError> {
        Ok(self.companies.iter().find(|c| c.id == id).cloned())
    }
}

impl ReceiptbookDirectory for MemoryBooks {
    fn find_receiptbook(
        &self,
        counterparty_type: CounterpartyType,
        company_id: CompanyId,
    ) -> Result<Option<Receiptbook>, StoreError> {
        Ok(self
            .receiptbooks
            .iter()
            .filter(|b| {
                b.active && b.company_id == company_id && b.counterparty_type == counterparty_type
            })
            .min_by_key(|b| b.sequence)
            .cloned())
    }
}
