//! Journal change orchestration.
//!
//! Loads a batch through the store ports, runs the pure checks, then rewrites
//! payments and entries one record at a time. Records that fail are reported
//! and skipped; records already written stay written.

use std::collections::{HashMap, HashSet};

use rejournal_shared::types::{CompanyId, LedgerEntryId, LedgerId, ReceiptbookId};
use tracing::{debug, info, warn};

use super::error::{ChangeJournalError, RecordMutationError, StoreError};
use super::ports::{
    EntryChanges, EntryStore, LedgerDirectory, PaymentChanges, PaymentStore, ReceiptbookDirectory,
};
use super::resolver::CompatibilityResolver;
use super::risk::RiskAnalyzer;
use super::types::{
    BatchContext, BatchResult, ChangeJournalRequest, Outcome, RecordKind, ReassignmentRequest,
    Warning,
};
use super::validation::validate;
use crate::books::{EntryState, Ledger, LedgerEntry, PaymentRecord, display_number};

/// Moves ledger entries, and the payments linked to them, to another ledger.
pub struct JournalChangeService<'a, E, P, L, R> {
    entries: &'a E,
    payments: &'a P,
    ledgers: &'a L,
    receiptbooks: &'a R,
}

impl<'a, B> JournalChangeService<'a, B, B, B, B>
where
    B: EntryStore + PaymentStore + LedgerDirectory + ReceiptbookDirectory,
{
    /// Builds a service over a single backend implementing every port.
    #[must_use]
    pub fn over(books: &'a B) -> Self {
        Self::new(books, books, books, books)
    }
}

impl<'a, E, P, L, R> JournalChangeService<'a, E, P, L, R>
where
    E: EntryStore,
    P: PaymentStore,
    L: LedgerDirectory,
    R: ReceiptbookDirectory,
{
    /// Creates a new service.
    #[must_use]
    pub fn new(entries: &'a E, payments: &'a P, ledgers: &'a L, receiptbooks: &'a R) -> Self {
        Self {
            entries,
            payments,
            ledgers,
            receiptbooks,
        }
    }

    /// Loads everything a batch needs into a self-contained request.
    ///
    /// An unknown destination id loads as "no destination". A repeated entry id
    /// is loaded once.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if an entry does not exist or a lookup fails.
    pub fn load(&self, request: &ChangeJournalRequest) -> Result<ReassignmentRequest, StoreError> {
        let entries = self.entries.find_by_ids(&distinct(&request.entry_ids))?;

        let destination = match request.destination_ledger_id {
            Some(id) => {
                let ledger = self.ledgers.ledger(id)?;
                if ledger.is_none() {
                    warn!(ledger_id = %id, "Destination ledger not found");
                }
                ledger
            }
            None => None,
        };
        let destination_company = match &destination {
            Some(ledger) => self.ledgers.company(ledger.company_id)?,
            None => None,
        };

        let mut source_ledgers = HashMap::new();
        for entry in &entries {
            if source_ledgers.contains_key(&entry.ledger_id) {
                continue;
            }
            if let Some(ledger) = self.ledgers.ledger(entry.ledger_id)? {
                source_ledgers.insert(entry.ledger_id, ledger);
            }
        }

        let moving: Vec<LedgerEntryId> = match &destination {
            Some(ledger) => entries
                .iter()
                .filter(|e| e.ledger_id != ledger.id)
                .map(|e| e.id)
                .collect(),
            None => Vec::new(),
        };
        let payments = if moving.is_empty() {
            Vec::new()
        } else {
            self.payments.find_by_entries(&moving)?
        };

        debug!(
            entries = entries.len(),
            moving = moving.len(),
            payments = payments.len(),
            "Loaded journal change batch"
        );

        Ok(ReassignmentRequest {
            entries,
            destination,
            destination_company,
            source_ledgers,
            payments,
            force_change: request.force_change,
            reset_sequence: request.reset_sequence,
        })
    }

    /// Warnings for a candidate batch. Writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the batch cannot be loaded.
    pub fn preview_warnings(
        &self,
        entry_ids: &[LedgerEntryId],
        destination_ledger_id: Option<LedgerId>,
        force_change: bool,
    ) -> Result<Vec<Warning>, StoreError> {
        let request = self.load(&ChangeJournalRequest {
            entry_ids: entry_ids.to_vec(),
            destination_ledger_id,
            force_change,
            reset_sequence: false,
        })?;
        Ok(RiskAnalyzer::analyze(&request))
    }

    /// Summary of a selection for the change form.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if an entry cannot be loaded.
    pub fn context(
        &self,
        entry_ids: &[LedgerEntryId],
        fallback_company: CompanyId,
    ) -> Result<BatchContext, StoreError> {
        let entries = self.entries.find_by_ids(&distinct(entry_ids))?;
        Ok(BatchContext::summarize(&entries, fallback_company))
    }

    /// Validates and applies a journal change.
    ///
    /// # Errors
    ///
    /// - `ChangeJournalError::Blocked` if a pre-flight check fails; nothing is written
    /// - `ChangeJournalError::Store` if the batch cannot be loaded
    ///
    /// Per-record failures are not errors; they are reported in the `BatchResult`.
    pub fn change_journal(
        &self,
        entry_ids: &[LedgerEntryId],
        destination_ledger_id: Option<LedgerId>,
        force_change: bool,
        reset_sequence: bool,
    ) -> Result<BatchResult, ChangeJournalError> {
        self.submit(&ChangeJournalRequest {
            entry_ids: entry_ids.to_vec(),
            destination_ledger_id,
            force_change,
            reset_sequence,
        })
    }

    /// Same as [`Self::change_journal`], taking a prepared request.
    ///
    /// # Errors
    ///
    /// See [`Self::change_journal`].
    pub fn submit(&self, request: &ChangeJournalRequest) -> Result<BatchResult, ChangeJournalError> {
        let loaded = self.load(request)?;

        if let Err(err) = validate(&loaded) {
            warn!(code = err.error_code(), error = %err, "Journal change blocked");
            return Err(err.into());
        }

        Ok(self.execute(&loaded))
    }

    /// Applies a validated request: payments first, then entries.
    ///
    /// Each record is written independently. A failure is recorded and the run
    /// moves on to the next record.
    #[must_use]
    pub fn execute(&self, request: &ReassignmentRequest) -> BatchResult {
        let Some(destination) = request.destination.as_ref() else {
            return BatchResult::from_outcomes(Vec::new(), "");
        };

        info!(
            destination = %destination.name,
            entries = request.entries_to_change().count(),
            payments = request.payments.len(),
            "Changing journal"
        );

        let mut outcomes = Vec::with_capacity(request.entries.len() + request.payments.len());

        // Payments must land on the destination before their entries are written.
        for payment in &request.payments {
            outcomes.push(self.move_payment(request, destination, payment));
        }
        for entry in request.entries_to_change() {
            outcomes.push(self.move_entry(request, destination, entry));
        }

        let result = BatchResult::from_outcomes(outcomes, &destination.name);
        if result.is_success() {
            info!(destination = %destination.name, "Journal change completed");
        } else {
            warn!(
                destination = %destination.name,
                failures = result.failures().count(),
                "Journal change completed with failures"
            );
        }
        result
    }

    fn move_payment(
        &self,
        request: &ReassignmentRequest,
        destination: &Ledger,
        payment: &PaymentRecord,
    ) -> Outcome {
        let resolution = match CompatibilityResolver::resolve(
            payment,
            destination,
            request.destination_company.as_ref(),
        ) {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!(payment = %payment.name, code = err.error_code(), error = %err, "Payment left in place");
                return Outcome::failed(
                    RecordKind::Payment,
                    &payment.name,
                    format!("Payment {}: {err}", payment.name),
                );
            }
        };

        let note = format!(
            "Journal changed from {} to {} (payment method: {})",
            request.ledger_name(payment.ledger_id),
            destination.name,
            resolution.binding.code
        );

        let written = self
            .receiptbook_for(request, payment)
            .and_then(|receiptbook_id| {
                let changes = PaymentChanges {
                    ledger_id: destination.id,
                    method_binding_id: resolution.binding.id,
                    method_code: resolution.binding.code.clone(),
                    outstanding_account_id: resolution.outstanding_account_id,
                    is_reconciled: false,
                    receiptbook_id,
                };
                self.payments.update_direct(payment.id, &changes)
            })
            .and_then(|()| self.payments.append_audit_note(payment.id, &note));

        match written {
            Ok(()) => {
                if payment.is_reconciled {
                    warn!(payment = %payment.name, "Reconciliation flag cleared on moved payment");
                }
                debug!(
                    payment = %payment.name,
                    method = %resolution.binding.code,
                    matched_by = ?resolution.matched_by,
                    account_source = ?resolution.account_source,
                    "Payment moved"
                );
                Outcome::changed(RecordKind::Payment, &payment.name, note)
            }
            Err(cause) => {
                let err = RecordMutationError {
                    record: format!("Payment {}", payment.name),
                    cause,
                };
                warn!(payment = %payment.name, error = %err, "Payment write failed");
                Outcome::failed(RecordKind::Payment, &payment.name, err.to_string())
            }
        }
    }

    fn receiptbook_for(
        &self,
        request: &ReassignmentRequest,
        payment: &PaymentRecord,
    ) -> Result<Option<ReceiptbookId>, StoreError> {
        if payment.is_internal_transfer {
            return Ok(None);
        }
        let Some(company) = request
            .destination_company
            .as_ref()
            .filter(|c| c.uses_receiptbooks)
        else {
            return Ok(None);
        };

        let receiptbook = self
            .receiptbooks
            .find_receiptbook(payment.counterparty_type, company.id)?;
        if receiptbook.is_none() {
            debug!(payment = %payment.name, "No receiptbook found, keeping the current one");
        }
        Ok(receiptbook.map(|book| book.id))
    }

    fn move_entry(
        &self,
        request: &ReassignmentRequest,
        destination: &Ledger,
        entry: &LedgerEntry,
    ) -> Outcome {
        let name = entry.display_name();
        match self.rewrite_entry(request, destination, entry) {
            Ok(note) => {
                debug!(entry = %name, "Entry moved");
                Outcome::changed(RecordKind::Entry, name, note)
            }
            Err(cause) => {
                let err = RecordMutationError {
                    record: format!("Move {name}"),
                    cause,
                };
                warn!(entry = %name, error = %err, "Entry write failed");
                Outcome::failed(RecordKind::Entry, name, err.to_string())
            }
        }
    }

    fn rewrite_entry(
        &self,
        request: &ReassignmentRequest,
        destination: &Ledger,
        entry: &LedgerEntry,
    ) -> Result<String, StoreError> {
        let old_number = entry.sequence_number.as_str();
        let clear = request.reset_sequence && !old_number.is_empty();

        self.entries.update(
            entry.id,
            &EntryChanges {
                ledger_id: destination.id,
                sequence_number: clear.then(String::new),
            },
        )?;

        // Drafts stay unnumbered until they are posted.
        let new_number = if !clear {
            old_number.to_string()
        } else if entry.state == EntryState::Posted {
            self.entries.recompute_display_number(entry.id)?
        } else {
            String::new()
        };

        let mut note = format!(
            "Journal changed from {} to {}",
            request.ledger_name(entry.ledger_id),
            destination.name
        );
        if new_number != old_number {
            note.push_str(&format!(
                "\nSequence changed from {} to {}",
                display_number(old_number),
                display_number(&new_number)
            ));
        }

        self.entries.append_audit_note(entry.id, &note)?;
        Ok(note)
    }
}

/// Ids in selection order, each once.
fn distinct(ids: &[LedgerEntryId]) -> Vec<LedgerEntryId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
