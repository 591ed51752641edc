//! Request, warning and outcome types for journal reassignment.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use rejournal_shared::ChangeDefaults;
use rejournal_shared::types::{CompanyId, LedgerEntryId, LedgerId};
use serde::{Deserialize, Serialize};

use crate::books::{Company, Ledger, LedgerEntry, PaymentRecord};

/// Caller input for a journal change: the explicit selection plus options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeJournalRequest {
    /// Selected entries.
    pub entry_ids: Vec<LedgerEntryId>,
    /// Destination ledger.
    pub destination_ledger_id: Option<LedgerId>,
    /// Move sealed posted entries anyway.
    pub force_change: bool,
    /// Give moved entries a fresh number from the destination ledger.
    pub reset_sequence: bool,
}

impl ChangeJournalRequest {
    /// Builds a request using the configured option defaults.
    #[must_use]
    pub fn with_defaults(
        entry_ids: Vec<LedgerEntryId>,
        destination_ledger_id: Option<LedgerId>,
        defaults: &ChangeDefaults,
    ) -> Self {
        Self {
            entry_ids,
            destination_ledger_id,
            force_change: defaults.force_change,
            reset_sequence: defaults.reset_sequence,
        }
    }
}

/// A loaded, self-contained unit of work.
///
/// Holds everything validation, analysis and resolution need so those stay pure.
/// Lives only for the duration of one call.
#[derive(Debug, Clone)]
pub struct ReassignmentRequest {
    /// Selected entries, in selection order.
    pub entries: Vec<LedgerEntry>,
    /// Destination ledger, with its bindings.
    pub destination: Option<Ledger>,
    /// Company owning the destination ledger.
    pub destination_company: Option<Company>,
    /// Ledgers the selected entries currently sit on.
    pub source_ledgers: HashMap<LedgerId, Ledger>,
    /// Payments linked to the entries that will move, in store order.
    pub payments: Vec<PaymentRecord>,
    /// Move sealed posted entries anyway.
    pub force_change: bool,
    /// Give moved entries a fresh number.
    pub reset_sequence: bool,
}

impl ReassignmentRequest {
    /// Entries whose ledger differs from the destination, in selection order.
    ///
    /// Empty when no destination is set.
    pub fn entries_to_change(&self) -> impl Iterator<Item = &LedgerEntry> {
        let destination = self.destination.as_ref().map(|ledger| ledger.id);
        self.entries
            .iter()
            .filter(move |entry| destination.is_some_and(|id| entry.ledger_id != id))
    }

    /// Name of a source ledger, falling back to its id.
    #[must_use]
    pub fn ledger_name(&self, id: LedgerId) -> String {
        self.source_ledgers
            .get(&id)
            .map_or_else(|| id.to_string(), |ledger| ledger.name.clone())
    }
}

/// Severity of a pre-flight warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only.
    Info,
    /// Risky but allowed.
    Warning,
    /// The change will fail for at least one record.
    Error,
}

/// A pre-flight warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Severity.
    pub severity: Severity,
    /// Human readable text.
    pub message: String,
}

impl Warning {
    /// Creates an informational warning.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    /// Creates a warning.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// Creates an error-severity warning.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Kind of record an outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A ledger entry.
    Entry,
    /// A payment record.
    Payment,
}

/// Per-record result tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// The record now sits on the destination ledger.
    Changed,
    /// The record was left as it was.
    Failed,
}

/// Result for a single record of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Record kind.
    pub kind: RecordKind,
    /// Record display label.
    pub record: String,
    /// Result tag.
    pub status: OutcomeStatus,
    /// Audit text for changed records, failure reason otherwise.
    pub message: String,
}

impl Outcome {
    /// Creates a `changed` outcome.
    pub fn changed(kind: RecordKind, record: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            record: record.into(),
            status: OutcomeStatus::Changed,
            message: message.into(),
        }
    }

    /// Creates a `failed` outcome.
    pub fn failed(kind: RecordKind, record: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            record: record.into(),
            status: OutcomeStatus::Failed,
            message: message.into(),
        }
    }
}

/// Overall verdict of a batch that got past validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchSummary {
    /// Every record changed.
    Success {
        /// Number of changed entries.
        changed_entries: usize,
        /// Number of changed payments.
        changed_payments: usize,
    },
    /// At least one record failed. Changed records stay changed.
    PartialFailure {
        /// Number of changed entries.
        changed_entries: usize,
        /// Number of changed payments.
        changed_payments: usize,
        /// One message per failed record.
        failures: Vec<String>,
    },
}

/// Aggregated result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Per-record outcomes, payments first, in processing order.
    pub outcomes: Vec<Outcome>,
    /// Verdict.
    pub summary: BatchSummary,
    /// Message for the caller.
    pub message: String,
}

impl BatchResult {
    /// Aggregates outcomes into a result.
    #[must_use]
    pub fn from_outcomes(outcomes: Vec<Outcome>, destination_name: &str) -> Self {
        let changed = |kind: RecordKind| {
            outcomes
                .iter()
                .filter(|o| o.kind == kind && o.status == OutcomeStatus::Changed)
                .count()
        };
        let changed_entries = changed(RecordKind::Entry);
        let changed_payments = changed(RecordKind::Payment);
        let failures: Vec<String> = outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Failed)
            .map(|o| o.message.clone())
            .collect();

        let (summary, message) = if failures.is_empty() {
            (
                BatchSummary::Success {
                    changed_entries,
                    changed_payments,
                },
                format!(
                    "{changed_entries} move(s) successfully changed to journal '{destination_name}'."
                ),
            )
        } else {
            let mut message = format!("Some moves could not be changed:\n{}", failures.join("\n"));
            if changed_entries > 0 {
                message = format!("{changed_entries} moves successfully changed.\n\n{message}");
            }
            (
                BatchSummary::PartialFailure {
                    changed_entries,
                    changed_payments,
                    failures,
                },
                message,
            )
        };

        Self {
            outcomes,
            summary,
            message,
        }
    }

    /// Returns true if every record changed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.summary, BatchSummary::Success { .. })
    }

    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Failed)
    }
}

/// Summary of a selection, shown alongside the warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchContext {
    /// Number of selected entries.
    pub move_count: usize,
    /// The ledger all entries share, if they share one.
    pub source_ledger_id: Option<LedgerId>,
    /// The company all entries share, else the caller's company.
    pub company_id: CompanyId,
}

impl BatchContext {
    /// Summarizes a selection.
    #[must_use]
    pub fn summarize(entries: &[LedgerEntry], fallback_company: CompanyId) -> Self {
        let source_ledger_id = single(entries.iter().map(|e| e.ledger_id).collect());
        let company_id =
            single(entries.iter().map(|e| e.company_id).collect()).unwrap_or(fallback_company);

        Self {
            move_count: entries.len(),
            source_ledger_id,
            company_id,
        }
    }
}

fn single<T: Eq + Hash>(ids: HashSet<T>) -> Option<T> {
    if ids.len() == 1 { ids.into_iter().next() } else { None }
}
