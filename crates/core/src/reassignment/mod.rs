//! Journal reassignment engine.
//!
//! Moves a batch of ledger entries, and the payments linked to them, to another
//! ledger:
//! - Validation of the batch before anything is written
//! - Risk analysis producing pre-flight warnings
//! - Payment method and outstanding account resolution on the destination
//! - Orchestration of the writes with partial-failure reporting
//! - Store ports and an in-memory implementation

pub mod error;
pub mod memory;
pub mod ports;
pub mod resolver;
pub mod risk;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod resolver_props;
#[cfg(test)]
mod service_props;

pub use error::{
    BlockingError, ChangeJournalError, RecordMutationError, ResolutionError, StoreError,
};
pub use memory::{AuditNote, AuditTarget, BooksSnapshot, MemoryBooks};
pub use ports::{
    EntryChanges, EntryStore, LedgerDirectory, PaymentChanges, PaymentStore, ReceiptbookDirectory,
};
pub use resolver::{AccountSource, BindingMatch, CompatibilityResolver, Resolution};
pub use risk::RiskAnalyzer;
pub use service::JournalChangeService;
pub use types::{
    BatchContext, BatchResult, BatchSummary, ChangeJournalRequest, Outcome, OutcomeStatus,
    ReassignmentRequest, RecordKind, Severity, Warning,
};
pub use validation::validate;
