//! Error types for journal reassignment.
//!
//! Three tiers, matching how far a failure reaches:
//! - `BlockingError` aborts the whole batch before anything is written
//! - `ResolutionError` fails a single payment, the batch carries on
//! - `RecordMutationError` wraps a store failure while writing one record

use rejournal_shared::types::{LedgerEntryId, PaymentId};
use thiserror::Error;

use crate::books::Direction;

/// Pre-flight failures. Nothing has been written when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockingError {
    /// No entries were selected.
    #[error("No moves selected to change journal.")]
    EmptySelection,

    /// No destination ledger was chosen (or it does not exist).
    #[error("Please select a target journal.")]
    NoDestination,

    /// Every selected entry already sits on the destination ledger.
    #[error("All selected moves already belong to the target journal '{ledger}'.")]
    AllAlreadyInTarget {
        /// Destination ledger name.
        ledger: String,
    },

    /// A posted entry is sealed by the hash chain and the change was not forced.
    #[error(
        "Cannot change journal of move '{entry}' because it is posted and locked by hash. \
         Please use 'Force Change' if you really need to proceed (not recommended)."
    )]
    LockedBySeal {
        /// Sealed entry.
        entry_id: LedgerEntryId,
        /// Display number of the sealed entry.
        entry: String,
    },
}

impl BlockingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptySelection => "EMPTY_SELECTION",
            Self::NoDestination => "NO_DESTINATION",
            Self::AllAlreadyInTarget { .. } => "ALL_ALREADY_IN_TARGET",
            Self::LockedBySeal { .. } => "LOCKED_BY_SEAL",
        }
    }
}

/// No compatible payment method/account pairing exists on the destination ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The destination ledger has no binding usable in the payment's direction.
    #[error("Journal '{ledger}' has no {direction} payment method")]
    NoApplicableMethod {
        /// Destination ledger name.
        ledger: String,
        /// Payment direction.
        direction: Direction,
    },

    /// Neither the chosen binding nor the company provides an outstanding account.
    #[error(
        "Payment method '{code}' on journal '{ledger}' has no outstanding account \
         and the company has no default {direction} outstanding account"
    )]
    NoOutstandingAccount {
        /// Destination ledger name.
        ledger: String,
        /// Code of the chosen binding.
        code: String,
        /// Payment direction.
        direction: Direction,
    },
}

impl ResolutionError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoApplicableMethod { .. } => "NO_APPLICABLE_METHOD",
            Self::NoOutstandingAccount { .. } => "NO_OUTSTANDING_ACCOUNT",
        }
    }
}

/// Failure reported by one of the store collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A requested entry does not exist.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(LedgerEntryId),

    /// A requested payment does not exist.
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// The write conflicted with a concurrent change.
    #[error("Concurrent modification detected: {0}")]
    Conflict(String),

    /// Any other backend failure.
    #[error("Store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::Conflict(_) => "CONCURRENT_MODIFICATION",
            Self::Backend(_) => "STORE_ERROR",
        }
    }
}

/// A store write failed for one record of the batch.
///
/// The store failure is part of the message and is not exposed as a source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{record}: {cause}")]
pub struct RecordMutationError {
    /// Record label, e.g. `Move INV/2024/001`.
    pub record: String,
    /// Underlying store failure.
    pub cause: StoreError,
}

/// Errors returned by `change_journal` before any record was changed.
#[derive(Debug, Error)]
pub enum ChangeJournalError {
    /// The batch failed a pre-flight check.
    #[error(transparent)]
    Blocked(#[from] BlockingError),

    /// The batch could not be loaded.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ChangeJournalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Blocked(err) => err.error_code(),
            Self::Store(err) => err.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - nothing to do or nothing to do it with
            Self::Blocked(
                BlockingError::EmptySelection
                | BlockingError::NoDestination
                | BlockingError::AllAlreadyInTarget { .. },
            ) => 400,

            // 423 Locked - sealed entries
            Self::Blocked(BlockingError::LockedBySeal { .. }) => 423,

            // 404 Not Found
            Self::Store(StoreError::EntryNotFound(_) | StoreError::PaymentNotFound(_)) => 404,

            // 409 Conflict
            Self::Store(StoreError::Conflict(_)) => 409,

            // 500 Internal Server Error
            Self::Store(StoreError::Backend(_)) => 500,
        }
    }
}
