//! Accounting records the reassignment engine reads and rewrites.
//!
//! - `entry` - Ledger entries (moves) and their lines
//! - `journal` - Ledgers and payment method bindings
//! - `payment` - Payment records linked to entries
//! - `company` - Company defaults and receiptbooks

pub mod company;
pub mod entry;
pub mod journal;
pub mod payment;

pub use company::{Company, Receiptbook};
pub use entry::{EntryLine, EntryState, EntryType, LedgerEntry, display_number};
pub use journal::{Applicability, Direction, Ledger, LedgerKind, PaymentMethodBinding};
pub use payment::{CounterpartyType, PaymentRecord};
