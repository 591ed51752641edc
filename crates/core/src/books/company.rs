//! Company-level accounting defaults and receiptbooks.

use rejournal_shared::types::{AccountId, CompanyId, ReceiptbookId};
use serde::{Deserialize, Serialize};

use super::journal::Direction;
use super::payment::CounterpartyType;

/// A company owning ledgers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier.
    pub id: CompanyId,
    /// Display name.
    pub name: String,
    /// Default outstanding account for incoming payments.
    #[serde(default)]
    pub inbound_outstanding_account_id: Option<AccountId>,
    /// Default outstanding account for outgoing payments.
    #[serde(default)]
    pub outbound_outstanding_account_id: Option<AccountId>,
    /// Whether payments are numbered through receiptbooks.
    #[serde(default)]
    pub uses_receiptbooks: bool,
}

impl Company {
    /// Default outstanding account for payments in `direction`.
    #[must_use]
    pub const fn default_outstanding_account(&self, direction: Direction) -> Option<AccountId> {
        match direction {
            Direction::Inbound => self.inbound_outstanding_account_id,
            Direction::Outbound => self.outbound_outstanding_account_id,
        }
    }
}

/// Numbering series for payment receipts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receiptbook {
    /// Unique identifier.
    pub id: ReceiptbookId,
    /// Display name.
    pub name: String,
    /// Owning company.
    pub company_id: CompanyId,
    /// Counterparty type the book numbers receipts for.
    pub counterparty_type: CounterpartyType,
    /// Inactive books are never selected.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Priority among books of the same company and counterparty type (lowest first).
    #[serde(default)]
    pub sequence: u32,
}

fn default_active() -> bool {
    true
}
