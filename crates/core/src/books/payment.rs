//! Payment records linked 1:1 to a ledger entry.

use rejournal_shared::types::{
    AccountId, LedgerEntryId, LedgerId, PaymentId, PaymentMethodBindingId, ReceiptbookId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::journal::Direction;

/// Kind of counterparty a payment is made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterpartyType {
    /// Customer.
    Customer,
    /// Supplier.
    Supplier,
}

/// A payment and its bookkeeping state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Unique identifier.
    pub id: PaymentId,
    /// Display name (e.g. `PBNK1/2024/00012`).
    pub name: String,
    /// The entry (move) this payment is booked through.
    pub entry_id: LedgerEntryId,
    /// Owning ledger. Must agree with the entry's ledger.
    pub ledger_id: LedgerId,
    /// Direction of the payment.
    pub direction: Direction,
    /// Counterparty type.
    pub counterparty_type: CounterpartyType,
    /// Amount in the payment currency.
    pub amount: Decimal,
    /// Current payment method binding, scoped to `ledger_id`.
    #[serde(default)]
    pub method_binding_id: Option<PaymentMethodBindingId>,
    /// Code of the current payment method binding.
    #[serde(default)]
    pub method_code: Option<String>,
    /// Outstanding account currently used by the payment.
    #[serde(default)]
    pub outstanding_account_id: Option<AccountId>,
    /// Whether the payment is matched with a bank statement.
    #[serde(default)]
    pub is_reconciled: bool,
    /// Whether the payment moves money between the company's own ledgers.
    #[serde(default)]
    pub is_internal_transfer: bool,
    /// Document series used for the payment receipt.
    #[serde(default)]
    pub receiptbook_id: Option<ReceiptbookId>,
}
