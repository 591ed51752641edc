//! Ledgers (journals) and their payment method bindings.

use rejournal_shared::types::{AccountId, CompanyId, LedgerId, PaymentMethodBindingId};
use serde::{Deserialize, Serialize};

/// Purpose of a ledger. Entries of a given type belong on a ledger of the matching kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    /// Sales ledger (customer invoices and refunds).
    Sale,
    /// Purchase ledger (vendor bills and refunds).
    Purchase,
    /// Cash ledger.
    Cash,
    /// Bank ledger.
    Bank,
    /// Miscellaneous operations.
    General,
}

impl LedgerKind {
    /// Returns the kind as its stored tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Purchase => "purchase",
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money received.
    Inbound,
    /// Money sent.
    Outbound,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inbound => f.write_str("inbound"),
            Self::Outbound => f.write_str("outbound"),
        }
    }
}

/// Payment directions a binding can be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Applicability {
    /// Incoming payments only.
    Inbound,
    /// Outgoing payments only.
    Outbound,
    /// Both directions.
    Both,
}

impl Applicability {
    /// Returns true if a payment in `direction` may use this binding.
    #[must_use]
    pub const fn supports(&self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (Self::Both, _)
                | (Self::Inbound, Direction::Inbound)
                | (Self::Outbound, Direction::Outbound)
        )
    }
}

/// A payment method made available on one ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodBinding {
    /// Unique identifier.
    pub id: PaymentMethodBindingId,
    /// The ledger this binding belongs to.
    pub ledger_id: LedgerId,
    /// Method code (e.g. `manual`, `check_printing`). Not unique across ledgers.
    pub code: String,
    /// Directions this binding can be used for.
    pub applicability: Applicability,
    /// Account holding unreconciled payment value, if configured on the binding.
    #[serde(default)]
    pub outstanding_account_id: Option<AccountId>,
}

/// A named book of accounting entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    /// Unique identifier.
    pub id: LedgerId,
    /// Display name.
    pub name: String,
    /// Short code used as numbering prefix.
    pub code: String,
    /// Purpose of the ledger.
    pub kind: LedgerKind,
    /// Owning company.
    pub company_id: CompanyId,
    /// Payment methods available on this ledger, in configuration order.
    #[serde(default)]
    pub payment_method_bindings: Vec<PaymentMethodBinding>,
}

impl Ledger {
    /// Bindings usable by a payment in `direction`, in configuration order.
    pub fn bindings_for(
        &self,
        direction: Direction,
    ) -> impl Iterator<Item = &PaymentMethodBinding> {
        self.payment_method_bindings
            .iter()
            .filter(move |b| b.applicability.supports(direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Applicability::Inbound, Direction::Inbound, true)]
    #[case(Applicability::Inbound, Direction::Outbound, false)]
    #[case(Applicability::Outbound, Direction::Inbound, false)]
    #[case(Applicability::Outbound, Direction::Outbound, true)]
    #[case(Applicability::Both, Direction::Inbound, true)]
    #[case(Applicability::Both, Direction::Outbound, true)]
    fn test_applicability_supports(
        #[case] applicability: Applicability,
        #[case] direction: Direction,
        #[case] expected: bool,
    ) {
        assert_eq!(applicability.supports(direction), expected);
    }

    #[test]
    fn test_bindings_for_keeps_configuration_order() {
        let ledger_id = LedgerId::new();
        let binding = |code: &str, applicability| PaymentMethodBinding {
            id: PaymentMethodBindingId::new(),
            ledger_id,
            code: code.to_string(),
            applicability,
            outstanding_account_id: None,
        };
        let ledger = Ledger {
            id: ledger_id,
            name: "Bank".to_string(),
            code: "BNK1".to_string(),
            kind: LedgerKind::Bank,
            company_id: CompanyId::new(),
            payment_method_bindings: vec![
                binding("sepa_ct", Applicability::Outbound),
                binding("manual", Applicability::Both),
                binding("batch", Applicability::Inbound),
            ],
        };

        let codes: Vec<&str> = ledger
            .bindings_for(Direction::Inbound)
            .map(|b| b.code.as_str())
            .collect();
        assert_eq!(codes, vec!["manual", "batch"]);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LedgerKind::Purchase).unwrap(), "\"purchase\"");
    }
}
