//! Property-based tests for CompatibilityResolver.
//!
//! - Resolution only ever picks a binding usable in the payment's direction
//! - A missing applicable binding is always `NoApplicableMethod`
//! - A same-code binding with an account always wins

use proptest::prelude::*;
use rejournal_shared::types::{
    AccountId, CompanyId, LedgerEntryId, LedgerId, PaymentId, PaymentMethodBindingId,
};
use rust_decimal::Decimal;

use super::error::ResolutionError;
use super::resolver::{AccountSource, BindingMatch, CompatibilityResolver};
use crate::books::{
    Applicability, Company, CounterpartyType, Direction, Ledger, LedgerKind, PaymentMethodBinding,
    PaymentRecord,
};

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Inbound), Just(Direction::Outbound)]
}

fn applicability_strategy() -> impl Strategy<Value = Applicability> {
    prop_oneof![
        Just(Applicability::Inbound),
        Just(Applicability::Outbound),
        Just(Applicability::Both),
    ]
}

fn method_code() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("manual".to_string()),
        Just("batch".to_string()),
        Just("sepa_ct".to_string()),
    ]
}

/// (code, applicability, has account)
fn bindings_strategy() -> impl Strategy<Value = Vec<(String, Applicability, bool)>> {
    prop::collection::vec((method_code(), applicability_strategy(), any::<bool>()), 0..6)
}

fn make_ledger(specs: &[(String, Applicability, bool)]) -> Ledger {
    let id = LedgerId::new();
    Ledger {
        id,
        name: "Bank 2".to_string(),
        code: "BNK2".to_string(),
        kind: LedgerKind::Bank,
        company_id: CompanyId::new(),
        payment_method_bindings: specs
            .iter()
            .map(|(code, applicability, has_account)| PaymentMethodBinding {
                id: PaymentMethodBindingId::new(),
                ledger_id: id,
                code: code.clone(),
                applicability: *applicability,
                outstanding_account_id: has_account.then(AccountId::new),
            })
            .collect(),
    }
}

fn make_payment(direction: Direction, code: Option<String>) -> PaymentRecord {
    PaymentRecord {
        id: PaymentId::new(),
        name: "PBNK1/2024/0042".to_string(),
        entry_id: LedgerEntryId::new(),
        ledger_id: LedgerId::new(),
        direction,
        counterparty_type: CounterpartyType::Supplier,
        amount: Decimal::new(4200, 2),
        method_binding_id: None,
        method_code: code,
        outstanding_account_id: None,
        is_reconciled: false,
        is_internal_transfer: false,
        receiptbook_id: None,
    }
}

fn make_company(with_defaults: bool) -> Company {
    Company {
        id: CompanyId::new(),
        name: "Acme".to_string(),
        inbound_outstanding_account_id: with_defaults.then(AccountId::new),
        outbound_outstanding_account_id: with_defaults.then(AccountId::new),
        uses_receiptbooks: false,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_resolution_respects_direction(
        specs in bindings_strategy(),
        direction in direction_strategy(),
        code in proptest::option::of(method_code()),
        with_defaults in any::<bool>(),
    ) {
        let ledger = make_ledger(&specs);
        let payment = make_payment(direction, code);
        let company = make_company(with_defaults);
        let any_applicable = ledger
            .payment_method_bindings
            .iter()
            .any(|b| b.applicability.supports(direction));

        match CompatibilityResolver::resolve(&payment, &ledger, Some(&company)) {
            Ok(resolution) => {
                prop_assert!(resolution.binding.applicability.supports(direction));
                match resolution.account_source {
                    AccountSource::Binding => prop_assert_eq!(
                        resolution.binding.outstanding_account_id,
                        Some(resolution.outstanding_account_id)
                    ),
                    AccountSource::CompanyDefault => {
                        prop_assert!(resolution.binding.outstanding_account_id.is_none());
                        prop_assert_eq!(
                            company.default_outstanding_account(direction),
                            Some(resolution.outstanding_account_id)
                        );
                    }
                }
            }
            Err(ResolutionError::NoApplicableMethod { .. }) => prop_assert!(!any_applicable),
            Err(ResolutionError::NoOutstandingAccount { .. }) => {
                prop_assert!(any_applicable);
                prop_assert!(!with_defaults);
                prop_assert!(
                    ledger
                        .bindings_for(direction)
                        .all(|b| b.outstanding_account_id.is_none()),
                    "an applicable binding carries an account"
                );
            }
        }
    }

    #[test]
    fn prop_same_code_with_account_wins(
        specs in bindings_strategy(),
        direction in direction_strategy(),
        code in method_code(),
    ) {
        let ledger = make_ledger(&specs);
        let payment = make_payment(direction, Some(code.clone()));
        let expected = ledger.payment_method_bindings.iter().find(|b| {
            b.applicability.supports(direction)
                && b.code == code
                && b.outstanding_account_id.is_some()
        });

        if let Some(expected) = expected {
            let (binding, matched_by) = CompatibilityResolver::select_binding(&payment, &ledger)
                .expect("an applicable binding exists");
            prop_assert_eq!(binding.id, expected.id);
            prop_assert_eq!(matched_by, BindingMatch::SameCodeWithAccount);
        }
    }
}
