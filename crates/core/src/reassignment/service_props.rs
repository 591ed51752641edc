//! Property-based tests for JournalChangeService.
//!
//! - After a successful run every selected entry sits on the destination
//! - A batch entirely on the destination is blocked and writes nothing
//! - Payments moved first keep their entries on the destination even when
//!   entry writes re-synchronize from payments

use chrono::NaiveDate;
use proptest::prelude::*;
use rejournal_shared::types::{
    AccountId, CompanyId, LedgerEntryId, LedgerId, PaymentId, PaymentMethodBindingId,
};
use rust_decimal::Decimal;

use super::error::{BlockingError, ChangeJournalError};
use super::memory::{BooksSnapshot, MemoryBooks};
use super::service::JournalChangeService;
use super::types::BatchSummary;
use crate::books::{
    Applicability, Company, CounterpartyType, Direction, EntryState, EntryType, Ledger,
    LedgerEntry, LedgerKind, PaymentMethodBinding, PaymentRecord,
};

/// Where a generated entry starts: 0 and 1 are sources, 2 is the destination.
fn placement() -> impl Strategy<Value = usize> {
    0usize..3
}

fn state_strategy() -> impl Strategy<Value = EntryState> {
    prop_oneof![
        Just(EntryState::Draft),
        Just(EntryState::Posted),
        Just(EntryState::Cancelled),
    ]
}

fn make_ledger(company: &Company, name: &str, code: &str) -> Ledger {
    let id = LedgerId::new();
    Ledger {
        id,
        name: name.to_string(),
        code: code.to_string(),
        kind: LedgerKind::Bank,
        company_id: company.id,
        payment_method_bindings: vec![PaymentMethodBinding {
            id: PaymentMethodBindingId::new(),
            ledger_id: id,
            code: "manual".to_string(),
            applicability: Applicability::Both,
            outstanding_account_id: Some(AccountId::new()),
        }],
    }
}

fn make_entry(ledger: &Ledger, state: EntryState, index: usize) -> LedgerEntry {
    LedgerEntry {
        id: LedgerEntryId::new(),
        ledger_id: ledger.id,
        company_id: ledger.company_id,
        state,
        entry_type: EntryType::CustomerReceipt,
        date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        sequence_number: if state == EntryState::Posted {
            format!("{}/2024/{:04}", ledger.code, index + 1)
        } else {
            String::new()
        },
        locked: false,
        lines: vec![],
    }
}

fn make_payment(entry: &LedgerEntry) -> PaymentRecord {
    PaymentRecord {
        id: PaymentId::new(),
        name: format!("P{}", entry.display_name()),
        entry_id: entry.id,
        ledger_id: entry.ledger_id,
        direction: Direction::Inbound,
        counterparty_type: CounterpartyType::Customer,
        amount: Decimal::new(10_000, 2),
        method_binding_id: None,
        method_code: Some("manual".to_string()),
        outstanding_account_id: None,
        is_reconciled: false,
        is_internal_transfer: false,
        receiptbook_id: None,
    }
}

/// Builds books with one entry per generated (placement, state) pair.
fn build(
    layout: &[(usize, EntryState)],
    with_payments: bool,
) -> (MemoryBooks, Vec<LedgerEntryId>, Ledger) {
    let company = Company {
        id: CompanyId::new(),
        name: "Acme".to_string(),
        inbound_outstanding_account_id: None,
        outbound_outstanding_account_id: None,
        uses_receiptbooks: false,
    };
    let ledgers = [
        make_ledger(&company, "Bank A", "BNKA"),
        make_ledger(&company, "Bank B", "BNKB"),
        make_ledger(&company, "Bank C", "BNKC"),
    ];
    let entries: Vec<LedgerEntry> = layout
        .iter()
        .enumerate()
        .map(|(index, (at, state))| make_entry(&ledgers[*at], *state, index))
        .collect();
    let payments = if with_payments {
        entries.iter().map(make_payment).collect()
    } else {
        vec![]
    };
    let ids = entries.iter().map(|e| e.id).collect();
    let destination = ledgers[2].clone();

    let books = MemoryBooks::new(BooksSnapshot {
        companies: vec![company],
        ledgers: ledgers.to_vec(),
        entries,
        payments,
        receiptbooks: vec![],
    });
    (books, ids, destination)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_successful_run_lands_every_entry(
        layout in prop::collection::vec((placement(), state_strategy()), 1..8),
        reset_sequence in any::<bool>(),
    ) {
        let (books, ids, destination) = build(&layout, false);
        let moving = layout.iter().filter(|(at, _)| *at != 2).count();

        let result = JournalChangeService::over(&books)
            .change_journal(&ids, Some(destination.id), false, reset_sequence);

        if moving == 0 {
            let blocked = matches!(
                result,
                Err(ChangeJournalError::Blocked(BlockingError::AllAlreadyInTarget { .. }))
            );
            prop_assert!(blocked, "batch on the destination must be blocked");
            prop_assert_eq!(books.write_count(), 0);
        } else {
            let result = result.unwrap();
            prop_assert_eq!(
                result.summary,
                BatchSummary::Success { changed_entries: moving, changed_payments: 0 }
            );
            for id in &ids {
                prop_assert_eq!(books.entry(*id).unwrap().ledger_id, destination.id);
            }
        }
    }

    #[test]
    fn prop_payment_first_survives_payment_sync(
        layout in prop::collection::vec((0usize..2, state_strategy()), 1..6),
    ) {
        let (books, ids, destination) = build(&layout, true);
        let books = books.with_payment_sync();

        let result = JournalChangeService::over(&books)
            .change_journal(&ids, Some(destination.id), false, false)
            .unwrap();

        prop_assert!(result.is_success());
        for id in &ids {
            prop_assert_eq!(books.entry(*id).unwrap().ledger_id, destination.id);
        }
    }
}
