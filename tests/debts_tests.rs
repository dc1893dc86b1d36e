// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::tempdir;

use tillbook::ledger::debts;
use tillbook::models::{DebtDraft, DebtFilter, DebtKind};
use tillbook::store::LedgerStore;

fn open_store() -> (tempfile::TempDir, LedgerStore, i64) {
    let dir = tempdir().unwrap();
    let store = LedgerStore::open(dir.path().join("till.sqlite")).unwrap();
    let user = store.create_user("amira").unwrap();
    (dir, store, user.id)
}

fn movement(date: &str, employee: &str, kind: DebtKind, amount: Decimal) -> DebtDraft {
    DebtDraft {
        date: Some(date.parse().unwrap()),
        employee: Some(employee.into()),
        kind: Some(kind),
        amount: Some(amount),
        ..DebtDraft::default()
    }
}

#[test]
fn advances_and_repayments_carry_signed_deltas() {
    let (_dir, store, uid) = open_store();

    let advance = debts::create(&store, uid, movement("2025-01-02", "Bob", DebtKind::Advance, dec!(100)))
        .unwrap();
    assert_eq!(advance.delta, dec!(100));

    let repay = debts::create(&store, uid, movement("2025-01-09", "Bob", DebtKind::Repay, dec!(40)))
        .unwrap();
    assert_eq!(repay.delta, dec!(-40));

    // the stored rows agree
    assert_eq!(debts::find(&store, uid, advance.id).unwrap().delta, dec!(100));
    assert_eq!(debts::find(&store, uid, repay.id).unwrap().delta, dec!(-40));
}

#[test]
fn balances_aggregate_per_employee() {
    let (_dir, store, uid) = open_store();
    debts::create(&store, uid, movement("2025-01-02", "Bob", DebtKind::Advance, dec!(100))).unwrap();
    debts::create(&store, uid, movement("2025-01-09", "Bob", DebtKind::Repay, dec!(40))).unwrap();
    debts::create(&store, uid, movement("2025-01-10", "Cara", DebtKind::Advance, dec!(25))).unwrap();

    let positions = debts::balances(&store, uid).unwrap();
    assert_eq!(positions.len(), 2);

    let bob = &positions["Bob"];
    assert_eq!(bob.advances, dec!(100));
    assert_eq!(bob.repayments, dec!(40));
    assert_eq!(bob.balance, dec!(60));

    let cara = &positions["Cara"];
    assert_eq!(cara.balance, dec!(25));
}

#[test]
fn empty_employee_forms_its_own_bucket() {
    let (_dir, store, uid) = open_store();
    debts::create(&store, uid, movement("2025-01-02", "", DebtKind::Advance, dec!(30))).unwrap();
    debts::create(&store, uid, movement("2025-01-03", "Bob", DebtKind::Advance, dec!(5))).unwrap();

    let positions = debts::balances(&store, uid).unwrap();
    assert_eq!(positions[""].balance, dec!(30));
    assert_eq!(positions["Bob"].balance, dec!(5));
}

#[test]
fn kind_flip_rederives_the_delta() {
    let (_dir, store, uid) = open_store();
    let d = debts::create(&store, uid, movement("2025-01-02", "Bob", DebtKind::Advance, dec!(80)))
        .unwrap();
    assert_eq!(d.delta, dec!(80));

    let patch = DebtDraft {
        kind: Some(DebtKind::Repay),
        ..DebtDraft::default()
    };
    let d = debts::update(&store, uid, d.id, patch).unwrap();
    assert_eq!(d.kind, DebtKind::Repay);
    assert_eq!(d.amount, dec!(80));
    assert_eq!(d.delta, dec!(-80));
}

#[test]
fn client_supplied_delta_is_discarded() {
    let (_dir, store, uid) = open_store();
    let mut draft = movement("2025-01-02", "Bob", DebtKind::Repay, dec!(10));
    draft.delta = Some(dec!(500));
    let d = debts::create(&store, uid, draft).unwrap();
    assert_eq!(d.delta, dec!(-10));
}

#[test]
fn negative_amounts_are_rejected() {
    let (_dir, store, uid) = open_store();
    let err = debts::create(&store, uid, movement("2025-01-02", "Bob", DebtKind::Advance, dec!(-5)))
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");

    // also after an update merge, and the stored row stays intact
    let d = debts::create(&store, uid, movement("2025-01-02", "Bob", DebtKind::Advance, dec!(5)))
        .unwrap();
    let patch = DebtDraft {
        amount: Some(dec!(-1)),
        ..DebtDraft::default()
    };
    let err = debts::update(&store, uid, d.id, patch).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
    assert_eq!(debts::find(&store, uid, d.id).unwrap().amount, dec!(5));
}

#[test]
fn missing_fields_are_reported_by_name() {
    let (_dir, store, uid) = open_store();
    let mut draft = movement("2025-01-02", "Bob", DebtKind::Advance, dec!(5));
    draft.employee = None;
    let err = debts::create(&store, uid, draft).unwrap_err();
    assert_eq!(err.error_code(), "MISSING_FIELD");
    assert!(err.to_string().contains("employee"));
}

#[test]
fn listing_is_oldest_first() {
    let (_dir, store, uid) = open_store();
    for date in ["2025-02-01", "2025-01-01", "2025-01-15"] {
        debts::create(&store, uid, movement(date, "Bob", DebtKind::Advance, dec!(1))).unwrap();
    }

    let rows = debts::list(&store, uid, &DebtFilter::default()).unwrap();
    let dates: Vec<String> = rows.iter().map(|d| d.date.to_string()).collect();
    assert_eq!(dates, ["2025-01-01", "2025-01-15", "2025-02-01"]);

    // kind filter narrows, limit truncates from the oldest end
    let filter = DebtFilter {
        kind: Some(DebtKind::Repay),
        ..DebtFilter::default()
    };
    assert!(debts::list(&store, uid, &filter).unwrap().is_empty());
    let filter = DebtFilter {
        limit: Some(1),
        ..DebtFilter::default()
    };
    let first = debts::list(&store, uid, &filter).unwrap();
    assert_eq!(first[0].date.to_string(), "2025-01-01");
}

#[test]
fn foreign_ids_are_invisible() {
    let (_dir, store, uid) = open_store();
    let other = store.create_user("ben").unwrap();
    let d = debts::create(&store, uid, movement("2025-01-02", "Bob", DebtKind::Advance, dec!(10)))
        .unwrap();

    let err = debts::delete(&store, other.id, d.id).unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
    let err = debts::find(&store, other.id, d.id).unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
    assert_eq!(debts::find(&store, uid, d.id).unwrap().amount, dec!(10));
}
