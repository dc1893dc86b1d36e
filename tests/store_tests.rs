// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal_macros::dec;
use tempfile::tempdir;

use tillbook::ledger::{debts, settings, transactions};
use tillbook::models::{DebtDraft, DebtKind, TxnDraft, TxnFilter, TxnKind};
use tillbook::store::LedgerStore;

fn txn(date: &str, base: &str) -> TxnDraft {
    TxnDraft {
        date: Some(date.parse().unwrap()),
        kind: Some(TxnKind::Income),
        category: Some("Sales".into()),
        base: Some(base.parse().unwrap()),
        ..TxnDraft::default()
    }
}

#[test]
fn duplicate_user_names_conflict() {
    let dir = tempdir().unwrap();
    let store = LedgerStore::open(dir.path().join("till.sqlite")).unwrap();
    store.create_user("amira").unwrap();

    let err = store.create_user("amira").unwrap_err();
    assert_eq!(err.error_code(), "CONFLICT");
    assert!(err.to_string().contains("amira"));

    // whitespace around the name is not identity
    let err = store.create_user("  amira  ").unwrap_err();
    assert_eq!(err.error_code(), "CONFLICT");
}

#[test]
fn blank_user_names_are_rejected() {
    let dir = tempdir().unwrap();
    let store = LedgerStore::open(dir.path().join("till.sqlite")).unwrap();
    let err = store.create_user("   ").unwrap_err();
    assert_eq!(err.error_code(), "MISSING_FIELD");
}

#[test]
fn removing_a_user_cascades_through_the_ledger() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("till.sqlite");
    let store = LedgerStore::open(&path).unwrap();
    let user = store.create_user("amira").unwrap();
    transactions::create(&store, user.id, txn("2025-01-02", "100")).unwrap();
    debts::create(
        &store,
        user.id,
        DebtDraft {
            date: Some("2025-01-02".parse().unwrap()),
            employee: Some("Bob".into()),
            kind: Some(DebtKind::Advance),
            amount: Some(dec!(10)),
            ..DebtDraft::default()
        },
    )
    .unwrap();

    store.remove_user(user.id).unwrap();

    let raw = rusqlite::Connection::open(&path).unwrap();
    for table in ["users", "settings", "transactions", "debts"] {
        let count: i64 = raw
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0, "{} not emptied", table);
    }

    let err = store.remove_user(user.id).unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
    let err = store.find_user("amira").unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

#[test]
fn ids_are_never_reused() {
    let dir = tempdir().unwrap();
    let store = LedgerStore::open(dir.path().join("till.sqlite")).unwrap();
    let user = store.create_user("amira").unwrap();

    let first = transactions::create(&store, user.id, txn("2025-01-02", "1")).unwrap();
    transactions::delete(&store, user.id, first.id).unwrap();
    let second = transactions::create(&store, user.id, txn("2025-01-03", "2")).unwrap();
    assert!(second.id > first.id);
}

#[test]
fn concurrent_field_updates_are_both_kept() {
    let dir = tempdir().unwrap();
    let store = LedgerStore::open(dir.path().join("till.sqlite")).unwrap();
    let user = store.create_user("amira").unwrap();
    let t = transactions::create(&store, user.id, txn("2025-01-02", "100")).unwrap();

    // Two writers patch different fields of the same row. The per-user
    // lock makes each one merge against the other's committed state, so
    // neither change can be lost.
    std::thread::scope(|s| {
        s.spawn(|| {
            let patch = TxnDraft {
                category: Some("Utilities".into()),
                ..TxnDraft::default()
            };
            transactions::update(&store, user.id, t.id, patch).unwrap();
        });
        s.spawn(|| {
            let patch = TxnDraft {
                notes: Some("checked".into()),
                ..TxnDraft::default()
            };
            transactions::update(&store, user.id, t.id, patch).unwrap();
        });
    });

    let merged = transactions::find(&store, user.id, t.id).unwrap();
    assert_eq!(merged.category, "Utilities");
    assert_eq!(merged.notes.as_deref(), Some("checked"));
}

#[test]
fn separate_users_write_in_parallel() {
    let dir = tempdir().unwrap();
    let store = LedgerStore::open(dir.path().join("till.sqlite")).unwrap();
    let amira = store.create_user("amira").unwrap();
    let ben = store.create_user("ben").unwrap();

    std::thread::scope(|s| {
        s.spawn(|| {
            for i in 0..10 {
                transactions::create(&store, amira.id, txn("2025-01-02", &format!("{}", i)))
                    .unwrap();
            }
        });
        s.spawn(|| {
            for i in 0..10 {
                transactions::create(&store, ben.id, txn("2025-01-02", &format!("{}", i)))
                    .unwrap();
            }
        });
    });

    let a_rows = transactions::list(&store, amira.id, &TxnFilter::default()).unwrap();
    let b_rows = transactions::list(&store, ben.id, &TxnFilter::default()).unwrap();
    assert_eq!(a_rows.len(), 10);
    assert_eq!(b_rows.len(), 10);

    let mut ids: Vec<i64> = a_rows.iter().chain(b_rows.iter()).map(|t| t.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 20, "record ids must be unique across users");
}

#[test]
fn committed_writes_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("till.sqlite");

    let uid = {
        let store = LedgerStore::open(&path).unwrap();
        let user = store.create_user("amira").unwrap();
        settings::update(
            &store,
            user.id,
            tillbook::models::SettingsPatch {
                tax_income_rate: Some(dec!(15)),
                ..Default::default()
            },
        )
        .unwrap();
        transactions::create(&store, user.id, txn("2025-01-02", "1000")).unwrap();
        user.id
    };

    let store = LedgerStore::open(&path).unwrap();
    let rows = transactions::list(&store, uid, &TxnFilter::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].tax.to_string(), "150.00");
    assert_eq!(settings::get(&store, uid).unwrap().tax_income_rate, dec!(15));
}
