// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal_macros::dec;
use tempfile::tempdir;

use tillbook::cli;
use tillbook::commands::exporter;
use tillbook::ledger::{debts, settings, transactions};
use tillbook::models::{DebtDraft, DebtKind, SettingsPatch, TxnDraft, TxnKind};
use tillbook::store::LedgerStore;

fn seeded_store(dir: &tempfile::TempDir) -> LedgerStore {
    let store = LedgerStore::open(dir.path().join("till.sqlite")).unwrap();
    let user = store.create_user("amira").unwrap();
    settings::update(
        &store,
        user.id,
        SettingsPatch {
            tax_income_rate: Some(dec!(15)),
            ..SettingsPatch::default()
        },
    )
    .unwrap();
    transactions::create(
        &store,
        user.id,
        TxnDraft {
            date: Some("2025-01-05".parse().unwrap()),
            kind: Some(TxnKind::Income),
            category: Some("Sales".into()),
            base: Some(dec!(1000)),
            ..TxnDraft::default()
        },
    )
    .unwrap();
    transactions::create(
        &store,
        user.id,
        TxnDraft {
            date: Some("2025-01-02".parse().unwrap()),
            kind: Some(TxnKind::Expense),
            category: Some("Supplies".into()),
            base: Some(dec!(40)),
            notes: Some("mops".into()),
            ..TxnDraft::default()
        },
    )
    .unwrap();
    debts::create(
        &store,
        user.id,
        DebtDraft {
            date: Some("2025-01-03".parse().unwrap()),
            employee: Some("Bob".into()),
            kind: Some(DebtKind::Advance),
            amount: Some(dec!(100)),
            ..DebtDraft::default()
        },
    )
    .unwrap();
    store
}

fn run_export(store: &LedgerStore, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["tillbook", "export"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(store, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_transactions_streams_pretty_json_chronologically() {
    let dir = tempdir().unwrap();
    let store = seeded_store(&dir);
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(
        &store,
        &["transactions", "--user", "amira", "--format", "json", "--out", &out_str],
    )
    .unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 2);
    // oldest entry first in a backup
    assert_eq!(items[0]["date"], "2025-01-02");
    assert_eq!(items[0]["kind"], "expense");
    assert_eq!(items[0]["notes"], "mops");
    assert_eq!(items[1]["date"], "2025-01-05");
    assert_eq!(items[1]["base"], "1000");
    assert_eq!(items[1]["tax"], "150.00");
    assert_eq!(items[1]["total"], "1150.00");
}

#[test]
fn export_transactions_writes_csv_with_header() {
    let dir = tempdir().unwrap();
    let store = seeded_store(&dir);
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(
        &store,
        &["transactions", "--user", "amira", "--format", "csv", "--out", &out_str],
    )
    .unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines[0],
        "id,date,kind,category,base,tax,total,employee,notes,created_at"
    );
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("2025-01-02"));
    assert!(lines[2].contains("2025-01-05"));
}

#[test]
fn export_debts_covers_both_formats() {
    let dir = tempdir().unwrap();
    let store = seeded_store(&dir);
    let out_path = dir.path().join("debts.json");
    let out_str = out_path.to_string_lossy().to_string();

    run_export(
        &store,
        &["debts", "--user", "amira", "--format", "json", "--out", &out_str],
    )
    .unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(parsed[0]["employee"], "Bob");
    assert_eq!(parsed[0]["kind"], "advance");
    assert_eq!(parsed[0]["delta"], "100");

    let csv_path = dir.path().join("debts.csv");
    let csv_str = csv_path.to_string_lossy().to_string();
    run_export(
        &store,
        &["debts", "--user", "amira", "--format", "csv", "--out", &csv_str],
    )
    .unwrap();
    let contents = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "id,date,employee,kind,amount,delta,notes,created_at");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("Bob"));
}

#[test]
fn export_rejects_unknown_format_without_creating_the_file() {
    let dir = tempdir().unwrap();
    let store = seeded_store(&dir);
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    let err = run_export(
        &store,
        &["transactions", "--user", "amira", "--format", "xml", "--out", &out_str],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Unknown format"));
    assert!(!out_path.exists());
}

#[test]
fn export_for_an_unknown_user_fails() {
    let dir = tempdir().unwrap();
    let store = seeded_store(&dir);
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    let err = run_export(
        &store,
        &["transactions", "--user", "nobody", "--format", "json", "--out", &out_str],
    )
    .unwrap_err();
    assert!(err.to_string().contains("nobody"));
    assert!(!out_path.exists());
}
