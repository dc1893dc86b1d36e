// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use crate::commands::resolve_user;
use crate::ledger::{debts, transactions};
use crate::models::{DebtFilter, TxnFilter};
use crate::store::LedgerStore;

pub fn handle(store: &LedgerStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(store, sub),
        Some(("debts", sub)) => export_debts(store, sub),
        _ => Ok(()),
    }
}

fn export_transactions(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(store, sub)?;
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut rows = transactions::list(store, user.id, &TxnFilter::default())?;
    // Backups are chronological; the list order is newest-first.
    rows.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "date",
                "kind",
                "category",
                "base",
                "tax",
                "total",
                "employee",
                "notes",
                "created_at",
            ])?;
            for t in &rows {
                wtr.write_record([
                    t.id.to_string(),
                    t.date.to_string(),
                    t.kind.to_string(),
                    t.category.clone(),
                    t.base.to_string(),
                    t.tax.to_string(),
                    t.total.to_string(),
                    t.employee.clone().unwrap_or_default(),
                    t.notes.clone().unwrap_or_default(),
                    t.created_at.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}

fn export_debts(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(store, sub)?;
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let rows = debts::list(store, user.id, &DebtFilter::default())?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "date",
                "employee",
                "kind",
                "amount",
                "delta",
                "notes",
                "created_at",
            ])?;
            for d in &rows {
                wtr.write_record([
                    d.id.to_string(),
                    d.date.to_string(),
                    d.employee.clone(),
                    d.kind.to_string(),
                    d.amount.to_string(),
                    d.delta.to_string(),
                    d.notes.clone().unwrap_or_default(),
                    d.created_at.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} debts to {}", rows.len(), out);
    Ok(())
}
