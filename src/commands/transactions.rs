// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::commands::resolve_user;
use crate::ledger::transactions;
use crate::models::{Transaction, TxnDraft, TxnFilter};
use crate::store::LedgerStore;
use crate::utils::{maybe_print_json, month_bounds, parse_date, parse_decimal, pretty_table};

pub fn handle(store: &LedgerStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("show", sub)) => show(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(store, sub)?;
    let draft = TxnDraft {
        date: Some(parse_date(sub.get_one::<String>("date").unwrap())?),
        kind: Some(sub.get_one::<String>("kind").unwrap().parse()?),
        category: sub.get_one::<String>("category").cloned(),
        base: Some(parse_decimal(sub.get_one::<String>("base").unwrap())?),
        employee: sub.get_one::<String>("employee").cloned(),
        notes: sub.get_one::<String>("notes").cloned(),
        ..TxnDraft::default()
    };
    let txn = transactions::create(store, user.id, draft)?;
    println!(
        "Recorded {} {} of {} on {} (tax {}, total {})",
        txn.kind, txn.category, txn.base, txn.date, txn.tax, txn.total
    );
    Ok(())
}

fn list(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = resolve_user(store, sub)?;
    let filter = filter_from_args(sub)?;
    let data = transactions::list(store, user.id, &filter)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data.iter().map(txn_row).collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Kind", "Category", "Base", "Tax", "Total", "Employee", "Notes"],
                rows,
            )
        );
    }
    Ok(())
}

fn show(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = resolve_user(store, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let txn = transactions::find(store, user.id, id)?;
    if !maybe_print_json(json_flag, jsonl_flag, &txn)? {
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Kind", "Category", "Base", "Tax", "Total", "Employee", "Notes"],
                vec![txn_row(&txn)],
            )
        );
    }
    Ok(())
}

fn edit(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(store, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let draft = TxnDraft {
        date: sub
            .get_one::<String>("date")
            .map(|s| parse_date(s))
            .transpose()?,
        kind: sub
            .get_one::<String>("kind")
            .map(|s| s.parse())
            .transpose()?,
        category: sub.get_one::<String>("category").cloned(),
        base: sub
            .get_one::<String>("base")
            .map(|s| parse_decimal(s))
            .transpose()?,
        employee: sub.get_one::<String>("employee").cloned(),
        notes: sub.get_one::<String>("notes").cloned(),
        ..TxnDraft::default()
    };
    let txn = transactions::update(store, user.id, id, draft)?;
    println!(
        "Updated transaction {} (tax {}, total {})",
        txn.id, txn.tax, txn.total
    );
    Ok(())
}

fn rm(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(store, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    transactions::delete(store, user.id, id)?;
    println!("Deleted transaction {}", id);
    Ok(())
}

pub fn filter_from_args(sub: &clap::ArgMatches) -> Result<TxnFilter> {
    let mut filter = TxnFilter {
        kind: sub
            .get_one::<String>("kind")
            .map(|s| s.parse())
            .transpose()?,
        employee: sub.get_one::<String>("employee").cloned(),
        from: sub
            .get_one::<String>("from")
            .map(|s| parse_date(s))
            .transpose()?,
        to: sub
            .get_one::<String>("to")
            .map(|s| parse_date(s))
            .transpose()?,
        limit: sub.get_one::<usize>("limit").copied(),
    };
    if let Some(month) = sub.get_one::<String>("month") {
        let (first, last) = month_bounds(month)?;
        filter.from = Some(first);
        filter.to = Some(last);
    }
    Ok(filter)
}

fn txn_row(t: &Transaction) -> Vec<String> {
    vec![
        t.id.to_string(),
        t.date.to_string(),
        t.kind.to_string(),
        t.category.clone(),
        t.base.to_string(),
        t.tax.to_string(),
        t.total.to_string(),
        t.employee.clone().unwrap_or_default(),
        t.notes.clone().unwrap_or_default(),
    ]
}
