// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::commands::resolve_user;
use crate::ledger::{debts, settings};
use crate::models::{Debt, DebtDraft, DebtFilter};
use crate::store::LedgerStore;
use crate::utils::{
    fmt_money, maybe_print_json, month_bounds, parse_date, parse_decimal, pretty_table,
};

pub fn handle(store: &LedgerStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("show", sub)) => show(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        Some(("balances", sub)) => balances(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(store, sub)?;
    let draft = DebtDraft {
        date: Some(parse_date(sub.get_one::<String>("date").unwrap())?),
        employee: sub.get_one::<String>("employee").cloned(),
        kind: Some(sub.get_one::<String>("kind").unwrap().parse()?),
        amount: Some(parse_decimal(sub.get_one::<String>("amount").unwrap())?),
        notes: sub.get_one::<String>("notes").cloned(),
        ..DebtDraft::default()
    };
    let debt = debts::create(store, user.id, draft)?;
    println!(
        "Recorded {} of {} for '{}' on {} (delta {})",
        debt.kind,
        debt.amount,
        display_employee(&debt.employee),
        debt.date,
        debt.delta
    );
    Ok(())
}

fn list(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = resolve_user(store, sub)?;
    let mut filter = DebtFilter {
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
    let data = debts::list(store, user.id, &filter)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data.iter().map(debt_row).collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Employee", "Kind", "Amount", "Delta", "Notes"],
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
    let debt = debts::find(store, user.id, id)?;
    if !maybe_print_json(json_flag, jsonl_flag, &debt)? {
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Employee", "Kind", "Amount", "Delta", "Notes"],
                vec![debt_row(&debt)],
            )
        );
    }
    Ok(())
}

fn edit(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(store, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let draft = DebtDraft {
        date: sub
            .get_one::<String>("date")
            .map(|s| parse_date(s))
            .transpose()?,
        employee: sub.get_one::<String>("employee").cloned(),
        kind: sub
            .get_one::<String>("kind")
            .map(|s| s.parse())
            .transpose()?,
        amount: sub
            .get_one::<String>("amount")
            .map(|s| parse_decimal(s))
            .transpose()?,
        notes: sub.get_one::<String>("notes").cloned(),
        ..DebtDraft::default()
    };
    let debt = debts::update(store, user.id, id, draft)?;
    println!("Updated debt {} (delta {})", debt.id, debt.delta);
    Ok(())
}

fn rm(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(store, sub)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    debts::delete(store, user.id, id)?;
    println!("Deleted debt {}", id);
    Ok(())
}

fn balances(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = resolve_user(store, sub)?;
    let positions = debts::balances(store, user.id)?;
    if !maybe_print_json(json_flag, jsonl_flag, &positions)? {
        let ccy = settings::get(store, user.id)?.currency;
        let rows: Vec<Vec<String>> = positions
            .iter()
            .map(|(employee, p)| {
                vec![
                    display_employee(employee).to_string(),
                    fmt_money(&p.advances, &ccy),
                    fmt_money(&p.repayments, &ccy),
                    fmt_money(&p.balance, &ccy),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Employee", "Advances", "Repayments", "Balance"], rows)
        );
    }
    Ok(())
}

fn display_employee(employee: &str) -> &str {
    if employee.is_empty() {
        "(unassigned)"
    } else {
        employee
    }
}

fn debt_row(d: &Debt) -> Vec<String> {
    vec![
        d.id.to_string(),
        d.date.to_string(),
        display_employee(&d.employee).to_string(),
        d.kind.to_string(),
        d.amount.to_string(),
        d.delta.to_string(),
        d.notes.clone().unwrap_or_default(),
    ]
}
