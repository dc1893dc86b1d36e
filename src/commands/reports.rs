// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::resolve_user;
use crate::ledger::{settings, transactions};
use crate::models::{Transaction, TxnFilter, TxnKind};
use crate::store::LedgerStore;
use crate::utils::{fmt_money, maybe_print_json, month_bounds, pretty_table};

pub fn handle(store: &LedgerStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(store, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub month: Option<String>,
    pub income_base: Decimal,
    pub income_tax: Decimal,
    pub income_total: Decimal,
    pub expense_base: Decimal,
    pub expense_tax: Decimal,
    pub expense_total: Decimal,
    pub net_total: Decimal,
}

/// Fold transactions into per-kind totals. Sums are over the stored
/// derived fields, so the report never re-runs tax derivation.
pub fn summarize(month: Option<String>, txns: &[Transaction]) -> Summary {
    let mut s = Summary {
        month,
        income_base: Decimal::ZERO,
        income_tax: Decimal::ZERO,
        income_total: Decimal::ZERO,
        expense_base: Decimal::ZERO,
        expense_tax: Decimal::ZERO,
        expense_total: Decimal::ZERO,
        net_total: Decimal::ZERO,
    };
    for t in txns {
        match t.kind {
            TxnKind::Income => {
                s.income_base += t.base;
                s.income_tax += t.tax;
                s.income_total += t.total;
            }
            TxnKind::Expense => {
                s.expense_base += t.base;
                s.expense_tax += t.tax;
                s.expense_total += t.total;
            }
        }
    }
    s.net_total = s.income_total - s.expense_total;
    s
}

fn summary(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = resolve_user(store, sub)?;
    let cfg = settings::get(store, user.id)?;

    let mut filter = TxnFilter::default();
    let month = sub.get_one::<String>("month").cloned();
    if let Some(m) = &month {
        let (first, last) = month_bounds(m)?;
        filter.from = Some(first);
        filter.to = Some(last);
    }
    let txns = transactions::list(store, user.id, &filter)?;
    let s = summarize(month, &txns);

    if !maybe_print_json(json_flag, jsonl_flag, &s)? {
        let rows = vec![
            vec![
                "income".to_string(),
                fmt_money(&s.income_base, &cfg.currency),
                fmt_money(&s.income_tax, &cfg.currency),
                fmt_money(&s.income_total, &cfg.currency),
            ],
            vec![
                "expense".to_string(),
                fmt_money(&s.expense_base, &cfg.currency),
                fmt_money(&s.expense_tax, &cfg.currency),
                fmt_money(&s.expense_total, &cfg.currency),
            ],
            vec![
                "net".to_string(),
                String::new(),
                String::new(),
                fmt_money(&s.net_total, &cfg.currency),
            ],
        ];
        println!("{}", pretty_table(&["Kind", "Base", "Tax", "Total"], rows));
        if s.month.is_some()
            && cfg.monthly_expense_cap > Decimal::ZERO
            && s.expense_total > cfg.monthly_expense_cap
        {
            println!(
                "Note: expenses {} exceed the monthly cap {}",
                fmt_money(&s.expense_total, &cfg.currency),
                fmt_money(&cfg.monthly_expense_cap, &cfg.currency)
            );
        }
    }
    Ok(())
}
