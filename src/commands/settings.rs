// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;

use crate::commands::resolve_user;
use crate::ledger::settings;
use crate::models::{Settings, SettingsPatch};
use crate::store::LedgerStore;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table, split_list};

pub fn handle(store: &LedgerStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(store, sub)?,
        Some(("set", sub)) => set(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn show(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = resolve_user(store, sub)?;
    let settings = settings::get(store, user.id)?;
    if !maybe_print_json(json_flag, jsonl_flag, &settings)? {
        println!("{}", pretty_table(&["Setting", "Value"], settings_rows(&settings)));
    }
    Ok(())
}

fn set(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(store, sub)?;
    let patch = SettingsPatch {
        currency: sub.get_one::<String>("currency").cloned(),
        tax_income_rate: opt_decimal(sub, "tax-income-rate")?,
        tax_expense_rate: opt_decimal(sub, "tax-expense-rate")?,
        monthly_expense_cap: opt_decimal(sub, "monthly-cap")?,
        categories: sub.get_one::<String>("categories").map(|s| split_list(s)),
        payment_methods: sub
            .get_one::<String>("payment-methods")
            .map(|s| split_list(s)),
    };
    if patch.is_empty() {
        println!("Nothing to change for '{}'", user.name);
        return Ok(());
    }
    let settings = settings::update(store, user.id, patch)?;
    println!("Updated settings for '{}'", user.name);
    println!("{}", pretty_table(&["Setting", "Value"], settings_rows(&settings)));
    Ok(())
}

fn settings_rows(s: &Settings) -> Vec<Vec<String>> {
    vec![
        vec!["currency".into(), s.currency.clone()],
        vec!["tax_income_rate".into(), format!("{}%", s.tax_income_rate)],
        vec!["tax_expense_rate".into(), format!("{}%", s.tax_expense_rate)],
        vec![
            "monthly_expense_cap".into(),
            s.monthly_expense_cap.to_string(),
        ],
        vec!["categories".into(), s.categories.join(", ")],
        vec!["payment_methods".into(), s.payment_methods.join(", ")],
    ]
}

fn opt_decimal(sub: &clap::ArgMatches, key: &str) -> Result<Option<Decimal>> {
    sub.get_one::<String>(key).map(|s| parse_decimal(s)).transpose()
}
