// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::store::LedgerStore;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(store: &LedgerStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("rm", sub)) => rm(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let user = store.create_user(name)?;
    println!("Created user '{}' (id {})", user.name, user.id);
    Ok(())
}

fn list(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let users = store.list_users()?;
    if !maybe_print_json(json_flag, jsonl_flag, &users)? {
        let rows: Vec<Vec<String>> = users
            .iter()
            .map(|u| vec![u.id.to_string(), u.name.clone(), u.created_at.clone()])
            .collect();
        println!("{}", pretty_table(&["ID", "Name", "Created"], rows));
    }
    Ok(())
}

fn rm(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let user = store.find_user(name)?;
    store.remove_user(user.id)?;
    println!("Removed user '{}' and their ledger", user.name);
    Ok(())
}
