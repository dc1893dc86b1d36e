// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod debts;
pub mod doctor;
pub mod exporter;
pub mod reports;
pub mod settings;
pub mod transactions;
pub mod users;

use anyhow::Result;

use crate::models::User;
use crate::store::LedgerStore;

/// Turn the required `--user` flag into a verified user record.
pub(crate) fn resolve_user(store: &LedgerStore, m: &clap::ArgMatches) -> Result<User> {
    let name = m.get_one::<String>("user").unwrap();
    Ok(store.find_user(name)?)
}
