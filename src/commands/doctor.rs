// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::Serialize;

use crate::ledger::{debts, settings, transactions};
use crate::models::{DebtFilter, DebtKind, TxnFilter};
use crate::store::LedgerStore;
use crate::tax;
use crate::utils::{maybe_print_json, pretty_table};

#[derive(Debug, Serialize)]
pub struct Issue {
    pub kind: String,
    pub detail: String,
}

pub fn handle(store: &LedgerStore, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let issues = audit(store)?;
    if !maybe_print_json(json_flag, jsonl_flag, &issues)? {
        if issues.is_empty() {
            println!("doctor: no issues found");
        } else {
            let rows = issues
                .into_iter()
                .map(|i| vec![i.kind, i.detail])
                .collect();
            println!("{}", pretty_table(&["Issue", "Detail"], rows));
        }
    }
    Ok(())
}

/// Re-derive every stored derived field and report drift.
///
/// `total_mismatch` and `delta_mismatch` indicate real corruption: those
/// fields must agree with the row they sit in regardless of any settings
/// change. `rate_drift` only means the row was written under a different
/// tax rate than the current one, which editing the row would re-derive
/// (or reject, when the base overflows at that rate).
pub fn audit(store: &LedgerStore) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();

    for user in store.list_users()? {
        let cfg = settings::get(store, user.id)?;

        for t in transactions::list(store, user.id, &TxnFilter::default())? {
            // an unrepresentable true sum cannot equal the stored total
            let consistent = match t.base.checked_add(t.tax) {
                Some(sum) => tax::round2(sum) == t.total,
                None => false,
            };
            if !consistent {
                issues.push(Issue {
                    kind: "total_mismatch".into(),
                    detail: format!(
                        "user '{}' tx {}: base {} + tax {} != total {}",
                        user.name, t.id, t.base, t.tax, t.total
                    ),
                });
                continue;
            }
            match tax::compute(t.base, cfg.rate_for(t.kind)) {
                Ok(derived) if derived.tax == t.tax => {}
                Ok(derived) => issues.push(Issue {
                    kind: "rate_drift".into(),
                    detail: format!(
                        "user '{}' tx {}: stored tax {}, current rate would give {}",
                        user.name, t.id, t.tax, derived.tax
                    ),
                }),
                Err(_) => issues.push(Issue {
                    kind: "rate_drift".into(),
                    detail: format!(
                        "user '{}' tx {}: stored tax {} cannot be re-derived at the current rate",
                        user.name, t.id, t.tax
                    ),
                }),
            }
        }

        for d in debts::list(store, user.id, &DebtFilter::default())? {
            let expected = match d.kind {
                DebtKind::Advance => d.amount,
                DebtKind::Repay => -d.amount,
            };
            if expected != d.delta {
                issues.push(Issue {
                    kind: "delta_mismatch".into(),
                    detail: format!(
                        "user '{}' debt {}: {} of {} carries delta {}",
                        user.name, d.id, d.kind, d.amount, d.delta
                    ),
                });
            }
        }
    }

    Ok(issues)
}
