// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use rusqlite::{Connection, Row, TransactionBehavior, params, params_from_iter};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::LedgerError;
use crate::ledger::settings;
use crate::models::{Debt, DebtDraft, DebtFilter, DebtKind, EmployeeBalance};
use crate::store::{LedgerStore, decimal_column, now_utc};

/// List a user's debt movements in running-ledger order: oldest first
/// (date, then created_at, then id, all ascending).
pub fn list(
    store: &LedgerStore,
    user_id: i64,
    filter: &DebtFilter,
) -> Result<Vec<Debt>, LedgerError> {
    let conn = store.connect()?;
    let mut sql = String::from(
        "SELECT id, user_id, date, employee, kind, amount, delta, notes, created_at
         FROM debts WHERE user_id = ?",
    );
    let mut args: Vec<String> = vec![user_id.to_string()];

    if let Some(kind) = filter.kind {
        sql.push_str(" AND kind = ?");
        args.push(kind.as_str().to_string());
    }
    if let Some(employee) = &filter.employee {
        sql.push_str(" AND LOWER(employee) = LOWER(?)");
        args.push(employee.clone());
    }
    if let Some(from) = filter.from {
        sql.push_str(" AND date >= ?");
        args.push(from.to_string());
    }
    if let Some(to) = filter.to {
        sql.push_str(" AND date <= ?");
        args.push(to.to_string());
    }
    sql.push_str(" ORDER BY date ASC, created_at ASC, id ASC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        args.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(args.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(row_to_debt(row)?);
    }
    Ok(out)
}

/// Fetch one debt by id, scoped to its owner.
pub fn find(store: &LedgerStore, user_id: i64, id: i64) -> Result<Debt, LedgerError> {
    let conn = store.connect()?;
    fetch_one(&conn, user_id, id)
}

/// Record an advance or repayment.
///
/// `date`, `employee`, `kind`, and `amount` are required; `amount` is a
/// magnitude and must not be negative. The signed `delta` is derived
/// (`+amount` for advance, `-amount` for repay); a delta carried by the
/// draft is discarded. The empty employee string is legal and forms its
/// own balance bucket.
pub fn create(store: &LedgerStore, user_id: i64, draft: DebtDraft) -> Result<Debt, LedgerError> {
    let date = draft.date.ok_or(LedgerError::MissingField("date"))?;
    let employee = draft.employee.ok_or(LedgerError::MissingField("employee"))?;
    let kind = draft.kind.ok_or(LedgerError::MissingField("kind"))?;
    let amount = draft.amount.ok_or(LedgerError::MissingField("amount"))?;
    validate_amount(amount)?;
    let delta = delta_for(kind, amount);

    store.with_user_lock(user_id, |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        settings::ensure(&tx, user_id)?;
        let created_at = now_utc();
        tx.execute(
            "INSERT INTO debts(user_id, date, employee, kind, amount, delta, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user_id,
                date,
                employee,
                kind.as_str(),
                amount.to_string(),
                delta.to_string(),
                draft.notes,
                created_at
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        debug!(user_id, id, "debt recorded");
        Ok(Debt {
            id,
            user_id,
            date,
            employee,
            kind,
            amount,
            delta,
            notes: draft.notes,
            created_at,
        })
    })
}

/// Merge a draft onto a stored debt and persist the result. The delta is
/// re-derived from the merged kind and amount, so flipping `advance` to
/// `repay` flips the sign even when the amount is untouched.
pub fn update(
    store: &LedgerStore,
    user_id: i64,
    id: i64,
    draft: DebtDraft,
) -> Result<Debt, LedgerError> {
    store.with_user_lock(user_id, |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let stored = fetch_one(&tx, user_id, id)?;

        let date = draft.date.unwrap_or(stored.date);
        let employee = draft.employee.unwrap_or(stored.employee);
        let kind = draft.kind.unwrap_or(stored.kind);
        let amount = draft.amount.unwrap_or(stored.amount);
        let notes = draft.notes.or(stored.notes);
        validate_amount(amount)?;
        let delta = delta_for(kind, amount);

        tx.execute(
            "UPDATE debts
             SET date=?1, employee=?2, kind=?3, amount=?4, delta=?5, notes=?6
             WHERE id=?7 AND user_id=?8",
            params![
                date,
                employee,
                kind.as_str(),
                amount.to_string(),
                delta.to_string(),
                notes,
                id,
                user_id
            ],
        )?;
        tx.commit()?;
        debug!(user_id, id, "debt updated");
        Ok(Debt {
            id,
            user_id,
            date,
            employee,
            kind,
            amount,
            delta,
            notes,
            created_at: stored.created_at,
        })
    })
}

/// Delete a debt. Absent and foreign-owned ids both report not-found.
pub fn delete(store: &LedgerStore, user_id: i64, id: i64) -> Result<(), LedgerError> {
    store.with_user_lock(user_id, |conn| {
        let n = conn.execute(
            "DELETE FROM debts WHERE id=?1 AND user_id=?2",
            params![id, user_id],
        )?;
        if n == 0 {
            return Err(LedgerError::DebtNotFound(id));
        }
        debug!(user_id, id, "debt deleted");
        Ok(())
    })
}

/// Aggregate per-employee positions in one pass over the user's debts.
///
/// Grouping is by the exact stored employee string; the empty string is
/// its own bucket. Balances are recomputed from the ledger on every call,
/// never cached.
pub fn balances(
    store: &LedgerStore,
    user_id: i64,
) -> Result<BTreeMap<String, EmployeeBalance>, LedgerError> {
    let conn = store.connect()?;
    let mut stmt = conn.prepare("SELECT employee, kind, amount FROM debts WHERE user_id = ?1")?;
    let mut rows = stmt.query(params![user_id])?;
    let mut out: BTreeMap<String, EmployeeBalance> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let employee: String = row.get(0)?;
        let kind: String = row.get(1)?;
        let amount = decimal_column(row, 2)?;
        let entry = out.entry(employee).or_default();
        match kind.parse::<DebtKind>()? {
            DebtKind::Advance => entry.advances += amount,
            DebtKind::Repay => entry.repayments += amount,
        }
    }
    for position in out.values_mut() {
        position.balance = position.advances - position.repayments;
    }
    Ok(out)
}

fn delta_for(kind: DebtKind, amount: Decimal) -> Decimal {
    match kind {
        DebtKind::Advance => amount,
        DebtKind::Repay => -amount,
    }
}

fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::InvalidInput {
            field: "amount",
            reason: format!("must not be negative, got {amount}"),
        });
    }
    Ok(())
}

pub(crate) fn fetch_one(conn: &Connection, user_id: i64, id: i64) -> Result<Debt, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, date, employee, kind, amount, delta, notes, created_at
         FROM debts WHERE id=?1 AND user_id=?2",
    )?;
    let mut rows = stmt.query(params![id, user_id])?;
    match rows.next()? {
        Some(row) => row_to_debt(row),
        None => Err(LedgerError::DebtNotFound(id)),
    }
}

fn row_to_debt(row: &Row<'_>) -> Result<Debt, LedgerError> {
    let kind: String = row.get(4)?;
    Ok(Debt {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: row.get(2)?,
        employee: row.get(3)?,
        kind: kind.parse()?,
        amount: decimal_column(row, 5)?,
        delta: decimal_column(row, 6)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn delta_signs_follow_the_kind() {
        assert_eq!(delta_for(DebtKind::Advance, dec!(100)), dec!(100));
        assert_eq!(delta_for(DebtKind::Repay, dec!(100)), dec!(-100));
        assert_eq!(delta_for(DebtKind::Repay, dec!(0)), dec!(0));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let err = validate_amount(dec!(-0.01)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(validate_amount(dec!(0)).is_ok());
    }
}
