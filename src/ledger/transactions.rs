// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, Row, TransactionBehavior, params, params_from_iter};
use tracing::debug;

use crate::error::LedgerError;
use crate::ledger::settings;
use crate::models::{Transaction, TxnDraft, TxnFilter};
use crate::store::{LedgerStore, decimal_column, now_utc};
use crate::tax;

/// List a user's transactions, newest first (date, then created_at, then
/// id, all descending). Clients rely on this order.
pub fn list(
    store: &LedgerStore,
    user_id: i64,
    filter: &TxnFilter,
) -> Result<Vec<Transaction>, LedgerError> {
    let conn = store.connect()?;
    let mut sql = String::from(
        "SELECT id, user_id, date, kind, category, base, tax, total, employee, notes, created_at
         FROM transactions WHERE user_id = ?",
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
    sql.push_str(" ORDER BY date DESC, created_at DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        args.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(args.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(row_to_txn(row)?);
    }
    Ok(out)
}

/// Fetch one transaction by id, scoped to its owner.
pub fn find(store: &LedgerStore, user_id: i64, id: i64) -> Result<Transaction, LedgerError> {
    let conn = store.connect()?;
    fetch_one(&conn, user_id, id)
}

/// Record a new transaction.
///
/// `date`, `kind`, `category`, and `base` are required. Tax and total are
/// derived from the user's rate for `kind` at this moment; any derived
/// values carried by the draft are discarded. Derivation and insert
/// commit in one store transaction.
pub fn create(
    store: &LedgerStore,
    user_id: i64,
    draft: TxnDraft,
) -> Result<Transaction, LedgerError> {
    let date = draft.date.ok_or(LedgerError::MissingField("date"))?;
    let kind = draft.kind.ok_or(LedgerError::MissingField("kind"))?;
    let category = draft.category.ok_or(LedgerError::MissingField("category"))?;
    let base = draft.base.ok_or(LedgerError::MissingField("base"))?;

    store.with_user_lock(user_id, |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        settings::ensure(&tx, user_id)?;
        let settings = settings::fetch(&tx, user_id)?;
        let derived = tax::compute(base, settings.rate_for(kind))?;
        let created_at = now_utc();
        tx.execute(
            "INSERT INTO transactions(user_id, date, kind, category, base, tax, total, employee, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                user_id,
                date,
                kind.as_str(),
                category,
                base.to_string(),
                derived.tax.to_string(),
                derived.total.to_string(),
                draft.employee,
                draft.notes,
                created_at
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        debug!(user_id, id, "transaction recorded");
        Ok(Transaction {
            id,
            user_id,
            date,
            kind,
            category,
            base,
            tax: derived.tax,
            total: derived.total,
            employee: draft.employee,
            notes: draft.notes,
            created_at,
        })
    })
}

/// Merge a draft onto a stored transaction and persist the result.
///
/// Omitted fields keep their stored values; `tax`/`total` are always
/// recomputed from the merged base and kind at the rate current *now*,
/// not the rate that applied when the record was created.
pub fn update(
    store: &LedgerStore,
    user_id: i64,
    id: i64,
    draft: TxnDraft,
) -> Result<Transaction, LedgerError> {
    store.with_user_lock(user_id, |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let stored = fetch_one(&tx, user_id, id)?;

        let date = draft.date.unwrap_or(stored.date);
        let kind = draft.kind.unwrap_or(stored.kind);
        let category = draft.category.unwrap_or(stored.category);
        let base = draft.base.unwrap_or(stored.base);
        let employee = draft.employee.or(stored.employee);
        let notes = draft.notes.or(stored.notes);

        settings::ensure(&tx, user_id)?;
        let settings = settings::fetch(&tx, user_id)?;
        let derived = tax::compute(base, settings.rate_for(kind))?;
        tx.execute(
            "UPDATE transactions
             SET date=?1, kind=?2, category=?3, base=?4, tax=?5, total=?6, employee=?7, notes=?8
             WHERE id=?9 AND user_id=?10",
            params![
                date,
                kind.as_str(),
                category,
                base.to_string(),
                derived.tax.to_string(),
                derived.total.to_string(),
                employee,
                notes,
                id,
                user_id
            ],
        )?;
        tx.commit()?;
        debug!(user_id, id, "transaction updated");
        Ok(Transaction {
            id,
            user_id,
            date,
            kind,
            category,
            base,
            tax: derived.tax,
            total: derived.total,
            employee,
            notes,
            created_at: stored.created_at,
        })
    })
}

/// Delete a transaction. An id that is absent, or that belongs to a
/// different user, reports not-found; deletion is never silently skipped.
pub fn delete(store: &LedgerStore, user_id: i64, id: i64) -> Result<(), LedgerError> {
    store.with_user_lock(user_id, |conn| {
        let n = conn.execute(
            "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
            params![id, user_id],
        )?;
        if n == 0 {
            return Err(LedgerError::TransactionNotFound(id));
        }
        debug!(user_id, id, "transaction deleted");
        Ok(())
    })
}

pub(crate) fn fetch_one(
    conn: &Connection,
    user_id: i64,
    id: i64,
) -> Result<Transaction, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, date, kind, category, base, tax, total, employee, notes, created_at
         FROM transactions WHERE id=?1 AND user_id=?2",
    )?;
    let mut rows = stmt.query(params![id, user_id])?;
    match rows.next()? {
        Some(row) => row_to_txn(row),
        None => Err(LedgerError::TransactionNotFound(id)),
    }
}

fn row_to_txn(row: &Row<'_>) -> Result<Transaction, LedgerError> {
    let kind: String = row.get(3)?;
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: row.get(2)?,
        kind: kind.parse()?,
        category: row.get(4)?,
        base: decimal_column(row, 5)?,
        tax: decimal_column(row, 6)?,
        total: decimal_column(row, 7)?,
        employee: row.get(8)?,
        notes: row.get(9)?,
        created_at: row.get(10)?,
    })
}
