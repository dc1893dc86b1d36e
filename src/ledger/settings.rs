// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use rust_decimal::Decimal;
use tracing::info;

use crate::error::LedgerError;
use crate::models::{Settings, SettingsPatch};
use crate::store::{LedgerStore, decimal_column};

/// Read a user's settings. A missing row is repaired with defaults, so
/// this only fails when the user itself does not exist.
pub fn get(store: &LedgerStore, user_id: i64) -> Result<Settings, LedgerError> {
    let conn = store.connect()?;
    ensure(&conn, user_id)?;
    fetch(&conn, user_id)
}

/// Merge a partial update onto the stored settings.
///
/// Omitted fields keep their values. Runs under the user's write lock so
/// a concurrent update cannot be lost between the read and the write.
pub fn update(
    store: &LedgerStore,
    user_id: i64,
    patch: SettingsPatch,
) -> Result<Settings, LedgerError> {
    validate(&patch)?;
    store.with_user_lock(user_id, |conn| {
        ensure(conn, user_id)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut merged = fetch(&tx, user_id)?;
        if let Some(currency) = patch.currency {
            merged.currency = currency.trim().to_string();
        }
        if let Some(rate) = patch.tax_income_rate {
            merged.tax_income_rate = rate;
        }
        if let Some(rate) = patch.tax_expense_rate {
            merged.tax_expense_rate = rate;
        }
        if let Some(cap) = patch.monthly_expense_cap {
            merged.monthly_expense_cap = cap;
        }
        if let Some(categories) = patch.categories {
            merged.categories = clean_vocab(categories);
        }
        if let Some(methods) = patch.payment_methods {
            merged.payment_methods = clean_vocab(methods);
        }
        tx.execute(
            "UPDATE settings
             SET currency=?1, tax_income_rate=?2, tax_expense_rate=?3,
                 monthly_expense_cap=?4, categories=?5, payment_methods=?6
             WHERE user_id=?7",
            params![
                merged.currency,
                merged.tax_income_rate.to_string(),
                merged.tax_expense_rate.to_string(),
                merged.monthly_expense_cap.to_string(),
                serde_json::to_string(&merged.categories)
                    .map_err(|e| invalid_list("categories", e))?,
                serde_json::to_string(&merged.payment_methods)
                    .map_err(|e| invalid_list("payment_methods", e))?,
                user_id
            ],
        )?;
        tx.commit()?;
        info!(user_id, "settings updated");
        Ok(merged)
    })
}

/// Verify the user exists and seed the default settings row if absent.
pub(crate) fn ensure(conn: &Connection, user_id: i64) -> Result<(), LedgerError> {
    let known: Option<i64> = conn
        .query_row("SELECT id FROM users WHERE id=?1", params![user_id], |r| {
            r.get(0)
        })
        .optional()?;
    if known.is_none() {
        return Err(LedgerError::UserNotFound(user_id.to_string()));
    }
    conn.execute(
        "INSERT OR IGNORE INTO settings(user_id) VALUES (?1)",
        params![user_id],
    )?;
    Ok(())
}

pub(crate) fn fetch(conn: &Connection, user_id: i64) -> Result<Settings, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT currency, tax_income_rate, tax_expense_rate, monthly_expense_cap,
                categories, payment_methods
         FROM settings WHERE user_id=?1",
    )?;
    let mut rows = stmt.query(params![user_id])?;
    match rows.next()? {
        Some(row) => Ok(Settings {
            user_id,
            currency: row.get(0)?,
            tax_income_rate: decimal_column(row, 1)?,
            tax_expense_rate: decimal_column(row, 2)?,
            monthly_expense_cap: decimal_column(row, 3)?,
            categories: list_column(row, 4)?,
            payment_methods: list_column(row, 5)?,
        }),
        None => Err(LedgerError::UserNotFound(user_id.to_string())),
    }
}

fn validate(patch: &SettingsPatch) -> Result<(), LedgerError> {
    if let Some(currency) = &patch.currency {
        if currency.trim().is_empty() {
            return Err(LedgerError::InvalidInput {
                field: "currency",
                reason: "must not be empty".to_string(),
            });
        }
    }
    if let Some(rate) = patch.tax_income_rate {
        validate_rate("tax_income_rate", rate)?;
    }
    if let Some(rate) = patch.tax_expense_rate {
        validate_rate("tax_expense_rate", rate)?;
    }
    if let Some(cap) = patch.monthly_expense_cap {
        if cap < Decimal::ZERO {
            return Err(LedgerError::InvalidInput {
                field: "monthly_expense_cap",
                reason: format!("must not be negative, got {cap}"),
            });
        }
    }
    Ok(())
}

fn validate_rate(field: &'static str, rate: Decimal) -> Result<(), LedgerError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(LedgerError::InvalidInput {
            field,
            reason: format!("rate must be between 0 and 100, got {rate}"),
        });
    }
    Ok(())
}

fn clean_vocab(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !out.iter().any(|seen| seen == item) {
            out.push(item.to_string());
        }
    }
    out
}

fn list_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn invalid_list(field: &'static str, err: serde_json::Error) -> LedgerError {
    LedgerError::InvalidInput {
        field,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocab_is_trimmed_and_deduplicated() {
        let cleaned = clean_vocab(vec![
            " Coffee ".into(),
            "Coffee".into(),
            "".into(),
            "Rent".into(),
        ]);
        assert_eq!(cleaned, vec!["Coffee".to_string(), "Rent".to_string()]);
    }

    #[test]
    fn rates_outside_the_percent_range_are_rejected() {
        use rust_decimal_macros::dec;

        assert!(validate_rate("tax_income_rate", dec!(0)).is_ok());
        assert!(validate_rate("tax_income_rate", dec!(100)).is_ok());

        let err = validate_rate("tax_income_rate", dec!(100.01)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        let err = validate_rate("tax_expense_rate", dec!(-3)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn negative_cap_is_rejected_before_any_write() {
        use rust_decimal_macros::dec;

        let patch = SettingsPatch {
            monthly_expense_cap: Some(dec!(-1)),
            ..SettingsPatch::default()
        };
        let err = validate(&patch).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
