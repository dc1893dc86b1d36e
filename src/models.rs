// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Owning account; the isolation boundary for all ledger data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// Side of a till transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnKind {
    Income,
    Expense,
}

impl TxnKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TxnKind::Income => "income",
            TxnKind::Expense => "expense",
        }
    }
}

impl FromStr for TxnKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TxnKind::Income),
            "expense" => Ok(TxnKind::Expense),
            other => Err(LedgerError::InvalidType(other.to_string())),
        }
    }
}

impl fmt::Display for TxnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a staff debt movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtKind {
    Advance,
    Repay,
}

impl DebtKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DebtKind::Advance => "advance",
            DebtKind::Repay => "repay",
        }
    }
}

impl FromStr for DebtKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "advance" => Ok(DebtKind::Advance),
            "repay" => Ok(DebtKind::Repay),
            other => Err(LedgerError::InvalidKind(other.to_string())),
        }
    }
}

impl fmt::Display for DebtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A taxed income/expense entry. `tax` and `total` are derived from
/// `base`/`kind` and the owner's current rates on every write; they are
/// never client-authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub kind: TxnKind,
    pub category: String,
    pub base: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub employee: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Candidate fields for creating or updating a transaction.
///
/// Create validates the required fields are present; update merges the
/// draft onto the stored record first. `tax`/`total` are accepted so a
/// client payload round-trips, but are always discarded and recomputed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TxnDraft {
    pub date: Option<NaiveDate>,
    pub kind: Option<TxnKind>,
    pub category: Option<String>,
    pub base: Option<Decimal>,
    pub employee: Option<String>,
    pub notes: Option<String>,
    pub tax: Option<Decimal>,
    pub total: Option<Decimal>,
}

/// Filters for listing transactions. Employee matching is
/// case-insensitive exact; date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct TxnFilter {
    pub kind: Option<TxnKind>,
    pub employee: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

/// A staff advance or repayment. `delta` is derived: `+amount` for an
/// advance, `-amount` for a repayment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub employee: String,
    pub kind: DebtKind,
    pub amount: Decimal,
    pub delta: Decimal,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Candidate fields for creating or updating a debt. `delta` is accepted
/// and always discarded, same contract as [`TxnDraft`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebtDraft {
    pub date: Option<NaiveDate>,
    pub employee: Option<String>,
    pub kind: Option<DebtKind>,
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
    pub delta: Option<Decimal>,
}

/// Filters for listing debts.
#[derive(Debug, Clone, Default)]
pub struct DebtFilter {
    pub kind: Option<DebtKind>,
    pub employee: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

/// Per-user configuration read by the managers at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub user_id: i64,
    pub currency: String,
    pub tax_income_rate: Decimal,
    pub tax_expense_rate: Decimal,
    pub monthly_expense_cap: Decimal,
    pub categories: Vec<String>,
    pub payment_methods: Vec<String>,
}

impl Settings {
    /// Rate applied to a transaction of the given kind.
    pub fn rate_for(&self, kind: TxnKind) -> Decimal {
        match kind {
            TxnKind::Income => self.tax_income_rate,
            TxnKind::Expense => self.tax_expense_rate,
        }
    }
}

/// Partial settings update; omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub currency: Option<String>,
    pub tax_income_rate: Option<Decimal>,
    pub tax_expense_rate: Option<Decimal>,
    pub monthly_expense_cap: Option<Decimal>,
    pub categories: Option<Vec<String>>,
    pub payment_methods: Option<Vec<String>>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.currency.is_none()
            && self.tax_income_rate.is_none()
            && self.tax_expense_rate.is_none()
            && self.monthly_expense_cap.is_none()
            && self.categories.is_none()
            && self.payment_methods.is_none()
    }
}

/// Aggregated position of one employee, recomputed on demand from the
/// full debt ledger (never cached).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeBalance {
    pub advances: Decimal,
    pub repayments: Decimal,
    pub balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parsing_round_trips() {
        assert_eq!("income".parse::<TxnKind>().unwrap(), TxnKind::Income);
        assert_eq!("expense".parse::<TxnKind>().unwrap(), TxnKind::Expense);
        assert_eq!(TxnKind::Income.to_string(), "income");

        assert_eq!("advance".parse::<DebtKind>().unwrap(), DebtKind::Advance);
        assert_eq!("repay".parse::<DebtKind>().unwrap(), DebtKind::Repay);
        assert_eq!(DebtKind::Repay.to_string(), "repay");
    }

    #[test]
    fn unknown_kinds_are_rejected() {
        let err = "transfer".parse::<TxnKind>().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TYPE");

        let err = "loan".parse::<DebtKind>().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_KIND");
    }

    #[test]
    fn draft_deserializes_with_missing_fields() {
        let draft: TxnDraft = serde_json::from_str(r#"{"base": "120.50"}"#).unwrap();
        assert!(draft.date.is_none());
        assert_eq!(draft.base.unwrap().to_string(), "120.50");
    }
}
