// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures surfaced by the ledger engine.
///
/// Validation errors are returned before any store mutation; storage
/// failures are passed through unmodified (the engine never retries a
/// non-idempotent write).
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A required field was absent from a create draft.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// Transaction type was neither `income` nor `expense`.
    #[error("invalid transaction type '{0}' (expected income or expense)")]
    InvalidType(String),

    /// Debt kind was neither `advance` nor `repay`.
    #[error("invalid debt kind '{0}' (expected advance or repay)")]
    InvalidKind(String),

    /// A numeric field was out of range.
    #[error("invalid value for '{field}': {reason}")]
    InvalidInput {
        /// Field the rejected value was supplied for.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Transaction id absent, or owned by a different user.
    #[error("transaction {0} not found")]
    TransactionNotFound(i64),

    /// Debt id absent, or owned by a different user.
    #[error("debt {0} not found")]
    DebtNotFound(i64),

    /// No user with the given name or id.
    #[error("user '{0}' not found")]
    UserNotFound(String),

    /// A user with that name already exists.
    #[error("user '{0}' already exists")]
    DuplicateUser(String),

    /// Underlying persistence error.
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl LedgerError {
    /// Stable machine-readable code for callers that map errors onto a
    /// wire protocol.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidType(_) => "INVALID_TYPE",
            Self::InvalidKind(_) => "INVALID_KIND",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::TransactionNotFound(_) | Self::DebtNotFound(_) | Self::UserNotFound(_) => {
                "NOT_FOUND"
            }
            Self::DuplicateUser(_) => "CONFLICT",
            Self::Storage(_) => "STORAGE_FAILURE",
        }
    }

    /// True for ids that are absent or belong to another user.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TransactionNotFound(_) | Self::DebtNotFound(_) | Self::UserNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(LedgerError::MissingField("date").error_code(), "MISSING_FIELD");
        assert_eq!(
            LedgerError::InvalidType("transfer".into()).error_code(),
            "INVALID_TYPE"
        );
        assert_eq!(
            LedgerError::InvalidKind("loan".into()).error_code(),
            "INVALID_KIND"
        );
        assert_eq!(LedgerError::TransactionNotFound(7).error_code(), "NOT_FOUND");
        assert_eq!(LedgerError::DebtNotFound(7).error_code(), "NOT_FOUND");
        assert_eq!(
            LedgerError::DuplicateUser("amira".into()).error_code(),
            "CONFLICT"
        );
        assert_eq!(
            LedgerError::Storage(rusqlite::Error::InvalidQuery).error_code(),
            "STORAGE_FAILURE"
        );
    }

    #[test]
    fn display_names_the_field() {
        let err = LedgerError::MissingField("base");
        assert_eq!(err.to_string(), "missing required field 'base'");

        let err = LedgerError::InvalidInput {
            field: "tax_income_rate",
            reason: "must be between 0 and 100".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for 'tax_income_rate': must be between 0 and 100"
        );
    }

    #[test]
    fn not_found_covers_all_entities() {
        assert!(LedgerError::TransactionNotFound(1).is_not_found());
        assert!(LedgerError::DebtNotFound(1).is_not_found());
        assert!(LedgerError::UserNotFound("x".into()).is_not_found());
        assert!(!LedgerError::MissingField("date").is_not_found());
    }
}
