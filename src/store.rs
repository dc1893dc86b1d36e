// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, TransactionBehavior, params};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::LedgerError;
use crate::models::User;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Tillbook", "tillbook"));

/// Default database location in the platform data dir.
pub fn db_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    std::fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("tillbook.sqlite"))
}

/// Durable, user-scoped storage for the ledger.
///
/// Each operation opens its own connection, so unrelated users proceed in
/// parallel. Read-modify-write sequences for one user must run under
/// [`LedgerStore::with_user_lock`], which serializes them and closes the
/// lost-update window; writes are committed with `synchronous=FULL` before
/// an operation reports success. Record identity comes from SQLite
/// `AUTOINCREMENT` rowids, unique for the lifetime of the store.
pub struct LedgerStore {
    path: PathBuf,
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl LedgerStore {
    /// Open (or create) the store at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let store = LedgerStore {
            path: path.as_ref().to_path_buf(),
            locks: DashMap::new(),
        };
        let conn = store.connect()?;
        init_schema(&conn)?;
        debug!(path = %store.path.display(), "ledger store open");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn connect(&self) -> Result<Connection, LedgerError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA synchronous = FULL;",
        )?;
        Ok(conn)
    }

    /// Run `f` while holding `user_id`'s write lock.
    ///
    /// All mutations for one user go through here so that concurrent
    /// read-merge-write cycles are linearized. Locks are per user; other
    /// users' operations are never blocked by this one.
    pub fn with_user_lock<T>(
        &self,
        user_id: i64,
        f: impl FnOnce(&mut Connection) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let lock = self.locks.entry(user_id).or_default().clone();
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut conn = self.connect()?;
        f(&mut conn)
    }

    /// Create a user together with their default settings row, atomically.
    pub fn create_user(&self, name: &str) -> Result<User, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::MissingField("name"));
        }
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let created_at = now_utc();
        tx.execute(
            "INSERT INTO users(name, created_at) VALUES (?1, ?2)",
            params![name, created_at],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                LedgerError::DuplicateUser(name.to_string())
            } else {
                e.into()
            }
        })?;
        let id = tx.last_insert_rowid();
        tx.execute("INSERT INTO settings(user_id) VALUES (?1)", params![id])?;
        tx.commit()?;
        info!(user = name, id, "user created");
        Ok(User {
            id,
            name: name.to_string(),
            created_at,
        })
    }

    /// Resolve a user by name. This is where the CLI turns an identity
    /// flag into a verified user id; actual authentication is the
    /// caller's concern.
    pub fn find_user(&self, name: &str) -> Result<User, LedgerError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM users WHERE name = ?1")?;
        let mut rows = stmt.query(params![name.trim()])?;
        match rows.next()? {
            Some(row) => Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
            }),
            None => Err(LedgerError::UserNotFound(name.trim().to_string())),
        }
    }

    pub fn list_users(&self) -> Result<Vec<User>, LedgerError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM users ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?;
        let mut users = Vec::new();
        for user in rows {
            users.push(user?);
        }
        Ok(users)
    }

    /// Delete a user and, through foreign keys, all of their settings,
    /// transactions, and debts.
    pub fn remove_user(&self, user_id: i64) -> Result<(), LedgerError> {
        self.with_user_lock(user_id, |conn| {
            let n = conn.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
            if n == 0 {
                return Err(LedgerError::UserNotFound(user_id.to_string()));
            }
            info!(user_id, "user removed (ledger cascaded)");
            Ok(())
        })
    }
}

/// Commit-time clock for `created_at` fields: RFC 3339 UTC with
/// millisecond precision, which also string-sorts chronologically.
pub(crate) fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Read a money column stored as TEXT.
pub(crate) fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    text.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn init_schema(conn: &Connection) -> Result<(), LedgerError> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS users(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS settings(
        user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        currency TEXT NOT NULL DEFAULT '$',
        tax_income_rate TEXT NOT NULL DEFAULT '0',
        tax_expense_rate TEXT NOT NULL DEFAULT '0',
        monthly_expense_cap TEXT NOT NULL DEFAULT '0',
        categories TEXT NOT NULL DEFAULT '[]',
        payment_methods TEXT NOT NULL DEFAULT '[]'
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        date TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('income','expense')),
        category TEXT NOT NULL,
        base TEXT NOT NULL,
        tax TEXT NOT NULL,
        total TEXT NOT NULL,
        employee TEXT,
        notes TEXT,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);

    CREATE TABLE IF NOT EXISTS debts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        date TEXT NOT NULL,
        employee TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('advance','repay')),
        amount TEXT NOT NULL,
        delta TEXT NOT NULL,
        notes TEXT,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_debts_user_date ON debts(user_id, date);
    CREATE INDEX IF NOT EXISTS idx_debts_user_employee ON debts(user_id, employee);
    "#,
    )?;
    Ok(())
}
