//! Durable key-value storage for the engine's collections
//!
//! The engine persists each collection as one JSON array under a fixed key
//! and never queries the store beyond `read`/`write`. Backends:
//! - `memory` - in-process map, shared between clones (tests, throwaway sessions)
//! - `sqlite` - SQLite/SQLCipher file with a single key-value table

use serde_json::Value;

use crate::error::Result;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, DB_KEY_ENV};

pub const TRANSACTIONS_KEY: &str = "transactions";
pub const BUDGETS_KEY: &str = "budgets";
pub const RECURRING_PAYMENTS_KEY: &str = "recurring-payments";
pub const INCOMES_KEY: &str = "incomes";

/// Every key the engine reads at startup
pub const ALL_KEYS: [&str; 4] = [
    TRANSACTIONS_KEY,
    BUDGETS_KEY,
    RECURRING_PAYMENTS_KEY,
    INCOMES_KEY,
];

/// Key-value persistence collaborator
pub trait Store: Send + Sync {
    /// Read the JSON stored under `key`, `None` if never written
    fn read(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the JSON stored under `key`
    fn write(&self, key: &str, value: &Value) -> Result<()>;

    /// Write several keys together
    ///
    /// Backends that can should make this all-or-nothing.
    fn write_batch(&self, entries: &[(&str, Value)]) -> Result<()> {
        for (key, value) in entries {
            self.write(key, value)?;
        }
        Ok(())
    }

    /// Short human-readable description (for status output)
    fn describe(&self) -> String;
}
