//! SQLite-backed store with connection pooling and optional SQLCipher encryption

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info};

use super::Store;
use crate::error::{Error, Result};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "ZEN_DB_KEY";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path. This allows moving/renaming/restoring the database freely.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this would invalidate all existing encrypted databases
    const APP_SALT: &[u8; 16] = b"zen-salt-v1-kvst";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Key-value store in a single SQLite table
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
    encrypted: bool,
}

impl SqliteStore {
    /// Open (or create) an encrypted store
    ///
    /// Requires `ZEN_DB_KEY` to be set. Use `new_unencrypted()` for
    /// development/testing without encryption.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Open (or create) an unencrypted store
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open with an explicit passphrase
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            // The key must be set on every new connection
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(4).build(manager)?
        } else {
            Pool::builder().max_size(4).build(manager)?
        };

        let store = Self {
            pool,
            db_path: path.to_string(),
            encrypted: passphrase.is_some(),
        };
        store.run_migrations()?;

        info!(path = %path, encrypted = store.encrypted, "Opened store");
        Ok(store)
    }

    /// Throwaway store backed by a temp file (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` because every pooled
    /// connection would otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!("zen_test_{}_{}.db", std::process::id(), id));
        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path.to_string_lossy())
    }

    pub fn path(&self) -> &str {
        &self.db_path
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Keys currently present, in alphabetical order
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL: readers don't block the single writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- One JSON document per collection
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;

        Ok(())
    }
}

impl Store for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<Value>> {
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, value: &Value) -> Result<()> {
        let conn = self.conn()?;
        let text = serde_json::to_string(value)?;
        conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            params![key, text],
        )?;
        debug!(key = %key, bytes = text.len(), "Wrote collection");
        Ok(())
    }

    fn write_batch(&self, entries: &[(&str, Value)]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for (key, value) in entries {
            let text = serde_json::to_string(value)?;
            tx.execute(
                r#"
                INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
                "#,
                params![key, text],
            )?;
        }
        tx.commit()?;
        debug!(keys = entries.len(), "Wrote collection batch");
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "sqlite:{}{}",
            self.db_path,
            if self.encrypted { " (encrypted)" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roundtrip_and_overwrite() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.read("budgets").unwrap().is_none());

        store.write("budgets", &json!([{"category": "Misc"}])).unwrap();
        store.write("budgets", &json!([])).unwrap();
        assert_eq!(store.read("budgets").unwrap(), Some(json!([])));
        assert_eq!(store.keys().unwrap(), vec!["budgets".to_string()]);
    }

    #[test]
    fn test_write_batch() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .write_batch(&[
                ("transactions", json!([1, 2])),
                ("recurring-payments", json!([3])),
            ])
            .unwrap();
        assert_eq!(store.read("transactions").unwrap(), Some(json!([1, 2])));
        assert_eq!(store.read("recurring-payments").unwrap(), Some(json!([3])));
    }

    #[test]
    fn test_reopen_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zen.db");
        let path = path.to_str().unwrap();

        SqliteStore::new_unencrypted(path)
            .unwrap()
            .write("incomes", &json!([{"id": "x"}]))
            .unwrap();

        let reopened = SqliteStore::new_unencrypted(path).unwrap();
        assert_eq!(reopened.read("incomes").unwrap(), Some(json!([{"id": "x"}])));
        assert!(reopened.describe().starts_with("sqlite:"));
    }

    #[test]
    fn test_derive_key_is_stable() {
        let a = derive_key("correct horse").unwrap();
        let b = derive_key("correct horse").unwrap();
        let c = derive_key("battery staple").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
