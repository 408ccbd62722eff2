//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_engine` - Shared utility to open the store and load the engine
//! - `ai_client` - AI backend from the environment
//! - Argument parsers for dates, categories, icons
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;
use zen_core::aggregates::midnight;
use zen_core::{
    AIClient, Category, FinanceEngine, Icon, PaymentLogged, Settings, SqliteStore,
};

use super::money;

/// Open the store with encryption by default, or unencrypted if --no-encrypt
///
/// Loading the engine runs the recurring-payment pass; anything it logged is
/// printed before the command's own output.
pub fn open_engine(
    db_path: &Path,
    no_encrypt: bool,
    config: Option<&Path>,
) -> Result<FinanceEngine> {
    let path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow!("Database path is not valid UTF-8: {}", db_path.display()))?;
    let store = if no_encrypt {
        SqliteStore::new_unencrypted(path_str).context("Failed to open database (unencrypted)")?
    } else {
        SqliteStore::new(path_str).context("Failed to open database")?
    };
    let settings = Settings::load_from(config).context("Failed to load settings")?;
    debug!(db = %db_path.display(), encrypted = !no_encrypt, "Opening engine");

    let mut engine = FinanceEngine::with_system_clock(store, settings);
    print_logged(&engine.drain_events());
    Ok(engine)
}

/// AI backend configured through AI_BACKEND / OLLAMA_HOST / OPENAI_COMPATIBLE_HOST
pub fn ai_client() -> Result<AIClient> {
    AIClient::from_env().ok_or_else(|| {
        anyhow!(
            "No AI backend configured. Set OLLAMA_HOST (or AI_BACKEND=openai_compatible \
             with OPENAI_COMPATIBLE_HOST, or AI_BACKEND=mock)"
        )
    })
}

/// Print recurring payments that were just auto-logged
pub fn print_logged(events: &[PaymentLogged]) {
    for event in events {
        println!(
            "🔁 Logged recurring payment: {} {} (due {})",
            event.description,
            money(event.amount),
            event.due_date
        );
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", s))
}

/// A YYYY-MM-DD argument as a timestamp at midnight, or `default`
pub fn parse_date_or(s: Option<&str>, default: NaiveDateTime) -> Result<NaiveDateTime> {
    match s {
        Some(s) => Ok(midnight(parse_date(s)?)),
        None => Ok(default),
    }
}

pub fn parse_category(s: &str) -> Result<Category> {
    Ok(Category::parse(s)?)
}

pub fn parse_icon(s: &str) -> Result<Icon> {
    s.parse::<Icon>().map_err(|e: String| {
        let names: Vec<&str> = Icon::all().iter().map(|i| i.as_str()).collect();
        anyhow!("{}. Available icons: {}", e, names.join(", "))
    })
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool, config: Option<&Path>) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let engine = open_engine(db_path, no_encrypt, config)?;
    println!("   {} budgets ready", engine.budgets().len());

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add income: zen income add Salary 3000");
    println!("  2. Log spending: zen add 12.50 \"Lunch\" -c \"Food & Drink\"");
    println!("  3. See the overview: zen dashboard");

    Ok(())
}
