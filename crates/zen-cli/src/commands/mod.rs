//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_engine, ai_client, argument parsing) and init
//! - `budgets` - Budget and category commands (list, add, limit, rename, delete, suggest)
//! - `income` - Income source commands (list, add, delete)
//! - `recurring` - Recurring payment commands (list, add, edit, delete, run)
//! - `status` - Status/dashboard/calendar/insights/reset commands
//! - `transactions` - Transaction commands (add, log, list, day, edit, delete)

pub mod budgets;
pub mod core;
pub mod income;
pub mod recurring;
pub mod status;
pub mod transactions;

// Re-export command functions for main.rs
pub use budgets::*;
pub use core::*;
pub use income::*;
pub use recurring::*;
pub use status::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Render an amount as currency
pub fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}
