//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Zen - Calm personal finance tracking
#[derive(Parser)]
#[command(name = "zen")]
#[command(about = "Personal finance tracker with budgets and recurring bills", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "zen.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set ZEN_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Settings file (default budgets, dashboard options)
    ///
    /// Falls back to <data dir>/zen/config/settings.toml, then the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed the default budgets
    Init,

    /// Add a transaction by hand
    Add {
        /// Amount spent (positive)
        amount: f64,

        /// What it was for
        description: String,

        /// Budget category
        #[arg(short, long)]
        category: String,

        /// Icon name (defaults to the category's icon)
        #[arg(short, long)]
        icon: Option<String>,

        /// Date (YYYY-MM-DD, defaults to now)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Log a transaction from free text using the AI backend
    ///
    /// Example: zen log uber to the airport 32.40
    Log {
        /// Free-text description, e.g. "coffee with Sam 4.50"
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,

        /// Use this amount instead of the one found in the text
        #[arg(short, long)]
        amount: Option<f64>,

        /// Date (YYYY-MM-DD, defaults to now)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Manage transactions (list, day, edit, delete)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Manage budgets and categories
    Budgets {
        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// Manage recurring monthly payments
    Recurring {
        #[command(subcommand)]
        action: Option<RecurringAction>,
    },

    /// Manage income sources
    Income {
        #[command(subcommand)]
        action: Option<IncomeAction>,
    },

    /// Show the monthly overview
    Dashboard,

    /// Show spending per day for the current month
    Calendar,

    /// Ask the AI backend for spending insights
    Insights,

    /// Delete all data and restore the default budgets
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Show database status (encryption, size, AI backend)
    Status,
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List transactions
    List {
        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Sort by: date, amount, description, category
        #[arg(short, long, default_value = "date")]
        sort: String,

        /// Oldest / smallest first
        #[arg(long)]
        asc: bool,
    },

    /// Show transactions on one day
    Day {
        /// Date (YYYY-MM-DD)
        date: String,
    },

    /// Edit a transaction
    Edit {
        /// Transaction ID
        id: String,

        #[command(flatten)]
        changes: TransactionEdit,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },
}

/// Fields to change on a transaction; omitted fields stay as they are
#[derive(Args, Debug, Default, Clone)]
pub struct TransactionEdit {
    /// New amount
    #[arg(long)]
    pub amount: Option<f64>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// New category
    #[arg(long)]
    pub category: Option<String>,

    /// New icon
    #[arg(long)]
    pub icon: Option<String>,

    /// New date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// List budgets with this month's spend
    List,

    /// Add a custom category
    Add {
        /// Category name
        name: String,

        /// Monthly limit
        #[arg(short, long)]
        limit: f64,

        /// Icon name
        #[arg(short, long, default_value = "Receipt")]
        icon: String,
    },

    /// Change a category's monthly limit
    Limit {
        /// Category name
        category: String,

        /// New monthly limit
        limit: f64,
    },

    /// Rename a category (transactions and recurring payments follow)
    Rename {
        /// Current name
        old_name: String,

        /// New name
        new_name: String,
    },

    /// Delete a category and everything filed under it
    Delete {
        /// Category name
        category: String,
    },

    /// Ask the AI backend to suggest monthly limits
    Suggest {
        /// Apply the suggested limits
        #[arg(long)]
        apply: bool,
    },
}

#[derive(Subcommand)]
pub enum RecurringAction {
    /// List recurring payments with their next due date
    List,

    /// Add a recurring payment
    Add {
        /// What the payment is for
        description: String,

        /// Amount per month
        amount: f64,

        /// Budget category
        #[arg(short, long)]
        category: String,

        /// Day of the month it is due (1-31)
        #[arg(long)]
        day: u32,

        /// Icon name (defaults to the category's icon)
        #[arg(short, long)]
        icon: Option<String>,
    },

    /// Edit a recurring payment
    Edit {
        /// Recurring payment ID
        id: String,

        #[command(flatten)]
        changes: RecurringEdit,
    },

    /// Delete a recurring payment (already logged transactions stay)
    Delete {
        /// Recurring payment ID
        id: String,
    },

    /// Log any payments that are due now
    Run,
}

/// Fields to change on a recurring payment; omitted fields stay as they are
#[derive(Args, Debug, Default, Clone)]
pub struct RecurringEdit {
    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// New amount
    #[arg(long)]
    pub amount: Option<f64>,

    /// New category
    #[arg(long)]
    pub category: Option<String>,

    /// New day of the month (1-31)
    #[arg(long)]
    pub day: Option<u32>,

    /// New icon
    #[arg(long)]
    pub icon: Option<String>,
}

#[derive(Subcommand)]
pub enum IncomeAction {
    /// List income sources and this month's total
    List,

    /// Add an income source
    Add {
        /// Where the money comes from
        description: String,

        /// Amount per payout
        amount: f64,

        /// weekly, bi-weekly, monthly or one-time
        #[arg(short, long, default_value = "monthly")]
        frequency: String,

        /// First payout date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        start: Option<String>,
    },

    /// Delete an income source
    Delete {
        /// Income ID
        id: String,
    },
}
