//! Zen CLI - Personal finance tracker
//!
//! Usage:
//!   zen init                              Initialize database and default budgets
//!   zen add 12.50 "Lunch" -c "Food & Drink"
//!   zen log coffee with Sam 4.50          Parse free text with the AI backend
//!   zen dashboard                         Monthly overview

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt, config),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt, config).await,
        Commands::Add {
            amount,
            description,
            category,
            icon,
            date,
        } => {
            let mut engine = commands::open_engine(&cli.db, cli.no_encrypt, config)?;
            commands::cmd_add(
                &mut engine,
                amount,
                &description,
                &category,
                icon.as_deref(),
                date.as_deref(),
            )
        }
        Commands::Log { text, amount, date } => {
            let mut engine = commands::open_engine(&cli.db, cli.no_encrypt, config)?;
            let ai = commands::ai_client()?;
            commands::cmd_log(&mut engine, &ai, &text.join(" "), amount, date.as_deref()).await
        }
        Commands::Transactions { action } => {
            let mut engine = commands::open_engine(&cli.db, cli.no_encrypt, config)?;
            match action {
                None => commands::cmd_transactions_list(&engine, 20, "date", false),
                Some(TransactionsAction::List { limit, sort, asc }) => {
                    commands::cmd_transactions_list(&engine, limit, &sort, asc)
                }
                Some(TransactionsAction::Day { date }) => {
                    commands::cmd_transactions_day(&engine, &date)
                }
                Some(TransactionsAction::Edit { id, changes }) => {
                    commands::cmd_transactions_edit(&mut engine, &id, &changes)
                }
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&mut engine, &id)
                }
            }
        }
        Commands::Budgets { action } => {
            let mut engine = commands::open_engine(&cli.db, cli.no_encrypt, config)?;
            match action {
                None | Some(BudgetsAction::List) => commands::cmd_budgets_list(&engine),
                Some(BudgetsAction::Add { name, limit, icon }) => {
                    commands::cmd_budgets_add(&mut engine, &name, limit, &icon)
                }
                Some(BudgetsAction::Limit { category, limit }) => {
                    commands::cmd_budgets_limit(&mut engine, &category, limit)
                }
                Some(BudgetsAction::Rename { old_name, new_name }) => {
                    commands::cmd_budgets_rename(&mut engine, &old_name, &new_name)
                }
                Some(BudgetsAction::Delete { category }) => {
                    commands::cmd_budgets_delete(&mut engine, &category)
                }
                Some(BudgetsAction::Suggest { apply }) => {
                    let ai = commands::ai_client()?;
                    commands::cmd_budgets_suggest(&mut engine, &ai, apply).await
                }
            }
        }
        Commands::Recurring { action } => {
            let mut engine = commands::open_engine(&cli.db, cli.no_encrypt, config)?;
            match action {
                None | Some(RecurringAction::List) => commands::cmd_recurring_list(&engine),
                Some(RecurringAction::Add {
                    description,
                    amount,
                    category,
                    day,
                    icon,
                }) => commands::cmd_recurring_add(
                    &mut engine,
                    &description,
                    amount,
                    &category,
                    day,
                    icon.as_deref(),
                ),
                Some(RecurringAction::Edit { id, changes }) => {
                    commands::cmd_recurring_edit(&mut engine, &id, &changes)
                }
                Some(RecurringAction::Delete { id }) => {
                    commands::cmd_recurring_delete(&mut engine, &id)
                }
                Some(RecurringAction::Run) => commands::cmd_recurring_run(&mut engine),
            }
        }
        Commands::Income { action } => {
            let mut engine = commands::open_engine(&cli.db, cli.no_encrypt, config)?;
            match action {
                None | Some(IncomeAction::List) => commands::cmd_income_list(&engine),
                Some(IncomeAction::Add {
                    description,
                    amount,
                    frequency,
                    start,
                }) => commands::cmd_income_add(
                    &mut engine,
                    &description,
                    amount,
                    &frequency,
                    start.as_deref(),
                ),
                Some(IncomeAction::Delete { id }) => commands::cmd_income_delete(&mut engine, &id),
            }
        }
        Commands::Dashboard => {
            let engine = commands::open_engine(&cli.db, cli.no_encrypt, config)?;
            commands::cmd_dashboard(&engine)
        }
        Commands::Calendar => {
            let engine = commands::open_engine(&cli.db, cli.no_encrypt, config)?;
            commands::cmd_calendar(&engine)
        }
        Commands::Insights => {
            let engine = commands::open_engine(&cli.db, cli.no_encrypt, config)?;
            let ai = commands::ai_client()?;
            commands::cmd_insights(&engine, &ai).await
        }
        Commands::Reset { yes } => {
            let mut engine = commands::open_engine(&cli.db, cli.no_encrypt, config)?;
            commands::cmd_reset(&mut engine, yes)
        }
    }
}
