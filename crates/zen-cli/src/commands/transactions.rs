//! Transaction command implementations

use anyhow::{anyhow, Result};
use zen_core::aggregates::midnight;
use zen_core::{
    assistant, AIBackend, AIClient, FinanceEngine, NewTransaction, Transaction, TransactionSort,
    TransactionSource, TransactionUpdate,
};

use super::{money, parse_category, parse_date, parse_date_or, parse_icon, truncate};
use crate::cli::TransactionEdit;

fn print_row(tx: &Transaction) {
    println!(
        "   {} │ {:>10} │ {:<14} │ {}  [{}]",
        tx.date.format("%Y-%m-%d"),
        money(tx.amount),
        truncate(tx.category.as_str(), 14),
        truncate(&tx.description, 36),
        tx.id
    );
}

pub fn cmd_add(
    engine: &mut FinanceEngine,
    amount: f64,
    description: &str,
    category: &str,
    icon: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    let date = parse_date_or(date, engine.now())?;
    let transaction = engine.add_transaction(NewTransaction {
        amount,
        description: description.to_string(),
        category: parse_category(category)?,
        icon: icon.map(parse_icon).transpose()?,
        date,
        source: TransactionSource::Manual,
    })?;

    println!(
        "✅ Added {} │ {} │ {}",
        money(transaction.amount),
        transaction.category,
        transaction.description
    );
    print_budget_line(engine, &transaction);
    Ok(())
}

pub async fn cmd_log(
    engine: &mut FinanceEngine,
    ai: &AIClient,
    text: &str,
    amount: Option<f64>,
    date: Option<&str>,
) -> Result<()> {
    let date = date.map(|d| parse_date(d).map(midnight)).transpose()?;

    println!("🤖 Parsing with {} ({})...", ai.backend_name(), ai.model());
    let transaction =
        assistant::log_transaction_from_text(engine, ai, text, amount, date).await?;

    println!(
        "✅ Logged {} │ {} │ {} ({})",
        money(transaction.amount),
        transaction.category,
        transaction.description,
        transaction.icon
    );
    print_budget_line(engine, &transaction);
    Ok(())
}

fn print_budget_line(engine: &FinanceEngine, transaction: &Transaction) {
    if let Some(budget) = engine.budget(&transaction.category) {
        println!(
            "   {}: {} of {} spent this month",
            budget.category,
            money(budget.spent),
            money(budget.limit)
        );
    }
}

pub fn cmd_transactions_list(
    engine: &FinanceEngine,
    limit: usize,
    sort: &str,
    ascending: bool,
) -> Result<()> {
    let sort: TransactionSort = sort.parse().map_err(|e: String| anyhow!(e))?;
    let transactions = engine.sorted_transactions(sort, !ascending);

    if transactions.is_empty() {
        println!("No transactions found. Add one with:");
        println!("  zen add 12.50 \"Lunch\" -c \"Food & Drink\"");
        return Ok(());
    }

    println!();
    println!("📝 Transactions ({} total)", transactions.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions.iter().take(limit) {
        print_row(tx);
    }

    Ok(())
}

pub fn cmd_transactions_day(engine: &FinanceEngine, date: &str) -> Result<()> {
    let date = parse_date(date)?;
    let transactions = engine.transactions_on(date);

    println!();
    println!("📅 {}", date.format("%A, %B %-d, %Y"));
    println!("   ─────────────────────────────────────────────────────────────");

    if transactions.is_empty() {
        println!("   No transactions on this day.");
        return Ok(());
    }

    let total: f64 = transactions.iter().map(|t| t.amount).sum();
    for tx in &transactions {
        print_row(tx);
    }
    println!("   Total: {}", money(total));

    Ok(())
}

/// Resolve a full id from a unique prefix
fn resolve_id(engine: &FinanceEngine, id: &str) -> Result<String> {
    if engine.transaction(id).is_some() {
        return Ok(id.to_string());
    }
    let matches: Vec<&Transaction> = engine
        .transactions()
        .iter()
        .filter(|t| t.id.starts_with(id))
        .collect();
    match matches.as_slice() {
        [tx] => Ok(tx.id.clone()),
        [] => Err(anyhow!("Transaction {} not found", id)),
        _ => Err(anyhow!("Transaction id {} is ambiguous", id)),
    }
}

pub fn cmd_transactions_edit(
    engine: &mut FinanceEngine,
    id: &str,
    changes: &TransactionEdit,
) -> Result<()> {
    let id = resolve_id(engine, id)?;
    let update = TransactionUpdate {
        amount: changes.amount,
        description: changes.description.clone(),
        category: changes.category.as_deref().map(parse_category).transpose()?,
        icon: changes.icon.as_deref().map(parse_icon).transpose()?,
        date: changes
            .date
            .as_deref()
            .map(|d| parse_date(d).map(midnight))
            .transpose()?,
    };

    let tx = engine.update_transaction(&id, update)?;
    println!("✅ Updated transaction:");
    print_row(&tx);
    Ok(())
}

pub fn cmd_transactions_delete(engine: &mut FinanceEngine, id: &str) -> Result<()> {
    let id = resolve_id(engine, id)?;
    let tx = engine.delete_transaction(&id)?;
    println!("🗑️  Deleted transaction:");
    print_row(&tx);
    Ok(())
}
