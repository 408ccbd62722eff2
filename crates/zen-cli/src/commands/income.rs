//! Income command implementations

use anyhow::{anyhow, Result};
use zen_core::aggregates::income_contribution;
use zen_core::{FinanceEngine, Income, IncomeFrequency, NewIncome};

use super::{money, parse_date, truncate};

fn resolve_id(engine: &FinanceEngine, id: &str) -> Result<String> {
    if engine.income(id).is_some() {
        return Ok(id.to_string());
    }
    let matches: Vec<&Income> = engine
        .incomes()
        .iter()
        .filter(|i| i.id.starts_with(id))
        .collect();
    match matches.as_slice() {
        [income] => Ok(income.id.clone()),
        [] => Err(anyhow!("Income {} not found", id)),
        _ => Err(anyhow!("Income id {} is ambiguous", id)),
    }
}

pub fn cmd_income_list(engine: &FinanceEngine) -> Result<()> {
    let incomes = engine.incomes();

    if incomes.is_empty() {
        println!("No income sources. Add one with:");
        println!("  zen income add Salary 3000 --frequency monthly");
        return Ok(());
    }

    let today = engine.today();
    println!();
    println!("💵 Income");
    println!("   ─────────────────────────────────────────────────────────────");
    for income in incomes {
        println!(
            "   {:<24} {:>10} │ {:<9} │ from {} │ this month {}  [{}]",
            truncate(&income.description, 24),
            money(income.amount),
            income.frequency.as_str(),
            income.start_date,
            money(income_contribution(income, today)),
            income.id
        );
    }
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Monthly income: {}", money(engine.monthly_income()));

    Ok(())
}

pub fn cmd_income_add(
    engine: &mut FinanceEngine,
    description: &str,
    amount: f64,
    frequency: &str,
    start: Option<&str>,
) -> Result<()> {
    let frequency: IncomeFrequency = frequency.parse().map_err(|e: String| anyhow!(e))?;
    let start_date = match start {
        Some(s) => parse_date(s)?,
        None => engine.today(),
    };

    let income = engine.add_income(NewIncome {
        description: description.to_string(),
        amount,
        frequency,
        start_date,
    })?;

    println!(
        "✅ Added income {} ({} {})",
        income.description,
        money(income.amount),
        income.frequency
    );
    println!("   Monthly income: {}", money(engine.monthly_income()));
    Ok(())
}

pub fn cmd_income_delete(engine: &mut FinanceEngine, id: &str) -> Result<()> {
    let id = resolve_id(engine, id)?;
    let income = engine.delete_income(&id)?;
    println!(
        "🗑️  Deleted income {} ({})",
        income.description,
        money(income.amount)
    );
    Ok(())
}
