//! Budget and category command implementations

use anyhow::Result;
use zen_core::{assistant, AIBackend, AIClient, Budget, BudgetStatus, FinanceEngine};

use super::{money, parse_category, parse_icon};

/// Ten-cell bar of spent vs. limit
fn progress_bar(budget: &Budget) -> String {
    let filled = (budget.utilization() * 10.0).round().clamp(0.0, 10.0) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

fn status_marker(status: BudgetStatus) -> &'static str {
    match status {
        BudgetStatus::Ok => "  ",
        BudgetStatus::Warning => "⚠️",
        BudgetStatus::Over => "🔴",
    }
}

pub fn print_budget(budget: &Budget) {
    println!(
        "   {} {:<16} {} {:>10} / {:<10} ({} left)",
        status_marker(budget.status()),
        budget.category.as_str(),
        progress_bar(budget),
        money(budget.spent),
        money(budget.limit),
        money(budget.remaining())
    );
}

pub fn cmd_budgets_list(engine: &FinanceEngine) -> Result<()> {
    let budgets = engine.budgets();

    if budgets.is_empty() {
        println!("No budgets. Add one with:");
        println!("  zen budgets add Pets --limit 100 --icon PawPrint");
        return Ok(());
    }

    println!();
    println!("💰 Budgets ({})", engine.today().format("%B %Y"));
    println!("   ─────────────────────────────────────────────────────────────");
    for budget in budgets {
        print_budget(budget);
    }

    let total_limit: f64 = budgets.iter().map(|b| b.limit).sum();
    let total_spent: f64 = budgets.iter().map(|b| b.spent).sum();
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Total: {} of {} spent",
        money(total_spent),
        money(total_limit)
    );

    Ok(())
}

pub fn cmd_budgets_add(engine: &mut FinanceEngine, name: &str, limit: f64, icon: &str) -> Result<()> {
    let budget = engine.add_category(parse_category(name)?, parse_icon(icon)?, limit)?;
    println!(
        "✅ Added category {} with a monthly limit of {}",
        budget.category,
        money(budget.limit)
    );
    Ok(())
}

pub fn cmd_budgets_limit(engine: &mut FinanceEngine, category: &str, limit: f64) -> Result<()> {
    let budget = engine.update_budget_limit(&parse_category(category)?, limit)?;
    println!("✅ {} limit is now {}", budget.category, money(budget.limit));
    print_budget(&budget);
    Ok(())
}

pub fn cmd_budgets_rename(engine: &mut FinanceEngine, old_name: &str, new_name: &str) -> Result<()> {
    let old = parse_category(old_name)?;
    let budget = engine.rename_category(&old, parse_category(new_name)?)?;
    println!("✅ Renamed {} → {}", old, budget.category);
    Ok(())
}

pub fn cmd_budgets_delete(engine: &mut FinanceEngine, category: &str) -> Result<()> {
    let deleted = engine.delete_category(&parse_category(category)?)?;
    println!("🗑️  Deleted category {}", deleted.budget.category);
    if deleted.transactions_removed > 0 || deleted.recurring_payments_removed > 0 {
        println!(
            "   Also removed {} transaction(s) and {} recurring payment(s)",
            deleted.transactions_removed, deleted.recurring_payments_removed
        );
    }
    Ok(())
}

pub async fn cmd_budgets_suggest(
    engine: &mut FinanceEngine,
    ai: &AIClient,
    apply: bool,
) -> Result<()> {
    println!("🤖 Asking {} ({}) for budget suggestions...", ai.backend_name(), ai.model());

    if apply {
        let applied = assistant::apply_suggested_budgets(engine, ai).await?;
        println!();
        for (category, limit) in &applied.applied {
            println!("   ✅ {:<16} {}", category.as_str(), money(*limit));
        }
        for (name, reason) in &applied.skipped {
            println!("   ⏭️  {:<16} skipped: {}", name, reason);
        }
        return Ok(());
    }

    let suggestions = assistant::suggest_budgets(engine, ai).await?;
    let income = engine.monthly_income();
    let total: f64 = suggestions.values().sum();

    println!();
    println!("💡 Suggested monthly limits");
    println!("   ─────────────────────────────────────────────────────────────");
    for (name, limit) in &suggestions {
        println!("   {:<16} {}", name, money(*limit));
    }
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total: {} (monthly income {})", money(total), money(income));
    if total > income {
        println!("   ⚠️  Suggestions exceed your monthly income");
    }
    println!();
    println!("   Run 'zen budgets suggest --apply' to use these limits.");

    Ok(())
}
