//! Status-related command implementations (status, dashboard, calendar, insights, reset)

use std::path::Path;

use anyhow::Result;
use zen_core::store::DB_KEY_ENV;
use zen_core::{assistant, AIBackend, AIClient, FinanceEngine, InsightKind};

use super::{ai_client, money, open_engine, print_budget, truncate};

pub async fn cmd_status(db_path: &Path, no_encrypt: bool, config: Option<&Path>) -> Result<()> {
    use std::fs;

    println!();
    println!("📊 Zen Status");
    println!("   ─────────────────────────────────────────────────────────────");

    // Database path
    println!("   Database: {}", db_path.display());

    // Check if database file exists and get size
    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    // Check encryption status
    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    // Try to open the database and show stats
    if db_path.exists() {
        match open_engine(db_path, no_encrypt, config) {
            Ok(engine) => {
                println!();
                println!("   Transactions: {}", engine.transactions().len());
                println!("   Budgets: {}", engine.budgets().len());
                println!("   Recurring payments: {}", engine.recurring_payments().len());
                println!("   Income sources: {}", engine.incomes().len());
                if engine.persistence_failures() > 0 {
                    println!(
                        "   ⚠️  Failed writes this session: {}",
                        engine.persistence_failures()
                    );
                }
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {:#}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                } else if has_key {
                    println!("      (Check if {} is correct)", DB_KEY_ENV);
                }
            }
        }
    }

    // AI backend
    println!();
    match ai_client() {
        Ok(ai) => {
            let healthy = ai.health_check().await;
            println!(
                "   🤖 AI: {} ({} at {}) {}",
                ai.backend_name(),
                ai.model(),
                ai.host(),
                if healthy { "✅ reachable" } else { "❌ unreachable" }
            );
        }
        Err(_) => println!("   🤖 AI: not configured (set OLLAMA_HOST or AI_BACKEND)"),
    }

    println!();
    Ok(())
}

pub fn cmd_dashboard(engine: &FinanceEngine) -> Result<()> {
    let summary = engine.monthly_summary();
    let dashboard = &engine.settings().dashboard;

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│            🧘 Zen Dashboard             │");
    println!("╰─────────────────────────────────────────╯");
    println!("  {}", engine.today().format("%B %Y"));
    println!();
    println!("  Income:    {:>12}", money(summary.income));
    println!("  Expenses:  {:>12}", money(summary.expenses));
    if summary.net < 0.0 {
        println!("  Net:       \x1b[31m{:>12}\x1b[0m", money(summary.net));
    } else {
        println!("  Net:       \x1b[32m{:>12}\x1b[0m", money(summary.net));
    }

    let top = engine.top_budgets(dashboard.top_budgets);
    if !top.is_empty() {
        println!();
        println!("  📊 Budgets");
        for budget in &top {
            print_budget(budget);
        }
    }

    let upcoming = engine.upcoming_payments(dashboard.upcoming_limit);
    if !upcoming.is_empty() {
        println!();
        println!("  🔁 Upcoming payments");
        for payment in &upcoming {
            let when = match payment.days_until_due {
                1 => "tomorrow".to_string(),
                n => format!("in {} days", n),
            };
            println!(
                "     {:<24} {:>10} │ {} ({})",
                truncate(&payment.description, 24),
                money(payment.amount),
                payment.due_date,
                when
            );
        }
    }

    let recent = engine.sorted_transactions(Default::default(), true);
    if !recent.is_empty() {
        println!();
        println!("  📝 Recent");
        for tx in recent.iter().take(5) {
            println!(
                "     {} │ {:>10} │ {}",
                tx.date.format("%m-%d"),
                money(tx.amount),
                truncate(&tx.description, 30)
            );
        }
    }
    println!();

    Ok(())
}

/// Intensity glyph for a day's spend relative to the busiest day
fn heat(total: f64, max: f64) -> &'static str {
    if total <= 0.0 || max <= 0.0 {
        return "·";
    }
    match total / max {
        r if r > 0.75 => "█",
        r if r > 0.5 => "▓",
        r if r > 0.25 => "▒",
        _ => "░",
    }
}

pub fn cmd_calendar(engine: &FinanceEngine) -> Result<()> {
    let days = engine.daily_spending();
    let max = days.iter().map(|d| d.total).fold(0.0, f64::max);

    println!();
    println!("📅 Daily spending (last month)");
    println!("   ─────────────────────────────────────────────────────────────");
    for day in &days {
        if day.total > 0.0 {
            println!(
                "   {} {} {:>10}",
                day.date.format("%a %Y-%m-%d"),
                heat(day.total, max),
                money(day.total)
            );
        }
    }

    let strip: String = days.iter().map(|d| heat(d.total, max)).collect();
    println!();
    println!("   {}", strip);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Total: {}",
        money(days.iter().map(|d| d.total).sum::<f64>())
    );

    Ok(())
}

pub async fn cmd_insights(engine: &FinanceEngine, ai: &AIClient) -> Result<()> {
    println!("🤖 Asking {} ({}) for insights...", ai.backend_name(), ai.model());
    let insights = assistant::spending_insights(engine, ai).await?;

    println!();
    println!("💡 Insights");
    println!("   ─────────────────────────────────────────────────────────────");
    for insight in insights {
        let marker = match insight.kind {
            InsightKind::Observation => "🔎",
            InsightKind::Suggestion => "💡",
            InsightKind::Alert => "⚠️",
            InsightKind::Positive => "🌱",
        };
        match &insight.category {
            Some(category) => println!("   {} {} ({})", marker, insight.title, category),
            None => println!("   {} {}", marker, insight.title),
        }
        println!("      {}", insight.description);
    }

    Ok(())
}

pub fn cmd_reset(engine: &mut FinanceEngine, yes: bool) -> Result<()> {
    if !yes {
        println!("⚠️  This deletes every transaction, recurring payment and income source,");
        println!("   and restores the default budgets.");
        println!("   Run 'zen reset --yes' to confirm.");
        return Ok(());
    }

    engine.reset();
    println!("✅ Reset complete. {} default budgets restored.", engine.budgets().len());
    Ok(())
}
