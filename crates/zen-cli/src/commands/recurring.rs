//! Recurring payment command implementations

use anyhow::{anyhow, Result};
use zen_core::aggregates::next_due_date;
use zen_core::{FinanceEngine, NewRecurringPayment, RecurringPayment, RecurringPaymentUpdate};

use super::{money, parse_category, parse_icon, print_logged, truncate};
use crate::cli::RecurringEdit;

fn print_payment(engine: &FinanceEngine, payment: &RecurringPayment) {
    let next = next_due_date(payment, engine.today())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let last = payment
        .last_logged
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "never".to_string());

    println!(
        "   {:<24} {:>10} │ day {:>2} │ {:<14} │ next {} │ last {}  [{}]",
        truncate(&payment.description, 24),
        money(payment.amount),
        payment.day_of_month,
        truncate(payment.category.as_str(), 14),
        next,
        last,
        payment.id
    );
}

fn resolve_id(engine: &FinanceEngine, id: &str) -> Result<String> {
    if engine.recurring_payment(id).is_some() {
        return Ok(id.to_string());
    }
    let matches: Vec<&RecurringPayment> = engine
        .recurring_payments()
        .iter()
        .filter(|p| p.id.starts_with(id))
        .collect();
    match matches.as_slice() {
        [payment] => Ok(payment.id.clone()),
        [] => Err(anyhow!("Recurring payment {} not found", id)),
        _ => Err(anyhow!("Recurring payment id {} is ambiguous", id)),
    }
}

pub fn cmd_recurring_list(engine: &FinanceEngine) -> Result<()> {
    let payments = engine.recurring_payments();

    if payments.is_empty() {
        println!("No recurring payments. Add one with:");
        println!("  zen recurring add Rent 1200 -c Essentials --day 1");
        return Ok(());
    }

    println!();
    println!("🔁 Recurring Payments");
    println!("   ─────────────────────────────────────────────────────────────");
    for payment in payments {
        print_payment(engine, payment);
    }

    let total: f64 = payments.iter().map(|p| p.amount).sum();
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Monthly total: {}", money(total));

    Ok(())
}

pub fn cmd_recurring_add(
    engine: &mut FinanceEngine,
    description: &str,
    amount: f64,
    category: &str,
    day: u32,
    icon: Option<&str>,
) -> Result<()> {
    let payment = engine.add_recurring_payment(NewRecurringPayment {
        description: description.to_string(),
        amount,
        category: parse_category(category)?,
        icon: icon.map(parse_icon).transpose()?,
        day_of_month: day,
    })?;

    println!("✅ Added recurring payment:");
    print_payment(engine, &payment);
    // Adding a payment that is already due this month logs it right away
    print_logged(&engine.drain_events());
    Ok(())
}

pub fn cmd_recurring_edit(
    engine: &mut FinanceEngine,
    id: &str,
    changes: &RecurringEdit,
) -> Result<()> {
    let id = resolve_id(engine, id)?;
    let update = RecurringPaymentUpdate {
        description: changes.description.clone(),
        amount: changes.amount,
        category: changes.category.as_deref().map(parse_category).transpose()?,
        icon: changes.icon.as_deref().map(parse_icon).transpose()?,
        day_of_month: changes.day,
    };

    let payment = engine.update_recurring_payment(&id, update)?;
    println!("✅ Updated recurring payment:");
    print_payment(engine, &payment);
    print_logged(&engine.drain_events());
    Ok(())
}

pub fn cmd_recurring_delete(engine: &mut FinanceEngine, id: &str) -> Result<()> {
    let id = resolve_id(engine, id)?;
    let payment = engine.delete_recurring_payment(&id)?;
    println!(
        "🗑️  Deleted recurring payment {} ({})",
        payment.description,
        money(payment.amount)
    );
    println!("   Transactions it already logged are kept.");
    Ok(())
}

pub fn cmd_recurring_run(engine: &mut FinanceEngine) -> Result<()> {
    let logged = engine.tick();
    engine.drain_events();

    if logged.is_empty() {
        println!("✅ Nothing due. All recurring payments are up to date.");
    } else {
        print_logged(&logged);
    }
    Ok(())
}
