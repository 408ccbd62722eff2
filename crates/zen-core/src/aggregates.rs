//! Derived aggregates
//!
//! Pure functions over the entity collections. The engine calls these after
//! every mutation; nothing here touches the store.
//!
//! Only materialized transactions count toward budget spend and monthly
//! expenses. A recurring payment contributes once it has been auto-logged as
//! a transaction, never before, so it is never counted twice.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

use crate::models::{
    Budget, DailySpending, Income, IncomeFrequency, MonthlySummary, RecurringPayment, Transaction,
    UpcomingPayment,
};

/// First day of the month containing `date`
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after the one containing `date`
pub fn start_of_next_month(date: NaiveDate) -> NaiveDate {
    let start = start_of_month(date);
    start.checked_add_months(Months::new(1)).unwrap_or(start)
}

/// Half-open `[start, end)` window covering the month of `today`
pub fn month_window(today: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    (
        midnight(start_of_month(today)),
        midnight(start_of_next_month(today)),
    )
}

/// Start of the given day
pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or_default()
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// `dayOfMonth` in the given month, or `None` if the month is too short
pub fn due_date_in_month(year: i32, month: u32, day_of_month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day_of_month)
}

fn in_month<'a>(
    transactions: &'a [Transaction],
    today: NaiveDate,
) -> impl Iterator<Item = &'a Transaction> {
    let (start, end) = month_window(today);
    transactions
        .iter()
        .filter(move |t| t.date >= start && t.date < end)
}

/// Recompute `spent` for every budget from current-month transactions
///
/// Limits, icons and colors pass through untouched. Transactions whose
/// category has no budget are ignored.
pub fn recompute_budgets(
    transactions: &[Transaction],
    budgets: &[Budget],
    today: NaiveDate,
) -> Vec<Budget> {
    let mut updated: Vec<Budget> = budgets
        .iter()
        .cloned()
        .map(|mut b| {
            b.spent = 0.0;
            b
        })
        .collect();

    for tx in in_month(transactions, today) {
        if let Some(budget) = updated.iter_mut().find(|b| b.category == tx.category) {
            budget.spent += tx.amount;
        }
    }

    updated
}

/// What one income source contributes to the current month
///
/// Weekly and bi-weekly sources use flat x4 / x2 multipliers rather than
/// counting actual pay dates in the month.
pub fn income_contribution(income: &Income, today: NaiveDate) -> f64 {
    if income.start_date > today {
        return 0.0;
    }
    match income.frequency {
        IncomeFrequency::Monthly => income.amount,
        IncomeFrequency::Weekly => income.amount * 4.0,
        IncomeFrequency::BiWeekly => income.amount * 2.0,
        IncomeFrequency::OneTime => {
            if same_month(income.start_date, today) {
                income.amount
            } else {
                0.0
            }
        }
    }
}

pub fn monthly_income(incomes: &[Income], today: NaiveDate) -> f64 {
    incomes
        .iter()
        .map(|income| income_contribution(income, today))
        .sum()
}

/// Sum of current-month transactions (recurring payments are not added on top)
pub fn monthly_expenses(transactions: &[Transaction], today: NaiveDate) -> f64 {
    in_month(transactions, today).map(|t| t.amount).sum()
}

pub fn monthly_summary(
    incomes: &[Income],
    transactions: &[Transaction],
    today: NaiveDate,
) -> MonthlySummary {
    let income = monthly_income(incomes, today);
    let expenses = monthly_expenses(transactions, today);
    MonthlySummary {
        income,
        expenses,
        net: income - expenses,
    }
}

/// Next date strictly after `today` on which the payment falls due
///
/// A payment due today counts as handled (it is materialized on the same
/// pass), so its next due date is next month. Months that lack the day are
/// skipped.
pub fn next_due_date(payment: &RecurringPayment, today: NaiveDate) -> Option<NaiveDate> {
    let this_month = start_of_month(today);
    (0..=12u32).find_map(|offset| {
        let month = this_month.checked_add_months(Months::new(offset))?;
        due_date_in_month(month.year(), month.month(), payment.day_of_month)
            .filter(|due| *due > today)
    })
}

/// Payments ordered by how soon they fall due, at most `limit` of them
pub fn upcoming_payments(
    payments: &[RecurringPayment],
    today: NaiveDate,
    limit: usize,
) -> Vec<UpcomingPayment> {
    let mut upcoming: Vec<UpcomingPayment> = payments
        .iter()
        .filter_map(|p| {
            let due_date = next_due_date(p, today)?;
            Some(UpcomingPayment {
                payment_id: p.id.clone(),
                description: p.description.clone(),
                amount: p.amount,
                category: p.category.clone(),
                due_date,
                days_until_due: (due_date - today).num_days(),
            })
        })
        .collect();

    upcoming.sort_by_key(|u| u.days_until_due);
    upcoming.truncate(limit);
    upcoming
}

/// Per-day totals from one month ago through `today`, zero-filled
pub fn daily_spending(transactions: &[Transaction], today: NaiveDate) -> Vec<DailySpending> {
    let start = today.checked_sub_months(Months::new(1)).unwrap_or(today);

    let mut totals: BTreeMap<NaiveDate, f64> = start
        .iter_days()
        .take_while(|d| *d <= today)
        .map(|d| (d, 0.0))
        .collect();

    for tx in transactions {
        if let Some(total) = totals.get_mut(&tx.date.date()) {
            *total += tx.amount;
        }
    }

    totals
        .into_iter()
        .map(|(date, total)| DailySpending { date, total })
        .collect()
}

/// Budgets ordered by utilization, highest first
pub fn top_budgets(budgets: &[Budget], n: usize) -> Vec<Budget> {
    let mut sorted = budgets.to_vec();
    sorted.sort_by(|a, b| b.utilization().total_cmp(&a.utilization()));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuiltinCategory, Category, Icon, TransactionSource};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(amount: f64, category: BuiltinCategory, on: NaiveDate) -> Transaction {
        Transaction {
            id: format!("t-{}-{}", amount, on),
            amount,
            description: "test".to_string(),
            category: category.into(),
            icon: category.default_icon(),
            date: on.and_hms_opt(9, 30, 0).unwrap(),
            source: TransactionSource::Manual,
        }
    }

    fn budget(category: BuiltinCategory, limit: f64) -> Budget {
        Budget {
            category: category.into(),
            limit,
            spent: 0.0,
            icon: category.default_icon(),
            color: String::new(),
        }
    }

    fn income(amount: f64, frequency: IncomeFrequency, start: NaiveDate) -> Income {
        Income {
            id: format!("i-{}", amount),
            description: "job".to_string(),
            amount,
            frequency,
            start_date: start,
        }
    }

    fn payment(day_of_month: u32) -> RecurringPayment {
        RecurringPayment {
            id: format!("p{}", day_of_month),
            description: format!("Bill {}", day_of_month),
            amount: 10.0,
            category: Category::Builtin(BuiltinCategory::Essentials),
            icon: Icon::Receipt,
            day_of_month,
            last_logged: None,
        }
    }

    #[test]
    fn test_month_window_december() {
        let (start, end) = month_window(date(2024, 12, 15));
        assert_eq!(start.date(), date(2024, 12, 1));
        assert_eq!(end.date(), date(2025, 1, 1));
    }

    #[test]
    fn test_recompute_only_counts_current_month() {
        let today = date(2024, 5, 20);
        let transactions = vec![
            tx(12.5, BuiltinCategory::FoodAndDrink, date(2024, 5, 1)),
            tx(7.5, BuiltinCategory::FoodAndDrink, date(2024, 5, 31)),
            tx(100.0, BuiltinCategory::FoodAndDrink, date(2024, 4, 30)),
            tx(40.0, BuiltinCategory::Shopping, date(2024, 6, 1)),
        ];
        let budgets = vec![
            budget(BuiltinCategory::FoodAndDrink, 300.0),
            budget(BuiltinCategory::Shopping, 200.0),
        ];

        let result = recompute_budgets(&transactions, &budgets, today);
        assert_eq!(result[0].spent, 20.0);
        assert_eq!(result[1].spent, 0.0);
        assert_eq!(result[0].limit, 300.0);
    }

    #[test]
    fn test_recompute_resets_stale_spend() {
        let mut stale = budget(BuiltinCategory::Misc, 50.0);
        stale.spent = 999.0;
        let result = recompute_budgets(&[], &[stale], date(2024, 1, 1));
        assert_eq!(result[0].spent, 0.0);
    }

    #[test]
    fn test_monthly_income_example() {
        let today = date(2024, 6, 10);
        let incomes = vec![
            income(1000.0, IncomeFrequency::Monthly, date(2024, 5, 1)),
            income(200.0, IncomeFrequency::Weekly, date(2024, 5, 3)),
        ];
        assert_eq!(monthly_income(&incomes, today), 1800.0);
    }

    #[test]
    fn test_monthly_income_rules() {
        let today = date(2024, 6, 10);
        assert_eq!(
            income_contribution(&income(500.0, IncomeFrequency::BiWeekly, date(2024, 1, 1)), today),
            1000.0
        );
        // Not started yet
        assert_eq!(
            income_contribution(&income(500.0, IncomeFrequency::Monthly, date(2024, 6, 11)), today),
            0.0
        );
        // One-time counts only in its own month
        assert_eq!(
            income_contribution(&income(300.0, IncomeFrequency::OneTime, date(2024, 6, 2)), today),
            300.0
        );
        assert_eq!(
            income_contribution(&income(300.0, IncomeFrequency::OneTime, date(2024, 5, 28)), today),
            0.0
        );
    }

    #[test]
    fn test_monthly_expenses_ignores_other_months() {
        let today = date(2024, 2, 29);
        let transactions = vec![
            tx(10.0, BuiltinCategory::Misc, date(2024, 2, 1)),
            tx(15.0, BuiltinCategory::Shopping, date(2024, 2, 29)),
            tx(99.0, BuiltinCategory::Shopping, date(2023, 2, 15)),
        ];
        assert_eq!(monthly_expenses(&transactions, today), 25.0);

        let summary = monthly_summary(
            &[income(100.0, IncomeFrequency::Monthly, date(2024, 1, 1))],
            &transactions,
            today,
        );
        assert_eq!(summary.net, 75.0);
    }

    #[test]
    fn test_next_due_date() {
        let today = date(2024, 1, 15);
        assert_eq!(next_due_date(&payment(20), today), Some(date(2024, 1, 20)));
        // Due today rolls to next month
        assert_eq!(next_due_date(&payment(15), today), Some(date(2024, 2, 15)));
        // February 2024 has no 30th
        assert_eq!(next_due_date(&payment(30), date(2024, 1, 31)), Some(date(2024, 3, 30)));
    }

    #[test]
    fn test_upcoming_payments_sorted_and_limited() {
        let today = date(2024, 1, 15);
        let payments = vec![payment(1), payment(16), payment(28), payment(20)];
        let upcoming = upcoming_payments(&payments, today, 3);
        let days: Vec<i64> = upcoming.iter().map(|u| u.days_until_due).collect();
        assert_eq!(days, vec![1, 5, 13]);
    }

    #[test]
    fn test_daily_spending_zero_filled() {
        let today = date(2024, 3, 31);
        let transactions = vec![
            tx(5.0, BuiltinCategory::Misc, date(2024, 3, 31)),
            tx(2.5, BuiltinCategory::Misc, date(2024, 3, 31)),
            tx(9.0, BuiltinCategory::Misc, date(2024, 1, 1)),
        ];
        let days = daily_spending(&transactions, today);
        // Feb 29 .. Mar 31 inclusive
        assert_eq!(days.first().unwrap().date, date(2024, 2, 29));
        assert_eq!(days.len(), 32);
        assert_eq!(days.last().unwrap().total, 7.5);
        assert!(days[..days.len() - 1].iter().all(|d| d.total == 0.0));
    }

    #[test]
    fn test_top_budgets_by_utilization() {
        let mut food = budget(BuiltinCategory::FoodAndDrink, 100.0);
        food.spent = 50.0;
        let mut fun = budget(BuiltinCategory::Entertainment, 20.0);
        fun.spent = 30.0;
        let misc = budget(BuiltinCategory::Misc, 10.0);

        let top = top_budgets(&[food, fun, misc], 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].category.as_str(), "Entertainment");
        assert_eq!(top[1].category.as_str(), "Food & Drink");
    }
}
