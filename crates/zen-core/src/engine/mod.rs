//! Finance state engine
//!
//! `FinanceEngine` owns the four collections (transactions, budgets,
//! recurring payments, incomes). Every mutation:
//! 1. validates its input and rejects before touching state
//! 2. applies the change and writes the affected collections through to the store
//! 3. recomputes derived budget spend
//!
//! The store is a write-through mirror. In-memory state stays authoritative
//! when a write fails; failures are logged and counted, never returned.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::aggregates;
use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::models::{
    Budget, DailySpending, Income, MonthlySummary, PaymentLogged, RecurringPayment, Transaction,
    UpcomingPayment,
};
use crate::store::{Store, BUDGETS_KEY, INCOMES_KEY, RECURRING_PAYMENTS_KEY, TRANSACTIONS_KEY};

mod budgets;
mod income;
mod recurring;
mod transactions;


pub struct FinanceEngine {
    store: Box<dyn Store>,
    clock: Arc<dyn Clock>,
    settings: Settings,
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
    recurring_payments: Vec<RecurringPayment>,
    incomes: Vec<Income>,
    /// Auto-logged payments not yet drained by the caller
    pending_events: Vec<PaymentLogged>,
    persistence_failures: usize,
}

impl FinanceEngine {
    /// Load state from the store, then run the materialization pass
    ///
    /// Never fails: unreadable or corrupt collections fall back to their
    /// defaults (empty, or the seeded budgets) with a warning.
    pub fn open(
        store: impl Store + 'static,
        clock: impl Clock + 'static,
        settings: Settings,
    ) -> Self {
        let mut engine = Self {
            store: Box::new(store),
            clock: Arc::new(clock),
            settings,
            transactions: Vec::new(),
            budgets: Vec::new(),
            recurring_payments: Vec::new(),
            incomes: Vec::new(),
            pending_events: Vec::new(),
            persistence_failures: 0,
        };
        engine.load();

        let logged = engine.tick();
        info!(
            store = %engine.store.describe(),
            transactions = engine.transactions.len(),
            budgets = engine.budgets.len(),
            recurring = engine.recurring_payments.len(),
            incomes = engine.incomes.len(),
            auto_logged = logged.len(),
            "Finance engine ready"
        );
        engine
    }

    /// Open with the local system clock
    pub fn with_system_clock(store: impl Store + 'static, settings: Settings) -> Self {
        Self::open(store, SystemClock, settings)
    }

    fn load(&mut self) {
        self.transactions = self.load_collection(TRANSACTIONS_KEY).unwrap_or_default();
        self.recurring_payments = self
            .load_collection(RECURRING_PAYMENTS_KEY)
            .unwrap_or_default();
        self.incomes = self.load_collection(INCOMES_KEY).unwrap_or_default();

        match self.load_collection(BUDGETS_KEY) {
            Some(budgets) => self.budgets = budgets,
            None => {
                self.budgets = self.settings.seed_budgets();
                info!(count = self.budgets.len(), "Seeding default budgets");
                self.persist(&[BUDGETS_KEY]);
            }
        }
    }

    /// Read one collection; `None` when absent, unreadable or corrupt
    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let value = match self.store.read(key) {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read collection, using default");
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(items) => Some(items),
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupt collection in store, using default");
                None
            }
        }
    }

    fn collection_json(&self, key: &str) -> Result<Value> {
        fn to_json<T: Serialize>(items: &[T]) -> Result<Value> {
            Ok(serde_json::to_value(items)?)
        }
        match key {
            TRANSACTIONS_KEY => to_json(&self.transactions),
            BUDGETS_KEY => to_json(&self.budgets),
            RECURRING_PAYMENTS_KEY => to_json(&self.recurring_payments),
            INCOMES_KEY => to_json(&self.incomes),
            other => Err(Error::Persistence(format!("Unknown collection: {}", other))),
        }
    }

    /// Write the given collections through to the store as one batch
    fn persist(&mut self, keys: &[&str]) {
        let entries: Result<Vec<(&str, Value)>> = keys
            .iter()
            .map(|key| Ok((*key, self.collection_json(key)?)))
            .collect();

        let result = entries.and_then(|entries| self.store.write_batch(&entries));
        if let Err(e) = result {
            self.persistence_failures += 1;
            warn!(
                keys = ?keys,
                error = %e,
                failures = self.persistence_failures,
                "Failed to persist state; keeping in-memory copy"
            );
        }
    }

    /// Recompute budget spend; writes only when something changed
    fn recompute(&mut self) {
        let updated =
            aggregates::recompute_budgets(&self.transactions, &self.budgets, self.today());
        if updated == self.budgets {
            debug!("Budget spend unchanged, skipping write");
            return;
        }
        self.budgets = updated;
        self.persist(&[BUDGETS_KEY]);
    }

    /// Run the recurring-payment pass against the current clock
    ///
    /// Returns the payments logged on this pass; they are also queued for
    /// `drain_events()`.
    pub fn tick(&mut self) -> Vec<PaymentLogged> {
        let logged = self.materialize_due_payments();
        // Spend can also change with no new transactions when the month rolls over
        self.recompute();
        self.pending_events.extend(logged.iter().cloned());
        logged
    }

    /// Take every queued auto-log event
    pub fn drain_events(&mut self) -> Vec<PaymentLogged> {
        std::mem::take(&mut self.pending_events)
    }

    /// Restore default budgets and clear everything else
    pub fn reset(&mut self) {
        self.transactions.clear();
        self.recurring_payments.clear();
        self.incomes.clear();
        self.pending_events.clear();
        self.budgets = self.settings.seed_budgets();
        self.persist(&[
            TRANSACTIONS_KEY,
            BUDGETS_KEY,
            RECURRING_PAYMENTS_KEY,
            INCOMES_KEY,
        ]);
        info!("Reset all data to defaults");
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Writes that failed since the engine was opened
    pub fn persistence_failures(&self) -> usize {
        self.persistence_failures
    }

    pub fn store_description(&self) -> String {
        self.store.describe()
    }

    // Derived values

    pub fn monthly_income(&self) -> f64 {
        aggregates::monthly_income(&self.incomes, self.today())
    }

    pub fn monthly_expenses(&self) -> f64 {
        aggregates::monthly_expenses(&self.transactions, self.today())
    }

    pub fn monthly_summary(&self) -> MonthlySummary {
        aggregates::monthly_summary(&self.incomes, &self.transactions, self.today())
    }

    /// Next `limit` recurring payments by due date
    pub fn upcoming_payments(&self, limit: usize) -> Vec<UpcomingPayment> {
        aggregates::upcoming_payments(&self.recurring_payments, self.today(), limit)
    }

    pub fn daily_spending(&self) -> Vec<DailySpending> {
        aggregates::daily_spending(&self.transactions, self.today())
    }

    pub fn top_budgets(&self, n: usize) -> Vec<Budget> {
        aggregates::top_budgets(&self.budgets, n)
    }
}

/// Amounts must be finite and strictly positive
fn validate_amount(what: &str, amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{} must be a positive number, got {}",
            what, amount
        )))
    }
}

/// Trimmed, non-empty text
fn validate_description(description: &str) -> Result<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("Description cannot be empty".into()));
    }
    Ok(trimmed.to_string())
}

fn validate_day_of_month(day: u32) -> Result<()> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "Day of month must be between 1 and 31, got {}",
            day
        )))
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
