//! Recurring payment operations and auto-materialization
//!
//! A payment is due on `day_of_month` of each calendar month. On every pass,
//! a payment whose due date this month has arrived and whose `last_logged`
//! is not in this month becomes a transaction dated on the due date. The
//! `last_logged` stamp makes the pass idempotent within a month. Months
//! without that day (e.g. the 31st in April) are skipped, never clamped.

use chrono::Datelike;
use tracing::info;

use super::{new_id, validate_amount, validate_day_of_month, validate_description, FinanceEngine};
use crate::aggregates::{due_date_in_month, midnight, same_month};
use crate::error::{Error, Result};
use crate::models::{
    NewRecurringPayment, PaymentLogged, RecurringPayment, RecurringPaymentUpdate, Transaction,
    TransactionSource,
};
use crate::store::{RECURRING_PAYMENTS_KEY, TRANSACTIONS_KEY};

impl FinanceEngine {
    pub fn recurring_payments(&self) -> &[RecurringPayment] {
        &self.recurring_payments
    }

    pub fn recurring_payment(&self, id: &str) -> Option<&RecurringPayment> {
        self.recurring_payments.iter().find(|p| p.id == id)
    }

    /// Add a recurring payment; if it is already due this month it is logged immediately
    pub fn add_recurring_payment(&mut self, new: NewRecurringPayment) -> Result<RecurringPayment> {
        validate_amount("Amount", new.amount)?;
        let description = validate_description(&new.description)?;
        validate_day_of_month(new.day_of_month)?;
        let default_icon = self.require_category(&new.category)?.icon;

        let payment = RecurringPayment {
            id: new_id(),
            description,
            amount: new.amount,
            icon: new.icon.unwrap_or(default_icon),
            category: new.category,
            day_of_month: new.day_of_month,
            last_logged: None,
        };
        self.recurring_payments.push(payment.clone());
        self.persist(&[RECURRING_PAYMENTS_KEY]);

        info!(
            id = %payment.id,
            description = %payment.description,
            day_of_month = payment.day_of_month,
            "Added recurring payment"
        );
        self.tick();

        Ok(self
            .recurring_payment(&payment.id)
            .cloned()
            .unwrap_or(payment))
    }

    pub fn update_recurring_payment(
        &mut self,
        id: &str,
        update: RecurringPaymentUpdate,
    ) -> Result<RecurringPayment> {
        let index = self
            .recurring_payments
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("Recurring payment {}", id)))?;

        if let Some(amount) = update.amount {
            validate_amount("Amount", amount)?;
        }
        let description = update
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?;
        if let Some(day) = update.day_of_month {
            validate_day_of_month(day)?;
        }
        if let Some(category) = &update.category {
            self.require_category(category)?;
        }

        let payment = &mut self.recurring_payments[index];
        if let Some(description) = description {
            payment.description = description;
        }
        if let Some(amount) = update.amount {
            payment.amount = amount;
        }
        if let Some(category) = update.category {
            payment.category = category;
        }
        if let Some(icon) = update.icon {
            payment.icon = icon;
        }
        if let Some(day) = update.day_of_month {
            payment.day_of_month = day;
        }

        self.persist(&[RECURRING_PAYMENTS_KEY]);
        self.tick();

        Ok(self.recurring_payments[index].clone())
    }

    /// Stop a recurring payment; transactions it already logged are kept
    pub fn delete_recurring_payment(&mut self, id: &str) -> Result<RecurringPayment> {
        let index = self
            .recurring_payments
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("Recurring payment {}", id)))?;

        let removed = self.recurring_payments.remove(index);
        self.persist(&[RECURRING_PAYMENTS_KEY]);
        self.recompute();

        info!(id = %removed.id, "Deleted recurring payment");
        Ok(removed)
    }

    /// Log every payment that has come due this month and was not yet logged
    pub(super) fn materialize_due_payments(&mut self) -> Vec<PaymentLogged> {
        let now = self.now();
        let today = now.date();
        let mut logged = Vec::new();

        for payment in self.recurring_payments.iter_mut() {
            let Some(due) = due_date_in_month(today.year(), today.month(), payment.day_of_month)
            else {
                continue;
            };
            if due > today {
                continue;
            }
            if payment
                .last_logged
                .is_some_and(|at| same_month(at.date(), today))
            {
                continue;
            }

            let transaction_id = format!("recurring-{}-{}", payment.id, due.format("%Y-%m"));
            // A lost stamp must not produce a second transaction for the same month
            if !self.transactions.iter().any(|t| t.id == transaction_id) {
                self.transactions.push(Transaction {
                    id: transaction_id.clone(),
                    amount: payment.amount,
                    description: payment.description.clone(),
                    category: payment.category.clone(),
                    icon: payment.icon,
                    date: midnight(due),
                    source: TransactionSource::Recurring,
                });
            }
            payment.last_logged = Some(now);

            info!(
                payment = %payment.id,
                description = %payment.description,
                amount = payment.amount,
                due = %due,
                "Auto-logged recurring payment"
            );
            logged.push(PaymentLogged {
                payment_id: payment.id.clone(),
                transaction_id,
                description: payment.description.clone(),
                amount: payment.amount,
                due_date: due,
            });
        }

        if !logged.is_empty() {
            self.persist(&[TRANSACTIONS_KEY, RECURRING_PAYMENTS_KEY]);
        }
        logged
    }
}
