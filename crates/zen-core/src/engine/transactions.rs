//! Transaction operations

use chrono::NaiveDate;
use tracing::info;

use super::{new_id, validate_amount, validate_description, FinanceEngine};
use crate::aggregates;
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction, TransactionSort, TransactionUpdate};
use crate::store::TRANSACTIONS_KEY;

impl FinanceEngine {
    /// All transactions in insertion order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Add a transaction; the icon falls back to the category's icon
    pub fn add_transaction(&mut self, new: NewTransaction) -> Result<Transaction> {
        validate_amount("Amount", new.amount)?;
        let description = validate_description(&new.description)?;
        let default_icon = self.require_category(&new.category)?.icon;

        let transaction = Transaction {
            id: new_id(),
            amount: new.amount,
            description,
            icon: new.icon.unwrap_or(default_icon),
            category: new.category,
            date: new.date,
            source: new.source,
        };

        self.transactions.push(transaction.clone());
        self.persist(&[TRANSACTIONS_KEY]);
        self.recompute();

        info!(
            id = %transaction.id,
            amount = transaction.amount,
            category = %transaction.category,
            source = %transaction.source,
            "Added transaction"
        );
        Ok(transaction)
    }

    /// Merge the given fields into an existing transaction
    pub fn update_transaction(
        &mut self,
        id: &str,
        update: TransactionUpdate,
    ) -> Result<Transaction> {
        let index = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))?;

        if let Some(amount) = update.amount {
            validate_amount("Amount", amount)?;
        }
        let description = update
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?;
        if let Some(category) = &update.category {
            self.require_category(category)?;
        }

        let transaction = &mut self.transactions[index];
        if let Some(amount) = update.amount {
            transaction.amount = amount;
        }
        if let Some(description) = description {
            transaction.description = description;
        }
        if let Some(category) = update.category {
            transaction.category = category;
        }
        if let Some(icon) = update.icon {
            transaction.icon = icon;
        }
        if let Some(date) = update.date {
            transaction.date = date;
        }
        let updated = transaction.clone();

        self.persist(&[TRANSACTIONS_KEY]);
        self.recompute();
        Ok(updated)
    }

    pub fn delete_transaction(&mut self, id: &str) -> Result<Transaction> {
        let index = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))?;

        let removed = self.transactions.remove(index);
        self.persist(&[TRANSACTIONS_KEY]);
        self.recompute();

        info!(id = %removed.id, "Deleted transaction");
        Ok(removed)
    }

    /// Transactions ordered by the given key
    pub fn sorted_transactions(&self, sort: TransactionSort, descending: bool) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.transactions.iter().collect();
        match sort {
            TransactionSort::Date => sorted.sort_by_key(|t| t.date),
            TransactionSort::Amount => sorted.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
            TransactionSort::Description => sorted.sort_by_key(|t| t.description.to_lowercase()),
            TransactionSort::Category => {
                sorted.sort_by(|a, b| a.category.as_str().cmp(b.category.as_str()))
            }
        }
        if descending {
            sorted.reverse();
        }
        sorted
    }

    /// Transactions dated on the given day (calendar view), earliest first
    pub fn transactions_on(&self, date: NaiveDate) -> Vec<&Transaction> {
        let mut on_day: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|t| t.date.date() == date)
            .collect();
        on_day.sort_by_key(|t| t.date);
        on_day
    }

    /// Transactions dated in the current calendar month
    pub fn current_month_transactions(&self) -> Vec<&Transaction> {
        let (start, end) = aggregates::month_window(self.today());
        self.transactions
            .iter()
            .filter(|t| t.date >= start && t.date < end)
            .collect()
    }
}
