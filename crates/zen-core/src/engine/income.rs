//! Income source operations
//!
//! Incomes only feed the monthly income figure; they never become transactions.

use tracing::info;

use super::{new_id, validate_amount, validate_description, FinanceEngine};
use crate::error::{Error, Result};
use crate::models::{Income, IncomeUpdate, NewIncome};
use crate::store::INCOMES_KEY;

impl FinanceEngine {
    pub fn incomes(&self) -> &[Income] {
        &self.incomes
    }

    pub fn income(&self, id: &str) -> Option<&Income> {
        self.incomes.iter().find(|i| i.id == id)
    }

    pub fn add_income(&mut self, new: NewIncome) -> Result<Income> {
        validate_amount("Amount", new.amount)?;
        let description = validate_description(&new.description)?;

        let income = Income {
            id: new_id(),
            description,
            amount: new.amount,
            frequency: new.frequency,
            start_date: new.start_date,
        };
        self.incomes.push(income.clone());
        self.persist(&[INCOMES_KEY]);

        info!(
            id = %income.id,
            amount = income.amount,
            frequency = %income.frequency,
            "Added income"
        );
        Ok(income)
    }

    pub fn update_income(&mut self, id: &str, update: IncomeUpdate) -> Result<Income> {
        let index = self
            .incomes
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| Error::NotFound(format!("Income {}", id)))?;

        if let Some(amount) = update.amount {
            validate_amount("Amount", amount)?;
        }
        let description = update
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?;

        let income = &mut self.incomes[index];
        if let Some(description) = description {
            income.description = description;
        }
        if let Some(amount) = update.amount {
            income.amount = amount;
        }
        if let Some(frequency) = update.frequency {
            income.frequency = frequency;
        }
        if let Some(start_date) = update.start_date {
            income.start_date = start_date;
        }
        let updated = income.clone();

        self.persist(&[INCOMES_KEY]);
        Ok(updated)
    }

    pub fn delete_income(&mut self, id: &str) -> Result<Income> {
        let index = self
            .incomes
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| Error::NotFound(format!("Income {}", id)))?;

        let removed = self.incomes.remove(index);
        self.persist(&[INCOMES_KEY]);

        info!(id = %removed.id, "Deleted income");
        Ok(removed)
    }
}
