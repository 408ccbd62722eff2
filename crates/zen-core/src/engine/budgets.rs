//! Budget and category operations
//!
//! A budget *is* its category: the category name is the unique key that
//! transactions and recurring payments reference. Deletes and renames
//! cascade to every referencing record so no reference is ever left dangling.

use std::collections::BTreeMap;

use tracing::{info, warn};

use super::{validate_amount, FinanceEngine};
use crate::config::CHART_PALETTE;
use crate::error::{Error, Result};
use crate::models::{AppliedLimits, Budget, BudgetUpdate, Category, DeletedCategory, Icon};
use crate::store::{BUDGETS_KEY, RECURRING_PAYMENTS_KEY, TRANSACTIONS_KEY};

impl FinanceEngine {
    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    pub fn budget(&self, category: &Category) -> Option<&Budget> {
        self.budgets.iter().find(|b| &b.category == category)
    }

    /// Category names in budget order
    pub fn categories(&self) -> Vec<Category> {
        self.budgets.iter().map(|b| b.category.clone()).collect()
    }

    /// Icon for every category, in budget order
    pub fn category_icons(&self) -> Vec<(Category, Icon)> {
        self.budgets
            .iter()
            .map(|b| (b.category.clone(), b.icon))
            .collect()
    }

    /// The budget for `category`, or a validation error if there is none
    pub(super) fn require_category(&self, category: &Category) -> Result<&Budget> {
        self.budget(category)
            .ok_or_else(|| Error::Validation(format!("Unknown category: {}", category)))
    }

    fn budget_index(&self, category: &Category) -> Result<usize> {
        self.budgets
            .iter()
            .position(|b| &b.category == category)
            .ok_or_else(|| Error::NotFound(format!("Category {}", category)))
    }

    /// Create a new category with its budget
    pub fn add_category(&mut self, category: Category, icon: Icon, limit: f64) -> Result<Budget> {
        validate_category_name(&category)?;
        validate_amount("Budget limit", limit)?;
        if self.budget(&category).is_some() {
            return Err(Error::Validation(format!(
                "Category already exists: {}",
                category
            )));
        }

        let budget = Budget {
            category,
            limit,
            spent: 0.0,
            icon,
            color: CHART_PALETTE[self.budgets.len() % CHART_PALETTE.len()].to_string(),
        };
        self.budgets.push(budget.clone());
        self.persist(&[BUDGETS_KEY]);
        self.recompute();

        info!(category = %budget.category, limit = budget.limit, "Added category");
        Ok(budget)
    }

    /// Merge limit/icon/color changes into a budget
    pub fn update_budget(&mut self, category: &Category, update: BudgetUpdate) -> Result<Budget> {
        let index = self.budget_index(category)?;
        if let Some(limit) = update.limit {
            validate_amount("Budget limit", limit)?;
        }

        let budget = &mut self.budgets[index];
        if let Some(limit) = update.limit {
            budget.limit = limit;
        }
        if let Some(icon) = update.icon {
            budget.icon = icon;
        }
        if let Some(color) = update.color {
            budget.color = color;
        }
        let updated = budget.clone();

        self.persist(&[BUDGETS_KEY]);
        self.recompute();
        Ok(updated)
    }

    pub fn update_budget_limit(&mut self, category: &Category, limit: f64) -> Result<Budget> {
        self.update_budget(
            category,
            BudgetUpdate {
                limit: Some(limit),
                ..Default::default()
            },
        )
    }

    /// Rename a category everywhere it is referenced
    pub fn rename_category(&mut self, old: &Category, new: Category) -> Result<Budget> {
        let index = self.budget_index(old)?;
        validate_category_name(&new)?;
        if &new == old {
            return Ok(self.budgets[index].clone());
        }
        if self.budget(&new).is_some() {
            return Err(Error::Validation(format!(
                "Category already exists: {}",
                new
            )));
        }

        let mut transactions_renamed = 0;
        for tx in self.transactions.iter_mut().filter(|t| &t.category == old) {
            tx.category = new.clone();
            transactions_renamed += 1;
        }
        let mut payments_renamed = 0;
        for payment in self
            .recurring_payments
            .iter_mut()
            .filter(|p| &p.category == old)
        {
            payment.category = new.clone();
            payments_renamed += 1;
        }
        self.budgets[index].category = new;
        let renamed = self.budgets[index].clone();

        self.persist(&[TRANSACTIONS_KEY, RECURRING_PAYMENTS_KEY, BUDGETS_KEY]);
        self.recompute();

        info!(
            from = %old,
            to = %renamed.category,
            transactions = transactions_renamed,
            recurring = payments_renamed,
            "Renamed category"
        );
        Ok(renamed)
    }

    /// Delete a category and every transaction and recurring payment in it
    pub fn delete_category(&mut self, category: &Category) -> Result<DeletedCategory> {
        let index = self.budget_index(category)?;

        let budget = self.budgets.remove(index);
        let tx_before = self.transactions.len();
        self.transactions.retain(|t| &t.category != category);
        let rp_before = self.recurring_payments.len();
        self.recurring_payments.retain(|p| &p.category != category);

        let deleted = DeletedCategory {
            budget,
            transactions_removed: tx_before - self.transactions.len(),
            recurring_payments_removed: rp_before - self.recurring_payments.len(),
        };

        self.persist(&[TRANSACTIONS_KEY, RECURRING_PAYMENTS_KEY, BUDGETS_KEY]);
        self.recompute();

        info!(
            category = %category,
            transactions = deleted.transactions_removed,
            recurring = deleted.recurring_payments_removed,
            "Deleted category"
        );
        Ok(deleted)
    }

    /// Apply a category -> limit map (e.g. AI suggestions) in one mutation
    ///
    /// Unknown categories and non-positive limits are skipped and reported;
    /// the rest are applied together with a single write.
    pub fn apply_budget_limits(&mut self, limits: &BTreeMap<String, f64>) -> AppliedLimits {
        let mut result = AppliedLimits::default();

        for (name, &limit) in limits {
            let category = Category::from(name.trim().to_string());
            let Some(budget) = self.budgets.iter_mut().find(|b| b.category == category) else {
                result
                    .skipped
                    .push((name.clone(), "no such category".to_string()));
                continue;
            };
            if validate_amount("Budget limit", limit).is_err() {
                result
                    .skipped
                    .push((name.clone(), format!("invalid limit {}", limit)));
                continue;
            }
            budget.limit = limit;
            result.applied.push((category, limit));
        }

        if !result.applied.is_empty() {
            self.persist(&[BUDGETS_KEY]);
            self.recompute();
        }
        if !result.skipped.is_empty() {
            warn!(skipped = ?result.skipped, "Some budget limits were not applied");
        }
        info!(applied = result.applied.len(), "Applied budget limits");
        result
    }
}

fn validate_category_name(category: &Category) -> Result<()> {
    if category.as_str().trim().is_empty() {
        return Err(Error::Validation("Category name cannot be empty".into()));
    }
    Ok(())
}
