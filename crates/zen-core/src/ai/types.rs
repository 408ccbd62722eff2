//! AI backend request/response types
//!
//! These types are backend-agnostic and used across all AI implementations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Category, RecurringPayment, Transaction};

/// Raw transaction details as returned by the model
///
/// Fields are left as loose strings here; the assistant validates them
/// against the allowed categories and the icon set before anything is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTransaction {
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub icon: String,
}

/// Flavor of a spending insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Observation,
    Suggestion,
    Alert,
    Positive,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Observation => "observation",
            Self::Suggestion => "suggestion",
            Self::Alert => "alert",
            Self::Positive => "positive",
        }
    }
}

/// One AI-generated remark about recent spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingInsight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Everything the budget suggester gets to see
#[derive(Debug, Clone)]
pub struct BudgetSuggestionRequest {
    pub monthly_income: f64,
    pub transactions: Vec<Transaction>,
    pub recurring_payments: Vec<RecurringPayment>,
    pub categories: Vec<Category>,
}

/// Suggested limit per category name
pub type BudgetSuggestions = BTreeMap<String, f64>;
