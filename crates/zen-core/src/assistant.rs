//! AI-assisted flows over the finance engine
//!
//! The AI backends only produce suggestions. Everything here validates the
//! model's output and then goes through the engine's ordinary mutators, so a
//! failed or nonsensical response never changes state.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::ai::{AIBackend, BudgetSuggestionRequest, BudgetSuggestions, ExtractedTransaction};
use crate::ai::{InsightKind, SpendingInsight};
use crate::engine::FinanceEngine;
use crate::error::{Error, Result};
use crate::models::{AppliedLimits, Category, Icon, NewTransaction, Transaction, TransactionSource};

/// A model-extracted transaction that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTransaction {
    pub amount: f64,
    pub description: String,
    pub category: Category,
    pub icon: Icon,
}

/// Turn free text into a validated transaction draft
///
/// Any backend error or an answer outside the allowed categories and icons
/// is reported as `Error::ParseFailed`.
pub async fn parse_transaction<A: AIBackend + ?Sized>(
    ai: &A,
    text: &str,
    categories: &[Category],
) -> Result<ParsedTransaction> {
    let details = extract(ai, text, categories).await?;
    validate_extracted(details, categories, None)
}

/// Parse free text and add it as an AI-sourced transaction
///
/// `amount_override` replaces whatever amount the model found; `date`
/// defaults to the engine's current time.
pub async fn log_transaction_from_text<A: AIBackend + ?Sized>(
    engine: &mut FinanceEngine,
    ai: &A,
    text: &str,
    amount_override: Option<f64>,
    date: Option<NaiveDateTime>,
) -> Result<Transaction> {
    let categories = engine.categories();
    let details = extract(ai, text, &categories).await?;
    let parsed = validate_extracted(details, &categories, amount_override)?;
    let date = date.unwrap_or_else(|| engine.now());

    engine.add_transaction(NewTransaction {
        amount: parsed.amount,
        description: parsed.description,
        category: parsed.category,
        icon: Some(parsed.icon),
        date,
        source: TransactionSource::Ai,
    })
}

/// Remarks about this month's spending
pub async fn spending_insights<A: AIBackend + ?Sized>(
    engine: &FinanceEngine,
    ai: &A,
) -> Result<Vec<SpendingInsight>> {
    if engine.transactions().is_empty() {
        return Ok(vec![SpendingInsight {
            kind: InsightKind::Observation,
            title: "No transactions yet".to_string(),
            description: "Add some transactions to get personalized insights.".to_string(),
            category: None,
            icon: Some(Icon::Receipt.as_str().to_string()),
        }]);
    }

    let transactions: Vec<Transaction> = engine
        .current_month_transactions()
        .into_iter()
        .cloned()
        .collect();

    ai.generate_spending_insights(&transactions, &engine.categories())
        .await
        .map_err(as_parse_failure)
}

/// Ask for a limit per category, keeping only categories that exist
pub async fn suggest_budgets<A: AIBackend + ?Sized>(
    engine: &FinanceEngine,
    ai: &A,
) -> Result<BudgetSuggestions> {
    let categories = engine.categories();
    let request = BudgetSuggestionRequest {
        monthly_income: engine.monthly_income(),
        transactions: engine
            .current_month_transactions()
            .into_iter()
            .cloned()
            .collect(),
        recurring_payments: engine.recurring_payments().to_vec(),
        categories: categories.clone(),
    };

    let suggestions = ai
        .suggest_budget(&request)
        .await
        .map_err(as_parse_failure)?;

    let (known, unknown): (BudgetSuggestions, BudgetSuggestions) = suggestions
        .into_iter()
        .partition(|(name, _)| categories.contains(&Category::from(name.clone())));
    if !unknown.is_empty() {
        debug!(dropped = ?unknown.keys().collect::<Vec<_>>(), "Ignoring suggested categories");
    }
    Ok(known)
}

/// Suggest limits and apply them in one write
pub async fn apply_suggested_budgets<A: AIBackend + ?Sized>(
    engine: &mut FinanceEngine,
    ai: &A,
) -> Result<AppliedLimits> {
    let suggestions = suggest_budgets(engine, ai).await?;
    let applied = engine.apply_budget_limits(&suggestions);
    info!(
        applied = applied.applied.len(),
        skipped = applied.skipped.len(),
        "Applied suggested budgets"
    );
    Ok(applied)
}

async fn extract<A: AIBackend + ?Sized>(
    ai: &A,
    text: &str,
    categories: &[Category],
) -> Result<ExtractedTransaction> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::ParseFailed("Nothing to parse".into()));
    }

    let details = ai
        .extract_transaction_details(text, categories)
        .await
        .map_err(as_parse_failure)?;
    debug!(?details, "Extracted transaction details");
    Ok(details)
}

fn validate_extracted(
    details: ExtractedTransaction,
    categories: &[Category],
    amount_override: Option<f64>,
) -> Result<ParsedTransaction> {
    let amount = amount_override.unwrap_or(details.amount);
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::ParseFailed(format!(
            "Could not find a positive amount (got {})",
            amount
        )));
    }

    let description = details.description.trim();
    if description.is_empty() {
        return Err(Error::ParseFailed("Model returned an empty description".into()));
    }

    let category = Category::from(details.category.trim().to_string());
    if !categories.contains(&category) {
        return Err(Error::ParseFailed(format!(
            "Model picked a category that does not exist: {}",
            details.category
        )));
    }

    let icon: Icon = details
        .icon
        .parse()
        .map_err(|e: String| Error::ParseFailed(e))?;

    Ok(ParsedTransaction {
        amount,
        description: description.to_string(),
        category,
        icon,
    })
}

fn as_parse_failure(err: Error) -> Error {
    match err {
        Error::ParseFailed(_) => err,
        other => Error::ParseFailed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::ai::MockBackend;
    use crate::clock::FixedClock;
    use crate::config::Settings;
    use crate::models::{BuiltinCategory, NewIncome, IncomeFrequency, Transaction};
    use crate::store::MemoryStore;

    fn engine() -> FinanceEngine {
        FinanceEngine::open(
            MemoryStore::new(),
            FixedClock::at(2026, 3, 10),
            Settings::default(),
        )
    }

    /// Returns a fixed answer regardless of input
    struct Canned(ExtractedTransaction);

    #[async_trait]
    impl AIBackend for Canned {
        async fn extract_transaction_details(
            &self,
            _text: &str,
            _categories: &[Category],
        ) -> Result<ExtractedTransaction> {
            Ok(self.0.clone())
        }

        async fn generate_spending_insights(
            &self,
            _transactions: &[Transaction],
            _categories: &[Category],
        ) -> Result<Vec<SpendingInsight>> {
            Ok(vec![])
        }

        async fn suggest_budget(
            &self,
            _request: &BudgetSuggestionRequest,
        ) -> Result<BudgetSuggestions> {
            Ok(BudgetSuggestions::from([
                ("Misc".to_string(), 80.0),
                ("Yachts".to_string(), 9000.0),
            ]))
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn model(&self) -> &str {
            "canned"
        }

        fn host(&self) -> &str {
            "canned://"
        }
    }

    fn canned(category: &str, icon: &str, amount: f64) -> Canned {
        Canned(ExtractedTransaction {
            amount,
            description: "Thing".to_string(),
            category: category.to_string(),
            icon: icon.to_string(),
        })
    }

    #[tokio::test]
    async fn test_parse_transaction() {
        let engine = engine();
        let parsed = parse_transaction(&MockBackend::new(), "uber to the airport 32.40", &engine.categories())
            .await
            .unwrap();
        assert_eq!(parsed.amount, 32.40);
        assert_eq!(parsed.category, Category::Builtin(BuiltinCategory::Transportation));
        assert_eq!(parsed.icon, Icon::Car);
    }

    #[tokio::test]
    async fn test_empty_text_never_reaches_backend() {
        // A failing backend would produce a different message
        let err = parse_transaction(&MockBackend::failing(), "   ", &[])
            .await
            .unwrap_err();
        match err {
            Error::ParseFailed(msg) => assert_eq!(msg, "Nothing to parse"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_rejects_bad_model_output() {
        let categories = engine().categories();
        for backend in [
            canned("Yachts", "Car", 10.0),
            canned("Misc", "Spaceship", 10.0),
            canned("Misc", "Car", 0.0),
            canned("Misc", "Car", -4.0),
        ] {
            let err = parse_transaction(&backend, "anything", &categories)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::ParseFailed(_)));
        }
    }

    #[tokio::test]
    async fn test_backend_error_becomes_parse_failure() {
        let err = parse_transaction(&MockBackend::failing(), "coffee 3", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ParseFailed(_)));
    }

    #[tokio::test]
    async fn test_log_transaction_from_text() {
        let mut engine = engine();
        let tx = log_transaction_from_text(&mut engine, &MockBackend::new(), "pizza night 18", None, None)
            .await
            .unwrap();

        assert_eq!(tx.source, TransactionSource::Ai);
        assert_eq!(tx.date, engine.now());
        let food = engine
            .budget(&Category::Builtin(BuiltinCategory::FoodAndDrink))
            .unwrap();
        assert_eq!(food.spent, 18.0);
    }

    #[tokio::test]
    async fn test_amount_override_wins() {
        let mut engine = engine();
        let tx = log_transaction_from_text(
            &mut engine,
            &MockBackend::new(),
            "groceries",
            Some(54.20),
            None,
        )
        .await
        .unwrap();
        assert_eq!(tx.amount, 54.20);
    }

    #[tokio::test]
    async fn test_failed_log_leaves_state_untouched() {
        let mut engine = engine();
        let result =
            log_transaction_from_text(&mut engine, &MockBackend::new(), "no amount here", None, None)
                .await;
        assert!(matches!(result, Err(Error::ParseFailed(_))));
        assert!(engine.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_insights_without_transactions_skip_backend() {
        let engine = engine();
        let insights = spending_insights(&engine, &MockBackend::failing())
            .await
            .unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Observation);
    }

    #[tokio::test]
    async fn test_insights_with_transactions() {
        let mut engine = engine();
        log_transaction_from_text(&mut engine, &MockBackend::new(), "coffee 4", None, None)
            .await
            .unwrap();
        let insights = spending_insights(&engine, &MockBackend::new()).await.unwrap();
        assert_eq!(insights[0].category.as_deref(), Some("Food & Drink"));
    }

    #[tokio::test]
    async fn test_suggestions_restricted_to_existing_categories() {
        let engine = engine();
        let suggestions = suggest_budgets(&engine, &canned("Misc", "Car", 1.0))
            .await
            .unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions.get("Misc"), Some(&80.0));
    }

    #[tokio::test]
    async fn test_apply_suggested_budgets() {
        let mut engine = engine();
        engine
            .add_income(NewIncome {
                description: "Salary".to_string(),
                amount: 3000.0,
                frequency: IncomeFrequency::Monthly,
                start_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            })
            .unwrap();

        let applied = apply_suggested_budgets(&mut engine, &MockBackend::new())
            .await
            .unwrap();
        assert_eq!(applied.applied.len(), engine.budgets().len());
        let total: f64 = engine.budgets().iter().map(|b| b.limit).sum();
        assert!(total <= 3000.0);
    }
}
