//! Mock backend for testing
//!
//! Keyword rules stand in for a model so the assistant flows can run offline
//! and in tests. The same rules back the mock Ollama server in `test_utils`.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{BuiltinCategory, Category, Icon, Transaction};

use super::types::{
    BudgetSuggestionRequest, BudgetSuggestions, ExtractedTransaction, InsightKind,
    SpendingInsight,
};
use super::AIBackend;

/// Keyword -> category, checked in order
const CATEGORY_KEYWORDS: &[(&str, BuiltinCategory)] = &[
    ("uber", BuiltinCategory::Transportation),
    ("lyft", BuiltinCategory::Transportation),
    ("taxi", BuiltinCategory::Transportation),
    ("bus", BuiltinCategory::Transportation),
    ("train", BuiltinCategory::Transportation),
    ("gas", BuiltinCategory::Transportation),
    ("fuel", BuiltinCategory::Transportation),
    ("parking", BuiltinCategory::Transportation),
    ("flight", BuiltinCategory::Transportation),
    ("coffee", BuiltinCategory::FoodAndDrink),
    ("cafe", BuiltinCategory::FoodAndDrink),
    ("lunch", BuiltinCategory::FoodAndDrink),
    ("dinner", BuiltinCategory::FoodAndDrink),
    ("breakfast", BuiltinCategory::FoodAndDrink),
    ("restaurant", BuiltinCategory::FoodAndDrink),
    ("pizza", BuiltinCategory::FoodAndDrink),
    ("groceries", BuiltinCategory::FoodAndDrink),
    ("grocery", BuiltinCategory::FoodAndDrink),
    ("movie", BuiltinCategory::Entertainment),
    ("cinema", BuiltinCategory::Entertainment),
    ("concert", BuiltinCategory::Entertainment),
    ("netflix", BuiltinCategory::Entertainment),
    ("spotify", BuiltinCategory::Entertainment),
    ("game", BuiltinCategory::Entertainment),
    ("rent", BuiltinCategory::Essentials),
    ("electric", BuiltinCategory::Essentials),
    ("utility", BuiltinCategory::Essentials),
    ("internet", BuiltinCategory::Essentials),
    ("insurance", BuiltinCategory::Essentials),
    ("phone", BuiltinCategory::Essentials),
    ("pharmacy", BuiltinCategory::Essentials),
    ("amazon", BuiltinCategory::Shopping),
    ("shirt", BuiltinCategory::Shopping),
    ("shoes", BuiltinCategory::Shopping),
    ("clothes", BuiltinCategory::Shopping),
    ("mall", BuiltinCategory::Shopping),
];

/// Keyword -> icon, checked in order before falling back to the category icon
const ICON_KEYWORDS: &[(&str, Icon)] = &[
    ("coffee", Icon::Coffee),
    ("cafe", Icon::Coffee),
    ("pizza", Icon::Pizza),
    ("uber", Icon::Car),
    ("lyft", Icon::Car),
    ("taxi", Icon::Car),
    ("gas", Icon::Car),
    ("bus", Icon::Bus),
    ("train", Icon::Bus),
    ("flight", Icon::Plane),
    ("movie", Icon::Film),
    ("cinema", Icon::Film),
    ("concert", Icon::Music),
    ("spotify", Icon::Music),
    ("gym", Icon::Dumbbell),
    ("gift", Icon::Gift),
    ("book", Icon::Book),
    ("phone", Icon::Smartphone),
    ("laptop", Icon::Laptop),
    ("shirt", Icon::Shirt),
    ("clothes", Icon::Shirt),
    ("vet", Icon::PawPrint),
    ("rent", Icon::Home),
];

/// Share of income handed out across categories with no history
const UNSEEN_SHARE: f64 = 0.5;

/// Mock AI backend for testing
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Whether every request should fail
    pub fail: bool,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            fail: false,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            fail: false,
        }
    }

    /// A backend whose every request errors, like a dropped connection
    pub fn failing() -> Self {
        Self {
            healthy: false,
            fail: true,
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(Error::ParseFailed("Mock backend configured to fail".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn extract_transaction_details(
        &self,
        text: &str,
        categories: &[Category],
    ) -> Result<ExtractedTransaction> {
        self.check()?;
        let allowed: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
        Ok(extract_from_text(text, &allowed))
    }

    async fn generate_spending_insights(
        &self,
        transactions: &[Transaction],
        _categories: &[Category],
    ) -> Result<Vec<SpendingInsight>> {
        self.check()?;
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for tx in transactions {
            *totals.entry(tx.category.to_string()).or_default() += tx.amount;
        }
        Ok(insights_from_totals(&totals))
    }

    async fn suggest_budget(&self, request: &BudgetSuggestionRequest) -> Result<BudgetSuggestions> {
        self.check()?;
        let mut spent: BTreeMap<String, f64> = BTreeMap::new();
        for tx in &request.transactions {
            *spent.entry(tx.category.to_string()).or_default() += tx.amount;
        }
        let mut recurring: BTreeMap<String, f64> = BTreeMap::new();
        for p in &request.recurring_payments {
            *recurring.entry(p.category.to_string()).or_default() += p.amount;
        }
        let categories: Vec<String> = request.categories.iter().map(|c| c.to_string()).collect();
        Ok(suggest_limits(
            request.monthly_income,
            &spent,
            &recurring,
            &categories,
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://local"
    }
}

/// First positive number in the text, ignoring a leading currency sign
pub(crate) fn first_amount(text: &str) -> Option<f64> {
    text.split_whitespace()
        .map(|word| {
            word.trim_start_matches(['$', '€', '£'])
                .trim_end_matches(|c: char| !c.is_ascii_digit())
        })
        .filter_map(|word| word.parse::<f64>().ok())
        .find(|amount| amount.is_finite() && *amount > 0.0)
}

/// Best keyword match among the allowed category names
pub(crate) fn guess_category(text: &str, allowed: &[String]) -> String {
    let lower = text.to_lowercase();
    let is_allowed = |name: &str| allowed.iter().any(|a| a == name);

    // A custom category named in the text wins over keyword rules
    if let Some(named) = allowed
        .iter()
        .find(|a| lower.contains(&a.to_lowercase()))
    {
        return named.clone();
    }

    CATEGORY_KEYWORDS
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .map(|(_, category)| category.as_str())
        .find(|name| is_allowed(*name))
        .map(str::to_string)
        .or_else(|| {
            let misc = BuiltinCategory::Misc.as_str();
            is_allowed(misc).then(|| misc.to_string())
        })
        .or_else(|| allowed.first().cloned())
        .unwrap_or_else(|| BuiltinCategory::Misc.as_str().to_string())
}

pub(crate) fn guess_icon(text: &str, category: &str) -> Icon {
    let lower = text.to_lowercase();
    ICON_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, icon)| *icon)
        .or_else(|| {
            category
                .parse::<BuiltinCategory>()
                .ok()
                .map(|b| b.default_icon())
        })
        .unwrap_or(Icon::Receipt)
}

/// The text without amount tokens, first letter capitalized
pub(crate) fn clean_description(text: &str) -> String {
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|word| {
            let bare = word
                .trim_start_matches(['$', '€', '£'])
                .trim_end_matches(|c: char| !c.is_ascii_digit());
            bare.parse::<f64>().is_err()
        })
        .collect();
    let joined = words.join(" ");
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Amount is 0 when the text has none, like the extraction prompt asks
pub(crate) fn extract_from_text(text: &str, allowed: &[String]) -> ExtractedTransaction {
    let category = guess_category(text, allowed);
    let icon = guess_icon(text, &category);
    ExtractedTransaction {
        amount: first_amount(text).unwrap_or(0.0),
        description: clean_description(text),
        category,
        icon: icon.as_str().to_string(),
    }
}

/// Deterministic remarks from per-category totals
pub(crate) fn insights_from_totals(totals: &BTreeMap<String, f64>) -> Vec<SpendingInsight> {
    let mut ranked: Vec<(&String, f64)> = totals.iter().map(|(c, a)| (c, *a)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let total: f64 = ranked.iter().map(|(_, a)| a).sum();

    let Some(&(top, top_amount)) = ranked.first() else {
        return vec![SpendingInsight {
            kind: InsightKind::Observation,
            title: "No spending yet".to_string(),
            description: "Log a few expenses to get insights.".to_string(),
            category: None,
            icon: Some(Icon::Wallet.as_str().to_string()),
        }];
    };

    let mut insights = vec![SpendingInsight {
        kind: InsightKind::Observation,
        title: format!("{} leads spending", top),
        description: format!(
            "{} accounts for {:.2} of {:.2} spent this month.",
            top, top_amount, total
        ),
        category: Some(top.clone()),
        icon: Some(guess_icon(top, top).as_str().to_string()),
    }];

    if total > 0.0 && top_amount / total > 0.5 && ranked.len() > 1 {
        insights.push(SpendingInsight {
            kind: InsightKind::Alert,
            title: format!("{} is over half", top),
            description: format!(
                "More than half of this month's spending went to {}.",
                top
            ),
            category: Some(top.clone()),
            icon: None,
        });
    }

    if let Some(&(lowest, lowest_amount)) = ranked.last().filter(|_| ranked.len() > 1) {
        insights.push(SpendingInsight {
            kind: InsightKind::Positive,
            title: format!("{} stays low", lowest),
            description: format!("Only {:.2} went to {} so far.", lowest_amount, lowest),
            category: Some(lowest.clone()),
            icon: None,
        });
    } else {
        insights.push(SpendingInsight {
            kind: InsightKind::Suggestion,
            title: "Spread out tracking".to_string(),
            description: "All spending sits in one category; check it is categorized right."
                .to_string(),
            category: None,
            icon: None,
        });
    }

    insights
}

/// Limit per category: recent spend plus 10%, never below its recurring bills
///
/// Categories with no history share half the income. The result is scaled
/// down so the total never exceeds income.
pub(crate) fn suggest_limits(
    income: f64,
    spent: &BTreeMap<String, f64>,
    recurring: &BTreeMap<String, f64>,
    categories: &[String],
) -> BudgetSuggestions {
    let unseen = categories
        .iter()
        .filter(|c| !spent.contains_key(*c) && !recurring.contains_key(*c))
        .count();
    let unseen_limit = if unseen > 0 {
        income.max(0.0) * UNSEEN_SHARE / unseen as f64
    } else {
        0.0
    };

    let mut limits: BudgetSuggestions = categories
        .iter()
        .map(|c| {
            let from_spend = spent.get(c).copied().unwrap_or(0.0) * 1.1;
            let from_bills = recurring.get(c).copied().unwrap_or(0.0);
            let limit = from_spend.max(from_bills);
            (c.clone(), if limit > 0.0 { limit } else { unseen_limit })
        })
        .collect();

    let total: f64 = limits.values().sum();
    let scale = if total > income && total > 0.0 {
        income.max(0.0) / total
    } else {
        1.0
    };
    for limit in limits.values_mut() {
        *limit = (*limit * scale).floor();
    }
    limits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_amount() {
        assert_eq!(first_amount("uber to the airport 32.40"), Some(32.40));
        assert_eq!(first_amount("coffee $4.50, with Sam"), Some(4.50));
        assert_eq!(first_amount("lunch with 0 friends"), None);
        assert_eq!(first_amount("no numbers here"), None);
    }

    #[test]
    fn test_guess_category_respects_allowed_list() {
        let allowed = names(&["Food & Drink", "Transportation", "Misc"]);
        assert_eq!(guess_category("uber home", &allowed), "Transportation");
        assert_eq!(guess_category("movie night", &allowed), "Misc");

        let no_misc = names(&["Pets"]);
        assert_eq!(guess_category("uber home", &no_misc), "Pets");
    }

    #[test]
    fn test_guess_category_prefers_named_custom() {
        let allowed = names(&["Food & Drink", "Pets"]);
        assert_eq!(guess_category("pets food 12", &allowed), "Pets");
    }

    #[test]
    fn test_clean_description() {
        assert_eq!(clean_description("uber to the airport 32.40"), "Uber to the airport");
        assert_eq!(clean_description("12"), "");
    }

    #[tokio::test]
    async fn test_extract_via_backend() {
        let backend = MockBackend::new();
        let details = backend
            .extract_transaction_details(
                "coffee with Sam 4.50",
                &[Category::Builtin(BuiltinCategory::FoodAndDrink)],
            )
            .await
            .unwrap();
        assert_eq!(details.amount, 4.50);
        assert_eq!(details.category, "Food & Drink");
        assert_eq!(details.icon, "Coffee");
        assert_eq!(details.description, "Coffee with Sam");
    }

    #[tokio::test]
    async fn test_extract_without_amount() {
        let details = MockBackend::new()
            .extract_transaction_details("groceries", &[])
            .await
            .unwrap();
        assert_eq!(details.amount, 0.0);
        assert_eq!(details.category, "Misc");
    }

    #[tokio::test]
    async fn test_failing_backend() {
        let backend = MockBackend::failing();
        assert!(backend
            .extract_transaction_details("coffee 3", &[])
            .await
            .is_err());
        assert!(!backend.health_check().await);
    }

    #[test]
    fn test_insights_from_totals() {
        assert_eq!(insights_from_totals(&BTreeMap::new()).len(), 1);

        let totals = BTreeMap::from([
            ("Food & Drink".to_string(), 300.0),
            ("Transportation".to_string(), 50.0),
        ]);
        let insights = insights_from_totals(&totals);
        assert_eq!(insights[0].category.as_deref(), Some("Food & Drink"));
        assert!(insights.iter().any(|i| i.kind == InsightKind::Alert));
        assert!(insights.iter().any(|i| i.kind == InsightKind::Positive));
    }

    #[test]
    fn test_suggest_limits_fit_income() {
        let spent = BTreeMap::from([("Food & Drink".to_string(), 900.0)]);
        let recurring = BTreeMap::from([("Essentials".to_string(), 1200.0)]);
        let categories = names(&["Food & Drink", "Essentials", "Misc"]);

        let limits = suggest_limits(2000.0, &spent, &recurring, &categories);
        assert_eq!(limits.len(), 3);
        assert!(limits.values().sum::<f64>() <= 2000.0);
        assert!(limits["Essentials"] > limits["Misc"]);
    }

    #[test]
    fn test_suggest_limits_generous_income_keeps_spend() {
        let spent = BTreeMap::from([("Misc".to_string(), 100.0)]);
        let limits = suggest_limits(5000.0, &spent, &BTreeMap::new(), &names(&["Misc"]));
        assert_eq!(limits["Misc"], 110.0);
    }
}
