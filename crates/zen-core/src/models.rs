//! Domain models for Zen
//!
//! Field names serialize in camelCase so the persisted collections keep the
//! same JSON shape as the browser app's local storage (`dayOfMonth`,
//! `lastLogged`, `startDate`).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Built-in spending categories shipped with the default budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinCategory {
    FoodAndDrink,
    Transportation,
    Entertainment,
    Essentials,
    Shopping,
    Misc,
}

impl BuiltinCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FoodAndDrink => "Food & Drink",
            Self::Transportation => "Transportation",
            Self::Entertainment => "Entertainment",
            Self::Essentials => "Essentials",
            Self::Shopping => "Shopping",
            Self::Misc => "Misc",
        }
    }

    pub fn all() -> &'static [BuiltinCategory] {
        &[
            Self::FoodAndDrink,
            Self::Transportation,
            Self::Entertainment,
            Self::Essentials,
            Self::Shopping,
            Self::Misc,
        ]
    }

    /// Icon used when the category is seeded without an explicit one
    pub fn default_icon(&self) -> Icon {
        match self {
            Self::FoodAndDrink => Icon::Utensils,
            Self::Transportation => Icon::Car,
            Self::Entertainment => Icon::Film,
            Self::Essentials => Icon::Home,
            Self::Shopping => Icon::ShoppingBag,
            Self::Misc => Icon::Lightbulb,
        }
    }
}

impl std::str::FromStr for BuiltinCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown built-in category: {}", s))
    }
}

/// A budget category: one of the built-ins or a user-defined name
///
/// Serialized as the bare category name. Deserialization maps names that
/// match a built-in onto `Builtin`, so a custom "Shopping" can never shadow
/// the built-in one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Builtin(BuiltinCategory),
    Custom(String),
}

impl Category {
    /// Validate a user-supplied category name
    pub fn parse(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("Category name cannot be empty".into()));
        }
        Ok(Self::from(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Builtin(b) => b.as_str(),
            Self::Custom(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin(_))
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        match name.parse::<BuiltinCategory>() {
            Ok(builtin) => Self::Builtin(builtin),
            Err(_) => Self::Custom(name),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl From<BuiltinCategory> for Category {
    fn from(builtin: BuiltinCategory) -> Self {
        Self::Builtin(builtin)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Icon tokens understood by the front end (lucide icon names)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    Home,
    Car,
    Coffee,
    ShoppingBag,
    Ticket,
    Lightbulb,
    Landmark,
    Plane,
    Palette,
    Bus,
    Laptop,
    PartyPopper,
    Dumbbell,
    Gift,
    Heart,
    Music,
    PawPrint,
    Smartphone,
    Receipt,
    Wallet,
    Shirt,
    GraduationCap,
    Briefcase,
    Book,
    Film,
    Utensils,
    Pizza,
    Repeat,
    LayoutDashboard,
    /// Any name this build does not know; only produced when loading stored data
    #[serde(other)]
    Unknown,
}

impl Icon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Car => "Car",
            Self::Coffee => "Coffee",
            Self::ShoppingBag => "ShoppingBag",
            Self::Ticket => "Ticket",
            Self::Lightbulb => "Lightbulb",
            Self::Landmark => "Landmark",
            Self::Plane => "Plane",
            Self::Palette => "Palette",
            Self::Bus => "Bus",
            Self::Laptop => "Laptop",
            Self::PartyPopper => "PartyPopper",
            Self::Dumbbell => "Dumbbell",
            Self::Gift => "Gift",
            Self::Heart => "Heart",
            Self::Music => "Music",
            Self::PawPrint => "PawPrint",
            Self::Smartphone => "Smartphone",
            Self::Receipt => "Receipt",
            Self::Wallet => "Wallet",
            Self::Shirt => "Shirt",
            Self::GraduationCap => "GraduationCap",
            Self::Briefcase => "Briefcase",
            Self::Book => "Book",
            Self::Film => "Film",
            Self::Utensils => "Utensils",
            Self::Pizza => "Pizza",
            Self::Repeat => "Repeat",
            Self::LayoutDashboard => "LayoutDashboard",
            Self::Unknown => "Unknown",
        }
    }

    /// Every selectable icon (excludes `Unknown`)
    pub fn all() -> &'static [Icon] {
        &[
            Self::Home,
            Self::Car,
            Self::Coffee,
            Self::ShoppingBag,
            Self::Ticket,
            Self::Lightbulb,
            Self::Landmark,
            Self::Plane,
            Self::Palette,
            Self::Bus,
            Self::Laptop,
            Self::PartyPopper,
            Self::Dumbbell,
            Self::Gift,
            Self::Heart,
            Self::Music,
            Self::PawPrint,
            Self::Smartphone,
            Self::Receipt,
            Self::Wallet,
            Self::Shirt,
            Self::GraduationCap,
            Self::Briefcase,
            Self::Book,
            Self::Film,
            Self::Utensils,
            Self::Pizza,
            Self::Repeat,
            Self::LayoutDashboard,
        ]
    }
}

impl std::str::FromStr for Icon {
    type Err = String;

    /// Strict parse: `Unknown` is never produced here
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|icon| icon.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown icon: {}", s))
    }
}

impl std::fmt::Display for Icon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transaction source - how it was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    /// Entered by hand
    #[default]
    Manual,
    /// Parsed from free text by the AI categorizer
    Ai,
    /// Materialized from a recurring payment
    Recurring,
}

impl TransactionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Ai => "ai",
            Self::Recurring => "recurring",
        }
    }
}

impl std::fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spending transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    /// Always positive; every transaction is an expense
    pub amount: f64,
    pub description: String,
    pub category: Category,
    pub icon: Icon,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub source: TransactionSource,
}

/// A new transaction (before it gets an id)
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount: f64,
    pub description: String,
    pub category: Category,
    /// Falls back to the category's icon
    pub icon: Option<Icon>,
    pub date: NaiveDateTime,
    pub source: TransactionSource,
}

/// Partial update for a transaction; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub icon: Option<Icon>,
    pub date: Option<NaiveDateTime>,
}

/// A category definition with its monthly limit and derived spend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub category: Category,
    pub limit: f64,
    /// Derived: current-month spend. Never set by callers.
    #[serde(default)]
    pub spent: f64,
    pub icon: Icon,
    #[serde(default)]
    pub color: String,
}

impl Budget {
    /// Spent as a fraction of the limit (1.0 = exactly on budget)
    pub fn utilization(&self) -> f64 {
        if self.limit > 0.0 {
            self.spent / self.limit
        } else {
            0.0
        }
    }

    pub fn status(&self) -> BudgetStatus {
        let utilization = self.utilization();
        if utilization > 1.0 {
            BudgetStatus::Over
        } else if utilization >= 0.8 {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Ok
        }
    }

    pub fn remaining(&self) -> f64 {
        self.limit - self.spent
    }
}

/// Partial update for a budget; renames go through `rename_category`
#[derive(Debug, Clone, Default)]
pub struct BudgetUpdate {
    pub limit: Option<f64>,
    pub icon: Option<Icon>,
    pub color: Option<String>,
}

/// What a category delete removed along with the budget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletedCategory {
    pub budget: Budget,
    pub transactions_removed: usize,
    pub recurring_payments_removed: usize,
}

/// Outcome of applying a batch of suggested limits
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppliedLimits {
    /// Categories whose limit changed, with the new limit
    pub applied: Vec<(Category, f64)>,
    /// Entries that were ignored, with the reason
    pub skipped: Vec<(String, String)>,
}

/// Budget health bucket used by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Ok,
    /// At or above 80% of the limit
    Warning,
    Over,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Over => "over",
        }
    }
}

/// A bill that recurs monthly on a fixed day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringPayment {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub category: Category,
    pub icon: Icon,
    /// 1-31; months without this day are skipped
    pub day_of_month: u32,
    /// When this payment last produced a transaction
    #[serde(default)]
    pub last_logged: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewRecurringPayment {
    pub description: String,
    pub amount: f64,
    pub category: Category,
    pub icon: Option<Icon>,
    pub day_of_month: u32,
}

#[derive(Debug, Clone, Default)]
pub struct RecurringPaymentUpdate {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub icon: Option<Icon>,
    pub day_of_month: Option<u32>,
}

/// How often an income source pays out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncomeFrequency {
    Weekly,
    BiWeekly,
    Monthly,
    OneTime,
}

impl IncomeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::BiWeekly => "bi-weekly",
            Self::Monthly => "monthly",
            Self::OneTime => "one-time",
        }
    }
}

impl std::str::FromStr for IncomeFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "bi-weekly" | "biweekly" | "bi_weekly" => Ok(Self::BiWeekly),
            "monthly" => Ok(Self::Monthly),
            "one-time" | "onetime" | "one_time" | "once" => Ok(Self::OneTime),
            _ => Err(format!("Unknown income frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for IncomeFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An income source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub frequency: IncomeFrequency,
    /// First pay date; for one-time income, the date it was received
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewIncome {
    pub description: String,
    pub amount: f64,
    pub frequency: IncomeFrequency,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct IncomeUpdate {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub frequency: Option<IncomeFrequency>,
    pub start_date: Option<NaiveDate>,
}

/// Emitted when a recurring payment is auto-logged
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentLogged {
    pub payment_id: String,
    pub transaction_id: String,
    pub description: String,
    pub amount: f64,
    pub due_date: NaiveDate,
}

/// A recurring payment with its next due date (dashboard)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingPayment {
    pub payment_id: String,
    pub description: String,
    pub amount: f64,
    pub category: Category,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
}

/// Total spent on one calendar day (heatmap / chart data)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySpending {
    pub date: NaiveDate,
    pub total: f64,
}

/// Current-month income vs expenses
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

/// Sort key for transaction listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionSort {
    #[default]
    Date,
    Amount,
    Description,
    Category,
}

impl std::str::FromStr for TransactionSort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "amount" => Ok(Self::Amount),
            "description" => Ok(Self::Description),
            "category" => Ok(Self::Category),
            _ => Err(format!("Unknown sort key: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_maps_builtin_names() {
        let category = Category::parse("  food & drink ").unwrap();
        assert_eq!(category, Category::Builtin(BuiltinCategory::FoodAndDrink));
        assert_eq!(category.as_str(), "Food & Drink");

        let custom = Category::parse("Pets").unwrap();
        assert_eq!(custom, Category::Custom("Pets".to_string()));
        assert!(!custom.is_builtin());
    }

    #[test]
    fn test_category_rejects_empty() {
        assert!(matches!(Category::parse("   "), Err(Error::Validation(_))));
    }

    #[test]
    fn test_category_serializes_as_string() {
        let json = serde_json::to_string(&Category::Builtin(BuiltinCategory::Misc)).unwrap();
        assert_eq!(json, "\"Misc\"");

        let parsed: Category = serde_json::from_str("\"Gym\"").unwrap();
        assert_eq!(parsed, Category::Custom("Gym".to_string()));
    }

    #[test]
    fn test_icon_parse_is_strict() {
        assert_eq!("coffee".parse::<Icon>().unwrap(), Icon::Coffee);
        assert!("Spaceship".parse::<Icon>().is_err());
        assert!("Unknown".parse::<Icon>().is_err());
    }

    #[test]
    fn test_icon_unknown_on_load() {
        let icon: Icon = serde_json::from_str("\"Spaceship\"").unwrap();
        assert_eq!(icon, Icon::Unknown);
    }

    #[test]
    fn test_income_frequency_wire_names() {
        let json = serde_json::to_string(&IncomeFrequency::BiWeekly).unwrap();
        assert_eq!(json, "\"bi-weekly\"");
        let parsed: IncomeFrequency = serde_json::from_str("\"one-time\"").unwrap();
        assert_eq!(parsed, IncomeFrequency::OneTime);
        assert_eq!(
            "biweekly".parse::<IncomeFrequency>().unwrap(),
            IncomeFrequency::BiWeekly
        );
    }

    #[test]
    fn test_budget_status_thresholds() {
        let mut budget = Budget {
            category: Category::Builtin(BuiltinCategory::Shopping),
            limit: 100.0,
            spent: 79.0,
            icon: Icon::ShoppingBag,
            color: "chart-5".to_string(),
        };
        assert_eq!(budget.status(), BudgetStatus::Ok);
        budget.spent = 80.0;
        assert_eq!(budget.status(), BudgetStatus::Warning);
        budget.spent = 100.0;
        assert_eq!(budget.status(), BudgetStatus::Warning);
        budget.spent = 100.5;
        assert_eq!(budget.status(), BudgetStatus::Over);
        assert!(budget.remaining() < 0.0);
    }

    #[test]
    fn test_recurring_payment_json_shape() {
        let payment = RecurringPayment {
            id: "p1".to_string(),
            description: "Rent".to_string(),
            amount: 1200.0,
            category: Category::Builtin(BuiltinCategory::Essentials),
            icon: Icon::Home,
            day_of_month: 1,
            last_logged: None,
        };
        let value = serde_json::to_value(&payment).unwrap();
        assert_eq!(value["dayOfMonth"], 1);
        assert!(value["lastLogged"].is_null());
        assert_eq!(value["category"], "Essentials");
    }
}
