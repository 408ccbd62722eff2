//! Pluggable AI backend abstraction
//!
//! The AI collaborators are black boxes that turn text or spending history
//! into structured JSON. Nothing here mutates engine state; the assistant
//! module applies results through the ordinary engine mutators.
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all AI operations
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_env().unwrap_or_else(AIClient::mock);
//! let details = ai.extract_transaction_details("coffee 4.50", &categories).await?;
//! println!("{} -> {}", details.description, details.category);
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, openai_compatible, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4o-mini)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

pub(crate) mod mock;
mod ollama;
mod openai_compatible;
pub mod parsing;
pub mod types;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Category, Icon, Transaction};

/// Trait defining the interface for all AI backends
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Turn free text into amount/description/category/icon
    ///
    /// The returned category and icon are unchecked; callers validate them.
    async fn extract_transaction_details(
        &self,
        text: &str,
        categories: &[Category],
    ) -> Result<ExtractedTransaction>;

    /// Remarks about the given transactions
    async fn generate_spending_insights(
        &self,
        transactions: &[Transaction],
        categories: &[Category],
    ) -> Result<Vec<SpendingInsight>>;

    /// A monthly limit per category; staying under income is best-effort
    async fn suggest_budget(&self, request: &BudgetSuggestionRequest) -> Result<BudgetSuggestions>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (hosted APIs, vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Keyword-rule backend for tests and offline use
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `ollama` (default): Uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `openai_compatible`: Uses OPENAI_COMPATIBLE_HOST, OPENAI_COMPATIBLE_MODEL
    ///   and OPENAI_COMPATIBLE_API_KEY
    /// - `mock`: Creates the keyword-rule mock backend
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(AIClient::Ollama),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(AIClient::Ollama)
            }
        }
    }

    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(host, model))
    }

    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Short backend name for status output
    pub fn backend_name(&self) -> &'static str {
        match self {
            AIClient::Ollama(_) => "ollama",
            AIClient::OpenAICompatible(_) => "openai_compatible",
            AIClient::Mock(_) => "mock",
        }
    }

    /// Same backend, different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::Ollama(b) => AIClient::Ollama(b.with_model(model)),
            AIClient::OpenAICompatible(b) => AIClient::OpenAICompatible(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.clone()),
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn extract_transaction_details(
        &self,
        text: &str,
        categories: &[Category],
    ) -> Result<ExtractedTransaction> {
        match self {
            AIClient::Ollama(b) => b.extract_transaction_details(text, categories).await,
            AIClient::OpenAICompatible(b) => b.extract_transaction_details(text, categories).await,
            AIClient::Mock(b) => b.extract_transaction_details(text, categories).await,
        }
    }

    async fn generate_spending_insights(
        &self,
        transactions: &[Transaction],
        categories: &[Category],
    ) -> Result<Vec<SpendingInsight>> {
        match self {
            AIClient::Ollama(b) => b.generate_spending_insights(transactions, categories).await,
            AIClient::OpenAICompatible(b) => {
                b.generate_spending_insights(transactions, categories)
                    .await
            }
            AIClient::Mock(b) => b.generate_spending_insights(transactions, categories).await,
        }
    }

    async fn suggest_budget(&self, request: &BudgetSuggestionRequest) -> Result<BudgetSuggestions> {
        match self {
            AIClient::Ollama(b) => b.suggest_budget(request).await,
            AIClient::OpenAICompatible(b) => b.suggest_budget(request).await,
            AIClient::Mock(b) => b.suggest_budget(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

// Prompt variables shared by the HTTP backends

fn category_list(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| format!("- {}", c))
        .collect::<Vec<_>>()
        .join("\n")
}

fn icon_list() -> String {
    Icon::all()
        .iter()
        .map(|i| i.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn transaction_lines(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "(none)".to_string();
    }
    transactions
        .iter()
        .map(|t| {
            format!(
                "{} | {:.2} | {} | {}",
                t.date.format("%Y-%m-%d"),
                t.amount,
                t.category,
                t.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn extract_transaction_vars(
    text: &str,
    categories: &[Category],
) -> HashMap<&'static str, String> {
    HashMap::from([
        ("text", text.replace('"', "'")),
        ("categories", category_list(categories)),
        ("icons", icon_list()),
    ])
}

pub(crate) fn spending_insights_vars(
    transactions: &[Transaction],
    categories: &[Category],
) -> HashMap<&'static str, String> {
    HashMap::from([
        ("transactions", transaction_lines(transactions)),
        ("categories", category_list(categories)),
        ("icons", icon_list()),
    ])
}

pub(crate) fn suggest_budget_vars(request: &BudgetSuggestionRequest) -> HashMap<&'static str, String> {
    let recurring = if request.recurring_payments.is_empty() {
        "(none)".to_string()
    } else {
        request
            .recurring_payments
            .iter()
            .map(|p| {
                format!(
                    "- {} | {:.2} | {} | day {}",
                    p.description, p.amount, p.category, p.day_of_month
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    HashMap::from([
        ("income", format!("{:.2}", request.monthly_income)),
        ("recurring", recurring),
        ("transactions", transaction_lines(&request.transactions)),
        ("categories", category_list(&request.categories)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BuiltinCategory;

    #[test]
    fn test_from_env_mock() {
        std::env::set_var("AI_BACKEND", "mock");
        let client = AIClient::from_env().unwrap();
        std::env::remove_var("AI_BACKEND");
        assert_eq!(client.backend_name(), "mock");
    }

    #[test]
    fn test_extract_vars_lists_categories_and_icons() {
        let vars = extract_transaction_vars(
            "said \"hi\" over coffee 4",
            &[
                Category::Builtin(BuiltinCategory::FoodAndDrink),
                Category::Custom("Pets".into()),
            ],
        );
        assert_eq!(vars["categories"], "- Food & Drink\n- Pets");
        assert!(vars["icons"].contains("PawPrint"));
        assert!(!vars["text"].contains('"'));
    }

    #[test]
    fn test_transaction_lines_empty() {
        assert_eq!(transaction_lines(&[]), "(none)");
    }
}
