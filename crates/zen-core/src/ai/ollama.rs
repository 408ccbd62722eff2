//! Ollama backend implementation
//!
//! HTTP client for the Ollama `/api/generate` endpoint. Prompts come from the
//! prompt library so they can be overridden without rebuilding.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Category, Transaction};
use crate::prompts::{PromptId, PromptLibrary, RenderedPrompt};

use super::parsing::{parse_budget_suggestions, parse_extracted_transaction, parse_insights};
use super::types::{
    BudgetSuggestionRequest, BudgetSuggestions, ExtractedTransaction, SpendingInsight,
};
use super::{extract_transaction_vars, spending_insights_vars, suggest_budget_vars, AIBackend};

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl OllamaBackend {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self::with_prompts(base_url, model, PromptLibrary::new())
    }

    /// Create with a specific prompt library (tests use `embedded_only`)
    pub fn with_prompts(base_url: &str, model: &str, prompts: PromptLibrary) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            prompts: Arc::new(RwLock::new(prompts)),
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
            prompts: self.prompts.clone(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }

    fn render(&self, id: PromptId, vars: &HashMap<&str, String>) -> Result<RenderedPrompt> {
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| Error::Prompt("Failed to acquire prompt library lock".into()))?;
        prompts.render(id, vars)
    }

    /// Send one prompt and return the raw model output
    async fn generate(&self, prompt: RenderedPrompt) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.user,
            system: prompt.system,
            format: Some("json".to_string()),
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let ollama_response: OllamaResponse = response.json().await?;
        debug!(model = %self.model, "Ollama response: {}", ollama_response.response);
        Ok(ollama_response.response)
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Constrains output to valid JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    stream: bool,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl AIBackend for OllamaBackend {
    async fn extract_transaction_details(
        &self,
        text: &str,
        categories: &[Category],
    ) -> Result<ExtractedTransaction> {
        let prompt = self.render(
            PromptId::ExtractTransaction,
            &extract_transaction_vars(text, categories),
        )?;
        let raw = self.generate(prompt).await?;
        parse_extracted_transaction(&raw)
    }

    async fn generate_spending_insights(
        &self,
        transactions: &[Transaction],
        categories: &[Category],
    ) -> Result<Vec<SpendingInsight>> {
        let prompt = self.render(
            PromptId::SpendingInsights,
            &spending_insights_vars(transactions, categories),
        )?;
        let raw = self.generate(prompt).await?;
        parse_insights(&raw)
    }

    async fn suggest_budget(&self, request: &BudgetSuggestionRequest) -> Result<BudgetSuggestions> {
        let prompt = self.render(PromptId::SuggestBudget, &suggest_budget_vars(request))?;
        let raw = self.generate(prompt).await?;
        parse_budget_suggestions(&raw)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BuiltinCategory;
    use crate::test_utils::MockOllamaServer;

    fn backend(url: &str) -> OllamaBackend {
        OllamaBackend::with_prompts(url, "llama3.2", PromptLibrary::embedded_only())
    }

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let backend = OllamaBackend::new("http://localhost:11434/", "llama3.2");
        assert_eq!(backend.host(), "http://localhost:11434");
        assert_eq!(backend.with_model("qwen2.5").model(), "qwen2.5");
    }

    #[test]
    fn test_request_omits_missing_system() {
        let request = OllamaRequest {
            model: "llama3.2".into(),
            prompt: "hi".into(),
            system: None,
            format: Some("json".into()),
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("system").is_none());
        assert_eq!(json["format"], "json");
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockOllamaServer::start().await;
        assert!(backend(&server.url()).health_check().await);
        assert!(!backend("http://127.0.0.1:1").health_check().await);
    }

    #[tokio::test]
    async fn test_extract_transaction_via_server() {
        let server = MockOllamaServer::start().await;
        let categories = vec![
            Category::Builtin(BuiltinCategory::FoodAndDrink),
            Category::Builtin(BuiltinCategory::Transportation),
        ];

        let details = backend(&server.url())
            .extract_transaction_details("uber to the airport 32.40", &categories)
            .await
            .unwrap();
        assert_eq!(details.amount, 32.40);
        assert_eq!(details.category, "Transportation");
        assert_eq!(details.icon, "Car");
    }

    #[tokio::test]
    async fn test_suggest_budget_via_server() {
        let server = MockOllamaServer::start().await;
        let request = BudgetSuggestionRequest {
            monthly_income: 2000.0,
            transactions: vec![],
            recurring_payments: vec![],
            categories: vec![
                Category::Builtin(BuiltinCategory::Essentials),
                Category::Builtin(BuiltinCategory::Misc),
            ],
        };

        let suggestions = backend(&server.url()).suggest_budget(&request).await.unwrap();
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions.values().sum::<f64>() <= 2000.0);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_error() {
        let result = backend("http://127.0.0.1:1")
            .extract_transaction_details("coffee 3", &[])
            .await;
        assert!(matches!(result, Err(Error::Http(_))));
    }
}
