//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - Hosted APIs exposing `/v1/chat/completions`
//! - vLLM (http://localhost:8000)
//! - LocalAI (http://localhost:8080)
//! - llama-server / llama.cpp (http://localhost:8080)
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4o-mini)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

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

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl OpenAICompatibleBackend {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        }
    }

    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            ..Self::new(base_url, model)
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    /// Create from environment variables
    ///
    /// Required: `OPENAI_COMPATIBLE_HOST`
    /// Optional: `OPENAI_COMPATIBLE_MODEL` (default: gpt-4o-mini)
    /// Optional: `OPENAI_COMPATIBLE_API_KEY`
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OPENAI_COMPATIBLE_HOST").ok()?;
        let model = std::env::var("OPENAI_COMPATIBLE_MODEL")
            .unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let mut backend = Self::new(&host, &model);
        backend.api_key = std::env::var("OPENAI_COMPATIBLE_API_KEY").ok();
        Some(backend)
    }

    fn render(&self, id: PromptId, vars: &HashMap<&str, String>) -> Result<RenderedPrompt> {
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| Error::Prompt("Failed to acquire prompt library lock".into()))?;
        prompts.render(id, vars)
    }

    /// Make a chat completion request
    async fn chat_completion(&self, prompt: RenderedPrompt) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = prompt.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.user,
        });

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(0.1),
            response_format: Some(ResponseFormat {
                kind: "json_object".to_string(),
            }),
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.bearer_auth(api_key);
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ParseFailed(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::ParseFailed("No response from OpenAI API".into()))?;

        debug!(model = %self.model, "Chat completion: {}", content);
        Ok(content)
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Asks the server for a bare JSON object
#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    /// Null when the model refused or only called tools
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn extract_transaction_details(
        &self,
        text: &str,
        categories: &[Category],
    ) -> Result<ExtractedTransaction> {
        let prompt = self.render(
            PromptId::ExtractTransaction,
            &extract_transaction_vars(text, categories),
        )?;
        let raw = self.chat_completion(prompt).await?;
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
        let raw = self.chat_completion(prompt).await?;
        parse_insights(&raw)
    }

    async fn suggest_budget(&self, request: &BudgetSuggestionRequest) -> Result<BudgetSuggestions> {
        let prompt = self.render(PromptId::SuggestBudget, &suggest_budget_vars(request))?;
        let raw = self.chat_completion(prompt).await?;
        parse_budget_suggestions(&raw)
    }

    async fn health_check(&self) -> bool {
        let mut request = self
            .http_client
            .get(format!("{}/v1/models", self.base_url));
        if let Some(ref api_key) = self.api_key {
            request = request.bearer_auth(api_key);
        }
        if let Ok(resp) = request.send().await {
            if resp.status().is_success() {
                return true;
            }
        }

        // Some local servers only expose /health
        match self
            .http_client
            .get(format!("{}/health", self.base_url))
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

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let backend = OpenAICompatibleBackend::new("http://localhost:8000/", "gpt-4o-mini");
        assert_eq!(backend.host(), "http://localhost:8000");
        assert_eq!(backend.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_backend_with_api_key() {
        let backend =
            OpenAICompatibleBackend::with_api_key("http://localhost:8000", "gpt-4o", "sk-test123");
        assert_eq!(backend.api_key, Some("sk-test123".to_string()));
        let other = backend.with_model("gpt-4o-mini");
        assert_eq!(other.model(), "gpt-4o-mini");
        assert_eq!(other.api_key, Some("sk-test123".to_string()));
    }

    #[test]
    fn test_backend_from_env_missing() {
        std::env::remove_var("OPENAI_COMPATIBLE_HOST");
        assert!(OpenAICompatibleBackend::from_env().is_none());
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let backend = OpenAICompatibleBackend::new("http://127.0.0.1:1", "gpt-4o-mini");
        assert!(!backend.health_check().await);
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "Answer in JSON".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: "coffee 4".to_string(),
                },
            ],
            temperature: Some(0.1),
            response_format: Some(ResponseFormat {
                kind: "json_object".to_string(),
            }),
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "coffee 4");
        assert_eq!(json["response_format"]["type"], "json_object");
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.1).abs() < 0.001);
    }

    #[test]
    fn test_response_with_null_content() {
        let json = r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }
}
