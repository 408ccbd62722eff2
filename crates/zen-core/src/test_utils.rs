//! Test utilities for zen-core
//!
//! This module provides testing infrastructure including a mock Ollama server
//! that answers the prompts in `prompts/*.md` with the mock backend's keyword
//! rules, so the HTTP backends can be exercised without a model.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    extract::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::ai::mock::{extract_from_text, insights_from_totals, suggest_limits};

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            size: 4_000_000_000,
        }],
    })
}

/// Ollama generate endpoint
async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    // These patterns match the prompt files in prompts/*.md
    let response = if request.prompt.contains("Allowed categories") {
        handle_extract_mock(&request.prompt)
    } else if request.prompt.contains("Monthly income:") {
        handle_budget_mock(&request.prompt)
    } else if request.prompt.contains("insights") {
        handle_insights_mock(&request.prompt)
    } else {
        "I am not sure what you are asking.".to_string()
    };

    Json(GenerateResponse {
        model: request.model,
        response,
        done: true,
    })
}

/// Handle extract_transaction request
fn handle_extract_mock(prompt: &str) -> String {
    let text = quoted_after(prompt, "Text: \"").unwrap_or_default();
    let allowed = list_after(prompt, "Allowed categories");
    serde_json::to_string(&extract_from_text(&text, &allowed)).unwrap()
}

/// Handle spending_insights request
fn handle_insights_mock(prompt: &str) -> String {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for (amount, category) in transaction_rows(prompt) {
        *totals.entry(category).or_default() += amount;
    }
    let insights = insights_from_totals(&totals);
    serde_json::json!({ "insights": insights }).to_string()
}

/// Handle suggest_budget request
fn handle_budget_mock(prompt: &str) -> String {
    let income = prompt
        .lines()
        .find_map(|l| l.strip_prefix("Monthly income:"))
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(0.0);

    let mut spent: BTreeMap<String, f64> = BTreeMap::new();
    for (amount, category) in transaction_rows(prompt) {
        *spent.entry(category).or_default() += amount;
    }

    // "- description | amount | category | day N"
    let mut recurring: BTreeMap<String, f64> = BTreeMap::new();
    for line in section_lines(prompt, "Recurring monthly payments:") {
        let fields: Vec<&str> = line.trim_start_matches("- ").split(" | ").collect();
        if let [_, amount, category, _] = fields.as_slice() {
            if let Ok(amount) = amount.parse::<f64>() {
                *recurring.entry(category.to_string()).or_default() += amount;
            }
        }
    }

    let categories = list_after(prompt, "Categories to budget:");
    let budgets = suggest_limits(income, &spent, &recurring, &categories);
    serde_json::json!({ "budgets": budgets }).to_string()
}

/// Text between `marker` and the next double quote
fn quoted_after(prompt: &str, marker: &str) -> Option<String> {
    let start = prompt.find(marker)? + marker.len();
    let rest = &prompt[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

/// Non-empty lines following the line that contains `marker`
fn section_lines<'a>(prompt: &'a str, marker: &str) -> Vec<&'a str> {
    prompt
        .lines()
        .skip_while(|l| !l.contains(marker))
        .skip(1)
        .take_while(|l| !l.trim().is_empty())
        .map(str::trim)
        .collect()
}

/// `- item` lines following the line that contains `marker`
fn list_after(prompt: &str, marker: &str) -> Vec<String> {
    section_lines(prompt, marker)
        .into_iter()
        .filter_map(|l| l.strip_prefix("- "))
        .map(str::to_string)
        .collect()
}

/// (amount, category) from "date | amount | category | description" rows
fn transaction_rows(prompt: &str) -> Vec<(f64, String)> {
    prompt
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(" | ").collect();
            match fields.as_slice() {
                [date, amount, category, _]
                    if chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").is_ok() =>
                {
                    amount
                        .parse::<f64>()
                        .ok()
                        .map(|a| (a, category.to_string()))
                }
                _ => None,
            }
        })
        .collect()
}

#[derive(Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(default)]
    system: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}
