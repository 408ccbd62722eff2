//! Zen Core Library
//!
//! Shared functionality for the Zen personal finance tracker:
//! - Domain models (transactions, budgets, recurring payments, incomes)
//! - The finance state engine with write-through persistence
//! - Pure aggregate functions (budget spend, monthly income and expenses)
//! - Key-value stores: in-memory and SQLCipher-encrypted SQLite
//! - Pluggable AI backends (Ollama, OpenAI-compatible, mock)
//! - Prompt library for customizable AI prompts
//! - Assistant flows that turn AI output into validated mutations

pub mod aggregates;
pub mod ai;
pub mod assistant;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod prompts;
pub mod store;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIBackend, AIClient, BudgetSuggestionRequest, BudgetSuggestions, ExtractedTransaction,
    InsightKind, MockBackend, OllamaBackend, OpenAICompatibleBackend, SpendingInsight,
};
pub use assistant::ParsedTransaction;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Settings;
pub use engine::FinanceEngine;
pub use error::{Error, Result};
pub use models::*;
pub use prompts::{Prompt, PromptId, PromptLibrary, RenderedPrompt};
pub use store::{MemoryStore, SqliteStore, Store};
