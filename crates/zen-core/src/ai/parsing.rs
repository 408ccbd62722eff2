//! JSON parsing helpers for AI backend responses
//!
//! Models often wrap the JSON payload in prose or code fences, so every
//! parser takes the span from the first `{` to the last `}`.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};

use super::types::{BudgetSuggestions, ExtractedTransaction, SpendingInsight};

/// Longest raw response quoted back in an error message
const MAX_ERROR_SNIPPET: usize = 200;

fn truncate(raw: &str) -> String {
    match raw.char_indices().nth(MAX_ERROR_SNIPPET) {
        Some((cut, _)) => format!("{}...", &raw[..cut]),
        None => raw.to_string(),
    }
}

/// Deserialize the first `{` .. last `}` span of a model response
pub fn extract_json<T: DeserializeOwned>(response: &str) -> Result<T> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &response[s..=e];
            serde_json::from_str(json_str).map_err(|e| {
                Error::ParseFailed(format!(
                    "Invalid JSON from AI: {} | Raw: {}",
                    e,
                    truncate(json_str)
                ))
            })
        }
        _ => Err(Error::ParseFailed(format!(
            "No JSON found in AI response | Raw: {}",
            truncate(response)
        ))),
    }
}

pub fn parse_extracted_transaction(response: &str) -> Result<ExtractedTransaction> {
    extract_json(response)
}

#[derive(Deserialize)]
struct InsightsEnvelope {
    insights: Vec<SpendingInsight>,
}

pub fn parse_insights(response: &str) -> Result<Vec<SpendingInsight>> {
    let envelope: InsightsEnvelope = extract_json(response)?;
    Ok(envelope.insights)
}

#[derive(Deserialize)]
struct BudgetEnvelope {
    budgets: BudgetSuggestions,
}

pub fn parse_budget_suggestions(response: &str) -> Result<BudgetSuggestions> {
    let envelope: BudgetEnvelope = extract_json(response)?;
    Ok(envelope.budgets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::InsightKind;

    #[test]
    fn test_extract_with_surrounding_prose() {
        let raw = "Sure! Here you go:\n```json\n{\"amount\": 4.5, \"description\": \"Latte\", \"category\": \"Food & Drink\", \"icon\": \"Coffee\"}\n```";
        let tx = parse_extracted_transaction(raw).unwrap();
        assert_eq!(tx.amount, 4.5);
        assert_eq!(tx.icon, "Coffee");
    }

    #[test]
    fn test_missing_json_is_parse_failure() {
        let err = parse_extracted_transaction("I could not find an amount.").unwrap_err();
        assert!(matches!(err, Error::ParseFailed(_)));
    }

    #[test]
    fn test_malformed_json_is_parse_failure() {
        let err = parse_extracted_transaction("{\"amount\": }").unwrap_err();
        assert!(matches!(err, Error::ParseFailed(_)));
    }

    #[test]
    fn test_parse_insights() {
        let raw = r#"{"insights": [
            {"type": "alert", "title": "Dining is up", "description": "You spent more.", "category": "Food & Drink", "icon": "Utensils"},
            {"type": "positive", "title": "Nice", "description": "Transport is low."}
        ]}"#;
        let insights = parse_insights(raw).unwrap();
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].kind, InsightKind::Alert);
        assert!(insights[1].category.is_none());
    }

    #[test]
    fn test_parse_budget_suggestions() {
        let raw = "{\"budgets\": {\"Food & Drink\": 350, \"Misc\": 75.5}}";
        let budgets = parse_budget_suggestions(raw).unwrap();
        assert_eq!(budgets.get("Food & Drink"), Some(&350.0));
        assert_eq!(budgets.get("Misc"), Some(&75.5));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), MAX_ERROR_SNIPPET + 3);
    }
}
