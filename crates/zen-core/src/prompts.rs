//! Prompt library for the AI backends
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/zen/prompts/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Each prompt file starts with YAML frontmatter (`id`, `version`) followed by
//! a `# System` and a `# User` section. `{{var}}` placeholders are filled in
//! at render time.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const EXTRACT_TRANSACTION: &str = include_str!("../../../prompts/extract_transaction.md");
    pub const SPENDING_INSIGHTS: &str = include_str!("../../../prompts/spending_insights.md");
    pub const SUGGEST_BUDGET: &str = include_str!("../../../prompts/suggest_budget.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Free text -> amount/description/category/icon
    ExtractTransaction,
    SpendingInsights,
    SuggestBudget,
}

impl PromptId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractTransaction => "extract_transaction",
            Self::SpendingInsights => "spending_insights",
            Self::SuggestBudget => "suggest_budget",
        }
    }

    pub fn all() -> &'static [PromptId] {
        &[
            Self::ExtractTransaction,
            Self::SpendingInsights,
            Self::SuggestBudget,
        ]
    }

    fn default_content(&self) -> &'static str {
        match self {
            Self::ExtractTransaction => defaults::EXTRACT_TRANSACTION,
            Self::SpendingInsights => defaults::SPENDING_INSIGHTS,
            Self::SuggestBudget => defaults::SUGGEST_BUDGET,
        }
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    pub id: String,
    /// Bumped whenever the wording changes
    pub version: u32,
}

/// A loaded prompt
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    /// Everything after the frontmatter
    pub content: String,
    pub is_override: bool,
}

/// A prompt ready to send: system instructions plus the filled-in user message
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub system: Option<String>,
    pub user: String,
}

impl Prompt {
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Fill `{{var}}` placeholders; a prompt without sections is all user text
    pub fn render(&self, vars: &HashMap<&str, String>) -> RenderedPrompt {
        match self.user_section() {
            Some(user) => RenderedPrompt {
                system: self.system_section().map(|s| substitute(s, vars)),
                user: substitute(user, vars),
            },
            None => RenderedPrompt {
                system: None,
                user: substitute(&self.content, vars),
            },
        }
    }
}

/// Prompt library for loading and caching prompts
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Library that honours overrides in the default data dir
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            cache: HashMap::new(),
        }
    }

    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            cache: HashMap::new(),
        }
    }

    /// No override directory; embedded prompts only
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, loading from override or default
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        if !self.cache.contains_key(&id) {
            let prompt = self.load(id)?;
            self.cache.insert(id, prompt);
        }
        self.cache
            .get(&id)
            .ok_or_else(|| Error::Prompt(format!("Prompt {} missing from cache", id.as_str())))
    }

    /// Load and render in one step
    pub fn render(&mut self, id: PromptId, vars: &HashMap<&str, String>) -> Result<RenderedPrompt> {
        Ok(self.get(id)?.render(vars))
    }

    fn load(&self, id: PromptId) -> Result<Prompt> {
        if let Some(path) = self.override_path(id).filter(|p| p.exists()) {
            debug!(prompt = id.as_str(), path = %path.display(), "Using prompt override");
            let content = fs::read_to_string(&path)?;
            let (metadata, body) = parse_prompt(&content)?;
            return Ok(Prompt {
                metadata,
                content: body,
                is_override: true,
            });
        }

        let (metadata, body) = parse_prompt(id.default_content())?;
        Ok(Prompt {
            metadata,
            content: body,
            is_override: false,
        })
    }

    /// Where an override for `id` would live
    pub fn override_path(&self, id: PromptId) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.md", id.as_str())))
    }

    pub fn has_override(&self, id: PromptId) -> bool {
        self.override_path(id).is_some_and(|p| p.exists())
    }

    /// Forget loaded prompts so edited overrides are picked up
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("zen").join("prompts"))
}

fn substitute(template: &str, vars: &HashMap<&str, String>) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{{{}}}}}", key), value)
    })
}

/// Split a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();
    let rest = content
        .strip_prefix("---")
        .ok_or_else(|| Error::Prompt("Prompt must start with YAML frontmatter (---)".into()))?;

    let end = rest.find("---").ok_or_else(|| {
        Error::Prompt("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let metadata: PromptMetadata = serde_yaml::from_str(rest[..end].trim())
        .map_err(|e| Error::Prompt(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, rest[end + 3..].trim().to_string()))
}

/// Text under `header`, up to the next top-level header
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];
    let end = after_header.find("\n# ").unwrap_or(after_header.len());
    Some(after_header[..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prompt() {
        let content = r#"---
id: test_prompt
version: 3
---

# System
Be brief.

# User
Parse {{text}}.
"#;

        let (metadata, body) = parse_prompt(content).unwrap();
        assert_eq!(metadata.id, "test_prompt");
        assert_eq!(metadata.version, 3);
        assert!(body.starts_with("# System"));
    }

    #[test]
    fn test_parse_prompt_requires_frontmatter() {
        assert!(matches!(parse_prompt("# User\nhi"), Err(Error::Prompt(_))));
        assert!(matches!(parse_prompt("---\nid: x\n"), Err(Error::Prompt(_))));
    }

    #[test]
    fn test_render_splits_sections() {
        let (metadata, content) =
            parse_prompt("---\nid: t\nversion: 1\n---\n# System\nSys {{who}}\n\n# User\nHello {{who}}, {{n}}")
                .unwrap();
        let prompt = Prompt {
            metadata,
            content,
            is_override: false,
        };

        let mut vars = HashMap::new();
        vars.insert("who", "Ada".to_string());
        vars.insert("n", "42".to_string());

        let rendered = prompt.render(&vars);
        assert_eq!(rendered.system.as_deref(), Some("Sys Ada"));
        assert_eq!(rendered.user, "Hello Ada, 42");
    }

    #[test]
    fn test_default_prompts_parse() {
        let mut lib = PromptLibrary::embedded_only();
        for id in PromptId::all() {
            let prompt = lib.get(*id).unwrap();
            assert_eq!(prompt.metadata.id, id.as_str());
            assert!(!prompt.is_override);
            assert!(prompt.user_section().is_some());
        }
    }

    #[test]
    fn test_override_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("suggest_budget.md"),
            "---\nid: suggest_budget\nversion: 9\n---\n# User\nIncome {{income}}",
        )
        .unwrap();

        let mut lib = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        assert!(lib.has_override(PromptId::SuggestBudget));
        assert!(!lib.has_override(PromptId::SpendingInsights));

        let mut vars = HashMap::new();
        vars.insert("income", "1800".to_string());
        let rendered = lib.render(PromptId::SuggestBudget, &vars).unwrap();
        assert_eq!(rendered.user, "Income 1800");
        assert!(rendered.system.is_none());
        assert_eq!(lib.get(PromptId::SuggestBudget).unwrap().metadata.version, 9);
    }
}
