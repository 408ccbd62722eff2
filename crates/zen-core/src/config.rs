//! Settings for the finance engine
//!
//! Settings are loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/zen/config/settings.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Sections missing from an override keep their embedded values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Budget, Category, Icon};

/// Embedded default settings (compiled into binary)
const DEFAULT_SETTINGS: &str = include_str!("../../../config/settings.toml");

/// Color tokens assigned to seeded budgets, in order
pub const CHART_PALETTE: [&str; 6] = ["chart-1", "chart-2", "chart-3", "chart-4", "chart-5", "chart-6"];

/// A budget seeded into an empty store
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultBudget {
    pub category: Category,
    pub limit: f64,
    pub icon: Icon,
}

/// Dashboard knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSettings {
    pub upcoming_limit: usize,
    pub top_budgets: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            upcoming_limit: 3,
            top_budgets: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub default_budgets: Vec<DefaultBudget>,
    pub dashboard: DashboardSettings,
}

impl Settings {
    /// Load from the default override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load with an explicit override path (missing file = embedded defaults)
    pub fn load_from(override_path: Option<&Path>) -> Result<Self> {
        let path = override_path
            .map(Path::to_path_buf)
            .or_else(default_settings_path)
            .filter(|p| p.exists());

        let mut settings = Self::embedded()?;
        if let Some(path) = path {
            debug!(path = %path.display(), "Loading settings override");
            let content = fs::read_to_string(&path)?;
            settings.apply(parse_settings(&content)?)?;
        }
        Ok(settings)
    }

    /// The compiled-in defaults
    pub fn embedded() -> Result<Self> {
        let mut settings = Self {
            default_budgets: Vec::new(),
            dashboard: DashboardSettings::default(),
        };
        settings.apply(parse_settings(DEFAULT_SETTINGS)?)?;
        Ok(settings)
    }

    /// The seeded budgets as real `Budget` values (zero spend, palette colors)
    pub fn seed_budgets(&self) -> Vec<Budget> {
        self.default_budgets
            .iter()
            .enumerate()
            .map(|(i, b)| Budget {
                category: b.category.clone(),
                limit: b.limit,
                spent: 0.0,
                icon: b.icon,
                color: CHART_PALETTE[i % CHART_PALETTE.len()].to_string(),
            })
            .collect()
    }

    fn apply(&mut self, raw: RawSettings) -> Result<()> {
        if let Some(budgets) = raw.budgets {
            let mut parsed = Vec::with_capacity(budgets.len());
            for b in budgets {
                let category = Category::parse(&b.category)?;
                if parsed.iter().any(|p: &DefaultBudget| p.category == category) {
                    return Err(Error::Validation(format!(
                        "Duplicate default budget: {}",
                        category
                    )));
                }
                if !(b.limit.is_finite() && b.limit > 0.0) {
                    return Err(Error::Validation(format!(
                        "Default budget limit for {} must be positive",
                        category
                    )));
                }
                let icon = b
                    .icon
                    .parse::<Icon>()
                    .map_err(Error::Validation)?;
                parsed.push(DefaultBudget {
                    category,
                    limit: b.limit,
                    icon,
                });
            }
            self.default_budgets = parsed;
        }

        if let Some(dashboard) = raw.dashboard {
            if let Some(limit) = dashboard.upcoming_limit {
                self.dashboard.upcoming_limit = limit;
            }
            if let Some(top) = dashboard.top_budgets {
                self.dashboard.top_budgets = top;
            }
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::embedded().unwrap_or_else(|_| Self {
            default_budgets: Vec::new(),
            dashboard: DashboardSettings::default(),
        })
    }
}

/// Default settings override path
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("zen").join("config").join("settings.toml"))
}

/// Raw settings structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawSettings {
    budgets: Option<Vec<RawBudget>>,
    dashboard: Option<RawDashboard>,
}

#[derive(Debug, Deserialize)]
struct RawBudget {
    category: String,
    limit: f64,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct RawDashboard {
    upcoming_limit: Option<usize>,
    top_budgets: Option<usize>,
}

fn parse_settings(content: &str) -> Result<RawSettings> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BuiltinCategory;

    #[test]
    fn test_embedded_defaults() {
        let settings = Settings::embedded().unwrap();
        assert_eq!(settings.default_budgets.len(), 6);
        assert_eq!(settings.dashboard.upcoming_limit, 3);

        let seeded = settings.seed_budgets();
        assert!(seeded.iter().all(|b| b.limit == 500.0 && b.spent == 0.0));
        assert_eq!(
            seeded[0].category,
            Category::Builtin(BuiltinCategory::FoodAndDrink)
        );
        assert_eq!(seeded[0].color, "chart-1");
        assert_eq!(seeded[5].color, "chart-6");
    }

    #[test]
    fn test_override_file_replaces_budgets_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            r#"
[[budgets]]
category = "Pets"
limit = 80
icon = "PawPrint"
"#,
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.default_budgets.len(), 1);
        assert_eq!(settings.default_budgets[0].icon, Icon::PawPrint);
        assert_eq!(settings.dashboard, DashboardSettings::default());
    }

    #[test]
    fn test_override_rejects_bad_icon() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "[[budgets]]\ncategory = \"Pets\"\nlimit = 80\nicon = \"Dragon\"\n",
        )
        .unwrap();
        assert!(matches!(
            Settings::load_from(Some(&path)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(parse_settings("[[budgets"), Err(Error::Config(_))));
    }
}
