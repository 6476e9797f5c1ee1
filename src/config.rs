use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::horizon::build_horizon;
use crate::holidays::{load_holidays_file, merge_holidays};
use crate::optimizer::alternatives::DEFAULT_MAX_ALTERNATIVES;
use crate::types::{Holiday, Strategy};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub horizon: HorizonConfig,
    #[serde(default)]
    pub holidays: HolidaysConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_budget")]
    pub budget: u32,
    /// Strategy tag; unknown values fall back to grouped when planning.
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default)]
    pub allow_past_days: bool,
    #[serde(default = "default_max_alternatives")]
    pub max_alternatives: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HorizonConfig {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub carry_over_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HolidaysConfig {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub custom: Vec<CustomHolidayConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomHolidayConfig {
    pub date: NaiveDate,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub year: Option<i32>,
    pub budget: Option<u32>,
    pub strategy: Option<String>,
    pub allow_past_days: Option<bool>,
    pub holidays_file: Option<String>,
    pub region: Option<String>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/pto-bridge/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(year) = overrides.year {
            self.horizon.year = Some(year);
        }
        if let Some(budget) = overrides.budget {
            self.planner.budget = budget;
        }
        if let Some(strategy) = overrides.strategy {
            self.planner.strategy = strategy;
        }
        if let Some(allow) = overrides.allow_past_days {
            self.planner.allow_past_days = allow;
        }
        if let Some(file) = overrides.holidays_file {
            self.holidays.file = Some(file);
        }
        if let Some(region) = overrides.region {
            self.holidays.region = Some(region);
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn strategy(&self) -> Strategy {
        Strategy::from_tag(&self.planner.strategy)
    }

    /// Month anchors for the configured year, or `fallback_year` when unset.
    pub fn horizon_anchors(&self, fallback_year: i32) -> Vec<NaiveDate> {
        let year = self.horizon.year.unwrap_or(fallback_year);
        build_horizon(year, self.horizon.carry_over_months)
    }

    /// Holidays from the configured file merged with the custom entries.
    pub fn resolved_holidays(&self) -> Result<Vec<Holiday>> {
        let external = match &self.holidays.file {
            Some(file) if !file.trim().is_empty() => load_holidays_file(&expand_tilde(file))?,
            _ => Vec::new(),
        };
        let custom: Vec<Holiday> = self
            .holidays
            .custom
            .iter()
            .map(|entry| Holiday::custom(entry.date, entry.name.clone()))
            .collect();
        Ok(merge_holidays(
            &external,
            &custom,
            self.holidays.region.as_deref(),
        ))
    }

    pub fn default_template() -> String {
        let template = r#"[planner]
# PTO days available for the year
budget = 22
# grouped | optimized | balanced
strategy = "balanced"
allow_past_days = false
max_alternatives = 4

[horizon]
# year = 2026
# months of the following year to include (0-12)
carry_over_months = 0

[holidays]
# JSON array of {date, name, variant, location?}
# file = "~/.config/pto-bridge/holidays.json"
# region = "Catalonia"
custom = [
  # { date = "2026-12-31", name = "Office closed" },
]
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            strategy: default_strategy(),
            allow_past_days: false,
            max_alternatives: default_max_alternatives(),
        }
    }
}

fn default_budget() -> u32 {
    22
}

fn default_strategy() -> String {
    Strategy::default().as_slug().to_string()
}

fn default_max_alternatives() -> usize {
    DEFAULT_MAX_ALTERNATIVES
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;

    use super::{Config, ConfigOverrides};
    use crate::types::{HolidayVariant, Strategy};

    #[test]
    fn template_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).expect("parse template");
        assert_eq!(parsed.planner.budget, 22);
        assert_eq!(parsed.strategy(), Strategy::Balanced);
        assert_eq!(parsed.planner.max_alternatives, 4);
        assert!(parsed.horizon.year.is_none());
        assert!(parsed.holidays.custom.is_empty());
    }

    #[test]
    fn missing_sections_use_defaults() {
        let parsed: Config = toml::from_str("[planner]\nbudget = 10\n").expect("parse");
        assert_eq!(parsed.planner.budget, 10);
        assert_eq!(parsed.planner.strategy, "balanced");
        assert_eq!(parsed.horizon.carry_over_months, 0);
    }

    #[test]
    fn overrides_replace_loaded_values() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            year: Some(2027),
            budget: Some(5),
            strategy: Some("optimized".to_string()),
            region: Some("Bavaria".to_string()),
            ..ConfigOverrides::default()
        });
        assert_eq!(config.horizon.year, Some(2027));
        assert_eq!(config.planner.budget, 5);
        assert_eq!(config.strategy(), Strategy::Optimized);
        assert_eq!(config.holidays.region.as_deref(), Some("Bavaria"));
        assert!(!config.planner.allow_past_days);
    }

    #[test]
    fn unknown_strategy_tag_falls_back_to_grouped() {
        let mut config = Config::default();
        config.planner.strategy = "fastest".to_string();
        assert_eq!(config.strategy(), Strategy::Grouped);
    }

    #[test]
    fn horizon_caps_carry_over() {
        let mut config = Config::default();
        config.horizon.carry_over_months = 40;
        let anchors = config.horizon_anchors(2026);
        assert_eq!(anchors.len(), 24);
        assert_eq!(
            anchors.last().copied(),
            NaiveDate::from_ymd_opt(2027, 12, 1)
        );
    }

    #[test]
    fn resolves_file_and_custom_holidays() {
        let path = std::env::temp_dir().join(format!(
            "pto-bridge-config-holidays-{}.json",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"[
  {"date": "2026-12-25", "name": "Christmas Day", "variant": "national"},
  {"date": "2026-09-11", "name": "Diada", "variant": "regional", "location": "Catalonia"}
]"#,
        )
        .expect("write holidays");

        let toml = format!(
            "[holidays]\nfile = \"{}\"\ncustom = [{{ date = \"2026-12-31\", name = \"Office closed\" }}]\n",
            path.display()
        );
        let config: Config = toml::from_str(&toml).expect("parse");
        let holidays = config.resolved_holidays().expect("resolve");
        fs::remove_file(&path).ok();

        assert_eq!(holidays.len(), 2);
        assert_eq!(holidays[0].name, "Christmas Day");
        assert_eq!(holidays[1].variant, HolidayVariant::Custom);
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let path = std::env::temp_dir().join("pto-bridge-does-not-exist/config.toml");
        let config = Config::load(Some(&path)).expect("load");
        assert_eq!(config.planner.budget, 22);
    }
}
