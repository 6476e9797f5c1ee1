use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calendar::{canonical_key, span_len};
use crate::metrics::Metrics;

/// Smallest effective/PTO ratio a bridge may have when it is built.
pub const MIN_BRIDGE_EFFICIENCY: f64 = 3.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Grouped,
    Optimized,
    #[default]
    Balanced,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Grouped, Strategy::Optimized, Strategy::Balanced];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Grouped => "grouped",
            Self::Optimized => "optimized",
            Self::Balanced => "balanced",
        }
    }

    /// Lenient parse used for user-supplied tags. Anything unknown becomes `Grouped`.
    pub fn from_tag(tag: &str) -> Self {
        match Self::from_str(tag) {
            Ok(strategy) => strategy,
            Err(err) => {
                warn!("{err}, falling back to grouped");
                Self::Grouped
            }
        }
    }

    /// Alternatives scoring below this efficiency are never offered.
    pub fn min_alternative_efficiency(&self) -> f64 {
        match self {
            Self::Grouped => 1.5,
            Self::Optimized => 2.5,
            Self::Balanced => 2.0,
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Grouped => "GROUPED",
            Self::Optimized => "OPTIMIZED",
            Self::Balanced => "BALANCED",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown strategy: {0}")]
pub struct StrategyParseError(pub String);

impl FromStr for Strategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "grouped" | "group" | "blocks" => Ok(Self::Grouped),
            "optimized" | "optimised" | "efficiency" => Ok(Self::Optimized),
            "balanced" | "balance" => Ok(Self::Balanced),
            _ => Err(StrategyParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum HolidayVariant {
    National,
    Regional,
    Custom,
}

impl Display for HolidayVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::National => "national",
            Self::Regional => "regional",
            Self::Custom => "custom",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown holiday variant: {0}")]
pub struct HolidayVariantParseError(pub String);

impl FromStr for HolidayVariant {
    type Err = HolidayVariantParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "national" | "public" => Ok(Self::National),
            "regional" | "local" => Ok(Self::Regional),
            "custom" | "company" => Ok(Self::Custom),
            _ => Err(HolidayVariantParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
    pub variant: HolidayVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Holiday {
    pub fn national(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            variant: HolidayVariant::National,
            location: None,
        }
    }

    pub fn regional(date: NaiveDate, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            variant: HolidayVariant::Regional,
            location: Some(location.into()),
        }
    }

    pub fn custom(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
            variant: HolidayVariant::Custom,
            location: None,
        }
    }
}

/// A run of free days joined by the PTO workdays needed to make it contiguous.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bridge {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pto_days_needed: u32,
    pub effective_days: u32,
    pub efficiency: f64,
    pub pto_days: Vec<NaiveDate>,
    #[serde(default)]
    pub holiday_connections: u32,
}

impl Bridge {
    /// Builds a bridge spanning `start..=end`, or `None` when the span is
    /// malformed or falls under [`MIN_BRIDGE_EFFICIENCY`].
    pub fn try_new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        mut pto_days: Vec<NaiveDate>,
        holiday_connections: u32,
    ) -> Option<Self> {
        pto_days.sort();
        pto_days.dedup();
        if pto_days.is_empty() || end_date < start_date {
            return None;
        }
        if pto_days
            .iter()
            .any(|day| *day < start_date || *day > end_date)
        {
            return None;
        }

        let effective_days = span_len(start_date, end_date);
        let pto_days_needed = u32::try_from(pto_days.len()).ok()?;
        let efficiency = f64::from(effective_days) / f64::from(pto_days_needed);
        if efficiency < MIN_BRIDGE_EFFICIENCY {
            return None;
        }

        Some(Self {
            start_date,
            end_date,
            pto_days_needed,
            effective_days,
            efficiency,
            pto_days,
            holiday_connections,
        })
    }

    pub fn key(&self) -> String {
        canonical_key(&self.pto_days)
    }

    pub fn is_single_day(&self) -> bool {
        self.pto_days_needed == 1
    }

    pub fn uses(&self, day: NaiveDate) -> bool {
        self.pto_days.binary_search(&day).is_ok()
    }
}

/// A complete day selection together with the bridges it was built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub days: Vec<NaiveDate>,
    pub bridges: Vec<Bridge>,
    pub strategy: Strategy,
    pub metrics: Metrics,
}

impl Suggestion {
    pub fn empty(strategy: Strategy) -> Self {
        Self {
            days: Vec::new(),
            bridges: Vec::new(),
            strategy,
            metrics: Metrics::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn key(&self) -> String {
        canonical_key(&self.days)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.days.binary_search(&day).is_ok()
    }

    pub fn total_effective_days(&self) -> u32 {
        self.metrics.total_effective_days
    }

    pub fn efficiency(&self) -> f64 {
        if self.days.is_empty() {
            return 0.0;
        }
        f64::from(self.total_effective_days()) / self.days.len() as f64
    }

    /// Selected days that no bridge accounts for.
    pub fn standalone_days(&self) -> Vec<NaiveDate> {
        self.days
            .iter()
            .copied()
            .filter(|day| !self.bridges.iter().any(|bridge| bridge.uses(*day)))
            .collect()
    }
}
