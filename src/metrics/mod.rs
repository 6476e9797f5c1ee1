pub mod calculator;

use serde::{Deserialize, Serialize};

/// Read-only analytics over the active day selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Metrics {
    /// Active days on a Monday or Friday.
    pub long_weekends: u32,
    /// Clusters of active days separated by more than a week.
    pub rest_blocks: u32,
    /// Longest stretch of working days without a break (weekends don't reset it).
    pub max_working_period: u32,
    pub first_last_break: Option<FirstLastBreak>,
    pub average_efficiency: f64,
    pub bonus_days: u32,
    pub quarter_dist: [u32; 4],
    pub monthly_dist: [u32; 12],
    pub bridges_used: u32,
    pub working_days_per_month: f64,
    pub total_effective_days: u32,
    /// Runs of three or more consecutive active days, by quarter of the first day.
    pub long_blocks_per_quarter: [u32; 4],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FirstLastBreak {
    pub first: String,
    pub last: String,
}

impl Metrics {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
