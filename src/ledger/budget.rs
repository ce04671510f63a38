use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Monthly spending limit per expense-category key.
pub type BudgetMap = BTreeMap<String, f64>;

pub const WARNING_THRESHOLD_PERCENT: f64 = 70.0;
pub const DANGER_THRESHOLD_PERCENT: f64 = 90.0;

/// Severity band for a budget's utilization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Normal,
    Warning,
    Danger,
}

impl BudgetTier {
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage >= DANGER_THRESHOLD_PERCENT {
            BudgetTier::Danger
        } else if percentage >= WARNING_THRESHOLD_PERCENT {
            BudgetTier::Warning
        } else {
            BudgetTier::Normal
        }
    }
}

/// Spent-versus-limit for one budgeted category in one month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetProgress {
    pub category: String,
    pub label: String,
    pub spent: f64,
    pub limit: f64,
    /// `spent / limit * 100`, not clamped.
    pub percentage: f64,
    pub tier: BudgetTier,
}

impl BudgetProgress {
    /// Progress bar width in percent, clamped to 100.
    pub fn bar_width(&self) -> f64 {
        self.percentage.min(100.0)
    }

    pub fn remaining(&self) -> f64 {
        self.limit - self.spent
    }

    pub fn is_over_budget(&self) -> bool {
        self.spent > self.limit
    }
}
