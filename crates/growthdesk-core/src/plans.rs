use crate::error::{GrowthDeskError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Growth,
    #[default]
    Professional,
    Enterprise,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Growth, Plan::Professional, Plan::Enterprise];

    pub fn key(&self) -> &'static str {
        match self {
            Plan::Growth => "growth",
            Plan::Professional => "professional",
            Plan::Enterprise => "enterprise",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Plan::Growth => "Growth Plan",
            Plan::Professional => "Professional Plan",
            Plan::Enterprise => "Enterprise Plan",
        }
    }

    /// One-time setup fee in cents.
    pub fn setup_fee_cents(&self) -> i64 {
        match self {
            Plan::Growth => 299_700,
            Plan::Professional => 499_700,
            Plan::Enterprise => 999_700,
        }
    }

    /// Recurring monthly fee in cents.
    pub fn monthly_fee_cents(&self) -> i64 {
        match self {
            Plan::Growth => 99_700,
            Plan::Professional => 149_700,
            Plan::Enterprise => 299_700,
        }
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            name: self.name().to_string(),
            setup_fee: cents_to_major(self.setup_fee_cents()),
            monthly_fee: cents_to_major(self.monthly_fee_cents()),
        }
    }
}

impl FromStr for Plan {
    type Err = GrowthDeskError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim();
        Plan::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| GrowthDeskError::InvalidPlan(key.to_string()))
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Plan pricing in major currency units, as returned to the checkout page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub name: String,
    pub setup_fee: f64,
    pub monthly_fee: f64,
}

pub fn cents_to_major(cents: i64) -> f64 {
    cents as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_prices() {
        assert_eq!(Plan::Growth.setup_fee_cents(), 299_700);
        assert_eq!(Plan::Growth.monthly_fee_cents(), 99_700);
        assert_eq!(Plan::Professional.setup_fee_cents(), 499_700);
        assert_eq!(Plan::Professional.monthly_fee_cents(), 149_700);
        assert_eq!(Plan::Enterprise.setup_fee_cents(), 999_700);
        assert_eq!(Plan::Enterprise.monthly_fee_cents(), 299_700);
    }

    #[test]
    fn parse_known_and_unknown_keys() {
        assert_eq!("growth".parse::<Plan>().unwrap(), Plan::Growth);
        assert_eq!(" Enterprise ".parse::<Plan>().unwrap(), Plan::Enterprise);
        assert!(matches!(
            "platinum".parse::<Plan>(),
            Err(GrowthDeskError::InvalidPlan(k)) if k == "platinum"
        ));
        assert_eq!(Plan::default(), Plan::Professional);
    }

    #[test]
    fn summary_is_in_major_units() {
        let summary = Plan::Professional.summary();
        assert_eq!(summary.name, "Professional Plan");
        assert_eq!(summary.setup_fee, 4997.0);
        assert_eq!(summary.monthly_fee, 1497.0);
    }
}
