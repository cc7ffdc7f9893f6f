use crate::input::LeadSubmission;
use crate::projection::RoiProjection;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_LEAD_SCORE: u8 = 100;

const QUALIFIED_STAGES: [&str; 3] = ["growth", "established", "enterprise"];

/// Follow-up score in `0..=100` used to prioritise sales outreach.
pub fn lead_score(submission: &LeadSubmission, projection: &RoiProjection) -> u8 {
    let mut score: u32 = 0;

    let revenue = submission.metrics.monthly_revenue;
    score += if revenue > 100_000.0 {
        30
    } else if revenue > 50_000.0 {
        20
    } else if revenue > 25_000.0 {
        10
    } else {
        0
    };

    let stage = submission.business_stage.trim();
    if QUALIFIED_STAGES
        .iter()
        .any(|s| s.eq_ignore_ascii_case(stage))
    {
        score += 20;
    }

    let increase = projection.monthly_increase;
    score += if increase > 10_000.0 {
        30
    } else if increase > 5_000.0 {
        20
    } else if increase > 2_000.0 {
        10
    } else {
        0
    };

    if submission.contact.has_phone() {
        score += 10;
    }
    if submission.contact.has_website() {
        score += 10;
    }

    // The bonuses sum to at most MAX_LEAD_SCORE; the clamp only guards the cast.
    score.min(MAX_LEAD_SCORE as u32) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpPriority {
    High,
    Medium,
    Standard,
}

impl FollowUpPriority {
    pub fn from_score(score: u8) -> Self {
        match score {
            70.. => FollowUpPriority::High,
            50..=69 => FollowUpPriority::Medium,
            _ => FollowUpPriority::Standard,
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            FollowUpPriority::High => "High Priority - Contact within 2 hours",
            FollowUpPriority::Medium => "Medium Priority - Contact within 24 hours",
            FollowUpPriority::Standard => "Standard Priority - Contact within 48 hours",
        }
    }
}

impl fmt::Display for FollowUpPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.recommendation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{BusinessMetricsInput, ContactDetails};
    use crate::projection::project;

    fn submission(revenue: f64, stage: &str, phone: &str, website: &str) -> LeadSubmission {
        LeadSubmission {
            metrics: BusinessMetricsInput {
                monthly_revenue: revenue,
                ..Default::default()
            },
            contact: ContactDetails {
                phone: phone.into(),
                website: website.into(),
                ..Default::default()
            },
            business_stage: stage.into(),
            ..Default::default()
        }
    }

    fn with_increase(increase: f64) -> RoiProjection {
        RoiProjection {
            monthly_increase: increase,
            ..project(&BusinessMetricsInput::default())
        }
    }

    #[test]
    fn empty_lead_scores_zero() {
        let s = submission(0.0, "", "", "");
        assert_eq!(lead_score(&s, &with_increase(0.0)), 0);
    }

    #[test]
    fn revenue_tiers_use_strict_thresholds() {
        let p = with_increase(0.0);
        assert_eq!(lead_score(&submission(25_000.0, "", "", ""), &p), 0);
        assert_eq!(lead_score(&submission(25_000.01, "", "", ""), &p), 10);
        assert_eq!(lead_score(&submission(50_000.0, "", "", ""), &p), 10);
        assert_eq!(lead_score(&submission(50_001.0, "", "", ""), &p), 20);
        assert_eq!(lead_score(&submission(100_000.0, "", "", ""), &p), 20);
        assert_eq!(lead_score(&submission(100_001.0, "", "", ""), &p), 30);
    }

    #[test]
    fn increase_tiers() {
        let s = submission(0.0, "", "", "");
        assert_eq!(lead_score(&s, &with_increase(2_000.0)), 0);
        assert_eq!(lead_score(&s, &with_increase(2_001.0)), 10);
        assert_eq!(lead_score(&s, &with_increase(5_001.0)), 20);
        assert_eq!(lead_score(&s, &with_increase(10_001.0)), 30);
    }

    #[test]
    fn stage_and_contact_bonuses() {
        let p = with_increase(0.0);
        assert_eq!(lead_score(&submission(0.0, "growth", "", ""), &p), 20);
        assert_eq!(lead_score(&submission(0.0, "Enterprise", "", ""), &p), 20);
        assert_eq!(lead_score(&submission(0.0, "startup", "", ""), &p), 0);
        assert_eq!(
            lead_score(&submission(0.0, "", "555-0100", "shop.example"), &p),
            20
        );
        assert_eq!(lead_score(&submission(0.0, "", "   ", ""), &p), 0);
    }

    #[test]
    fn every_bonus_maxed_scores_exactly_one_hundred() {
        // 30 + 20 + 30 + 10 + 10; the formula cannot exceed MAX_LEAD_SCORE
        let s = submission(250_000.0, "established", "555-0100", "shop.example");
        assert_eq!(lead_score(&s, &with_increase(50_000.0)), 100);
    }

    #[test]
    fn priority_bands() {
        assert_eq!(FollowUpPriority::from_score(100), FollowUpPriority::High);
        assert_eq!(FollowUpPriority::from_score(70), FollowUpPriority::High);
        assert_eq!(FollowUpPriority::from_score(69), FollowUpPriority::Medium);
        assert_eq!(FollowUpPriority::from_score(50), FollowUpPriority::Medium);
        assert_eq!(FollowUpPriority::from_score(49), FollowUpPriority::Standard);
        assert_eq!(
            FollowUpPriority::Medium.recommendation(),
            "Medium Priority - Contact within 24 hours"
        );
    }
}
