//! ROI projection for a prospective storefront.
//!
//! Pure, deterministic arithmetic over [`BusinessMetricsInput`]. Every
//! constant below is part of the published heuristic and must not drift.

use crate::input::{bound_amount, bound_percentage, BusinessMetricsInput};
use serde::{Deserialize, Serialize};

/// Relative conversion-rate lift assumed for every storefront.
pub const CONVERSION_LIFT_FACTOR: f64 = 0.4;
/// Upper bound on the conversion-rate lift, in percentage points.
pub const MAX_CONVERSION_LIFT: f64 = 2.0;
/// Share of abandoned carts assumed recoverable.
pub const CART_RECOVERY_FACTOR: f64 = 0.15;
/// Reference monthly cost of the service, in major currency units.
pub const MONTHLY_INVESTMENT: f64 = 2997.0;
/// Payback reported when the projection shows no monthly gain.
pub const FALLBACK_PAYBACK_MONTHS: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiProjection {
    pub current_monthly_revenue: f64,
    pub projected_monthly_revenue: f64,
    pub monthly_increase: f64,
    pub annual_increase: f64,
    pub current_conversion_rate: f64,
    pub projected_conversion_rate: f64,
    pub recovered_orders: f64,
    pub monthly_roi: f64,
    pub annual_roi: f64,
    pub payback_period: f64,
}

impl RoiProjection {
    /// `false` when the stated revenue already meets or beats the projection.
    pub fn has_opportunity(&self) -> bool {
        self.monthly_increase > 0.0
    }
}

/// Inputs outside the coercion bounds are clamped first, so every field of
/// the result is finite.
pub fn project(input: &BusinessMetricsInput) -> RoiProjection {
    let current_conversion_rate = bound_percentage(input.current_conversion_rate);
    let cart_abandonment_rate = bound_percentage(input.cart_abandonment_rate);
    let monthly_orders = bound_amount(input.monthly_orders);

    let conversion_improvement =
        (current_conversion_rate * CONVERSION_LIFT_FACTOR).min(MAX_CONVERSION_LIFT);
    let cart_recovery_pct = cart_abandonment_rate * CART_RECOVERY_FACTOR;

    let projected_conversion_rate = current_conversion_rate + conversion_improvement;
    let recovered_orders = monthly_orders * (cart_recovery_pct / 100.0);
    let new_monthly_orders = monthly_orders + recovered_orders;

    let current_monthly_revenue = bound_amount(input.monthly_revenue);
    let projected_monthly_revenue = new_monthly_orders * bound_amount(input.average_order_value);
    let monthly_increase = projected_monthly_revenue - current_monthly_revenue;
    let annual_increase = monthly_increase * 12.0;

    let monthly_roi = (monthly_increase - MONTHLY_INVESTMENT) / MONTHLY_INVESTMENT * 100.0;
    let annual_roi = annual_increase / (MONTHLY_INVESTMENT * 12.0) * 100.0;

    let payback_period = if monthly_increase > 0.0 {
        (MONTHLY_INVESTMENT / monthly_increase).max(1.0)
    } else {
        FALLBACK_PAYBACK_MONTHS
    };

    RoiProjection {
        current_monthly_revenue,
        projected_monthly_revenue,
        monthly_increase,
        annual_increase,
        current_conversion_rate,
        projected_conversion_rate,
        recovered_orders,
        monthly_roi,
        annual_roi,
        payback_period,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{BusinessCategory, MAX_AMOUNT};
    use approx::assert_relative_eq;

    fn reference_input() -> BusinessMetricsInput {
        BusinessMetricsInput {
            monthly_revenue: 50000.0,
            average_order_value: 80.0,
            monthly_orders: 625.0,
            business_category: BusinessCategory::FashionApparel,
            current_conversion_rate: 2.5,
            cart_abandonment_rate: 70.0,
        }
    }

    #[test]
    fn reference_scenario() {
        let p = project(&reference_input());

        assert_relative_eq!(p.projected_conversion_rate, 3.5, epsilon = 1e-9);
        assert_relative_eq!(p.recovered_orders, 65.625, epsilon = 1e-9);
        assert_relative_eq!(p.projected_monthly_revenue, 55250.0, epsilon = 1e-6);
        assert_relative_eq!(p.monthly_increase, 5250.0, epsilon = 1e-6);
        assert_relative_eq!(p.annual_increase, 63000.0, epsilon = 1e-6);
        assert_relative_eq!(p.monthly_roi, 75.175175, epsilon = 1e-4);
        assert_relative_eq!(p.annual_roi, 175.1751751, epsilon = 1e-4);
        assert_eq!(p.payback_period, 1.0);
        assert!(p.has_opportunity());
    }

    #[test]
    fn conversion_lift_is_capped_at_two_points() {
        let input = BusinessMetricsInput {
            current_conversion_rate: 10.0,
            ..reference_input()
        };
        let p = project(&input);
        assert_relative_eq!(p.projected_conversion_rate, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_orders_falls_back_to_twelve_month_payback() {
        let input = BusinessMetricsInput {
            monthly_orders: 0.0,
            ..reference_input()
        };
        let p = project(&input);

        assert_eq!(p.recovered_orders, 0.0);
        assert_eq!(p.projected_monthly_revenue, 0.0);
        assert_eq!(p.monthly_increase, -50000.0);
        assert_eq!(p.payback_period, FALLBACK_PAYBACK_MONTHS);
        assert!(!p.has_opportunity());
    }

    #[test]
    fn all_zero_input_is_total() {
        let p = project(&BusinessMetricsInput::default());
        assert_eq!(p.monthly_increase, 0.0);
        assert_eq!(p.payback_period, 12.0);
        assert_relative_eq!(p.monthly_roi, -100.0, epsilon = 1e-9);
        assert_eq!(p.annual_roi, 0.0);
    }

    #[test]
    fn small_gain_has_long_payback() {
        let input = BusinessMetricsInput {
            monthly_revenue: 0.0,
            average_order_value: 10.0,
            monthly_orders: 100.0,
            cart_abandonment_rate: 0.0,
            ..reference_input()
        };
        let p = project(&input);
        // 1000/month against 2997/month
        assert_relative_eq!(p.payback_period, 2.997, epsilon = 1e-9);
    }

    #[test]
    fn out_of_range_fields_are_clamped_before_projecting() {
        let input = BusinessMetricsInput {
            monthly_revenue: f64::MAX,
            average_order_value: 1e200,
            monthly_orders: 1e200,
            business_category: BusinessCategory::Other,
            current_conversion_rate: f64::NAN,
            cart_abandonment_rate: 1e300,
        };
        let p = project(&input);

        assert_eq!(p.current_monthly_revenue, MAX_AMOUNT);
        assert_eq!(p.current_conversion_rate, 0.0);
        assert_relative_eq!(p.recovered_orders, MAX_AMOUNT * 0.15, max_relative = 1e-12);
        assert!(p.monthly_increase.is_finite() && p.monthly_increase > 0.0);
        assert!(p.monthly_roi.is_finite() && p.annual_roi.is_finite());
    }

    #[test]
    fn industry_multiplier_does_not_change_projection() {
        let base = project(&reference_input());
        for category in BusinessCategory::ALL {
            let input = BusinessMetricsInput {
                business_category: category,
                ..reference_input()
            };
            assert_eq!(project(&input), base);
        }
    }
}
