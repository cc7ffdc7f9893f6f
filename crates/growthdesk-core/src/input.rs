//! Lenient parsing of the ROI calculator form.
//!
//! The payload comes straight from a public web form, so every numeric field
//! accepts JSON numbers, numeric strings, `null`, `""` and the literal
//! `"undefined"`. Anything that does not parse to a finite number becomes `0`.
//! Amounts and counts are capped at [`MAX_AMOUNT`] so every derived figure
//! stays finite.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Ceiling for coerced amounts and counts.
pub const MAX_AMOUNT: f64 = 1e12;

/// Clamp an amount or count into `[0, MAX_AMOUNT]`; non-finite values become `0`.
pub fn bound_amount(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, MAX_AMOUNT)
    } else {
        0.0
    }
}

/// Clamp a percentage into `[0, 100]`; non-finite values become `0`.
pub fn bound_percentage(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Coerce an untrusted JSON value into a finite `f64`, falling back to `0.0`.
pub fn coerce_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "undefined" {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Coerce an untrusted JSON value into display text. Numbers keep their JSON
/// rendering, `null` becomes empty.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn lenient_amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(bound_amount(value.as_ref().map(coerce_number).unwrap_or(0.0)))
}

fn lenient_percentage<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(bound_percentage(
        value.as_ref().map(coerce_number).unwrap_or(0.0),
    ))
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().map(coerce_text).unwrap_or_default())
}

fn lenient_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(coerce_text)
            .filter(|s| !s.trim().is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

fn lenient_category<'de, D: Deserializer<'de>>(d: D) -> Result<BusinessCategory, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value
        .as_ref()
        .map(|v| BusinessCategory::from_label(&coerce_text(v)))
        .unwrap_or_default())
}

/// Storefront vertical selected on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BusinessCategory {
    FashionApparel,
    ElectronicsTech,
    HealthWellness,
    BeautyCosmetics,
    HomeGarden,
    FoodBeverage,
    PetProducts,
    JewelryAccessories,
    SportsFitness,
    #[default]
    Other,
}

impl BusinessCategory {
    pub const ALL: [BusinessCategory; 10] = [
        BusinessCategory::FashionApparel,
        BusinessCategory::ElectronicsTech,
        BusinessCategory::HealthWellness,
        BusinessCategory::BeautyCosmetics,
        BusinessCategory::HomeGarden,
        BusinessCategory::FoodBeverage,
        BusinessCategory::PetProducts,
        BusinessCategory::JewelryAccessories,
        BusinessCategory::SportsFitness,
        BusinessCategory::Other,
    ];

    /// Unknown labels map to `Other`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessCategory::FashionApparel => "fashion-apparel",
            BusinessCategory::ElectronicsTech => "electronics-tech",
            BusinessCategory::HealthWellness => "health-wellness",
            BusinessCategory::BeautyCosmetics => "beauty-cosmetics",
            BusinessCategory::HomeGarden => "home-garden",
            BusinessCategory::FoodBeverage => "food-beverage",
            BusinessCategory::PetProducts => "pet-products",
            BusinessCategory::JewelryAccessories => "jewelry-accessories",
            BusinessCategory::SportsFitness => "sports-fitness",
            BusinessCategory::Other => "other",
        }
    }

    /// Vertical growth multiplier. Kept as reference data; the projection
    /// formula does not apply it.
    pub fn industry_multiplier(&self) -> f64 {
        match self {
            BusinessCategory::FashionApparel => 1.8,
            BusinessCategory::ElectronicsTech => 2.1,
            BusinessCategory::HealthWellness => 1.9,
            BusinessCategory::BeautyCosmetics => 2.0,
            BusinessCategory::HomeGarden => 1.7,
            BusinessCategory::FoodBeverage => 1.6,
            BusinessCategory::PetProducts => 1.8,
            BusinessCategory::JewelryAccessories => 2.2,
            BusinessCategory::SportsFitness => 1.9,
            BusinessCategory::Other => 1.8,
        }
    }
}

impl fmt::Display for BusinessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six self-reported metrics that drive the projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessMetricsInput {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub monthly_revenue: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub average_order_value: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub monthly_orders: f64,
    #[serde(default, deserialize_with = "lenient_category")]
    pub business_category: BusinessCategory,
    #[serde(default, deserialize_with = "lenient_percentage")]
    pub current_conversion_rate: f64,
    #[serde(default, deserialize_with = "lenient_percentage")]
    pub cart_abandonment_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default, deserialize_with = "lenient_text")]
    pub first_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub last_name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub website: String,
}

impl ContactDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    pub fn has_phone(&self) -> bool {
        !self.phone.trim().is_empty()
    }

    pub fn has_website(&self) -> bool {
        !self.website.trim().is_empty()
    }

    pub fn company_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        let company = self.company.trim();
        if company.is_empty() {
            fallback
        } else {
            company
        }
    }
}

/// Everything the ROI calculator form posts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadSubmission {
    #[serde(flatten)]
    pub metrics: BusinessMetricsInput,
    #[serde(flatten)]
    pub contact: ContactDetails,
    #[serde(default, deserialize_with = "lenient_text")]
    pub business_stage: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub hours_week_manual_tasks: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub biggest_challenges: Vec<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub monthly_ad_spend: f64,
}

impl LeadSubmission {
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}
