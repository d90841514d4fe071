use crate::models::GrowthStage;

/// Days to maturity assumed when a plant has no harvest reference.
pub const GENERIC_DAYS_TO_MATURITY: u32 = 70;

/// Reference photoperiod used when estimating light hours from shading.
pub const REFERENCE_DAYLIGHT_HOURS: f64 = 12.0;

/// Growth stage from days since planting as a fraction of days to harvest.
///
/// Seedling < 15%, Vegetative < 45%, Flowering < 70%, Fruiting < 100%, then Harvest.
pub fn growth_stage(days_since_planting: u32, days_to_harvest: Option<u32>) -> GrowthStage {
    let maturity = days_to_harvest.unwrap_or(GENERIC_DAYS_TO_MATURITY).max(1);
    let fraction = days_since_planting as f64 / maturity as f64;

    if fraction < 0.15 {
        GrowthStage::Seedling
    } else if fraction < 0.45 {
        GrowthStage::Vegetative
    } else if fraction < 0.70 {
        GrowthStage::Flowering
    } else if fraction < 1.0 {
        GrowthStage::Fruiting
    } else {
        GrowthStage::Harvest
    }
}

/// Confidence that grows with deviation from a threshold.
///
/// Starts at `base` right at the threshold and rises linearly to `ceiling`
/// once the deviation reaches `full_at`.
pub fn scaled_confidence(base: f64, ceiling: f64, deviation: f64, full_at: f64) -> f64 {
    if full_at <= 0.0 {
        return ceiling;
    }
    let ratio = (deviation.abs() / full_at).clamp(0.0, 1.0);
    base + (ceiling - base) * ratio
}

/// Render a numeric band with an en dash, e.g. `6.0–6.8`.
pub fn format_range(low: f64, high: f64, decimals: usize) -> String {
    format!("{:.*}–{:.*}", decimals, low, decimals, high)
}

/// Rough daily light hours reaching a bed given its shading percentage.
pub fn estimated_light_hours(shading_percent: f64) -> f64 {
    REFERENCE_DAYLIGHT_HOURS * (1.0 - shading_percent.clamp(0.0, 100.0) / 100.0)
}

pub fn is_valid_percent(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

/// A reading that is present and finite.
pub fn finite_reading(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// A reading that is present, finite and not negative.
pub fn non_negative_reading(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// A reading that is present and within 0–100 %.
pub fn percent_reading(value: Option<f64>) -> Option<f64> {
    value.filter(|v| is_valid_percent(*v))
}
