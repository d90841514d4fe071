use super::Rule;
use crate::logic::calculations::{format_range, scaled_confidence};
use crate::models::{Finding, FindingCategory, MeasuredValue, PlantContext, Severity};

/// Moisture % above which waterlogging becomes critical regardless of plant.
pub const WATERLOGGED_CRITICAL_PERCENT: f64 = 90.0;

/// Irrigation events in a trailing 7-day window above which frequency is excessive.
pub const EXCESSIVE_EVENTS_7D_WARNING: u32 = 10;
/// More than twice a day on average.
pub const EXCESSIVE_EVENTS_7D_CRITICAL: u32 = 14;

/// Under-watering rule - soil moisture below the plant's wilting thresholds
///
/// Thresholds come from the plant profile (generic: critical <15%, warning <20%).
///
/// Severity levels:
/// - Warning: below the warning threshold
/// - Critical: below the critical threshold
pub struct UnderWateringRule;

impl Rule<PlantContext> for UnderWateringRule {
    fn code(&self) -> &'static str {
        "WATER.001"
    }

    fn name(&self) -> &'static str {
        "Under-Watering"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::WaterStress
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        ctx.has_soil() && ctx.moisture().is_some()
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let moisture = ctx.moisture()?;
        let profile = ctx.profile();

        let (severity, confidence) = if moisture < profile.moisture_critical_percent {
            let deficit = profile.moisture_critical_percent - moisture;
            let confidence = scaled_confidence(0.90, 0.97, deficit, 10.0);
            (Severity::Critical, confidence)
        } else if moisture < profile.moisture_warning_percent {
            let deficit = profile.moisture_warning_percent - moisture;
            let confidence = scaled_confidence(0.75, 0.88, deficit, 5.0);
            (Severity::Warning, confidence)
        } else {
            return None;
        };

        let title = match severity {
            Severity::Critical => "Severe Drought Stress",
            _ => "Soil Drying Out",
        };

        let action = match severity {
            Severity::Critical => {
                "Water immediately and deeply, soaking the full root zone. Check again within \
                 24 hours and mulch 2-3 inches to slow evaporation."
            }
            _ => {
                "Water within the next day. Prefer one deep soak over several light sprinkles \
                 so moisture reaches the lower root zone."
            }
        };

        Some(
            Finding::new(self.code(), self.category(), severity, title)
                .with_confidence(confidence)
                .with_explanation(format!(
                    "{} is growing in soil at {:.0}% moisture, below the {:.0}% level where \
                     water stress begins.",
                    ctx.display_name(),
                    moisture,
                    profile.moisture_warning_percent
                ))
                .with_mechanism(
                    "As soil dries, water potential drops below what roots can extract. Guard \
                     cells close stomata to limit transpiration, which also halts CO2 uptake and \
                     photosynthesis. Sustained deficit causes turgor loss, wilting, blossom drop \
                     and root hair death.",
                )
                .with_action(action)
                .with_measured(MeasuredValue::number(moisture, "%"))
                .with_optimal_range(format!(
                    "{}%",
                    format_range(
                        profile.moisture_warning_percent,
                        profile.moisture_saturation_percent,
                        0
                    )
                ))
                .with_reference(
                    "Kramer, P.J. & Boyer, J.S. (1995). Water Relations of Plants and Soils.",
                )
                .with_reference("Taiz, L. & Zeiger, E. (2010). Plant Physiology, 5th ed., ch. 26."),
        )
    }
}

/// Over-watering rule - saturated soil starves roots of oxygen
///
/// Severity levels:
/// - Warning: above the plant's saturation threshold (generic 80%)
/// - Critical: above 90%
pub struct OverWateringRule;

impl Rule<PlantContext> for OverWateringRule {
    fn code(&self) -> &'static str {
        "WATER.002"
    }

    fn name(&self) -> &'static str {
        "Over-Watering"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::WaterStress
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        ctx.has_soil() && ctx.moisture().is_some()
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let moisture = ctx.moisture()?;
        let saturation = ctx.profile().moisture_saturation_percent;

        if moisture <= saturation {
            return None;
        }

        let excess = moisture - saturation;
        let (severity, confidence) = if moisture > WATERLOGGED_CRITICAL_PERCENT {
            let confidence = scaled_confidence(0.85, 0.95, excess, 15.0);
            (Severity::Critical, confidence)
        } else {
            let confidence = scaled_confidence(0.70, 0.85, excess, 10.0);
            (Severity::Warning, confidence)
        };

        // Recent watering on top of saturated soil strengthens the case.
        let confidence = match ctx.days_since_watering {
            Some(0) | Some(1) => confidence + 0.03,
            _ => confidence,
        };

        let title = match severity {
            Severity::Critical => "Waterlogged Root Zone",
            _ => "Soil Staying Too Wet",
        };

        Some(
            Finding::new(self.code(), self.category(), severity, title)
                .with_confidence(confidence)
                .with_explanation(format!(
                    "Soil moisture is {:.0}%, above the {:.0}% level where pore space fills \
                     with water.",
                    moisture, saturation
                ))
                .with_mechanism(
                    "Water-filled pores block oxygen diffusion to roots. Hypoxic roots switch to \
                     fermentation, lose the energy needed for nutrient uptake, and become prone to \
                     Pythium and Phytophthora root rot. Leaves yellow and wilt despite wet soil.",
                )
                .with_action(
                    "Pause irrigation until the top 2 inches dry. Improve drainage with organic \
                     matter or raised beds, and check for blocked drainage holes in containers.",
                )
                .with_measured(MeasuredValue::number(moisture, "%"))
                .with_optimal_range(format!("below {:.0}%", saturation))
                .with_reference(
                    "Drew, M.C. (1997). Oxygen deficiency and root metabolism. Annu. Rev. Plant \
                     Physiol. 48:223-250.",
                )
                .with_reference(
                    "Kozlowski, T.T. (1997). Responses of woody plants to flooding and salinity. \
                     Tree Physiology Monograph 1.",
                ),
        )
    }
}

/// Excessive irrigation frequency - too many watering events in the trailing week
///
/// Severity levels:
/// - Warning: more than 10 events in 7 days
/// - Critical: more than 14 events in 7 days
pub struct ExcessiveIrrigationFrequencyRule;

impl Rule<PlantContext> for ExcessiveIrrigationFrequencyRule {
    fn code(&self) -> &'static str {
        "WATER.003"
    }

    fn name(&self) -> &'static str {
        "Excessive Irrigation Frequency"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::WaterStress
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        ctx.has_soil() && ctx.irrigation_events_7d.is_some()
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let events = ctx.irrigation_events_7d?;

        let severity = if events > EXCESSIVE_EVENTS_7D_CRITICAL {
            Severity::Critical
        } else if events > EXCESSIVE_EVENTS_7D_WARNING {
            Severity::Warning
        } else {
            return None;
        };

        // Wet soil confirms the watering is not simply keeping up with demand.
        let soil_wet = ctx
            .moisture()
            .map(|m| m > ctx.profile().moisture_saturation_percent)
            .unwrap_or(false);
        let confidence = match (severity, soil_wet) {
            (Severity::Critical, true) => 0.90,
            (Severity::Critical, false) => 0.80,
            (_, true) => 0.80,
            _ => 0.65,
        };

        Some(
            Finding::new(self.code(), self.category(), severity, "Watering Too Often")
                .with_confidence(confidence)
                .with_explanation(format!(
                    "{} was watered {} times in the last 7 days.",
                    ctx.display_name(),
                    events
                ))
                .with_mechanism(
                    "Frequent light watering keeps the surface wet while the deeper profile \
                     never dries and re-aerates. Roots stay shallow, fungal pathogens thrive on \
                     constantly moist surfaces, and soluble nutrients leach below the root zone.",
                )
                .with_action(
                    "Water less often but more deeply: aim for 2-4 soakings a week and let the \
                     top inch of soil dry between them.",
                )
                .with_measured(MeasuredValue::number(events as f64, "events/7d"))
                .with_optimal_range(format!("≤ {} events/7d", EXCESSIVE_EVENTS_7D_WARNING))
                .with_reference(
                    "University of Minnesota Extension (2021). Watering the vegetable garden.",
                ),
        )
    }
}
