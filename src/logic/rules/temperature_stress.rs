use super::Rule;
use crate::logic::calculations::{format_range, scaled_confidence};
use crate::models::{Finding, FindingCategory, MeasuredValue, PlantContext, Severity};

/// Degrees °F below the plant minimum at which cold stress becomes critical.
pub const COLD_CRITICAL_MARGIN_F: f64 = 8.0;
/// Degrees °F above the plant maximum at which heat stress becomes critical.
pub const HEAT_CRITICAL_MARGIN_F: f64 = 10.0;

/// Cold stress / frost risk rule
///
/// Applicable when a temperature is measured, or when an outdoor planting has
/// frost forecast in the next 7 days.
///
/// Severity levels:
/// - Info: frost forecast for a frost-tolerant plant
/// - Warning: below the plant minimum
/// - Critical: more than 8°F below minimum, or frost forecast for a frost-tender plant
pub struct ColdStressRule;

impl ColdStressRule {
    fn frost_applies(ctx: &PlantContext) -> bool {
        ctx.frost_risk_next_7_days && ctx.garden_kind == crate::models::GardenKind::Outdoor
    }
}

impl Rule<PlantContext> for ColdStressRule {
    fn code(&self) -> &'static str {
        "TEMP.001"
    }

    fn name(&self) -> &'static str {
        "Cold Stress / Frost Risk"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::TemperatureStress
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        ctx.temperature().is_some() || Self::frost_applies(ctx)
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let min = ctx.min_tolerance_f();
        let frost_tolerant = ctx.profile().frost_tolerant;
        let frost = Self::frost_applies(ctx);
        let temp = ctx.temperature();

        let deficit = temp.map(|t| min - t).filter(|d| *d > 0.0);

        let (severity, confidence) = match (deficit, frost) {
            (Some(d), _) if d > COLD_CRITICAL_MARGIN_F => {
                (Severity::Critical, scaled_confidence(0.85, 0.95, d, 20.0))
            }
            (_, true) if !frost_tolerant => (Severity::Critical, 0.80),
            (Some(d), _) => {
                let confidence = scaled_confidence(0.70, 0.85, d, COLD_CRITICAL_MARGIN_F);
                (Severity::Warning, confidence)
            }
            (None, true) => (Severity::Info, 0.60),
            (None, false) => return None,
        };

        let title = match (severity, frost && !frost_tolerant) {
            (Severity::Critical, true) => "Frost Threatens Tender Plant",
            (Severity::Critical, false) => "Severe Cold Stress",
            (Severity::Warning, _) => "Below Minimum Temperature",
            _ => "Frost Forecast",
        };

        let frost_note = if frost {
            " Frost is also forecast within 7 days."
        } else {
            ""
        };
        let hardiness = if frost_tolerant {
            "frost-tolerant"
        } else {
            "frost-tender"
        };
        let explanation = match temp {
            Some(t) if deficit.is_some() => format!(
                "Temperature is {:.0}°F, below the {:.0}°F minimum for {}.{}",
                t,
                min,
                ctx.display_name(),
                frost_note
            ),
            _ => format!(
                "Frost is forecast within the next 7 days. {} is {}.",
                ctx.display_name(),
                hardiness
            ),
        };

        let action = match severity {
            Severity::Critical => {
                "Cover plants overnight with frost cloth or buckets, water the soil during the \
                 day so it stores heat, and move containers indoors. Harvest ripe fruit before \
                 the cold night."
            }
            Severity::Warning => {
                "Use row covers or cloches at night and delay transplanting or fertilizing \
                 until temperatures recover."
            }
            _ => "Hardy crops can stay out. Light row cover protects leaf quality.",
        };

        let measured = match temp {
            Some(t) => MeasuredValue::number(t, "°F"),
            None => MeasuredValue::flag(frost),
        };

        Some(
            Finding::new(self.code(), self.category(), severity, title)
                .with_confidence(confidence)
                .with_explanation(explanation)
                .with_mechanism(
                    "Chilling stiffens cell membranes and slows enzymes, so roots take up less \
                     water and phosphorus. At freezing, ice forms between cells and draws water \
                     out of them; tender tissue collapses and blackens when it thaws.",
                )
                .with_action(action)
                .with_measured(measured)
                .with_optimal_range(format!(
                    "{}°F",
                    format_range(min, ctx.max_tolerance_f(), 0)
                ))
                .with_reference(
                    "Levitt, J. (1980). Responses of Plants to Environmental Stresses, Vol. 1: \
                     Chilling, Freezing, and High Temperature Stresses.",
                )
                .with_reference(
                    "Lyons, J.M. (1973). Chilling injury in plants. Annu. Rev. Plant Physiol. \
                     24:445-466.",
                ),
        )
    }
}

/// Heat stress rule - temperature above the plant's tolerance
///
/// Severity levels:
/// - Warning: above the plant maximum
/// - Critical: more than 10°F above maximum
pub struct HeatStressRule;

impl Rule<PlantContext> for HeatStressRule {
    fn code(&self) -> &'static str {
        "TEMP.002"
    }

    fn name(&self) -> &'static str {
        "Heat Stress"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::TemperatureStress
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        ctx.temperature().is_some()
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let temp = ctx.temperature()?;
        let max = ctx.max_tolerance_f();

        if temp <= max {
            return None;
        }

        let excess = temp - max;
        let (severity, confidence) = if excess > HEAT_CRITICAL_MARGIN_F {
            let confidence = scaled_confidence(0.85, 0.95, excess, 25.0);
            (Severity::Critical, confidence)
        } else {
            let confidence = scaled_confidence(0.70, 0.85, excess, HEAT_CRITICAL_MARGIN_F);
            (Severity::Warning, confidence)
        };

        let title = match severity {
            Severity::Critical => "Extreme Heat Stress",
            _ => "Heat Stress Warning",
        };

        let action = match severity {
            Severity::Critical => {
                "Shade the plant with 30-50% shade cloth during afternoon hours, water deeply \
                 in early morning, and skip fertilizing until temperatures moderate."
            }
            _ => {
                "Water early in the day and mulch to keep roots cool. Avoid pruning or \
                 fertilizing during the hot spell."
            }
        };

        Some(
            Finding::new(self.code(), self.category(), severity, title)
                .with_confidence(confidence)
                .with_explanation(format!(
                    "Temperature is {:.0}°F, {:.0}°F above the {:.0}°F maximum for {}.",
                    temp,
                    excess,
                    max,
                    ctx.display_name()
                ))
                .with_mechanism(
                    "Above the optimum, respiration outpaces photosynthesis and Rubisco loses \
                     activation, so the plant burns reserves. Pollen viability collapses, \
                     causing blossom drop, and cool-season crops bolt to seed.",
                )
                .with_action(action)
                .with_measured(MeasuredValue::number(temp, "°F"))
                .with_optimal_range(format!(
                    "{}°F",
                    format_range(ctx.min_tolerance_f(), max, 0)
                ))
                .with_reference(
                    "Wahid, A. et al. (2007). Heat tolerance in plants: an overview. Env. Exp. \
                     Botany 61:199-223.",
                )
                .with_reference(
                    "Hatfield, J.L. & Prueger, J.H. (2015). Temperature extremes: effect on plant \
                     growth and development. Weather Clim. Extremes 10:4-10.",
                ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GardenKind;

    fn at(plant: &str, temp: f64) -> PlantContext {
        PlantContext {
            temperature_f: Some(temp),
            ..PlantContext::for_plant(plant)
        }
    }

    #[test]
    fn lettuce_at_98_is_critical() {
        let finding = HeatStressRule.evaluate(&at("Lettuce", 98.0)).unwrap();
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.measured_value.as_number(), Some(98.0));
    }

    #[test]
    fn heat_warning_band() {
        assert_eq!(
            HeatStressRule.evaluate(&at("Lettuce", 80.0)).map(|f| f.severity),
            Some(Severity::Warning)
        );
        assert!(HeatStressRule.evaluate(&at("Lettuce", 75.0)).is_none());
    }

    #[test]
    fn context_tolerance_overrides_profile() {
        let ctx = PlantContext {
            max_temp_f: Some(100.0),
            ..at("Lettuce", 98.0)
        };
        assert!(HeatStressRule.evaluate(&ctx).is_none());
    }

    #[test]
    fn cold_bands() {
        assert_eq!(
            ColdStressRule.evaluate(&at("Tomato", 45.0)).map(|f| f.severity),
            Some(Severity::Warning)
        );
        assert_eq!(
            ColdStressRule.evaluate(&at("Tomato", 40.0)).map(|f| f.severity),
            Some(Severity::Critical)
        );
        assert!(ColdStressRule.evaluate(&at("Tomato", 65.0)).is_none());
    }

    #[test]
    fn frost_flag_without_temperature() {
        let tender = PlantContext {
            frost_risk_next_7_days: true,
            ..PlantContext::for_plant("Tomato")
        };
        assert!(ColdStressRule.is_applicable(&tender));
        let finding = ColdStressRule.evaluate(&tender).unwrap();
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.measured_value, MeasuredValue::flag(true));

        let hardy = PlantContext {
            frost_risk_next_7_days: true,
            ..PlantContext::for_plant("Kale")
        };
        assert_eq!(
            ColdStressRule.evaluate(&hardy).map(|f| f.severity),
            Some(Severity::Info)
        );
    }

    #[test]
    fn frost_flag_ignored_indoors() {
        let ctx = PlantContext {
            frost_risk_next_7_days: true,
            garden_kind: GardenKind::Indoor,
            ..PlantContext::for_plant("Tomato")
        };
        assert!(!ColdStressRule.is_applicable(&ctx));
    }

    #[test]
    fn deep_cold_on_hardy_plant_is_not_a_frost_threat() {
        let ctx = PlantContext {
            frost_risk_next_7_days: true,
            ..at("Kale", 25.0 - COLD_CRITICAL_MARGIN_F - 7.0)
        };
        let finding = ColdStressRule.evaluate(&ctx).unwrap();
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.title, "Severe Cold Stress");

        let tender = PlantContext {
            frost_risk_next_7_days: true,
            ..at("Tomato", 30.0)
        };
        let finding = ColdStressRule.evaluate(&tender).unwrap();
        assert_eq!(finding.title, "Frost Threatens Tender Plant");
    }

    #[test]
    fn malformed_temperature_is_not_applicable() {
        for temp in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let ctx = at("Tomato", temp);
            assert!(!HeatStressRule.is_applicable(&ctx), "{}", temp);
            assert!(!ColdStressRule.is_applicable(&ctx), "{}", temp);
            assert!(HeatStressRule.evaluate(&ctx).is_none(), "{}", temp);
        }
    }

    #[test]
    fn malformed_temperature_with_frost_reports_frost_only() {
        let ctx = PlantContext {
            frost_risk_next_7_days: true,
            ..at("Kale", f64::NAN)
        };
        let finding = ColdStressRule.evaluate(&ctx).unwrap();
        assert_eq!(finding.severity, Severity::Info);
        assert_eq!(finding.measured_value, MeasuredValue::flag(true));
    }

    #[test]
    fn non_finite_tolerance_override_falls_back_to_profile() {
        let ctx = PlantContext {
            max_temp_f: Some(f64::NAN),
            ..at("Lettuce", 98.0)
        };
        assert_eq!(
            HeatStressRule.evaluate(&ctx).map(|f| f.severity),
            Some(Severity::Critical)
        );
    }
}
