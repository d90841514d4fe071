use super::Rule;
use crate::models::{Finding, FindingCategory, MeasuredValue, PlantContext, Severity};

pub const HUMIDITY_ELEVATED_PERCENT: f64 = 80.0;
pub const HUMIDITY_SATURATED_PERCENT: f64 = 90.0;
/// Temperature band (°F) in which most foliar fungi sporulate fastest.
pub const FUNGAL_TEMP_MIN_F: f64 = 60.0;
pub const FUNGAL_TEMP_MAX_F: f64 = 85.0;
/// Watering more than once a day on average keeps foliage wet.
pub const FUNGAL_FREQUENT_EVENTS_7D: u32 = 7;

/// Risk points needed for each severity.
pub const FUNGAL_RISK_INFO_POINTS: u32 = 2;
pub const FUNGAL_RISK_WARNING_POINTS: u32 = 3;
pub const FUNGAL_RISK_CRITICAL_POINTS: u32 = 4;
pub const FUNGAL_RISK_MAX_POINTS: u32 = 5;

/// Fungal disease risk rule - humid, mild conditions favour foliar disease
///
/// Target diseases: powdery and downy mildew, early blight, botrytis grey mould.
///
/// Risk factors (one point each unless noted):
/// - Humidity ≥80% (two points at ≥90%)
/// - Temperature 60-85°F
/// - Soil moisture above the plant's saturation level
/// - Watered more than once a day on average
///
/// Severity levels:
/// - Info: 2 points
/// - Warning: 3 points
/// - Critical: 4+ points
pub struct FungalDiseaseRiskRule;

impl FungalDiseaseRiskRule {
    fn risk_score(ctx: &PlantContext) -> u32 {
        let mut risk = 0;

        if let Some(humidity) = ctx.humidity() {
            if humidity >= HUMIDITY_SATURATED_PERCENT {
                risk += 2;
            } else if humidity >= HUMIDITY_ELEVATED_PERCENT {
                risk += 1;
            }
        }

        if let Some(temp) = ctx.temperature() {
            if (FUNGAL_TEMP_MIN_F..=FUNGAL_TEMP_MAX_F).contains(&temp) {
                risk += 1;
            }
        }

        if let Some(moisture) = ctx.moisture() {
            if moisture > ctx.profile().moisture_saturation_percent {
                risk += 1;
            }
        }

        if let Some(events) = ctx.irrigation_events_7d {
            if events > FUNGAL_FREQUENT_EVENTS_7D {
                risk += 1;
            }
        }

        risk
    }
}

impl Rule<PlantContext> for FungalDiseaseRiskRule {
    fn code(&self) -> &'static str {
        "DISEASE.001"
    }

    fn name(&self) -> &'static str {
        "Fungal Disease Risk"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::DiseaseRisk
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        ctx.humidity().is_some()
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let humidity = ctx.humidity()?;
        // Without high humidity the remaining factors do not sustain infection.
        if humidity < HUMIDITY_ELEVATED_PERCENT {
            return None;
        }

        let risk = Self::risk_score(ctx);
        let severity = if risk >= FUNGAL_RISK_CRITICAL_POINTS {
            Severity::Critical
        } else if risk >= FUNGAL_RISK_WARNING_POINTS {
            Severity::Warning
        } else if risk >= FUNGAL_RISK_INFO_POINTS {
            Severity::Info
        } else {
            return None;
        };
        let confidence = 0.50 + 0.08 * risk.min(FUNGAL_RISK_MAX_POINTS) as f64;

        let action = match severity {
            Severity::Critical => {
                "Remove infected leaves now, water only at the base in early morning, and \
                 apply a preventive fungicide (copper or sulfur for organic growing). Increase \
                 spacing or prune for airflow."
            }
            Severity::Warning => {
                "Switch to morning watering at soil level, thin dense foliage, and inspect \
                 lower leaves every few days for spots or powdery growth."
            }
            _ => "Keep foliage dry and monitor lower leaves for early symptoms.",
        };

        let title = "Fungal Disease Conditions";
        let finding = Finding::new(self.code(), self.category(), severity, title)
            .with_confidence(confidence)
            .with_explanation(format!(
                "Relative humidity is {:.0}% with {} of {} disease risk points present.",
                humidity, risk, FUNGAL_RISK_MAX_POINTS
            ))
            .with_mechanism(
                "Fungal spores need a film of water or near-saturated air to germinate, and \
                 most foliar pathogens grow fastest between 60 and 85°F. Long leaf-wetness \
                 periods let germ tubes penetrate stomata before the surface dries.",
            )
            .with_action(action)
            .with_measured(MeasuredValue::number(humidity, "% RH"))
            .with_optimal_range(format!("< {:.0}% RH", HUMIDITY_ELEVATED_PERCENT))
            .with_reference("Agrios, G.N. (2005). Plant Pathology, 5th ed., ch. 11.")
            .with_reference(
                "Huber, L. & Gillespie, T.J. (1992). Modeling leaf wetness in relation to plant \
                 disease epidemiology. Annu. Rev. Phytopathol. 30:553-577.",
            );

        Some(finding)
    }
}
