use super::Rule;
use crate::logic::calculations::{format_range, non_negative_reading, percent_reading};
use crate::models::{Drainage, Finding, FindingCategory, MeasuredValue, Severity, ZoneContext};

/// Air temperature (°F) at which the minimum watering interval shortens by a day.
pub const HOT_WEATHER_F: f64 = 90.0;
pub const HOT_WEATHER_INTERVAL_REDUCTION_DAYS: f64 = 1.0;

/// Interval below this fraction of the soil minimum is critically frequent.
pub const TOO_FREQUENT_CRITICAL_RATIO: f64 = 0.5;
/// Interval above this multiple of the soil maximum is critically infrequent.
pub const TOO_INFREQUENT_CRITICAL_RATIO: f64 = 2.0;

/// Frequent-shallow pattern: at least this many events a week...
pub const SHALLOW_MIN_EVENTS_7D: u32 = 5;
/// ...each shorter than this many minutes.
pub const SHALLOW_MAX_DURATION_MINUTES: f64 = 10.0;

/// "Recently watered" window for the low-moisture check.
pub const RECENT_WATERING_HOURS: f64 = 24.0;
pub const LOW_MOISTURE_WARNING_PERCENT: f64 = 20.0;
pub const LOW_MOISTURE_CRITICAL_PERCENT: f64 = 12.0;

const IRRIGATION_REFERENCE: &str = "Hanson, B. et al. (2000). Irrigation of agricultural crops: \
                                    soil water holding capacity and scheduling. UC ANR Pub. 3375.";

/// Watering interval band for the zone's primary soil, adjusted for hot weather.
fn interval_band(zone: &ZoneContext) -> Option<(f64, f64)> {
    let soil = zone.primary_soil()?;
    let (mut min, max) = soil.watering_interval_days();
    let hot = zone.temperature_f.filter(|t| t.is_finite() && *t >= HOT_WEATHER_F);
    if hot.is_some() {
        min = (min - HOT_WEATHER_INTERVAL_REDUCTION_DAYS).max(1.0);
    }
    Some((min, max))
}

fn valid_interval(zone: &ZoneContext) -> Option<f64> {
    zone.watering_interval_days.filter(|d| d.is_finite() && *d > 0.0)
}

/// Watering too frequent for the zone's soil
///
/// Severity levels:
/// - Warning: interval below the soil's minimum
/// - Critical: interval below half the minimum
pub struct WateringTooFrequentRule;

impl Rule<ZoneContext> for WateringTooFrequentRule {
    fn code(&self) -> &'static str {
        "IRRIGATION.001"
    }

    fn name(&self) -> &'static str {
        "Watering Too Frequent"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::IrrigationBehavior
    }

    fn is_applicable(&self, zone: &ZoneContext) -> bool {
        valid_interval(zone).is_some() && zone.primary_soil().is_some()
    }

    fn evaluate(&self, zone: &ZoneContext) -> Option<Finding> {
        let interval = valid_interval(zone)?;
        let soil = zone.primary_soil()?;
        let (min, max) = interval_band(zone)?;

        if interval >= min {
            return None;
        }

        let (severity, confidence) = if interval < min * TOO_FREQUENT_CRITICAL_RATIO {
            (Severity::Critical, 0.85)
        } else {
            (Severity::Warning, 0.70)
        };
        let title = "Zone Watered Too Often";

        Some(
            Finding::new(self.code(), self.category(), severity, title)
                .with_confidence(confidence)
                .with_explanation(format!(
                    "{} runs every {:.1} days. {} soil holds water long enough for a {:.0}-day \
                     minimum interval.",
                    zone.display_name(),
                    interval,
                    soil,
                    min
                ))
                .with_mechanism(
                    "Watering before the root zone drains keeps soil pores filled, cutting \
                     oxygen to roots and encouraging shallow rooting and crown rot. Nitrate \
                     leaches below the roots with each excess application.",
                )
                .with_action(format!(
                    "Lengthen the schedule to every {:.0}-{:.0} days and lengthen each run so \
                     the same weekly volume soaks deeper.",
                    min, max
                ))
                .with_measured(MeasuredValue::number(interval, "days"))
                .with_optimal_range(format!("{} days", format_range(min, max, 0)))
                .with_reference(IRRIGATION_REFERENCE),
        )
    }
}

/// Watering too infrequent for the zone's soil
///
/// Severity levels:
/// - Warning: interval above the soil's maximum
/// - Critical: interval above twice the maximum
pub struct WateringTooInfrequentRule;

impl Rule<ZoneContext> for WateringTooInfrequentRule {
    fn code(&self) -> &'static str {
        "IRRIGATION.002"
    }

    fn name(&self) -> &'static str {
        "Watering Too Infrequent"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::IrrigationBehavior
    }

    fn is_applicable(&self, zone: &ZoneContext) -> bool {
        valid_interval(zone).is_some() && zone.primary_soil().is_some()
    }

    fn evaluate(&self, zone: &ZoneContext) -> Option<Finding> {
        let interval = valid_interval(zone)?;
        let soil = zone.primary_soil()?;
        let (min, max) = interval_band(zone)?;

        if interval <= max {
            return None;
        }

        let (severity, confidence) = if interval > max * TOO_INFREQUENT_CRITICAL_RATIO {
            (Severity::Critical, 0.85)
        } else {
            (Severity::Warning, 0.70)
        };
        let title = "Zone Watered Too Rarely";

        Some(
            Finding::new(self.code(), self.category(), severity, title)
                .with_confidence(confidence)
                .with_explanation(format!(
                    "{} runs every {:.1} days, longer than {} soil can hold plant-available \
                     water ({:.0} days).",
                    zone.display_name(),
                    interval,
                    soil,
                    max
                ))
                .with_mechanism(
                    "Once plant-available water is used up, roots cannot replace transpiration \
                     losses. Plants cycle through wilting and recovery, which stunts growth and \
                     causes disorders like blossom-end rot and fruit cracking.",
                )
                .with_action(format!(
                    "Shorten the schedule to every {:.0}-{:.0} days, or add a moisture sensor \
                     to trigger watering on demand.",
                    min, max
                ))
                .with_measured(MeasuredValue::number(interval, "days"))
                .with_optimal_range(format!("{} days", format_range(min, max, 0)))
                .with_reference(IRRIGATION_REFERENCE),
        )
    }
}

/// Frequent, shallow watering - many short runs that never soak the root zone
pub struct ShallowFrequentWateringRule;

impl Rule<ZoneContext> for ShallowFrequentWateringRule {
    fn code(&self) -> &'static str {
        "IRRIGATION.003"
    }

    fn name(&self) -> &'static str {
        "Frequent Shallow Watering"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::IrrigationBehavior
    }

    fn is_applicable(&self, zone: &ZoneContext) -> bool {
        zone.events_last_7_days.is_some()
            && non_negative_reading(zone.avg_duration_minutes).is_some()
    }

    fn evaluate(&self, zone: &ZoneContext) -> Option<Finding> {
        let events = zone.events_last_7_days?;
        let duration = non_negative_reading(zone.avg_duration_minutes)?;

        if events < SHALLOW_MIN_EVENTS_7D || duration >= SHALLOW_MAX_DURATION_MINUTES {
            return None;
        }
        let title = "Short, Frequent Runs";

        Some(
            Finding::new(self.code(), self.category(), Severity::Warning, title)
                .with_confidence(0.75)
                .with_explanation(format!(
                    "{} ran {} times this week for about {:.0} minutes each.",
                    zone.display_name(),
                    events,
                    duration
                ))
                .with_mechanism(
                    "Short runs wet only the top inch or two of soil, which evaporates quickly. \
                     Roots concentrate near the surface where they dry out first in hot weather, \
                     and weed seeds in the moist surface germinate readily.",
                )
                .with_action(
                    "Combine runs: water 2-3 times a week for 20-30 minutes, or cycle-and-soak \
                     on slopes and clay to avoid runoff.",
                )
                .with_measured(MeasuredValue::number(duration, "min/run"))
                .with_optimal_range(format!(
                    "≥ {:.0} min/run",
                    SHALLOW_MAX_DURATION_MINUTES * 2.0
                ))
                .with_reference(IRRIGATION_REFERENCE)
                .with_reference("Weaver, J.E. (1926). Root Development of Field Crops."),
        )
    }
}

/// Mixed soil types sharing one valve
///
/// Severity levels:
/// - Info: soils differ but drain at compatible rates
/// - Warning: fast- and slow-draining soils on the same schedule
pub struct MixedSoilConflictRule;

impl Rule<ZoneContext> for MixedSoilConflictRule {
    fn code(&self) -> &'static str {
        "IRRIGATION.004"
    }

    fn name(&self) -> &'static str {
        "Mixed Soil Types in Zone"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::IrrigationBehavior
    }

    fn is_applicable(&self, zone: &ZoneContext) -> bool {
        !zone.soil_types.is_empty()
    }

    fn evaluate(&self, zone: &ZoneContext) -> Option<Finding> {
        let soils = zone.distinct_soils();
        if soils.len() < 2 {
            return None;
        }

        let classes = zone.drainage_classes();
        let title = "Soils Compete for One Schedule";
        let conflict = classes.contains(&Drainage::Fast) && classes.contains(&Drainage::Slow);
        let severity = if conflict {
            Severity::Warning
        } else {
            Severity::Info
        };

        let soil_list = soils
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Some(
            Finding::new(self.code(), self.category(), severity, title)
                .with_confidence(if conflict { 0.80 } else { 0.60 })
                .with_explanation(format!(
                    "{} waters plantings in {} soil on a single schedule.",
                    zone.display_name(),
                    soil_list
                ))
                .with_mechanism(
                    "Sandy soils drain in hours and need frequent watering; clays hold water for \
                     days. One schedule either drowns the clay beds or starves the sandy ones.",
                )
                .with_action(
                    "Split the zone by soil type, or amend the outlier beds with compost so they \
                     drain at a similar rate. Drip emitters with different flow rates can also \
                     balance one valve.",
                )
                .with_measured(MeasuredValue::text(soil_list))
                .with_optimal_range("one drainage class per zone")
                .with_reference(IRRIGATION_REFERENCE),
        )
    }
}

/// Low moisture despite recent watering - runoff, leaks or hydrophobic soil
///
/// Severity levels:
/// - Warning: below 20% within 24 h of watering
/// - Critical: below 12% within 24 h of watering
pub struct LowMoistureAfterWateringRule;

impl Rule<ZoneContext> for LowMoistureAfterWateringRule {
    fn code(&self) -> &'static str {
        "IRRIGATION.005"
    }

    fn name(&self) -> &'static str {
        "Low Moisture After Watering"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::IrrigationBehavior
    }

    fn is_applicable(&self, zone: &ZoneContext) -> bool {
        percent_reading(zone.soil_moisture_percent).is_some()
            && non_negative_reading(zone.hours_since_watering).is_some()
    }

    fn evaluate(&self, zone: &ZoneContext) -> Option<Finding> {
        let moisture = percent_reading(zone.soil_moisture_percent)?;
        let hours = non_negative_reading(zone.hours_since_watering)?;

        if !(0.0..=RECENT_WATERING_HOURS).contains(&hours) {
            return None;
        }

        let (severity, confidence) = if moisture < LOW_MOISTURE_CRITICAL_PERCENT {
            (Severity::Critical, 0.85)
        } else if moisture < LOW_MOISTURE_WARNING_PERCENT {
            (Severity::Warning, 0.70)
        } else {
            return None;
        };
        let title = "Water Not Reaching Roots";

        Some(
            Finding::new(self.code(), self.category(), severity, title)
                .with_confidence(confidence)
                .with_explanation(format!(
                    "{} was watered {:.0} hours ago but soil moisture is only {:.0}%.",
                    zone.display_name(),
                    hours,
                    moisture
                ))
                .with_mechanism(
                    "Water applied faster than the soil can absorb runs off, and dry organic or \
                     sandy soils can turn water-repellent. Clogged emitters, broken lines or low \
                     pressure also deliver far less than scheduled.",
                )
                .with_action(
                    "Inspect the zone while it runs for leaks, clogged or misaligned heads, and \
                     runoff. Break the run into shorter cycles and apply a soil wetting agent if \
                     water beads on the surface.",
                )
                .with_measured(MeasuredValue::number(moisture, "%"))
                .with_optimal_range(format!(
                    "≥ {:.0}% within {:.0} h of watering",
                    LOW_MOISTURE_WARNING_PERCENT, RECENT_WATERING_HOURS
                ))
                .with_reference(IRRIGATION_REFERENCE)
                .with_reference(
                    "Dekker, L.W. & Ritsema, C.J. (1994). How water moves in a water repellent \
                     sandy soil. Water Resour. Res. 30:2507-2517.",
                ),
        )
    }
}
