use super::Rule;
use crate::logic::calculations::estimated_light_hours;
use crate::models::{Finding, FindingCategory, GardenKind, MeasuredValue, PlantContext, Severity};

/// Hours short of the plant minimum at which light deficit becomes critical.
pub const LIGHT_CRITICAL_DEFICIT_HOURS: f64 = 3.0;

/// Artificial photoperiod limits for indoor and hydroponic growing.
pub const ARTIFICIAL_LIGHT_WARNING_HOURS: f64 = 18.0;
pub const ARTIFICIAL_LIGHT_CRITICAL_HOURS: f64 = 22.0;

/// Insufficient light rule - etiolation risk
///
/// Uses the measured light hours. For outdoor beds without a light reading the
/// hours are estimated from the shading percentage, at lower confidence.
///
/// Severity levels:
/// - Warning: below the plant's minimum hours
/// - Critical: 3 or more hours short
pub struct InsufficientLightRule;

impl InsufficientLightRule {
    /// Light hours and whether they were measured directly.
    ///
    /// A malformed light reading is not replaced by the shading estimate.
    fn light_hours(ctx: &PlantContext) -> Option<(f64, bool)> {
        if ctx.light_hours.is_some() {
            return ctx.daily_light_hours().map(|hours| (hours, true));
        }
        if ctx.garden_kind != GardenKind::Outdoor {
            return None;
        }
        ctx.shading().map(|s| (estimated_light_hours(s), false))
    }
}

impl Rule<PlantContext> for InsufficientLightRule {
    fn code(&self) -> &'static str {
        "LIGHT.001"
    }

    fn name(&self) -> &'static str {
        "Insufficient Light"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::LightStress
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        Self::light_hours(ctx).is_some()
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let (hours, measured) = Self::light_hours(ctx)?;
        let required = ctx.profile().min_light_hours;

        if hours >= required {
            return None;
        }

        let deficit = required - hours;
        let severity = if deficit >= LIGHT_CRITICAL_DEFICIT_HOURS {
            Severity::Critical
        } else {
            Severity::Warning
        };
        let confidence = match (severity, measured) {
            (Severity::Critical, true) => 0.90,
            (_, true) => 0.75,
            (Severity::Critical, false) => 0.60,
            _ => 0.50,
        };

        let source = if measured {
            format!(
                "{} receives {:.1} hours of light per day",
                ctx.display_name(),
                hours
            )
        } else {
            format!(
                "At {:.0}% shading, {} receives an estimated {:.1} hours of direct light per day",
                ctx.shading().unwrap_or_default(),
                ctx.display_name(),
                hours
            )
        };

        Some(
            Finding::new(self.code(), self.category(), severity, "Not Enough Light")
                .with_confidence(confidence)
                .with_explanation(format!(
                    "{}, short of the {:.0} hours it needs.",
                    source, required
                ))
                .with_mechanism(
                    "Below its light compensation needs, the plant cannot fix enough carbon to \
                     grow and flower. Phytochrome signalling triggers shade avoidance: stems \
                     stretch, internodes lengthen and leaves pale (etiolation), leaving weak, \
                     leggy growth with little fruit.",
                )
                .with_action(match ctx.garden_kind {
                    GardenKind::Outdoor => {
                        "Move containers to a sunnier spot, prune overhanging branches, or \
                         choose a shade-tolerant crop for this bed."
                    }
                    _ => {
                        "Add or lower grow lights and extend the photoperiod toward the plant's \
                         requirement."
                    }
                })
                .with_measured(MeasuredValue::number(hours, "h/day"))
                .with_optimal_range(format!("≥ {:.0} h/day", required))
                .with_reference(
                    "Smith, H. (1982). Light quality, photoperception, and plant strategy. Annu. \
                     Rev. Plant Physiol. 33:481-518.",
                )
                .with_reference("Taiz, L. & Zeiger, E. (2010). Plant Physiology, 5th ed., ch. 9."),
        )
    }
}

/// Excessive artificial light - photoperiod too long under grow lights
///
/// Only indoor and hydroponic gardens.
///
/// Severity levels:
/// - Warning: more than 18 h/day
/// - Critical: 22 h/day or more
pub struct ExcessiveArtificialLightRule;

impl Rule<PlantContext> for ExcessiveArtificialLightRule {
    fn code(&self) -> &'static str {
        "LIGHT.002"
    }

    fn name(&self) -> &'static str {
        "Excessive Artificial Light"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::LightStress
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        (ctx.is_indoor() || ctx.is_hydroponic()) && ctx.daily_light_hours().is_some()
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let hours = ctx.daily_light_hours()?;

        let severity = if hours >= ARTIFICIAL_LIGHT_CRITICAL_HOURS {
            Severity::Critical
        } else if hours > ARTIFICIAL_LIGHT_WARNING_HOURS {
            Severity::Warning
        } else {
            return None;
        };
        let confidence = match severity {
            Severity::Critical => 0.85,
            _ => 0.70,
        };
        let title = "Photoperiod Too Long";

        Some(
            Finding::new(self.code(), self.category(), severity, title)
                .with_confidence(confidence)
                .with_explanation(format!(
                    "Grow lights run {:.1} hours per day for {}.",
                    hours,
                    ctx.display_name()
                ))
                .with_mechanism(
                    "Plants need a dark period to repair photosystem II and balance carbohydrate \
                     export. Near-continuous light causes photo-oxidative damage, leaf \
                     chlorosis and, in day-length sensitive crops, premature bolting.",
                )
                .with_action(
                    "Set the light timer to 14-16 hours and give at least 6 hours of darkness.",
                )
                .with_measured(MeasuredValue::number(hours, "h/day"))
                .with_optimal_range(format!("≤ {:.0} h/day", ARTIFICIAL_LIGHT_WARNING_HOURS))
                .with_reference(
                    "Velez-Ramirez, A.I. et al. (2011). Plants under continuous light. Trends \
                     Plant Sci. 16:310-318.",
                ),
        )
    }
}
