use super::Rule;
use crate::logic::calculations::percent_reading;
use crate::models::{
    Finding, FindingCategory, MeasuredValue, Severity, ShadeSource, SunExposure,
    SunExposureContext,
};

/// Winter shading percentage considered heavy.
pub const HEAVY_WINTER_SHADING_PERCENT: f64 = 60.0;

/// Percentage-point spread between seasons that counts as highly variable.
pub const SEASONAL_VARIABILITY_POINTS: f64 = 40.0;

/// A shade source reaches a plant up to this multiple of its mature height away.
/// Covers low winter sun angles at mid latitudes.
pub const SHADOW_REACH_RATIO: f64 = 2.0;

const SUN_REFERENCE: &str = "Taiz, L. & Zeiger, E. (2010). Plant Physiology, 5th ed., ch. 9.";

fn full_sun_plant(ctx: &SunExposureContext) -> bool {
    ctx.requirement() == Some(SunExposure::FullSun)
}

fn measured_shade_source(ctx: &SunExposureContext) -> Option<&ShadeSource> {
    ctx.shade_source.as_ref().filter(|s| {
        s.distance_ft.is_finite()
            && s.distance_ft >= 0.0
            && s.current_height_ft.is_finite()
            && s.mature_height_ft.is_finite()
    })
}

/// Full-sun plant growing in shade
pub struct FullSunInShadeRule;

impl Rule<SunExposureContext> for FullSunInShadeRule {
    fn code(&self) -> &'static str {
        "SUN.001"
    }

    fn name(&self) -> &'static str {
        "Full-Sun Plant in Shade"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::SunExposure
    }

    fn is_applicable(&self, ctx: &SunExposureContext) -> bool {
        full_sun_plant(ctx) && ctx.exposure.is_some()
    }

    fn evaluate(&self, ctx: &SunExposureContext) -> Option<Finding> {
        if ctx.exposure? != SunExposure::Shade {
            return None;
        }
        let title = "Sun Lover Planted in Shade";

        Some(
            Finding::new(self.code(), self.category(), Severity::Critical, title)
                .with_confidence(0.85)
                .with_explanation(format!(
                    "{} needs full sun (6+ hours of direct light) but this spot is in shade.",
                    ctx.display_name()
                ))
                .with_mechanism(
                    "Fruiting and flowering crops need high light to fix enough carbon for both \
                     growth and yield. In shade they stretch toward light, flower sparsely and \
                     stay damp longer, inviting disease.",
                )
                .with_action(
                    "Relocate the plant to a bed with at least 6 hours of direct sun, or replace \
                     it with a shade-tolerant crop such as lettuce, spinach or kale.",
                )
                .with_measured(MeasuredValue::text(SunExposure::Shade.as_str()))
                .with_optimal_range(SunExposure::FullSun.as_str())
                .with_reference(SUN_REFERENCE),
        )
    }
}

/// Full-sun plant growing in partial sun
pub struct FullSunInPartialSunRule;

impl Rule<SunExposureContext> for FullSunInPartialSunRule {
    fn code(&self) -> &'static str {
        "SUN.002"
    }

    fn name(&self) -> &'static str {
        "Full-Sun Plant in Partial Sun"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::SunExposure
    }

    fn is_applicable(&self, ctx: &SunExposureContext) -> bool {
        full_sun_plant(ctx) && ctx.exposure.is_some()
    }

    fn evaluate(&self, ctx: &SunExposureContext) -> Option<Finding> {
        if ctx.exposure? != SunExposure::PartialSun {
            return None;
        }
        let title = "Sun Lover in Partial Sun";

        Some(
            Finding::new(self.code(), self.category(), Severity::Warning, title)
                .with_confidence(0.70)
                .with_explanation(format!(
                    "{} prefers full sun but this spot only gets partial sun (3-6 hours).",
                    ctx.display_name()
                ))
                .with_mechanism(
                    "Yield of fruiting crops falls roughly in step with daily light. With a few \
                     hours short the plant grows but sets less fruit and ripens later.",
                )
                .with_action(
                    "Expect reduced yield. Prune nearby branches to open more sky, use reflective \
                     mulch, or move the plant to a sunnier bed next season.",
                )
                .with_measured(MeasuredValue::text(SunExposure::PartialSun.as_str()))
                .with_optimal_range(SunExposure::FullSun.as_str())
                .with_reference(SUN_REFERENCE),
        )
    }
}

/// Heavy shading in winter - low sun angle lengthens shadows
pub struct WinterShadingRule;

impl Rule<SunExposureContext> for WinterShadingRule {
    fn code(&self) -> &'static str {
        "SUN.003"
    }

    fn name(&self) -> &'static str {
        "Heavy Winter Shading"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::SunExposure
    }

    fn is_applicable(&self, ctx: &SunExposureContext) -> bool {
        percent_reading(ctx.seasonal_shading.winter).is_some()
    }

    fn evaluate(&self, ctx: &SunExposureContext) -> Option<Finding> {
        let winter = percent_reading(ctx.seasonal_shading.winter)?;
        if winter < HEAVY_WINTER_SHADING_PERCENT {
            return None;
        }
        let title = "Heavily Shaded in Winter";

        Some(
            Finding::new(self.code(), self.category(), Severity::Info, title)
                .with_confidence(0.75)
                .with_explanation(format!(
                    "{}'s spot is {:.0}% shaded in winter.",
                    ctx.display_name(),
                    winter
                ))
                .with_mechanism(
                    "The winter sun sits low, so trees and buildings cast shadows two to three \
                     times their height. Beds that are sunny in summer can lose most of their \
                     direct light from November to February.",
                )
                .with_action(
                    "Plan cool-season crops for a sunnier bed, or grow shade-tolerant greens here \
                     over winter. Cold frames facing the open sky help.",
                )
                .with_measured(MeasuredValue::number(winter, "% shade"))
                .with_optimal_range(format!("< {:.0}% shade", HEAVY_WINTER_SHADING_PERCENT))
                .with_reference(SUN_REFERENCE),
        )
    }
}

/// Seasonal variability - exposure changes sharply through the year
pub struct SeasonalVariabilityRule;

impl Rule<SunExposureContext> for SeasonalVariabilityRule {
    fn code(&self) -> &'static str {
        "SUN.004"
    }

    fn name(&self) -> &'static str {
        "High Seasonal Variability"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::SunExposure
    }

    fn is_applicable(&self, ctx: &SunExposureContext) -> bool {
        ctx.seasonal_shading.is_valid() && ctx.seasonal_shading.spread().is_some()
    }

    fn evaluate(&self, ctx: &SunExposureContext) -> Option<Finding> {
        let spread = ctx.seasonal_shading.spread()?;
        if spread < SEASONAL_VARIABILITY_POINTS {
            return None;
        }
        let title = "Light Changes With the Seasons";

        Some(
            Finding::new(self.code(), self.category(), Severity::Warning, title)
                .with_confidence(0.70)
                .with_explanation(format!(
                    "Shading at {}'s spot varies by {:.0} percentage points across the year.",
                    ctx.display_name(),
                    spread
                ))
                .with_mechanism(
                    "Deciduous canopy and the changing sun angle shift the light budget from \
                     season to season. A crop suited to the bright season may fail in the dim \
                     one.",
                )
                .with_action(
                    "Match crops to the season's light: sun-loving crops when shading is lowest, \
                     leafy greens when it is highest.",
                )
                .with_measured(MeasuredValue::number(spread, "points"))
                .with_optimal_range(format!("< {:.0} points", SEASONAL_VARIABILITY_POINTS))
                .with_reference(SUN_REFERENCE),
        )
    }
}

/// Shade source that will shade the plant more as it grows
///
/// Applies when the source sits on the sun-facing side, has not reached mature
/// height, and its mature shadow reaches the plant.
pub struct GrowingShadeSourceRule;

impl Rule<SunExposureContext> for GrowingShadeSourceRule {
    fn code(&self) -> &'static str {
        "SUN.005"
    }

    fn name(&self) -> &'static str {
        "Growing Shade Source"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::SunExposure
    }

    fn is_applicable(&self, ctx: &SunExposureContext) -> bool {
        measured_shade_source(ctx).is_some()
    }

    fn evaluate(&self, ctx: &SunExposureContext) -> Option<Finding> {
        let source = measured_shade_source(ctx)?;
        let remaining = source.remaining_growth_ft();
        let reach = source.mature_height_ft * SHADOW_REACH_RATIO;

        if !source.bearing.faces_sun(ctx.hemisphere)
            || remaining <= 0.0
            || source.distance_ft > reach
        {
            return None;
        }
        let title = "Shade Will Increase";

        Some(
            Finding::new(self.code(), self.category(), Severity::Warning, title)
                .with_confidence(0.65)
                .with_explanation(format!(
                    "{} stands {:.0} ft to the {} of {} and has about {:.0} ft still to grow.",
                    source.name,
                    source.distance_ft,
                    source.bearing.as_str(),
                    ctx.display_name(),
                    remaining
                ))
                .with_mechanism(
                    "A source between the plant and the midday sun lengthens its shadow as it \
                     grows. At mature height its winter shadow will cover this spot for more of \
                     the day each year.",
                )
                .with_action(format!(
                    "Plan for less light here over the next few seasons. Prune or limb up {}, or \
                     site long-lived sun-loving plants elsewhere.",
                    source.name
                ))
                .with_measured(MeasuredValue::number(source.distance_ft, "ft"))
                .with_optimal_range(format!("> {:.0} ft", reach))
                .with_reference(SUN_REFERENCE),
        )
    }
}
