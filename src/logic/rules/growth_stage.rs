use super::Rule;
use crate::models::{Finding, FindingCategory, MeasuredValue, PlantContext, Severity};

/// Days either side of the expected harvest day that count as the harvest window.
pub const HARVEST_WINDOW_TOLERANCE_DAYS: u32 = 7;

fn harvest_timing(ctx: &PlantContext) -> Option<(u32, u32)> {
    let days = ctx.days_since_planting?;
    let expected = ctx.profile().days_to_harvest?;
    Some((days, expected))
}

fn harvest_range(expected: u32) -> String {
    format!(
        "day {}–{}",
        expected.saturating_sub(HARVEST_WINDOW_TOLERANCE_DAYS),
        expected + HARVEST_WINDOW_TOLERANCE_DAYS
    )
}

/// Harvest window rule - planting is within ±7 days of expected days-to-harvest
pub struct HarvestWindowRule;

impl Rule<PlantContext> for HarvestWindowRule {
    fn code(&self) -> &'static str {
        "GROWTH.001"
    }

    fn name(&self) -> &'static str {
        "Harvest Window"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::GrowthStage
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        harvest_timing(ctx).is_some()
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let (days, expected) = harvest_timing(ctx)?;

        if days.abs_diff(expected) > HARVEST_WINDOW_TOLERANCE_DAYS {
            return None;
        }

        let timing = if days < expected {
            format!("expected in about {} days", expected - days)
        } else if days == expected {
            "expected today".to_string()
        } else {
            format!("{} days past the typical date", days - expected)
        };

        let title = "Harvest Window Open";

        Some(
            Finding::new(self.code(), self.category(), Severity::Info, title)
                .with_confidence(0.70)
                .with_explanation(format!(
                    "{} was planted {} days ago; harvest is {}.",
                    ctx.display_name(),
                    days,
                    timing
                ))
                .with_mechanism(
                    "Days-to-harvest is a cultivar average. Weather and variety shift maturity by \
                     about a week, so ripeness should be checked directly.",
                )
                .with_action(
                    "Check fruit colour, firmness and size every other day and pick at peak.",
                )
                .with_measured(MeasuredValue::number(days as f64, "days"))
                .with_optimal_range(harvest_range(expected))
                .with_reference(
                    "Maynard, D.N. & Hochmuth, G.J. (2007). Knott's Handbook for Vegetable \
                     Growers, 5th ed.",
                ),
        )
    }
}

/// Harvest overdue rule - planting is past the harvest window
pub struct HarvestOverdueRule;

impl Rule<PlantContext> for HarvestOverdueRule {
    fn code(&self) -> &'static str {
        "GROWTH.002"
    }

    fn name(&self) -> &'static str {
        "Harvest Overdue"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::GrowthStage
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        harvest_timing(ctx).is_some()
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let (days, expected) = harvest_timing(ctx)?;
        let overdue = days.checked_sub(expected + HARVEST_WINDOW_TOLERANCE_DAYS)?;
        if overdue == 0 {
            return None;
        }

        Some(
            Finding::new(self.code(), self.category(), Severity::Warning, self.name())
                .with_confidence(0.65)
                .with_explanation(format!(
                    "{} was planted {} days ago, {} days beyond the end of its usual harvest \
                     window.",
                    ctx.display_name(),
                    days,
                    overdue
                ))
                .with_mechanism(
                    "Past maturity, sugars convert to starch or fibre, fruit splits and leafy \
                     crops bolt and turn bitter. Unpicked produce also signals the plant to stop \
                     setting new fruit.",
                )
                .with_action("Harvest remaining produce now and pull spent plants to free the bed.")
                .with_measured(MeasuredValue::number(days as f64, "days"))
                .with_optimal_range(harvest_range(expected))
                .with_reference(
                    "Maynard, D.N. & Hochmuth, G.J. (2007). Knott's Handbook for Vegetable \
                     Growers, 5th ed.",
                ),
        )
    }
}
