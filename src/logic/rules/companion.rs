use super::Rule;
use crate::models::{
    CompanionPlacement, CompanionRelationship, Finding, FindingCategory, MeasuredValue,
    PlantContext, Severity,
};

/// Antagonistic neighbours closer than this compete or suppress growth.
pub const ANTAGONIST_MIN_DISTANCE_FT: f64 = 3.0;
pub const ANTAGONIST_CRITICAL_DISTANCE_FT: f64 = 1.0;

/// Antagonistic companion rule - incompatible plant growing too close
///
/// Uses the nearest antagonistic neighbour reported by the companion-distance producer.
///
/// Severity levels:
/// - Warning: closer than 3 ft
/// - Critical: closer than 1 ft
pub struct AntagonisticCompanionRule;

impl AntagonisticCompanionRule {
    fn nearest_antagonist(ctx: &PlantContext) -> Option<&CompanionPlacement> {
        ctx.companions
            .iter()
            .filter(|c| c.relationship == CompanionRelationship::Antagonistic)
            .filter(|c| c.distance_ft.is_finite() && c.distance_ft >= 0.0)
            .min_by(|a, b| {
                a.distance_ft
                    .total_cmp(&b.distance_ft)
                    .then_with(|| a.name.cmp(&b.name))
            })
    }
}

impl Rule<PlantContext> for AntagonisticCompanionRule {
    fn code(&self) -> &'static str {
        "COMPANION.001"
    }

    fn name(&self) -> &'static str {
        "Antagonistic Neighbour"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::CompanionPlanting
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        Self::nearest_antagonist(ctx).is_some()
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let neighbour = Self::nearest_antagonist(ctx)?;
        let distance = neighbour.distance_ft;

        let severity = if distance < ANTAGONIST_CRITICAL_DISTANCE_FT {
            Severity::Critical
        } else if distance < ANTAGONIST_MIN_DISTANCE_FT {
            Severity::Warning
        } else {
            return None;
        };
        let confidence = match severity {
            Severity::Critical => 0.70,
            _ => 0.60,
        };
        let title = "Incompatible Neighbour Too Close";

        Some(
            Finding::new(self.code(), self.category(), severity, title)
                .with_confidence(confidence)
                .with_explanation(format!(
                    "{} is {:.1} ft from {}, a known poor companion.",
                    neighbour.name,
                    distance,
                    ctx.display_name()
                ))
                .with_mechanism(
                    "Some plants release allelopathic compounds from roots or leaf litter, share \
                     pests and diseases, or compete for the same nutrients and water at the same \
                     root depth. Effects fade with distance.",
                )
                .with_action(format!(
                    "Transplant or relocate {} at least {:.0} ft away, or add a barrier planting \
                     between them next season.",
                    neighbour.name, ANTAGONIST_MIN_DISTANCE_FT
                ))
                .with_measured(MeasuredValue::number(distance, "ft"))
                .with_optimal_range(format!("≥ {:.0} ft", ANTAGONIST_MIN_DISTANCE_FT))
                .with_reference(
                    "Cornell Cooperative Extension (2019). Companion planting fact sheet.",
                )
                .with_reference("Rice, E.L. (1984). Allelopathy, 2nd ed."),
        )
    }
}
