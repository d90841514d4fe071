use super::Rule;
use crate::logic::calculations::{format_range, non_negative_reading, scaled_confidence};
use crate::models::{Finding, FindingCategory, MeasuredValue, PlantContext, Severity};

/// pH band used for hydroponic nutrient solutions, regardless of crop.
pub const HYDROPONIC_PH_MIN: f64 = 5.5;
pub const HYDROPONIC_PH_MAX: f64 = 6.5;
/// Deviation from the optimal band (pH units) beyond which imbalance is critical.
pub const PH_CRITICAL_DEVIATION: f64 = 1.0;

/// Soil-solution EC (dS/m) thresholds.
pub const SALINITY_WARNING_DS_M: f64 = 2.0;
pub const SALINITY_CRITICAL_DS_M: f64 = 4.0;

/// Organic matter % thresholds.
pub const ORGANIC_MATTER_LOW_PERCENT: f64 = 3.0;
pub const ORGANIC_MATTER_DEPLETED_PERCENT: f64 = 1.0;

/// Macro-nutrient sufficiency thresholds in ppm.
pub const NITROGEN_CRITICAL_PPM: f64 = 10.0;
pub const NITROGEN_WARNING_PPM: f64 = 20.0;
pub const PHOSPHORUS_CRITICAL_PPM: f64 = 10.0;
pub const PHOSPHORUS_WARNING_PPM: f64 = 25.0;
pub const POTASSIUM_CRITICAL_PPM: f64 = 60.0;
pub const POTASSIUM_WARNING_PPM: f64 = 120.0;

const TRUOG_REFERENCE: &str = "Truog, E. (1946). Soil reaction influence on availability of \
                              plant nutrients. SSSA Proc. 11:305-308.";

/// Soil pH rule - plant-specific optimal band with a generic 6.0–7.0 fallback
///
/// Hydroponic systems use a 5.5–6.5 solution band instead.
///
/// Severity levels:
/// - Info: within band (reported as optimal, not triggered)
/// - Warning: up to 1.0 pH unit outside the band
/// - Critical: more than 1.0 pH unit outside the band
pub struct SoilPhRule;

impl SoilPhRule {
    fn band(ctx: &PlantContext) -> (f64, f64) {
        if ctx.is_hydroponic() {
            (HYDROPONIC_PH_MIN, HYDROPONIC_PH_MAX)
        } else {
            let profile = ctx.profile();
            (profile.ph_min, profile.ph_max)
        }
    }
}

impl Rule<PlantContext> for SoilPhRule {
    fn code(&self) -> &'static str {
        "SOIL.001"
    }

    fn name(&self) -> &'static str {
        "Soil pH Imbalance"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::SoilChemistry
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        ctx.ph().is_some()
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let ph = ctx.ph()?;
        let (low, high) = Self::band(ctx);
        let range = format_range(low, high, 1);
        // Generic bands are less certain than crop-specific ones.
        let specificity = if ctx.profile().is_generic() && !ctx.is_hydroponic() {
            -0.10
        } else {
            0.0
        };

        if (low..=high).contains(&ph) {
            return Some(
                Finding::optimal(self.code(), self.category(), "Soil pH Optimal")
                    .with_confidence(0.85 + specificity)
                    .with_explanation(format!(
                        "pH {:.1} is within the {} band for {}.",
                        ph,
                        range,
                        ctx.display_name()
                    ))
                    .with_mechanism(
                        "Macro- and micronutrients are near peak solubility in this band.",
                    )
                    .with_action("No action needed. Retest each season.")
                    .with_measured(MeasuredValue::number(ph, "pH"))
                    .with_optimal_range(range)
                    .with_reference(TRUOG_REFERENCE),
            );
        }

        let acidic = ph < low;
        let deviation = if acidic { low - ph } else { ph - high };

        let (severity, confidence) = if deviation > PH_CRITICAL_DEVIATION {
            let confidence = scaled_confidence(0.85, 0.95, deviation, 2.0);
            (Severity::Critical, confidence)
        } else {
            let confidence = scaled_confidence(0.70, 0.85, deviation, PH_CRITICAL_DEVIATION);
            (Severity::Warning, confidence)
        };

        let (title, mechanism, action) = if acidic {
            (
                "Soil Too Acidic",
                "Below the optimal band, aluminium and manganese become soluble at toxic levels \
                 while phosphorus binds to iron and aluminium. Calcium and magnesium leach, and \
                 nitrifying bacteria slow, so nitrogen supply falls.",
                "Apply garden lime (calcium carbonate) at soil-test rates, or dolomitic lime if \
                 magnesium is also low. Work it in and retest after 2-3 months.",
            )
        } else {
            (
                "Soil Too Alkaline",
                "Above the optimal band, iron, manganese, zinc and phosphorus precipitate into \
                 insoluble forms. Interveinal chlorosis on young leaves is the typical symptom \
                 of this induced deficiency.",
                "Incorporate elemental sulfur or acidifying organic matter such as pine needles \
                 or peat. Use ammonium-based fertilizers and retest after 2-3 months.",
            )
        };

        Some(
            Finding::new(self.code(), self.category(), severity, title)
                .with_confidence(confidence + specificity)
                .with_explanation(format!(
                    "Soil pH is {:.1}, {:.1} units {} the {} band for {}.",
                    ph,
                    deviation,
                    if acidic { "below" } else { "above" },
                    range,
                    ctx.display_name()
                ))
                .with_mechanism(mechanism)
                .with_action(action)
                .with_measured(MeasuredValue::number(ph, "pH"))
                .with_optimal_range(range)
                .with_reference(TRUOG_REFERENCE)
                .with_reference(
                    "Brady, N.C. & Weil, R.R. (2016). The Nature and Properties of Soils, 15th \
                     ed., ch. 9.",
                ),
        )
    }
}

/// Salinity rule - soil solution EC high enough to cause osmotic stress
///
/// Severity levels:
/// - Warning: EC above 2.0 dS/m
/// - Critical: EC above 4.0 dS/m
pub struct SalinityRule;

impl Rule<PlantContext> for SalinityRule {
    fn code(&self) -> &'static str {
        "SOIL.002"
    }

    fn name(&self) -> &'static str {
        "Salinity Stress"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::SoilChemistry
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        ctx.salinity().is_some()
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let ec = ctx.salinity()?;

        let severity = if ec > SALINITY_CRITICAL_DS_M {
            Severity::Critical
        } else if ec > SALINITY_WARNING_DS_M {
            Severity::Warning
        } else {
            return None;
        };
        let confidence = scaled_confidence(0.70, 0.92, ec - SALINITY_WARNING_DS_M, 4.0);

        Some(
            Finding::new(self.code(), self.category(), severity, "Salt Stress")
                .with_confidence(confidence)
                .with_explanation(format!(
                    "Soil electrical conductivity is {:.1} dS/m. Most vegetables lose yield above \
                     {:.1} dS/m.",
                    ec, SALINITY_WARNING_DS_M
                ))
                .with_mechanism(
                    "Dissolved salts lower the osmotic potential of the soil solution, so roots \
                     must work harder to draw water in. Sodium and chloride accumulate in leaves \
                     and cause marginal burn. Symptoms mimic drought even in moist soil.",
                )
                .with_action(
                    "Leach the root zone with a deep, slow watering of low-salt water. Stop \
                     adding manure or high-salt fertilizers until EC falls below 2 dS/m.",
                )
                .with_measured(MeasuredValue::number(ec, "dS/m"))
                .with_optimal_range(format!("< {:.1} dS/m", SALINITY_WARNING_DS_M))
                .with_reference(
                    "Maas, E.V. & Hoffman, G.J. (1977). Crop salt tolerance - current \
                     assessment. J. Irrig. Drain. Div. 103:115-134.",
                ),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
}

impl Nutrient {
    pub fn as_str(&self) -> &'static str {
        match self {
            Nutrient::Nitrogen => "Nitrogen",
            Nutrient::Phosphorus => "Phosphorus",
            Nutrient::Potassium => "Potassium",
        }
    }

    /// (critical, warning) thresholds in ppm.
    pub fn thresholds_ppm(&self) -> (f64, f64) {
        match self {
            Nutrient::Nitrogen => (NITROGEN_CRITICAL_PPM, NITROGEN_WARNING_PPM),
            Nutrient::Phosphorus => (PHOSPHORUS_CRITICAL_PPM, PHOSPHORUS_WARNING_PPM),
            Nutrient::Potassium => (POTASSIUM_CRITICAL_PPM, POTASSIUM_WARNING_PPM),
        }
    }

    /// Measured ppm, discarding non-finite or negative values.
    fn reading(&self, ctx: &PlantContext) -> Option<f64> {
        let ppm = match self {
            Nutrient::Nitrogen => ctx.nitrogen_ppm,
            Nutrient::Phosphorus => ctx.phosphorus_ppm,
            Nutrient::Potassium => ctx.potassium_ppm,
        };
        non_negative_reading(ppm)
    }

    fn symptoms(&self) -> &'static str {
        match self {
            Nutrient::Nitrogen => {
                "Nitrogen is a building block of chlorophyll and amino acids. When short, the \
                 plant remobilises it from older leaves, which yellow from the bottom up while \
                 growth slows."
            }
            Nutrient::Phosphorus => {
                "Phosphorus drives ATP energy transfer and root development. Deficient plants \
                 are stunted with dark or purplish older leaves and poor flowering."
            }
            Nutrient::Potassium => {
                "Potassium regulates stomata and osmotic balance. Shortage shows as scorched \
                 leaf margins on older leaves, weak stems and poor fruit quality."
            }
        }
    }

    fn remedy(&self) -> &'static str {
        match self {
            Nutrient::Nitrogen => {
                "Side-dress with a nitrogen source such as blood meal, composted manure or a \
                 balanced fertilizer at label rate."
            }
            Nutrient::Phosphorus => {
                "Work bone meal or rock phosphate into the root zone. Keep pH near neutral so \
                 applied phosphorus stays available."
            }
            Nutrient::Potassium => {
                "Apply sulfate of potash or wood ash (if pH allows) and mulch with compost."
            }
        }
    }
}

/// Macro-nutrient deficiency - one instance per nutrient
///
/// Not applied to hydroponic solutions, which are managed on different bands.
///
/// Severity levels:
/// - Warning: below the nutrient's warning ppm
/// - Critical: below the nutrient's critical ppm
pub struct NutrientDeficiencyRule {
    nutrient: Nutrient,
}

impl NutrientDeficiencyRule {
    pub fn new(nutrient: Nutrient) -> Self {
        Self { nutrient }
    }
}

impl Rule<PlantContext> for NutrientDeficiencyRule {
    fn code(&self) -> &'static str {
        match self.nutrient {
            Nutrient::Nitrogen => "SOIL.003",
            Nutrient::Phosphorus => "SOIL.004",
            Nutrient::Potassium => "SOIL.005",
        }
    }

    fn name(&self) -> &'static str {
        match self.nutrient {
            Nutrient::Nitrogen => "Nitrogen Deficiency",
            Nutrient::Phosphorus => "Phosphorus Deficiency",
            Nutrient::Potassium => "Potassium Deficiency",
        }
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::SoilChemistry
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        ctx.has_soil() && self.nutrient.reading(ctx).is_some()
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let ppm = self.nutrient.reading(ctx)?;
        let (critical, warning) = self.nutrient.thresholds_ppm();

        let severity = if ppm < critical {
            Severity::Critical
        } else if ppm < warning {
            Severity::Warning
        } else {
            return None;
        };
        let confidence = scaled_confidence(0.65, 0.85, warning - ppm, warning);

        Some(
            Finding::new(self.code(), self.category(), severity, self.name())
                .with_confidence(confidence)
                .with_explanation(format!(
                    "{} measures {:.0} ppm, below the {:.0} ppm sufficiency level.",
                    self.nutrient.as_str(),
                    ppm,
                    warning
                ))
                .with_mechanism(self.nutrient.symptoms())
                .with_action(self.nutrient.remedy())
                .with_measured(MeasuredValue::number(ppm, "ppm"))
                .with_optimal_range(format!("≥ {:.0} ppm", warning))
                .with_reference(
                    "Marschner, P. (2012). Marschner's Mineral Nutrition of Higher Plants, 3rd ed.",
                )
                .with_reference("Penn State Extension (2020). Interpreting soil test results."),
        )
    }
}

/// Organic matter rule - low soil organic matter
///
/// Severity levels:
/// - Info: below 3%
/// - Warning: below 1%
pub struct OrganicMatterRule;

impl Rule<PlantContext> for OrganicMatterRule {
    fn code(&self) -> &'static str {
        "SOIL.006"
    }

    fn name(&self) -> &'static str {
        "Low Organic Matter"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::SoilChemistry
    }

    fn is_applicable(&self, ctx: &PlantContext) -> bool {
        ctx.has_soil() && ctx.organic_matter().is_some()
    }

    fn evaluate(&self, ctx: &PlantContext) -> Option<Finding> {
        let om = ctx.organic_matter()?;

        let severity = if om < ORGANIC_MATTER_DEPLETED_PERCENT {
            Severity::Warning
        } else if om < ORGANIC_MATTER_LOW_PERCENT {
            Severity::Info
        } else {
            return None;
        };

        let title = "Low Soil Organic Matter";

        Some(
            Finding::new(self.code(), self.category(), severity, title)
                .with_confidence(0.70)
                .with_explanation(format!(
                    "Organic matter is {:.1}%. Productive garden soils usually hold 3-5%.",
                    om
                ))
                .with_mechanism(
                    "Organic matter holds water and cations, feeds soil biology and binds \
                     particles into aggregates. Depleted soils crust, drain poorly and release \
                     nutrients unevenly.",
                )
                .with_action(
                    "Top-dress with 1-2 inches of compost each season and keep soil covered with \
                     mulch.",
                )
                .with_measured(MeasuredValue::number(om, "%"))
                .with_optimal_range("3–5%")
                .with_reference(
                    "Brady, N.C. & Weil, R.R. (2016). The Nature and Properties of Soils, 15th \
                     ed., ch. 11.",
                ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GardenKind;

    fn with_ph(plant: &str, ph: f64) -> PlantContext {
        PlantContext {
            soil_ph: Some(ph),
            ..PlantContext::for_plant(plant)
        }
    }

    #[test]
    fn tomato_ph_warning() {
        let finding = SoilPhRule.evaluate(&with_ph("Tomato", 5.5)).unwrap();
        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.measured_value.as_number(), Some(5.5));
        assert_eq!(finding.optimal_range, "6.0–6.8");
        assert!(finding.triggered);
    }

    #[test]
    fn ph_far_outside_band_is_critical() {
        let finding = SoilPhRule.evaluate(&with_ph("Blueberry", 7.2)).unwrap();
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.title, "Soil Too Alkaline");
    }

    #[test]
    fn ph_in_band_reports_optimal() {
        let finding = SoilPhRule.evaluate(&with_ph("Tomato", 6.4)).unwrap();
        assert_eq!(finding.severity, Severity::Info);
        assert!(!finding.triggered);
    }

    #[test]
    fn unknown_plant_uses_generic_band_with_lower_confidence() {
        let generic = SoilPhRule.evaluate(&with_ph("triffid", 5.5)).unwrap();
        assert_eq!(generic.optimal_range, "6.0–7.0");
        let specific = SoilPhRule.evaluate(&with_ph("Tomato", 5.5)).unwrap();
        assert!(generic.confidence < specific.confidence);
    }

    #[test]
    fn hydroponic_uses_solution_band() {
        let ctx = PlantContext {
            garden_kind: GardenKind::Hydroponic,
            ..with_ph("Blueberry", 6.0)
        };
        let finding = SoilPhRule.evaluate(&ctx).unwrap();
        assert!(!finding.triggered);
        assert_eq!(finding.optimal_range, "5.5–6.5");
    }

    #[test]
    fn impossible_ph_is_not_applicable() {
        assert!(!SoilPhRule.is_applicable(&with_ph("Tomato", 15.0)));
        assert!(!SoilPhRule.is_applicable(&with_ph("Tomato", f64::NAN)));
        assert!(SoilPhRule.evaluate(&with_ph("Tomato", f64::NAN)).is_none());
        assert!(!SoilPhRule.is_applicable(&PlantContext::default()));
    }

    #[test]
    fn salinity_bands() {
        let ctx = |ec| PlantContext {
            salinity_ds_m: Some(ec),
            ..PlantContext::default()
        };
        assert!(SalinityRule.evaluate(&ctx(SALINITY_WARNING_DS_M)).is_none());
        assert_eq!(
            SalinityRule.evaluate(&ctx(3.0)).map(|f| f.severity),
            Some(Severity::Warning)
        );
        assert_eq!(
            SalinityRule.evaluate(&ctx(5.0)).map(|f| f.severity),
            Some(Severity::Critical)
        );
    }

    #[test]
    fn malformed_salinity_is_not_applicable() {
        for ec in [f64::NAN, f64::INFINITY, -1.0] {
            let ctx = PlantContext {
                salinity_ds_m: Some(ec),
                ..PlantContext::default()
            };
            assert!(!SalinityRule.is_applicable(&ctx), "{}", ec);
            assert!(SalinityRule.evaluate(&ctx).is_none(), "{}", ec);
        }
    }

    #[test]
    fn nutrient_rules_have_distinct_codes() {
        let codes: Vec<_> = [Nutrient::Nitrogen, Nutrient::Phosphorus, Nutrient::Potassium]
            .into_iter()
            .map(|n| NutrientDeficiencyRule::new(n).code())
            .collect();
        assert_eq!(codes, vec!["SOIL.003", "SOIL.004", "SOIL.005"]);
    }

    #[test]
    fn nitrogen_deficiency_bands() {
        let rule = NutrientDeficiencyRule::new(Nutrient::Nitrogen);
        let ctx = |ppm| PlantContext {
            nitrogen_ppm: Some(ppm),
            ..PlantContext::default()
        };
        let severity = |ppm| rule.evaluate(&ctx(ppm)).map(|f| f.severity);
        assert_eq!(
            severity(NITROGEN_CRITICAL_PPM - 1.0),
            Some(Severity::Critical)
        );
        assert_eq!(severity(NITROGEN_CRITICAL_PPM), Some(Severity::Warning));
        assert_eq!(
            severity(NITROGEN_WARNING_PPM - 1.0),
            Some(Severity::Warning)
        );
        assert!(severity(NITROGEN_WARNING_PPM).is_none());
        // A potassium rule ignores nitrogen readings entirely.
        let potassium = NutrientDeficiencyRule::new(Nutrient::Potassium);
        assert!(!potassium.is_applicable(&ctx(NITROGEN_CRITICAL_PPM - 1.0)));
    }

    #[test]
    fn nutrient_thresholds_are_ordered() {
        for nutrient in [Nutrient::Nitrogen, Nutrient::Phosphorus, Nutrient::Potassium] {
            let (critical, warning) = nutrient.thresholds_ppm();
            assert!(critical < warning, "{}", nutrient.as_str());
        }
        assert_eq!(
            Nutrient::Potassium.thresholds_ppm(),
            (POTASSIUM_CRITICAL_PPM, POTASSIUM_WARNING_PPM)
        );
    }

    #[test]
    fn malformed_nutrient_reading_is_not_applicable() {
        let rule = NutrientDeficiencyRule::new(Nutrient::Phosphorus);
        for ppm in [f64::NAN, f64::NEG_INFINITY, -3.0] {
            let ctx = PlantContext {
                phosphorus_ppm: Some(ppm),
                ..PlantContext::default()
            };
            assert!(!rule.is_applicable(&ctx), "{}", ppm);
            assert!(rule.evaluate(&ctx).is_none(), "{}", ppm);
        }
    }

    #[test]
    fn organic_matter_bands() {
        let ctx = |om| PlantContext {
            organic_matter_percent: Some(om),
            ..PlantContext::default()
        };
        let severity = |om| OrganicMatterRule.evaluate(&ctx(om)).map(|f| f.severity);
        assert_eq!(
            severity(ORGANIC_MATTER_DEPLETED_PERCENT - 0.5),
            Some(Severity::Warning)
        );
        assert_eq!(
            severity(ORGANIC_MATTER_LOW_PERCENT - 1.0),
            Some(Severity::Info)
        );
        assert!(severity(ORGANIC_MATTER_LOW_PERCENT + 1.0).is_none());
        for om in [f64::NAN, -1.0, 120.0] {
            assert!(!OrganicMatterRule.is_applicable(&ctx(om)), "{}", om);
        }
    }
}
