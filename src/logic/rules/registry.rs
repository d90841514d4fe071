use super::companion::AntagonisticCompanionRule;
use super::disease_risk::FungalDiseaseRiskRule;
use super::engine::RulesEngine;
use super::growth_stage::{HarvestOverdueRule, HarvestWindowRule};
use super::irrigation_zone::{
    LowMoistureAfterWateringRule, MixedSoilConflictRule, ShallowFrequentWateringRule,
    WateringTooFrequentRule, WateringTooInfrequentRule,
};
use super::light_stress::{ExcessiveArtificialLightRule, InsufficientLightRule};
use super::soil_chemistry::{
    Nutrient, NutrientDeficiencyRule, OrganicMatterRule, SalinityRule, SoilPhRule,
};
use super::sun_exposure::{
    FullSunInPartialSunRule, FullSunInShadeRule, GrowingShadeSourceRule, SeasonalVariabilityRule,
    WinterShadingRule,
};
use super::temperature_stress::{ColdStressRule, HeatStressRule};
use super::water_stress::{ExcessiveIrrigationFrequencyRule, OverWateringRule, UnderWateringRule};
use super::Rule;
use crate::config::EngineConfig;
use crate::error::{GardenOpsError, Result};
use crate::models::{FindingCategory, PlantContext, SunExposureContext, ZoneContext};
use std::collections::HashSet;

/// Ordered, read-only collection of rules for one domain.
pub struct Registry<C> {
    name: &'static str,
    rules: Vec<Box<dyn Rule<C>>>,
}

impl<C> Registry<C> {
    /// Build a registry, rejecting duplicate rule codes.
    pub fn new(name: &'static str, rules: Vec<Box<dyn Rule<C>>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.code()) {
                return Err(GardenOpsError::DuplicateRuleCode {
                    registry: name.to_string(),
                    code: rule.code().to_string(),
                });
            }
        }

        Ok(Self { name, rules })
    }

    pub fn empty(name: &'static str) -> Self {
        Self {
            name,
            rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn rules(&self) -> &[Box<dyn Rule<C>>] {
        &self.rules
    }

    pub fn by_category(&self, category: FindingCategory) -> Vec<&dyn Rule<C>> {
        self.rules
            .iter()
            .filter(|r| r.category() == category)
            .map(|r| r.as_ref())
            .collect()
    }

    pub fn get(&self, code: &str) -> Option<&dyn Rule<C>> {
        self.rules
            .iter()
            .find(|r| r.code() == code)
            .map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// General plant-physiology rules: water, soil, temperature, light, growth.
pub fn plant_health() -> Result<Registry<PlantContext>> {
    let rules: Vec<Box<dyn Rule<PlantContext>>> = vec![
        Box::new(UnderWateringRule),
        Box::new(OverWateringRule),
        Box::new(ExcessiveIrrigationFrequencyRule),
        Box::new(SoilPhRule),
        Box::new(SalinityRule),
        Box::new(NutrientDeficiencyRule::new(Nutrient::Nitrogen)),
        Box::new(NutrientDeficiencyRule::new(Nutrient::Phosphorus)),
        Box::new(NutrientDeficiencyRule::new(Nutrient::Potassium)),
        Box::new(OrganicMatterRule),
        Box::new(ColdStressRule),
        Box::new(HeatStressRule),
        Box::new(InsufficientLightRule),
        Box::new(ExcessiveArtificialLightRule),
        Box::new(HarvestWindowRule),
        Box::new(HarvestOverdueRule),
        Box::new(AntagonisticCompanionRule),
        Box::new(FungalDiseaseRiskRule),
    ];

    Registry::new("plant_health", rules)
}

pub fn irrigation_zone() -> Result<Registry<ZoneContext>> {
    let rules: Vec<Box<dyn Rule<ZoneContext>>> = vec![
        Box::new(WateringTooFrequentRule),
        Box::new(WateringTooInfrequentRule),
        Box::new(ShallowFrequentWateringRule),
        Box::new(MixedSoilConflictRule),
        Box::new(LowMoistureAfterWateringRule),
    ];

    Registry::new("irrigation_zone", rules)
}

pub fn sun_exposure() -> Result<Registry<SunExposureContext>> {
    let rules: Vec<Box<dyn Rule<SunExposureContext>>> = vec![
        Box::new(FullSunInShadeRule),
        Box::new(FullSunInPartialSunRule),
        Box::new(WinterShadingRule),
        Box::new(SeasonalVariabilityRule),
        Box::new(GrowingShadeSourceRule),
    ];

    Registry::new("sun_exposure", rules)
}

/// The three domain engines, built once at start-up and shared by reference.
pub struct RuleSets {
    pub plant_health: RulesEngine<PlantContext>,
    pub irrigation_zone: RulesEngine<ZoneContext>,
    pub sun_exposure: RulesEngine<SunExposureContext>,
}

impl RuleSets {
    pub fn build(config: &EngineConfig) -> Result<Self> {
        let budget = config.latency_budget();
        Ok(Self {
            plant_health: RulesEngine::new(plant_health()?).with_latency_budget(budget),
            irrigation_zone: RulesEngine::new(irrigation_zone()?).with_latency_budget(budget),
            sun_exposure: RulesEngine::new(sun_exposure()?).with_latency_budget(budget),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Finding, FindingCategory};

    struct Fixed(&'static str);

    impl Rule<PlantContext> for Fixed {
        fn code(&self) -> &'static str {
            self.0
        }

        fn name(&self) -> &'static str {
            "Fixed"
        }

        fn category(&self) -> FindingCategory {
            FindingCategory::GrowthStage
        }

        fn is_applicable(&self, _ctx: &PlantContext) -> bool {
            true
        }

        fn evaluate(&self, _ctx: &PlantContext) -> Option<Finding> {
            None
        }
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let rules: Vec<Box<dyn Rule<PlantContext>>> =
            vec![Box::new(Fixed("GROWTH.900")), Box::new(Fixed("GROWTH.900"))];
        match Registry::new("test", rules) {
            Err(GardenOpsError::DuplicateRuleCode { code, .. }) => assert_eq!(code, "GROWTH.900"),
            _ => panic!("expected duplicate code error"),
        }
    }

    #[test]
    fn built_in_registries_have_unique_codes() {
        assert_eq!(plant_health().unwrap().len(), 17);
        assert_eq!(irrigation_zone().unwrap().len(), 5);
        assert_eq!(sun_exposure().unwrap().len(), 5);
    }

    #[test]
    fn registries_are_disjoint() {
        let plant = plant_health().unwrap();
        let zone = irrigation_zone().unwrap();
        let sun = sun_exposure().unwrap();

        let mut codes: Vec<&str> = plant.rules().iter().map(|r| r.code()).collect();
        codes.extend(zone.rules().iter().map(|r| r.code()));
        codes.extend(sun.rules().iter().map(|r| r.code()));
        let total = codes.len();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn codes_carry_category_prefix() {
        let plant = plant_health().unwrap();
        for rule in plant.rules() {
            let prefix = format!("{}.", rule.category().code_prefix());
            assert!(rule.code().starts_with(&prefix), "{}", rule.code());
        }
        for rule in irrigation_zone().unwrap().rules() {
            assert!(rule.code().starts_with("IRRIGATION."));
        }
        for rule in sun_exposure().unwrap().rules() {
            assert!(rule.code().starts_with("SUN."));
        }
    }

    #[test]
    fn by_category_preserves_registry_order() {
        let plant = plant_health().unwrap();
        let water: Vec<&str> = plant
            .by_category(FindingCategory::WaterStress)
            .iter()
            .map(|r| r.code())
            .collect();
        assert_eq!(water, vec!["WATER.001", "WATER.002", "WATER.003"]);
        assert!(plant.by_category(FindingCategory::SunExposure).is_empty());
    }

    #[test]
    fn get_finds_rule_by_code() {
        let sun = sun_exposure().unwrap();
        assert_eq!(
            sun.get("SUN.003").map(|r| r.name()),
            Some("Heavy Winter Shading")
        );
        assert!(sun.get("SUN.999").is_none());
    }

    #[test]
    fn empty_registry() {
        let registry: Registry<PlantContext> = Registry::empty("none");
        assert!(registry.is_empty());
        assert_eq!(registry.name(), "none");
    }

    #[test]
    fn rule_sets_build_from_default_config() {
        let sets = RuleSets::build(&EngineConfig::default()).unwrap();
        assert_eq!(sets.plant_health.registry().len(), 17);
        assert_eq!(sets.irrigation_zone.registry().len(), 5);
        assert_eq!(sets.sun_exposure.registry().len(), 5);
    }
}
