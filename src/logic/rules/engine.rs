use super::registry::Registry;
use super::Rule;
use crate::models::{Finding, FindingCategory};
use serde::Serialize;
use std::cmp::Ordering;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Default time budget for one full registry pass.
pub const DEFAULT_LATENCY_BUDGET: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub category: FindingCategory,
}

pub struct RulesEngine<C> {
    registry: Registry<C>,
    latency_budget: Duration,
}

impl<C> RulesEngine<C> {
    pub fn new(registry: Registry<C>) -> Self {
        Self {
            registry,
            latency_budget: DEFAULT_LATENCY_BUDGET,
        }
    }

    pub fn with_latency_budget(mut self, budget: Duration) -> Self {
        self.latency_budget = budget;
        self
    }

    pub fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    /// Run every applicable rule and return findings ordered by severity
    /// (highest first), then category name, then code.
    ///
    /// A rule that panics or returns a malformed finding is logged and skipped;
    /// the rest of the batch still runs. A caught panic still passes through the
    /// process panic hook first, so with the default hook its message also lands
    /// on stderr. The `gardenops` binary installs a hook that logs through
    /// `tracing` instead.
    pub fn evaluate(&self, ctx: &C) -> Vec<Finding> {
        let started = Instant::now();

        let mut findings: Vec<Finding> = self
            .registry
            .rules()
            .iter()
            .filter_map(|rule| run_guarded(rule.as_ref(), ctx))
            .collect();

        findings.sort_by(compare_findings);

        let elapsed = started.elapsed();
        tracing::debug!(
            registry = self.registry.name(),
            rules = self.registry.len(),
            findings = findings.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "rule evaluation complete"
        );
        if elapsed > self.latency_budget {
            tracing::warn!(
                registry = self.registry.name(),
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = self.latency_budget.as_millis() as u64,
                "rule evaluation exceeded latency budget"
            );
        }

        findings
    }

    /// Evaluate a single rule by code through the same failure boundary.
    pub fn evaluate_rule(&self, code: &str, ctx: &C) -> Option<Finding> {
        self.registry
            .get(code)
            .and_then(|rule| run_guarded(rule, ctx))
    }

    pub fn list_rules(&self) -> Vec<RuleInfo> {
        self.registry
            .rules()
            .iter()
            .map(|r| RuleInfo {
                code: r.code(),
                name: r.name(),
                category: r.category(),
            })
            .collect()
    }
}

fn run_guarded<C>(rule: &dyn Rule<C>, ctx: &C) -> Option<Finding> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        if rule.is_applicable(ctx) {
            rule.evaluate(ctx)
        } else {
            None
        }
    }));

    let finding = match outcome {
        Ok(finding) => finding?,
        Err(payload) => {
            tracing::warn!(
                rule = rule.code(),
                error = panic_message(payload.as_ref()),
                "rule failed during evaluation; skipping"
            );
            return None;
        }
    };

    if finding.code != rule.code() || finding.category != rule.category() {
        tracing::warn!(
            rule = rule.code(),
            finding_code = %finding.code,
            "rule returned a finding under a foreign identity; skipping"
        );
        return None;
    }

    if !finding.is_complete() {
        tracing::warn!(
            rule = rule.code(),
            severity = %finding.severity,
            "rule returned an incomplete finding; skipping"
        );
        return None;
    }

    Some(finding)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

fn compare_findings(a: &Finding, b: &Finding) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then_with(|| a.category.as_str().cmp(b.category.as_str()))
        .then_with(|| a.code.cmp(&b.code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::rules::registry;
    use crate::models::{GardenKind, MeasuredValue, PlantContext, Severity};

    /// Test rule that always fires with a fixed severity.
    struct Always {
        code: &'static str,
        category: FindingCategory,
        severity: Severity,
    }

    impl Rule<PlantContext> for Always {
        fn code(&self) -> &'static str {
            self.code
        }

        fn name(&self) -> &'static str {
            "Always"
        }

        fn category(&self) -> FindingCategory {
            self.category
        }

        fn is_applicable(&self, _ctx: &PlantContext) -> bool {
            true
        }

        fn evaluate(&self, _ctx: &PlantContext) -> Option<Finding> {
            Some(
                Finding::new(self.code, self.category, self.severity, "Always fires")
                    .with_confidence(0.8)
                    .with_explanation("Test condition holds")
                    .with_mechanism("Test mechanism")
                    .with_action("No action")
                    .with_measured(MeasuredValue::number(1.0, ""))
                    .with_optimal_range("n/a")
                    .with_reference("Test reference"),
            )
        }
    }

    struct Faulty;

    impl Rule<PlantContext> for Faulty {
        fn code(&self) -> &'static str {
            "WATER.999"
        }

        fn name(&self) -> &'static str {
            "Faulty"
        }

        fn category(&self) -> FindingCategory {
            FindingCategory::WaterStress
        }

        fn is_applicable(&self, _ctx: &PlantContext) -> bool {
            true
        }

        fn evaluate(&self, _ctx: &PlantContext) -> Option<Finding> {
            panic!("sensor table corrupted")
        }
    }

    struct Impostor;

    impl Rule<PlantContext> for Impostor {
        fn code(&self) -> &'static str {
            "LIGHT.999"
        }

        fn name(&self) -> &'static str {
            "Impostor"
        }

        fn category(&self) -> FindingCategory {
            FindingCategory::LightStress
        }

        fn is_applicable(&self, _ctx: &PlantContext) -> bool {
            true
        }

        fn evaluate(&self, _ctx: &PlantContext) -> Option<Finding> {
            Some(Finding::new(
                "WATER.001",
                FindingCategory::WaterStress,
                Severity::Critical,
                "Borrowed identity",
            ))
        }
    }

    fn always(code: &'static str, category: FindingCategory, severity: Severity) -> Box<Always> {
        Box::new(Always {
            code,
            category,
            severity,
        })
    }

    fn healthy_rules() -> Vec<Box<dyn Rule<PlantContext>>> {
        vec![
            always("GROWTH.101", FindingCategory::GrowthStage, Severity::Info),
            always(
                "SOIL.101",
                FindingCategory::SoilChemistry,
                Severity::Warning,
            ),
            always(
                "WATER.101",
                FindingCategory::WaterStress,
                Severity::Critical,
            ),
            always("LIGHT.101", FindingCategory::LightStress, Severity::Warning),
            always(
                "TEMP.101",
                FindingCategory::TemperatureStress,
                Severity::Critical,
            ),
        ]
    }

    fn codes(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.code.as_str()).collect()
    }

    fn full_context() -> PlantContext {
        PlantContext {
            soil_ph: Some(5.2),
            moisture_percent: Some(12.0),
            nitrogen_ppm: Some(8.0),
            phosphorus_ppm: Some(30.0),
            potassium_ppm: Some(90.0),
            organic_matter_percent: Some(2.0),
            salinity_ds_m: Some(2.5),
            days_since_watering: Some(4),
            irrigation_events_7d: Some(3),
            temperature_f: Some(92.0),
            humidity_percent: Some(88.0),
            light_hours: Some(5.0),
            days_since_planting: Some(72),
            shading_percent: Some(40.0),
            companions: vec![crate::models::CompanionPlacement {
                name: "Fennel".to_string(),
                distance_ft: 1.5,
                relationship: crate::models::CompanionRelationship::Antagonistic,
            }],
            ..PlantContext::for_plant("Tomato")
        }
    }

    #[test]
    fn faulty_rule_does_not_abort_batch() {
        let mut rules = healthy_rules();
        rules.insert(2, Box::new(Faulty));
        let engine = RulesEngine::new(Registry::new("test", rules).unwrap());

        let findings = engine.evaluate(&PlantContext::default());

        assert_eq!(
            codes(&findings),
            vec!["TEMP.101", "WATER.101", "LIGHT.101", "SOIL.101", "GROWTH.101"]
        );
    }

    #[test]
    fn sort_is_severity_then_category_then_code() {
        let rules: Vec<Box<dyn Rule<PlantContext>>> = vec![
            always("WATER.102", FindingCategory::WaterStress, Severity::Warning),
            always("WATER.101", FindingCategory::WaterStress, Severity::Warning),
            always(
                "GROWTH.101",
                FindingCategory::GrowthStage,
                Severity::Warning,
            ),
            always(
                "SOIL.101",
                FindingCategory::SoilChemistry,
                Severity::Critical,
            ),
        ];
        let engine = RulesEngine::new(Registry::new("test", rules).unwrap());

        assert_eq!(
            codes(&engine.evaluate(&PlantContext::default())),
            vec!["SOIL.101", "GROWTH.101", "WATER.101", "WATER.102"]
        );
    }

    #[test]
    fn registration_order_does_not_change_output() {
        let forward = RulesEngine::new(Registry::new("fwd", healthy_rules()).unwrap());
        let mut reversed_rules = healthy_rules();
        reversed_rules.reverse();
        let reversed = RulesEngine::new(Registry::new("rev", reversed_rules).unwrap());

        let ctx = PlantContext::default();
        assert_eq!(forward.evaluate(&ctx), reversed.evaluate(&ctx));
    }

    #[test]
    fn foreign_identity_is_rejected() {
        let rules: Vec<Box<dyn Rule<PlantContext>>> = vec![Box::new(Impostor)];
        let engine = RulesEngine::new(Registry::new("test", rules).unwrap());
        assert!(engine.evaluate(&PlantContext::default()).is_empty());
    }

    #[test]
    fn empty_registry_yields_empty_result() {
        let engine: RulesEngine<PlantContext> = RulesEngine::new(Registry::empty("none"));
        assert!(engine.evaluate(&full_context()).is_empty());
    }

    #[test]
    fn evaluate_rule_by_code() {
        let engine = RulesEngine::new(registry::plant_health().unwrap());
        let ctx = PlantContext {
            moisture_percent: Some(8.0),
            ..PlantContext::for_plant("Tomato")
        };

        let finding = engine.evaluate_rule("WATER.001", &ctx).unwrap();
        assert_eq!(finding.severity, Severity::Critical);
        assert!(engine.evaluate_rule("WATER.404", &ctx).is_none());
    }

    #[test]
    fn list_rules_in_registry_order() {
        let engine = RulesEngine::new(registry::sun_exposure().unwrap());
        let rules = engine.list_rules();
        assert_eq!(rules.len(), 5);
        assert_eq!(rules[0].code, "SUN.001");
        assert_eq!(rules[0].category, FindingCategory::SunExposure);
    }

    #[test]
    fn under_watered_tomato_is_critical() {
        let engine = RulesEngine::new(registry::plant_health().unwrap());
        let ctx = PlantContext {
            moisture_percent: Some(8.0),
            ..PlantContext::for_plant("Tomato")
        };

        let findings = engine.evaluate(&ctx);
        let water = findings
            .iter()
            .find(|f| f.category == FindingCategory::WaterStress)
            .unwrap();
        assert_eq!(water.severity, Severity::Critical);
        assert!(water.confidence.value() >= 0.90);
        assert_eq!(water.measured_value.as_number(), Some(8.0));
    }

    #[test]
    fn optimal_moisture_yields_no_water_finding() {
        let engine = RulesEngine::new(registry::plant_health().unwrap());
        let ctx = PlantContext {
            moisture_percent: Some(45.0),
            ..PlantContext::default()
        };

        assert!(engine.evaluate_rule("WATER.001", &ctx).is_none());
        assert!(engine.evaluate(&ctx).is_empty());
    }

    #[test]
    fn acidic_tomato_soil_is_warning() {
        let engine = RulesEngine::new(registry::plant_health().unwrap());
        let ctx = PlantContext {
            soil_ph: Some(5.5),
            ..PlantContext::for_plant("Tomato")
        };

        let findings = engine.evaluate(&ctx);
        assert_eq!(findings.len(), 1);
        let soil = &findings[0];
        assert_eq!(soil.category, FindingCategory::SoilChemistry);
        assert_eq!(soil.severity, Severity::Warning);
        assert_eq!(soil.measured_value.as_number(), Some(5.5));
        assert_eq!(soil.optimal_range, "6.0–6.8");
    }

    #[test]
    fn hot_lettuce_is_critical() {
        let engine = RulesEngine::new(registry::plant_health().unwrap());
        let ctx = PlantContext {
            temperature_f: Some(98.0),
            ..PlantContext::for_plant("Lettuce")
        };

        let findings = engine.evaluate(&ctx);
        let heat = findings
            .iter()
            .find(|f| f.category == FindingCategory::TemperatureStress)
            .unwrap();
        assert_eq!(heat.severity, Severity::Critical);
    }

    #[test]
    fn empty_context_yields_no_findings() {
        let plant = RulesEngine::new(registry::plant_health().unwrap());
        let zone = RulesEngine::new(registry::irrigation_zone().unwrap());
        let sun = RulesEngine::new(registry::sun_exposure().unwrap());

        assert!(plant.evaluate(&PlantContext::default()).is_empty());
        assert!(zone.evaluate(&Default::default()).is_empty());
        assert!(sun.evaluate(&Default::default()).is_empty());
    }

    #[test]
    fn evaluation_is_deterministic() {
        let engine = RulesEngine::new(registry::plant_health().unwrap());
        let ctx = full_context();

        let first = serde_json::to_string(&engine.evaluate(&ctx)).unwrap();
        for _ in 0..10 {
            assert_eq!(
                serde_json::to_string(&engine.evaluate(&ctx)).unwrap(),
                first
            );
        }
    }

    #[test]
    fn findings_respect_bounds_and_completeness() {
        let engine = RulesEngine::new(registry::plant_health().unwrap());
        let findings = engine.evaluate(&full_context());

        assert!(findings.len() >= 8);
        for f in &findings {
            let c = f.confidence.value();
            assert!((0.0..=1.0).contains(&c), "{} confidence {}", f.code, c);
            assert!(matches!(
                f.severity,
                Severity::Info | Severity::Warning | Severity::Critical
            ));
            assert!(f.is_complete(), "{} incomplete", f.code);
        }
        for pair in findings.windows(2) {
            assert_ne!(compare_findings(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn missing_fields_gate_rules_out() {
        let engine = RulesEngine::new(registry::plant_health().unwrap());
        let ctx = PlantContext {
            temperature_f: Some(98.0),
            garden_kind: GardenKind::Indoor,
            ..PlantContext::for_plant("Lettuce")
        };

        let findings = engine.evaluate(&ctx);
        assert!(findings
            .iter()
            .all(|f| f.category == FindingCategory::TemperatureStress));
    }

    #[test]
    fn malformed_inputs_are_not_applicable() {
        let engine = RulesEngine::new(registry::plant_health().unwrap());
        let tomato = || PlantContext::for_plant("Tomato");
        let malformed = [
            PlantContext {
                temperature_f: Some(f64::NAN),
                ..tomato()
            },
            PlantContext {
                light_hours: Some(f64::NAN),
                ..tomato()
            },
            PlantContext {
                light_hours: Some(30.0),
                ..tomato()
            },
            PlantContext {
                shading_percent: Some(150.0),
                ..tomato()
            },
            PlantContext {
                moisture_percent: Some(f64::NAN),
                ..tomato()
            },
            PlantContext {
                moisture_percent: Some(150.0),
                ..tomato()
            },
            PlantContext {
                humidity_percent: Some(250.0),
                ..tomato()
            },
            PlantContext {
                nitrogen_ppm: Some(f64::NAN),
                ..tomato()
            },
            PlantContext {
                organic_matter_percent: Some(-1.0),
                ..tomato()
            },
            PlantContext {
                salinity_ds_m: Some(f64::INFINITY),
                ..tomato()
            },
            PlantContext {
                soil_ph: Some(f64::NAN),
                ..tomato()
            },
        ];

        for ctx in &malformed {
            assert!(engine.evaluate(ctx).is_empty(), "{:?}", ctx);
        }
    }

    #[test]
    fn full_pass_within_latency_budget() {
        let engine = RulesEngine::new(registry::plant_health().unwrap());
        let ctx = full_context();

        let started = Instant::now();
        engine.evaluate(&ctx);
        assert!(started.elapsed() < DEFAULT_LATENCY_BUDGET);
    }

    #[test]
    fn shared_engine_across_threads() {
        let engine = RulesEngine::new(registry::plant_health().unwrap());
        let ctx = full_context();
        let expected = engine.evaluate(&ctx);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| engine.evaluate(&ctx)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
