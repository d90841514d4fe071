pub mod companion;
pub mod disease_risk;
pub mod engine;
pub mod growth_stage;
pub mod irrigation_zone;
pub mod light_stress;
pub mod registry;
pub mod soil_chemistry;
pub mod sun_exposure;
pub mod temperature_stress;
pub mod water_stress;

pub use engine::{RuleInfo, RulesEngine};
pub use registry::{Registry, RuleSets};

use crate::models::{Finding, FindingCategory};

/// A stateless condition evaluator over one kind of context snapshot.
///
/// Implementors carry only static identity; they never keep per-call state
/// and never hold on to the context beyond a single call.
pub trait Rule<C>: Send + Sync {
    /// Stable finding code, unique within a registry (e.g. `WATER.001`)
    fn code(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    fn category(&self) -> FindingCategory;

    /// Whether the context carries everything this rule needs.
    ///
    /// Must return `false` rather than fail when inputs are missing.
    fn is_applicable(&self, ctx: &C) -> bool;

    /// Evaluate the condition. Returns `None` for a healthy state.
    ///
    /// Only called after `is_applicable` returned `true`.
    fn evaluate(&self, ctx: &C) -> Option<Finding>;
}
