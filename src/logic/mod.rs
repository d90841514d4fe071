pub mod batch;
pub mod calculations;
pub mod rules;

pub use batch::BatchEvaluator;
pub use rules::{RuleSets, RulesEngine};
