use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingCategory {
    WaterStress,
    SoilChemistry,
    TemperatureStress,
    LightStress,
    GrowthStage,
    CompanionPlanting,
    DiseaseRisk,
    IrrigationBehavior,
    SunExposure,
}

impl FindingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCategory::WaterStress => "Water Stress",
            FindingCategory::SoilChemistry => "Soil Chemistry",
            FindingCategory::TemperatureStress => "Temperature Stress",
            FindingCategory::LightStress => "Light Stress",
            FindingCategory::GrowthStage => "Growth Stage",
            FindingCategory::CompanionPlanting => "Companion Planting",
            FindingCategory::DiseaseRisk => "Disease Risk",
            FindingCategory::IrrigationBehavior => "Irrigation Behavior",
            FindingCategory::SunExposure => "Sun Exposure",
        }
    }

    /// Prefix used for finding codes in this category, e.g. `WATER` in `WATER.001`.
    pub fn code_prefix(&self) -> &'static str {
        match self {
            FindingCategory::WaterStress => "WATER",
            FindingCategory::SoilChemistry => "SOIL",
            FindingCategory::TemperatureStress => "TEMP",
            FindingCategory::LightStress => "LIGHT",
            FindingCategory::GrowthStage => "GROWTH",
            FindingCategory::CompanionPlanting => "COMPANION",
            FindingCategory::DiseaseRisk => "DISEASE",
            FindingCategory::IrrigationBehavior => "IRRIGATION",
            FindingCategory::SunExposure => "SUN",
        }
    }

    pub fn all() -> &'static [FindingCategory] {
        &[
            FindingCategory::WaterStress,
            FindingCategory::SoilChemistry,
            FindingCategory::TemperatureStress,
            FindingCategory::LightStress,
            FindingCategory::GrowthStage,
            FindingCategory::CompanionPlanting,
            FindingCategory::DiseaseRisk,
            FindingCategory::IrrigationBehavior,
            FindingCategory::SunExposure,
        ]
    }
}

impl std::fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Finding severity. Ordering ranks `Critical` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Info => "ℹ",
            Severity::Warning => "⚠",
            Severity::Critical => "!",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Evidentiary strength of a finding, always within `[0.0, 1.0]`.
///
/// Values are clamped on construction and rounded to two decimals. NaN maps to 0.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    pub const MIN: Confidence = Confidence(0.0);
    pub const MAX: Confidence = Confidence(1.0);

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        let clamped = value.clamp(0.0, 1.0);
        Self((clamped * 100.0).round() / 100.0)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Confidence::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeasuredValue {
    Number { value: f64, unit: String },
    Flag { value: bool },
    Text { value: String },
}

impl MeasuredValue {
    pub fn number(value: f64, unit: &str) -> Self {
        MeasuredValue::Number {
            value,
            unit: unit.to_string(),
        }
    }

    pub fn flag(value: bool) -> Self {
        MeasuredValue::Flag { value }
    }

    pub fn text(value: impl Into<String>) -> Self {
        MeasuredValue::Text {
            value: value.into(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            MeasuredValue::Number { value, .. } => Some(*value),
            _ => None,
        }
    }
}

impl std::fmt::Display for MeasuredValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeasuredValue::Number { value, unit } if unit.is_empty() => write!(f, "{}", value),
            MeasuredValue::Number { value, unit } => write!(f, "{} {}", value, unit),
            MeasuredValue::Flag { value } => write!(f, "{}", if *value { "yes" } else { "no" }),
            MeasuredValue::Text { value } => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub code: String,
    pub category: FindingCategory,
    pub severity: Severity,
    pub confidence: Confidence,
    pub title: String,
    pub explanation: String,
    pub mechanism: String,
    pub recommended_action: String,
    pub measured_value: MeasuredValue,
    pub optimal_range: String,
    pub references: Vec<String>,
    pub triggered: bool,
}

impl Finding {
    pub fn new(
        code: impl Into<String>,
        category: FindingCategory,
        severity: Severity,
        title: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            category,
            severity,
            confidence: Confidence::MAX,
            title: title.into(),
            explanation: String::new(),
            mechanism: String::new(),
            recommended_action: String::new(),
            measured_value: MeasuredValue::text(""),
            optimal_range: String::new(),
            references: Vec::new(),
            triggered: true,
        }
    }

    /// An evaluated-and-healthy report. Always `Info` and never marked triggered.
    pub fn optimal(
        code: impl Into<String>,
        category: FindingCategory,
        title: impl Into<String>,
    ) -> Self {
        let mut finding = Self::new(code, category, Severity::Info, title);
        finding.triggered = false;
        finding
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Confidence::new(confidence);
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn with_mechanism(mut self, mechanism: impl Into<String>) -> Self {
        self.mechanism = mechanism.into();
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.recommended_action = action.into();
        self
    }

    pub fn with_measured(mut self, measured: MeasuredValue) -> Self {
        self.measured_value = measured;
        self
    }

    pub fn with_optimal_range(mut self, range: impl Into<String>) -> Self {
        self.optimal_range = range.into();
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.references.push(reference.into());
        self
    }

    /// Non-info findings must carry every explanatory field.
    pub fn is_complete(&self) -> bool {
        if self.code.is_empty() || self.title.is_empty() {
            return false;
        }
        if self.severity == Severity::Info {
            return true;
        }
        !self.explanation.is_empty()
            && !self.mechanism.is_empty()
            && !self.recommended_action.is_empty()
            && !self.optimal_range.is_empty()
            && !self.references.is_empty()
    }
}
