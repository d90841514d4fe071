use super::plant_profile::{PlantProfile, SunExposure};
use crate::logic::calculations;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GardenKind {
    #[default]
    Outdoor,
    Indoor,
    Hydroponic,
}

impl GardenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GardenKind::Outdoor => "Outdoor",
            GardenKind::Indoor => "Indoor",
            GardenKind::Hydroponic => "Hydroponic",
        }
    }
}

impl std::fmt::Display for GardenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GrowthStage {
    Seedling,
    Vegetative,
    Flowering,
    Fruiting,
    Harvest,
}

impl GrowthStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthStage::Seedling => "Seedling",
            GrowthStage::Vegetative => "Vegetative",
            GrowthStage::Flowering => "Flowering",
            GrowthStage::Fruiting => "Fruiting",
            GrowthStage::Harvest => "Harvest",
        }
    }
}

impl std::fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanionRelationship {
    Beneficial,
    Neutral,
    Antagonistic,
}

/// A neighbouring planting as reported by the companion-distance producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionPlacement {
    pub name: String,
    pub distance_ft: f64,
    pub relationship: CompanionRelationship,
}

/// Measurable state of one planting at evaluation time.
///
/// Every measurement is optional: `None` means the value was not measured,
/// which is different from a reading of zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantContext {
    pub plant_name: Option<String>,
    pub scientific_name: Option<String>,

    pub planting_date: Option<NaiveDate>,
    pub days_since_planting: Option<u32>,
    pub growth_stage: Option<GrowthStage>,

    pub garden_kind: GardenKind,

    pub soil_ph: Option<f64>,
    pub moisture_percent: Option<f64>,
    pub nitrogen_ppm: Option<f64>,
    pub phosphorus_ppm: Option<f64>,
    pub potassium_ppm: Option<f64>,
    pub organic_matter_percent: Option<f64>,
    /// Electrical conductivity of the soil solution in dS/m.
    pub salinity_ds_m: Option<f64>,

    pub days_since_watering: Option<u32>,
    pub irrigation_events_7d: Option<u32>,

    pub temperature_f: Option<f64>,
    pub min_temp_f: Option<f64>,
    pub max_temp_f: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub light_hours: Option<f64>,
    pub frost_risk_next_7_days: bool,

    pub shading_percent: Option<f64>,
    pub sun_exposure: Option<SunExposure>,
    pub companions: Vec<CompanionPlacement>,
}

impl PlantContext {
    pub fn for_plant(name: &str) -> Self {
        Self {
            plant_name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Fill `days_since_planting` and `growth_stage` from `planting_date`.
    ///
    /// Values the caller already set are left untouched. A planting date in the
    /// future leaves both fields empty.
    pub fn with_derived_timeline(mut self, today: NaiveDate) -> Self {
        if self.days_since_planting.is_none() {
            self.days_since_planting = self
                .planting_date
                .and_then(|planted| u32::try_from((today - planted).num_days()).ok());
        }
        if self.growth_stage.is_none() {
            self.growth_stage = self
                .days_since_planting
                .map(|days| calculations::growth_stage(days, self.profile().days_to_harvest));
        }
        self
    }

    pub fn is_indoor(&self) -> bool {
        self.garden_kind == GardenKind::Indoor
    }

    pub fn is_hydroponic(&self) -> bool {
        self.garden_kind == GardenKind::Hydroponic
    }

    /// Soil-based gardens, i.e. anything but hydroponics.
    pub fn has_soil(&self) -> bool {
        !self.is_hydroponic()
    }

    pub fn profile(&self) -> &'static PlantProfile {
        PlantProfile::resolve(self.plant_name.as_deref())
    }

    pub fn display_name(&self) -> &str {
        self.plant_name.as_deref().unwrap_or("This plant")
    }

    /// Minimum tolerated temperature: context override, else plant profile.
    pub fn min_tolerance_f(&self) -> f64 {
        calculations::finite_reading(self.min_temp_f).unwrap_or(self.profile().min_temp_f)
    }

    /// Maximum tolerated temperature: context override, else plant profile.
    pub fn max_tolerance_f(&self) -> f64 {
        calculations::finite_reading(self.max_temp_f).unwrap_or(self.profile().max_temp_f)
    }

    // Validated readings. A malformed measurement reads as unmeasured.

    pub fn ph(&self) -> Option<f64> {
        self.soil_ph.filter(|ph| (0.0..=14.0).contains(ph))
    }

    pub fn temperature(&self) -> Option<f64> {
        calculations::finite_reading(self.temperature_f)
    }

    pub fn moisture(&self) -> Option<f64> {
        calculations::percent_reading(self.moisture_percent)
    }

    pub fn humidity(&self) -> Option<f64> {
        calculations::percent_reading(self.humidity_percent)
    }

    pub fn shading(&self) -> Option<f64> {
        calculations::percent_reading(self.shading_percent)
    }

    pub fn organic_matter(&self) -> Option<f64> {
        calculations::percent_reading(self.organic_matter_percent)
    }

    pub fn salinity(&self) -> Option<f64> {
        calculations::non_negative_reading(self.salinity_ds_m)
    }

    /// Measured light hours, within a single day.
    pub fn daily_light_hours(&self) -> Option<f64> {
        self.light_hours.filter(|h| (0.0..=24.0).contains(h))
    }
}
