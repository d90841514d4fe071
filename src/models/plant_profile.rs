use serde::{Deserialize, Serialize};

/// Sun category, used both for a plant's requirement and for a bed's measured exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SunExposure {
    FullSun,
    PartialSun,
    Shade,
}

impl SunExposure {
    pub fn as_str(&self) -> &'static str {
        match self {
            SunExposure::FullSun => "Full Sun",
            SunExposure::PartialSun => "Partial Sun",
            SunExposure::Shade => "Shade",
        }
    }
}

impl std::fmt::Display for SunExposure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Drainage {
    Fast,
    Moderate,
    Slow,
}

impl Drainage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Drainage::Fast => "Fast",
            Drainage::Moderate => "Moderate",
            Drainage::Slow => "Slow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoilType {
    Clay,
    Loam,
    Sandy,
    SiltLoam,
    ClayLoam,
    SandyLoam,
}

impl SoilType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Clay => "Clay",
            SoilType::Loam => "Loam",
            SoilType::Sandy => "Sandy",
            SoilType::SiltLoam => "Silt Loam",
            SoilType::ClayLoam => "Clay Loam",
            SoilType::SandyLoam => "Sandy Loam",
        }
    }

    pub fn drainage(&self) -> Drainage {
        match self {
            SoilType::Sandy | SoilType::SandyLoam => Drainage::Fast,
            SoilType::Loam | SoilType::SiltLoam => Drainage::Moderate,
            SoilType::Clay | SoilType::ClayLoam => Drainage::Slow,
        }
    }

    /// Recommended days between deep waterings for established plantings.
    pub fn watering_interval_days(&self) -> (f64, f64) {
        match self {
            SoilType::Sandy => (2.0, 4.0),
            SoilType::SandyLoam => (2.0, 5.0),
            SoilType::Loam => (3.0, 6.0),
            SoilType::SiltLoam => (3.0, 7.0),
            SoilType::ClayLoam => (4.0, 8.0),
            SoilType::Clay => (5.0, 10.0),
        }
    }
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static agronomic reference values for one crop.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantProfile {
    pub common_name: &'static str,
    pub scientific_name: &'static str,
    pub ph_min: f64,
    pub ph_max: f64,
    pub min_temp_f: f64,
    pub max_temp_f: f64,
    pub frost_tolerant: bool,
    /// Below this moisture % the plant is in critical drought stress.
    pub moisture_critical_percent: f64,
    /// Below this moisture % the plant begins to wilt.
    pub moisture_warning_percent: f64,
    /// Above this moisture % roots run short of oxygen.
    pub moisture_saturation_percent: f64,
    pub min_light_hours: f64,
    pub days_to_harvest: Option<u32>,
    pub sun_requirement: SunExposure,
}

const fn profile(
    common_name: &'static str,
    scientific_name: &'static str,
    ph: (f64, f64),
    temp_f: (f64, f64),
    frost_tolerant: bool,
    moisture: (f64, f64, f64),
    min_light_hours: f64,
    days_to_harvest: Option<u32>,
    sun_requirement: SunExposure,
) -> PlantProfile {
    PlantProfile {
        common_name,
        scientific_name,
        ph_min: ph.0,
        ph_max: ph.1,
        min_temp_f: temp_f.0,
        max_temp_f: temp_f.1,
        frost_tolerant,
        moisture_critical_percent: moisture.0,
        moisture_warning_percent: moisture.1,
        moisture_saturation_percent: moisture.2,
        min_light_hours,
        days_to_harvest,
        sun_requirement,
    }
}

#[rustfmt::skip]
static PROFILES: &[PlantProfile] = &[
    profile("Tomato", "Solanum lycopersicum", (6.0, 6.8), (50.0, 85.0), false, (15.0, 20.0, 80.0), 8.0, Some(75), SunExposure::FullSun),
    profile("Pepper", "Capsicum annuum", (6.0, 7.0), (55.0, 85.0), false, (15.0, 20.0, 80.0), 8.0, Some(70), SunExposure::FullSun),
    profile("Cucumber", "Cucumis sativus", (6.0, 7.0), (55.0, 90.0), false, (20.0, 25.0, 85.0), 8.0, Some(55), SunExposure::FullSun),
    profile("Bean", "Phaseolus vulgaris", (6.0, 7.0), (50.0, 85.0), false, (15.0, 20.0, 80.0), 6.0, Some(55), SunExposure::FullSun),
    profile("Basil", "Ocimum basilicum", (6.0, 7.5), (50.0, 90.0), false, (15.0, 20.0, 75.0), 6.0, Some(60), SunExposure::FullSun),
    profile("Lettuce", "Lactuca sativa", (6.0, 7.0), (35.0, 75.0), true, (20.0, 25.0, 85.0), 4.0, Some(45), SunExposure::PartialSun),
    profile("Spinach", "Spinacia oleracea", (6.5, 7.5), (30.0, 75.0), true, (20.0, 25.0, 85.0), 4.0, Some(40), SunExposure::PartialSun),
    profile("Carrot", "Daucus carota", (6.0, 6.8), (40.0, 80.0), true, (15.0, 20.0, 80.0), 6.0, Some(70), SunExposure::FullSun),
    profile("Potato", "Solanum tuberosum", (5.0, 6.0), (45.0, 80.0), false, (15.0, 22.0, 80.0), 6.0, Some(90), SunExposure::FullSun),
    profile("Strawberry", "Fragaria × ananassa", (5.5, 6.8), (35.0, 85.0), true, (20.0, 25.0, 80.0), 6.0, Some(90), SunExposure::FullSun),
    profile("Blueberry", "Vaccinium corymbosum", (4.5, 5.5), (20.0, 85.0), true, (20.0, 30.0, 80.0), 6.0, None, SunExposure::FullSun),
    profile("Rosemary", "Salvia rosmarinus", (6.0, 7.5), (30.0, 95.0), true, (8.0, 12.0, 60.0), 6.0, None, SunExposure::FullSun),
    profile("Lavender", "Lavandula angustifolia", (6.5, 8.0), (20.0, 95.0), true, (8.0, 12.0, 60.0), 6.0, None, SunExposure::FullSun),
    profile("Kale", "Brassica oleracea", (6.0, 7.5), (25.0, 80.0), true, (15.0, 20.0, 85.0), 4.0, Some(55), SunExposure::PartialSun),
];

impl PlantProfile {
    /// Fallback for plants missing from the lookup table: pH 6.0–7.0, 40–90°F,
    /// moisture 15/20/80 %, six hours of light, full sun.
    pub const GENERIC: PlantProfile = profile(
        "Generic",
        "",
        (6.0, 7.0),
        (40.0, 90.0),
        false,
        (15.0, 20.0, 80.0),
        6.0,
        None,
        SunExposure::FullSun,
    );

    /// Case-insensitive lookup by common name.
    pub fn lookup(common_name: &str) -> Option<&'static PlantProfile> {
        let wanted = common_name.trim();
        PROFILES
            .iter()
            .find(|p| p.common_name.eq_ignore_ascii_case(wanted))
    }

    /// Profile for an optional plant name, falling back to [`PlantProfile::GENERIC`].
    pub fn resolve(common_name: Option<&str>) -> &'static PlantProfile {
        static GENERIC: PlantProfile = PlantProfile::GENERIC;
        common_name.and_then(Self::lookup).unwrap_or(&GENERIC)
    }

    pub fn is_generic(&self) -> bool {
        self.common_name == Self::GENERIC.common_name
    }

    pub fn all() -> &'static [PlantProfile] {
        PROFILES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(PlantProfile::lookup("tomato").map(|p| p.ph_min), Some(6.0));
        assert_eq!(
            PlantProfile::lookup(" LETTUCE ").map(|p| p.max_temp_f),
            Some(75.0)
        );
        assert!(PlantProfile::lookup("triffid").is_none());
    }

    #[test]
    fn resolve_falls_back_to_generic() {
        let p = PlantProfile::resolve(Some("triffid"));
        assert!(p.is_generic());
        assert_eq!((p.ph_min, p.ph_max), (6.0, 7.0));
        assert!(PlantProfile::resolve(None).is_generic());
        assert!(!PlantProfile::resolve(Some("Tomato")).is_generic());
    }

    #[test]
    fn profile_bands_are_ordered() {
        for p in PlantProfile::all() {
            assert!(p.ph_min < p.ph_max, "{}", p.common_name);
            assert!(p.min_temp_f < p.max_temp_f, "{}", p.common_name);
            assert!(
                p.moisture_critical_percent < p.moisture_warning_percent
                    && p.moisture_warning_percent < p.moisture_saturation_percent,
                "{}",
                p.common_name
            );
        }
    }

    #[test]
    fn soil_drainage_classes() {
        assert_eq!(SoilType::Sandy.drainage(), Drainage::Fast);
        assert_eq!(SoilType::SiltLoam.drainage(), Drainage::Moderate);
        assert_eq!(SoilType::ClayLoam.drainage(), Drainage::Slow);
        let (min, max) = SoilType::Clay.watering_interval_days();
        assert!(min < max);
    }

    #[test]
    fn enums_deserialize_from_variant_names() {
        let soil: SoilType = serde_json::from_str("\"SiltLoam\"").unwrap();
        assert_eq!(soil, SoilType::SiltLoam);
        let sun: SunExposure = serde_json::from_str("\"PartialSun\"").unwrap();
        assert_eq!(sun, SunExposure::PartialSun);
        assert!(serde_json::from_str::<SunExposure>("\"dappled\"").is_err());
    }
}
