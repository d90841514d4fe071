use super::plant_profile::{PlantProfile, SunExposure};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hemisphere {
    #[default]
    Northern,
    Southern,
}

/// Eight-point compass bearing from the plant to a shade source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bearing {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Bearing {
    /// Whether a source at this bearing sits between the plant and the midday sun.
    pub fn faces_sun(&self, hemisphere: Hemisphere) -> bool {
        match hemisphere {
            Hemisphere::Northern => matches!(self, Bearing::SE | Bearing::S | Bearing::SW),
            Hemisphere::Southern => matches!(self, Bearing::NE | Bearing::N | Bearing::NW),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bearing::N => "north",
            Bearing::NE => "northeast",
            Bearing::E => "east",
            Bearing::SE => "southeast",
            Bearing::S => "south",
            Bearing::SW => "southwest",
            Bearing::W => "west",
            Bearing::NW => "northwest",
        }
    }
}

/// A tree or structure casting shade, as positioned by the sun-path producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadeSource {
    pub name: String,
    pub bearing: Bearing,
    pub distance_ft: f64,
    pub current_height_ft: f64,
    pub mature_height_ft: f64,
}

impl ShadeSource {
    pub fn remaining_growth_ft(&self) -> f64 {
        (self.mature_height_ft - self.current_height_ft).max(0.0)
    }
}

/// Shading percentage per season, each in `[0, 100]` when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalShading {
    pub winter: Option<f64>,
    pub spring: Option<f64>,
    pub summer: Option<f64>,
    pub fall: Option<f64>,
}

impl SeasonalShading {
    pub fn values(&self) -> Vec<f64> {
        [self.winter, self.spring, self.summer, self.fall]
            .into_iter()
            .flatten()
            .collect()
    }

    /// True when every present value is a valid percentage.
    pub fn is_valid(&self) -> bool {
        self.values().iter().all(|v| (0.0..=100.0).contains(v))
    }

    /// Spread between the most and least shaded seasons, if two or more are known.
    pub fn spread(&self) -> Option<f64> {
        let values = self.values();
        if values.len() < 2 {
            return None;
        }
        let max = values.iter().cloned().fold(f64::MIN, f64::max);
        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        Some(max - min)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunExposureContext {
    pub plant_name: Option<String>,
    pub sun_requirement: Option<SunExposure>,
    pub exposure: Option<SunExposure>,
    pub seasonal_shading: SeasonalShading,
    pub shade_source: Option<ShadeSource>,
    pub hemisphere: Hemisphere,
}

impl SunExposureContext {
    pub fn for_plant(name: &str) -> Self {
        Self {
            plant_name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Explicit requirement, else the plant profile's when the plant is known.
    pub fn requirement(&self) -> Option<SunExposure> {
        self.sun_requirement.or_else(|| {
            self.plant_name
                .as_deref()
                .and_then(PlantProfile::lookup)
                .map(|p| p.sun_requirement)
        })
    }

    pub fn display_name(&self) -> &str {
        self.plant_name.as_deref().unwrap_or("This plant")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_prefers_explicit_value() {
        let mut ctx = SunExposureContext::for_plant("Tomato");
        assert_eq!(ctx.requirement(), Some(SunExposure::FullSun));
        ctx.sun_requirement = Some(SunExposure::Shade);
        assert_eq!(ctx.requirement(), Some(SunExposure::Shade));
        assert_eq!(SunExposureContext::for_plant("triffid").requirement(), None);
    }

    #[test]
    fn seasonal_spread_needs_two_seasons() {
        let mut shading = SeasonalShading {
            winter: Some(70.0),
            ..SeasonalShading::default()
        };
        assert_eq!(shading.spread(), None);
        shading.summer = Some(10.0);
        assert_eq!(shading.spread(), Some(60.0));
    }

    #[test]
    fn out_of_range_shading_is_invalid() {
        let shading = SeasonalShading {
            spring: Some(120.0),
            ..SeasonalShading::default()
        };
        assert!(!shading.is_valid());
        assert!(SeasonalShading::default().is_valid());
    }

    #[test]
    fn sun_facing_bearings_flip_by_hemisphere() {
        assert!(Bearing::S.faces_sun(Hemisphere::Northern));
        assert!(!Bearing::N.faces_sun(Hemisphere::Northern));
        assert!(Bearing::N.faces_sun(Hemisphere::Southern));
        assert!(!Bearing::E.faces_sun(Hemisphere::Southern));
    }
}
