use super::plant_profile::{Drainage, SoilType};
use serde::{Deserialize, Serialize};

/// Watering behaviour of one irrigation zone shared by several plantings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneContext {
    pub zone_name: Option<String>,
    /// Soil of every planting in the zone, one entry per planting.
    pub soil_types: Vec<SoilType>,
    /// Mean days between watering events.
    pub watering_interval_days: Option<f64>,
    pub events_last_7_days: Option<u32>,
    pub avg_duration_minutes: Option<f64>,
    pub soil_moisture_percent: Option<f64>,
    pub hours_since_watering: Option<f64>,
    pub temperature_f: Option<f64>,
}

impl ZoneContext {
    pub fn named(name: &str) -> Self {
        Self {
            zone_name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Most common soil in the zone. Ties go to the soil listed first.
    pub fn primary_soil(&self) -> Option<SoilType> {
        let mut best: Option<(SoilType, usize)> = None;
        for soil in &self.soil_types {
            let count = self.soil_types.iter().filter(|s| *s == soil).count();
            match best {
                Some((_, best_count)) if best_count >= count => {}
                _ => best = Some((*soil, count)),
            }
        }
        best.map(|(soil, _)| soil)
    }

    /// Distinct drainage classes present, in ascending order.
    pub fn drainage_classes(&self) -> Vec<Drainage> {
        let mut classes: Vec<Drainage> = self.soil_types.iter().map(|s| s.drainage()).collect();
        classes.sort();
        classes.dedup();
        classes
    }

    /// Distinct soil types in first-seen order.
    pub fn distinct_soils(&self) -> Vec<SoilType> {
        let mut seen = Vec::new();
        for soil in &self.soil_types {
            if !seen.contains(soil) {
                seen.push(*soil);
            }
        }
        seen
    }

    pub fn display_name(&self) -> &str {
        self.zone_name.as_deref().unwrap_or("This zone")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_soil_is_most_common() {
        let zone = ZoneContext {
            soil_types: vec![SoilType::Clay, SoilType::Loam, SoilType::Loam],
            ..ZoneContext::default()
        };
        assert_eq!(zone.primary_soil(), Some(SoilType::Loam));
    }

    #[test]
    fn primary_soil_tie_goes_to_first_listed() {
        let zone = ZoneContext {
            soil_types: vec![SoilType::Sandy, SoilType::Clay],
            ..ZoneContext::default()
        };
        assert_eq!(zone.primary_soil(), Some(SoilType::Sandy));
        assert_eq!(ZoneContext::default().primary_soil(), None);
    }

    #[test]
    fn drainage_classes_are_distinct_and_sorted() {
        let zone = ZoneContext {
            soil_types: vec![SoilType::Clay, SoilType::Sandy, SoilType::SandyLoam],
            ..ZoneContext::default()
        };
        assert_eq!(
            zone.drainage_classes(),
            vec![Drainage::Fast, Drainage::Slow]
        );
        assert_eq!(zone.distinct_soils().len(), 3);
    }
}
