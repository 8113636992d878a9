//! Locations, priorities and resources supplied by the caller

use serde::{Deserialize, Serialize};

use super::error::PlanError;

/// Urgency tag attached to every location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Numeric rank used by the pairwise cost weighting (1..=4).
    pub const fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Demand multiplier applied when allocating supplies.
    pub const fn allocation_multiplier(self) -> f64 {
        match self {
            Self::Low => 0.8,
            Self::Medium => 1.0,
            Self::High => 1.3,
            Self::Critical => 1.6,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

fn default_demand() -> f64 {
    100.0
}

/// A delivery site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Identifier shown on the route.
    #[serde(default, alias = "id")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "lng", alias = "longitude")]
    pub lon: Option<f64>,
    /// Requested quantity per resource type.
    #[serde(default = "default_demand")]
    pub demand: f64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub population: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis_type: Option<String>,
}

impl Location {
    pub fn new(
        name: impl Into<String>,
        coordinates: Option<Coordinates>,
        demand: f64,
        priority: Priority,
    ) -> Self {
        Self {
            name: name.into(),
            lat: coordinates.map(|c| c.lat),
            lon: coordinates.map(|c| c.lon),
            demand,
            priority,
            population: 0,
            crisis_type: None,
        }
    }

    #[must_use]
    pub const fn with_population(mut self, population: u64) -> Self {
        self.population = population;
        self
    }

    #[must_use]
    pub fn with_crisis_type(mut self, crisis_type: impl Into<String>) -> Self {
        self.crisis_type = Some(crisis_type.into());
        self
    }

    /// Both coordinates, if the location carries them.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
            _ => None,
        }
    }

    /// Display label: the name, or `Location {index}` when unnamed.
    pub fn label(&self, index: usize) -> String {
        if self.name.trim().is_empty() {
            format!("Location {index}")
        } else {
            self.name.clone()
        }
    }

    /// Reject values that cannot describe a real site.
    pub fn validate(&self, index: usize) -> Result<(), PlanError> {
        if !self.demand.is_finite() || self.demand < 0.0 {
            return Err(PlanError::invalid(format!(
                "location {index}: demand must be a non-negative finite number (got {})",
                self.demand
            )));
        }
        match (self.lat, self.lon) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(PlanError::invalid(format!(
                    "location {index}: latitude and longitude must be given together"
                )));
            }
            (Some(lat), Some(lon)) => {
                if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                    return Err(PlanError::invalid(format!(
                        "location {index}: latitude {lat} outside [-90, 90]"
                    )));
                }
                if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                    return Err(PlanError::invalid(format!(
                        "location {index}: longitude {lon} outside [-180, 180]"
                    )));
                }
            }
            (None, None) => {}
        }
        Ok(())
    }
}

fn default_unit() -> String {
    "units".to_string()
}

/// A stock of one kind of supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub quantity: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            quantity,
            unit: unit.into(),
        }
    }

    pub fn validate(&self, index: usize) -> Result<(), PlanError> {
        if self.resource_type.trim().is_empty() {
            return Err(PlanError::invalid(format!("resource {index}: type tag must not be empty")));
        }
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(PlanError::invalid(format!(
                "resource {index} ({}): quantity must be a non-negative finite number (got {})",
                self.resource_type, self.quantity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_tables() {
        assert_eq!(Priority::Low.rank(), 1);
        assert_eq!(Priority::Critical.rank(), 4);
        assert_eq!(Priority::High.allocation_multiplier(), 1.3);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn location_defaults_from_sparse_json() {
        let loc: Location = serde_json::from_str(r#"{"name": "Depot"}"#).unwrap();
        assert_eq!(loc.demand, 100.0);
        assert_eq!(loc.priority, Priority::Medium);
        assert!(loc.coordinates().is_none());
    }

    #[test]
    fn location_accepts_lng_alias() {
        let raw = r#"{"name": "A", "lat": 40.7, "lng": -74.0, "priority": "critical"}"#;
        let loc: Location = serde_json::from_str(raw).unwrap();
        let c = loc.coordinates().unwrap();
        assert_eq!(c.lon, -74.0);
        assert_eq!(loc.priority, Priority::Critical);
    }

    #[test]
    fn unknown_priority_tag_is_rejected() {
        let parsed: Result<Location, _> =
            serde_json::from_str(r#"{"name": "A", "priority": "urgent"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn negative_demand_fails_validation() {
        let loc = Location::new("A", None, -1.0, Priority::Low);
        assert!(matches!(loc.validate(0), Err(PlanError::InvalidInput(_))));
    }

    #[test]
    fn half_coordinates_fail_validation() {
        let mut loc = Location::new("A", None, 10.0, Priority::Low);
        loc.lat = Some(10.0);
        assert!(loc.validate(3).is_err());
    }

    #[test]
    fn negative_quantity_fails_validation() {
        let r = Resource::new("water", -5.0, "litres");
        assert!(r.validate(0).is_err());
        assert!(Resource::new("water", 0.0, "litres").validate(0).is_ok());
    }

    #[test]
    fn unnamed_location_gets_index_label() {
        let loc = Location::new("  ", None, 1.0, Priority::Low);
        assert_eq!(loc.label(7), "Location 7");
    }
}
