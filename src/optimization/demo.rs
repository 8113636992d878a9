//! Fixed demonstration dataset used when a request omits locations or resources.
//!
//! Five Indian metro crisis sites and five relief resource pools. No
//! randomness: the same request always yields the same demo data.

use crate::types::{Coordinates, Location, Priority, Resource};

pub fn demo_locations() -> Vec<Location> {
    let site = |name: &str, (lat, lon): (f64, f64), demand, priority, population, crisis: &str| {
        Location::new(name, Some(Coordinates { lat, lon }), demand, priority)
            .with_population(population)
            .with_crisis_type(crisis)
    };

    vec![
        site("Mumbai", (19.0760, 72.8777), 250.0, Priority::Critical, 2_500_000, "flood"),
        site("Delhi", (28.7041, 77.1025), 180.0, Priority::High, 1_800_000, "heat_wave"),
        site("Chennai", (13.0827, 80.2707), 220.0, Priority::High, 2_200_000, "drought"),
        site("Kolkata", (22.5726, 88.3639), 190.0, Priority::Critical, 1_900_000, "cyclone"),
        site("Bangalore", (12.9716, 77.5946), 120.0, Priority::Medium, 1_200_000, "distribution"),
    ]
}

pub fn demo_resources() -> Vec<Resource> {
    vec![
        Resource::new("emergency_food", 800.0, "tonnes"),
        Resource::new("medical_supplies", 500.0, "kits"),
        Resource::new("water_purification", 300.0, "units"),
        Resource::new("temporary_shelter", 200.0, "units"),
        Resource::new("communication_equipment", 150.0, "sets"),
    ]
}
