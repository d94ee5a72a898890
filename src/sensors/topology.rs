//! City topology
//!
//! `Topology` is built once from the simulation settings and then only read.
//! Construction is where configuration mistakes surface: an empty city, a
//! district without streets, a street listed twice in the same district, or a
//! sensor kind the catalog cannot sample all fail fast with a `ConfigError`
//! before any simulator loop is started.

use std::collections::HashSet;

use crate::config::SimulationSettings;
use crate::sensors::catalog::{SensorCatalog, SensorSpec};
use crate::utils::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct District {
    pub name: String,
    pub streets: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Topology {
    districts: Vec<District>,
    sensors: Vec<SensorSpec>,
}

impl Topology {
    pub fn from_settings(
        settings: &SimulationSettings,
        catalog: &SensorCatalog,
    ) -> Result<Self, ConfigError> {
        let districts = settings
            .districts
            .iter()
            .map(|d| District {
                name: d.name.clone(),
                streets: d.streets.clone(),
            })
            .collect();
        Self::new(districts, &settings.sensors, catalog)
    }

    pub fn new(
        districts: Vec<District>,
        sensor_kinds: &[String],
        catalog: &SensorCatalog,
    ) -> Result<Self, ConfigError> {
        if districts.is_empty() {
            return Err(ConfigError::EmptyTopology);
        }

        for district in &districts {
            if district.streets.is_empty() {
                return Err(ConfigError::EmptyDistrict(district.name.clone()));
            }
            let mut seen = HashSet::new();
            for street in &district.streets {
                if !seen.insert(street.as_str()) {
                    return Err(ConfigError::DuplicateStreet {
                        district: district.name.clone(),
                        street: street.clone(),
                    });
                }
            }
        }

        if sensor_kinds.is_empty() {
            return Err(ConfigError::NoSensors);
        }

        let sensors = sensor_kinds
            .iter()
            .map(|kind| {
                catalog
                    .get(kind)
                    .cloned()
                    .ok_or_else(|| ConfigError::UnknownSensor(kind.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { districts, sensors })
    }

    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    /// Sensor kinds in the order each street emits them.
    pub fn sensor_kinds(&self) -> impl Iterator<Item = &str> {
        self.sensors.iter().map(|s| s.kind.as_str())
    }

    pub fn sensors(&self) -> &[SensorSpec] {
        &self.sensors
    }

    /// Every `(district, street)` pair, districts in order, streets in order.
    pub fn streets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.districts.iter().flat_map(|d| {
            d.streets
                .iter()
                .map(move |street| (d.name.as_str(), street.as_str()))
        })
    }

    pub fn street_count(&self) -> usize {
        self.districts.iter().map(|d| d.streets.len()).sum()
    }
}
