//! Sensor catalog
//!
//! Every sensor kind the simulator knows how to sample, with its range and
//! unit. Continuous kinds are sampled uniformly and rounded to two decimals;
//! integer kinds (traffic speed) are sampled as whole numbers.

use std::collections::HashMap;

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    Continuous,
    Integer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorSpec {
    pub kind: String,
    pub min: f64,
    pub max: f64,
    pub unit: Option<String>,
    pub sampling: Sampling,
}

impl SensorSpec {
    pub fn continuous(kind: &str, min: f64, max: f64, unit: &str) -> Self {
        Self {
            kind: kind.to_string(),
            min,
            max,
            unit: Some(unit.to_string()),
            sampling: Sampling::Continuous,
        }
    }

    pub fn integer(kind: &str, min: f64, max: f64, unit: &str) -> Self {
        Self {
            sampling: Sampling::Integer,
            ..Self::continuous(kind, min, max, unit)
        }
    }

    /// Draws one value inside `[min, max]`.
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        match self.sampling {
            Sampling::Continuous => {
                let raw = rng.gen_range(self.min..=self.max);
                (raw * 100.0).round() / 100.0
            }
            Sampling::Integer => {
                let lo = self.min.ceil() as i64;
                let hi = self.max.floor() as i64;
                rng.gen_range(lo..=hi) as f64
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SensorCatalog {
    specs: HashMap<String, SensorSpec>,
}

impl SensorCatalog {
    /// The ranges used by the city deployment.
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        for spec in [
            SensorSpec::continuous("temperature", 15.0, 35.0, "C"),
            SensorSpec::continuous("humidity", 30.0, 70.0, "%"),
            SensorSpec::continuous("noise", 40.0, 90.0, "dB"),
            SensorSpec::integer("traffic", 0.0, 80.0, "km/h"),
            SensorSpec::continuous("pm25", 5.0, 80.0, "ug/m3"),
            SensorSpec::continuous("pm10", 10.0, 150.0, "ug/m3"),
            SensorSpec::continuous("co", 0.1, 5.0, "ppm"),
            SensorSpec::continuous("no2", 5.0, 200.0, "ppb"),
            SensorSpec::continuous("o3", 10.0, 180.0, "ppb"),
        ] {
            catalog.insert(spec);
        }
        catalog
    }

    pub fn insert(&mut self, spec: SensorSpec) {
        self.specs.insert(spec.kind.clone(), spec);
    }

    pub fn get(&self, kind: &str) -> Option<&SensorSpec> {
        self.specs.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.specs.contains_key(kind)
    }

    /// Samples `kind`, or `None` when the kind has no range.
    pub fn generate_value(&self, kind: &str, rng: &mut impl Rng) -> Option<f64> {
        self.get(kind).map(|spec| spec.sample(rng))
    }

    pub fn unit(&self, kind: &str) -> Option<&str> {
        self.get(kind).and_then(|spec| spec.unit.as_deref())
    }
}
