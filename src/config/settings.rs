use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration settings for the simulator.
///
/// Includes settings for the broker connection and for the simulated city.
#[derive(Debug, Clone)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub simulation: SimulationSettings,
}

/// Which wire protocol the simulator uses to reach the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Mqtt,
    WebSocket,
}

/// Username/password pair presented to the broker on connect.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Configuration settings for the broker connection.
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub host: String,
    pub port: u16,
    pub transport: TransportKind,
    pub client_id: String,
    pub keep_alive: Duration,
    pub retry_period: Duration,
    pub connect_timeout: Duration,
    pub credentials: Option<Credentials>,
}

/// One district and its streets, in the order they are simulated.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DistrictSettings {
    pub name: String,
    pub streets: Vec<String>,
}

/// Configuration settings for the simulated city.
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    /// Initial pause between two cycles of a street.
    pub time_sleep: Duration,
    pub sensors: Vec<String>,
    pub districts: Vec<DistrictSettings>,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values are filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub broker: Option<PartialBrokerSettings>,
    pub simulation: Option<PartialSimulationSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub transport: Option<String>,
    pub client_id: Option<String>,
    pub keep_alive_secs: Option<u64>,
    pub retry_period_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialSimulationSettings {
    pub time_sleep: Option<f64>,
    pub sensors: Option<Vec<String>>,
    pub districts: Option<Vec<DistrictSettings>>,
}

/// Provides default values for `Settings`.
///
/// A local broker on the standard MQTT port, one reading per second and a
/// small two-district city covering every built-in sensor kind.
impl Default for Settings {
    fn default() -> Self {
        Self {
            broker: BrokerSettings {
                host: "127.0.0.1".to_string(),
                port: 1883,
                transport: TransportKind::Mqtt,
                client_id: format!("smartcity-sim-{}", uuid::Uuid::new_v4().simple()),
                keep_alive: Duration::from_secs(30),
                retry_period: Duration::from_secs(5),
                connect_timeout: Duration::from_secs(10),
                credentials: None,
            },
            simulation: SimulationSettings {
                time_sleep: Duration::from_secs(1),
                sensors: [
                    "temperature",
                    "humidity",
                    "noise",
                    "traffic",
                    "pm25",
                    "pm10",
                    "co",
                    "no2",
                    "o3",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                districts: vec![
                    DistrictSettings {
                        name: "centro".to_string(),
                        streets: vec!["via_roma".to_string(), "via_garibaldi".to_string()],
                    },
                    DistrictSettings {
                        name: "nord".to_string(),
                        streets: vec!["corso_francia".to_string()],
                    },
                ],
            },
        }
    }
}
