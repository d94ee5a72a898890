//! Configuration loading.
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! `SMARTCITY__SECTION__KEY` environment variables. The deployment variables
//! `MQTT_BROKER`, `MQTT_USER` and `MQTT_PASSWORD` are applied last so a
//! container can point the simulator at its broker without a config file.

mod settings;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};

use crate::config::settings::PartialSettings;
use crate::utils::error::ConfigError;

pub use settings::{
    BrokerSettings, Credentials, DistrictSettings, Settings, SimulationSettings, TransportKind,
};

/// Loads the configuration from `path` (or the optional `config/default`
/// file) and from environment variables, merged over default values.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name("config/default").required(false),
    };

    let builder = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("SMARTCITY")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    let settings = merge(partial)?;
    Ok(apply_deployment_env(settings))
}

/// Fills every missing value of `partial` from `Settings::default()`.
fn merge(partial: PartialSettings) -> Result<Settings, ConfigError> {
    let default = Settings::default();
    let broker = partial.broker;
    let simulation = partial.simulation;

    let transport = match broker.as_ref().and_then(|b| b.transport.as_deref()) {
        Some(name) => parse_transport(name)?,
        None => default.broker.transport,
    };

    let credentials = broker.as_ref().and_then(|b| {
        match (b.username.clone(), b.password.clone()) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        }
    });

    let time_sleep = match simulation.as_ref().and_then(|s| s.time_sleep) {
        Some(secs) => Duration::try_from_secs_f64(secs)
            .map_err(|_| ConfigError::InvalidSleepInterval(secs))?,
        None => default.simulation.time_sleep,
    };

    let retry_period = broker
        .as_ref()
        .and_then(|b| b.retry_period_secs)
        .map(Duration::from_secs)
        .unwrap_or(default.broker.retry_period);
    if retry_period.is_zero() {
        return Err(ConfigError::InvalidRetryPeriod);
    }

    Ok(Settings {
        broker: BrokerSettings {
            host: broker
                .as_ref()
                .and_then(|b| b.host.clone())
                .unwrap_or(default.broker.host),
            port: broker
                .as_ref()
                .and_then(|b| b.port)
                .unwrap_or(default.broker.port),
            transport,
            client_id: broker
                .as_ref()
                .and_then(|b| b.client_id.clone())
                .unwrap_or(default.broker.client_id),
            keep_alive: broker
                .as_ref()
                .and_then(|b| b.keep_alive_secs)
                .map(Duration::from_secs)
                .unwrap_or(default.broker.keep_alive),
            retry_period,
            connect_timeout: broker
                .as_ref()
                .and_then(|b| b.connect_timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(default.broker.connect_timeout),
            credentials,
        },
        simulation: SimulationSettings {
            time_sleep,
            sensors: simulation
                .as_ref()
                .and_then(|s| s.sensors.clone())
                .unwrap_or(default.simulation.sensors),
            districts: simulation
                .as_ref()
                .and_then(|s| s.districts.clone())
                .unwrap_or(default.simulation.districts),
        },
    })
}

fn parse_transport(name: &str) -> Result<TransportKind, ConfigError> {
    match name.to_lowercase().as_str() {
        "mqtt" => Ok(TransportKind::Mqtt),
        "websocket" | "ws" => Ok(TransportKind::WebSocket),
        _ => Err(ConfigError::UnknownTransport(name.to_string())),
    }
}

/// Applies `MQTT_BROKER`, `MQTT_USER` and `MQTT_PASSWORD`.
///
/// Credentials are only taken when both user and password are present.
pub fn apply_deployment_env(mut settings: Settings) -> Settings {
    if let Ok(host) = std::env::var("MQTT_BROKER") {
        if !host.is_empty() {
            settings.broker.host = host;
        }
    }

    if let (Ok(username), Ok(password)) =
        (std::env::var("MQTT_USER"), std::env::var("MQTT_PASSWORD"))
    {
        if !username.is_empty() && !password.is_empty() {
            settings.broker.credentials = Some(Credentials { username, password });
        }
    }

    settings
}
