//! CLI for the smart-city simulator
//!
//! Subcommands:
//! - `run`: connect to the broker and simulate every street until Ctrl-C
//! - `check`: validate the configuration and print the topology

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use smartcity_sim::config::{Settings, load_config};
use smartcity_sim::connection::{ConnectionManager, Publisher};
use smartcity_sim::control::{ControlListener, RuntimeConfig};
use smartcity_sim::sensors::{SensorCatalog, Topology};
use smartcity_sim::simulator::Fleet;
use smartcity_sim::transport::{Endpoint, build_transport};
use smartcity_sim::utils::error::ConfigError;
use smartcity_sim::utils::logging;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "smartcity-sim")]
enum Command {
    /// Run the simulator
    Run {
        /// TOML configuration file (default: config/default.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Log level: error, warn, info, debug or trace
        #[arg(long, default_value = "info")]
        log_level: String,
    },
    /// Validate the configuration and print the topology
    Check {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cmd = Command::parse();

    let result = match cmd {
        Command::Run { config, log_level } => {
            logging::init(&log_level);
            run(config).await
        }
        Command::Check { config } => {
            logging::init("warn");
            check(config)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Configuration error: {e}");
            eprintln!("Configuration error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load(path: Option<PathBuf>) -> Result<(Settings, Topology), ConfigError> {
    let settings = load_config(path.as_deref())?;
    let topology = Topology::from_settings(&settings.simulation, &SensorCatalog::builtin())?;
    Ok((settings, topology))
}

fn check(path: Option<PathBuf>) -> Result<(), ConfigError> {
    let (settings, topology) = load(path)?;

    println!(
        "broker: {}:{} via {:?}",
        settings.broker.host, settings.broker.port, settings.broker.transport
    );
    for district in topology.districts() {
        println!("{}: {} streets", district.name, district.streets.len());
    }
    println!(
        "{} streets, sensors: {}",
        topology.street_count(),
        topology.sensor_kinds().collect::<Vec<_>>().join(", ")
    );
    Ok(())
}

async fn run(path: Option<PathBuf>) -> Result<(), ConfigError> {
    let (settings, topology) = load(path)?;

    for district in topology.districts() {
        info!(
            "District {} with {} streets",
            district.name,
            district.streets.len()
        );
    }

    let transport = build_transport(settings.broker.transport);
    let endpoint = Endpoint::from_settings(&settings.broker);
    info!(
        "Using {} transport towards {}",
        transport.name(),
        endpoint.address()
    );

    let publisher = Publisher::new();
    let runtime = RuntimeConfig::new(settings.simulation.time_sleep);
    let manager = Arc::new(ConnectionManager::new(
        transport,
        endpoint,
        publisher.clone(),
        ControlListener::new(runtime.clone()),
        settings.broker.retry_period,
    ));

    let cancel = CancellationToken::new();
    let connection = tokio::spawn({
        let manager = manager.clone();
        let cancel = cancel.clone();
        async move { manager.reconnect_loop(cancel).await }
    });

    let fleet = Fleet::spawn(&topology, &publisher, &runtime, cancel.child_token());

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received. Exiting gracefully.");

    cancel.cancel();
    fleet.shutdown().await;
    if let Err(e) = connection.await {
        error!("Connection manager task failed: {e}");
    }

    Ok(())
}
