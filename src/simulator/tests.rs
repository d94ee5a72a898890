use super::*;
use crate::connection::Publisher;
use crate::control::RuntimeConfig;
use crate::sensors::{District, SensorCatalog, Topology};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn topology(districts: &[(&str, &[&str])], sensors: &[&str]) -> Topology {
    Topology::new(
        districts
            .iter()
            .map(|(name, streets)| District {
                name: name.to_string(),
                streets: streets.iter().map(|s| s.to_string()).collect(),
            })
            .collect(),
        &sensors.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        &SensorCatalog::builtin(),
    )
    .unwrap()
}

fn buffered_topics(publisher: &Publisher) -> Vec<String> {
    publisher
        .session()
        .buffer()
        .iter()
        .map(|m| m.topic.clone())
        .collect()
}

#[test]
fn cycle_emits_each_sensor_in_order() {
    let topology = topology(&[("centro", &["via_roma"])], &["temperature", "traffic", "o3"]);
    let publisher = Publisher::new();
    let mut street = StreetSimulator::new(
        "centro",
        "via_roma",
        Arc::new(topology.sensors().to_vec()),
        publisher.clone(),
        RuntimeConfig::new(Duration::from_secs(1)),
    )
    .with_seed(3);

    assert_eq!(street.run_cycle(), 3);
    assert_eq!(
        buffered_topics(&publisher),
        vec![
            "smartcity/centro/via_roma/temperature",
            "smartcity/centro/via_roma/traffic",
            "smartcity/centro/via_roma/o3",
        ]
    );

    let session = publisher.session();
    let readings: Vec<_> = session.buffer().iter().map(|m| &m.reading).collect();
    assert_eq!(readings[0].unit.as_deref(), Some("C"));
    assert!((15.0..=35.0).contains(&readings[0].value));
    assert_eq!(readings[1].unit.as_deref(), Some("km/h"));
    assert_eq!(readings[1].value.fract(), 0.0);
    assert_eq!(readings[2].unit.as_deref(), Some("ppb"));
    assert!(readings[0].timestamp > 0.0);
}

#[test]
fn seeded_streets_are_reproducible() {
    let sensors = Arc::new(topology(&[("a", &["b"])], &["noise", "pm10"]).sensors().to_vec());
    let runtime = RuntimeConfig::new(Duration::from_secs(1));

    let first = Publisher::new();
    let second = Publisher::new();
    StreetSimulator::new("a", "b", sensors.clone(), first.clone(), runtime.clone())
        .with_seed(11)
        .run_cycle();
    StreetSimulator::new("a", "b", sensors, second.clone(), runtime)
        .with_seed(11)
        .run_cycle();

    let values = |p: &Publisher| -> Vec<f64> {
        p.session().buffer().iter().map(|m| m.reading.value).collect()
    };
    assert_eq!(values(&first), values(&second));
}

#[tokio::test(start_paused = true)]
async fn sleep_interval_is_read_fresh_each_cycle() {
    let topology = topology(&[("centro", &["via_roma"])], &["temperature"]);
    let publisher = Publisher::new();
    let runtime = RuntimeConfig::new(Duration::from_secs(1));
    let cancel = CancellationToken::new();

    let street = StreetSimulator::new(
        "centro",
        "via_roma",
        Arc::new(topology.sensors().to_vec()),
        publisher.clone(),
        runtime.clone(),
    );
    let handle = tokio::spawn(street.run(cancel.clone()));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(publisher.buffered(), 1);

    // the sleep already in progress keeps its old length
    runtime.set_sleep_interval(Duration::from_secs(10));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(publisher.buffered(), 2);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(publisher.buffered(), 2);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(publisher.buffered(), 3);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn fleet_runs_one_loop_per_street_and_stops_together() {
    let topology = topology(
        &[("centro", &["via_roma", "via_po"]), ("nord", &["corso_francia"])],
        &["temperature", "humidity"],
    );
    let publisher = Publisher::new();
    let runtime = RuntimeConfig::new(Duration::from_secs(2));

    let fleet = Fleet::spawn(&topology, &publisher, &runtime, CancellationToken::new());
    assert_eq!(fleet.len(), 3);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(publisher.buffered(), 6);

    let topics: HashSet<String> = buffered_topics(&publisher).into_iter().collect();
    for street in ["centro/via_roma", "centro/via_po", "nord/corso_francia"] {
        for sensor in ["temperature", "humidity"] {
            assert!(topics.contains(&format!("smartcity/{street}/{sensor}")));
        }
    }

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(publisher.buffered(), 12);

    fleet.shutdown().await;
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(publisher.buffered(), 12);
}
