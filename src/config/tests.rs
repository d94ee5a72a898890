use super::settings::{Settings, TransportKind};
use super::*;
use serial_test::serial;
use std::env;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

const DEPLOYMENT_VARS: [(&str, Option<&str>); 3] = [
    ("MQTT_BROKER", None),
    ("MQTT_USER", None),
    ("MQTT_PASSWORD", None),
];

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.broker.host, "127.0.0.1");
    assert_eq!(settings.broker.port, 1883);
    assert_eq!(settings.broker.transport, TransportKind::Mqtt);
    assert_eq!(settings.broker.retry_period, Duration::from_secs(5));
    assert!(settings.broker.credentials.is_none());
    assert!(settings.broker.client_id.starts_with("smartcity-sim-"));
    assert_eq!(settings.simulation.time_sleep, Duration::from_secs(1));
    assert_eq!(settings.simulation.sensors.len(), 9);
    assert_eq!(settings.simulation.districts[0].name, "centro");
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("city.toml");
    let toml = r#"
        [broker]
        host = "broker.local"
        port = 8080
        transport = "websocket"
        retry_period_secs = 2
        username = "sim"
        password = "secret"

        [simulation]
        time_sleep = 0.5
        sensors = ["temperature", "noise"]

        [[simulation.districts]]
        name = "centro"
        streets = ["via_roma"]

        [[simulation.districts]]
        name = "porto"
        streets = ["molo_nord", "molo_sud"]
    "#;
    fs::write(&path, toml).expect("write config file");

    let cfg = temp_env::with_vars(DEPLOYMENT_VARS, || load_config(Some(&path)))
        .expect("load_config failed");
    assert_eq!(cfg.broker.host, "broker.local");
    assert_eq!(cfg.broker.port, 8080);
    assert_eq!(cfg.broker.transport, TransportKind::WebSocket);
    assert_eq!(cfg.broker.retry_period, Duration::from_secs(2));
    assert_eq!(cfg.broker.keep_alive, Duration::from_secs(30));
    let creds = cfg.broker.credentials.expect("credentials from file");
    assert_eq!(creds.username, "sim");
    assert_eq!(creds.password, "secret");
    assert_eq!(cfg.simulation.time_sleep, Duration::from_millis(500));
    assert_eq!(cfg.simulation.sensors, vec!["temperature", "noise"]);
    assert_eq!(cfg.simulation.districts.len(), 2);
    assert_eq!(cfg.simulation.districts[1].streets, vec!["molo_nord", "molo_sud"]);
}

#[test]
#[serial]
fn load_config_picks_up_default_file_in_cwd() {
    // load_config with no path looks for config/default.* relative to cwd
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    fs::write("config/default.toml", "[broker]\nport = 1999\n").expect("write config file");

    let cfg = temp_env::with_vars(DEPLOYMENT_VARS, || load_config(None));

    // restore cwd
    env::set_current_dir(orig).expect("restore cwd");

    let cfg = cfg.expect("load_config failed");
    assert_eq!(cfg.broker.port, 1999);
    assert_eq!(cfg.broker.host, "127.0.0.1");
}

#[test]
#[serial]
fn environment_overrides_file() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("city.toml");
    fs::write(&path, "[broker]\nport = 1884\n").expect("write config file");

    let cfg = temp_env::with_vars(
        [
            ("SMARTCITY__BROKER__PORT", Some("1885")),
            ("SMARTCITY__SIMULATION__TIME_SLEEP", Some("3")),
            ("MQTT_BROKER", None),
            ("MQTT_USER", None),
            ("MQTT_PASSWORD", None),
        ],
        || load_config(Some(&path)),
    )
    .expect("load_config failed");

    assert_eq!(cfg.broker.port, 1885);
    assert_eq!(cfg.simulation.time_sleep, Duration::from_secs(3));
}

#[test]
#[serial]
fn deployment_env_sets_host_and_credentials() {
    let settings = temp_env::with_vars(
        [
            ("MQTT_BROKER", Some("mosquitto")),
            ("MQTT_USER", Some("city")),
            ("MQTT_PASSWORD", Some("hunter2")),
        ],
        || apply_deployment_env(Settings::default()),
    );

    assert_eq!(settings.broker.host, "mosquitto");
    assert_eq!(
        settings.broker.credentials,
        Some(Credentials {
            username: "city".to_string(),
            password: "hunter2".to_string(),
        })
    );
}

#[test]
#[serial]
fn deployment_env_needs_both_user_and_password() {
    let settings = temp_env::with_vars(
        [
            ("MQTT_BROKER", None),
            ("MQTT_USER", Some("city")),
            ("MQTT_PASSWORD", None::<&str>),
        ],
        || apply_deployment_env(Settings::default()),
    );

    assert_eq!(settings.broker.host, "127.0.0.1");
    assert!(settings.broker.credentials.is_none());
}

#[test]
#[serial]
fn unknown_transport_is_rejected() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("city.toml");
    fs::write(&path, "[broker]\ntransport = \"carrier-pigeon\"\n").expect("write config file");

    let err = temp_env::with_vars(DEPLOYMENT_VARS, || load_config(Some(&path))).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownTransport(name) if name == "carrier-pigeon"));
}

#[test]
#[serial]
fn negative_time_sleep_is_rejected() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("city.toml");
    fs::write(&path, "[simulation]\ntime_sleep = -1.0\n").expect("write config file");

    let err = temp_env::with_vars(DEPLOYMENT_VARS, || load_config(Some(&path))).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSleepInterval(v) if v == -1.0));
}

#[test]
#[serial]
fn oversized_time_sleep_is_rejected() {
    let err = temp_env::with_vars(
        [
            ("SMARTCITY__SIMULATION__TIME_SLEEP", Some("1e20")),
            ("MQTT_BROKER", None),
            ("MQTT_USER", None),
            ("MQTT_PASSWORD", None),
        ],
        || load_config(None),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSleepInterval(v) if v == 1e20));

    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("city.toml");
    fs::write(&path, "[simulation]\ntime_sleep = 1e20\n").expect("write config file");

    let err = temp_env::with_vars(DEPLOYMENT_VARS, || load_config(Some(&path))).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSleepInterval(v) if v == 1e20));
}

#[test]
#[serial]
fn zero_retry_period_is_rejected() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("city.toml");
    fs::write(&path, "[broker]\nretry_period_secs = 0\n").expect("write config file");

    let err = temp_env::with_vars(DEPLOYMENT_VARS, || load_config(Some(&path))).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRetryPeriod));

    let err = temp_env::with_vars(
        [
            ("SMARTCITY__BROKER__RETRY_PERIOD_SECS", Some("0")),
            ("MQTT_BROKER", None),
            ("MQTT_USER", None),
            ("MQTT_PASSWORD", None),
        ],
        || load_config(None),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRetryPeriod));
}

#[test]
#[serial]
fn missing_explicit_file_is_an_error() {
    let err = load_config(Some(Path::new("/nonexistent/smartcity.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}

#[test]
fn credentials_debug_hides_password() {
    let creds = Credentials {
        username: "city".to_string(),
        password: "hunter2".to_string(),
    };
    let shown = format!("{creds:?}");
    assert!(shown.contains("city"));
    assert!(!shown.contains("hunter2"));
}
