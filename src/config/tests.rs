use super::builder::default_config_content;
use super::validation::validate_config;
use super::*;
use crate::constants::test_constants::*;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

fn write_config(dir: &std::path::Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("duskr.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_config_load_default_creation() {
    crate::logger::Log::set_enabled(false);
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("duskr").join("duskr.toml");

    let original = std::env::var("XDG_CONFIG_HOME").ok();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    let result = Config::load_default_for_test();

    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    let config = result.unwrap();
    assert!(config_path.exists());
    assert_eq!(config.location(), DEFAULT_LOCATION);
    assert_eq!(config.backend(), Backend::Auto);
}

impl Config {
    #[cfg(target_os = "linux")]
    fn load_default_for_test() -> anyhow::Result<Self> {
        Config::load()
    }

    #[cfg(not(target_os = "linux"))]
    fn load_default_for_test() -> anyhow::Result<Self> {
        // XDG_CONFIG_HOME only steers dirs::config_dir on Linux
        let dir = std::path::PathBuf::from(std::env::var("XDG_CONFIG_HOME")?).join("duskr");
        let path = dir.join("duskr.toml");
        create_default_config(&path)?;
        load_from_path(&path)
    }
}

#[test]
fn test_default_config_content_parses_and_validates() {
    let config: Config = toml::from_str(&default_config_content()).unwrap();
    assert!(validate_config(&config).is_ok());
    assert_eq!(config.location.as_deref(), Some(DEFAULT_LOCATION));
    assert_eq!(config.loop_delay, Some(DEFAULT_LOOP_DELAY));
    assert_eq!(config.check_interval, Some(DEFAULT_CHECK_INTERVAL));
    assert_eq!(config.solar_provider, Some(SolarProvider::Api));
    assert_eq!(config.backend, Some(Backend::Auto));
}

#[test]
fn test_default_config_comments_are_aligned() {
    let content = default_config_content();
    let columns: Vec<usize> = content
        .lines()
        .filter(|line| !line.starts_with('#') && !line.is_empty())
        .filter_map(|line| line.find('#'))
        .collect();

    assert!(!columns.is_empty());
    assert!(columns.iter().all(|&c| c == columns[0]));
}

#[test]
#[serial]
fn test_load_from_path_reads_custom_values() {
    crate::logger::Log::set_enabled(false);
    let temp_dir = tempdir().unwrap();
    let path = write_config(
        temp_dir.path(),
        &format!(
            r#"
location = "  {TEST_LOCATION}  "
sunrise_offset = "{TEST_SUNRISE_OFFSET}"
sunset_offset = "{TEST_SUNSET_OFFSET}"
loop_delay = 30
check_interval = 5
solar_provider = "local"
backend = "command"
light_command = "echo light"
dark_command = "echo dark"
solar_url = "http://localhost:8080/"
"#
        ),
    );

    let config = load_from_path(&path).unwrap();

    assert_eq!(config.location(), TEST_LOCATION);
    assert_eq!(config.loop_delay(), Duration::from_secs(30));
    assert_eq!(config.check_interval(), Duration::from_secs(5));
    assert_eq!(config.solar_provider(), SolarProvider::Local);
    assert_eq!(config.backend(), Backend::Command);
    assert_eq!(config.solar_url(), "http://localhost:8080");

    let offsets = config.offsets().unwrap();
    assert_eq!(offsets.sunrise, chrono::Duration::minutes(30));
    assert_eq!(offsets.sunset, chrono::Duration::minutes(-60));
}

#[test]
fn test_accessor_defaults() {
    let config = Config::default();

    assert_eq!(config.location(), DEFAULT_LOCATION);
    assert_eq!(config.loop_delay(), Duration::from_secs(DEFAULT_LOOP_DELAY));
    assert_eq!(
        config.check_interval(),
        Duration::from_secs(DEFAULT_CHECK_INTERVAL)
    );
    assert_eq!(config.probe_host(), DEFAULT_PROBE_HOST);
    assert_eq!(config.probe_retries(), DEFAULT_PROBE_RETRIES);
    assert_eq!(config.geocoding_url(), DEFAULT_GEOCODING_URL);
    assert_eq!(config.gtk_dark_theme(), GNOME_DARK_GTK_THEME);
    assert_eq!(config.offsets().unwrap(), crate::solar::Offsets::default());
    assert!(config.coordinates().unwrap().is_none());
}

#[test]
fn test_manual_coordinates() {
    let config = Config {
        latitude: Some(TEST_LATITUDE),
        longitude: Some(TEST_LONGITUDE),
        ..Default::default()
    };

    let coords = config.coordinates().unwrap().unwrap();
    assert_eq!(coords.latitude(), TEST_LATITUDE);
    assert_eq!(coords.longitude(), TEST_LONGITUDE);
}

#[test]
#[serial]
fn test_lone_coordinate_is_dropped() {
    crate::logger::Log::set_enabled(false);
    let temp_dir = tempdir().unwrap();
    let path = write_config(temp_dir.path(), "latitude = 52.0\n");

    let config = load_from_path(&path).unwrap();
    assert!(config.latitude.is_none());
    assert!(config.coordinates().unwrap().is_none());
}

#[test]
fn test_load_from_missing_path_fails() {
    let temp_dir = tempdir().unwrap();
    let result = load_from_path(&temp_dir.path().join("missing.toml"));
    assert!(result.unwrap_err().to_string().contains("not found"));
}

#[test]
fn test_malformed_toml_fails() {
    let temp_dir = tempdir().unwrap();
    let path = write_config(temp_dir.path(), "loop_delay = \"sixty\"\n");
    assert!(load_from_path(&path).is_err());
}

#[test]
fn test_unknown_backend_fails_to_parse() {
    let result: Result<Config, _> = toml::from_str("backend = \"kde\"\n");
    assert!(result.is_err());
}

#[test]
fn test_validation_rejects_out_of_range_timing() {
    let mut config = Config {
        loop_delay: Some(MINIMUM_LOOP_DELAY - 1),
        ..Default::default()
    };
    let err = validate_config(&config).unwrap_err().to_string();
    assert!(err.contains("loop_delay"));

    config.loop_delay = Some(MAXIMUM_LOOP_DELAY);
    assert!(validate_config(&config).is_ok());

    config.check_interval = Some(0);
    assert!(
        validate_config(&config)
            .unwrap_err()
            .to_string()
            .contains("check_interval")
    );

    config.check_interval = None;
    config.probe_timeout = Some(MAXIMUM_PROBE_TIMEOUT_MS + 1);
    assert!(
        validate_config(&config)
            .unwrap_err()
            .to_string()
            .contains("probe_timeout")
    );
}

#[test]
fn test_validation_rejects_bad_offsets() {
    for bad in ["12:30", "+13:00", "+01:60", "noon", ""] {
        let config = Config {
            sunset_offset: Some(bad.to_string()),
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("sunset_offset"), "{bad}: {err}");
    }

    let config = Config {
        sunrise_offset: Some("-12:00".to_string()),
        sunset_offset: Some("12:00".to_string()),
        ..Default::default()
    };
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_validation_rejects_bad_coordinates() {
    let config = Config {
        latitude: Some(91.0),
        longitude: Some(0.0),
        ..Default::default()
    };
    assert!(validate_config(&config).is_err());

    let config = Config {
        latitude: Some(0.0),
        longitude: Some(-180.5),
        ..Default::default()
    };
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_validation_command_backend_requires_commands() {
    let mut config = Config {
        backend: Some(Backend::Command),
        light_command: Some("echo light".to_string()),
        ..Default::default()
    };
    assert!(validate_config(&config).is_err());

    config.dark_command = Some("echo dark".to_string());
    assert!(validate_config(&config).is_ok());

    config.dark_command = Some("   ".to_string());
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_validation_rejects_bad_hosts_and_urls() {
    let config = Config {
        probe_host: Some("1.1.1.1".to_string()),
        ..Default::default()
    };
    assert!(validate_config(&config).is_err());

    let config = Config {
        geocoding_url: Some("nominatim.openstreetmap.org".to_string()),
        ..Default::default()
    };
    assert!(validate_config(&config).is_err());

    let config = Config {
        location: Some("  ".to_string()),
        ..Default::default()
    };
    assert!(validate_config(&config).is_err());
}
