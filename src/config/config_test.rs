use serial_test::serial;
use temp_env::with_vars;

use super::*;

fn cleanup_all_redwire_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("REDWIRE__") || key == "REDWIRE_CONFIG" {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let settings = Settings::default();

    assert!(settings.wireless.use_player_specific_channels);
    assert!(!settings.wireless.compatibility_mode);
    assert_eq!(settings.cache.transmitter_location_capacity, 500);
    assert_eq!(settings.cache.transmitter_location_idle_secs, 300);
    assert_eq!(settings.cache.network_capacity, 1000);
    assert_eq!(settings.cache.network_idle_secs, 2400);
    assert_eq!(settings.cache.receiver_validity_secs, 300);
    assert_eq!(settings.storage.data_dir.to_str(), Some("data"));
}

#[test]
#[serial]
fn new_should_merge_environment_overrides() {
    cleanup_all_redwire_env_vars();
    with_vars(
        vec![("REDWIRE__WIRELESS__COMPATIBILITY_MODE", Some("true"))],
        || {
            let settings = Settings::new().unwrap();

            assert!(settings.wireless.compatibility_mode);
            // untouched sections keep their defaults
            assert_eq!(settings.cache.network_capacity, 1000);
        },
    );
}

#[test]
#[serial]
fn with_override_config_should_merge_file_settings() {
    cleanup_all_redwire_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("dynamic_config.toml");

    std::fs::write(
        &config_path,
        r#"
        [wireless]
        use_player_specific_channels = false

        [storage]
        data_dir = "/tmp/redwire/data"
        "#,
    )
    .unwrap();

    let base = Settings::default();
    let settings = base
        .with_override_config(config_path.to_str().unwrap())
        .unwrap();

    assert!(!settings.wireless.use_player_specific_channels);
    assert_eq!(
        settings.storage.data_dir.to_str(),
        Some("/tmp/redwire/data")
    );
    // sections the file does not touch survive unchanged
    assert_eq!(settings.cache.transmitter_location_capacity, 500);
}

#[test]
fn validation_should_reject_zero_cache_capacity() {
    let mut settings = Settings::default();
    settings.cache.network_capacity = 0;

    assert!(settings.validate().is_err());
}

#[test]
fn validation_should_reject_zero_idle_windows() {
    let mut settings = Settings::default();
    settings.cache.network_idle_secs = 0;

    assert!(settings.validate().is_err());
}

#[test]
fn validation_should_reject_empty_data_dir() {
    let mut settings = Settings::default();
    settings.storage.data_dir = std::path::PathBuf::new();

    assert!(settings.validate().is_err());
}

#[test]
fn receiver_files_dir_should_nest_below_the_data_dir() {
    let settings = Settings::default();

    assert_eq!(
        settings.storage.receiver_files_dir().to_str(),
        Some("data/receiverFiles")
    );
}
