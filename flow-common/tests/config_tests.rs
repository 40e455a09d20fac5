//! Integration tests for config file resolution and graceful degradation
//!
//! Tests that manipulate FLOW_CONFIG are marked with #[serial] so they run
//! sequentially, not in parallel.

use flow_common::config::{ConfigResolver, FailurePolicy, TomlConfig, CONFIG_ENV_VAR};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_cli_path_takes_priority_over_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/flow-env-config.toml");

    let resolver = ConfigResolver::new(Some(PathBuf::from("/tmp/flow-cli-config.toml")));
    assert_eq!(resolver.resolve(), Some(PathBuf::from("/tmp/flow-cli-config.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_path() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/flow-env-config.toml");

    let resolver = ConfigResolver::new(None);
    assert_eq!(resolver.resolve(), Some(PathBuf::from("/tmp/flow-env-config.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_load_from_resolved_file() {
    let file = write_config(
        r#"
        [logging]
        level = "debug"

        [enrichment]
        musicbrainz_url = "http://127.0.0.1:9000/ws/2"
        musicbrainz_spacing_ms = 0
        on_failure = "abort"

        [sequencing]
        strategy = "embedding"
        coarse_banding = false
        "#,
    );

    let resolver = ConfigResolver::new(Some(file.path().to_path_buf()));
    let config = TomlConfig::load_or_default(&resolver);

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.enrichment.musicbrainz_url, "http://127.0.0.1:9000/ws/2");
    assert_eq!(config.enrichment.musicbrainz_spacing_ms, 0);
    assert_eq!(config.enrichment.on_failure, FailurePolicy::Abort);
    assert_eq!(config.sequencing.strategy, "embedding");
    assert!(!config.sequencing.coarse_banding);
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    // Given: a config path that does not exist
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    // When: loading with graceful degradation
    let config = TomlConfig::load_or_default(&ConfigResolver::new(Some(missing)));

    // Then: compiled defaults, no error
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_malformed_file_falls_back_to_defaults() {
    let file = write_config("[sequencing\nstrategy = ");

    let config = TomlConfig::load_or_default(&ConfigResolver::new(Some(file.path().to_path_buf())));
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_strict_load_reports_parse_errors() {
    let file = write_config("[sequencing]\nchunk_size = \"thirty\"\n");
    assert!(TomlConfig::load(file.path()).is_err());
}

#[test]
fn test_serialized_config_round_trips_through_file() {
    let mut config = TomlConfig::default();
    config.sequencing.separate_authors = true;
    config.sequencing.band_width = 0.2;

    let text = toml::to_string(&config).unwrap();
    let file = write_config(&text);

    let loaded = TomlConfig::load(file.path()).unwrap();
    assert_eq!(loaded, config);
}
