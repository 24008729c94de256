use std::fs;

use tempfile::TempDir;

use eveapi::{Api, CacheBackend, Config, ConfigManager, ErrorCachePolicy};

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    assert!(ConfigManager::validate_config(&config).is_ok());
    assert_eq!(config.cache.backend, CacheBackend::Memory);
}

#[test]
fn test_load_explicit_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("eveapi.toml");
    fs::write(
        &path,
        "[api]\nbase_host = \"api.testeveonline.com\"\n\n[cache]\nbackend = \"none\"\n",
    )
    .unwrap();

    let config = ConfigManager::load_from_file(&path).unwrap();
    assert_eq!(config.api.base_host, "api.testeveonline.com");
    assert_eq!(config.cache.backend, CacheBackend::None);
    assert_eq!(config.network.timeout_seconds, 60);
}

#[test]
fn test_api_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.api.base_host = "api.testeveonline.com".to_string();
    config.api.key_id = Some(123);
    config.api.vcode = Some("abc".to_string());
    config.api.cache_errors = false;
    config.cache.backend = CacheBackend::Tiered;
    config.cache.directory = temp_dir.path().to_path_buf();

    let api = Api::from_config(&config).unwrap();
    assert_eq!(api.base_host(), "api.testeveonline.com");
    assert_eq!(api.api_key().map(|k| k.key_id), Some(123));
    assert_eq!(api.last_timestamps(), None);
    assert_eq!(api.error_policy(), ErrorCachePolicy::Skip);

    // The tiered backend writes through to the configured directory
    api.cache().put("probe", "body", 60).unwrap();
    assert!(temp_dir.path().join("metadata").join("probe.json").exists());

    let debug = format!("{:?}", api);
    assert!(!debug.contains("abc"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("eveapi.json");
    fs::write(&path, r#"{ "network": { "timeout_seconds": 0 } }"#).unwrap();

    let config = ConfigManager::load_from_file(&path).unwrap();
    assert!(ConfigManager::validate_config(&config).is_err());
}
