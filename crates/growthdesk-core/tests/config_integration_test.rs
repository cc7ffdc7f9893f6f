use growthdesk_core::{ConfigManager, Settings};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_empty_directory_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = ConfigManager::load_from_sources(dir.path(), "test").unwrap();
    let defaults = Settings::default();

    assert_eq!(settings.server.port, defaults.server.port);
    assert_eq!(settings.payments.trial_days, 7);
    assert_eq!(settings.payments.webhook_tolerance_secs, 300);
    assert_eq!(settings.email.api_base, "https://api.sendgrid.com");
    assert!(settings.validate().is_ok());
}

#[test]
fn test_environment_file_overrides_default_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        r#"
[server]
host = "127.0.0.1"
port = 8080

[email]
notify_email = "sales@shop.example"
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("production.toml"),
        r#"
[server]
host = "127.0.0.1"
port = 9090

[payments]
return_url_base = "https://shop.example"
"#,
    )
    .unwrap();

    let settings = ConfigManager::load_from_sources(dir.path(), "production").unwrap();
    assert_eq!(settings.server.port, 9090);
    assert_eq!(settings.email.notify_email, "sales@shop.example");
    assert_eq!(settings.payments.return_url_base, "https://shop.example");
    // untouched keys inside an overridden section keep their defaults
    assert_eq!(settings.payments.currency, "usd");
}

#[test]
fn test_local_overrides_win() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        "[logging]\nlevel = \"info\"\n",
    )
    .unwrap();
    fs::write(dir.path().join("local.toml"), "[logging]\nlevel = \"debug\"\n").unwrap();

    let settings = ConfigManager::load_from_sources(dir.path(), "development").unwrap();
    assert_eq!(settings.logging.level, "debug");
}

#[test]
fn test_invalid_file_fails_to_load() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("default.toml"), "[server]\nport = \"not-a-port\"\n").unwrap();

    assert!(ConfigManager::load_from_sources(dir.path(), "development").is_err());
}

#[test]
fn test_load_validates_and_records_env() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("staging.toml"),
        "[payments]\ncurrency = \"eur\"\n",
    )
    .unwrap();

    let settings =
        ConfigManager::load(Some(dir.path().to_path_buf()), Some("staging".into())).unwrap();
    assert_eq!(settings.env, "staging");
    assert_eq!(settings.payments.currency, "eur");

    fs::write(
        dir.path().join("broken.toml"),
        "[payments]\ncurrency = \"euros\"\n",
    )
    .unwrap();
    assert!(ConfigManager::load(Some(dir.path().to_path_buf()), Some("broken".into())).is_err());
}
