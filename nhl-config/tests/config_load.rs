use nhl_common::observability::LogFormat;
use nhl_config::{NhlConfig, NhlConfigLoader};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn file_values_override_defaults() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "nhl.yaml",
        r#"
concurrency: 2
http:
  timeout_secs: 30
  max_retries: 4
rate_limit:
  qps: 1.0
  burst: 2
endpoints:
  api_web: "http://localhost:9000/v1"
logging:
  format: json
  filter: "nhl_scraper=debug"
"#,
    );

    let config = NhlConfigLoader::new().with_file(p).load().expect("load config");

    assert_eq!(config.concurrency, 2);
    assert_eq!(config.http.timeout_secs, 30);
    assert_eq!(config.http.max_retries, 4);
    assert_eq!(config.http.connect_timeout_secs, 5);
    assert_eq!(config.rate_limit.burst, 2);
    assert_eq!(config.endpoints.api_web, "http://localhost:9000/v1/");
    assert_eq!(config.endpoints.stats, "https://api.nhle.com/stats/rest/en/");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.merge.tolerance_secs, 2);
}

#[test]
#[serial]
fn environment_overrides_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "nhl.yaml", "concurrency: 2\nrate_limit:\n  qps: 1.0\n");

    temp_env::with_vars(
        [
            ("NHL_CONCURRENCY", Some("6")),
            ("NHL_RATE_LIMIT__QPS", Some("2.5")),
            ("NHL_MERGE__TOLERANCE_SECS", Some("5")),
        ],
        || {
            let config = NhlConfigLoader::new().with_file(&p).load().expect("load config");
            assert_eq!(config.concurrency, 6);
            assert_eq!(config.rate_limit.qps, 2.5);
            assert_eq!(config.merge.tolerance_secs, 5);
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = NhlConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults");
    assert_eq!(config, NhlConfig::default());
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let err = NhlConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(err.is_err());
}

#[test]
#[serial]
fn zero_concurrency_is_rejected() {
    let err = NhlConfigLoader::new()
        .with_yaml_str("concurrency: 0")
        .load()
        .unwrap_err();
    assert!(err.to_string().contains("concurrency"));
}
