#![allow(dead_code)]

use std::sync::OnceLock;

use nhl_common::observability::{LogConfig, LogFormat};
use nhl_config::{Endpoints, HttpSettings, NhlConfig, RateLimitSettings};
use nhl_scraper::NhlScraper;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub const PBP_JSON: &str = include_str!("fixtures/pbp_2023020204.json");
pub const SHIFTS_JSON: &str = include_str!("fixtures/shiftcharts_2023020204.json");
pub const PL_HTML: &str = include_str!("fixtures/PL020204.HTM");
pub const TH_HTML: &str = include_str!("fixtures/TH020204.HTM");
pub const TV_HTML: &str = include_str!("fixtures/TV020204.HTM");

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let log_dir = tempfile::Builder::new()
            .prefix("nhl-scraper-tests")
            .tempdir()
            .map(|d| d.keep())
            .ok();
        let config = LogConfig {
            app_name: "nhl-scraper-tests",
            log_dir,
            emit_stderr: true,
            format: if std::env::var("NHL_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };

        nhl_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// Scraper pointed at `server` with retries and rate limiting off.
pub fn scraper_for(server: &MockServer) -> NhlScraper {
    init_test_tracing();
    let config = NhlConfig {
        endpoints: Endpoints::all_at(&server.uri()),
        http: HttpSettings {
            max_retries: 0,
            ..HttpSettings::default()
        },
        rate_limit: RateLimitSettings { qps: 0.0, burst: 1 },
        concurrency: 2,
        ..NhlConfig::default()
    };
    NhlScraper::new(&config).expect("scraper")
}

pub async fn mount_json(server: &MockServer, at: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_raw_json(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "application/json"))
        .mount(server)
        .await;
}

pub async fn mount_html(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html"))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, at: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
