//! Loader for scraper configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. built-in defaults ([`NhlConfig::default`])
//! 2. YAML files and inline snippets, in the order they were added
//! 3. `NHL_`-prefixed environment variables, `__` separating nested keys
//!    (`NHL_RATE_LIMIT__QPS=2.5`, `NHL_CONCURRENCY=4`)
//!
//! String values may reference the environment as `${VAR}`; references are
//! expanded recursively after merging.
//!
//! ```yaml
//! concurrency: 4
//! rate_limit: { qps: 3.0, burst: 6 }
//! http: { timeout_secs: 20, max_retries: 3 }
//! merge: { tolerance_secs: 2 }
//! logging: { format: json, filter: "nhl_scraper=debug", dir: "${HOME}/logs" }
//! ```
use config::{Config, Environment, File, FileFormat};
pub use config::ConfigError;
use nhl_common::observability::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "NHL";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NhlConfig {
    pub http: HttpSettings,
    pub rate_limit: RateLimitSettings,
    /// Maximum identifiers scraped at once by batch operations.
    pub concurrency: usize,
    pub endpoints: Endpoints,
    pub merge: MergeSettings,
    pub logging: LoggingSettings,
}

impl Default for NhlConfig {
    fn default() -> Self {
        Self {
            http: HttpSettings::default(),
            rate_limit: RateLimitSettings::default(),
            concurrency: 8,
            endpoints: Endpoints::default(),
            merge: MergeSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl NhlConfig {
    /// Render the configuration as YAML, e.g. to seed a config file.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Message(e.to_string()))
    }

    fn validate(mut self) -> Result<Self, ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Message("concurrency must be at least 1".into()));
        }
        if self.rate_limit.burst == 0 {
            return Err(ConfigError::Message("rate_limit.burst must be at least 1".into()));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Message("http.timeout_secs must be positive".into()));
        }
        self.endpoints = self.endpoints.with_trailing_slashes();
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_retries: usize,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            connect_timeout_secs: 5,
            max_retries: 2,
            user_agent: concat!("nhl-scraper/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

/// Token bucket shared by every upstream host. `qps <= 0` disables it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub qps: f64,
    pub burst: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self { qps: 5.0, burst: 10 }
    }
}

/// Base URLs of the upstream families.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Endpoints {
    pub api_web: String,
    pub stats: String,
    pub records: String,
    pub reports: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_web: "https://api-web.nhle.com/v1/".into(),
            stats: "https://api.nhle.com/stats/rest/en/".into(),
            records: "https://records.nhl.com/site/api/".into(),
            reports: "https://www.nhl.com/scores/htmlreports/".into(),
        }
    }
}

impl Endpoints {
    /// Every family served from one host, keeping the upstream path layout.
    ///
    /// ```
    /// let e = nhl_config::Endpoints::all_at("http://127.0.0.1:8080");
    /// assert_eq!(e.api_web, "http://127.0.0.1:8080/v1/");
    /// assert_eq!(e.reports, "http://127.0.0.1:8080/scores/htmlreports/");
    /// ```
    pub fn all_at(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        Self {
            api_web: format!("{host}/v1/"),
            stats: format!("{host}/stats/rest/en/"),
            records: format!("{host}/site/api/"),
            reports: format!("{host}/scores/htmlreports/"),
        }
    }

    fn with_trailing_slashes(self) -> Self {
        fn slash(mut s: String) -> String {
            if !s.ends_with('/') {
                s.push('/');
            }
            s
        }
        Self {
            api_web: slash(self.api_web),
            stats: slash(self.stats),
            records: slash(self.records),
            reports: slash(self.reports),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Largest clock difference at which an API play and a report row still match.
    pub tolerance_secs: u32,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self { tolerance_secs: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    pub filter: String,
    pub dir: Option<PathBuf>,
    pub stderr: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            filter: "info".into(),
            dir: None,
            stderr: false,
        }
    }
}

impl LoggingSettings {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
            ..LogConfig::default()
        }
    }
}

/// `<config dir>/nhl-scraper/nhl.yaml`, e.g. `~/.config/nhl-scraper/nhl.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nhl-scraper").join("nhl.yaml"))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring.
pub struct NhlConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for NhlConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl NhlConfigLoader {
    /// Start from defaults; the `NHL_` environment overlay is applied at load.
    ///
    /// ```
    /// use nhl_config::NhlConfigLoader;
    ///
    /// let config = NhlConfigLoader::new()
    ///     .with_yaml_str("concurrency: 3\nrate_limit:\n  qps: 1.5")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.concurrency, 3);
    /// assert_eq!(config.rate_limit.qps, 1.5);
    /// assert_eq!(config.rate_limit.burst, 10);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; the format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Attach [`default_config_path`] when the platform has a config dir.
    pub fn with_default_file(self) -> Self {
        match default_config_path() {
            Some(path) => self.with_optional_file(path),
            None => self,
        }
    }

    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` references and validate.
    ///
    /// ```
    /// use nhl_config::NhlConfigLoader;
    ///
    /// temp_env::with_var("NHL_TEST_LOGS", Some("/tmp/nhl-logs"), || {
    ///     let config = NhlConfigLoader::new()
    ///         .with_yaml_str("logging:\n  dir: \"${NHL_TEST_LOGS}/scraper\"")
    ///         .load()
    ///         .expect("valid configuration");
    ///     assert_eq!(
    ///         config.logging.dir.as_deref(),
    ///         Some(std::path::Path::new("/tmp/nhl-logs/scraper"))
    ///     );
    /// });
    /// ```
    pub fn load(self) -> Result<NhlConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: NhlConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("HOST", Some("records.nhl.com")), ("VER", Some("v1"))], || {
            let mut v = json!(["https://$HOST", { "path": "${VER}/draft" }, 42, true, null]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["https://records.nhl.com", { "path": "v1/draft" }, 42, true, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST_NHL}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST_NHL}"));
    }

    #[test]
    fn endpoints_gain_trailing_slashes() {
        let e = Endpoints {
            api_web: "http://x/v1".into(),
            ..Endpoints::default()
        }
        .with_trailing_slashes();
        assert_eq!(e.api_web, "http://x/v1/");
        assert_eq!(e.stats, Endpoints::default().stats);
    }

    #[test]
    fn logging_settings_map_onto_log_config() {
        let s = LoggingSettings {
            format: LogFormat::Json,
            filter: "debug".into(),
            dir: Some(PathBuf::from("/var/log/nhl")),
            stderr: true,
        };
        let lc = s.to_log_config();
        assert_eq!(lc.format, LogFormat::Json);
        assert_eq!(lc.default_filter, "debug");
        assert!(lc.emit_stderr);
        assert_eq!(lc.app_name, "nhl-scraper");
    }

    #[test]
    fn defaults_round_trip_through_yaml() {
        let yaml = NhlConfig::default().to_yaml().unwrap();
        assert!(yaml.contains("api-web.nhle.com"));
    }
}
