//! Where configuration and user symbol maps come from
//!
//! A `ConfigSource` is polled by the host outside the frame. Sources are
//! lenient about individual keys but report transport and syntax failures
//! as errors so the caller can keep its last-known-good values.

use drizzle_core::{DrizzleError, OverlayConfig, Result, UserSymbolMap};
use drizzle_runtime::parse_user_symbols;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

const REQUEST_TIMEOUT_SECS: u64 = 5;
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_MS: u64 = 250;

/// A provider of configuration snapshots
pub trait ConfigSource {
    /// Human-readable name for logs
    fn name(&self) -> &str;

    fn fetch_config(&self) -> Result<OverlayConfig>;

    fn fetch_user_symbols(&self) -> Result<UserSymbolMap>;
}

/// Build a configuration from a JSON value, logging dropped keys
fn config_from_json(value: &Value, origin: &str) -> Result<OverlayConfig> {
    if !value.is_object() {
        return Err(DrizzleError::ConfigError(format!(
            "{origin}: configuration must be an object"
        )));
    }
    let (config, dropped) = OverlayConfig::from_json_lenient(value);
    for key in dropped {
        warn!(key = %key, origin = %origin, "ignoring malformed configuration value");
    }
    Ok(config)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Reads configuration from local files. TOML unless the extension is `.json`.
pub struct FileSource {
    config_path: PathBuf,
    symbols_path: Option<PathBuf>,
    name: String,
}

impl FileSource {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        let name = format!("file:{}", config_path.display());
        Self {
            config_path,
            symbols_path: None,
            name,
        }
    }

    pub fn with_user_symbols(mut self, path: impl Into<PathBuf>) -> Self {
        self.symbols_path = Some(path.into());
        self
    }

    fn read_value(path: &Path) -> Result<Value> {
        let text = std::fs::read_to_string(path)?;
        if is_json(path) {
            Ok(serde_json::from_str(&text)?)
        } else {
            let table: toml::Value = toml::from_str(&text)?;
            Ok(serde_json::to_value(table)?)
        }
    }
}

impl ConfigSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_config(&self) -> Result<OverlayConfig> {
        let value = Self::read_value(&self.config_path)?;
        config_from_json(&value, &self.name)
    }

    fn fetch_user_symbols(&self) -> Result<UserSymbolMap> {
        match &self.symbols_path {
            Some(path) => Ok(parse_user_symbols(&Self::read_value(path)?)),
            None => Ok(UserSymbolMap::new()),
        }
    }
}

/// Fetches configuration from an HTTP service:
/// `GET <base>/config` and `GET <base>/user-mappings`, both JSON.
pub struct HttpSource {
    base_url: String,
    name: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let name = format!("http:{base_url}");
        Self { base_url, name }
    }

    pub fn config_url(&self) -> String {
        format!("{}/config", self.base_url)
    }

    pub fn user_mappings_url(&self) -> String {
        format!("{}/user-mappings", self.base_url)
    }

    fn get_json_with_retry(&self, url: &str) -> Result<Value> {
        for attempt in 0..MAX_RETRIES {
            let agent = build_agent();
            let response = agent.get(url).header("Accept", "application/json").call();

            match response {
                Ok(mut ok) => {
                    return ok.body_mut().read_json().map_err(|e| {
                        DrizzleError::FetchError(format!("Invalid JSON from {}: {}", url, e))
                    });
                }
                Err(e) => {
                    if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(DrizzleError::FetchError(format!(
                        "GET {} failed: {}",
                        url, e
                    )));
                }
            }
        }

        Err(DrizzleError::FetchError(format!(
            "GET {} failed after retries",
            url
        )))
    }
}

impl ConfigSource for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_config(&self) -> Result<OverlayConfig> {
        let value = self.get_json_with_retry(&self.config_url())?;
        config_from_json(&value, &self.name)
    }

    fn fetch_user_symbols(&self) -> Result<UserSymbolMap> {
        let value = self.get_json_with_retry(&self.user_mappings_url())?;
        // Accept either a bare map or `{ "mappings": { ... } }`
        let mappings = value.get("mappings").unwrap_or(&value);
        Ok(parse_user_symbols(mappings))
    }
}

fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .build();
    config.into()
}

fn is_retryable_error(e: &ureq::Error) -> bool {
    match e {
        ureq::Error::Timeout(_)
        | ureq::Error::Io(_)
        | ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound => true,
        ureq::Error::StatusCode(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
        _ => false,
    }
}

fn sleep_backoff(attempt: usize) {
    let delay_ms = RETRY_BASE_DELAY_MS.saturating_mul(1u64 << attempt);
    std::thread::sleep(Duration::from_millis(delay_ms));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "drizzle_source_test_{}_{}",
            std::process::id(),
            name
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_toml_file() {
        let dir = temp_dir("toml");
        let path = dir.join("overlay.toml");
        std::fs::write(
            &path,
            "floor_enabled = false\nmax_emojis_on_screen = 50\ncolor_mode = \"neon\"\n",
        )
        .unwrap();

        let config = FileSource::new(&path).fetch_config().unwrap();
        assert!(!config.floor_enabled);
        assert_eq!(config.max_emojis_on_screen, 50);
        assert_eq!(config.emoji_lifetime_ms, 8000);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_json_file_with_bad_key() {
        let dir = temp_dir("json");
        let path = dir.join("overlay.json");
        std::fs::write(&path, r#"{ "physics_gravity_y": 2.0, "target_fps": "fast" }"#).unwrap();

        let config = FileSource::new(&path).fetch_config().unwrap();
        assert!((config.physics_gravity_y - 2.0).abs() < 1e-6);
        assert_eq!(config.target_fps, 60.0);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_and_broken_files_error() {
        let dir = temp_dir("broken");
        assert!(FileSource::new(dir.join("nope.toml")).fetch_config().is_err());

        let path = dir.join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(FileSource::new(&path).fetch_config().is_err());

        let path = dir.join("array.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(FileSource::new(&path).fetch_config().is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_user_symbols_file() {
        let dir = temp_dir("symbols");
        let config_path = dir.join("overlay.toml");
        std::fs::write(&config_path, "").unwrap();
        let symbols_path = dir.join("users.json");
        std::fs::write(&symbols_path, r#"{ "Carol": "🐙", "broken": 7 }"#).unwrap();

        let source = FileSource::new(&config_path).with_user_symbols(&symbols_path);
        let loaded = source.fetch_user_symbols().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.resolve("carol"), Some("🐙"));
        assert!(FileSource::new(&config_path).fetch_user_symbols().unwrap().is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_http_urls() {
        let source = HttpSource::new("http://localhost:3210/api/");
        assert_eq!(source.config_url(), "http://localhost:3210/api/config");
        assert_eq!(source.user_mappings_url(), "http://localhost:3210/api/user-mappings");
        assert_eq!(source.name(), "http:http://localhost:3210/api");
    }

    #[test]
    fn test_unreachable_http_is_fetch_error() {
        // Port 9 (discard) on localhost is closed on typical hosts
        let source = HttpSource::new("http://127.0.0.1:9");
        match source.fetch_config() {
            Err(DrizzleError::FetchError(_)) => {}
            other => panic!("expected fetch error, got {other:?}"),
        }
    }
}
