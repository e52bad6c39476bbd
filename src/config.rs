use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_HEALTH_PATH: &str = "/ping";

/// Environment variable consulted for the backend base URL.
pub const BASE_URL_ENV: &str = "API_URL";

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_health_path")]
    pub health_path: String,
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_health_path() -> String {
    DEFAULT_HEALTH_PATH.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            health_path: default_health_path(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Full URL of the health endpoint, with exactly one `/` between base and path.
    pub fn health_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.health_path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
}

impl AppConfig {
    pub fn load_default() -> anyhow::Result<Self> {
        let default = include_str!("../config/default.toml");
        let cfg: AppConfig = toml::from_str(default)?;
        Ok(cfg)
    }

    pub fn load_from(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let p = path.into();
        let s = fs::read_to_string(&p)
            .with_context(|| format!("reading config {}", p.display()))?;
        let cfg: AppConfig =
            toml::from_str(&s).with_context(|| format!("parsing config {}", p.display()))?;
        Ok(cfg)
    }

    /// Apply the CLI flag and the `API_URL` environment variable on top of the file value.
    pub fn apply_overrides(&mut self, cli_base_url: Option<&str>) {
        let env_base_url = std::env::var(BASE_URL_ENV).ok();
        self.api.base_url = resolve_base_url(
            cli_base_url,
            env_base_url.as_deref(),
            Some(self.api.base_url.as_str()),
        );
    }
}

/// First non-empty of CLI, environment, config file; otherwise the local default.
pub fn resolve_base_url(cli: Option<&str>, env: Option<&str>, file: Option<&str>) -> String {
    [cli, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .to_string()
}
