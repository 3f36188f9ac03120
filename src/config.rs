//! Runtime configuration from a TOML secrets file and the environment

use crate::{
    auth::PasswordGate,
    error::{SearchError, SearchResult},
    providers::spaceserp::{SpaceSerpProvider, DEFAULT_BASE_URL},
    rate_limit::FixedInterval,
    types::SearchParams,
    utils::http::DEFAULT_TIMEOUT_MS,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Secrets file read when none is given explicitly
pub const DEFAULT_SECRETS_PATH: &str = "secrets.toml";
/// Overrides `api_key` from the secrets file
pub const API_KEY_ENV: &str = "SPACESERP_API_KEY";
/// Overrides `password` from the secrets file
pub const PASSWORD_ENV: &str = "SERP_EXPORT_PASSWORD";

/// Layout of the secrets file; every entry is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsFile {
    pub api_key: Option<String>,
    pub password: Option<String>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub delay_ms: Option<u64>,
    pub search: Option<SearchParams>,
}

impl SecretsFile {
    pub fn parse(text: &str) -> SearchResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn read(path: &Path) -> SearchResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SearchError::ConfigError(format!("Cannot read {}: {e}", path.display())))?;
        Self::parse(&text)
    }
}

/// Effective settings for one process
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub password: Option<String>,
    pub base_url: String,
    pub timeout_ms: u64,
    pub delay_ms: u64,
    pub search: SearchParams,
    /// Secrets file the values came from, if any
    pub source: Option<PathBuf>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"***")
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("delay_ms", &self.delay_ms)
            .field("search", &self.search)
            .field("source", &self.source)
            .finish()
    }
}

impl Config {
    /// Load from `path` (or `secrets.toml` if present) and the environment
    ///
    /// An explicit `path` must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> SearchResult<Self> {
        let (file, source) = match path {
            Some(path) => (SecretsFile::read(path)?, Some(path.to_path_buf())),
            None => {
                let default = Path::new(DEFAULT_SECRETS_PATH);
                if default.exists() {
                    (SecretsFile::read(default)?, Some(default.to_path_buf()))
                } else {
                    log::debug!("No {DEFAULT_SECRETS_PATH} found; using environment only");
                    (SecretsFile::default(), None)
                }
            }
        };

        let mut config = Self::resolve(file, |name| std::env::var(name).ok())?;
        config.source = source;
        Ok(config)
    }

    /// Merge a secrets file with environment lookups
    ///
    /// Non-empty environment values win over the file.
    pub fn resolve<E>(file: SecretsFile, env: E) -> SearchResult<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let from_env = |name: &str| env(name).filter(|value| !value.trim().is_empty());

        let api_key = from_env(API_KEY_ENV)
            .or(file.api_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                SearchError::ConfigError(format!(
                    "No API key configured; set `api_key` in {DEFAULT_SECRETS_PATH} or {API_KEY_ENV}"
                ))
            })?;

        let password = from_env(PASSWORD_ENV)
            .or(file.password)
            .filter(|password| !password.is_empty());

        Ok(Self {
            api_key,
            password,
            base_url: file.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_ms: file.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
            delay_ms: file.delay_ms.unwrap_or(0),
            search: file.search.unwrap_or_default(),
            source: None,
        })
    }

    pub fn provider(&self) -> SearchResult<SpaceSerpProvider> {
        Ok(SpaceSerpProvider::new(&self.api_key)?
            .with_base_url(&self.base_url)
            .with_params(self.search.clone())
            .with_timeout(self.timeout_ms)?)
    }

    pub fn rate_limiter(&self) -> FixedInterval {
        FixedInterval::from_millis(self.delay_ms)
    }

    /// The configured password gate, or `None` when no password is set
    pub fn gate(&self) -> SearchResult<Option<PasswordGate>> {
        self.password.as_deref().map(PasswordGate::new).transpose()
    }

    /// Key/value view with secrets masked
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "source",
                self.source
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "environment".to_string()),
            ),
            ("api_key", "***".to_string()),
            (
                "password",
                if self.password.is_some() { "***" } else { "(none)" }.to_string(),
            ),
            ("base_url", self.base_url.clone()),
            ("timeout_ms", self.timeout_ms.to_string()),
            ("delay_ms", self.delay_ms.to_string()),
            ("location", self.search.location.clone()),
            ("domain", self.search.domain.clone()),
            ("gl", self.search.country.clone()),
            ("hl", self.search.language.clone()),
            ("page_size", self.search.page_size.to_string()),
        ]
    }
}
