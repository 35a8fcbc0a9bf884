use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::{ClientOptions, RetryPolicy, ScreenOptions, DEFAULT_API_BASE_URL};
use serde::Deserialize;
use shared::protocol::PageShape;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub page_size: u32,
    /// `0` disables the per-request timeout.
    pub request_timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    pub page_shape: PageShape,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            page_size: 5,
            request_timeout_secs: 10,
            retry_attempts: 3,
            retry_backoff_ms: 200,
            page_shape: PageShape::Auto,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    page_size: Option<u32>,
    request_timeout_secs: Option<u64>,
    retry_attempts: Option<u32>,
    retry_backoff_ms: Option<u64>,
    page_shape: Option<PageShape>,
}

impl Settings {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: (self.request_timeout_secs > 0)
                .then(|| Duration::from_secs(self.request_timeout_secs)),
            page_shape: self.page_shape,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let initial = Duration::from_millis(self.retry_backoff_ms);
        RetryPolicy {
            max_attempts: self.retry_attempts.max(1),
            initial_backoff: initial,
            max_backoff: initial.saturating_mul(8),
        }
    }

    pub fn screen_options(&self) -> ScreenOptions {
        ScreenOptions {
            page_size: self.page_size.max(1),
            retry: self.retry_policy(),
        }
    }

    fn apply_file(&mut self, raw: &str) -> Result<(), toml::de::Error> {
        let file: FileSettings = toml::from_str(raw)?;
        if let Some(v) = file.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = file.page_size {
            self.page_size = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = v;
        }
        if let Some(v) = file.retry_attempts {
            self.retry_attempts = v;
        }
        if let Some(v) = file.retry_backoff_ms {
            self.retry_backoff_ms = v;
        }
        if let Some(v) = file.page_shape {
            self.page_shape = v;
        }
        Ok(())
    }

    /// Environment overrides; the `APP__` spelling wins over the short one.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let pick = |short: &str, long: &str| lookup(long).or_else(|| lookup(short));

        if let Some(v) = pick("CATALOG_API_URL", "APP__API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = pick("CATALOG_PAGE_SIZE", "APP__PAGE_SIZE") {
            set_parsed(&mut self.page_size, "page_size", &v);
        }
        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
            set_parsed(&mut self.request_timeout_secs, "request_timeout_secs", &v);
        }
        if let Some(v) = lookup("APP__RETRY_ATTEMPTS") {
            set_parsed(&mut self.retry_attempts, "retry_attempts", &v);
        }
        if let Some(v) = lookup("APP__RETRY_BACKOFF_MS") {
            set_parsed(&mut self.retry_backoff_ms, "retry_backoff_ms", &v);
        }
        if let Some(v) = pick("CATALOG_PAGE_SHAPE", "APP__PAGE_SHAPE") {
            set_parsed(&mut self.page_shape, "page_shape", &v);
        }
    }

    /// Command-line flags; applied last, over file and environment values.
    pub fn apply_overrides(&mut self, api_url: Option<String>, page_shape: Option<PageShape>) {
        if let Some(url) = api_url {
            self.api_base_url = url;
        }
        if let Some(shape) = page_shape {
            self.page_shape = shape;
        }
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, key: &str, raw: &str) {
    match raw.trim().parse::<T>() {
        Ok(parsed) => *slot = parsed,
        Err(_) => warn!(key, value = raw, "ignoring unparsable environment override"),
    }
}

/// Defaults, then the settings file, then environment variables.
///
/// An explicitly named file must exist; the default `catalog.toml` is optional.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with(explicit_path, |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_with(
    explicit_path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = explicit_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(&path) {
        Ok(raw) => settings
            .apply_file(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if explicit_path.is_some() => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()));
        }
        Err(_) => {}
    }

    settings.apply_env(lookup);
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
