use std::{fs, io, path::Path, time::Duration};

use anyhow::Context;
use client_core::{DEFAULT_FALLBACK_BRANCH, DEFAULT_REQUEST_TIMEOUT};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";
pub const DEFAULT_SERVICE_URL: &str = "https://vetrine.it-immobiliarenordest.workers.dev/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub service_url: String,
    pub fallback_branch: String,
    pub default_branch: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.into(),
            fallback_branch: DEFAULT_FALLBACK_BRANCH.into(),
            default_branch: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl Settings {
    /// Branch shown before the user picks one.
    pub fn initial_branch(&self) -> &str {
        self.default_branch
            .as_deref()
            .unwrap_or(&self.fallback_branch)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    service_url: Option<String>,
    fallback_branch: Option<String>,
    default_branch: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the config file, then the environment. An explicit
/// `path` must exist; the default `dashboard.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_PATH), false),
    };
    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.service_url {
        settings.service_url = v;
    }
    if let Some(v) = file_cfg.fallback_branch {
        settings.fallback_branch = v;
    }
    if let Some(v) = file_cfg.default_branch {
        settings.default_branch = Some(v);
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("DASHBOARD_SERVICE_URL") {
        settings.service_url = v;
    }
    if let Some(v) = var("APP__SERVICE_URL") {
        settings.service_url = v;
    }

    if let Some(v) = var("DASHBOARD_FALLBACK_BRANCH") {
        settings.fallback_branch = v;
    }
    if let Some(v) = var("APP__FALLBACK_BRANCH") {
        settings.fallback_branch = v;
    }

    if let Some(v) = var("APP__DEFAULT_BRANCH") {
        settings.default_branch = Some(v);
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
