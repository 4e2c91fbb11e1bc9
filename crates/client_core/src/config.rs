use std::{collections::HashMap, fs};

use tracing::warn;

pub const DEFAULT_API_HOST: &str = "/api";
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8080";
pub const SETTINGS_FILE: &str = "sheets.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base path every resource is joined onto.
    pub api_host: String,
    /// Production builds do not send credentials with each request.
    pub production: bool,
    /// Origin a relative `api_host` is resolved against.
    pub origin: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.into(),
            production: false,
            origin: DEFAULT_ORIGIN.into(),
        }
    }
}

impl ClientSettings {
    pub fn with_credentials(&self) -> bool {
        !self.production
    }
}

pub fn load_settings() -> ClientSettings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

/// Layers defaults, the optional settings file and then the environment.
pub fn load_settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Some(raw) = file {
        match toml::from_str::<HashMap<String, String>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("api_host") {
                    settings.api_host = v.clone();
                }
                if let Some(v) = file_cfg.get("origin") {
                    settings.origin = v.clone();
                }
                if let Some(v) = file_cfg.get("env") {
                    settings.production = is_production(v);
                }
            }
            Err(err) => warn!("ignoring malformed {SETTINGS_FILE}: {err}"),
        }
    }

    if let Some(v) = env("API_HOST") {
        settings.api_host = v;
    }
    if let Some(v) = env("APP__API_HOST") {
        settings.api_host = v;
    }

    if let Some(v) = env("NODE_ENV") {
        settings.production = is_production(&v);
    }
    if let Some(v) = env("APP_ENV") {
        settings.production = is_production(&v);
    }

    if let Some(v) = env("APP_ORIGIN") {
        settings.origin = v;
    }
    if let Some(v) = env("APP__ORIGIN") {
        settings.origin = v;
    }

    if settings.api_host.trim().is_empty() {
        settings.api_host = DEFAULT_API_HOST.into();
    }

    settings
}

fn is_production(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("production")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
