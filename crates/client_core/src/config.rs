use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use shared::protocol::GENERATE_QUESTIONS_FUNCTION;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "marich.toml";
pub const DEFAULT_FUNCTION_URLS_PATH: &str = "backend/func2url.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// JSON map of logical backend function names to deployed URLs.
    pub function_urls_path: PathBuf,
    /// Takes precedence over the function URL map when set.
    pub generate_questions_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            function_urls_path: PathBuf::from(DEFAULT_FUNCTION_URLS_PATH),
            generate_questions_url: None,
            request_timeout_secs: 60,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    function_urls_path: Option<String>,
    generate_questions_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the TOML file, then environment overrides.
///
/// An explicitly given file must exist; the default `marich.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
            apply_file_settings(&mut settings, &raw)
                .with_context(|| format!("invalid settings file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_SETTINGS_FILE) {
                apply_file_settings(&mut settings, &raw)
                    .with_context(|| format!("invalid settings file '{DEFAULT_SETTINGS_FILE}'"))?;
            }
        }
    }

    apply_env_overrides(&mut settings);
    Ok(settings)
}

pub fn apply_file_settings(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.function_urls_path {
        settings.function_urls_path = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.generate_questions_url {
        settings.generate_questions_url = Some(v);
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    Ok(())
}

fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(v) = std::env::var("GENERATE_QUESTIONS_URL") {
        settings.generate_questions_url = Some(v);
    }
    if let Ok(v) = std::env::var("APP__GENERATE_QUESTIONS_URL") {
        settings.generate_questions_url = Some(v);
    }

    if let Ok(v) = std::env::var("APP__FUNCTION_URLS_PATH") {
        settings.function_urls_path = PathBuf::from(v);
    }

    if let Ok(v) = std::env::var("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(err) => tracing::warn!(value = %v, "ignoring APP__REQUEST_TIMEOUT_SECS: {err}"),
        }
    }
}

pub fn load_function_urls(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read function URL map '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid function URL map '{}'", path.display()))
}

pub fn resolve_generation_endpoint(settings: &Settings) -> anyhow::Result<Url> {
    if let Some(raw) = settings
        .generate_questions_url
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
    {
        return parse_endpoint(raw);
    }

    let urls = load_function_urls(&settings.function_urls_path)?;
    let raw = urls.get(GENERATE_QUESTIONS_FUNCTION).ok_or_else(|| {
        anyhow!(
            "function URL map '{}' has no '{GENERATE_QUESTIONS_FUNCTION}' entry",
            settings.function_urls_path.display()
        )
    })?;
    parse_endpoint(raw)
}

fn parse_endpoint(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim())
        .with_context(|| format!("invalid generation endpoint url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("generation endpoint must use http or https, got '{}'", url.scheme());
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
