//! Kiosk settings: defaults, then TOML file, then environment

use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

use crate::types::Language;
use crate::{
    CARD_READ_DELAY_MS, DEFAULT_FACT_ENDPOINT, DEFAULT_FACT_MODEL, PROCESSING_FLOOR_MS,
    SUCCESS_DWELL_MS,
};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "ecopay.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_addr: String,
    pub default_language: Language,
    pub timings: Timings,
    pub fact: FactSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            default_language: Language::default(),
            timings: Timings::default(),
            fact: FactSettings::default(),
        }
    }
}

/// Scheduled delays of the step flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub card_read_ms: u64,
    pub processing_floor_ms: u64,
    pub success_dwell_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            card_read_ms: CARD_READ_DELAY_MS,
            processing_floor_ms: PROCESSING_FLOOR_MS,
            success_dwell_ms: SUCCESS_DWELL_MS,
        }
    }
}

impl Timings {
    pub fn card_read(&self) -> Duration {
        Duration::from_millis(self.card_read_ms)
    }

    pub fn processing_floor(&self) -> Duration {
        Duration::from_millis(self.processing_floor_ms)
    }

    pub fn success_dwell(&self) -> Duration {
        Duration::from_millis(self.success_dwell_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FactSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for FactSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            model: DEFAULT_FACT_MODEL.into(),
            endpoint: DEFAULT_FACT_ENDPOINT.into(),
            timeout_secs: 10,
        }
    }
}

/// Load settings from `path` (or `ecopay.toml` if present) and the environment
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            parse_settings(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?
        }
        None => match fs::read_to_string(DEFAULT_CONFIG_FILE) {
            Ok(raw) => parse_settings(&raw)
                .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_FILE}'"))?,
            Err(_) => Settings::default(),
        },
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    Ok(toml::from_str(raw)?)
}

/// Apply environment overrides through `lookup`
pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("ECOPAY_BIND") {
        settings.bind_addr = v;
    }

    if let Some(v) = lookup("ECOPAY_LANGUAGE") {
        match v.parse::<Language>() {
            Ok(language) => settings.default_language = language,
            Err(e) => warn!(error = %e, "ignoring ECOPAY_LANGUAGE"),
        }
    }

    if let Some(v) = lookup("ECOPAY_FACT_MODEL") {
        settings.fact.model = v;
    }

    if let Some(v) = lookup("API_KEY") {
        settings.fact.api_key = Some(v);
    }
    if let Some(v) = lookup("GEMINI_API_KEY") {
        settings.fact.api_key = Some(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse_settings("").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let settings = parse_settings(
            r#"
            default_language = "eng"

            [timings]
            success_dwell_ms = 3000

            [fact]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(settings.default_language, Language::Eng);
        assert_eq!(settings.timings.success_dwell(), Duration::from_millis(3000));
        assert_eq!(settings.timings.processing_floor_ms, PROCESSING_FLOOR_MS);
        assert_eq!(settings.timings.card_read_ms, CARD_READ_DELAY_MS);
        assert!(!settings.fact.enabled);
        assert_eq!(settings.fact.model, DEFAULT_FACT_MODEL);
        assert_eq!(settings.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_rejects_unknown_language() {
        assert!(parse_settings(r#"default_language = "klingon""#).is_err());
    }

    #[test]
    fn test_env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ECOPAY_BIND", "0.0.0.0:9000"),
            ("ECOPAY_LANGUAGE", "ru"),
            ("API_KEY", "generic"),
            ("GEMINI_API_KEY", "specific"),
        ]);
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.bind_addr, "0.0.0.0:9000");
        assert_eq!(settings.default_language, Language::Ru);
        assert_eq!(settings.fact.api_key.as_deref(), Some("specific"));
    }

    #[test]
    fn test_invalid_env_language_is_ignored() {
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, |k| {
            (k == "ECOPAY_LANGUAGE").then(|| "xx".to_string())
        });
        assert_eq!(settings.default_language, Language::Aze);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = load_settings(Some(Path::new("/nonexistent/ecopay.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
